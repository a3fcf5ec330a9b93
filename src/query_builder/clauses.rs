use crate::error::SqlFluentError;
use crate::types::RowValues;

use super::{
    ColumnRef, IntoColumnRef, Join, JoinKind, LimitSpec, OrderSpec, PredicateClause,
    SortDirection, StatementBuilder, StatementKind, TableRef,
};

/// Fluent clause methods, shared by [`StatementBuilder`] and
/// [`Query`](super::Query).
///
/// Implementors only expose their [`StatementBuilder`]; every clause method is
/// provided. Methods that validate input return `Result` and leave the builder
/// unchanged when they fail.
pub trait Clauses {
    fn statement(&self) -> &StatementBuilder;

    fn statement_mut(&mut self) -> &mut StatementBuilder;

    fn set_kind(&mut self, kind: StatementKind) -> &mut Self {
        self.statement_mut().kind = kind;
        self
    }

    /// Set the statement kind from text, case-insensitively.
    ///
    /// # Errors
    /// [`SqlFluentError::InvalidStatementKind`] for anything but SELECT, INSERT, UPDATE, DELETE.
    fn statement_type(&mut self, kind: &str) -> Result<&mut Self, SqlFluentError> {
        let kind = kind.parse()?;
        Ok(self.set_kind(kind))
    }

    /// Replace the projection. An empty list keeps the current one (`*` by default).
    ///
    /// # Errors
    /// [`SqlFluentError::InvalidProjectionShape`] for a malformed column string.
    fn select<I, C>(&mut self, columns: I) -> Result<&mut Self, SqlFluentError>
    where
        I: IntoIterator<Item = C>,
        C: IntoColumnRef,
    {
        let columns = collect_columns(columns)?;
        if !columns.is_empty() {
            self.statement_mut().projection = columns;
        }
        Ok(self)
    }

    /// Replace the projection with columns qualified by `alias`.
    fn select_aliased<I, C>(&mut self, alias: &str, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let columns: Vec<ColumnRef> = columns
            .into_iter()
            .map(|c| ColumnRef::qualified(alias, c.as_ref()))
            .collect();
        if !columns.is_empty() {
            self.statement_mut().projection = columns;
        }
        self
    }

    /// Append to the projection.
    ///
    /// # Errors
    /// [`SqlFluentError::InvalidProjectionShape`] for a malformed column string.
    fn add_select<I, C>(&mut self, columns: I) -> Result<&mut Self, SqlFluentError>
    where
        I: IntoIterator<Item = C>,
        C: IntoColumnRef,
    {
        let columns = collect_columns(columns)?;
        self.statement_mut().projection.extend(columns);
        Ok(self)
    }

    /// Append a source table. An empty name is ignored.
    fn from(&mut self, table: &str) -> &mut Self {
        self.from_table(TableRef::new(table))
    }

    fn from_aliased(&mut self, table: &str, alias: &str) -> &mut Self {
        self.from_table(TableRef::new(table).alias(alias))
    }

    fn from_table(&mut self, table: TableRef) -> &mut Self {
        if !table.name.is_empty() {
            self.statement_mut().tables.push(table);
        }
        self
    }

    fn left_join<'a>(&mut self, table: impl Into<TableRef>, on: impl Into<Option<&'a str>>) -> &mut Self {
        self.join(JoinKind::Left, table.into(), on.into())
    }

    fn inner_join<'a>(&mut self, table: impl Into<TableRef>, on: impl Into<Option<&'a str>>) -> &mut Self {
        self.join(JoinKind::Inner, table.into(), on.into())
    }

    fn left_outer_join<'a>(
        &mut self,
        table: impl Into<TableRef>,
        on: impl Into<Option<&'a str>>,
    ) -> &mut Self {
        self.join(JoinKind::LeftOuter, table.into(), on.into())
    }

    fn right_join<'a>(&mut self, table: impl Into<TableRef>, on: impl Into<Option<&'a str>>) -> &mut Self {
        self.join(JoinKind::Right, table.into(), on.into())
    }

    fn natural_join(&mut self, table: impl Into<TableRef>) -> &mut Self {
        self.join(JoinKind::Natural, table.into(), None)
    }

    /// Append a join. Joins are only emitted for SELECT; empty `on` text is dropped.
    fn join(&mut self, kind: JoinKind, table: TableRef, on: Option<&str>) -> &mut Self {
        if !table.name.is_empty() {
            let on = on.filter(|s| !s.trim().is_empty()).map(str::to_string);
            self.statement_mut().joins.push(Join { kind, table, on });
        }
        self
    }

    /// Add a WHERE predicate, AND-ed with the others, bound under a fresh `:name`.
    ///
    /// # Errors
    /// [`SqlFluentError::InvalidComparisonOperator`] or
    /// [`SqlFluentError::InvalidProjectionShape`].
    fn and_where<C: IntoColumnRef>(
        &mut self,
        column: C,
        op: &str,
        value: impl Into<RowValues>,
    ) -> Result<&mut Self, SqlFluentError> {
        let column = column.into_column_ref();
        self.statement_mut()
            .add_predicate(PredicateClause::Where, column, op, value.into())?;
        Ok(self)
    }

    /// # Errors
    /// [`SqlFluentError::InvalidComparisonOperator`].
    fn and_where_aliased(
        &mut self,
        alias: &str,
        column: &str,
        op: &str,
        value: impl Into<RowValues>,
    ) -> Result<&mut Self, SqlFluentError> {
        let column = Ok(ColumnRef::qualified(alias, column));
        self.statement_mut()
            .add_predicate(PredicateClause::Where, column, op, value.into())?;
        Ok(self)
    }

    /// Add a HAVING predicate; same contract as [`Clauses::and_where`].
    ///
    /// # Errors
    /// [`SqlFluentError::InvalidComparisonOperator`] or
    /// [`SqlFluentError::InvalidProjectionShape`].
    fn and_having<C: IntoColumnRef>(
        &mut self,
        column: C,
        op: &str,
        value: impl Into<RowValues>,
    ) -> Result<&mut Self, SqlFluentError> {
        let column = column.into_column_ref();
        self.statement_mut()
            .add_predicate(PredicateClause::Having, column, op, value.into())?;
        Ok(self)
    }

    /// # Errors
    /// [`SqlFluentError::InvalidComparisonOperator`].
    fn and_having_aliased(
        &mut self,
        alias: &str,
        column: &str,
        op: &str,
        value: impl Into<RowValues>,
    ) -> Result<&mut Self, SqlFluentError> {
        let column = Ok(ColumnRef::qualified(alias, column));
        self.statement_mut()
            .add_predicate(PredicateClause::Having, column, op, value.into())?;
        Ok(self)
    }

    /// Append an ORDER BY column; `direction` is `ASC` or `DESC`, any case.
    ///
    /// # Errors
    /// [`SqlFluentError::InvalidSortDirection`] or
    /// [`SqlFluentError::InvalidProjectionShape`].
    fn order_by<C: IntoColumnRef>(
        &mut self,
        column: C,
        direction: &str,
    ) -> Result<&mut Self, SqlFluentError> {
        let direction: SortDirection = direction.parse()?;
        let column = column.into_column_ref()?;
        Ok(self.order_by_spec(OrderSpec { column, direction }))
    }

    /// # Errors
    /// [`SqlFluentError::InvalidProjectionShape`].
    fn order_by_asc<C: IntoColumnRef>(&mut self, column: C) -> Result<&mut Self, SqlFluentError> {
        let column = column.into_column_ref()?;
        Ok(self.order_by_spec(OrderSpec {
            column,
            direction: SortDirection::Asc,
        }))
    }

    /// # Errors
    /// [`SqlFluentError::InvalidSortDirection`].
    fn order_by_aliased(
        &mut self,
        alias: &str,
        column: &str,
        direction: &str,
    ) -> Result<&mut Self, SqlFluentError> {
        let direction: SortDirection = direction.parse()?;
        Ok(self.order_by_spec(OrderSpec {
            column: ColumnRef::qualified(alias, column),
            direction,
        }))
    }

    fn order_by_spec(&mut self, spec: OrderSpec) -> &mut Self {
        self.statement_mut().order_by.push(spec);
        self
    }

    /// Append a GROUP BY column.
    ///
    /// # Errors
    /// [`SqlFluentError::InvalidProjectionShape`].
    fn group_by<C: IntoColumnRef>(&mut self, column: C) -> Result<&mut Self, SqlFluentError> {
        let column = column.into_column_ref()?;
        self.statement_mut().group_by.push(column);
        Ok(self)
    }

    fn group_by_aliased(&mut self, alias: &str, column: &str) -> &mut Self {
        self.statement_mut()
            .group_by
            .push(ColumnRef::qualified(alias, column));
        self
    }

    /// `LIMIT count`; `0` removes the clause.
    fn limit(&mut self, count: u64) -> &mut Self {
        self.limit_offset(count, 0)
    }

    /// `LIMIT offset, count`, replacing any earlier limit.
    fn limit_offset(&mut self, count: u64, offset: u64) -> &mut Self {
        self.statement_mut().limit = LimitSpec {
            offset,
            limit: count,
        };
        self
    }
}

fn collect_columns<I, C>(columns: I) -> Result<Vec<ColumnRef>, SqlFluentError>
where
    I: IntoIterator<Item = C>,
    C: IntoColumnRef,
{
    columns
        .into_iter()
        .map(IntoColumnRef::into_column_ref)
        .collect()
}
