//! Fluent SQL statement builder.
//!
//! A [`StatementBuilder`] accumulates clause fragments and value bindings, and
//! [`StatementBuilder::build`] assembles them into one of four statement shapes
//! (SELECT, INSERT, UPDATE, DELETE). Clause methods live on the [`Clauses`] trait
//! so they read the same on a detached builder and on a database-bound [`Query`].
//!
//! Clause methods mutate in place and return `&mut Self`; those that validate
//! their input return `Result<&mut Self, _>` and leave the builder untouched on
//! error. `build()` only reads the builder, so building twice yields the same
//! text and bindings.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::binding_names::BindingNameGenerator;
use crate::error::SqlFluentError;
use crate::ident::push_quoted;
use crate::types::RowValues;

mod build;
mod clauses;
mod query;

pub use clauses::Clauses;
pub use query::Query;

/// Top-level SQL operation a builder emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum StatementKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub const ALLOWED: &'static [&'static str] = &["SELECT", "INSERT", "UPDATE", "DELETE"];

    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

impl FromStr for StatementKind {
    type Err = SqlFluentError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Ok(StatementKind::Select),
            "INSERT" => Ok(StatementKind::Insert),
            "UPDATE" => Ok(StatementKind::Update),
            "DELETE" => Ok(StatementKind::Delete),
            _ => Err(SqlFluentError::InvalidStatementKind {
                given: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Comparison operator of a WHERE/HAVING predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    /// `<>`, kept distinct from `!=` so the emitted text matches the input.
    NotEqAnsi,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
}

impl Operator {
    pub const ALLOWED: &'static [&'static str] = &["=", "!=", "<>", "<", "<=", ">", ">=", "LIKE"];

    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::NotEqAnsi => "<>",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "LIKE",
        }
    }
}

impl FromStr for Operator {
    type Err = SqlFluentError;

    /// Case-insensitive (`like` is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::NotEq),
            "<>" => Ok(Operator::NotEqAnsi),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "LIKE" => Ok(Operator::Like),
            _ => Err(SqlFluentError::InvalidComparisonOperator {
                given: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const ALLOWED: &'static [&'static str] = &["ASC", "DESC"];

    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = SqlFluentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(SqlFluentError::InvalidSortDirection {
                given: s.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// The column part of a [`ColumnRef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// A column name, quoted on output.
    Name(String),
    /// `*`, never quoted.
    Wildcard,
    /// A raw expression emitted verbatim (aggregates, functions).
    Raw(String),
}

/// A projection, grouping, ordering or predicate column: optional table/alias
/// qualifier plus a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub column: Column,
}

impl ColumnRef {
    /// Unqualified column; `"*"` becomes the wildcard.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            column: Self::name_or_wildcard(column.into()),
        }
    }

    /// Column qualified by a table name or alias. An empty qualifier is dropped.
    pub fn qualified(qualifier: impl Into<String>, column: impl Into<String>) -> Self {
        let qualifier = qualifier.into();
        Self {
            qualifier: (!qualifier.is_empty()).then_some(qualifier),
            column: Self::name_or_wildcard(column.into()),
        }
    }

    /// Raw SQL expression, emitted as-is.
    ///
    /// **Warning**: bypasses identifier quoting. Only use with trusted text.
    pub fn raw(expression: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            column: Column::Raw(expression.into()),
        }
    }

    /// Parse `column` or `qualifier.column`.
    ///
    /// # Errors
    /// Returns [`SqlFluentError::InvalidProjectionShape`] for empty input, empty
    /// parts, or more than one `.`.
    pub fn parse(s: &str) -> Result<Self, SqlFluentError> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [column] if !column.is_empty() => Ok(Self::new(*column)),
            [qualifier, column] if !qualifier.is_empty() && !column.is_empty() => {
                Ok(Self::qualified(*qualifier, *column))
            }
            _ => Err(SqlFluentError::InvalidProjectionShape(format!(
                "'{s}' is not of the form column or qualifier.column"
            ))),
        }
    }

    fn name_or_wildcard(column: String) -> Column {
        if column == "*" {
            Column::Wildcard
        } else {
            Column::Name(column)
        }
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        if let Column::Raw(expression) = &self.column {
            out.push_str(expression);
            return;
        }
        if let Some(qualifier) = &self.qualifier {
            push_quoted(out, qualifier);
            out.push('.');
        }
        match &self.column {
            Column::Name(name) => push_quoted(out, name),
            Column::Wildcard => out.push('*'),
            Column::Raw(_) => {}
        }
    }

    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }
}

/// Conversion into a [`ColumnRef`], used by every clause method that takes a column.
pub trait IntoColumnRef {
    /// # Errors
    /// Returns [`SqlFluentError::InvalidProjectionShape`] when a string is malformed.
    fn into_column_ref(self) -> Result<ColumnRef, SqlFluentError>;
}

impl IntoColumnRef for ColumnRef {
    fn into_column_ref(self) -> Result<ColumnRef, SqlFluentError> {
        Ok(self)
    }
}

impl IntoColumnRef for &ColumnRef {
    fn into_column_ref(self) -> Result<ColumnRef, SqlFluentError> {
        Ok(self.clone())
    }
}

impl IntoColumnRef for &str {
    fn into_column_ref(self) -> Result<ColumnRef, SqlFluentError> {
        ColumnRef::parse(self)
    }
}

impl IntoColumnRef for String {
    fn into_column_ref(self) -> Result<ColumnRef, SqlFluentError> {
        ColumnRef::parse(&self)
    }
}

impl IntoColumnRef for &String {
    fn into_column_ref(self) -> Result<ColumnRef, SqlFluentError> {
        ColumnRef::parse(self)
    }
}

/// A source table with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// An empty alias is treated as no alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.alias = (!alias.is_empty()).then_some(alias);
        self
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        push_quoted(out, &self.name);
        if let Some(alias) = &self.alias {
            out.push(' ');
            push_quoted(out, alias);
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::new(name)
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::new(name)
    }
}

impl From<(&str, &str)> for TableRef {
    fn from((name, alias): (&str, &str)) -> Self {
        TableRef::new(name).alias(alias)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    Inner,
    LeftOuter,
    Right,
    Natural,
}

impl JoinKind {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Natural => "NATURAL JOIN",
        }
    }
}

/// A join; `on` is caller-written SQL and is not re-quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Option<String>,
}

impl Join {
    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push_str(self.kind.as_sql());
        out.push(' ');
        self.table.write_sql(out);
        if let Some(on) = &self.on {
            out.push_str(" ON ");
            out.push_str(on);
        }
    }
}

/// One WHERE/HAVING predicate: its rendered text and the binding behind its placeholder.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Predicate {
    pub(crate) fragment: String,
    pub(crate) name: String,
    pub(crate) value: RowValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PredicateClause {
    Where,
    Having,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: ColumnRef,
    pub direction: SortDirection,
}

/// `limit == 0` means no LIMIT clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LimitSpec {
    pub offset: u64,
    pub limit: u64,
}

/// An ordered column → value map.
pub type ColumnValues = Vec<(String, RowValues)>;

/// Rows for an INSERT. A single row converts into a one-row batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertRows(pub Vec<ColumnValues>);

fn column_values<K, V>(row: impl IntoIterator<Item = (K, V)>) -> ColumnValues
where
    K: Into<String>,
    V: Into<RowValues>,
{
    row.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

impl<K: Into<String>, V: Into<RowValues>> From<Vec<(K, V)>> for InsertRows {
    fn from(row: Vec<(K, V)>) -> Self {
        InsertRows(vec![column_values(row)])
    }
}

impl<K: Into<String>, V: Into<RowValues>, const N: usize> From<[(K, V); N]> for InsertRows {
    fn from(row: [(K, V); N]) -> Self {
        InsertRows(vec![column_values(row)])
    }
}

impl<K: Into<String>, V: Into<RowValues>> From<Vec<Vec<(K, V)>>> for InsertRows {
    fn from(rows: Vec<Vec<(K, V)>>) -> Self {
        InsertRows(rows.into_iter().map(column_values).collect())
    }
}

/// Column assignments for an UPDATE, in SET order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assignments(pub ColumnValues);

impl<K: Into<String>, V: Into<RowValues>> From<Vec<(K, V)>> for Assignments {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Assignments(column_values(pairs))
    }
}

impl<K: Into<String>, V: Into<RowValues>, const N: usize> From<[(K, V); N]> for Assignments {
    fn from(pairs: [(K, V); N]) -> Self {
        Assignments(column_values(pairs))
    }
}

/// A SET entry with the placeholder name allocated for its value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Assignment {
    pub(crate) column: String,
    pub(crate) name: String,
    pub(crate) value: RowValues,
}

/// Clause accumulator and statement assembler.
///
/// ```rust
/// use sql_fluent::prelude::*;
///
/// # fn main() -> Result<(), SqlFluentError> {
/// let mut builder = StatementBuilder::new();
/// builder
///     .from_aliased("orders", "o")
///     .select(["o.id", "o.price"])?
///     .and_where("o.product_id", "=", 1)?
///     .order_by("o.price", "desc")?
///     .limit(10);
///
/// let built = builder.build()?;
/// assert!(built.query.starts_with("SELECT `o`.`id`, `o`.`price` FROM `orders` `o` WHERE (`o`.`product_id` = :"));
/// assert!(built.query.ends_with("ORDER BY `o`.`price` DESC LIMIT 10"));
/// assert_eq!(built.params.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    pub(crate) kind: StatementKind,
    pub(crate) projection: Vec<ColumnRef>,
    pub(crate) tables: Vec<TableRef>,
    pub(crate) joins: Vec<Join>,
    pub(crate) wheres: Vec<Predicate>,
    pub(crate) havings: Vec<Predicate>,
    pub(crate) group_by: Vec<ColumnRef>,
    pub(crate) order_by: Vec<OrderSpec>,
    pub(crate) limit: LimitSpec,
    pub(crate) insert_rows: Vec<ColumnValues>,
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) names: BindingNameGenerator,
}

impl StatementBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder whose placeholder names come from a seeded generator.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            names: BindingNameGenerator::with_seed(seed),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn statement_kind(&self) -> StatementKind {
        self.kind
    }

    #[must_use]
    pub fn limit_spec(&self) -> LimitSpec {
        self.limit
    }

    /// Record INSERT rows and switch to INSERT.
    ///
    /// Every row must carry the first row's column set; values of later rows are
    /// reordered into the first row's column order.
    ///
    /// # Errors
    /// [`SqlFluentError::EmptyInsert`] for no rows (or a first row with no columns),
    /// [`SqlFluentError::InsertColumnMismatch`] when a row's column set differs.
    pub fn set_insert(&mut self, rows: impl Into<InsertRows>) -> Result<&mut Self, SqlFluentError> {
        let InsertRows(rows) = rows.into();
        let Some(first) = rows.first() else {
            return Err(SqlFluentError::EmptyInsert);
        };
        if first.is_empty() {
            return Err(SqlFluentError::EmptyInsert);
        }
        let columns: Vec<String> = first.iter().map(|(c, _)| c.clone()).collect();

        let mut normalized = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let mismatch = || SqlFluentError::InsertColumnMismatch {
                row: idx,
                expected: columns.clone(),
                found: row.iter().map(|(c, _)| c.clone()).collect(),
            };
            if row.len() != columns.len() {
                return Err(mismatch());
            }
            let mut ordered = Vec::with_capacity(columns.len());
            for column in &columns {
                let (_, value) = row
                    .iter()
                    .find(|(c, _)| c == column)
                    .ok_or_else(mismatch)?;
                ordered.push((column.clone(), value.clone()));
            }
            normalized.push(ordered);
        }

        self.insert_rows = normalized;
        self.kind = StatementKind::Insert;
        Ok(self)
    }

    /// Record UPDATE assignments and switch to UPDATE. Each value gets its own
    /// named placeholder from this builder's generator.
    ///
    /// # Errors
    /// [`SqlFluentError::EmptyUpdate`] when there is nothing to assign.
    pub fn set_update(
        &mut self,
        assignments: impl Into<Assignments>,
    ) -> Result<&mut Self, SqlFluentError> {
        let Assignments(pairs) = assignments.into();
        if pairs.is_empty() {
            return Err(SqlFluentError::EmptyUpdate);
        }
        self.assignments = pairs
            .into_iter()
            .map(|(column, value)| Assignment {
                column,
                name: self.names.next_name(),
                value,
            })
            .collect();
        self.kind = StatementKind::Update;
        Ok(self)
    }

    /// Switch to DELETE.
    pub fn set_delete(&mut self) -> &mut Self {
        self.kind = StatementKind::Delete;
        self
    }

    /// Validate and record one predicate. The operator is checked before the
    /// column so an invalid call never allocates a placeholder name.
    pub(crate) fn add_predicate(
        &mut self,
        clause: PredicateClause,
        column: Result<ColumnRef, SqlFluentError>,
        op: &str,
        value: RowValues,
    ) -> Result<(), SqlFluentError> {
        let op: Operator = op.parse()?;
        let column = column?;

        let name = self.names.next_name();
        let mut fragment = String::new();
        column.write_sql(&mut fragment);
        fragment.push(' ');
        fragment.push_str(op.as_sql());
        fragment.push_str(" :");
        fragment.push_str(&name);

        let predicate = Predicate {
            fragment,
            name,
            value,
        };
        match clause {
            PredicateClause::Where => self.wheres.push(predicate),
            PredicateClause::Having => self.havings.push(predicate),
        }
        Ok(())
    }

    /// The assembled SQL text, without bindings.
    ///
    /// # Errors
    /// Same as [`StatementBuilder::build`].
    pub fn to_sql(&self) -> Result<String, SqlFluentError> {
        self.build().map(|built| built.query)
    }
}

impl Clauses for StatementBuilder {
    fn statement(&self) -> &StatementBuilder {
        self
    }

    fn statement_mut(&mut self) -> &mut StatementBuilder {
        self
    }
}
