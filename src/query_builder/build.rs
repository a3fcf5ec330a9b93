use crate::error::SqlFluentError;
use crate::ident::push_quoted;
use crate::types::{Bindings, QueryAndParams, RowValues};

use super::{Predicate, StatementBuilder, StatementKind, TableRef};

impl StatementBuilder {
    /// Assemble the SQL text and its bindings.
    ///
    /// SELECT and DELETE bind WHERE/HAVING values by name. UPDATE binds its SET
    /// values by name too, ahead of the WHERE values. INSERT binds positionally,
    /// row by row in the first row's column order.
    ///
    /// # Errors
    /// [`SqlFluentError::MissingBaseTable`] when no table was set,
    /// [`SqlFluentError::EmptyInsert`] / [`SqlFluentError::EmptyUpdate`] when an
    /// INSERT or UPDATE has nothing to write.
    pub fn build(&self) -> Result<QueryAndParams, SqlFluentError> {
        let Some(base) = self.tables.first() else {
            return Err(SqlFluentError::MissingBaseTable);
        };

        match self.kind {
            StatementKind::Select => Ok(self.build_select()),
            StatementKind::Insert => self.build_insert(base),
            StatementKind::Update => self.build_update(base),
            StatementKind::Delete => Ok(self.build_delete()),
        }
    }

    fn build_select(&self) -> QueryAndParams {
        let mut sql = String::from("SELECT ");
        if self.projection.is_empty() {
            sql.push('*');
        } else {
            for (idx, column) in self.projection.iter().enumerate() {
                if idx > 0 {
                    sql.push_str(", ");
                }
                column.write_sql(&mut sql);
            }
        }
        sql.push_str(" FROM ");
        self.push_tables(&mut sql);

        for join in &self.joins {
            sql.push(' ');
            join.write_sql(&mut sql);
        }

        let mut params = Vec::with_capacity(self.wheres.len() + self.havings.len());
        push_predicates(&mut sql, "WHERE", &self.wheres, &mut params);

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            for (idx, column) in self.group_by.iter().enumerate() {
                if idx > 0 {
                    sql.push_str(", ");
                }
                column.write_sql(&mut sql);
            }
        }

        push_predicates(&mut sql, "HAVING", &self.havings, &mut params);

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (idx, spec) in self.order_by.iter().enumerate() {
                if idx > 0 {
                    sql.push_str(", ");
                }
                spec.column.write_sql(&mut sql);
                sql.push(' ');
                sql.push_str(spec.direction.as_sql());
            }
        }

        self.push_limit(&mut sql);
        QueryAndParams::new(sql, Bindings::Named(params))
    }

    fn build_insert(&self, base: &TableRef) -> Result<QueryAndParams, SqlFluentError> {
        let Some(first) = self.insert_rows.first() else {
            return Err(SqlFluentError::EmptyInsert);
        };

        let mut sql = String::from("INSERT INTO ");
        push_quoted(&mut sql, &base.name);
        sql.push_str(" (");
        for (idx, (column, _)) in first.iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            push_quoted(&mut sql, column);
        }
        sql.push_str(") VALUES ");

        let tuple = format!("({})", vec!["?"; first.len()].join(", "));
        let mut params = Vec::with_capacity(first.len() * self.insert_rows.len());
        for (idx, row) in self.insert_rows.iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&tuple);
            params.extend(row.iter().map(|(_, value)| value.clone()));
        }

        Ok(QueryAndParams::new(sql, Bindings::Positional(params)))
    }

    fn build_update(&self, base: &TableRef) -> Result<QueryAndParams, SqlFluentError> {
        if self.assignments.is_empty() {
            return Err(SqlFluentError::EmptyUpdate);
        }

        let mut sql = String::from("UPDATE ");
        push_quoted(&mut sql, &base.name);
        sql.push_str(" SET ");

        let mut params = Vec::with_capacity(self.assignments.len() + self.wheres.len());
        for (idx, assignment) in self.assignments.iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            push_quoted(&mut sql, &assignment.column);
            sql.push_str(" = :");
            sql.push_str(&assignment.name);
            params.push((assignment.name.clone(), assignment.value.clone()));
        }

        push_predicates(&mut sql, "WHERE", &self.wheres, &mut params);
        Ok(QueryAndParams::new(sql, Bindings::Named(params)))
    }

    fn build_delete(&self) -> QueryAndParams {
        let mut sql = String::from("DELETE FROM ");
        self.push_tables(&mut sql);

        let mut params = Vec::with_capacity(self.wheres.len());
        push_predicates(&mut sql, "WHERE", &self.wheres, &mut params);
        self.push_limit(&mut sql);
        QueryAndParams::new(sql, Bindings::Named(params))
    }

    fn push_tables(&self, sql: &mut String) {
        for (idx, table) in self.tables.iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            table.write_sql(sql);
        }
    }

    fn push_limit(&self, sql: &mut String) {
        let spec = self.limit;
        if spec.limit == 0 {
            return;
        }
        if spec.offset > 0 {
            sql.push_str(&format!(" LIMIT {}, {}", spec.offset, spec.limit));
        } else {
            sql.push_str(&format!(" LIMIT {}", spec.limit));
        }
    }
}

/// ` KEYWORD (p1) AND (p2)`, collecting each predicate's binding.
fn push_predicates(
    sql: &mut String,
    keyword: &str,
    predicates: &[Predicate],
    params: &mut Vec<(String, RowValues)>,
) {
    if predicates.is_empty() {
        return;
    }
    sql.push(' ');
    sql.push_str(keyword);
    sql.push(' ');
    for (idx, predicate) in predicates.iter().enumerate() {
        if idx > 0 {
            sql.push_str(" AND ");
        }
        sql.push('(');
        sql.push_str(&predicate.fragment);
        sql.push(')');
        params.push((predicate.name.clone(), predicate.value.clone()));
    }
}
