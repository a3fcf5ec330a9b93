//! In-process [`Backend`] double for exercising the facade without a database.

use std::collections::VecDeque;

use crate::backend::Backend;
use crate::error::SqlFluentError;
use crate::results::ResultSet;
use crate::types::Bindings;

/// One call observed by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Execute(String, Bindings),
    Begin,
    Commit,
    Rollback,
}

/// Records every statement and transaction call, and replays queued results.
///
/// `execute` pops the next queued [`ResultSet`], or returns an empty one when
/// the queue is drained.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<RecordedCall>,
    results: VecDeque<ResultSet>,
    last_insert_id: Option<i64>,
    fail_on: Option<String>,
    fail_rollback: bool,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Executed SQL text, in order.
    #[must_use]
    pub fn executed_sql(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Execute(sql, _) => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn push_result(&mut self, result: ResultSet) {
        self.results.push_back(result);
    }

    pub fn set_last_insert_id(&mut self, id: Option<i64>) {
        self.last_insert_id = id;
    }

    /// Fail any statement whose text contains `fragment`. The call is still recorded.
    pub fn fail_on(&mut self, fragment: impl Into<String>) {
        self.fail_on = Some(fragment.into());
    }

    pub fn fail_rollback(&mut self, fail: bool) {
        self.fail_rollback = fail;
    }
}

impl Backend for RecordingBackend {
    fn execute(&mut self, sql: &str, bindings: &Bindings) -> Result<ResultSet, SqlFluentError> {
        self.calls
            .push(RecordedCall::Execute(sql.to_string(), bindings.clone()));
        if let Some(fragment) = &self.fail_on {
            if sql.contains(fragment.as_str()) {
                return Err(SqlFluentError::ExecutionError(format!(
                    "recording backend rejected: {sql}"
                )));
            }
        }
        Ok(self.results.pop_front().unwrap_or_default())
    }

    fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    fn begin(&mut self) -> Result<(), SqlFluentError> {
        self.calls.push(RecordedCall::Begin);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SqlFluentError> {
        self.calls.push(RecordedCall::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlFluentError> {
        self.calls.push(RecordedCall::Rollback);
        if self.fail_rollback {
            return Err(SqlFluentError::ExecutionError(
                "recording backend rollback failure".into(),
            ));
        }
        Ok(())
    }
}
