//! Scripted connection for tests
//!
//! Responses are registered against SQL fragments, optionally pinned to bind
//! parameters. A statement is answered by a pinned entry whose parameters
//! match before any unpinned one, then by the longest fragment it contains,
//! so a specific probe can be scripted next to a generic one.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{Connection, DdlportError, Dialect, QueryResult, Result, StatementResult, Value};

#[derive(Debug, Clone)]
enum MockResponse {
    Rows(QueryResult),
    Error(String),
}

#[derive(Debug, Clone)]
struct ScriptEntry {
    fragment: String,
    params: Option<Vec<Value>>,
    response: MockResponse,
}

impl ScriptEntry {
    fn matches(&self, sql: &str, params: &[Value]) -> bool {
        sql.contains(self.fragment.as_str())
            && self
                .params
                .as_ref()
                .is_none_or(|expected| expected.as_slice() == params)
    }

    fn rank(&self) -> (bool, usize) {
        (self.params.is_some(), self.fragment.len())
    }
}

/// A statement received by a [`MockConnection`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Connection double answering from a script
pub struct MockConnection {
    dialect: Dialect,
    script: Vec<ScriptEntry>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockConnection {
    /// Creates a mock with no scripted responses
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            script: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers statements containing `fragment` with `result`
    pub fn on(mut self, fragment: impl Into<String>, result: QueryResult) -> Self {
        self.script.push(ScriptEntry {
            fragment: fragment.into(),
            params: None,
            response: MockResponse::Rows(result),
        });
        self
    }

    /// Answers statements containing `fragment` bound to exactly `params`
    pub fn on_params(
        mut self,
        fragment: impl Into<String>,
        params: Vec<Value>,
        result: QueryResult,
    ) -> Self {
        self.script.push(ScriptEntry {
            fragment: fragment.into(),
            params: Some(params),
            response: MockResponse::Rows(result),
        });
        self
    }

    /// Answers statements containing `fragment` with a single-row result
    pub fn on_row<C, S>(self, fragment: impl Into<String>, columns: C, values: Vec<Value>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on(fragment, QueryResult::from_rows(columns, vec![values]))
    }

    /// Fails statements containing `fragment` with a query error
    pub fn on_error(mut self, fragment: impl Into<String>, message: impl Into<String>) -> Self {
        self.script.push(ScriptEntry {
            fragment: fragment.into(),
            params: None,
            response: MockResponse::Error(message.into()),
        });
        self
    }

    /// Statements received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of received statements containing `fragment`
    pub fn call_count(&self, fragment: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.sql.contains(fragment))
            .count()
    }

    fn respond(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.calls.lock().push(RecordedCall {
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        let response = self
            .script
            .iter()
            .filter(|entry| entry.matches(sql, params))
            .max_by_key(|entry| entry.rank())
            .map(|entry| entry.response.clone());

        match response {
            Some(MockResponse::Rows(result)) => Ok(result),
            Some(MockResponse::Error(message)) => Err(DdlportError::Query(message)),
            None => Err(DdlportError::Query(format!("no scripted response for: {}", sql))),
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.respond(sql, params)
    }

    async fn execute(&self, sql: &str) -> Result<StatementResult> {
        self.respond(sql, &[]).map(StatementResult::rows)
    }
}
