#![allow(dead_code)]

use mantle::{
    Entity, Error, Result, RowLabeled, RowNames, RowsAffected, Schema, Statement, Value,
    field_binding, stream,
};
use futures::Stream;
use log::LevelFilter;
use std::collections::{HashMap, VecDeque};
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger.is_test(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Scripted executor: result sets are served in FIFO order, every statement
/// handed over is recorded for assertions.
pub struct MockExecutor {
    pub product: &'static str,
    pub results: VecDeque<Vec<RowLabeled>>,
    pub executed: Vec<Statement>,
    pub fetched: Vec<Statement>,
    pub primary_keys: HashMap<String, Vec<String>>,
    pub fail_count_query: bool,
    pub rows_affected: u64,
    pub last_affected_id: Option<i64>,
}

impl MockExecutor {
    pub fn new(product: &'static str) -> Self {
        Self {
            product,
            results: VecDeque::new(),
            executed: Vec::new(),
            fetched: Vec::new(),
            primary_keys: HashMap::new(),
            fail_count_query: false,
            rows_affected: 1,
            last_affected_id: None,
        }
    }

    pub fn queue_rows(&mut self, labels: &[&str], values: Vec<Vec<Value>>) {
        self.results.push_back(rows(labels, values));
    }
}

impl mantle::Executor for MockExecutor {
    fn product_name(&self) -> &str {
        self.product
    }

    async fn execute(&mut self, statement: Statement) -> Result<RowsAffected> {
        self.executed.push(statement);
        Ok(RowsAffected {
            rows_affected: self.rows_affected,
            last_affected_id: self.last_affected_id,
        })
    }

    fn fetch(&mut self, statement: Statement) -> impl Stream<Item = Result<RowLabeled>> + Send {
        let items: Vec<Result<RowLabeled>> =
            if self.fail_count_query && statement.sql.starts_with("SELECT COUNT") {
                vec![Err(Error::msg("count query refused"))]
            } else {
                self.results
                    .pop_front()
                    .unwrap_or_default()
                    .into_iter()
                    .map(Ok)
                    .collect()
            };
        self.fetched.push(statement);
        stream::iter(items)
    }

    async fn primary_key_of(&mut self, table: &str) -> Result<Vec<String>> {
        Ok(self
            .primary_keys
            .get(table)
            .cloned()
            .unwrap_or_else(|| vec!["id".to_string()]))
    }
}

pub fn rows(labels: &[&str], values: Vec<Vec<Value>>) -> Vec<RowLabeled> {
    let labels: RowNames = labels.iter().map(|l| l.to_string()).collect();
    values
        .into_iter()
        .map(|v| RowLabeled::new(labels.clone(), v.into_boxed_slice()))
        .collect()
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub age: i32,
}

impl Entity for User {
    fn schema() -> Schema<Self> {
        Schema::new(User::default)
            .table("user")
            .field(field_binding!(User, id: Option<i64>).id())
            .field(field_binding!(User, name: Option<String>))
            .field(field_binding!(User, age: i32))
    }
}
