use crate::{Result, RowLabeled, RowsAffected, Statement};
use futures::Stream;
use std::future::Future;

/// The execution seam between the mapping core and an actual database
/// driver. The core only ever assembles [`Statement`]s and hands them here.
pub trait Executor: Send {
    /// Backend product name used for paging dialect selection, for example
    /// `"MySQL"` or `"Oracle"`.
    fn product_name(&self) -> &str;

    /// Runs a modify statement (INSERT/UPDATE/DELETE).
    fn execute(
        &mut self,
        statement: Statement,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Runs a query statement, yielding labeled rows as they arrive.
    fn fetch(&mut self, statement: Statement) -> impl Stream<Item = Result<RowLabeled>> + Send;

    /// Primary key column names of `table`, in declaration order. Used by
    /// the multi table paging rewrite.
    fn primary_key_of(&mut self, table: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}
