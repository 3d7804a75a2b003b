use crate::{
    CoreError, Executor, Result, ResultShape, Statement, StatementKind, Value,
    builder::rewrite_placeholders,
    clause::leading_keyword,
};

/// Runs caller supplied modify SQL with positional `?` parameters, the
/// escape hatch for statements the entity layer cannot assemble.
///
/// Only INSERT, UPDATE and DELETE are accepted; queries must go through the
/// entity operations or the executor directly.
pub async fn execute_cud<Exec: Executor>(
    executor: &mut Exec,
    sql: &str,
    params: &[Value],
) -> Result<u64> {
    let keyword = leading_keyword(sql).to_ascii_uppercase();
    let kind = match keyword.as_str() {
        "INSERT" => StatementKind::Insert,
        "UPDATE" => StatementKind::Update,
        "DELETE" => StatementKind::Delete,
        _ => return Err(CoreError::UnsupportedStatement(keyword).into()),
    };
    let (sql, bound) = rewrite_placeholders(sql, params);
    let mut statement = Statement::new(kind, sql);
    statement.params = bound;
    statement.shape = ResultShape::Manual;
    let affected = executor.execute(statement).await?;
    Ok(affected.rows_affected)
}
