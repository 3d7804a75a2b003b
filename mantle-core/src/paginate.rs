use crate::{
    AsValue, Dialect, Error, Executor, Page, Result, ResultShape, Statement, StatementKind,
    clause::{
        collapse_blanks, find_keyword, is_join_query, select_set_from_sql, table_set_from_sql,
    },
    util::separated_by,
};
use anyhow::Context;
use futures::StreamExt;
use std::pin::pin;

/// Rewrites `statement` in place so it fetches only the page `page` asks
/// for, and runs the matching live `COUNT(*)` to populate the page totals.
///
/// Non SELECT statements pass through untouched. A failing count is logged
/// and flagged on the page, the data query still runs for the requested
/// window. Unknown backends get the count but no rewrite.
pub async fn paginate<Exec: Executor>(
    executor: &mut Exec,
    statement: &mut Statement,
    page: &mut Page,
) -> Result<()> {
    if statement.kind != StatementKind::Select {
        return Ok(());
    }
    statement.sql = collapse_blanks(&statement.sql);
    match count_total(executor, statement).await {
        Ok(total) => page.set_total_count(total),
        Err(e) => {
            log::error!("Count query failed for `{}`: {:#}", statement, e);
            page.mark_count_failed();
        }
    }
    let dialect = Dialect::from_product_name(executor.product_name());
    statement.sql = match dialect {
        Dialect::MySql if is_join_query(&statement.sql) => {
            mysql_join_page_sql(executor, &statement.sql, page).await?
        }
        Dialect::MySql => mysql_limit_page_sql(&statement.sql, page),
        Dialect::Oracle => oracle_page_sql(&statement.sql, page),
        Dialect::Other => return Ok(()),
    };
    Ok(())
}

/// Runs `SELECT COUNT(*) AS TOTAL` over the statement's own FROM clause
/// onward, reusing its parameter bindings.
async fn count_total<Exec: Executor>(executor: &mut Exec, statement: &Statement) -> Result<u64> {
    let from = find_keyword(&statement.sql, "FROM")
        .ok_or_else(|| Error::msg(format!("No FROM clause in `{}`", statement)))?;
    let mut count = Statement::new(
        StatementKind::Select,
        format!("SELECT COUNT(*) AS TOTAL {}", &statement.sql[from..]),
    );
    count.params = statement.params.clone();
    count.shape = ResultShape::Manual;
    let mut rows = pin!(executor.fetch(count));
    let row = rows
        .next()
        .await
        .ok_or_else(|| Error::msg("Count query produced no row"))??;
    let total = row
        .get_column("TOTAL")
        .ok_or_else(|| Error::msg("Count query produced no TOTAL column"))?;
    let total = i64::try_from_value(total.clone()).context("Reading the TOTAL column")?;
    Ok(total.max(0) as u64)
}

fn mysql_limit_page_sql(sql: &str, page: &Page) -> String {
    let mut u64_buffer = itoa::Buffer::new();
    let mut u32_buffer = itoa::Buffer::new();
    let mut out = String::with_capacity(sql.len() + 32);
    out.push_str(sql);
    out.push_str(" LIMIT ");
    out.push_str(u64_buffer.format(page.offset()));
    out.push(',');
    out.push_str(u32_buffer.format(page.page_size()));
    out
}

/// Deep offset rewrite for multi table MySQL queries: page over the driving
/// table's primary key in a subquery and join the original query back onto
/// the selected key window.
async fn mysql_join_page_sql<Exec: Executor>(
    executor: &mut Exec,
    sql: &str,
    page: &Page,
) -> Result<String> {
    let table_set = table_set_from_sql(sql)?;
    let driving = match find_keyword(table_set, "JOIN") {
        Some(i) => &table_set[..i],
        None => table_set,
    };
    let driving = driving.split(',').next().unwrap_or(driving).trim();
    let (table, alias, aliased) = match driving.rsplit_once(' ') {
        Some((table, alias)) => (table.trim(), alias.trim(), true),
        None => (driving, "t1", false),
    };
    let pk = executor
        .primary_key_of(table)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::msg(format!("Table `{table}` reports no primary key")))?;
    let mut select_set = select_set_from_sql(sql)?.to_owned();
    if !aliased {
        // No alias in the original text, qualify the select list with ours.
        let columns = select_set
            .split(',')
            .map(|column| column.trim().to_owned())
            .collect::<Vec<_>>();
        select_set.clear();
        separated_by(
            &mut select_set,
            columns,
            |out, column| {
                out.push_str(alias);
                out.push('.');
                out.push_str(&column);
            },
            ", ",
        );
    }
    let from = find_keyword(sql, "FROM")
        .ok_or_else(|| Error::msg(format!("No FROM clause in `{sql}`")))?;
    // Strip the driving table's alias inside the subquery so the key scan
    // runs on the bare table.
    let inner_from = if aliased {
        sql[from..].replacen(&format!("{table} {alias}"), table, 1)
    } else {
        sql[from..].to_owned()
    };
    let mut u64_buffer = itoa::Buffer::new();
    let mut u32_buffer = itoa::Buffer::new();
    Ok(format!(
        "SELECT {select_set} FROM {table} {alias} JOIN (SELECT {pk} AS id {inner_from} LIMIT {},{}) t2 ON t2.id = {alias}.{pk}",
        u64_buffer.format(page.offset()),
        u32_buffer.format(page.page_size()),
    ))
}

/// Double ROWNUM wrap: the inner bound cuts the scan, the outer keeps the
/// requested window.
fn oracle_page_sql(sql: &str, page: &Page) -> String {
    let low = page.offset() + 1;
    let high = low + page.page_size() as u64;
    format!(
        "SELECT * FROM (SELECT U.*, ROWNUM r FROM ({sql}) U WHERE ROWNUM < {high}) WHERE r >= {low}"
    )
}
