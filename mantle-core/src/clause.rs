use crate::{Error, Result};

/// Targeted clause surgery over caller supplied SQL fragments.
///
/// This is deliberately not a SQL parser: keywords are located by a single
/// left to right scan that honours single quoted literals and parenthesis
/// depth, nothing more. Fragments with keywords hidden in exotic positions
/// are a documented caller responsibility.

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offset of the first top level, word bounded, case insensitive
/// occurrence of `keyword` in `sql`. Occurrences inside quoted literals or
/// parenthesized groups are skipped.
pub fn find_keyword(sql: &str, keyword: &str) -> Option<usize> {
    let bytes = sql.as_bytes();
    let kw = keyword.as_bytes();
    let mut depth = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'\'' {
                    i += 1;
                }
                i += 1;
                continue;
            }
            b'(' => {
                depth += 1;
                i += 1;
                continue;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
                continue;
            }
            _ => {}
        }
        if depth == 0
            && i + kw.len() <= bytes.len()
            && bytes[i..i + kw.len()].eq_ignore_ascii_case(kw)
            && (i == 0 || !is_word(bytes[i - 1]))
            && (i + kw.len() == bytes.len() || !is_word(bytes[i + kw.len()]))
        {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Splits `sql` at `keyword`, returning the head and the tail including the
/// keyword itself, when present.
pub fn split_off_clause<'a>(sql: &'a str, keyword: &str) -> (&'a str, Option<&'a str>) {
    match find_keyword(sql, keyword) {
        Some(i) => (&sql[..i], Some(&sql[i..])),
        None => (sql, None),
    }
}

fn contains_top_level(sql: &str, target: u8) -> bool {
    let bytes = sql.as_bytes();
    let mut depth = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'\'' {
                    i += 1;
                }
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b if b == target && depth == 0 => return true,
            _ => {}
        }
        i += 1;
    }
    false
}

/// Collapses every run of whitespace into a single space.
pub fn collapse_blanks(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First word of the statement, used to route the raw statement path.
pub fn leading_keyword(sql: &str) -> &str {
    sql.trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or("")
}

/// The table set between FROM and the first trailing clause keyword.
pub fn table_set_from_sql(sql: &str) -> Result<&str> {
    let from = find_keyword(sql, "FROM")
        .ok_or_else(|| Error::msg(format!("No FROM clause in `{sql}`")))?;
    let rest = &sql[from + "FROM".len()..];
    let mut end = rest.len();
    for keyword in ["WHERE", "GROUP BY", "ORDER BY", "LIMIT"] {
        if let Some(i) = find_keyword(rest, keyword) {
            end = end.min(i);
        }
    }
    Ok(rest[..end].trim())
}

/// The select list between the leading SELECT and FROM.
pub fn select_set_from_sql(sql: &str) -> Result<&str> {
    let select = find_keyword(sql, "SELECT")
        .ok_or_else(|| Error::msg(format!("No SELECT keyword in `{sql}`")))?;
    let from = find_keyword(sql, "FROM")
        .ok_or_else(|| Error::msg(format!("No FROM clause in `{sql}`")))?;
    Ok(sql[select + "SELECT".len()..from].trim())
}

/// Whether the statement selects from more than one table, either through an
/// explicit JOIN or a comma list in the FROM clause.
pub fn is_join_query(sql: &str) -> bool {
    if find_keyword(sql, "JOIN").is_some() {
        return true;
    }
    table_set_from_sql(sql).is_ok_and(|set| contains_top_level(set, b','))
}
