//! Assembly of entity CRUD statements from descriptor metadata.
//!
//! Every function returns a [`Statement`] with named `:placeholder` text and
//! the bindings already attached; nothing here touches a connection.

use crate::{
    CoreError, Entity, Param, Result, Statement, StatementKind, Value,
    clause::{collapse_blanks, split_off_clause},
    registry::descriptor_of,
    util::separated_by,
};

/// Whether `value` is the empty string, the second skip condition of the
/// update path.
pub(crate) fn is_empty_text(value: &Value) -> bool {
    matches!(value, Value::Varchar(Some(v)) if v.is_empty())
}

/// Rewrites every positional `?` outside single quoted literals into a named
/// `:pN` placeholder bound to `params[N]`. Missing positions bind NULL.
pub fn rewrite_placeholders(sql: &str, params: &[Value]) -> (String, Vec<Param>) {
    if !sql.contains('?') {
        return (sql.to_owned(), Vec::new());
    }
    let mut out = String::with_capacity(sql.len() + params.len() * 3);
    let mut bound = Vec::with_capacity(params.len());
    let mut in_quote = false;
    let mut position = 0usize;
    for c in sql.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                out.push(c);
            }
            '?' if !in_quote => {
                let name = format!("p{position}");
                out.push(':');
                out.push_str(&name);
                bound.push(Param {
                    name,
                    value: params.get(position).cloned().unwrap_or(Value::Null),
                });
                position += 1;
            }
            _ => out.push(c),
        }
    }
    (out, bound)
}

/// `SELECT * FROM table` plus an optional free form condition fragment.
///
/// The fragment may carry trailing LIMIT, ORDER BY and GROUP BY clauses
/// mixed with the predicate; they are peeled off and re-attached in valid
/// clause order, with the residue becoming the WHERE predicate. Positional
/// `?` markers anywhere in the fragment bind to `params` left to right.
pub fn select_all<E: Entity>(condition: &str, params: &[Value]) -> Result<Statement> {
    let descriptor = descriptor_of::<E>()?;
    let condition = collapse_blanks(condition);
    let (head, limit) = split_off_clause(&condition, "LIMIT");
    let (head, order_by) = split_off_clause(head, "ORDER BY");
    let (head, group_by) = split_off_clause(head, "GROUP BY");
    let predicate = head.trim();
    let mut sql = format!("SELECT * FROM {}", descriptor.table());
    if !predicate.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(predicate);
    }
    for clause in [group_by, order_by, limit].into_iter().flatten() {
        sql.push(' ');
        sql.push_str(clause.trim_end());
    }
    let (sql, bound) = rewrite_placeholders(&sql, params);
    let mut statement = Statement::new(StatementKind::Select, sql);
    statement.params = bound;
    Ok(statement)
}

/// `SELECT * FROM table WHERE id = :id`. A NULL or empty string id drops the
/// predicate and selects everything.
pub fn select_by_id<E: Entity>(id: &Value) -> Result<Statement> {
    let descriptor = descriptor_of::<E>()?;
    let binding = descriptor.id_binding();
    let mut sql = format!("SELECT * FROM {}", descriptor.table());
    if id.is_null() || is_empty_text(id) {
        return Ok(Statement::new(StatementKind::Select, sql));
    }
    sql.push_str(" WHERE ");
    sql.push_str(binding.column);
    sql.push_str(" = :");
    sql.push_str(binding.field);
    let mut statement = Statement::new(StatementKind::Select, sql);
    statement.bind(binding.field, id.clone());
    Ok(statement)
}

/// `INSERT INTO table (..) VALUES (..)` over the insertable columns. The id
/// column is never listed, the generated key comes back through
/// [`crate::RowsAffected`].
pub fn insert_one<E: Entity>(entity: &E) -> Result<Statement> {
    let descriptor = descriptor_of::<E>()?;
    let mut sql = format!("INSERT INTO {} (", descriptor.table());
    separated_by(
        &mut sql,
        descriptor.insert_bindings(),
        |out, binding| out.push_str(binding.column),
        ", ",
    );
    sql.push_str(") VALUES (");
    separated_by(
        &mut sql,
        descriptor.insert_bindings(),
        |out, binding| {
            out.push(':');
            out.push_str(binding.field);
        },
        ", ",
    );
    sql.push(')');
    let mut statement = Statement::new(StatementKind::Insert, sql);
    for binding in descriptor.insert_bindings() {
        statement.bind(binding.field, (binding.get)(entity));
    }
    Ok(statement)
}

/// Multi row `INSERT INTO table (..) VALUES (..), (..)`. Placeholder names
/// are prefixed per element (`:e0_name`, `:e1_name`). An empty slice yields
/// no statement.
pub fn insert_many<E: Entity>(entities: &[E]) -> Result<Option<Statement>> {
    if entities.is_empty() {
        return Ok(None);
    }
    let descriptor = descriptor_of::<E>()?;
    let mut sql = format!("INSERT INTO {} (", descriptor.table());
    separated_by(
        &mut sql,
        descriptor.insert_bindings(),
        |out, binding| out.push_str(binding.column),
        ", ",
    );
    sql.push_str(") VALUES ");
    separated_by(
        &mut sql,
        0..entities.len(),
        |out, i| {
            out.push('(');
            separated_by(
                out,
                descriptor.insert_bindings(),
                |out, binding| {
                    out.push_str(":e");
                    let mut buffer = itoa::Buffer::new();
                    out.push_str(buffer.format(i));
                    out.push('_');
                    out.push_str(binding.field);
                },
                ", ",
            );
            out.push(')');
        },
        ", ",
    );
    let mut statement = Statement::new(StatementKind::Insert, sql);
    for (i, entity) in entities.iter().enumerate() {
        for binding in descriptor.insert_bindings() {
            statement.bind(format!("e{}_{}", i, binding.field), (binding.get)(entity));
        }
    }
    Ok(Some(statement))
}

/// `DELETE FROM table WHERE id = :id`, keyed by the entity's current id.
pub fn delete_one<E: Entity>(entity: &E) -> Result<Statement> {
    let descriptor = descriptor_of::<E>()?;
    let binding = descriptor.id_binding();
    let sql = format!(
        "DELETE FROM {} WHERE {} = :{}",
        descriptor.table(),
        binding.column,
        binding.field
    );
    let mut statement = Statement::new(StatementKind::Delete, sql);
    statement.bind(binding.field, (binding.get)(entity));
    Ok(statement)
}

/// `UPDATE table SET .. WHERE id = :id`. Columns whose current value is
/// NULL (with `ignore_null`) or the empty string (with `ignore_empty`) are
/// left out of the SET list; an update that skips every column is an error
/// rather than invalid SQL.
pub fn update_one<E: Entity>(entity: &E, ignore_null: bool, ignore_empty: bool) -> Result<Statement> {
    let descriptor = descriptor_of::<E>()?;
    let assignments = descriptor
        .update_bindings()
        .map(|binding| (binding, (binding.get)(entity)))
        .filter(|(_, value)| {
            !(ignore_null && value.is_null()) && !(ignore_empty && is_empty_text(value))
        })
        .collect::<Vec<_>>();
    if assignments.is_empty() {
        return Err(CoreError::EmptyUpdate(descriptor.table().to_owned()).into());
    }
    let mut sql = format!("UPDATE {} SET ", descriptor.table());
    separated_by(
        &mut sql,
        assignments.iter(),
        |out, (binding, _)| {
            out.push_str(binding.column);
            out.push_str(" = :");
            out.push_str(binding.field);
        },
        ", ",
    );
    let id = descriptor.id_binding();
    sql.push_str(" WHERE ");
    sql.push_str(id.column);
    sql.push_str(" = :");
    sql.push_str(id.field);
    let mut statement = Statement::new(StatementKind::Update, sql);
    for (binding, value) in assignments {
        statement.bind(binding.field, value);
    }
    statement.bind(id.field, (id.get)(entity));
    Ok(statement)
}
