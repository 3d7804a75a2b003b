//! Turning labeled result rows back into entity values.

use crate::{
    CoreError, Entity, EntityDescriptor, Executor, Result, ResultShape, RowLabeled, Statement,
    Value, registry::descriptor_of,
};
use anyhow::Context;
use futures::{Stream, StreamExt};
use std::pin::pin;

/// What a SELECT's rows become on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTarget {
    /// Each row is constructed into an entity through its descriptor.
    Entity,
    /// Rows pass through labeled and untyped.
    Rows,
}

/// Entity materialization applies to mapper-inferred result shapes, or
/// whenever the caller opts in explicitly. Hand-shaped statements keep
/// their rows.
pub fn resolve_target(statement: &Statement, force_entity: bool) -> ResultTarget {
    if force_entity {
        return ResultTarget::Entity;
    }
    match statement.shape {
        ResultShape::Inferred => ResultTarget::Entity,
        ResultShape::Manual => ResultTarget::Rows,
    }
}

/// Builds one entity from `row`: fresh instance from the descriptor's
/// constructor, then every mapped column assigned through its binding.
///
/// A NULL cell lands as the declared type's zero fallback, so non optional
/// numeric fields read back as zero rather than failing. A string typed
/// field accepts any cell by rendering it to text.
pub fn from_row<E>(descriptor: &EntityDescriptor<E>, row: &RowLabeled) -> Result<E> {
    let mut entity = descriptor.new_entity();
    for binding in descriptor.mapped_bindings() {
        let raw = row
            .get_column(binding.column)
            .ok_or_else(|| CoreError::MissingColumn(binding.column.to_owned()))?;
        let value = coerce(&binding.value, raw);
        (binding.set)(&mut entity, value)
            .with_context(|| format!("Assigning column `{}`", binding.column))?;
    }
    Ok(entity)
}

fn coerce(prototype: &Value, raw: &Value) -> Value {
    if raw.is_null() {
        return prototype.zero_fallback();
    }
    if matches!(prototype, Value::Varchar(..)) && !matches!(raw, Value::Varchar(..)) {
        return Value::Varchar(Some(raw.render()));
    }
    raw.clone()
}

/// Drains `rows` into entities, stopping at the first failed row or
/// conversion.
pub async fn collect<E: Entity>(
    rows: impl Stream<Item = Result<RowLabeled>>,
) -> Result<Vec<E>> {
    let descriptor = descriptor_of::<E>()?;
    let mut rows = pin!(rows);
    let mut out = Vec::new();
    while let Some(row) = rows.next().await.transpose()? {
        out.push(from_row(&descriptor, &row)?);
    }
    Ok(out)
}

/// Runs a query and keeps the labeled rows as they are, the path taken by
/// hand-shaped statements.
pub async fn fetch_rows<Exec: Executor>(
    executor: &mut Exec,
    statement: Statement,
) -> Result<Vec<RowLabeled>> {
    let mut rows = pin!(executor.fetch(statement));
    let mut out = Vec::new();
    while let Some(row) = rows.next().await.transpose()? {
        out.push(row);
    }
    Ok(out)
}
