use crate::{
    Executor, Page, Result, Schema, Value, builder, materialize, paginate::paginate,
    registry::descriptor_of,
};
use std::future::Future;

/// A struct mapped to one table.
///
/// Implementors only declare their [`Schema`]; every operation below is
/// provided on top of it. The descriptor built from the schema is cached per
/// type for the process lifetime.
pub trait Entity: Sized + Send + Sync + 'static {
    fn schema() -> Schema<Self>;

    /// All rows matching `condition`, a free form fragment that may carry
    /// WHERE predicates plus trailing GROUP BY / ORDER BY / LIMIT clauses.
    /// Positional `?` markers bind to `params` left to right.
    fn find_all<Exec: Executor>(
        executor: &mut Exec,
        condition: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<Self>>> + Send {
        async move {
            let statement = builder::select_all::<Self>(condition, params)?;
            materialize::collect(executor.fetch(statement)).await
        }
    }

    /// First row matching `condition`, if any.
    fn find_one<Exec: Executor>(
        executor: &mut Exec,
        condition: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Option<Self>>> + Send {
        async move {
            Ok(Self::find_all(executor, condition, params)
                .await?
                .into_iter()
                .next())
        }
    }

    /// Lookup by primary key. A NULL id short circuits to no result instead
    /// of selecting the whole table.
    fn find_by_id<Exec: Executor>(
        executor: &mut Exec,
        id: Value,
    ) -> impl Future<Output = Result<Option<Self>>> + Send {
        async move {
            if id.is_null() {
                return Ok(None);
            }
            let statement = builder::select_by_id::<Self>(&id)?;
            let entities = materialize::collect(executor.fetch(statement)).await?;
            Ok(entities.into_iter().next())
        }
    }

    /// One page of rows matching `condition`. Runs the live count, rewrites
    /// the query for the backend's paging dialect and fetches the window;
    /// `page` comes back with totals and navigation state filled in.
    fn find_page<Exec: Executor>(
        executor: &mut Exec,
        page: &mut Page,
        condition: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<Self>>> + Send {
        async move {
            let mut statement = builder::select_all::<Self>(condition, params)?;
            paginate(executor, &mut statement, page).await?;
            materialize::collect(executor.fetch(statement)).await
        }
    }

    /// Inserts one row. When the entity's id is unset and the backend
    /// reports a generated key, the key is written back into the entity.
    fn insert_one<Exec: Executor>(
        executor: &mut Exec,
        entity: &mut Self,
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let descriptor = descriptor_of::<Self>()?;
            let id = descriptor.id_binding();
            let unset = (id.get)(entity).is_null();
            let statement = builder::insert_one(&*entity)?;
            let affected = executor.execute(statement).await?;
            if unset {
                if let Some(key) = affected.last_affected_id {
                    (id.set)(entity, Value::Int64(Some(key)))?;
                }
            }
            Ok(affected.rows_affected)
        }
    }

    /// Inserts all entities in a single multi row statement. An empty slice
    /// is a no-op. Generated keys are not reported back for batches.
    fn insert_many<Exec: Executor>(
        executor: &mut Exec,
        entities: &[Self],
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let Some(statement) = builder::insert_many(entities)? else {
                return Ok(0);
            };
            let affected = executor.execute(statement).await?;
            Ok(affected.rows_affected)
        }
    }

    /// Deletes the row keyed by the entity's id.
    fn delete_one<Exec: Executor>(
        executor: &mut Exec,
        entity: &Self,
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let statement = builder::delete_one(entity)?;
            let affected = executor.execute(statement).await?;
            Ok(affected.rows_affected)
        }
    }

    /// Updates the row keyed by the entity's id, skipping NULL and empty
    /// string columns.
    fn update<Exec: Executor>(
        executor: &mut Exec,
        entity: &Self,
    ) -> impl Future<Output = Result<u64>> + Send {
        Self::update_one(executor, entity, true, true)
    }

    /// Updates the row keyed by the entity's id. `ignore_null` and
    /// `ignore_empty` control which current values are skipped from the SET
    /// list; skipping everything is an error.
    fn update_one<Exec: Executor>(
        executor: &mut Exec,
        entity: &Self,
        ignore_null: bool,
        ignore_empty: bool,
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let statement = builder::update_one(entity, ignore_null, ignore_empty)?;
            let affected = executor.execute(statement).await?;
            Ok(affected.rows_affected)
        }
    }

    /// Updates each entity in turn, returning the summed affected count.
    fn update_many<Exec: Executor>(
        executor: &mut Exec,
        entities: &[Self],
        ignore_null: bool,
        ignore_empty: bool,
    ) -> impl Future<Output = Result<u64>> + Send {
        async move {
            let mut total = 0;
            for entity in entities {
                total += Self::update_one(executor, entity, ignore_null, ignore_empty).await?;
            }
            Ok(total)
        }
    }
}
