use crate::{Entity, EntityDescriptor, Result};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

static REGISTRY: LazyLock<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(Default::default);

/// Returns the cached descriptor for `E`, building it from the entity's
/// schema on first access.
///
/// The build runs outside any lock, concurrent first callers may each build
/// a descriptor but only one copy is inserted and the construction is side
/// effect free.
pub fn descriptor_of<E: Entity>() -> Result<Arc<EntityDescriptor<E>>> {
    let key = TypeId::of::<E>();
    {
        let map = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = map.get(&key) {
            return Ok(downcast(entry.clone()));
        }
    }
    let descriptor = Arc::new(EntityDescriptor::build(E::schema())?);
    let mut map = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    let entry = map
        .entry(key)
        .or_insert_with(|| descriptor as Arc<dyn Any + Send + Sync>);
    Ok(downcast(entry.clone()))
}

fn downcast<E: Entity>(entry: Arc<dyn Any + Send + Sync>) -> Arc<EntityDescriptor<E>> {
    match entry.downcast() {
        Ok(descriptor) => descriptor,
        // Entries are keyed by TypeId, the stored type always matches.
        Err(_) => unreachable!(),
    }
}
