//! Per-type mapping cache.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use super::{Entity, SchemaResult, TableMapping};

static MAPPINGS: Lazy<DashMap<TypeId, Arc<TableMapping>>> = Lazy::new(DashMap::new);

/// The cached [`TableMapping`] for `T`, derived on first use.
pub fn mapping<T: Entity>() -> SchemaResult<Arc<TableMapping>> {
    let key = TypeId::of::<T>();
    if let Some(cached) = MAPPINGS.get(&key) {
        return Ok(Arc::clone(&cached));
    }
    let derived = Arc::new(TableMapping::from_descriptor(&T::descriptor())?);
    let entry = MAPPINGS.entry(key).or_insert(derived);
    Ok(Arc::clone(&entry))
}
