use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;

use super::Repository;
use crate::core::{Entity, Result, Value};

/// In-process repository.
///
/// Keeps entities per model in insertion order and counts every query it
/// answers, so callers can verify how many round-trips an import made.
pub struct InMemoryRepository {
    models: RwLock<HashMap<String, Vec<Entity>>>,
    queries: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            queries: AtomicUsize::new(0),
        }
    }

    /// Insert or replace (by primary key) an entity.
    pub fn insert(&self, entity: Entity) -> Result<()> {
        let mut models = self.models.write()?;
        let rows = models.entry(entity.model().to_string()).or_default();

        match rows.iter_mut().find(|existing| existing.pk() == entity.pk()) {
            Some(existing) => *existing = entity,
            None => rows.push(entity),
        }
        Ok(())
    }

    pub fn remove(&self, model: &str, pk: &Value) -> Result<bool> {
        let mut models = self.models.write()?;
        let Some(rows) = models.get_mut(model) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|e| e.pk() != pk);
        Ok(rows.len() != before)
    }

    pub fn count(&self, model: &str) -> Result<usize> {
        let models = self.models.read()?;
        Ok(models.get(model).map_or(0, Vec::len))
    }

    /// Number of queries answered since creation or the last reset.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset_query_count(&self) {
        self.queries.store(0, Ordering::SeqCst);
    }

    fn scan<F>(&self, model: &str, predicate: F) -> Result<Vec<Entity>>
    where
        F: Fn(&Entity) -> bool,
    {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let models = self.models.read()?;
        Ok(models
            .get(model)
            .map(|rows| rows.iter().filter(|e| predicate(e)).cloned().collect())
            .unwrap_or_default())
    }
}

impl Repository for InMemoryRepository {
    fn filter(&self, model: &str, params: &[(String, Value)]) -> Result<Vec<Entity>> {
        debug!("filter {} where {}", model, super::engine::describe_params(params));
        self.scan(model, |entity| {
            params
                .iter()
                .all(|(name, value)| entity.get(name) == Some(value))
        })
    }

    fn filter_in(&self, model: &str, field: &str, keys: &[Value]) -> Result<Vec<Entity>> {
        debug!("filter {} where {} in ({} keys)", model, field, keys.len());
        self.scan(model, |entity| {
            entity.get(field).is_some_and(|value| keys.contains(value))
        })
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}
