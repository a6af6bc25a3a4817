use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};

use super::InstanceLoader;
use crate::core::{Dataset, Entity, ImpexError, Result, Row, Value};
use crate::resource::{Field, Resource};

/// Loads every instance the dataset can refer to with a single query, then
/// answers `get_instance` from memory.
///
/// Only works with exactly one import id field. The prefetched map is not
/// refreshed: records changed by another writer after construction are
/// served stale for the rest of the run.
///
/// A row whose identity cell fails to convert is left out of the bulk query;
/// its conversion error surfaces when that row is looked up.
pub struct CachedInstanceLoader<'a> {
    pk_field: &'a Field,
    all_instances: HashMap<Value, Entity>,
}

impl<'a> CachedInstanceLoader<'a> {
    pub fn new(resource: &'a Resource, dataset: &Dataset) -> Result<Self> {
        let id_fields = resource.get_import_id_fields();
        if id_fields.len() != 1 {
            return Err(ImpexError::CachedLoaderIdentity {
                count: id_fields.len(),
            });
        }
        let pk_field = resource.field(&id_fields[0])?;

        let mut ids: Vec<Value> = Vec::new();
        let mut seen: HashSet<Value> = HashSet::new();
        for row in dataset.rows() {
            if row.require(pk_field.column_name())?.is_blank() {
                continue;
            }
            match pk_field.clean(&row) {
                Ok(id) => {
                    if !id.is_blank() && seen.insert(id.clone()) {
                        ids.push(id);
                    }
                }
                Err(err) => debug!("Skipping row {} while prefetching: {}", row.index(), err),
            }
        }

        let model = resource.model().name();
        let instances = resource
            .repository()
            .filter_in(model, pk_field.attribute(), &ids)?;

        let mut all_instances = HashMap::with_capacity(instances.len());
        for instance in instances {
            match all_instances.entry(pk_field.get_value(&instance)) {
                Entry::Vacant(slot) => {
                    slot.insert(instance);
                }
                Entry::Occupied(slot) => {
                    warn!(
                        "{} records share {}={}; keeping the first",
                        model,
                        pk_field.attribute(),
                        slot.key()
                    );
                }
            }
        }

        info!(
            "Prefetched {} {} instances for {} rows ({} distinct keys)",
            all_instances.len(),
            model,
            dataset.len(),
            ids.len()
        );

        Ok(Self {
            pk_field,
            all_instances,
        })
    }

    pub fn len(&self) -> usize {
        self.all_instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_instances.is_empty()
    }
}

impl InstanceLoader for CachedInstanceLoader<'_> {
    fn get_instance(&self, row: &Row) -> Result<Option<Entity>> {
        if row.require(self.pk_field.column_name())?.is_blank() {
            return Ok(None);
        }
        let id = self.pk_field.clean(row)?;
        Ok(self.all_instances.get(&id).cloned())
    }
}
