//! Instance loaders
//!
//! Resolve an import row to the existing record it should update, or to
//! `None` when the row describes a new record. Loaders never create
//! records.

mod cached;
mod model;

pub use cached::CachedInstanceLoader;
pub use model::ModelInstanceLoader;

use crate::core::{Entity, Result, Row};

pub trait InstanceLoader {
    /// The existing entity `row` refers to, if any. Not finding one is not
    /// an error.
    fn get_instance(&self, row: &Row) -> Result<Option<Entity>>;
}
