// ============================================================================
// RustImpex Library
// ============================================================================
//
// Conversion between tabular import/export cells and typed model values
// (widgets), and resolution of import rows to existing records (instance
// loaders).

pub mod config;
pub mod core;
pub mod loaders;
pub mod prelude;
pub mod resource;
pub mod storage;
pub mod widgets;

// Re-export main types for convenience
pub use crate::config::WidgetConfig;
pub use crate::core::{
    Dataset, Entity, FieldDescriptor, FieldKind, ImpexError, ModelMeta, RelatedModel, Result,
    Row, Value, WidgetError, WidgetResult,
};
pub use crate::loaders::{CachedInstanceLoader, InstanceLoader, ModelInstanceLoader};
pub use crate::resource::{Field, LoaderStrategy, Resource};
pub use crate::storage::{InMemoryRepository, Repository};
pub use crate::widgets::{Widget, widget_for};
