//! Everything an import pipeline usually needs in one `use`.

pub use crate::config::WidgetConfig;
pub use crate::core::{
    Dataset, Entity, FieldDescriptor, FieldKind, ImpexError, ModelMeta, RelatedModel, Row, Value,
};
pub use crate::loaders::InstanceLoader;
pub use crate::resource::{LoaderStrategy, Resource};
pub use crate::storage::{InMemoryRepository, Repository};
pub use crate::widgets::Widget;
