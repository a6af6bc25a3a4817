pub mod error;
pub mod types;
pub mod value;

pub use error::{ImpexError, Result, WidgetError, WidgetResult};
pub use types::{Dataset, Entity, FieldDescriptor, FieldKind, ModelMeta, RelatedModel, Row};
pub use value::Value;
