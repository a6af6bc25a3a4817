//! Value widgets
//!
//! A widget converts between the raw cell value an import row carries and
//! the typed value a model field holds. Each field kind has its own
//! widget; [`widget_for`] picks one when a resource mapping is built, so
//! nothing dispatches on value types per row.
//!
//! - `text.rs` - identity clean, plain render
//! - `integer.rs`, `decimal.rs`, `boolean.rs` - scalar fields
//! - `date.rs` - dates and datetimes, including spreadsheet serial dates
//! - `relation.rs` - foreign key and many-to-many fields

mod boolean;
mod date;
mod decimal;
mod integer;
mod relation;
mod text;

pub use boolean::BooleanWidget;
pub use date::{DateTimeWidget, DateWidget, from_spreadsheet_serial};
pub use decimal::DecimalWidget;
pub use integer::IntegerWidget;
pub use relation::{ForeignKeyWidget, ManyToManyWidget};
pub use text::TextWidget;

use std::sync::Arc;

use crate::config::WidgetConfig;
use crate::core::{FieldDescriptor, FieldKind, ImpexError, Result, Value, WidgetResult};
use crate::storage::Repository;

/// Converter between an import/export cell and a field value.
///
/// `clean` and `render` take their input by reference and never modify
/// it or the field descriptor the widget was built from.
pub trait Widget: Send + Sync {
    /// Widget name for diagnostics
    fn name(&self) -> &'static str;

    /// Raw cell value -> typed field value
    fn clean(&self, raw: &Value) -> WidgetResult<Value> {
        Ok(raw.clone())
    }

    /// Typed field value -> export text
    fn render(&self, value: &Value) -> WidgetResult<String> {
        Ok(value.to_string())
    }
}

/// Build the widget for a field from its declared kind.
pub fn widget_for(
    field: &FieldDescriptor,
    config: &WidgetConfig,
    repository: &Arc<dyn Repository>,
) -> Result<Box<dyn Widget>> {
    let widget: Box<dyn Widget> = match field.kind {
        FieldKind::Integer => Box::new(IntegerWidget),
        FieldKind::Decimal => Box::new(DecimalWidget::new(field)),
        FieldKind::Text => Box::new(TextWidget),
        FieldKind::Boolean => Box::new(BooleanWidget::from_config(config)),
        FieldKind::Date => Box::new(DateWidget::new(&config.date_format)),
        FieldKind::DateTime => Box::new(DateTimeWidget::new(&config.datetime_format)),
        FieldKind::ForeignKey => {
            let related = field.related.clone().ok_or_else(|| missing_relation(field))?;
            Box::new(ForeignKeyWidget::new(related, Arc::clone(repository)))
        }
        FieldKind::ManyToMany => {
            let related = field.related.clone().ok_or_else(|| missing_relation(field))?;
            Box::new(
                ManyToManyWidget::new(related, Arc::clone(repository)).separator(&config.separator),
            )
        }
    };
    Ok(widget)
}

fn missing_relation(field: &FieldDescriptor) -> ImpexError {
    ImpexError::Config(format!(
        "{} field '{}' has no related model",
        field.kind, field.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RelatedModel;
    use crate::storage::InMemoryRepository;

    fn repository() -> Arc<dyn Repository> {
        Arc::new(InMemoryRepository::new())
    }

    #[test]
    fn test_factory_selects_by_kind() {
        let config = WidgetConfig::default();
        let repo = repository();

        let cases = [
            (FieldDescriptor::new("n", FieldKind::Integer), "integer"),
            (FieldDescriptor::decimal("p", 5, 2), "decimal"),
            (FieldDescriptor::new("t", FieldKind::Text), "text"),
            (FieldDescriptor::new("b", FieldKind::Boolean), "boolean"),
            (FieldDescriptor::new("d", FieldKind::Date), "date"),
            (FieldDescriptor::new("dt", FieldKind::DateTime), "datetime"),
            (
                FieldDescriptor::foreign_key("author", RelatedModel::new("Author")),
                "foreign_key",
            ),
            (
                FieldDescriptor::many_to_many("categories", RelatedModel::new("Category")),
                "many_to_many",
            ),
        ];

        for (field, expected) in cases {
            let widget = widget_for(&field, &config, &repo).unwrap();
            assert_eq!(widget.name(), expected);
        }
    }

    #[test]
    fn test_relation_without_target_is_config_error() {
        let field = FieldDescriptor::new("author", FieldKind::ForeignKey);
        let result = widget_for(&field, &WidgetConfig::default(), &repository());
        assert!(matches!(result, Err(ImpexError::Config(_))));
    }
}
