use std::collections::HashSet;
use std::sync::Arc;

use log::warn;

use super::Widget;
use crate::core::{Entity, ImpexError, RelatedModel, Value, WidgetError, WidgetResult};
use crate::storage::Repository;

/// The related entity's `to_field` value, or the entity itself when the
/// attribute is unset.
fn related_key(entity: &Entity, to_field: &str) -> String {
    entity
        .get(to_field)
        .map(Value::to_string)
        .unwrap_or_else(|| entity.to_string())
}

/// Foreign key fields.
///
/// A cell holds the related entity's `to_field` value (its primary key by
/// default). `clean` resolves that key to the related entity, so `render`
/// always receives what `clean` produced.
pub struct ForeignKeyWidget {
    related: RelatedModel,
    repository: Arc<dyn Repository>,
}

impl ForeignKeyWidget {
    pub fn new(related: RelatedModel, repository: Arc<dyn Repository>) -> Self {
        Self { related, repository }
    }
}

impl Widget for ForeignKeyWidget {
    fn name(&self) -> &'static str {
        "foreign_key"
    }

    fn clean(&self, raw: &Value) -> WidgetResult<Value> {
        if raw.is_blank() {
            return Ok(Value::Null);
        }
        if let Value::Entity(_) = raw {
            return Ok(raw.clone());
        }

        let key = self.related.key_kind.to_native(raw)?;
        let params = [(self.related.to_field.clone(), key.clone())];

        match self.repository.get(&self.related.model, &params) {
            Ok(Some(entity)) => Ok(Value::from(entity)),
            Ok(None) => Err(WidgetError::RelatedNotFound {
                model: self.related.model.clone(),
                to_field: self.related.to_field.clone(),
                key: key.to_string(),
            }),
            Err(ImpexError::MultipleObjectsReturned { .. }) => Err(WidgetError::AmbiguousRelated {
                model: self.related.model.clone(),
                to_field: self.related.to_field.clone(),
                key: key.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn render(&self, value: &Value) -> WidgetResult<String> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Entity(entity) => Ok(related_key(entity, &self.related.to_field)),
            // An unresolved key renders as itself
            other => Ok(other.to_string()),
        }
    }
}

/// Many-to-many fields, exported as the separator-joined `to_field` values
/// of the related entities.
pub struct ManyToManyWidget {
    related: RelatedModel,
    repository: Arc<dyn Repository>,
    separator: String,
}

impl ManyToManyWidget {
    pub fn new(related: RelatedModel, repository: Arc<dyn Repository>) -> Self {
        Self {
            related,
            repository,
            separator: ",".to_string(),
        }
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    fn keys(&self, raw: &Value) -> WidgetResult<Vec<Value>> {
        let tokens: Vec<Value> = match raw {
            Value::Text(s) => s
                .split(self.separator.as_str())
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(Value::from)
                .collect(),
            Value::Integer(_) | Value::Float(_) => vec![raw.clone()],
            other => {
                return Err(WidgetError::TypeMismatch {
                    expected: "TEXT",
                    got: other.type_name(),
                });
            }
        };

        let mut keys = Vec::with_capacity(tokens.len());
        let mut seen = HashSet::with_capacity(tokens.len());
        for token in &tokens {
            let key = self.related.key_kind.to_native(token)?;
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

impl Widget for ManyToManyWidget {
    fn name(&self) -> &'static str {
        "many_to_many"
    }

    fn clean(&self, raw: &Value) -> WidgetResult<Value> {
        if raw.is_blank() {
            return Ok(Value::Entities(Vec::new()));
        }
        if let Value::Entities(_) = raw {
            return Ok(raw.clone());
        }

        let keys = self.keys(raw)?;
        let entities = self
            .repository
            .filter_in(&self.related.model, &self.related.to_field, &keys)?;

        if entities.len() < keys.len() {
            warn!(
                "{} of {} {} keys in '{}' matched nothing and were dropped",
                keys.len() - entities.len(),
                keys.len(),
                self.related.model,
                raw
            );
        }
        Ok(Value::Entities(entities))
    }

    fn render(&self, value: &Value) -> WidgetResult<String> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Entities(entities) => Ok(entities
                .iter()
                .map(|entity| related_key(entity, &self.related.to_field))
                .collect::<Vec<_>>()
                .join(&self.separator)),
            Value::Entity(entity) => Ok(related_key(entity, &self.related.to_field)),
            other => Err(WidgetError::TypeMismatch {
                expected: "ENTITIES",
                got: other.type_name(),
            }),
        }
    }
}
