use log::debug;

use super::InstanceLoader;
use crate::core::{Entity, ImpexError, Result, Row, Value};
use crate::resource::Resource;

/// Looks each row up with its own query on the import id fields.
pub struct ModelInstanceLoader<'a> {
    resource: &'a Resource,
}

impl<'a> ModelInstanceLoader<'a> {
    pub fn new(resource: &'a Resource) -> Self {
        Self { resource }
    }

    /// Cleaned lookup params for `row`, or `None` if any identity cell is blank.
    ///
    /// Identity cells go through the field's widget, the same conversion
    /// the cached loader keys its prefetched map with.
    fn lookup_params(&self, row: &Row) -> Result<Option<Vec<(String, Value)>>> {
        let mut params = Vec::with_capacity(self.resource.get_import_id_fields().len());

        for name in self.resource.get_import_id_fields() {
            let field = self.resource.field(name)?;
            let raw = row.require(field.column_name())?;
            if raw.is_blank() {
                debug!("Row {}: blank '{}', treating as new", row.index(), field.column_name());
                return Ok(None);
            }

            params.push((field.attribute().to_string(), field.clean(row)?));
        }
        Ok(Some(params))
    }
}

impl InstanceLoader for ModelInstanceLoader<'_> {
    fn get_instance(&self, row: &Row) -> Result<Option<Entity>> {
        let Some(params) = self.lookup_params(row)? else {
            return Ok(None);
        };
        self.resource
            .repository()
            .get(self.resource.model().name(), &params)
            .map_err(|source| ImpexError::Lookup {
                row: row.index(),
                source: Box::new(source),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::WidgetConfig;
    use crate::core::{FieldDescriptor, FieldKind, ModelMeta};
    use crate::storage::InMemoryRepository;

    fn setup() -> (Arc<InMemoryRepository>, Resource) {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert(Entity::new("Book", "id", 1i64).with("name", "Dune").with("edition", 1i64))
            .unwrap();
        repo.insert(Entity::new("Book", "id", 2i64).with("name", "Dune").with("edition", 2i64))
            .unwrap();

        let model = ModelMeta::new(
            "Book",
            vec![
                FieldDescriptor::new("id", FieldKind::Integer),
                FieldDescriptor::new("name", FieldKind::Text),
                FieldDescriptor::new("edition", FieldKind::Integer),
            ],
        );
        let resource = Resource::new(model, repo.clone(), &WidgetConfig::default()).unwrap();
        (repo, resource)
    }

    #[test]
    fn test_blank_identity_skips_query() {
        let (repo, resource) = setup();
        let loader = ModelInstanceLoader::new(&resource);
        let row = Row::new(0, vec![("id".into(), Value::from(""))]);

        assert_eq!(loader.get_instance(&row).unwrap(), None);
        assert_eq!(repo.query_count(), 0);
    }

    #[test]
    fn test_compound_identity() {
        let (_, resource) = setup();
        let resource = resource.import_id_fields(&["name", "edition"]);
        let loader = ModelInstanceLoader::new(&resource);
        let row = Row::new(
            0,
            vec![("name".into(), Value::from("Dune")), ("edition".into(), Value::from("2"))],
        );

        let found = loader.get_instance(&row).unwrap().unwrap();
        assert_eq!(found.pk(), &Value::Integer(2));
    }

    #[test]
    fn test_ambiguous_identity_is_error() {
        let (_, resource) = setup();
        let resource = resource.import_id_fields(&["name"]);
        let loader = ModelInstanceLoader::new(&resource);
        let row = Row::new(5, vec![("name".into(), Value::from("Dune"))]);

        match loader.get_instance(&row).unwrap_err() {
            ImpexError::Lookup { row, source } => {
                assert_eq!(row, 5);
                assert!(matches!(*source, ImpexError::MultipleObjectsReturned { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_identity_carries_row() {
        let (_, resource) = setup();
        let loader = ModelInstanceLoader::new(&resource);
        let row = Row::new(9, vec![("id".into(), Value::from("one"))]);

        let err = loader.get_instance(&row).unwrap_err();
        assert!(matches!(err, ImpexError::Conversion { row: 9, .. }));
    }
}
