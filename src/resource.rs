//! Resource mapping
//!
//! A [`Resource`] binds a model's field descriptors to dataset columns and
//! widgets, and names the import id fields used to match rows against
//! existing records.

use std::sync::Arc;

use log::debug;

use crate::config::WidgetConfig;
use crate::core::{Dataset, Entity, ImpexError, ModelMeta, Result, Row, Value};
use crate::loaders::{CachedInstanceLoader, InstanceLoader, ModelInstanceLoader};
use crate::storage::Repository;
use crate::widgets::{Widget, widget_for};

/// One mapped attribute: where it lives in a row, where it lives on the
/// entity, and how to convert between the two.
pub struct Field {
    column_name: String,
    attribute: String,
    widget: Box<dyn Widget>,
}

impl Field {
    pub fn new(
        column_name: impl Into<String>,
        attribute: impl Into<String>,
        widget: Box<dyn Widget>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            attribute: attribute.into(),
            widget,
        }
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn widget(&self) -> &dyn Widget {
        self.widget.as_ref()
    }

    /// Clean this field's cell out of `row`.
    pub fn clean(&self, row: &Row) -> Result<Value> {
        let raw = row.require(&self.column_name)?;
        self.widget
            .clean(raw)
            .map_err(|source| ImpexError::Conversion {
                row: row.index(),
                field: self.column_name.clone(),
                raw: raw.clone(),
                source,
            })
    }

    /// The entity's current value for this field.
    pub fn get_value(&self, entity: &Entity) -> Value {
        entity.get(&self.attribute).cloned().unwrap_or(Value::Null)
    }

    /// Clean the cell and assign it onto `entity`.
    pub fn save(&self, entity: &mut Entity, row: &Row) -> Result<()> {
        let value = self.clean(row)?;
        entity.set(self.attribute.clone(), value);
        Ok(())
    }

    /// Render this field of `entity` for export.
    pub fn export(&self, entity: &Entity) -> Result<String> {
        let value = self.get_value(entity);
        self.widget
            .render(&value)
            .map_err(|source| ImpexError::Render {
                field: self.column_name.clone(),
                value,
                source,
            })
    }
}

/// Which instance loader [`Resource::instance_loader`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderStrategy {
    /// One query per row
    #[default]
    Direct,
    /// One bulk query up front; requires a single import id field
    Cached,
}

pub struct Resource {
    model: ModelMeta,
    fields: Vec<Field>,
    import_id_fields: Vec<String>,
    strategy: LoaderStrategy,
    repository: Arc<dyn Repository>,
}

impl Resource {
    /// Map every field of `model` to a column of the same name, with the
    /// widget its kind calls for.
    pub fn new(
        model: ModelMeta,
        repository: Arc<dyn Repository>,
        config: &WidgetConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut fields = Vec::with_capacity(model.fields().len());
        for descriptor in model.fields() {
            let widget = widget_for(descriptor, config, &repository)?;
            fields.push(Field::new(descriptor.name.clone(), descriptor.name.clone(), widget));
        }
        debug!("Built resource for {} with {} fields", model.name(), fields.len());

        let import_id_fields = vec![model.pk_name().to_string()];
        Ok(Self {
            model,
            fields,
            import_id_fields,
            strategy: LoaderStrategy::default(),
            repository,
        })
    }

    /// Set the fields whose combined values identify an existing record
    pub fn import_id_fields(mut self, names: &[&str]) -> Self {
        self.import_id_fields = names.iter().map(|name| name.to_string()).collect();
        self
    }

    fn unknown_field(&self, attribute: &str) -> ImpexError {
        ImpexError::UnknownField(attribute.to_string(), self.model.name().to_string())
    }

    fn field_mut(&mut self, attribute: &str) -> Result<&mut Field> {
        let unknown = self.unknown_field(attribute);
        self.fields
            .iter_mut()
            .find(|f| f.attribute == attribute)
            .ok_or(unknown)
    }

    /// Read `attribute` from a differently named column
    pub fn column(mut self, attribute: &str, column_name: &str) -> Result<Self> {
        let field = self.field_mut(attribute)?;
        field.column_name = column_name.to_string();
        Ok(self)
    }

    /// Replace a field's widget
    pub fn widget(mut self, attribute: &str, widget: Box<dyn Widget>) -> Result<Self> {
        let field = self.field_mut(attribute)?;
        field.widget = widget;
        Ok(self)
    }

    pub fn loader(mut self, strategy: LoaderStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn model(&self) -> &ModelMeta {
        &self.model
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, attribute: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.attribute == attribute)
            .ok_or_else(|| self.unknown_field(attribute))
    }

    pub fn get_import_id_fields(&self) -> &[String] {
        &self.import_id_fields
    }

    /// Build the configured loader for one import run over `dataset`.
    pub fn instance_loader<'a>(
        &'a self,
        dataset: &Dataset,
    ) -> Result<Box<dyn InstanceLoader + 'a>> {
        let loader: Box<dyn InstanceLoader + 'a> = match self.strategy {
            LoaderStrategy::Direct => Box::new(ModelInstanceLoader::new(self)),
            LoaderStrategy::Cached => Box::new(CachedInstanceLoader::new(self, dataset)?),
        };
        Ok(loader)
    }

    /// Assign every field whose column is present in `row` onto `entity`.
    pub fn import_row(&self, row: &Row, entity: &mut Entity) -> Result<()> {
        for field in &self.fields {
            if row.get(&field.column_name).is_some() {
                field.save(entity, row)?;
            }
        }
        Ok(())
    }

    /// Column headers, in field order.
    pub fn export_headers(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.column_name.clone()).collect()
    }

    /// Render every field of `entity`, in field order.
    pub fn export_entity(&self, entity: &Entity) -> Result<Vec<String>> {
        self.fields.iter().map(|field| field.export(entity)).collect()
    }
}
