use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ImpexError, Result, Value, WidgetError, WidgetResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Integer,
    Decimal,
    Text,
    Boolean,
    Date,
    DateTime,
    ForeignKey,
    ManyToMany,
}

impl FieldKind {
    /// Converts a raw cell into the field's native comparable value,
    /// without any widget configuration. Used for related-model keys.
    pub fn to_native(&self, raw: &Value) -> WidgetResult<Value> {
        if raw.is_null() {
            return Ok(Value::Null);
        }

        match (self, raw) {
            (Self::Integer, Value::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| WidgetError::InvalidInteger(s.clone())),
            (Self::Integer, v) => v
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| WidgetError::InvalidInteger(v.to_string())),

            (Self::Decimal, Value::Text(s)) => Decimal::from_str(s.trim())
                .map(Value::Decimal)
                .map_err(|_| WidgetError::InvalidDecimal(s.clone())),
            (Self::Decimal, Value::Integer(i)) => Ok(Value::Decimal(Decimal::from(*i))),
            (Self::Decimal, Value::Float(f)) => Decimal::try_from(*f)
                .map(Value::Decimal)
                .map_err(|_| WidgetError::InvalidDecimal(f.to_string())),

            (Self::Text, Value::Text(_)) => Ok(raw.clone()),
            (Self::Text, v) => Ok(Value::Text(v.to_string())),

            (Self::Boolean, Value::Boolean(_)) => Ok(raw.clone()),
            (Self::Boolean, Value::Text(s)) => match s.as_str() {
                "1" | "true" | "True" | "t" => Ok(Value::Boolean(true)),
                "0" | "false" | "False" | "f" => Ok(Value::Boolean(false)),
                _ => Err(WidgetError::TypeMismatch {
                    expected: "BOOLEAN",
                    got: "TEXT",
                }),
            },
            (Self::Boolean, Value::Integer(i)) => Ok(Value::Boolean(*i != 0)),

            (Self::Date, Value::Text(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| WidgetError::InvalidDate {
                    value: s.clone(),
                    format: "%Y-%m-%d".into(),
                }),
            (Self::Date, Value::DateTime(dt)) => Ok(Value::Date(dt.date())),

            (Self::DateTime, Value::Text(s)) => {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
                    .map(Value::DateTime)
                    .map_err(|_| WidgetError::InvalidDateTime {
                        value: s.clone(),
                        format: "%Y-%m-%d %H:%M:%S".into(),
                    })
            }

            // Relations compare on the related key as given
            (Self::ForeignKey | Self::ManyToMany, Value::Entity(e)) => Ok(e.pk().clone()),
            (Self::ForeignKey | Self::ManyToMany, _) => Ok(raw.clone()),

            (kind, v) if kind.accepts(v) => Ok(v.clone()),
            (kind, v) => Err(WidgetError::TypeMismatch {
                expected: kind.type_name(),
                got: v.type_name(),
            }),
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Decimal, Value::Decimal(_))
                | (Self::Date, Value::Date(_))
                | (Self::DateTime, Value::DateTime(_))
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Decimal => "DECIMAL",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::DateTime => "DATETIME",
            Self::ForeignKey => "FOREIGN KEY",
            Self::ManyToMany => "MANY TO MANY",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Target of a relational field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedModel {
    pub model: String,
    /// Attribute of the related entity that the field stores
    pub to_field: String,
    /// Kind of `to_field`, used to coerce raw keys before querying
    pub key_kind: FieldKind,
}

impl RelatedModel {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            to_field: "id".to_string(),
            key_kind: FieldKind::Integer,
        }
    }

    pub fn to_field(mut self, to_field: impl Into<String>, key_kind: FieldKind) -> Self {
        self.to_field = to_field.into();
        self.key_kind = key_kind;
        self
    }
}

/// Read-only metadata describing one attribute of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub max_digits: Option<u32>,
    pub decimal_places: Option<u32>,
    pub related: Option<RelatedModel>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            max_digits: None,
            decimal_places: None,
            related: None,
        }
    }

    pub fn decimal(name: impl Into<String>, max_digits: u32, decimal_places: u32) -> Self {
        let mut field = Self::new(name, FieldKind::Decimal);
        field.max_digits = Some(max_digits);
        field.decimal_places = Some(decimal_places);
        field
    }

    pub fn foreign_key(name: impl Into<String>, related: RelatedModel) -> Self {
        let mut field = Self::new(name, FieldKind::ForeignKey);
        field.related = Some(related);
        field
    }

    pub fn many_to_many(name: impl Into<String>, related: RelatedModel) -> Self {
        let mut field = Self::new(name, FieldKind::ManyToMany);
        field.related = Some(related);
        field
    }
}

/// Backing model metadata: name, primary key and field descriptors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMeta {
    name: String,
    pk_field: String,
    fields: Vec<FieldDescriptor>,
}

impl ModelMeta {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            pk_field: "id".to_string(),
            fields,
        }
    }

    pub fn pk_field(mut self, pk_field: impl Into<String>) -> Self {
        self.pk_field = pk_field.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pk_name(&self) -> &str {
        &self.pk_field
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get_field(&self, name: &str) -> Result<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ImpexError::UnknownField(name.to_string(), self.name.clone()))
    }

    /// Blank instance used as the target of a new-record import.
    pub fn new_entity(&self) -> Entity {
        Entity::new(self.name.clone(), self.pk_field.clone(), Value::Null)
    }
}

/// A persisted record, addressed by its primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    model: String,
    pk_field: String,
    pk: Value,
    attributes: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(
        model: impl Into<String>,
        pk_field: impl Into<String>,
        pk: impl Into<Value>,
    ) -> Self {
        Self {
            model: model.into(),
            pk_field: pk_field.into(),
            pk: pk.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn pk(&self) -> &Value {
        &self.pk
    }

    /// Attribute lookup; `pk` and the primary key's own name both resolve
    /// to the primary key.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if name == "pk" || name == self.pk_field {
            return Some(&self.pk);
        }
        self.attributes.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if name == "pk" || name == self.pk_field {
            self.pk = value.into();
        } else {
            self.attributes.insert(name, value.into());
        }
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pk)
    }
}

/// One record of a dataset: ordered column name -> raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    index: usize,
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new(index: usize, cells: Vec<(String, Value)>) -> Self {
        Self { index, cells }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    pub fn require(&self, column: &str) -> Result<&Value> {
        self.get(column)
            .ok_or_else(|| ImpexError::UnknownColumn(column.to_string(), self.index))
    }

    pub fn cells(&self) -> &[(String, Value)] {
        &self.cells
    }
}

/// Ordered rows sharing one column schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    headers: Vec<String>,
    data: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            data: Vec::new(),
        }
    }

    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut dataset = Self::new(headers);
        for row in rows {
            dataset.append(row)?;
        }
        Ok(dataset)
    }

    pub fn append(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.headers.len() {
            return Err(ImpexError::RowWidth {
                expected: self.headers.len(),
                got: values.len(),
            });
        }
        self.data.push(values);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.data.iter().enumerate().map(|(index, values)| {
            let cells = self.headers.iter().cloned().zip(values.iter().cloned()).collect();
            Row::new(index, cells)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_pk_aliases() {
        let mut author = Entity::new("Author", "id", 1i64).with("name", "Foo");
        assert_eq!(author.get("pk"), Some(&Value::Integer(1)));
        assert_eq!(author.get("id"), Some(&Value::Integer(1)));
        assert_eq!(author.get("name"), Some(&Value::from("Foo")));

        author.set("pk", 7i64);
        assert_eq!(author.pk(), &Value::Integer(7));
    }

    #[test]
    fn test_dataset_rows_keep_order_and_index() {
        let dataset = Dataset::with_rows(
            vec!["id".into(), "name".into()],
            vec![
                vec![Value::from("1"), Value::from("a")],
                vec![Value::from("2"), Value::from("b")],
            ],
        )
        .unwrap();

        let rows: Vec<Row> = dataset.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].index(), 1);
        assert_eq!(rows[1].get("name"), Some(&Value::from("b")));
        assert_eq!(rows[0].cells()[0].0, "id");
    }

    #[test]
    fn test_dataset_rejects_ragged_row() {
        let mut dataset = Dataset::new(vec!["id".into()]);
        let err = dataset.append(vec![Value::Null, Value::Null]).unwrap_err();
        assert!(matches!(err, ImpexError::RowWidth { expected: 1, got: 2 }));
    }

    #[test]
    fn test_to_native_integer() {
        let kind = FieldKind::Integer;
        assert_eq!(kind.to_native(&Value::from(" 42 ")).unwrap(), Value::Integer(42));
        assert!(kind.to_native(&Value::from("x")).is_err());
    }

    #[test]
    fn test_model_meta_unknown_field() {
        let meta = ModelMeta::new("Book", vec![FieldDescriptor::new("name", FieldKind::Text)]);
        assert!(meta.get_field("name").is_ok());
        assert!(matches!(meta.get_field("isbn"), Err(ImpexError::UnknownField(_, _))));
    }
}
