use thiserror::Error;

use super::Value;

/// Conversion failure raised by a single widget.
///
/// Widgets know nothing about rows, so these carry only the offending raw
/// value. `Field::clean` lifts them into [`ImpexError::Conversion`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WidgetError {
    #[error("Invalid integer literal: '{0}'")]
    InvalidInteger(String),

    #[error("Invalid decimal literal: '{0}'")]
    InvalidDecimal(String),

    #[error("Date '{value}' does not match format '{format}'")]
    InvalidDate { value: String, format: String },

    #[error("Datetime '{value}' does not match format '{format}'")]
    InvalidDateTime { value: String, format: String },

    #[error("Spreadsheet serial date out of range: {0}")]
    SerialDateOutOfRange(f64),

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: &'static str, got: &'static str },

    #[error("{model} matching {to_field}={key} does not exist")]
    RelatedNotFound {
        model: String,
        to_field: String,
        key: String,
    },

    #[error("Multiple {model} records match {to_field}={key}")]
    AmbiguousRelated {
        model: String,
        to_field: String,
        key: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type WidgetResult<T> = std::result::Result<T, WidgetError>;

#[derive(Error, Debug)]
pub enum ImpexError {
    #[error("Row {row}, field '{field}', value '{raw}': {source}")]
    Conversion {
        row: usize,
        field: String,
        raw: Value,
        #[source]
        source: WidgetError,
    },

    #[error("Field '{field}', value '{value}': {source}")]
    Render {
        field: String,
        value: Value,
        #[source]
        source: WidgetError,
    },

    #[error("Multiple {model} records matched {params}")]
    MultipleObjectsReturned { model: String, params: String },

    #[error("Row {row}: {source}")]
    Lookup {
        row: usize,
        #[source]
        source: Box<ImpexError>,
    },

    #[error("Cached instance loader requires exactly one import id field, got {count}")]
    CachedLoaderIdentity { count: usize },

    #[error("Field '{0}' not found on model '{1}'")]
    UnknownField(String, String),

    #[error("Column '{0}' not found in row {1}")]
    UnknownColumn(String, usize),

    #[error("Row has {got} values, dataset has {expected} columns")]
    RowWidth { expected: usize, got: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, ImpexError>;

impl<T> From<std::sync::PoisonError<T>> for ImpexError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<ImpexError> for WidgetError {
    fn from(err: ImpexError) -> Self {
        WidgetError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_carries_context() {
        let err = ImpexError::Conversion {
            row: 3,
            field: "price".into(),
            raw: Value::from("abc"),
            source: WidgetError::InvalidDecimal("abc".into()),
        };

        let msg = err.to_string();
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("price"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_poison_error_maps_to_lock_error() {
        let lock = std::sync::Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _guard = lock.lock().unwrap();
            panic!("poison");
        });

        let err: ImpexError = lock.lock().unwrap_err().into();
        assert!(matches!(err, ImpexError::LockError(_)));
    }
}
