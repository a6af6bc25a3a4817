use crate::core::{ImpexError, Result, Value};

/// Widget configuration
///
/// Shared by every widget built for one resource mapping.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// `strftime` format for date cells
    pub date_format: String,

    /// `strftime` format for datetime cells
    pub datetime_format: String,

    /// Cell values that clean to `true`; the first one is what `true` renders as
    pub true_values: Vec<Value>,

    /// What `false` renders as
    pub false_value: String,

    /// Separator between keys of a many-to-many cell
    pub separator: String,
}

impl WidgetConfig {
    pub fn new() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            true_values: vec![Value::from("1"), Value::Integer(1)],
            false_value: "0".to_string(),
            separator: ",".to_string(),
        }
    }

    /// Set the date format
    pub fn date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Set the datetime format
    pub fn datetime_format(mut self, format: &str) -> Self {
        self.datetime_format = format.to_string();
        self
    }

    /// Replace the true-value set
    pub fn true_values(mut self, values: Vec<Value>) -> Self {
        self.true_values = values;
        self
    }

    /// Set the false token
    pub fn false_value(mut self, token: &str) -> Self {
        self.false_value = token.to_string();
        self
    }

    /// Set the many-to-many separator
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.date_format.is_empty() {
            return Err(ImpexError::Config("date_format cannot be empty".to_string()));
        }

        if self.datetime_format.is_empty() {
            return Err(ImpexError::Config("datetime_format cannot be empty".to_string()));
        }

        if self.true_values.is_empty() {
            return Err(ImpexError::Config("true_values cannot be empty".to_string()));
        }

        if self.separator.is_empty() {
            return Err(ImpexError::Config("separator cannot be empty".to_string()));
        }

        let false_token = Value::from(self.false_value.as_str());
        if self.true_values.contains(&false_token) {
            return Err(ImpexError::Config(format!(
                "'{}' cannot be both a true and a false token",
                self.false_value
            )));
        }

        Ok(())
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WidgetConfig::default();
        assert_eq!(config.date_format, "%Y-%m-%d");
        assert_eq!(config.datetime_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.true_values, vec![Value::from("1"), Value::Integer(1)]);
        assert_eq!(config.false_value, "0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = WidgetConfig::new()
            .date_format("%d.%m.%Y")
            .true_values(vec![Value::from("yes")])
            .false_value("no")
            .separator(";");

        assert_eq!(config.date_format, "%d.%m.%Y");
        assert_eq!(config.separator, ";");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(WidgetConfig::new().date_format("").validate().is_err());
        assert!(WidgetConfig::new().separator("").validate().is_err());
        assert!(WidgetConfig::new().true_values(vec![]).validate().is_err());
        assert!(WidgetConfig::new().false_value("1").validate().is_err());
    }
}
