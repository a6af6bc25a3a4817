use super::Widget;
use crate::config::WidgetConfig;
use crate::core::{Value, WidgetResult};

/// Boolean fields.
///
/// Anything in the true-value set cleans to `true`; every other cell,
/// including blanks and unrelated text, cleans to `false`.
pub struct BooleanWidget {
    true_values: Vec<Value>,
    false_value: String,
}

impl BooleanWidget {
    pub fn new() -> Self {
        Self::from_config(&WidgetConfig::default())
    }

    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            true_values: config.true_values.clone(),
            false_value: config.false_value.clone(),
        }
    }

    fn is_true(&self, raw: &Value) -> bool {
        if self.true_values.contains(raw) {
            return true;
        }
        // 1.0 from a numeric cell and a native bool both match integer tokens
        match raw {
            Value::Float(_) => raw
                .as_i64()
                .is_some_and(|i| self.true_values.contains(&Value::Integer(i))),
            Value::Boolean(b) => self.true_values.contains(&Value::Integer(i64::from(*b))),
            _ => false,
        }
    }
}

impl Default for BooleanWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for BooleanWidget {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn clean(&self, raw: &Value) -> WidgetResult<Value> {
        Ok(Value::Boolean(self.is_true(raw)))
    }

    fn render(&self, value: &Value) -> WidgetResult<String> {
        if value.is_blank() {
            return Ok(self.false_value.clone());
        }
        Ok(self
            .true_values
            .first()
            .map(Value::to_string)
            .unwrap_or_else(|| "1".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        let widget = BooleanWidget::new();
        assert_eq!(widget.clean(&Value::from("1")).unwrap(), Value::Boolean(true));
        assert_eq!(widget.clean(&Value::Integer(1)).unwrap(), Value::Boolean(true));
        assert_eq!(widget.clean(&Value::Float(1.0)).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_clean_native_bool() {
        let widget = BooleanWidget::new();
        assert_eq!(widget.clean(&Value::Boolean(true)).unwrap(), Value::Boolean(true));
        assert_eq!(widget.clean(&Value::Boolean(false)).unwrap(), Value::Boolean(false));

        let words = BooleanWidget::from_config(
            &WidgetConfig::new().true_values(vec![Value::from("yes")]).false_value("no"),
        );
        assert_eq!(words.clean(&Value::Boolean(true)).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_clean_everything_else_is_false() {
        let widget = BooleanWidget::new();
        for raw in [
            Value::from("0"),
            Value::from("true"),
            Value::from("yes"),
            Value::from(""),
            Value::Integer(2),
            Value::Null,
        ] {
            assert_eq!(widget.clean(&raw).unwrap(), Value::Boolean(false), "{:?}", raw);
        }
    }

    #[test]
    fn test_render() {
        let widget = BooleanWidget::new();
        assert_eq!(widget.render(&Value::Boolean(true)).unwrap(), "1");
        assert_eq!(widget.render(&Value::Boolean(false)).unwrap(), "0");
        assert_eq!(widget.render(&Value::Null).unwrap(), "0");
    }

    #[test]
    fn test_custom_tokens() {
        let config = WidgetConfig::new()
            .true_values(vec![Value::from("yes"), Value::from("y")])
            .false_value("no");
        let widget = BooleanWidget::from_config(&config);

        assert_eq!(widget.clean(&Value::from("y")).unwrap(), Value::Boolean(true));
        assert_eq!(widget.clean(&Value::from("1")).unwrap(), Value::Boolean(false));
        assert_eq!(widget.render(&Value::Boolean(true)).unwrap(), "yes");
        assert_eq!(widget.render(&Value::Boolean(false)).unwrap(), "no");
    }
}
