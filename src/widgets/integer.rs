use super::Widget;
use crate::core::{Value, WidgetError, WidgetResult};

pub struct IntegerWidget;

impl Widget for IntegerWidget {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn clean(&self, raw: &Value) -> WidgetResult<Value> {
        if raw.is_blank() {
            return Ok(Value::Null);
        }

        match raw {
            Value::Integer(_) => Ok(raw.clone()),
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| WidgetError::InvalidInteger(s.clone())),
            // Numeric cells truncate toward zero
            Value::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => {
                Ok(Value::Integer(f.trunc() as i64))
            }
            Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
            other => Err(WidgetError::InvalidInteger(other.to_string())),
        }
    }
}
