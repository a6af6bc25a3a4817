use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::Widget;
use crate::core::{FieldDescriptor, Value, WidgetError, WidgetResult};

/// Exact decimal fields.
///
/// Renders with the field's precision: at least `max_digits` characters
/// wide, right-aligned, with exactly `decimal_places` fractional digits.
pub struct DecimalWidget {
    max_digits: Option<u32>,
    decimal_places: Option<u32>,
}

impl DecimalWidget {
    pub fn new(field: &FieldDescriptor) -> Self {
        Self {
            max_digits: field.max_digits,
            decimal_places: field.decimal_places,
        }
    }

    /// Widget without configured precision; renders values as stored.
    pub fn unbounded() -> Self {
        Self {
            max_digits: None,
            decimal_places: None,
        }
    }

    fn parse(text: &str) -> WidgetResult<Decimal> {
        let trimmed = text.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| WidgetError::InvalidDecimal(text.to_string()))
    }
}

impl Widget for DecimalWidget {
    fn name(&self) -> &'static str {
        "decimal"
    }

    fn clean(&self, raw: &Value) -> WidgetResult<Value> {
        if raw.is_blank() {
            return Ok(Value::Null);
        }

        let decimal = match raw {
            Value::Decimal(d) => *d,
            Value::Text(s) => Self::parse(s)?,
            Value::Integer(i) => Decimal::from(*i),
            Value::Float(f) => {
                Decimal::try_from(*f).map_err(|_| WidgetError::InvalidDecimal(f.to_string()))?
            }
            other => return Err(WidgetError::InvalidDecimal(other.to_string())),
        };
        Ok(Value::Decimal(decimal))
    }

    fn render(&self, value: &Value) -> WidgetResult<String> {
        let decimal = match value {
            Value::Null => return Ok(String::new()),
            Value::Decimal(d) => *d,
            Value::Integer(i) => Decimal::from(*i),
            other => {
                return Err(WidgetError::TypeMismatch {
                    expected: "DECIMAL",
                    got: other.type_name(),
                });
            }
        };

        let Some(places) = self.decimal_places else {
            return Ok(decimal.to_string());
        };

        let rounded = decimal.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven);
        let digits = format!("{:.*}", places as usize, rounded);
        let width = self.max_digits.unwrap_or(0) as usize;
        Ok(format!("{:>width$}", digits, width = width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> DecimalWidget {
        DecimalWidget::new(&FieldDescriptor::decimal("price", 5, 2))
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_clean() {
        let widget = DecimalWidget::unbounded();
        assert_eq!(widget.clean(&Value::from("11.111")).unwrap(), Value::Decimal(dec("11.111")));
        assert_eq!(widget.clean(&Value::from("")).unwrap(), Value::Null);
        assert_eq!(widget.clean(&Value::Integer(4)).unwrap(), Value::Decimal(dec("4")));
    }

    #[test]
    fn test_clean_invalid() {
        let err = widget().clean(&Value::from("1.2.3")).unwrap_err();
        assert_eq!(err, WidgetError::InvalidDecimal("1.2.3".into()));
    }

    #[test]
    fn test_render_uses_field_precision() {
        let widget = widget();
        assert_eq!(widget.render(&Value::Decimal(dec("1.5"))).unwrap(), " 1.50");
        assert_eq!(widget.render(&Value::Decimal(dec("123.456"))).unwrap(), "123.46");
        assert_eq!(widget.render(&Value::Decimal(dec("0.125"))).unwrap(), " 0.12");
        assert_eq!(widget.render(&Value::Null).unwrap(), "");
    }

    #[test]
    fn test_render_without_precision() {
        let widget = DecimalWidget::unbounded();
        assert_eq!(widget.render(&Value::Decimal(dec("11.111"))).unwrap(), "11.111");
    }

    #[test]
    fn test_clean_render_clean_keeps_value() {
        let widget = widget();
        let cleaned = widget.clean(&Value::from("42.10")).unwrap();
        let rendered = widget.render(&cleaned).unwrap();
        assert_eq!(widget.clean(&Value::from(rendered.as_str())).unwrap(), cleaned);
    }
}
