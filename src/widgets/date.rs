use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use super::Widget;
use crate::core::{Value, WidgetError, WidgetResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Converts a spreadsheet serial date (days since 1899-12-30, fraction is
/// time of day) into a datetime.
///
/// The epoch sits one day before 1900-01-00 so that serials after the
/// spreadsheet's phantom 1900-02-29 land on the right calendar day.
/// The fraction resolves to whole microseconds, rounding half to even.
pub fn from_spreadsheet_serial(days: f64) -> WidgetResult<NaiveDateTime> {
    let out_of_range = || WidgetError::SerialDateOutOfRange(days);

    let seconds = SECONDS_PER_DAY * days;
    // Beyond this chrono cannot represent the result anyway
    if !seconds.is_finite() || seconds.abs() >= 1e15 {
        return Err(out_of_range());
    }

    let whole = seconds.trunc();
    let micros = ((seconds - whole) * 1e6).round_ties_even();

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(out_of_range)?;
    let offset = TimeDelta::try_seconds(whole as i64)
        .and_then(|delta| delta.checked_add(&TimeDelta::microseconds(micros as i64)))
        .ok_or_else(out_of_range)?;

    epoch.checked_add_signed(offset).ok_or_else(out_of_range)
}

fn serial_days(raw: &Value) -> Option<f64> {
    match raw {
        Value::Float(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn format_with<T: std::fmt::Display>(formatted: T, format: &str) -> WidgetResult<String> {
    let mut out = String::new();
    write!(out, "{}", formatted).map_err(|_| WidgetError::InvalidDate {
        value: String::new(),
        format: format.to_string(),
    })?;
    Ok(out)
}

/// Date fields. Takes an optional `strftime` format, `%Y-%m-%d` by default.
pub struct DateWidget {
    format: String,
}

impl DateWidget {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }
}

impl Default for DateWidget {
    fn default() -> Self {
        Self::new("%Y-%m-%d")
    }
}

impl Widget for DateWidget {
    fn name(&self) -> &'static str {
        "date"
    }

    fn clean(&self, raw: &Value) -> WidgetResult<Value> {
        if raw.is_blank() {
            return Ok(Value::Null);
        }
        if let Some(days) = serial_days(raw) {
            return Ok(Value::Date(from_spreadsheet_serial(days)?.date()));
        }

        match raw {
            Value::Text(s) => NaiveDate::parse_from_str(s, &self.format)
                .map(Value::Date)
                .map_err(|_| WidgetError::InvalidDate {
                    value: s.clone(),
                    format: self.format.clone(),
                }),
            Value::Date(_) => Ok(raw.clone()),
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            other => Err(WidgetError::TypeMismatch {
                expected: "DATE",
                got: other.type_name(),
            }),
        }
    }

    fn render(&self, value: &Value) -> WidgetResult<String> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Date(d) => format_with(d.format(&self.format), &self.format),
            Value::DateTime(dt) => format_with(dt.date().format(&self.format), &self.format),
            other => Err(WidgetError::TypeMismatch {
                expected: "DATE",
                got: other.type_name(),
            }),
        }
    }
}

/// Datetime fields. Like [`DateWidget`] but keeps the time of day;
/// the default format is `%Y-%m-%d %H:%M:%S`.
pub struct DateTimeWidget {
    format: String,
}

impl DateTimeWidget {
    pub fn new(format: &str) -> Self {
        Self {
            format: format.to_string(),
        }
    }
}

impl Default for DateTimeWidget {
    fn default() -> Self {
        Self::new("%Y-%m-%d %H:%M:%S")
    }
}

impl Widget for DateTimeWidget {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn clean(&self, raw: &Value) -> WidgetResult<Value> {
        if raw.is_blank() {
            return Ok(Value::Null);
        }
        if let Some(days) = serial_days(raw) {
            return Ok(Value::DateTime(from_spreadsheet_serial(days)?));
        }

        match raw {
            Value::Text(s) => NaiveDateTime::parse_from_str(s, &self.format)
                .map(Value::DateTime)
                .map_err(|_| WidgetError::InvalidDateTime {
                    value: s.clone(),
                    format: self.format.clone(),
                }),
            Value::DateTime(_) => Ok(raw.clone()),
            other => Err(WidgetError::TypeMismatch {
                expected: "DATETIME",
                got: other.type_name(),
            }),
        }
    }

    fn render(&self, value: &Value) -> WidgetResult<String> {
        match value {
            Value::Null => Ok(String::new()),
            Value::DateTime(dt) => format_with(dt.format(&self.format), &self.format),
            other => Err(WidgetError::TypeMismatch {
                expected: "DATETIME",
                got: other.type_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_serial_epoch() {
        let dt = from_spreadsheet_serial(0.0).unwrap();
        assert_eq!(dt, date(1899, 12, 30).and_hms_opt(0, 0, 0).unwrap());

        let dt = from_spreadsheet_serial(1.5).unwrap();
        assert_eq!(dt, date(1899, 12, 31).and_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_serial_out_of_range() {
        assert!(from_spreadsheet_serial(f64::NAN).is_err());
        assert!(from_spreadsheet_serial(1e300).is_err());
    }

    #[test]
    fn test_date_default_format() {
        let widget = DateWidget::default();
        let value = widget.clean(&Value::from("2012-08-13")).unwrap();
        assert_eq!(value, Value::Date(date(2012, 8, 13)));
        assert_eq!(widget.render(&value).unwrap(), "2012-08-13");
    }

    #[test]
    fn test_date_mismatch() {
        let widget = DateWidget::new("%d.%m.%Y");
        let err = widget.clean(&Value::from("2012-08-13")).unwrap_err();
        assert!(matches!(err, WidgetError::InvalidDate { .. }));
    }

    #[test]
    fn test_date_blank() {
        assert_eq!(DateWidget::default().clean(&Value::from("")).unwrap(), Value::Null);
        assert_eq!(DateTimeWidget::default().clean(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_datetime_default_format() {
        let widget = DateTimeWidget::default();
        let value = widget.clean(&Value::from("2012-08-13 08:13:32")).unwrap();
        assert_eq!(widget.render(&value).unwrap(), "2012-08-13 08:13:32");
    }

    #[test]
    fn test_render_wrong_type() {
        let err = DateTimeWidget::default().render(&Value::from("x")).unwrap_err();
        assert!(matches!(err, WidgetError::TypeMismatch { .. }));
    }
}
