use google_sheets4::api::ValueRange;
use serde_json::Value;

pub trait ValueRangeFactory {
    fn from_str<T: AsRef<str>>(s: T) -> Self;
    fn from_number(value: f64) -> Self;
}

impl ValueRangeFactory for ValueRange {
    fn from_str<T: AsRef<str>>(s: T) -> Self {
        ValueRange {
            major_dimension: None,
            range: None,
            values: Some(vec![vec![Value::String(s.as_ref().to_owned())]]),
        }
    }

    fn from_number(value: f64) -> Self {
        let cell = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        ValueRange {
            major_dimension: None,
            range: None,
            values: Some(vec![vec![cell]]),
        }
    }
}
