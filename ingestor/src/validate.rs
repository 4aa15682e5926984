use crate::errors::{Error, Result};
use crate::model::{IngestForm, NewReading};
use tracing::debug;

pub const MISSING_PARAMETERS: &str = "Missing parameters.";
pub const INVALID_PARAMETERS: &str = "Invalid parameters.";

const DEFAULT_ALERT: i32 = 0;

/// Validates a posted form and turns it into a reading
pub fn validate(form: IngestForm) -> Result<NewReading> {
    let device_id = required(form.device_id)?;
    let temperature = required(form.temperature)?;
    let humidity = required(form.humidity)?;

    Ok(NewReading {
        device_id,
        temperature: parse_measurement("temperature", &temperature)?,
        humidity: parse_measurement("humidity", &humidity)?,
        alert: parse_alert(form.alert.as_deref()),
    })
}

fn required(value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::Validation(MISSING_PARAMETERS.to_string())),
    }
}

fn parse_measurement(field: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => {
            debug!("Rejecting {} value {:?}", field, raw);
            Err(Error::Validation(INVALID_PARAMETERS.to_string()))
        }
    }
}

/// Alert is never rejected; anything that is not an integer counts as 0.
fn parse_alert(raw: Option<&str>) -> i32 {
    match raw {
        None => DEFAULT_ALERT,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            debug!("Coercing alert value {:?} to {}", v, DEFAULT_ALERT);
            DEFAULT_ALERT
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(device_id: &str, temperature: &str, humidity: &str) -> IngestForm {
        IngestForm {
            device_id: Some(device_id.to_string()),
            temperature: Some(temperature.to_string()),
            humidity: Some(humidity.to_string()),
            alert: None,
        }
    }

    fn assert_validation(result: Result<NewReading>, expected: &str) {
        match result {
            Err(Error::Validation(msg)) => assert_eq!(msg, expected),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_reading() {
        let reading = validate(form("sensor1", "25.5", "60")).unwrap();

        assert_eq!(reading.device_id, "sensor1");
        assert_eq!(reading.temperature, 25.5);
        assert_eq!(reading.humidity, 60.0);
        assert_eq!(reading.alert, 0);
    }

    #[test]
    fn test_missing_device_id() {
        let mut f = form("sensor1", "25.5", "60");
        f.device_id = None;
        assert_validation(validate(f), MISSING_PARAMETERS);
    }

    #[test]
    fn test_empty_fields_count_as_missing() {
        assert_validation(validate(form("", "25.5", "60")), MISSING_PARAMETERS);
        assert_validation(validate(form("sensor1", "", "60")), MISSING_PARAMETERS);
        assert_validation(validate(form("sensor1", "25.5", "")), MISSING_PARAMETERS);
    }

    #[test]
    fn test_empty_form() {
        assert_validation(validate(IngestForm::default()), MISSING_PARAMETERS);
    }

    #[test]
    fn test_non_numeric_measurement() {
        assert_validation(validate(form("sensor1", "warm", "60")), INVALID_PARAMETERS);
        assert_validation(validate(form("sensor1", "25.5", "NaN")), INVALID_PARAMETERS);
    }

    #[test]
    fn test_measurements_not_range_checked() {
        let reading = validate(form("sensor1", "-273.5", "150")).unwrap();
        assert_eq!(reading.temperature, -273.5);
        assert_eq!(reading.humidity, 150.0);
    }

    #[test]
    fn test_alert_passed_through() {
        let mut f = form("sensor1", "25.5", "60");
        f.alert = Some("1".to_string());
        assert_eq!(validate(f).unwrap().alert, 1);
    }

    #[test]
    fn test_malformed_alert_coerced() {
        for raw in ["", "yes", "1.5"] {
            let mut f = form("sensor1", "25.5", "60");
            f.alert = Some(raw.to_string());
            assert_eq!(validate(f).unwrap().alert, 0, "alert {:?}", raw);
        }
    }
}
