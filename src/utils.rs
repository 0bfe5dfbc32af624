use crate::config::{MAX_HOLD_TIME_MS, MIN_HOLD_TIME_MS};

/// Current wall-clock time in milliseconds.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Current wall-clock time as an ISO-8601 string, for solve records.
pub fn iso_now() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

/// Generic numeric input validation
pub fn validate_numeric_input<T>(
    input: &str,
    min: Option<T>,
    max: Option<T>,
    field_name: &str,
) -> Result<T, String>
where
    T: std::str::FromStr + std::fmt::Display + PartialOrd,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    match trimmed.parse::<T>() {
        Ok(val) => {
            if let Some(min_val) = min {
                if val < min_val {
                    return Err(format!("{} must be at least {}", field_name, min_val));
                }
            }
            if let Some(max_val) = max {
                if val > max_val {
                    return Err(format!("{} cannot exceed {}", field_name, max_val));
                }
            }
            Ok(val)
        }
        Err(_) => Err(format!("{} must be a valid number", field_name)),
    }
}

/// Validate the hold-time setting (milliseconds).
pub fn validate_hold_time(input: &str) -> Result<u32, String> {
    validate_numeric_input(input, Some(MIN_HOLD_TIME_MS), Some(MAX_HOLD_TIME_MS), "Hold time")
}
