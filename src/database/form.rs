use std::{collections::HashMap, str::FromStr};

use rust_decimal::Decimal;
use serde_json::Value;

use super::error::{ApiError, FieldErrors};

pub type FormData = HashMap<String, Value>;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const INVALID_STRING: &str = "Not a valid string.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_NUMBER: &str = "A valid number is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_BOOLEAN: &str = "Must be a valid boolean.";

#[derive(Debug, Clone, Copy)]
pub struct CharRules {
    pub required: bool,
    pub allow_blank: bool,
    pub trim: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl CharRules {
    pub const fn required(max_length: usize) -> Self {
        Self {
            required: true,
            allow_blank: false,
            trim: true,
            min_length: None,
            max_length: Some(max_length),
        }
    }

    pub const fn optional(max_length: Option<usize>) -> Self {
        Self {
            required: false,
            allow_blank: true,
            trim: true,
            min_length: None,
            max_length,
        }
    }

    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub const fn untrimmed(mut self) -> Self {
        self.trim = false;
        self
    }
}

/// A JSON request body plus the validation errors collected while reading it.
///
/// Each getter returns `None` when the key is absent or invalid; invalid values
/// record a message under the key. In partial mode absent required keys are
/// not an error, which is how PATCH requests are read.
pub struct Form {
    inner: FormData,
    partial: bool,
    errors: FieldErrors,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self {
            inner: data,
            partial: false,
            errors: FieldErrors::new(),
        }
    }

    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    pub fn add_error(&mut self, key: &str, message: impl Into<String>) {
        self.errors
            .entry(key.to_string())
            .or_default()
            .push(message.into());
    }

    /// Fails with every collected message, or succeeds if there were none.
    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }

    fn present(&mut self, key: &str, required: bool) -> Option<Value> {
        match self.inner.get(key) {
            Some(Value::Null) => {
                self.add_error(key, NOT_NULL);
                None
            }
            Some(value) => Some(value.to_owned()),
            None => {
                if required && !self.partial {
                    self.add_error(key, REQUIRED);
                }
                None
            }
        }
    }

    pub fn get_str(&mut self, key: &str, rules: CharRules) -> Option<String> {
        let value = self.present(key, rules.required)?;
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => {
                self.add_error(key, INVALID_STRING);
                return None;
            }
        };
        let value = if rules.trim {
            value.trim().to_string()
        } else {
            value
        };

        if value.is_empty() {
            if rules.allow_blank {
                return Some(value);
            }
            self.add_error(key, NOT_BLANK);
            return None;
        }

        let length = value.chars().count();
        if let Some(max) = rules.max_length {
            if length > max {
                self.add_error(
                    key,
                    format!("Ensure this field has no more than {max} characters."),
                );
                return None;
            }
        }
        if let Some(min) = rules.min_length {
            if length < min {
                self.add_error(key, format!("Ensure this field has at least {min} characters."));
                return None;
            }
        }

        Some(value)
    }

    pub fn get_email(&mut self, key: &str, rules: CharRules) -> Option<String> {
        let value = self.get_str(key, rules)?;
        if value.is_empty() && rules.allow_blank {
            return Some(value);
        }
        if !is_valid_email(&value) {
            self.add_error(key, INVALID_EMAIL);
            return None;
        }
        Some(value)
    }

    pub fn get_i32(&mut self, key: &str, required: bool) -> Option<i32> {
        let value = self.present(key, required)?;
        let parsed = match &value {
            Value::Number(n) => match n.as_i64() {
                Some(v) => Some(v),
                None => n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64),
            },
            Value::String(s) => strip_zero_fraction(s.trim()).parse::<i64>().ok(),
            _ => None,
        };

        let Some(parsed) = parsed else {
            self.add_error(key, INVALID_INTEGER);
            return None;
        };
        if parsed > i32::MAX as i64 {
            self.add_error(
                key,
                format!("Ensure this value is less than or equal to {}.", i32::MAX),
            );
            return None;
        }
        if parsed < i32::MIN as i64 {
            self.add_error(
                key,
                format!("Ensure this value is greater than or equal to {}.", i32::MIN),
            );
            return None;
        }

        Some(parsed as i32)
    }

    pub fn get_bool(&mut self, key: &str, required: bool) -> Option<bool> {
        let value = self.present(key, required)?;
        let parsed = match &value {
            Value::Bool(flag) => Some(*flag),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        };

        if parsed.is_none() {
            self.add_error(key, INVALID_BOOLEAN);
        }
        parsed
    }

    pub fn get_decimal(
        &mut self,
        key: &str,
        required: bool,
        max_digits: u32,
        decimal_places: u32,
    ) -> Option<Decimal> {
        let value = self.present(key, required)?;
        let parsed = match &value {
            Value::String(s) => Decimal::from_str(s.trim()).ok(),
            Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
            _ => None,
        };

        let Some(parsed) = parsed else {
            self.add_error(key, INVALID_NUMBER);
            return None;
        };

        if let Err(message) = check_digits(&parsed, max_digits, decimal_places) {
            self.add_error(key, message);
            return None;
        }

        Some(parsed)
    }
}

/// `"12.0"` and `"12."` read as `"12"`.
fn strip_zero_fraction(value: &str) -> &str {
    match value.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => whole,
        _ => value,
    }
}

/// Digit limits as a fixed-precision database column enforces them.
fn check_digits(value: &Decimal, max_digits: u32, decimal_places: u32) -> Result<(), String> {
    let digit_count = value.mantissa().unsigned_abs().to_string().len() as u32;
    let decimals = value.scale();
    let total = digit_count.max(decimals);
    let whole = total - decimals;

    if total > max_digits {
        return Err(format!(
            "Ensure that there are no more than {max_digits} digits in total."
        ));
    }
    if decimals > decimal_places {
        return Err(format!(
            "Ensure that there are no more than {decimal_places} decimal places."
        ));
    }
    if whole > max_digits - decimal_places {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            max_digits - decimal_places
        ));
    }
    Ok(())
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || !domain.contains('.') {
        return false;
    }
    domain
        .split('.')
        .all(|label| !label.is_empty() && label.chars().all(|c| c.is_alphanumeric() || c == '-'))
}
