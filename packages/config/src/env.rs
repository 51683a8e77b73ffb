// ABOUTME: Environment variable parsing utilities
// ABOUTME: Lookup-based helpers so settings can be read from the process or from a test map

use std::fmt::Display;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};

/// Read a variable, treating blank values as unset
pub fn non_blank<F>(lookup: &F, var_name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var_name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable with validation, falling back to `default` when unset.
///
/// Unlike the lenient helpers used for ports elsewhere, a value that is set
/// but unparseable or rejected by `validator` is an error.
pub fn parse_or_default<T, F, V>(lookup: &F, var_name: &str, default: T, validator: V) -> ConfigResult<T>
where
    T: FromStr + Display,
    F: Fn(&str) -> Option<String>,
    V: Fn(&T) -> bool,
{
    let Some(raw_value) = non_blank(lookup, var_name) else {
        return Ok(default);
    };

    let parsed = raw_value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(var_name.to_string(), raw_value.clone()))?;

    if !validator(&parsed) {
        return Err(ConfigError::InvalidValue(var_name.to_string(), raw_value));
    }

    Ok(parsed)
}

/// Read a URL-valued variable, validating that it parses as an absolute URL
pub fn url_or_default<F>(lookup: &F, var_name: &str, default: &str) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = non_blank(lookup, var_name).unwrap_or_else(|| default.to_string());
    url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidValue(var_name.to_string(), format!("{} ({})", value, e)))?;
    Ok(value.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_parse_or_default_not_set() {
        let lookup = lookup_from(&[]);
        let result: u64 = parse_or_default(&lookup, "TEST_VAR", 42, |_| true).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_parse_or_default_set() {
        let lookup = lookup_from(&[("TEST_VAR", "100")]);
        let result: u64 = parse_or_default(&lookup, "TEST_VAR", 42, |_| true).unwrap();
        assert_eq!(result, 100);
    }

    #[test]
    fn test_parse_or_default_blank_is_unset() {
        let lookup = lookup_from(&[("TEST_VAR", "   ")]);
        let result: u64 = parse_or_default(&lookup, "TEST_VAR", 42, |_| true).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_parse_or_default_invalid() {
        let lookup = lookup_from(&[("TEST_VAR", "not_a_number")]);
        let result = parse_or_default::<u64, _, _>(&lookup, "TEST_VAR", 42, |_| true);
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue(
                "TEST_VAR".to_string(),
                "not_a_number".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_or_default_validation_fails() {
        let lookup = lookup_from(&[("TEST_VAR", "300")]);
        let result = parse_or_default::<u64, _, _>(&lookup, "TEST_VAR", 100, |v| *v <= 200);
        assert!(result.is_err());
    }

    #[test]
    fn test_url_or_default_strips_trailing_slash() {
        let lookup = lookup_from(&[("TEST_URL", "https://example.test/")]);
        let result = url_or_default(&lookup, "TEST_URL", "https://default.test").unwrap();
        assert_eq!(result, "https://example.test");
    }

    #[test]
    fn test_url_or_default_rejects_relative() {
        let lookup = lookup_from(&[("TEST_URL", "not a url")]);
        assert!(url_or_default(&lookup, "TEST_URL", "https://default.test").is_err());
    }
}
