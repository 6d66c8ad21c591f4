use std::str::FromStr;

use crate::error::AppError;

const MAX_ID_LEN: usize = 100;

pub fn required<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Ok(raw),
        _ => Err(AppError::InvalidParameter(format!(
            "missing required parameter: {name}"
        ))),
    }
}

pub fn required_f64(name: &str, value: &Option<String>) -> Result<f64, AppError> {
    parse(name, required(name, value)?)
}

pub fn optional<T>(name: &str, value: &Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr,
{
    match value.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse(name, raw).map(Some),
        _ => Ok(None),
    }
}

pub fn scooter_id(value: &Option<String>) -> Result<&str, AppError> {
    let id = required("id", value)?;
    if id.chars().count() > MAX_ID_LEN {
        return Err(AppError::InvalidParameter(format!(
            "id must be at most {MAX_ID_LEN} characters"
        )));
    }
    Ok(id)
}

fn parse<T: FromStr>(name: &str, raw: &str) -> Result<T, AppError> {
    raw.parse::<T>().map_err(|_| {
        AppError::InvalidParameter(format!("parameter {name} has invalid value '{raw}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::{optional, required_f64, scooter_id};

    #[test]
    fn missing_and_blank_values_are_rejected() {
        assert!(required_f64("lat", &None).is_err());
        assert!(required_f64("lat", &Some("  ".to_string())).is_err());
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(required_f64("radius", &Some("far".to_string())).is_err());
        assert_eq!(required_f64("radius", &Some(" 12.5 ".to_string())).unwrap(), 12.5);
    }

    #[test]
    fn optional_values_parse_when_present() {
        assert_eq!(optional::<usize>("max_results", &None).unwrap(), None);
        assert_eq!(optional::<usize>("max_results", &Some("3".into())).unwrap(), Some(3));
        assert!(optional::<usize>("max_results", &Some("-1".into())).is_err());
        assert_eq!(optional::<bool>("include_reserved", &Some("true".into())).unwrap(), Some(true));
    }

    #[test]
    fn overlong_ids_are_rejected() {
        assert!(scooter_id(&Some("x".repeat(101))).is_err());
        assert_eq!(scooter_id(&Some(" 42 ".to_string())).unwrap(), "42");
    }
}
