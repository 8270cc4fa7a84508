//! Input validation shared by the service operations

use super::ServiceError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USERNAME_LENGTH: usize = 150;
const MAX_NAME_LENGTH: usize = 255;
const MAX_EMAIL_LENGTH: usize = 254;

/// Usernames: 3-150 chars of letters, digits and `@.+-_`
pub fn username(value: &str) -> Result<(), ServiceError> {
    let len = value.chars().count();
    if len < 3 {
        return Err(ServiceError::invalid_field("username", "Username must be at least 3 characters"));
    }
    if len > MAX_USERNAME_LENGTH {
        return Err(ServiceError::invalid_field("username", "Username must be at most 150 characters"));
    }
    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(ServiceError::invalid_field(
            "username",
            "Username may contain only letters, numbers, and @/./+/-/_ characters",
        ));
    }
    Ok(())
}

pub fn password(value: &str) -> Result<(), ServiceError> {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::invalid_field(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ServiceError> {
    let invalid = || ServiceError::invalid_field("email", "Enter a valid email address");

    if value.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ServiceError::invalid_field(
            "email",
            "Ensure this field has no more than 254 characters",
        ));
    }

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Absolute http(s) URL
pub fn url(field: &'static str, value: &str) -> Result<(), ServiceError> {
    match ::url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => Ok(()),
        _ => Err(ServiceError::invalid_field(field, "Enter a valid URL")),
    }
}

/// Trim and require a non-empty value, returning the trimmed text
pub fn required_text(field: &'static str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::invalid_field(field, "This field may not be blank"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ServiceError::invalid_field(field, "Ensure this field has no more than 255 characters"));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Optional text bounded like `required_text`; blank collapses to `None`
pub fn optional_name(field: &'static str, value: Option<String>) -> Result<Option<String>, ServiceError> {
    match optional_text(value) {
        Some(v) if v.chars().count() > MAX_NAME_LENGTH => Err(ServiceError::invalid_field(
            field,
            "Ensure this field has no more than 255 characters",
        )),
        other => Ok(other),
    }
}

/// Blank collapses to `None`; anything else must be a valid URL
pub fn optional_url(field: &'static str, value: Option<String>) -> Result<Option<String>, ServiceError> {
    match optional_text(value) {
        Some(v) => {
            url(field, &v)?;
            Ok(Some(v))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(username("dev.ops+1").is_ok());
        assert!(username("ab").is_err());
        assert!(username("has space").is_err());
        assert!(username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn emails() {
        assert!(email("dev@example.com").is_ok());
        assert!(email("dev@localhost").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("a@b@example.com").is_err());
        assert!(email("dev@example..com").is_err());
        assert!(email(&format!("{}@example.com", "a".repeat(300))).is_err());
        assert!(email(&format!("{}@example.com", "a".repeat(242))).is_ok());
    }

    #[test]
    fn urls() {
        assert!(url("website", "https://blitz.dev/profile").is_ok());
        assert!(url("website", "ftp://blitz.dev").is_err());
        assert!(url("website", "not a url").is_err());
    }

    #[test]
    fn optional_values_collapse_blank() {
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(optional_url("website", Some(String::new())).unwrap(), None);
        assert!(optional_url("website", Some("nope".to_string())).is_err());
    }

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text("title", "  Blitz  ").unwrap(), "Blitz");
        assert!(required_text("title", "   ").is_err());
    }

    #[test]
    fn optional_names_are_capped() {
        assert_eq!(optional_name("full_name", Some("  Ada  ".to_string())).unwrap().as_deref(), Some("Ada"));
        assert_eq!(optional_name("full_name", Some(" ".to_string())).unwrap(), None);
        assert_eq!(optional_name("location", Some("x".repeat(255))).unwrap().map(|v| v.len()), Some(255));
        let err = optional_name("location", Some("x".repeat(256))).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some("location"), .. }));
    }
}
