use std::borrow::Cow;
use validator::ValidationError;

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("is_required");
        error.message = Some(Cow::from("This field is required"));
        Err(error)
    } else {
        Ok(())
    }
}

// Slugs travel in URLs: ASCII letters, digits, hyphens and underscores only.
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_slug");
        error.message = Some(Cow::from("Slug may only contain letters, digits, '-' and '_'"));
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(validate_not_blank("hello").is_ok());
        let err = validate_not_blank("   ").unwrap_err();
        assert_eq!(err.code, "is_required");
    }

    #[test]
    fn slug_charset() {
        assert!(validate_slug("my-first_post-2021").is_ok());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("ünïcode").is_err());
        assert!(validate_slug("").is_err());
    }
}
