//! Contact-form validation.

use crate::accounts::validate_email;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_MESSAGE_LENGTH: usize = 5_000;

/// Validate a contact-form submission.
pub fn validate_submission(name: &str, email: &str, message: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        ));
    }
    validate_email(email)?;
    if message.trim().is_empty() {
        return Err("Message cannot be empty".to_string());
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_submission() {
        assert!(validate_submission("Ana", "ana@example.com", "Hello!").is_ok());
    }

    #[test]
    fn invalid_fields() {
        assert!(validate_submission("", "ana@example.com", "Hi").is_err());
        assert!(validate_submission("Ana", "nope", "Hi").is_err());
        assert!(validate_submission("Ana", "ana@example.com", " ").is_err());
        assert!(validate_submission("Ana", "ana@example.com", &"m".repeat(5_001)).is_err());
    }
}
