//! Account rules: registration fields, password strength, school classes.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

/// Usernames: letters, digits and `@ . + - _`.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9@.+_-]+$").expect("valid regex"));

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_NAME_LENGTH: usize = 150;

/// Minimum password length enforced on registration and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// School classes a student profile can belong to.
pub const CLASS_CHOICES: &[&str] = &[
    "8a", "8b", "8v", "9a", "9b", "9v", "10a", "10b", "10v", "11a", "11b", "11v", "12a", "12b",
];

pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(format!(
            "Username must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters"
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username may contain only letters, digits and @/./+/-/_ characters".to_string(),
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(format!("Invalid email address '{email}'"))
    }
}

/// First and last names are required on registration.
pub fn validate_person_name(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate password strength.
///
/// At least [`MIN_PASSWORD_LENGTH`] characters, not purely numeric, and not
/// the same as the username (case-insensitive).
pub fn validate_password_strength(password: &str, username: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric".to_string());
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        return Err("Password is too similar to the username".to_string());
    }
    Ok(())
}

/// The password and its confirmation must match.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), String> {
    if password == confirmation {
        Ok(())
    } else {
        Err("Passwords do not match".to_string())
    }
}

pub fn validate_class_name(class_name: &str) -> Result<(), String> {
    if CLASS_CHOICES.contains(&class_name) {
        Ok(())
    } else {
        Err(format!(
            "Invalid class '{class_name}'. Must be one of: {}",
            CLASS_CHOICES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(validate_username("ivan.petrov").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"u".repeat(151)).is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("student@school.bg").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn names_required() {
        assert!(validate_person_name("First name", "").is_err());
        assert!(validate_person_name("First name", "Maria").is_ok());
    }

    #[test]
    fn password_too_short() {
        let err = validate_password_strength("short1", "user").unwrap_err();
        assert!(err.contains("at least 8 characters"));
    }

    #[test]
    fn password_all_digits() {
        assert!(validate_password_strength("12345678", "user").is_err());
    }

    #[test]
    fn password_equal_to_username() {
        assert!(validate_password_strength("Student01", "student01").is_err());
    }

    #[test]
    fn password_ok() {
        assert!(validate_password_strength("correct-horse", "student01").is_ok());
    }

    #[test]
    fn confirmation_mismatch() {
        assert!(validate_password_confirmation("abc", "abd").is_err());
        assert!(validate_password_confirmation("abc", "abc").is_ok());
    }

    #[test]
    fn class_choices() {
        assert!(validate_class_name("10b").is_ok());
        assert!(validate_class_name("13a").is_err());
        assert!(validate_class_name("staffroom").is_err());
    }
}
