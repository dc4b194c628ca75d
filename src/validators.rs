/// Input validators for account and catalog fields
///
/// Length limits mirror the column sizes in the migrations.

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

pub const MAX_USERNAME_LENGTH: usize = 80;
pub const MAX_EMAIL_LENGTH: usize = 120;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");

    static ref ISBN_REGEX: Regex = Regex::new(r"^(?:\d{9}[\dX]|\d{13})$").expect("isbn regex is valid");
}

/// Validates a username: trimmed, non-empty, bounded, no control characters
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    is_valid_text("username", username, MAX_USERNAME_LENGTH)
}

/// Validates a required free-text field such as an author name or book title
pub fn is_valid_text(field: &str, value: &str, max_length: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }

    if trimmed.chars().count() > max_length {
        return Err(ValidationError::TooLong(field.to_string(), max_length));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent(field.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates an email address
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates an ISBN-10 or ISBN-13 (digits only, hyphens stripped)
pub fn is_valid_isbn(isbn: &str) -> Result<String, ValidationError> {
    let normalized: String = isbn.trim().chars().filter(|c| *c != '-').collect();

    if !ISBN_REGEX.is_match(&normalized) {
        return Err(ValidationError::InvalidFormat("isbn".to_string()));
    }

    Ok(normalized)
}
