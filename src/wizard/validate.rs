//! Sign-up validation.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ValidationError;

use super::model::Profile;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Basic `local@domain.tld` shape check on the trimmed address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Check the profile field by field, reporting the first failure in the order
/// name, dob, cell, email.
pub fn validate_profile(profile: &Profile) -> Result<(), ValidationError> {
    if profile.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }

    let dob = profile.dob.trim();
    if dob.is_empty() {
        return Err(ValidationError::MissingDob);
    }
    if NaiveDate::parse_from_str(dob, "%Y-%m-%d").is_err() {
        return Err(ValidationError::InvalidDob);
    }

    if profile.cell.trim().is_empty() {
        return Err(ValidationError::MissingCell);
    }

    if profile.email.trim().is_empty() || !is_valid_email(&profile.email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}
