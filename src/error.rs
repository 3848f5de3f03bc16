//! Error types for SwipeSense.

/// Fallback text when a failed request carries no message of its own.
pub const GENERIC_REQUEST_FAILURE: &str = "Something went wrong calling the API.";

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Persistence store errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Profile validation failures, checked in field order during sign-up.
///
/// The `Display` text is shown to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your name.")]
    MissingName,

    #[error("Please select your date of birth.")]
    MissingDob,

    #[error("Please enter your date of birth as YYYY-MM-DD.")]
    InvalidDob,

    #[error("Please enter your cell number.")]
    MissingCell,

    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

/// Recommendation backend failures.
///
/// Transport failures, non-success statuses and unexpected bodies all end up
/// on the same display path; the `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    InvalidResponse(String),
}

impl RequestError {
    /// User-facing text, never empty.
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            GENERIC_REQUEST_FAILURE.to_string()
        } else {
            text
        }
    }
}

/// Errors parsing user input at the REST / CLI boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Unknown bank: {0} (expected one of CIBC, RBC, Scotiabank, TD, BMO)")]
    UnknownBank(String),

    #[error("Unknown merchant: {0}")]
    UnknownMerchant(String),

    #[error("Unknown profile field: {0} (expected name, dob, cell or email)")]
    UnknownField(String),

    #[error("Card count must be between 1 and 5, got {0}")]
    CardCountOutOfRange(i64),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unknown command: {0} (type 'help' for a list)")]
    UnknownCommand(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(ValidationError::MissingName.to_string(), "Please enter your name.");
        assert_eq!(
            ValidationError::InvalidEmail.to_string(),
            "Please enter a valid email address."
        );
    }

    #[test]
    fn rejected_displays_message_only() {
        let err = RequestError::Rejected {
            status: 500,
            message: "backend exploded".to_string(),
        };
        assert_eq!(err.user_message(), "backend exploded");
    }

    #[test]
    fn empty_request_error_falls_back_to_generic_text() {
        let err = RequestError::Transport(String::new());
        assert_eq!(err.user_message(), GENERIC_REQUEST_FAILURE);
    }
}
