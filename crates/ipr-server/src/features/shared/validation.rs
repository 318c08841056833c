//! Field validation helpers

/// Maximum length for patient identifiers
pub const MAX_IDENTIFIER_LENGTH: usize = 100;

/// Maximum length for free-text comments
pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierValidationError {
    #[error("Identifier is required")]
    Required,
    #[error("Identifier must be at most {MAX_IDENTIFIER_LENGTH} characters")]
    TooLong,
    #[error("Identifier may only contain letters, digits, '-' and '_'")]
    InvalidCharacters,
}

/// Validate a patient identifier (e.g. `POG1234`, `PATIENT-07`)
pub fn validate_identifier(identifier: &str) -> Result<(), IdentifierValidationError> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Err(IdentifierValidationError::Required);
    }
    if trimmed.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierValidationError::TooLong);
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(IdentifierValidationError::InvalidCharacters);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentValidationError {
    #[error("Comment must be at most {MAX_COMMENT_LENGTH} characters")]
    TooLong,
}

pub fn validate_comment(comment: &str) -> Result<(), CommentValidationError> {
    if comment.len() > MAX_COMMENT_LENGTH {
        return Err(CommentValidationError::TooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("POG1234").is_ok());
        assert!(validate_identifier("PATIENT-07").is_ok());
        assert!(validate_identifier("sample_01").is_ok());
    }

    #[test]
    fn test_empty_identifier_rejected() {
        assert_eq!(
            validate_identifier("   "),
            Err(IdentifierValidationError::Required)
        );
    }

    #[test]
    fn test_identifier_charset() {
        assert_eq!(
            validate_identifier("POG 1234"),
            Err(IdentifierValidationError::InvalidCharacters)
        );
        assert_eq!(
            validate_identifier("POG;DROP"),
            Err(IdentifierValidationError::InvalidCharacters)
        );
    }

    #[test]
    fn test_identifier_length() {
        let long = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert_eq!(
            validate_identifier(&long),
            Err(IdentifierValidationError::TooLong)
        );
    }

    #[test]
    fn test_comment_length() {
        assert!(validate_comment("fine").is_ok());
        let long = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert_eq!(validate_comment(&long), Err(CommentValidationError::TooLong));
    }
}
