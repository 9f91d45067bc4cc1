/// Resource paths come straight from the URL. Reject anything that could
/// escape the upstream API namespace before it reaches the service.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    EmptyPath,
    ParentSegment,
    InvalidCharacter(char),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyPath => write!(f, "resource path must not be empty"),
            ValidationError::ParentSegment => {
                write!(f, "resource path must not contain '..' segments")
            }
            ValidationError::InvalidCharacter(c) => {
                write!(f, "resource path contains invalid character '{}'", c)
            }
        }
    }
}

pub fn validate_resource_path(path: &str) -> Result<(), ValidationError> {
    if path.trim_matches('/').is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(ValidationError::ParentSegment);
    }
    if let Some(c) = path
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '/' | '-' | '_' | '.' | ':' | '@'))
    {
        return Err(ValidationError::InvalidCharacter(c));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_resource_paths() {
        assert!(validate_resource_path("projects/123/tasks").is_ok());
        assert!(validate_resource_path("workspaces").is_ok());
        assert!(validate_resource_path("users/me").is_ok());
    }

    #[test]
    fn rejects_empty_and_traversal_paths() {
        assert_eq!(validate_resource_path(""), Err(ValidationError::EmptyPath));
        assert_eq!(validate_resource_path("/"), Err(ValidationError::EmptyPath));
        assert_eq!(
            validate_resource_path("projects/../secrets"),
            Err(ValidationError::ParentSegment)
        );
    }

    #[test]
    fn rejects_invalid_characters() {
        assert_eq!(
            validate_resource_path("projects/123?x=1"),
            Err(ValidationError::InvalidCharacter('?'))
        );
    }
}
