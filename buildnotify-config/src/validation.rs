//! Custom validation functions for configuration.

use validator::ValidationError;

/// Every `<%=` must be closed by a later `%>`.
pub fn validate_template(text: &str) -> Result<(), ValidationError> {
    let mut rest = text;
    while let Some(start) = rest.find("<%=") {
        let body = &rest[start + 3..];
        match body.find("%>") {
            Some(end) => rest = &body[end + 2..],
            None => return Err(ValidationError::new("unterminated_template")),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates() {
        assert!(validate_template("plain").is_ok());
        assert!(validate_template("<%= file.relative %> and <%= options.x %>").is_ok());
        assert!(validate_template("<%= file.relative").is_err());
        assert!(validate_template("<%= a %> <%= b").is_err());
    }
}
