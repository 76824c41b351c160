use validator::Validate;

use crate::shared::DomainError;

/// Run `validator` rules on an input DTO and map the first failing field
/// (alphabetical, so the reported field is stable) to a `DomainError`.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), DomainError> {
    let Err(errors) = input.validate() else {
        return Ok(());
    };

    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (wire_field_name(&field), msg)
            })
        })
        .collect();
    fields.sort();

    match fields.into_iter().next() {
        Some((field, message)) => Err(DomainError::validation(field, message)),
        None => Err(DomainError::validation("input", "validation failed")),
    }
}

/// Field name as it appears on the wire: `first_name` becomes `firstName`.
pub fn wire_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Emails are compared and stored trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Blank optional text collapses to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(email(message = "invalid email format"))]
        email: String,
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
    }

    #[test]
    fn valid_input_passes() {
        let s = Sample {
            email: "a@b.io".into(),
            name: "Ada".into(),
        };
        assert!(validate_input(&s).is_ok());
    }

    #[test]
    fn first_failing_field_is_reported() {
        let s = Sample {
            email: "nope".into(),
            name: String::new(),
        };
        match validate_input(&s) {
            Err(DomainError::Validation { field, message }) => {
                assert_eq!(field, "email");
                assert_eq!(message, "invalid email format");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn field_names_use_camel_case() {
        assert_eq!(wire_field_name("first_name"), "firstName");
        assert_eq!(wire_field_name("department_ids"), "departmentIds");
        assert_eq!(wire_field_name("email"), "email");
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(Some(" 0723 ".into())), Some("0723".into()));
        assert_eq!(normalize_optional(None), None);
    }
}
