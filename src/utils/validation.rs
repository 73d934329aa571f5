use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{ServiceError, ServiceResult};

/// Lower-cases and trims an email after a shape check: one `@`, a non-empty
/// local part and a dotted domain.
pub fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|label| !label.is_empty())
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(ServiceError::Validation(format!("Invalid email address: {email}")))
    }
}

pub fn validate_password(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Academic years are written `2026-2027`: two consecutive years.
pub fn validate_academic_year(year: &str) -> ServiceResult<()> {
    let invalid = || {
        ServiceError::Validation(format!(
            "Academic year must look like 2026-2027, got {year}"
        ))
    };

    let (start, end) = year.split_once('-').ok_or_else(invalid)?;
    if start.len() != 4 || end.len() != 4 {
        return Err(invalid());
    }
    let start: i32 = start.parse().map_err(|_| invalid())?;
    let end: i32 = end.parse().map_err(|_| invalid())?;
    if end != start + 1 {
        return Err(invalid());
    }
    Ok(())
}

pub fn require_non_blank(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(
            normalize_email("  Jane.Doe@School.EDU ").unwrap(),
            "jane.doe@school.edu"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "plain", "@school.edu", "a@b", "a@@b.com", "a@b..com", "a b@c.com"] {
            assert!(normalize_email(email).is_err(), "{email:?}");
        }
    }

    #[test]
    fn passwords_need_six_characters() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn academic_years_are_consecutive() {
        assert!(validate_academic_year("2026-2027").is_ok());
        assert!(validate_academic_year("2026-2028").is_err());
        assert!(validate_academic_year("2026").is_err());
        assert!(validate_academic_year("26-27").is_err());
        assert!(validate_academic_year("abcd-efgh").is_err());
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(require_non_blank("First name", "  ").is_err());
        assert!(require_non_blank("First name", "Ana").is_ok());
    }
}
