//! Field checks for incoming DTOs.
//! Problems are collected per field so the client sees every failing path at once.

use regex::Regex;

use crate::errors::{AppError, FieldIssue};

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^[0-9+]{6,20}$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9._-]{3,32}$").unwrap();
}

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

pub fn sanitize_phone(phone: &str) -> Option<String> {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if PHONE_RE.is_match(&digits) {
        Some(digits)
    } else {
        None
    }
}

pub fn ensure_max_len(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Default)]
pub struct FieldErrors {
    issues: Vec<FieldIssue>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(path, message));
    }

    pub fn required(&mut self, path: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.push(path, "Required");
        } else if !ensure_max_len(value, max) {
            self.push(path, format!("Must be at most {} characters", max));
        }
        self
    }

    pub fn optional(&mut self, path: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            if !ensure_max_len(value, max) {
                self.push(path, format!("Must be at most {} characters", max));
            }
        }
        self
    }

    /// Present values must not be blank.
    pub fn not_blank(&mut self, path: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.required(path, value, max);
        }
        self
    }

    pub fn email(&mut self, path: &str, value: &str) -> &mut Self {
        if !validate_email(value.trim()) {
            self.push(path, "Invalid email address");
        }
        self
    }

    pub fn username(&mut self, path: &str, value: &str) -> &mut Self {
        if !validate_username(value) {
            self.push(path, "Use 3-32 letters, digits, dots, dashes or underscores");
        }
        self
    }

    pub fn phone(&mut self, path: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            if sanitize_phone(value).is_none() {
                self.push(path, "Invalid phone number");
            }
        }
        self
    }

    pub fn password(&mut self, path: &str, value: &str) -> &mut Self {
        if value.chars().count() < MIN_PASSWORD_LEN {
            self.push(
                path,
                format!("Must be at least {} characters", MIN_PASSWORD_LEN),
            );
        } else if value.len() > 72 {
            // bcrypt ignores everything past 72 bytes
            self.push(path, "Must be at most 72 bytes");
        }
        self
    }

    pub fn non_negative(&mut self, path: &str, value: Option<i64>) -> &mut Self {
        if matches!(value, Some(v) if v < 0) {
            self.push(path, "Must not be negative");
        }
        self
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_and_phone_rules() {
        assert!(validate_email("ana@example.com"));
        assert!(!validate_email("ana@example"));
        assert_eq!(sanitize_phone("+63 917 123 4567").as_deref(), Some("+639171234567"));
        assert_eq!(sanitize_phone("12"), None);
    }

    #[test]
    fn collects_every_failing_field() {
        let mut errors = FieldErrors::new();
        errors
            .required("firstName", "  ", 64)
            .email("email", "nope")
            .password("password", "short")
            .username("username", "ok_user");

        match errors.finish() {
            Err(AppError::Validation(issues)) => {
                let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
                assert_eq!(paths, vec!["firstName", "email", "password"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn absent_optionals_pass() {
        let mut errors = FieldErrors::new();
        errors
            .optional("address", None, 10)
            .not_blank("title", None, 10)
            .phone("contact", None)
            .non_negative("salary", Some(0));
        assert!(errors.finish().is_ok());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }
}
