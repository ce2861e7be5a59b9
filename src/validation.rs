//! Typed form validation. Every form is parsed into a validated input or a
//! [`ValidationError`] listing each failing field, before any remote call.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summary(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn summary(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn single(field: &'static str, message: &'static str) -> Self {
        Self {
            issues: vec![FieldIssue { field, message }],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

#[derive(Default)]
struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldIssue { field, message });
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(raw: &str, issues: &mut Issues) -> String {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        issues.push("email", "Invalid email address");
    }
    email
}

fn check_password(raw: &str, issues: &mut Issues) -> String {
    let password = raw.trim().to_string();
    if password.chars().count() < MIN_PASSWORD_LEN {
        issues.push("password", "Password must be at least 6 characters long");
    }
    password
}

/// Raw registration form.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<SignUpInput, ValidationError> {
        let mut issues = Issues::default();
        let email = check_email(&self.email, &mut issues);
        let password = check_password(&self.password, &mut issues);
        let confirm = self.confirm_password.trim();
        if confirm.chars().count() < MIN_PASSWORD_LEN {
            issues.push("confirm_password", "Confirm password is required");
        } else if confirm != password {
            issues.push("confirm_password", "The passwords did not match");
        }
        issues.finish(SignUpInput { email, password })
    }
}

/// Raw sign-in form.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<SignInInput, ValidationError> {
        let mut issues = Issues::default();
        let email = check_email(&self.email, &mut issues);
        let password = check_password(&self.password, &mut issues);
        issues.finish(SignInInput { email, password })
    }
}

/// A todo name that is known to be non-blank. Surrounding whitespace is
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TodoName(String);

impl TodoName {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::single("name", "Todo cannot be empty"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TodoName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
