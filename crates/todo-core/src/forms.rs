//! Form values and their local validation rules.
//!
//! Validation runs before any request is sent. Each field reports only its
//! first failing rule.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use todo_types::{LoginRequest, SignupRequest, TaskPayload};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .unwrap_or_else(|err| panic!("email pattern is valid: {err}"))
});

static PASSWORD_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z\d@$!%*?&]{8,}$")
        .unwrap_or_else(|err| panic!("password pattern is valid: {err}"))
});

const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Field-level validation failures, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        if self.get(field).is_none() {
            self.errors.push((field, message.into()));
        }
    }

    fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(message) = result {
            self.push(field, message);
        }
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

fn length_between(
    value: &str,
    min: usize,
    max: usize,
    too_short: &str,
    too_long: &str,
) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        Err(too_short.to_string())
    } else if len > max {
        Err(too_long.to_string())
    } else {
        Ok(())
    }
}

fn email(value: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err("Invalid email address".to_string())
    }
}

fn password(value: &str, label: &str) -> Result<(), String> {
    if value.chars().count() < 8 {
        return Err(format!("{label} must be at least 8 characters"));
    }
    let strong = PASSWORD_CHARSET_RE.is_match(value)
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if strong {
        Ok(())
    } else {
        Err(format!(
            "{label} must contain at least one uppercase letter, one number, and one special character"
        ))
    }
}

/// Title and description of a task, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
}

impl TaskForm {
    pub const TITLE_MIN: usize = 5;
    pub const TITLE_MAX: usize = 100;
    pub const DESCRIPTION_MIN: usize = 10;
    pub const DESCRIPTION_MAX: usize = 500;

    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.description.is_empty()
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
    }

    /// # Errors
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(
            "title",
            length_between(
                &self.title,
                Self::TITLE_MIN,
                Self::TITLE_MAX,
                "Title must be at least 5 characters",
                "Title must be less than 100 characters",
            ),
        );
        errors.check(
            "description",
            length_between(
                &self.description,
                Self::DESCRIPTION_MIN,
                Self::DESCRIPTION_MAX,
                "Description must be at least 10 characters",
                "Description must be less than 500 characters",
            ),
        );
        errors.into_result()
    }

    pub fn to_payload(&self) -> TaskPayload {
        TaskPayload {
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check("email", email(&self.email));
        errors.check("password", password(&self.password, "Password"));
        errors.into_result()
    }

    pub fn to_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// # Errors
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(
            "name",
            length_between(
                &self.name,
                5,
                30,
                "Name is required",
                "Name must be less than 30 characters",
            ),
        );
        errors.check("email", email(&self.email));
        errors.check("password", password(&self.password, "Password"));
        errors.check(
            "confirm_password",
            password(&self.confirm_password, "Confirm password"),
        );
        if self.password != self.confirm_password {
            errors.push("confirm_password", "Passwords don't match");
        }
        errors.into_result()
    }

    /// The confirmation field is local only and never sent.
    pub fn to_request(&self) -> SignupRequest {
        SignupRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}
