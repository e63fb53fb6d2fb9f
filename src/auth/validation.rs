use lazy_static::lazy_static;
use regex::Regex;
use zxcvbn::feedback::Warning;

use crate::config::PasswordPolicy;
use crate::error::FieldErrors;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only \
                                    letters, numbers, and @/./+/-/_ characters.";

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// Lower-cases the domain part of an address, keeping the local part as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Presence check for a required string field. Returns the trimmed value.
///
/// A missing or blank field reports only that, dropping any format errors
/// already recorded for it.
pub fn required<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value {
        None => {
            errors.replace(field, REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.replace(field, BLANK);
            None
        }
        Some(v) => Some(v.trim()),
    }
}

/// Runs every password rule, returning one message per failed rule.
pub fn check_password(policy: &PasswordPolicy, password: &str) -> Vec<String> {
    let mut messages = Vec::new();

    if password.chars().count() < policy.min_length {
        messages.push(format!(
            "This password is too short. It must contain at least {} characters.",
            policy.min_length
        ));
    }

    if is_common(password) {
        messages.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        messages.push("This password is entirely numeric.".to_string());
    }

    messages
}

/// True when the whole password is an entry of the leaked-password
/// dictionary, ignoring case.
fn is_common(password: &str) -> bool {
    let password = password.trim();
    if password.is_empty() {
        return false;
    }
    let entropy = zxcvbn::zxcvbn(password, &[]);
    matches!(
        entropy.feedback().and_then(|f| f.warning()),
        Some(
            Warning::ThisIsATop10Password
                | Warning::ThisIsATop100Password
                | Warning::ThisIsACommonPassword
        )
    )
}
