use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::contact::repo_types::ContactMessage;
use crate::error::FieldErrors;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub name: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactCreated {
    pub message: &'static str,
    pub status: &'static str,
    pub data: ContactMessage,
}

/// Error envelope; `errors` carries field messages, `error` an internal failure.
#[derive(Debug, Serialize)]
pub struct ContactFailure {
    pub message: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
    pub status: &'static str,
}
