use tracing::info;
use validator::Validate;

use crate::{
    auth::validation::required,
    contact::{
        dto::ContactRequest,
        repo::ContactRepository,
        repo_types::{ContactMessage, NewContactMessage},
    },
    error::{AppError, FieldErrors},
};

/// Validates a contact submission and stores it as one row.
pub async fn submit(
    contacts: &dyn ContactRepository,
    mut req: ContactRequest,
) -> Result<ContactMessage, AppError> {
    if let Some(email) = req.email.as_mut() {
        *email = email.trim().to_string();
    }

    let mut errors = match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => e.into(),
    };
    let name = required(&mut errors, "name", req.name.as_deref()).map(str::to_owned);
    let email = required(&mut errors, "email", req.email.as_deref()).map(str::to_owned);
    let message = required(&mut errors, "message", req.message.as_deref()).map(str::to_owned);
    errors.into_result()?;

    let (Some(name), Some(email), Some(message)) = (name, email, message) else {
        return Err(anyhow::anyhow!("validated contact form is missing a field").into());
    };

    let msg = contacts
        .create(NewContactMessage {
            name,
            email,
            message,
        })
        .await?;
    info!(contact_id = %msg.id, "contact message stored");
    Ok(msg)
}
