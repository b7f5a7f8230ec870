//! Contact relay: validate a form submission, compose an email, deliver it once.

use lettre::Address;

use crate::error::RelayError;
use crate::mailer::{ContactEmail, Mailer};
use crate::models::ContactRequest;

pub const MISSING_FIELDS: &str = "All fields are required";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const SENT: &str = "Email sent successfully!";

/// Where contact mail goes and who it is sent as.
#[derive(Debug, Clone)]
pub struct ContactSettings {
    /// Authenticated SMTP account used as the envelope sender.
    pub sender: String,
    pub recipient: String,
}

/// A submission with every field present and non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Check presence of all three fields and that the email parses as an address.
pub fn validate(req: ContactRequest) -> Result<ValidContact, RelayError> {
    let field = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let (Some(name), Some(email), Some(message)) =
        (field(req.name), field(req.email), field(req.message))
    else {
        return Err(RelayError::invalid(MISSING_FIELDS));
    };

    let email = email.trim().to_string();
    if email.parse::<Address>().is_err() {
        return Err(RelayError::invalid(INVALID_EMAIL));
    }

    Ok(ValidContact {
        name: name.trim().to_string(),
        email,
        message,
    })
}

/// Validate, compose and hand the email to the mailer.
///
/// The mailer is never called for an invalid submission and is called
/// exactly once otherwise.
pub async fn submit_contact(
    mailer: &dyn Mailer,
    settings: &ContactSettings,
    req: ContactRequest,
) -> Result<(), RelayError> {
    let contact = validate(req)?;

    let email = ContactEmail::compose(
        &contact.name,
        &contact.email,
        &contact.message,
        &settings.sender,
        &settings.recipient,
    );

    mailer.send(&email).await?;
    tracing::info!(reply_to = %contact.email, "contact email sent");
    Ok(())
}
