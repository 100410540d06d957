//! Notification texts.
//!
//! Every text is a Handlebars template rendered against an [`IpChange`].
//! Mail subject and body come from the configuration (with defaults); the
//! push texts are fixed. HTML escaping is disabled since nothing here is
//! HTML.

use serde::Serialize;

use super::SendError;
use crate::config::template_registry;

/// Title of a Pushbullet note.
pub const PUSH_TITLE_TEMPLATE: &str = "IP has changed to {{new_ip}} at {{location}}";

/// Body of a Pushbullet note.
pub const PUSH_BODY_TEMPLATE: &str = "The IP changed from {{old_ip}} to {{new_ip}}.";

/// Data available to every template.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IpChange<'a> {
    /// Previously recorded address
    pub old_ip: &'a str,
    /// Freshly resolved address
    pub new_ip: &'a str,
    /// Location label from the configuration
    pub location: &'a str,
}

/// A rendered title/body pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Mail subject or push title
    pub title: String,
    /// Message body
    pub body: String,
}

/// Renders `template` against `change`.
///
/// # Errors
///
/// Returns [`SendError::InvalidMessage`] if the template does not render.
pub fn render(template: &str, change: &IpChange<'_>) -> Result<String, SendError> {
    template_registry()
        .render_template(template, change)
        .map_err(|e| SendError::InvalidMessage(e.to_string()))
}

/// Renders a mail from the subject and body templates.
///
/// # Errors
///
/// Returns [`SendError::InvalidMessage`] if either template does not render.
pub fn mail_note(
    subject_template: &str,
    body_template: &str,
    change: &IpChange<'_>,
) -> Result<Note, SendError> {
    Ok(Note {
        title: render(subject_template, change)?,
        body: render(body_template, change)?,
    })
}

/// Renders the Pushbullet note.
///
/// # Errors
///
/// Returns [`SendError::InvalidMessage`] if rendering fails.
pub fn push_note(change: &IpChange<'_>) -> Result<Note, SendError> {
    mail_note(PUSH_TITLE_TEMPLATE, PUSH_BODY_TEMPLATE, change)
}

/// Renders the IFTTT `value1`: the mail body followed by the location.
///
/// # Errors
///
/// Returns [`SendError::InvalidMessage`] if the body template does not render.
pub fn ifttt_value(body_template: &str, change: &IpChange<'_>) -> Result<String, SendError> {
    let body = render(body_template, change)?;
    Ok(format!("{body} at {}", change.location))
}
