//! Contact form handling.
//!
//! Submissions are validated field by field (every failing field is
//! reported, not just the first), then relayed once through [`MailRelay`].
//! Every failure is turned into a localized, user-facing message here; no
//! error escapes to the HTTP layer.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use utoipa::ToSchema;

use crate::i18n::{Locale, tr};
use crate::relay::{MailRelay, RelayError};

/// Basic `local@domain.tld` shape.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Key of the message that is not tied to a single field.
pub const GENERAL_ERROR: &str = "general";

/// A contact form submission, as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactForm {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

/// Reads `null` as an empty field, so it fails validation as `Required`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Form fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidFormat,
}

/// All field failures of one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: BTreeMap<Field, FieldError>,
}

impl ValidationError {
    /// Field name to localized message.
    pub fn messages(&self, locale: Locale) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(&field, &error)| (field.as_str().to_string(), field_message(field, error, locale)))
            .collect()
    }
}

fn field_message(field: Field, error: FieldError, locale: Locale) -> String {
    let key = match (field, error) {
        (Field::Name, _) => "contact.name_required",
        (Field::Email, FieldError::Required) => "contact.email_required",
        (Field::Email, FieldError::InvalidFormat) => "contact.email_invalid",
        (Field::Message, _) => "contact.message_required",
    };
    tr(key, locale)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Checks every field independently.
pub fn validate(form: &ContactForm) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();

    if is_blank(&form.name) {
        errors.fields.insert(Field::Name, FieldError::Required);
    }
    if is_blank(&form.email) {
        errors.fields.insert(Field::Email, FieldError::Required);
    } else if !EMAIL_RE.is_match(&form.email) {
        errors.fields.insert(Field::Email, FieldError::InvalidFormat);
    }
    if is_blank(&form.message) {
        errors.fields.insert(Field::Message, FieldError::Required);
    }

    if errors.fields.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Result of one submission, already localized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Sent,
    /// Input problems; nothing was sent.
    Invalid(BTreeMap<String, String>),
    /// The relay failed; the visitor may try again.
    Failed(String),
}

impl ContactOutcome {
    /// The HTTP status this outcome maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            ContactOutcome::Sent => 200,
            ContactOutcome::Invalid(_) => 400,
            ContactOutcome::Failed(_) => 500,
        }
    }

    /// Converts into the JSON response body, echoing `form` on failure.
    pub fn into_response(self, form: ContactForm) -> ContactResponse {
        match self {
            ContactOutcome::Sent => ContactResponse {
                success: true,
                errors: None,
                form_data: None,
            },
            ContactOutcome::Invalid(errors) => ContactResponse {
                success: false,
                errors: Some(errors),
                form_data: Some(form),
            },
            ContactOutcome::Failed(message) => ContactResponse {
                success: false,
                errors: Some(BTreeMap::from([(GENERAL_ERROR.to_string(), message)])),
                form_data: Some(form),
            },
        }
    }
}

/// JSON body returned by the contact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub success: bool,
    /// Field name (or `general`) to localized message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    /// The submitted input, returned for re-display on failure.
    #[serde(rename = "formData", skip_serializing_if = "Option::is_none")]
    pub form_data: Option<ContactForm>,
}

/// Validates `form` and, if it passes, relays it once.
pub async fn submit(relay: &MailRelay, form: &ContactForm, locale: Locale) -> ContactOutcome {
    if let Err(errors) = validate(form) {
        log::info!(
            "Contact submission rejected: {:?}",
            errors.fields.keys().map(|f| f.as_str()).collect::<Vec<_>>()
        );
        return ContactOutcome::Invalid(errors.messages(locale));
    }

    match relay.send(&form.name, &form.email, &form.message).await {
        Ok(()) => {
            log::info!("Contact message relayed ({} chars)", form.message.len());
            ContactOutcome::Sent
        }
        Err(err) => {
            match &err {
                RelayError::Upstream { .. } => log::error!("Relay API error: {}", err),
                RelayError::Transport(_) => log::error!("Contact submission failed: {}", err),
            }
            ContactOutcome::Failed(tr("contact.error_message", locale))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayConfig;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    fn relay_for(server: &MockServer) -> MailRelay {
        MailRelay::new(RelayConfig {
            endpoint: server.url("/submit"),
            access_key: "test-key".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_validate_missing_name() {
        let err = validate(&form("", "a@b.com", "hi")).unwrap_err();
        assert_eq!(err.fields.len(), 1);
        assert_eq!(err.fields[&Field::Name], FieldError::Required);
    }

    #[test]
    fn test_validate_invalid_email() {
        let err = validate(&form("Ana", "not-an-email", "hi")).unwrap_err();
        assert_eq!(err.fields[&Field::Email], FieldError::InvalidFormat);
        assert!(!err.fields.contains_key(&Field::Name));
    }

    #[test]
    fn test_validate_reports_every_field() {
        let err = validate(&form("   ", "", "\n\t")).unwrap_err();
        assert_eq!(err.fields[&Field::Name], FieldError::Required);
        assert_eq!(err.fields[&Field::Email], FieldError::Required);
        assert_eq!(err.fields[&Field::Message], FieldError::Required);
    }

    #[test]
    fn test_email_shapes() {
        for ok in ["a@b.com", "first.last@sub.example.es"] {
            assert!(validate(&form("Ana", ok, "hi")).is_ok(), "{} should pass", ok);
        }
        for bad in ["a@b", "a b@c.com", "@b.com", "a@@b.com", "a@b."] {
            assert!(validate(&form("Ana", bad, "hi")).is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn test_messages_are_localized() {
        let err = validate(&form("", "x", "")).unwrap_err();
        let es = err.messages(Locale::Es);
        let en = err.messages(Locale::En);
        assert_eq!(es.len(), 3);
        assert_eq!(en["email"], tr("contact.email_invalid", Locale::En));
        assert_ne!(es["name"], en["name"]);
    }

    #[tokio::test]
    async fn test_invalid_submission_makes_no_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/submit");
                then.status(200);
            })
            .await;

        let outcome = submit(&relay_for(&server), &form("", "a@b.com", "hi"), Locale::En).await;
        assert_eq!(outcome.status_code(), 400);
        match outcome {
            ContactOutcome::Invalid(errors) => {
                assert_eq!(errors["name"], tr("contact.name_required", Locale::En));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_valid_submission_is_sent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/submit");
                then.status(200).json_body(json!({ "success": true }));
            })
            .await;

        let input = form("Ana", "a@b.com", "hi");
        let outcome = submit(&relay_for(&server), &input, Locale::Es).await;
        assert_eq!(outcome, ContactOutcome::Sent);
        mock.assert_hits_async(1).await;

        let body = serde_json::to_value(outcome.into_response(input)).unwrap();
        assert_eq!(body, json!({ "success": true }));
    }

    #[test]
    fn test_null_and_missing_fields_read_as_empty() {
        let parsed: ContactForm =
            serde_json::from_value(json!({ "name": null, "email": "a@b.com" })).unwrap();
        assert_eq!(parsed, form("", "a@b.com", ""));

        let err = validate(&parsed).unwrap_err();
        assert_eq!(err.fields[&Field::Name], FieldError::Required);
        assert_eq!(err.fields[&Field::Message], FieldError::Required);
    }

    #[tokio::test]
    async fn test_unreachable_relay_maps_to_general_error() {
        let relay = MailRelay::new(RelayConfig {
            endpoint: "http://127.0.0.1:9/submit".into(),
            access_key: "test-key".into(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let input = form("Ana", "a@b.com", "hi");
        let outcome = submit(&relay, &input, Locale::En).await;
        assert_eq!(outcome.status_code(), 500);
        assert_eq!(
            outcome,
            ContactOutcome::Failed(tr("contact.error_message", Locale::En))
        );

        let body = serde_json::to_value(outcome.into_response(input)).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["general"], tr("contact.error_message", Locale::En));
        assert_eq!(body["formData"]["email"], "a@b.com");
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_general_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/submit");
                then.status(500).json_body(json!({ "success": false }));
            })
            .await;

        let input = form("Ana", "a@b.com", "hi");
        let outcome = submit(&relay_for(&server), &input, Locale::Es).await;
        assert_eq!(outcome.status_code(), 500);

        let body = serde_json::to_value(outcome.into_response(input)).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["general"], tr("contact.error_message", Locale::Es));
        assert_eq!(body["formData"]["name"], "Ana");
    }
}
