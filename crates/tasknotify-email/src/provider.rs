//! Transactional email providers.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::EmailError;

/// The `From` of every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub address: String,
    pub name: String,
}

impl Sender {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }
}

/// A message ready for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: Sender,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Delivers rendered messages.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// SendGrid v3 `mail/send`.
pub struct SendGridProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SendGridProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.sendgrid.com";

    pub fn new(api_key: impl Into<String>) -> Result<Self, EmailError> {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    /// Use another API host (a regional endpoint or a test server).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, EmailError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(EmailError::NotConfigured("SendGrid API key is empty".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/mail/send", self.base_url)
    }
}

#[derive(Serialize)]
struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 2],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime: &'a str,
    value: &'a str,
}

impl<'a> MailSend<'a> {
    fn from_email(email: &'a OutgoingEmail) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address {
                    email: &email.to,
                    name: None,
                }],
            }],
            from: Address {
                email: &email.from.address,
                name: Some(&email.from.name),
            },
            subject: &email.subject,
            content: [
                Content {
                    mime: "text/plain",
                    value: &email.text,
                },
                Content {
                    mime: "text/html",
                    value: &email.html,
                },
            ],
        }
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let payload = MailSend::from_email(email);

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("SendGrid accepted message ({})", status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: Sender::new("noreply@example.com", "Task Manager"),
            to: "ada@example.com".to_string(),
            subject: "Hello".to_string(),
            text: "text body".to_string(),
            html: "<p>html body</p>".to_string(),
        }
    }

    #[test]
    fn test_payload_shape() {
        let email = email();
        let json = serde_json::to_value(MailSend::from_email(&email)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "personalizations": [{"to": [{"email": "ada@example.com"}]}],
                "from": {"email": "noreply@example.com", "name": "Task Manager"},
                "subject": "Hello",
                "content": [
                    {"type": "text/plain", "value": "text body"},
                    {"type": "text/html", "value": "<p>html body</p>"}
                ]
            })
        );
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(
            SendGridProvider::new("  "),
            Err(EmailError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = SendGridProvider::with_base_url("key", "http://localhost:9000/").unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9000/v3/mail/send");
        assert_eq!(provider.name(), "sendgrid");
    }
}
