//! Outbound Gmail notifications.
//!
//! The notifier authenticates with a stored OAuth refresh token (access
//! tokens are fetched and refreshed on demand) and sends one email per
//! invocation. De-duplication is the caller's job.

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_gmail1::api::Message;
use google_gmail1::hyper_rustls::HttpsConnector;
use google_gmail1::Gmail;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::io::Cursor;

use crate::config::NotifierConfig;

const OFFICE_SEARCH_URL: &str =
    "https://my.uscis.gov/appointmentscheduler-appointment/ca/en/office-search";

/// Seam between the poll loop and the email transport.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Send a single notification email with the given subject.
    async fn notify(&self, subject: &str) -> Result<()>;
}

/// Sends notification emails through the Gmail API.
pub struct GmailNotifier {
    hub: Gmail<HttpsConnector<HttpConnector>>,
    from: String,
    to: String,
    ircc_num: String,
}

impl GmailNotifier {
    /// Build an authenticated Gmail hub from the configured OAuth client
    /// credentials and refresh token.
    pub async fn new(config: &NotifierConfig) -> Result<Self> {
        // Use the yup_oauth2 re-exported by google_gmail1 to avoid version mismatch
        let secret = google_gmail1::yup_oauth2::authorized_user::AuthorizedUserSecret {
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
            refresh_token: config.oauth_refresh_token.clone(),
            key_type: "authorized_user".to_string(),
        };

        let auth = google_gmail1::yup_oauth2::AuthorizedUserAuthenticator::builder(secret)
            .build()
            .await
            .context("Failed to build authenticator from refresh token")?;

        let connector = google_gmail1::hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .context("Failed to load native TLS roots")?
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let hub = Gmail::new(client, auth);

        Ok(Self {
            hub,
            from: config.oauth_user.clone(),
            to: config.email_to.clone(),
            ircc_num: config.ircc_num.clone(),
        })
    }
}

#[async_trait]
impl Notify for GmailNotifier {
    async fn notify(&self, subject: &str) -> Result<()> {
        let raw = build_rfc822(&self.from, &self.to, subject, &self.ircc_num);
        let mime_type: mime::Mime = "message/rfc822"
            .parse()
            .context("Invalid rfc822 media type")?;

        self.hub
            .users()
            .messages_send(Message::default(), "me")
            .upload(Cursor::new(raw), mime_type)
            .await
            .context("Failed to send notification email")?;

        Ok(())
    }
}

/// Assemble the full RFC 2822 message: fixed sender/recipient, caller-supplied
/// subject, fixed HTML body with the receipt number and office-search link.
fn build_rfc822(from: &str, to: &str, subject: &str, ircc_num: &str) -> Vec<u8> {
    let body = format!(
        "<p>IRCC Number: {ircc_num}</p><a href=\"{OFFICE_SEARCH_URL}\">{OFFICE_SEARCH_URL}</a>"
    );

    format!(
        "From: USCIS ACS Appointment Availability Notifier <{from}>\r\n\
         To: {to}\r\n\
         Subject: {subject}\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         \r\n\
         {body}\r\n"
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc822_message_carries_headers_and_body() {
        let raw = build_rfc822(
            "sender@example.com",
            "me@example.com",
            "[3] WA Appointment Availability Found At 7/1/2022, 10:00:00 AM",
            "IOE0123456789",
        );
        let text = String::from_utf8(raw).expect("message should be utf-8");

        assert!(text.starts_with(
            "From: USCIS ACS Appointment Availability Notifier <sender@example.com>\r\n"
        ));
        assert!(text.contains("To: me@example.com\r\n"));
        assert!(text
            .contains("Subject: [3] WA Appointment Availability Found At 7/1/2022, 10:00:00 AM\r\n"));
        assert!(text.contains("Content-Type: text/html; charset=utf-8\r\n"));

        let (headers, body) = text
            .split_once("\r\n\r\n")
            .expect("headers and body separated by a blank line");
        assert!(!headers.is_empty());
        assert!(body.contains("IRCC Number: IOE0123456789"));
        assert!(body.contains(OFFICE_SEARCH_URL));
    }
}
