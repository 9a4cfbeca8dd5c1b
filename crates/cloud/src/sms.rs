//! SMS delivery to the road authority dispatch number.
//!
//! Senders report an outcome rather than an error: a failed text must never
//! abort the report it belongs to, only be recorded against it.

use async_trait::async_trait;

/// Delivery result recorded on the notification row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsStatus {
    Sent,
    Failed,
    /// No provider configured; the message was logged instead of sent.
    Mocked,
}

impl SmsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsStatus::Sent => "sent",
            SmsStatus::Failed => "failed",
            SmsStatus::Mocked => "mocked",
        }
    }
}

/// What happened to one outbound message.
#[derive(Debug, Clone)]
pub struct SmsOutcome {
    pub status: SmsStatus,
    /// Provider-side message identifier, when one was issued.
    pub provider_ref: Option<String>,
    pub error: Option<String>,
}

impl SmsOutcome {
    pub fn sent(provider_ref: Option<String>) -> Self {
        Self {
            status: SmsStatus::Sent,
            provider_ref,
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            status: SmsStatus::Failed,
            provider_ref: None,
            error: Some(error),
        }
    }

    pub fn mocked() -> Self {
        Self {
            status: SmsStatus::Mocked,
            provider_ref: None,
            error: None,
        }
    }
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `body` to `to` (E.164). Infallible by contract; failures are
    /// captured in the returned outcome.
    async fn send(&self, to: &str, body: &str) -> SmsOutcome;
}

/// Twilio REST sender.
pub struct TwilioSms {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(serde::Deserialize)]
struct TwilioResponse {
    sid: Option<String>,
}

impl TwilioSms {
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid,
            auth_token,
            from_number,
        }
    }

    /// Build a sender from `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN` and
    /// `TWILIO_PHONE_NUMBER`. Returns `None` when any of them is unset, in
    /// which case the caller should fall back to [`MockSms`].
    pub fn from_env() -> Option<Self> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID").ok()?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN").ok()?;
        let from_number = std::env::var("TWILIO_PHONE_NUMBER").ok()?;
        Some(Self::new(account_sid, auth_token, from_number))
    }
}

#[async_trait]
impl SmsSender for TwilioSms {
    async fn send(&self, to: &str, body: &str) -> SmsOutcome {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        );
        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let sid = resp
                    .json::<TwilioResponse>()
                    .await
                    .ok()
                    .and_then(|r| r.sid);
                tracing::info!(to = %to, "SMS dispatched");
                SmsOutcome::sent(sid)
            }
            Ok(resp) => {
                let status = resp.status();
                let detail = resp.text().await.unwrap_or_default();
                tracing::error!(to = %to, %status, "SMS provider rejected message");
                SmsOutcome::failed(format!("provider returned {status}: {detail}"))
            }
            Err(e) => {
                tracing::error!(to = %to, error = %e, "SMS request failed");
                SmsOutcome::failed(e.to_string())
            }
        }
    }
}

/// Logs the message and records it as mocked. Used when Twilio credentials
/// are absent and in tests.
#[derive(Debug, Clone, Default)]
pub struct MockSms;

#[async_trait]
impl SmsSender for MockSms {
    async fn send(&self, to: &str, body: &str) -> SmsOutcome {
        tracing::info!(to = %to, body = %body, "mock SMS (no provider configured)");
        SmsOutcome::mocked()
    }
}
