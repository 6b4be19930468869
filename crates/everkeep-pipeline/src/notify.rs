//! The notification dispatcher.
//!
//! A submission must always reach a human. The preferred route is a
//! templated transport (an EmailJS-style REST service keyed by three
//! credentials); whenever it is unconfigured or errs, the dispatcher falls
//! back to composing a pre-filled `mailto:` draft for the operator. The
//! fallback only builds a payload — it never confirms delivery.

use std::future::Future;

use chrono::NaiveDate;
use everkeep_core::{memorial::Memorial, submission::Requester};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TransportError;

// ─── Template transport ──────────────────────────────────────────────────────

/// The three configuration values enabling the templated transport. Their
/// absence is a valid, expected runtime state, not a misconfiguration
/// error.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateCredentials {
  pub public_key:  String,
  pub service_id:  String,
  pub template_id: String,
}

/// Named template variables for one notification send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
  pub requester_name:  String,
  pub requester_email: String,
  pub requester_phone: String,
  pub memorial_name:   String,
  pub memorial_place:  String,
  pub memorial_born:   String,
  pub memorial_died:   String,
  pub memorial_url:    String,
  pub to_email:        String,
}

/// Abstraction over the templated notification service.
pub trait TemplateTransport: Send + Sync {
  fn send<'a>(
    &'a self,
    params: &'a TemplateParams,
  ) -> impl Future<Output = Result<(), TransportError>> + Send + 'a;
}

#[derive(Serialize)]
struct SendRequest<'a> {
  service_id:      &'a str,
  template_id:     &'a str,
  user_id:         &'a str,
  template_params: &'a TemplateParams,
}

/// The EmailJS-style REST implementation of [`TemplateTransport`].
#[derive(Clone)]
pub struct HttpTemplateTransport {
  client:      Client,
  endpoint:    String,
  credentials: TemplateCredentials,
}

impl HttpTemplateTransport {
  pub const DEFAULT_ENDPOINT: &'static str =
    "https://api.emailjs.com/api/v1.0/email/send";

  pub fn new(
    client: Client,
    endpoint: impl Into<String>,
    credentials: TemplateCredentials,
  ) -> Self {
    Self { client, endpoint: endpoint.into(), credentials }
  }
}

impl TemplateTransport for HttpTemplateTransport {
  async fn send(&self, params: &TemplateParams) -> Result<(), TransportError> {
    let body = SendRequest {
      service_id:      &self.credentials.service_id,
      template_id:     &self.credentials.template_id,
      user_id:         &self.credentials.public_key,
      template_params: params,
    };
    let resp = self.client.post(&self.endpoint).json(&body).send().await?;

    if !resp.status().is_success() {
      return Err(TransportError(format!(
        "templated send → {}",
        resp.status()
      )));
    }
    Ok(())
  }
}

// ─── Mailto draft ────────────────────────────────────────────────────────────

/// A pre-filled mail composition: the always-available fallback payload.
/// Opening it is the caller's concern; no delivery is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailtoDraft {
  pub to:      String,
  pub subject: String,
  pub body:    String,
}

impl MailtoDraft {
  /// The `mailto:` link for this draft, with subject and body
  /// percent-encoded.
  pub fn mailto_url(&self) -> String {
    format!(
      "mailto:{}?subject={}&body={}",
      self.to,
      utf8_percent_encode(&self.subject, NON_ALPHANUMERIC),
      utf8_percent_encode(&self.body, NON_ALPHANUMERIC),
    )
  }
}

// ─── Summary rendering ───────────────────────────────────────────────────────

pub fn format_date(date: NaiveDate) -> String {
  date.format("%d/%m/%Y").to_string()
}

/// The fully human-readable submission summary sent to the operator.
pub fn render_summary(
  memorial: &Memorial,
  requester: &Requester,
  memorial_url: &str,
  durable_saved: bool,
) -> String {
  let validated_line = if memorial.validated {
    "validated memorial (complete)"
  } else {
    "memorial not validated (incomplete)"
  };
  let durable_line = if durable_saved {
    "record saved to the durable store"
  } else {
    "durable store unavailable; this message is the only copy"
  };

  format!(
    "QR code request — everkeep\n\
     \n\
     REQUESTER:\n\
     Name: {}\n\
     Email: {}\n\
     Phone: {}\n\
     \n\
     MEMORIAL:\n\
     Name: {}\n\
     Resting place: {}\n\
     Born: {}\n\
     Died: {}\n\
     Age: {} years\n\
     Memorial URL: {memorial_url}\n\
     \n\
     STATUS: {validated_line}\n\
     {durable_line}\n\
     \n\
     Please get in touch to arrange the QR code.",
    requester.name,
    requester.email,
    requester.phone,
    memorial.full_name,
    memorial.resting_place,
    format_date(memorial.born),
    format_date(memorial.died),
    memorial.age_years(),
  )
}

/// Build the named template variables for the templated transport.
pub fn template_params(
  memorial: &Memorial,
  requester: &Requester,
  memorial_url: &str,
  operator_email: &str,
) -> TemplateParams {
  TemplateParams {
    requester_name:  requester.name.clone(),
    requester_email: requester.email.clone(),
    requester_phone: requester.phone.clone(),
    memorial_name:   memorial.full_name.clone(),
    memorial_place:  memorial.resting_place.clone(),
    memorial_born:   format_date(memorial.born),
    memorial_died:   format_date(memorial.died),
    memorial_url:    memorial_url.to_string(),
    to_email:        operator_email.to_string(),
  }
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// How a notification actually went out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum NotificationRoute {
  /// Sent through the templated transport.
  Templated,
  /// The templated transport was unavailable; the caller should present
  /// this pre-filled draft instead.
  Compose(MailtoDraft),
}

/// Routes one summary to a human: templated transport when configured,
/// compose fallback otherwise or on any transport failure.
pub struct Dispatcher<T> {
  transport:      Option<T>,
  operator_email: String,
}

impl<T: TemplateTransport> Dispatcher<T> {
  /// `transport` is `None` when the three credentials are not configured —
  /// a signal to skip straight to compose, not an error.
  pub fn new(transport: Option<T>, operator_email: impl Into<String>) -> Self {
    Self { transport, operator_email: operator_email.into() }
  }

  /// The fixed operator contact the fallback draft is addressed to.
  pub fn operator_email(&self) -> &str {
    &self.operator_email
  }

  /// Build the compose-fallback draft. Requires no network and never
  /// fails.
  pub fn compose(&self, subject: &str, body: &str) -> MailtoDraft {
    MailtoDraft {
      to:      self.operator_email.clone(),
      subject: subject.to_string(),
      body:    body.to_string(),
    }
  }

  /// Dispatch one notification: templated transport first when
  /// configured, compose fallback otherwise or on any transport failure.
  ///
  /// The fallback requires no network, so the only error left is a draft
  /// that cannot be addressed — no operator contact at all.
  pub async fn dispatch(
    &self,
    params: &TemplateParams,
    subject: &str,
    body: &str,
  ) -> Result<NotificationRoute, TransportError> {
    if let Some(transport) = &self.transport {
      match transport.send(params).await {
        Ok(()) => return Ok(NotificationRoute::Templated),
        Err(e) => {
          warn!(error = %e, "templated send failed; composing fallback");
        }
      }
    }
    if self.operator_email.trim().is_empty() {
      return Err(TransportError(
        "no operator contact configured; cannot compose fallback".into(),
      ));
    }
    Ok(NotificationRoute::Compose(self.compose(subject, body)))
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
