//! Outbound notification abstraction.
//!
//! The registration flow hands a template and a set of variables to a
//! [`Notifier`]; how (and whether) the message leaves the process is up to
//! the implementation. Delivery failures are reported, never retried here.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message templates the backend can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    ParticipantConfirmation,
    VolunteerConfirmation,
}

impl std::fmt::Display for NotificationTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationTemplate::ParticipantConfirmation => write!(f, "participant_confirmation"),
            NotificationTemplate::VolunteerConfirmation => write!(f, "volunteer_confirmation"),
        }
    }
}

/// Template variables, ordered for stable rendering and logging.
pub type NotificationVars = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifierError {
    #[error("Notifier is disabled")]
    Disabled,

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        to: &str,
        template: NotificationTemplate,
        vars: &NotificationVars,
    ) -> Result<(), NotifierError>;
}

/// A delivery captured by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub to: String,
    pub template: NotificationTemplate,
    pub vars: NotificationVars,
}

/// In-process notifier for development and tests.
///
/// Records every successful send; `failing()` rejects everything.
#[derive(Debug, Default)]
pub struct MockNotifier {
    pub simulate_failure: bool,
    sent: Mutex<Vec<SentNotification>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of deliveries so far.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Notifier for MockNotifier {
    async fn send(
        &self,
        to: &str,
        template: NotificationTemplate,
        vars: &NotificationVars,
    ) -> Result<(), NotifierError> {
        if self.simulate_failure {
            tracing::warn!(to = %to, template = %template, "Mock notifier simulating failure");
            return Err(NotifierError::Delivery("Simulated failure".to_string()));
        }

        tracing::info!(to = %to, template = %template, "Mock: would send notification");

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentNotification {
                to: to.to_string(),
                template,
                vars: vars.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_display() {
        assert_eq!(
            NotificationTemplate::ParticipantConfirmation.to_string(),
            "participant_confirmation"
        );
        assert_eq!(
            NotificationTemplate::VolunteerConfirmation.to_string(),
            "volunteer_confirmation"
        );
    }

    #[tokio::test]
    async fn test_mock_notifier_records_sends() {
        let notifier = MockNotifier::new();
        let mut vars = NotificationVars::new();
        vars.insert("name".to_string(), "Ada Lovelace".to_string());

        notifier
            .send(
                "ada@x.com",
                NotificationTemplate::ParticipantConfirmation,
                &vars,
            )
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@x.com");
        assert_eq!(sent[0].vars.get("name").map(String::as_str), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_mock_notifier_failure() {
        let notifier = MockNotifier::failing();
        let result = notifier
            .send(
                "ada@x.com",
                NotificationTemplate::VolunteerConfirmation,
                &NotificationVars::new(),
            )
            .await;

        assert!(matches!(result, Err(NotifierError::Delivery(_))));
        assert!(notifier.sent().is_empty());
    }
}
