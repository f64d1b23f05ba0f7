//! Email delivery for registration confirmations.
//!
//! Providers:
//! - `console`: logs the rendered message (development)
//! - `sendgrid`: SendGrid v3 mail API over reqwest

use async_trait::async_trait;
use domain::services::{NotificationTemplate, NotificationVars, Notifier, NotifierError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::EmailConfig;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// A rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
}

#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Renders the confirmation email for a template.
    pub fn render(
        &self,
        to: &str,
        template: NotificationTemplate,
        vars: &NotificationVars,
    ) -> EmailMessage {
        let var = |key: &str| vars.get(key).map(String::as_str).unwrap_or_default();
        let event = &self.config.event_name;
        let first_name = var("firstName");
        let code = var("registrationCode");

        let (role, extra) = match template {
            NotificationTemplate::ParticipantConfirmation => (
                "participant",
                "Please bring this code with you; it will be used to check you in at the venue."
                    .to_string(),
            ),
            NotificationTemplate::VolunteerConfirmation => (
                "volunteer",
                match vars.get("departments") {
                    Some(d) => format!(
                        "You signed up to serve in: {}. Present this code at the volunteer desk.",
                        d
                    ),
                    None => "Present this code at the volunteer desk.".to_string(),
                },
            ),
        };

        let status_link = if self.config.base_url.is_empty() {
            None
        } else {
            Some(format!(
                "{}/registration/{}",
                self.config.base_url.trim_end_matches('/'),
                code
            ))
        };

        let subject = format!("Your {} registration - {}", role, event);

        let body_text = format!(
            "Hi {first_name},\n\n\
             Thank you for registering as a {role} for {event}.\n\n\
             Your registration code is: {code}\n\n\
             {extra}\n\
             {link}\n\
             See you there,\n\
             The {event} Team",
            link = status_link
                .as_ref()
                .map(|l| format!("\nCheck your registration status at {}\n", l))
                .unwrap_or_default(),
        );

        let body_html = (self.config.template_style == "html").then(|| {
            format!(
                r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{subject}</title></head>
<body style="font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #3b5bdb; padding: 24px; border-radius: 10px 10px 0 0;">
        <h1 style="color: white; margin: 0; font-size: 22px;">{event}</h1>
    </div>
    <div style="background: #f9f9f9; padding: 24px; border-radius: 0 0 10px 10px;">
        <p>Hi {first_name},</p>
        <p>Thank you for registering as a {role}.</p>
        <p style="text-align: center; font-size: 24px; font-weight: bold; letter-spacing: 2px;">{code}</p>
        <p>{extra}</p>
        {link}
    </div>
</body>
</html>"#,
                subject = html_escape(&subject),
                first_name = html_escape(first_name),
                event = html_escape(event),
                code = html_escape(code),
                extra = html_escape(&extra),
                link = status_link
                    .as_ref()
                    .map(|l| format!(
                        r#"<p><a href="{0}" style="color: #3b5bdb;">View your registration</a></p>"#,
                        html_escape(l)
                    ))
                    .unwrap_or_default(),
            )
        });

        EmailMessage {
            to: to.to_string(),
            to_name: vars.get("name").cloned(),
            subject,
            body_text,
            body_html,
        }
    }

    async fn deliver(&self, message: EmailMessage) -> Result<(), NotifierError> {
        match self.config.provider.as_str() {
            "console" => {
                info!(
                    to = %message.to,
                    subject = %message.subject,
                    body = %message.body_text,
                    "Email (console provider)"
                );
                Ok(())
            }
            "sendgrid" => self.send_sendgrid(&message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(NotifierError::Delivery(format!(
                    "Unknown email provider: {}",
                    provider
                )))
            }
        }
    }

    async fn send_sendgrid(&self, message: &EmailMessage) -> Result<(), NotifierError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(NotifierError::Delivery(
                "SendGrid API key is not configured".to_string(),
            ));
        }

        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&sendgrid_body(&self.config, message))
            .send()
            .await
            .map_err(|e| NotifierError::Delivery(format!("SendGrid request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            info!(to = %message.to, subject = %message.subject, "Email sent via SendGrid");
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, error = %error_body, "SendGrid API error");
        Err(NotifierError::Delivery(format!(
            "SendGrid returned {}",
            status
        )))
    }
}

fn sendgrid_body(config: &EmailConfig, message: &EmailMessage) -> serde_json::Value {
    let mut recipient = serde_json::json!({ "email": message.to });
    if let Some(name) = &message.to_name {
        recipient["name"] = serde_json::json!(name);
    }

    let mut content = vec![serde_json::json!({
        "type": "text/plain",
        "value": message.body_text,
    })];
    if let Some(html) = &message.body_html {
        content.push(serde_json::json!({ "type": "text/html", "value": html }));
    }

    serde_json::json!({
        "personalizations": [{ "to": [recipient] }],
        "from": { "email": config.sender_email, "name": config.sender_name },
        "subject": message.subject,
        "content": content,
    })
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[async_trait]
impl Notifier for EmailService {
    async fn send(
        &self,
        to: &str,
        template: NotificationTemplate,
        vars: &NotificationVars,
    ) -> Result<(), NotifierError> {
        if !self.config.enabled {
            debug!(to = %to, template = %template, "Email disabled, skipping send");
            return Err(NotifierError::Disabled);
        }
        if !shared::validation::is_valid_email(to) {
            return Err(NotifierError::InvalidRecipient(to.to_string()));
        }

        let message = self.render(to, template, vars);
        self.deliver(message).await
    }
}
