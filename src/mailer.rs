//! Outbound mail for the contact relay.
//!
//! [`ContactEmail::compose`] renders a submission into an HTML part and a
//! plain-text part addressed to the site owner, with `Reply-To` set to the
//! visitor. Delivery goes through the [`Mailer`] trait; [`SmtpMailer`] is the
//! production implementation on lettre's tokio SMTP transport.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// A fully composed contact-form email.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEmail {
    /// Display name on the `From` header (the visitor's name).
    pub from_name: String,
    /// Envelope sender; the authenticated SMTP account.
    pub from_address: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl ContactEmail {
    /// Render a submission. `sender` is the SMTP account; `recipient` is the inbox.
    pub fn compose(name: &str, email: &str, message: &str, sender: &str, recipient: &str) -> Self {
        Self {
            from_name: name.to_string(),
            from_address: sender.to_string(),
            to: recipient.to_string(),
            reply_to: email.to_string(),
            subject: format!("New Contact Form Message from {}", name),
            html: render_html(name, email, message),
            text: render_text(name, email, message),
        }
    }

    /// Convert into a lettre message with a `multipart/alternative` body.
    pub fn to_message(&self) -> Result<Message> {
        let from_addr: Address = self
            .from_address
            .parse()
            .with_context(|| format!("invalid sender address: {}", self.from_address))?;
        let to_addr: Address = self
            .to
            .parse()
            .with_context(|| format!("invalid recipient address: {}", self.to))?;
        let reply_addr: Address = self
            .reply_to
            .parse()
            .with_context(|| format!("invalid reply-to address: {}", self.reply_to))?;

        let message = Message::builder()
            .from(Mailbox::new(Some(self.from_name.clone()), from_addr))
            .to(Mailbox::new(None, to_addr))
            .reply_to(Mailbox::new(None, reply_addr))
            .subject(self.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                self.text.clone(),
                self.html.clone(),
            ))
            .with_context(|| "failed to build contact email")?;
        Ok(message)
    }
}

/// Escape text for inclusion in HTML element content and attributes.
pub fn escape_html(input: &str) -> String {
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

const EMAIL_STYLE: &str = r#"
      body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
      .header { background: linear-gradient(135deg, #2d5016, #4a7c2a); color: white; padding: 30px; border-radius: 8px 8px 0 0; text-align: center; }
      .header h1 { margin: 0; font-size: 24px; font-weight: 900; letter-spacing: -0.02em; }
      .content { background: #f5f5f5; padding: 30px; border-radius: 0 0 8px 8px; }
      .field { margin-bottom: 20px; }
      .field-label { font-weight: 700; color: #2d5016; text-transform: uppercase; font-size: 12px; letter-spacing: 0.05em; margin-bottom: 5px; }
      .field-value { background: white; padding: 15px; border-radius: 6px; border-left: 4px solid #2d5016; }
      .message-box { background: white; padding: 20px; border-radius: 6px; border-left: 4px solid #2d5016; white-space: pre-wrap; word-wrap: break-word; }
      .footer { text-align: center; margin-top: 30px; color: #666; font-size: 14px; }
"#;

fn render_html(name: &str, email: &str, message: &str) -> String {
    let name = escape_html(name);
    let email = escape_html(email);
    let message = escape_html(message);
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <style>{style}</style>
  </head>
  <body>
    <div class="header">
      <h1>NEW CONTACT FORM MESSAGE</h1>
    </div>
    <div class="content">
      <div class="field">
        <div class="field-label">From</div>
        <div class="field-value">{name}</div>
      </div>
      <div class="field">
        <div class="field-label">Email</div>
        <div class="field-value">
          <a href="mailto:{email}" style="color: #2d5016; text-decoration: none;">{email}</a>
        </div>
      </div>
      <div class="field">
        <div class="field-label">Message</div>
        <div class="message-box">{message}</div>
      </div>
      <div class="footer">
        <p>This message was sent from your portfolio contact form.</p>
        <p style="color: #2d5016; font-weight: 600;">Click reply to respond directly to {email}</p>
      </div>
    </div>
  </body>
</html>
"#,
        style = EMAIL_STYLE,
        name = name,
        email = email,
        message = message,
    )
}

fn render_text(name: &str, email: &str, message: &str) -> String {
    format!(
        "New Contact Form Message\n\nFrom: {name}\nEmail: {email}\n\nMessage:\n{message}\n\n---\nThis message was sent from your portfolio contact form.\nReply directly to this email to respond to {email}\n"
    )
}

/// Delivers composed contact emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Attempt delivery once. No retry, no queueing.
    async fn send(&self, email: &ContactEmail) -> Result<()>;
}

/// SMTP delivery via lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. Implicit TLS when `secure`, STARTTLS otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if `smtp.host` is unset or the TLS relay cannot be
    /// configured for it.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("smtp.host (SMTP_HOST) not set"))?;

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .with_context(|| format!("failed to configure SMTP relay for {}", host))?;

        let mut builder = builder.port(config.port);
        if let (Some(user), Some(pass)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &ContactEmail) -> Result<()> {
        let message = email.to_message()?;
        let response = self
            .transport
            .send(message)
            .await
            .with_context(|| "SMTP delivery failed")?;
        tracing::debug!(code = %response.code(), "smtp accepted message");
        Ok(())
    }
}

/// Mailer used when SMTP is not configured. Every send fails.
pub struct UnconfiguredMailer;

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(&self, _email: &ContactEmail) -> Result<()> {
        anyhow::bail!("SMTP is not configured (set SMTP_HOST, SMTP_USER, SMTP_PASS)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContactEmail {
        ContactEmail::compose(
            "Ada Lovelace",
            "ada@example.com",
            "Hello <b>there</b>\nSecond line",
            "relay@example.com",
            "inbox@example.com",
        )
    }

    #[test]
    fn test_compose_headers() {
        let email = sample();
        assert_eq!(email.reply_to, "ada@example.com");
        assert_eq!(email.from_name, "Ada Lovelace");
        assert_eq!(email.from_address, "relay@example.com");
        assert_eq!(email.to, "inbox@example.com");
        assert_eq!(email.subject, "New Contact Form Message from Ada Lovelace");
    }

    #[test]
    fn test_html_part_escapes_user_text() {
        let email = sample();
        assert!(email.html.contains("Hello &lt;b&gt;there&lt;/b&gt;"));
        assert!(!email.html.contains("<b>there</b>"));
        assert!(email.html.contains("mailto:ada@example.com"));
    }

    #[test]
    fn test_text_part_is_verbatim() {
        let email = sample();
        assert!(email.text.contains("From: Ada Lovelace"));
        assert!(email.text.contains("Hello <b>there</b>\nSecond line"));
        assert!(email.text.contains("respond to ada@example.com"));
    }

    #[test]
    fn test_to_message_builds() {
        let message = sample().to_message().unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Reply-To: ada@example.com"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_to_message_rejects_bad_reply_to() {
        let mut email = sample();
        email.reply_to = "not an address".into();
        assert!(email.to_message().is_err());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b "c" 'd'"#), "a&amp;b &quot;c&quot; &#39;d&#39;");
    }

    #[test]
    fn test_smtp_mailer_requires_host() {
        assert!(SmtpMailer::new(&SmtpConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_fails() {
        assert!(UnconfiguredMailer.send(&sample()).await.is_err());
    }
}
