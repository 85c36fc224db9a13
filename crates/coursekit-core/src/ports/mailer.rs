//! Mailer port - 送信メールの抽象化
//!
//! 本番では SMTP などのトランスポートが実装になります。

use async_trait::async_trait;
use serde::Serialize;

/// One outbound email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    pub html_body: Option<String>,
    /// `None` uses the transport's default sender.
    pub from: Option<String>,
    pub to: Vec<String>,
}

impl EmailMessage {
    pub fn new(subject: impl Into<String>, body: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            html_body: None,
            from: None,
            to: vec![to.into()],
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn with_from(mut self, from: Option<String>) -> Self {
        self.from = from;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    #[error("mail transport failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}
