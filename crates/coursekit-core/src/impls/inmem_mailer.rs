//! MemoryMailer - 送信したメールを保持するだけの Mailer
//!
//! CLI のデモとテストで、ワーカーが何を送ったかを確認するために使います。
//! `fail_next(n)` で次の n 回の送信を失敗させ、リトライ経路を再現できます。

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::ports::{EmailMessage, MailError, Mailer};

#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<EmailMessage>>,
    failures_left: AtomicU32,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` sends fail with a transport error.
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .iter()
            .filter(|m| m.to.iter().any(|to| to == address))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        self.outbox.lock().push(message);
        Ok(())
    }
}
