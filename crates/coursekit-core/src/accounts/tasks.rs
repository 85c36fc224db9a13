//! Account notification tasks (run by workers).
//!
//! Every handler tolerates duplicate execution: the worst case is a second
//! copy of the same email. A user that no longer exists is logged and the
//! task completes, since retrying cannot make the row appear. Mail transport
//! errors are returned so the broker retries them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::domain::{User, UserId};
use crate::error::TaskError;
use crate::ports::{EmailMessage, TokenPurpose};
use crate::tasks::{Handler, RegistryError, Task, TaskRegistry};

/// Args: `(user_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendConfirmationMessage(pub UserId);

impl Task for SendConfirmationMessage {
    const TYPE: &'static str = "accounts.email.confirmation.v1";
}

/// Args: `(email, reset_url)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendResetEmail(pub String, pub String);

impl Task for SendResetEmail {
    const TYPE: &'static str = "accounts.email.password_reset.v1";
}

/// Args: `(user_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendAccountChangesMessage(pub UserId);

impl Task for SendAccountChangesMessage {
    const TYPE: &'static str = "accounts.email.account_changes.v1";
}

/// Every task type the account service enqueues.
pub const ACCOUNT_TASK_TYPES: &[&str] = &[
    SendConfirmationMessage::TYPE,
    SendResetEmail::TYPE,
    SendAccountChangesMessage::TYPE,
];

pub fn register_account_tasks(
    registry: &mut TaskRegistry,
    state: &Arc<AppState>,
) -> Result<(), RegistryError> {
    registry.register::<SendConfirmationMessage, _>(AccountMailHandler::new(state))?;
    registry.register::<SendResetEmail, _>(AccountMailHandler::new(state))?;
    registry.register::<SendAccountChangesMessage, _>(AccountMailHandler::new(state))?;
    Ok(())
}

/// One handler type for all account mail; each task gets its own `Handler` impl.
#[derive(Clone)]
pub struct AccountMailHandler {
    state: Arc<AppState>,
}

impl AccountMailHandler {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self {
            state: Arc::clone(state),
        }
    }

    async fn load_user(&self, task_type: &str, id: UserId) -> Result<Option<User>, TaskError> {
        let user = self.state.users.get(&id).await.map_err(TaskError::handler)?;
        if user.is_none() {
            warn!(task_type, user_id = %id, "user not found; nothing to send");
        }
        Ok(user)
    }

    async fn deliver(&self, task_type: &str, message: EmailMessage) -> Result<(), TaskError> {
        let to = message.to.join(", ");
        let message = message.with_from(self.state.config.admin_email.clone());
        match self.state.mailer.send(message).await {
            Ok(()) => {
                info!(task_type, to = %to, "email sent");
                Ok(())
            }
            Err(e) => {
                error!(task_type, to = %to, error = %e, "sending email failed");
                Err(TaskError::handler(e))
            }
        }
    }
}

#[async_trait]
impl Handler<SendConfirmationMessage> for AccountMailHandler {
    async fn handle(&self, task: SendConfirmationMessage) -> Result<(), TaskError> {
        let SendConfirmationMessage(user_id) = task;
        let Some(user) = self.load_user(SendConfirmationMessage::TYPE, user_id).await? else {
            return Ok(());
        };

        let token = self
            .state
            .tokens
            .issue(user.id, TokenPurpose::EmailConfirmation);
        let url = confirmation_url(self.state.config.frontend_base(), user.id, &token);
        self.deliver(SendConfirmationMessage::TYPE, confirmation_email(&user, &url))
            .await
    }
}

#[async_trait]
impl Handler<SendResetEmail> for AccountMailHandler {
    async fn handle(&self, task: SendResetEmail) -> Result<(), TaskError> {
        let SendResetEmail(email, reset_url) = task;
        self.deliver(SendResetEmail::TYPE, reset_email(&email, &reset_url))
            .await
    }
}

#[async_trait]
impl Handler<SendAccountChangesMessage> for AccountMailHandler {
    async fn handle(&self, task: SendAccountChangesMessage) -> Result<(), TaskError> {
        let SendAccountChangesMessage(user_id) = task;
        let Some(user) = self.load_user(SendAccountChangesMessage::TYPE, user_id).await? else {
            return Ok(());
        };
        self.deliver(SendAccountChangesMessage::TYPE, account_changes_email(&user))
            .await
    }
}

pub fn confirmation_url(frontend: &str, user: UserId, token: &str) -> String {
    format!(
        "{frontend}/email-confirmation?uid={}&token={token}",
        user.as_ulid()
    )
}

pub fn reset_url(frontend: &str, user: UserId, token: &str) -> String {
    format!("{frontend}/password/reset/{}/{token}/", user.as_ulid())
}

fn confirmation_email(user: &User, url: &str) -> EmailMessage {
    let body = format!(
        "Hi {},\n\n\
         Please confirm your email address by clicking the link below:\n\
         {url}\n\n\
         Thank you!",
        user.name
    );
    EmailMessage::new("Please confirm your email address", body, user.email.clone())
}

fn reset_email(email: &str, url: &str) -> EmailMessage {
    let html = format!(
        r#"<html>
<body>
  <h2>Password Reset Request</h2>
  <p>Hello,</p>
  <p>We received a request to reset the password of the account registered with this email address.</p>
  <p>You can choose a new password with the link below:</p>
  <a href="{url}" style="padding: 10px 20px; background-color: #4CAF50; color: white; text-decoration: none; border-radius: 5px;">Reset Password</a>
  <p>If you did not ask for this, you can ignore this email. If you suspect someone else has access to your account, please secure it.</p>
  <p>This link expires in 24 hours.</p>
  <p>Best regards,<br>The Coursekit Team</p>
</body>
</html>"#
    );
    EmailMessage::new("Reset your password", "", email).with_html(html)
}

fn account_changes_email(user: &User) -> EmailMessage {
    let html = format!(
        r#"<html>
<body>
  <h2>Account Changes Notification</h2>
  <p>Hello <strong>{name}</strong>,</p>
  <p>Changes were just made to your account. If this was not you, please secure your account and contact our support team right away.</p>
  <p>If you made these changes, no further action is required.</p>
  <p>Best regards,<br>The Coursekit Team</p>
</body>
</html>"#,
        name = user.name
    );
    let text = format!(
        "Hello {},\n\n\
         Changes were just made to your account. If this was not you, please secure \
         your account and contact our support team right away.\n\n\
         If you made these changes, no further action is required.\n\n\
         Best regards,\n\
         The Coursekit Team",
        user.name
    );
    EmailMessage::new("Account changes notification", text, user.email.clone()).with_html(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{ArgsCodec, DynHandler, TypedHandler};
    use crate::testing::TestApp;
    use serde_json::json;
    use ulid::Ulid;

    #[test]
    fn tasks_encode_as_positional_ids_and_strings() {
        let id = UserId::from_ulid(Ulid::new());
        assert_eq!(
            ArgsCodec::encode(&SendConfirmationMessage(id)).unwrap(),
            vec![json!(id.as_ulid().to_string())]
        );
        assert_eq!(
            ArgsCodec::encode(&SendResetEmail("a@example.com".into(), "http://x/".into())).unwrap(),
            vec![json!("a@example.com"), json!("http://x/")]
        );
    }

    #[test]
    fn links_point_at_the_frontend() {
        let id = UserId::from_ulid(Ulid::new());
        let ulid = id.as_ulid();
        assert_eq!(
            confirmation_url("http://localhost:3000", id, "tok"),
            format!("http://localhost:3000/email-confirmation?uid={ulid}&token=tok")
        );
        assert_eq!(
            reset_url("http://localhost:3000", id, "tok"),
            format!("http://localhost:3000/password/reset/{ulid}/tok/")
        );
    }

    #[tokio::test]
    async fn confirmation_mail_carries_a_verifiable_token() {
        let app = TestApp::new();
        let user = app.seed_user("ada@example.com", "Ada").await;

        let handler = TypedHandler::<SendConfirmationMessage, _>::new(AccountMailHandler::new(&app.state));
        handler
            .handle_dyn(&ArgsCodec::encode(&SendConfirmationMessage(user.id)).unwrap())
            .await
            .unwrap();

        let sent = app.mailer.sent_to("ada@example.com");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Please confirm your email address");
        assert_eq!(sent[0].from.as_deref(), Some("admin@coursekit.test"));

        let token = sent[0].body.rsplit("token=").next().unwrap().lines().next().unwrap();
        assert!(app.state.tokens.verify(user.id, TokenPurpose::EmailConfirmation, token));
    }

    #[tokio::test]
    async fn missing_user_completes_without_mail() {
        let app = TestApp::new();
        let ghost = UserId::from_ulid(Ulid::new());

        let handler = AccountMailHandler::new(&app.state);
        Handler::<SendAccountChangesMessage>::handle(&handler, SendAccountChangesMessage(ghost))
            .await
            .unwrap();
        assert!(app.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn transport_errors_are_returned_for_retry() {
        let app = TestApp::new();
        app.mailer.fail_next(1);

        let handler = AccountMailHandler::new(&app.state);
        let task = SendResetEmail("a@example.com".into(), "http://x/reset/".into());
        let err = Handler::<SendResetEmail>::handle(&handler, task.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Handler(_)));

        Handler::<SendResetEmail>::handle(&handler, task).await.unwrap();
        let sent = app.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html_body.as_deref().unwrap().contains("http://x/reset/"));
    }
}
