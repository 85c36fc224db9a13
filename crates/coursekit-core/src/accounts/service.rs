//! Account operations: registration, email confirmation, login, password reset, profile.
//!
//! Email uniqueness is enforced by the store write itself (`save_unique`), so
//! two concurrent requests for the same address cannot both succeed.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::tasks::{SendAccountChangesMessage, SendConfirmationMessage, SendResetEmail, reset_url};
use crate::app::AppState;
use crate::billing::CreatePaymentCustomer;
use crate::domain::{User, UserId};
use crate::error::CoreError;
use crate::ports::{Record, TokenPurpose};
use crate::serializer::validation::{self, ValidationErrors};
use crate::serializer::{FieldMask, FieldWriter, PasswordPair, PasswordPolicy};

pub const EMAIL_TAKEN: &str = "A user with this email already exists.";
pub const INVALID_TOKEN: &str = "Invalid or expired token.";

/// Fields a registration form may set besides the password pair.
const REGISTER_FIELDS: [&str; 3] = ["name", "email", "avatar"];

#[derive(Clone)]
pub struct AccountService {
    state: Arc<AppState>,
    policy: PasswordPolicy,
}

impl AccountService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            policy: PasswordPolicy::default(),
        }
    }

    /// Create an active, unverified account and enqueue the confirmation email
    /// and the payment-customer creation.
    ///
    /// Payload: `name`, `email`, `password1`, `password2`, optional `avatar`.
    /// All field errors are reported together.
    pub async fn register(&self, payload: &Map<String, Value>) -> Result<User, CoreError> {
        let user = self.create_account(payload).await?;
        info!(user_id = %user.id, "user registered");

        self.state
            .dispatcher
            .enqueue_side_effect(&SendConfirmationMessage(user.id))
            .await?;
        self.state
            .dispatcher
            .enqueue_side_effect(&CreatePaymentCustomer(user.id))
            .await?;
        Ok(user)
    }

    /// Create a verified staff account with the `admin` role. Same payload as `register`;
    /// no confirmation email is sent.
    pub async fn create_superuser(&self, payload: &Map<String, Value>) -> Result<User, CoreError> {
        let mut user = self.create_account(payload).await?;
        user.promote_to_admin();
        self.state.users.save(user.clone()).await?;
        info!(user_id = %user.id, "superuser created");

        self.state
            .dispatcher
            .enqueue_side_effect(&CreatePaymentCustomer(user.id))
            .await?;
        Ok(user)
    }

    async fn create_account(&self, payload: &Map<String, Value>) -> Result<User, CoreError> {
        let draft = User::new(self.state.ids.generate(), self.state.clock.now());
        let mut errors = ValidationErrors::new();

        let staged = FieldWriter::only(REGISTER_FIELDS)
            .apply(&draft, payload, false)
            .map_err(|e| errors.merge(e))
            .ok();

        let attributes = [
            ("email", payload_str(payload, "email")),
            ("name", payload_str(payload, "name")),
        ];
        let password = PasswordPair::REGISTER
            .validate(payload, &self.policy, &attributes)
            .map_err(|e| errors.merge(e))
            .ok();

        if let Some(user) = &staged
            && self.find_by_email(&user.email).await?.is_some()
        {
            errors.add("email", EMAIL_TAKEN);
        }

        let (Some(mut user), Some(password), true) = (staged, password, errors.is_empty()) else {
            return Err(errors.into());
        };

        user.password_hash = self.hash_password(password).await?;
        // authoritative check, atomic with the insert
        let clash = same_email(&user.email);
        if !self.state.users.save_unique(user.clone(), &clash).await? {
            return Err(CoreError::validation("email", EMAIL_TAKEN));
        }
        Ok(user)
    }

    /// Mark the account verified when `token` is a live confirmation token for `uid`.
    pub async fn confirm_email(&self, uid: &str, token: &str) -> Result<User, CoreError> {
        let mut user = self.user_by_uid(uid).await?;
        if !self
            .state
            .tokens
            .verify(user.id, TokenPurpose::EmailConfirmation, token)
        {
            return Err(CoreError::validation("token", INVALID_TOKEN));
        }

        user.is_active = true;
        user.is_verified = true;
        self.state.users.save(user.clone()).await?;
        self.state
            .tokens
            .revoke(user.id, TokenPurpose::EmailConfirmation);
        info!(user_id = %user.id, "email confirmed");
        Ok(user)
    }

    /// Issue a reset token and enqueue the reset email. Payload: `email`.
    pub async fn request_password_reset(&self, payload: &Map<String, Value>) -> Result<(), CoreError> {
        let email = match payload.get("email") {
            Some(value) => validation::email(value)
                .map_err(|messages| field_errors("email", messages))?,
            None => return Err(CoreError::validation("email", validation::REQUIRED)),
        };

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| CoreError::not_found(User::KIND, &email))?;

        let token = self.state.tokens.issue(user.id, TokenPurpose::PasswordReset);
        let url = reset_url(self.state.config.frontend_base(), user.id, &token);
        self.state
            .dispatcher
            .enqueue_side_effect(&SendResetEmail(user.email.clone(), url))
            .await?;
        info!(user_id = %user.id, "password reset requested");
        Ok(())
    }

    /// Set a new password from a reset link. Payload: `new_password1`, `new_password2`.
    /// Nothing is stored unless every check passes.
    pub async fn reset_password(
        &self,
        uid: &str,
        token: &str,
        payload: &Map<String, Value>,
    ) -> Result<(), CoreError> {
        let mut user = match self.user_by_uid(uid).await {
            Ok(user) => user,
            Err(CoreError::NotFound { .. }) => return Err(CoreError::InvalidToken),
            Err(e) => return Err(e),
        };
        if !self
            .state
            .tokens
            .verify(user.id, TokenPurpose::PasswordReset, token)
        {
            return Err(CoreError::InvalidToken);
        }

        let password =
            PasswordPair::RESET.validate(payload, &self.policy, &user.similarity_attributes())?;

        user.password_hash = self.hash_password(password).await?;
        self.state.users.save(user.clone()).await?;
        self.state.tokens.revoke(user.id, TokenPurpose::PasswordReset);
        info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Write profile fields and enqueue the account-changes notice.
    /// Returns the updated profile.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        payload: &Map<String, Value>,
        partial: bool,
    ) -> Result<Map<String, Value>, CoreError> {
        let user = self.user(user_id).await?;
        let updated = FieldWriter::only(User::PROFILE_FIELDS.iter().copied())
            .apply(&user, payload, partial)?;

        let clash = same_email(&updated.email);
        if !self.state.users.save_unique(updated.clone(), &clash).await? {
            return Err(CoreError::validation("email", EMAIL_TAKEN));
        }
        info!(user_id = %updated.id, partial, "profile updated");

        self.state
            .dispatcher
            .enqueue_side_effect(&SendAccountChangesMessage(updated.id))
            .await?;
        Ok(FieldMask::all().serialize(&updated, &self.state.media))
    }

    pub async fn profile(
        &self,
        user_id: UserId,
        mask: &FieldMask,
    ) -> Result<Map<String, Value>, CoreError> {
        let user = self.user(user_id).await?;
        Ok(mask.serialize(&user, &self.state.media))
    }

    /// Authenticate by email and password and stamp `last_login`.
    ///
    /// Bad credentials and deactivated accounts fail with `InvalidCredentials`;
    /// correct credentials on an unconfirmed address fail with `EmailNotVerified`.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, CoreError> {
        let Some(mut user) = self.authenticate(email, password).await? else {
            warn!("login rejected: invalid credentials");
            return Err(CoreError::InvalidCredentials);
        };
        if !user.is_verified {
            warn!(user_id = %user.id, "login rejected: email not verified");
            return Err(CoreError::EmailNotVerified);
        }

        user.last_login = Some(self.state.clock.now());
        self.state.users.save(user.clone()).await?;
        info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    /// Check a login password against the stored hash (verification state is ignored).
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<bool, CoreError> {
        Ok(self.authenticate(email, password).await?.is_some())
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, CoreError> {
        let Some(user) = self.find_by_email(&validation::normalize_email(email.trim())).await?
        else {
            return Ok(None);
        };
        if !user.is_active || user.password_hash.is_empty() {
            return Ok(None);
        }
        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| CoreError::PasswordHash(e.to_string()))?
            .map_err(|e| CoreError::PasswordHash(e.to_string()))?;
        Ok(matches.then_some(user))
    }

    async fn user(&self, id: UserId) -> Result<User, CoreError> {
        self.state
            .users
            .get(&id)
            .await?
            .ok_or_else(|| CoreError::not_found(User::KIND, id))
    }

    async fn user_by_uid(&self, uid: &str) -> Result<User, CoreError> {
        let id: UserId = uid
            .parse()
            .map_err(|_| CoreError::not_found(User::KIND, uid))?;
        self.user(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        let found = self.state.users.find(&same_email(email)).await?;
        Ok(found.into_iter().next())
    }

    async fn hash_password(&self, password: String) -> Result<String, CoreError> {
        let cost = self.state.config.password_hash_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| CoreError::PasswordHash(e.to_string()))?
            .map_err(|e| CoreError::PasswordHash(e.to_string()))
    }
}

/// Live accounts whose address equals `email`, ignoring case.
fn same_email(email: &str) -> impl Fn(&User) -> bool + Send + Sync + use<> {
    let email = email.to_lowercase();
    move |u| !u.is_deleted && u.email.to_lowercase() == email
}

fn payload_str<'a>(payload: &'a Map<String, Value>, field: &str) -> &'a str {
    payload.get(field).and_then(Value::as_str).unwrap_or_default()
}

fn field_errors(field: &str, messages: Vec<String>) -> CoreError {
    let mut errors = ValidationErrors::new();
    errors.extend(field, messages);
    CoreError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::password::MISMATCH;
    use crate::tasks::Task;
    use crate::testing::TestApp;
    use crate::queue::Broker;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn registration() -> Map<String, Value> {
        obj(json!({
            "name": "Jane Doe",
            "email": "jane@Example.COM",
            "password1": "correct-horse-battery",
            "password2": "correct-horse-battery",
        }))
    }

    #[tokio::test]
    async fn register_persists_and_enqueues_confirmation() {
        let app = TestApp::new();
        let accounts = AccountService::new(app.state.clone());

        let user = accounts.register(&registration()).await.unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert!(user.is_active);
        assert!(!user.is_verified);
        assert!(user.password_hash.starts_with("$2"));

        let stored = app.state.users.get(&user.id).await.unwrap().unwrap();
        assert_eq!(stored, user);

        let lease = app.broker.lease().await.unwrap();
        assert_eq!(lease.envelope().task_type.as_str(), SendConfirmationMessage::TYPE);
        assert_eq!(lease.envelope().args, vec![json!(user.id)]);
    }

    #[tokio::test]
    async fn register_reports_every_field_error_and_stores_nothing() {
        let app = TestApp::new();
        let accounts = AccountService::new(app.state.clone());
        let payload = obj(json!({
            "email": "not-an-email",
            "password1": "abc",
            "password2": "xyz",
        }));

        let err = accounts.register(&payload).await.unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["email", "name", "password1", "password2"]
        );
        assert_eq!(errors.get("password2").unwrap(), [MISMATCH]);
        assert_eq!(app.broker.counts().await.total(), 0);
        assert!(app.state.users.find(&|_: &User| true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_rejects_a_taken_email_case_insensitively() {
        let app = TestApp::new();
        app.seed_user("jane@example.com", "Jane").await;
        let accounts = AccountService::new(app.state.clone());

        let mut payload = registration();
        payload.insert("email".into(), json!("JANE@example.com"));
        let err = accounts.register(&payload).await.unwrap_err();
        assert_eq!(err.validation_errors().unwrap().get("email").unwrap(), [EMAIL_TAKEN]);
    }

    #[tokio::test]
    async fn confirm_email_checks_the_issued_token() {
        let app = TestApp::new();
        let mut user = app.seed_user("jane@example.com", "Jane").await;
        user.is_verified = false;
        app.state.users.save(user.clone()).await.unwrap();
        let accounts = AccountService::new(app.state.clone());
        let uid = user.id.as_ulid().to_string();

        let err = accounts.confirm_email(&uid, "forged").await.unwrap_err();
        assert_eq!(err.validation_errors().unwrap().get("token").unwrap(), [INVALID_TOKEN]);

        let token = app.state.tokens.issue(user.id, TokenPurpose::EmailConfirmation);
        let confirmed = accounts.confirm_email(&uid, &token).await.unwrap();
        assert!(confirmed.is_verified);

        let missing = accounts.confirm_email("01ARZ3NDEKTSV4RRFFQ69G5FAV", &token).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn password_reset_round_trip() {
        let app = TestApp::new();
        let user = app.seed_user("jane@example.com", "Jane").await;
        let accounts = AccountService::new(app.state.clone());

        accounts
            .request_password_reset(&obj(json!({"email": "jane@example.com"})))
            .await
            .unwrap();

        let lease = app.broker.lease().await.unwrap();
        let args = &lease.envelope().args;
        assert_eq!(lease.envelope().task_type.as_str(), SendResetEmail::TYPE);
        assert_eq!(args[0], json!("jane@example.com"));
        let url = args[1].as_str().unwrap().to_string();
        let prefix = format!("http://localhost:3000/password/reset/{}/", user.id.as_ulid());
        let token = url.strip_prefix(&prefix).unwrap().trim_end_matches('/');

        let payload = obj(json!({
            "new_password1": "a-much-better-secret",
            "new_password2": "a-much-better-secret",
        }));
        accounts
            .reset_password(&user.id.as_ulid().to_string(), token, &payload)
            .await
            .unwrap();
        assert!(accounts.verify_password("jane@example.com", "a-much-better-secret").await.unwrap());

        // token is single-use
        let again = accounts
            .reset_password(&user.id.as_ulid().to_string(), token, &payload)
            .await;
        assert!(matches!(again, Err(CoreError::InvalidToken)));
    }

    #[tokio::test]
    async fn invalid_reset_payload_changes_nothing() {
        let app = TestApp::new();
        let user = app.seed_user("jane@example.com", "Jane").await;
        let accounts = AccountService::new(app.state.clone());
        let token = app.state.tokens.issue(user.id, TokenPurpose::PasswordReset);

        let payload = obj(json!({"new_password1": "abc", "new_password2": "xyz"}));
        let err = accounts
            .reset_password(&user.id.to_string(), &token, &payload)
            .await
            .unwrap_err();

        let errors = err.validation_errors().unwrap();
        assert!(!errors.get("new_password1").unwrap().is_empty());
        assert_eq!(errors.get("new_password2").unwrap(), [MISMATCH]);
        assert_eq!(app.state.users.get(&user.id).await.unwrap().unwrap(), user);
        assert!(app.state.tokens.verify(user.id, TokenPurpose::PasswordReset, &token));
    }

    #[tokio::test]
    async fn reset_request_for_unknown_email_is_not_found() {
        let app = TestApp::new();
        let accounts = AccountService::new(app.state.clone());

        let err = accounts
            .request_password_reset(&obj(json!({"email": "nobody@example.com"})))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = accounts.request_password_reset(&Map::new()).await.unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().get("email").unwrap(),
            [validation::REQUIRED]
        );
    }

    #[tokio::test]
    async fn partial_profile_update_notifies_the_user() {
        let app = TestApp::new();
        let user = app.seed_user("jane@example.com", "Jane").await;
        let accounts = AccountService::new(app.state.clone());

        let profile = accounts
            .update_profile(user.id, &obj(json!({"bio": "Teaches Rust", "role": "admin"})), true)
            .await
            .unwrap();
        assert_eq!(profile["bio"], "Teaches Rust");
        assert_eq!(profile["role"], "user");
        assert!(!profile.contains_key("password_hash"));

        let lease = app.broker.lease().await.unwrap();
        assert_eq!(lease.envelope().task_type.as_str(), SendAccountChangesMessage::TYPE);
    }

    #[tokio::test]
    async fn full_profile_update_requires_name_and_email() {
        let app = TestApp::new();
        let user = app.seed_user("jane@example.com", "Jane").await;
        let accounts = AccountService::new(app.state.clone());

        let err = accounts
            .update_profile(user.id, &obj(json!({"bio": "x"})), false)
            .await
            .unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().fields().collect::<Vec<_>>(),
            vec!["email", "name"]
        );
        assert_eq!(app.broker.counts().await.total(), 0);
    }

    #[tokio::test]
    async fn profile_honours_the_mask() {
        let app = TestApp::new();
        let user = app.seed_user("jane@example.com", "Jane").await;
        let accounts = AccountService::new(app.state.clone());

        let out = accounts
            .profile(user.id, &FieldMask::only(["name", "email"]))
            .await
            .unwrap();
        assert_eq!(Value::Object(out), json!({"email": "jane@example.com", "name": "Jane"}));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_registrations_keep_one_account_per_email() {
        let app = TestApp::new();
        let accounts = AccountService::new(app.state.clone());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let accounts = accounts.clone();
                tokio::spawn(async move { accounts.register(&registration()).await })
            })
            .collect();
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let err = results.into_iter().find_map(Result::err).unwrap();
        assert_eq!(err.validation_errors().unwrap().get("email").unwrap(), [EMAIL_TAKEN]);

        let users = app
            .state
            .users
            .find(&|u: &User| u.email == "jane@example.com")
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn profile_email_change_cannot_take_another_address() {
        let app = TestApp::new();
        app.seed_user("taken@example.com", "Taken").await;
        let jane = app.seed_user("jane@example.com", "Jane").await;
        let accounts = AccountService::new(app.state.clone());

        let err = accounts
            .update_profile(jane.id, &obj(json!({"email": "TAKEN@example.com"})), true)
            .await
            .unwrap_err();
        assert_eq!(err.validation_errors().unwrap().get("email").unwrap(), [EMAIL_TAKEN]);
        assert_eq!(app.state.users.get(&jane.id).await.unwrap().unwrap(), jane);
        assert_eq!(app.broker.counts().await.total(), 0);

        // keeping one's own address is not a clash
        accounts
            .update_profile(jane.id, &obj(json!({"email": "Jane@example.com"})), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn full_profile_update_persists_every_written_field() {
        let app = TestApp::new();
        let user = app.seed_user("jane@example.com", "Jane").await;
        let accounts = AccountService::new(app.state.clone());

        let payload = obj(json!({
            "name": "Jane Q. Doe",
            "email": "jane.doe@example.com",
            "avatar": "uploads/avatars/jane.png",
            "bio": "Teaches Rust",
            "location": "Lisbon",
            "phone_number": "+351 555 0100",
            "linkedin": "https://www.linkedin.com/in/janedoe",
            "github": "https://github.com/janedoe",
        }));
        accounts.update_profile(user.id, &payload, false).await.unwrap();

        let stored = app.state.users.get(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Jane Q. Doe");
        assert_eq!(stored.email, "jane.doe@example.com");
        assert_eq!(stored.avatar.as_deref(), Some("uploads/avatars/jane.png"));
        assert_eq!(stored.bio.as_deref(), Some("Teaches Rust"));
        assert_eq!(stored.location.as_deref(), Some("Lisbon"));
        assert_eq!(stored.phone_number.as_deref(), Some("+351 555 0100"));
        assert_eq!(stored.linkedin.as_deref(), Some("https://www.linkedin.com/in/janedoe"));
        assert_eq!(stored.github.as_deref(), Some("https://github.com/janedoe"));

        let rendered = accounts
            .profile(user.id, &FieldMask::only(User::PROFILE_FIELDS.iter().copied()))
            .await
            .unwrap();
        assert_eq!(Value::Object(rendered), Value::Object(payload));
    }

    async fn registered(app: &TestApp, accounts: &AccountService) -> User {
        let user = accounts.register(&registration()).await.unwrap();
        assert_eq!(app.state.users.get(&user.id).await.unwrap().unwrap().last_login, None);
        user
    }

    #[tokio::test]
    async fn login_rejects_a_wrong_password() {
        let app = TestApp::new();
        let accounts = AccountService::new(app.state.clone());
        let mut user = registered(&app, &accounts).await;
        user.is_verified = true;
        app.state.users.save(user).await.unwrap();

        let err = accounts.login("jane@example.com", "wrong-horse-battery").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
        let err = accounts.login("nobody@example.com", "correct-horse-battery").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_refuses_an_unverified_email() {
        let app = TestApp::new();
        let accounts = AccountService::new(app.state.clone());
        let user = registered(&app, &accounts).await;

        let err = accounts.login("jane@example.com", "correct-horse-battery").await.unwrap_err();
        assert!(matches!(err, CoreError::EmailNotVerified));
        assert_eq!(err.to_string(), "E-mail is not verified.");
        assert_eq!(app.state.users.get(&user.id).await.unwrap().unwrap().last_login, None);
    }

    #[tokio::test]
    async fn login_succeeds_once_verified_and_stamps_last_login() {
        let app = TestApp::new();
        let accounts = AccountService::new(app.state.clone());
        let mut user = registered(&app, &accounts).await;
        user.is_verified = true;
        app.state.users.save(user.clone()).await.unwrap();

        let logged_in = accounts.login(" JANE@example.com ", "correct-horse-battery").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(logged_in.last_login, Some(app.clock_now()));

        let mut deactivated = logged_in;
        deactivated.is_active = false;
        app.state.users.save(deactivated).await.unwrap();
        let err = accounts.login("jane@example.com", "correct-horse-battery").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn superuser_is_a_verified_admin_without_confirmation_mail() {
        let app = TestApp::new();
        let accounts = AccountService::new(app.state.clone());

        let admin = accounts.create_superuser(&registration()).await.unwrap();
        assert_eq!(admin.role, crate::domain::Role::Admin);
        assert!(admin.is_staff);
        assert!(admin.is_verified);
        assert_eq!(app.state.users.get(&admin.id).await.unwrap().unwrap(), admin);

        let lease = app.broker.lease().await.unwrap();
        assert_eq!(lease.envelope().task_type.as_str(), CreatePaymentCustomer::TYPE);
        assert_eq!(app.broker.counts().await.total(), 1);
        accounts.login("jane@example.com", "correct-horse-battery").await.unwrap();
    }
}
