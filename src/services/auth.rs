use crate::{
    error::{AppError, AppResult},
    models::{Credentials, SessionUser},
    services::{providers::IdentityProvider, session::SessionStore},
};

const INVALID_EMAIL: &str = "Email ID is not valid";
const INVALID_PASSWORD: &str = "Password is not valid";
const MISSING_NAME: &str = "Name is required";

fn is_email_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
}

fn is_email_domain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-')
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !local.is_empty()
        && local.chars().all(is_email_local_char)
        && !host.is_empty()
        && host.chars().all(is_email_domain_char)
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
}

/// Checks email and password format before anything is sent to the provider
pub fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::InvalidInput(INVALID_EMAIL.to_string()));
    }
    if !is_valid_password(password) {
        return Err(AppError::InvalidInput(INVALID_PASSWORD.to_string()));
    }
    Ok(())
}

/// Which flow the form submits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    Register,
}

/// Two-mode sign-in / register form
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
    is_loading: bool,
    error_message: Option<String>,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.error_message = None;
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            AuthMode::SignIn => AuthMode::Register,
            AuthMode::Register => AuthMode::SignIn,
        };
        self.set_mode(next);
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            AuthMode::SignIn => "Welcome Back!",
            AuthMode::Register => "Create Account",
        }
    }

    /// Validates and submits the form in its current mode.
    ///
    /// On success the user is mirrored to `store` and returned. On failure the
    /// message is kept on the form and the error returned.
    pub async fn submit(
        &mut self,
        credentials: &Credentials,
        provider: &dyn IdentityProvider,
        store: &SessionStore,
    ) -> AppResult<SessionUser> {
        if let Err(e) = self.validate(credentials) {
            self.error_message = Some(e.user_message());
            return Err(e);
        }

        self.error_message = None;
        self.is_loading = true;
        let result = self.authenticate(credentials, provider, store).await;
        self.is_loading = false;

        match &result {
            Ok(user) => {
                tracing::info!(uid = %user.uid, mode = ?self.mode, "Signed in");
            }
            Err(e) => {
                tracing::warn!(error = %e, mode = ?self.mode, "Authentication failed");
                self.error_message = Some(e.user_message());
            }
        }
        result
    }

    fn validate(&self, credentials: &Credentials) -> AppResult<()> {
        if self.mode == AuthMode::Register && credentials.name.trim().is_empty() {
            return Err(AppError::InvalidInput(MISSING_NAME.to_string()));
        }
        validate_credentials(&credentials.email, &credentials.password)
    }

    async fn authenticate(
        &self,
        credentials: &Credentials,
        provider: &dyn IdentityProvider,
        store: &SessionStore,
    ) -> AppResult<SessionUser> {
        let user = match self.mode {
            AuthMode::SignIn => {
                provider
                    .sign_in(&credentials.email, &credentials.password)
                    .await?
            }
            AuthMode::Register => {
                let created = provider
                    .sign_up(&credentials.email, &credentials.password)
                    .await?;
                provider
                    .update_profile(&created, credentials.name.trim())
                    .await?
            }
        };

        let session = SessionUser::from(&user);
        store.save(&session).await?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthenticatedUser;
    use crate::services::providers::MockIdentityProvider;

    fn user(display_name: Option<&str>) -> AuthenticatedUser {
        AuthenticatedUser {
            uid: "uid-1".to_string(),
            email: "user@gmail.com".to_string(),
            display_name: display_name.map(str::to_string),
            id_token: "token".to_string(),
        }
    }

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        (dir, store)
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("user@gmail.com", "User@1234").is_ok());
        assert!(validate_credentials("first.last+tag@mail.co.in", "Abcdefg1").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "user", "user@", "@gmail.com", "user@gmail", "user@gmail.c", "us er@gmail.com"] {
            let err = validate_credentials(email, "User@1234").unwrap_err();
            assert_eq!(err.user_message(), INVALID_EMAIL, "email {:?}", email);
        }
    }

    #[test]
    fn test_invalid_passwords() {
        for password in ["short1A", "alllowercase1", "ALLUPPERCASE1", "NoDigitsHere"] {
            let err = validate_credentials("user@gmail.com", password).unwrap_err();
            assert_eq!(err.user_message(), INVALID_PASSWORD, "password {:?}", password);
        }
    }

    #[test]
    fn test_toggle_mode_clears_error() {
        let mut form = AuthForm::new();
        assert_eq!(form.mode(), AuthMode::SignIn);
        assert_eq!(form.heading(), "Welcome Back!");

        form.error_message = Some("EMAIL_NOT_FOUND".to_string());
        form.toggle_mode();

        assert_eq!(form.mode(), AuthMode::Register);
        assert_eq!(form.heading(), "Create Account");
        assert_eq!(form.error_message(), None);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_provider() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_in().never();
        let (_dir, store) = temp_store();

        let mut form = AuthForm::new();
        let result = form
            .submit(&Credentials::sign_in("nope", "User@1234"), &provider, &store)
            .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(form.error_message(), Some(INVALID_EMAIL));
        assert!(!form.is_loading());
    }

    #[tokio::test]
    async fn test_sign_in_mirrors_session() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in()
            .withf(|email, password| email == "user@gmail.com" && password == "User@1234")
            .times(1)
            .returning(|_, _| Ok(user(Some("User"))));
        let (_dir, store) = temp_store();

        let mut form = AuthForm::new();
        let session = form
            .submit(&Credentials::sign_in("user@gmail.com", "User@1234"), &provider, &store)
            .await
            .unwrap();

        assert_eq!(session.uid, "uid-1");
        assert_eq!(store.load().await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn test_register_requires_name() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_sign_up().never();
        let (_dir, store) = temp_store();

        let mut form = AuthForm::new();
        form.set_mode(AuthMode::Register);
        let result = form
            .submit(&Credentials::register(" ", "user@gmail.com", "User@1234"), &provider, &store)
            .await;

        assert!(result.is_err());
        assert_eq!(form.error_message(), Some(MISSING_NAME));
    }

    #[tokio::test]
    async fn test_register_sets_display_name() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_up()
            .times(1)
            .returning(|_, _| Ok(user(None)));
        provider
            .expect_update_profile()
            .withf(|_, name| name == "User")
            .times(1)
            .returning(|_, name| Ok(user(Some(name))));
        let (_dir, store) = temp_store();

        let mut form = AuthForm::new();
        form.set_mode(AuthMode::Register);
        let session = form
            .submit(&Credentials::register("User", "user@gmail.com", "User@1234"), &provider, &store)
            .await
            .unwrap();

        assert_eq!(session.display_name.as_deref(), Some("User"));
    }

    #[tokio::test]
    async fn test_provider_error_is_shown_and_nothing_saved() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_sign_in()
            .returning(|_, _| Err(AppError::Auth("INVALID_LOGIN_CREDENTIALS".to_string())));
        let (_dir, store) = temp_store();

        let mut form = AuthForm::new();
        let result = form
            .submit(&Credentials::sign_in("user@gmail.com", "User@1234"), &provider, &store)
            .await;

        assert!(matches!(result, Err(AppError::Auth(_))));
        assert_eq!(form.error_message(), Some("INVALID_LOGIN_CREDENTIALS"));
        assert_eq!(store.load().await.unwrap(), None);
    }
}
