//! Staff sign-in and sign-up form

use tracing::{info, warn};
use validator::Validate;

use crate::gateway::DynAuthGateway;

pub const SIGN_UP_COMPLETE: &str = "Account created! Please sign in.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Default, Validate)]
struct Credentials {
    #[validate(email)]
    email: String,
    #[validate(length(min = 6))]
    password: String,
}

/// Staff login and account creation.
///
/// Failures never leave the form: they become the inline message.
pub struct LoginForm {
    auth: DynAuthGateway,
    credentials: Credentials,
    mode: LoginMode,
    message: Option<String>,
    loading: bool,
}

impl LoginForm {
    pub fn new(auth: DynAuthGateway) -> Self {
        Self {
            auth,
            credentials: Credentials::default(),
            mode: LoginMode::SignIn,
            message: None,
            loading: false,
        }
    }

    pub fn set_email(&mut self, email: &str) {
        self.credentials.email = email.to_string();
    }

    pub fn set_password(&mut self, password: &str) {
        self.credentials.password = password.to_string();
    }

    pub fn email(&self) -> &str {
        &self.credentials.email
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::SignUp,
            LoginMode::SignUp => LoginMode::SignIn,
        };
        self.message = None;
    }

    /// Inline message: an auth error, or the sign-up confirmation
    pub fn error(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sign in or sign up depending on the mode.
    ///
    /// Returns whether the backend accepted the credentials. A successful
    /// sign-in reaches the session gate through its session-change
    /// subscription.
    pub async fn submit(&mut self) -> bool {
        self.message = None;
        if let Err(e) = self.credentials.validate() {
            let invalid: Vec<String> = e.field_errors().keys().map(|k| k.to_string()).collect();
            self.message = Some(if invalid.iter().any(|f| f == "password") {
                "Password should be at least 6 characters".to_string()
            } else {
                "Please enter a valid email address".to_string()
            });
            return false;
        }

        self.loading = true;
        let Credentials { email, password } = &self.credentials;
        let accepted = match self.mode {
            LoginMode::SignIn => match self.auth.sign_in_with_password(email, password).await {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "sign-in rejected");
                    self.message = Some(e.user_message());
                    false
                }
            },
            LoginMode::SignUp => match self.auth.sign_up(email, password).await {
                Ok(_) => {
                    info!("staff account created");
                    self.message = Some(SIGN_UP_COMPLETE.to_string());
                    self.mode = LoginMode::SignIn;
                    true
                }
                Err(e) => {
                    warn!(error = %e, "sign-up rejected");
                    self.message = Some(e.user_message());
                    false
                }
            },
        };
        self.loading = false;
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryAuth;
    use std::sync::Arc;

    #[tokio::test]
    async fn short_password_never_reaches_backend() {
        let auth = Arc::new(MemoryAuth::new().with_user("staff@example.com", "12345"));
        let mut form = LoginForm::new(auth);
        form.set_email("staff@example.com");
        form.set_password("12345");
        assert!(!form.submit().await);
        assert_eq!(form.error(), Some("Password should be at least 6 characters"));
    }

    #[tokio::test]
    async fn bad_credentials_stay_inline() {
        let auth = Arc::new(MemoryAuth::new().with_user("staff@example.com", "secret1"));
        let mut form = LoginForm::new(auth);
        form.set_email("staff@example.com");
        form.set_password("wrong-password");
        assert!(!form.submit().await);
        assert_eq!(form.error(), Some("Invalid login credentials"));
        assert!(!form.is_loading());
    }

    #[tokio::test]
    async fn toggling_mode_clears_message() {
        let mut form = LoginForm::new(Arc::new(MemoryAuth::new()));
        form.set_email("nobody");
        form.set_password("secret1");
        form.submit().await;
        assert!(form.error().is_some());

        form.toggle_mode();
        assert_eq!(form.mode(), LoginMode::SignUp);
        assert_eq!(form.error(), None);
    }
}
