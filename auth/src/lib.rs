//! Identity binding for the AI Guardian dashboard.
//!
//! Wraps the hosted identity provider's REST endpoints (email/password
//! sign-in, sign-up and token minting). The client owns the session for the
//! lifetime of the process and publishes signed-in/signed-out transitions on
//! a single event stream consumed by the UI router.

use serde::Deserialize;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider-side rejection. The message is shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("auth request failed: {0}")]
    Request(String),
}

/// Opaque handle to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(User),
    SignedOut,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Default)]
struct Session {
    user: Option<User>,
    refresh_token: Option<String>,
}

pub struct AuthClient {
    client: reqwest::Client,
    api_key: String,
    identity_url: String,
    token_url: String,
    session: Mutex<Session>,
    // Single subscriber: the UI router. Replaced on re-subscription.
    events: Mutex<Option<mpsc::UnboundedSender<AuthState>>>,
}

impl AuthClient {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoints(
            api_key,
            DEFAULT_IDENTITY_URL.to_string(),
            DEFAULT_TOKEN_URL.to_string(),
        )
    }

    /// Create a client against custom provider endpoints. Mainly used for
    /// testing against local mock servers.
    pub fn with_endpoints(api_key: String, identity_url: String, token_url: String) -> Self {
        AuthClient {
            client: reqwest::Client::new(),
            api_key,
            identity_url,
            token_url,
            session: Mutex::new(Session::default()),
            events: Mutex::new(None),
        }
    }

    /// Subscribe to authentication state transitions. Fires once immediately
    /// with the current state, then on every signed-in/signed-out change.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(self.state());
        *self.events.lock().expect("auth events lock poisoned") = Some(tx);
        rx
    }

    pub fn current_user(&self) -> Option<User> {
        self.session
            .lock()
            .expect("auth session lock poisoned")
            .user
            .clone()
    }

    fn state(&self) -> AuthState {
        match self.current_user() {
            Some(user) => AuthState::SignedIn(user),
            None => AuthState::SignedOut,
        }
    }

    fn emit(&self, state: AuthState) {
        if let Some(tx) = self
            .events
            .lock()
            .expect("auth events lock poisoned")
            .as_ref()
        {
            let _ = tx.send(state);
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.credential_request("accounts:signInWithPassword", email, password)
            .await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.credential_request("accounts:signUp", email, password)
            .await
    }

    async fn credential_request(
        &self,
        operation: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let url = format!("{}/{}?key={}", self.identity_url, operation, self.api_key);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let signed_in = response
            .json::<SignInResponse>()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let user = User {
            uid: signed_in.local_id,
            email: signed_in.email,
        };
        {
            let mut session = self.session.lock().expect("auth session lock poisoned");
            session.user = Some(user.clone());
            session.refresh_token = Some(signed_in.refresh_token);
        }
        tracing::info!(uid = %user.uid, "signed in");
        self.emit(AuthState::SignedIn(user));
        Ok(())
    }

    /// Terminate the session and notify the subscriber.
    pub fn sign_out(&self) {
        {
            let mut session = self.session.lock().expect("auth session lock poisoned");
            session.user = None;
            session.refresh_token = None;
        }
        tracing::info!("signed out");
        self.emit(AuthState::SignedOut);
    }

    /// Mint a fresh short-lived ID token for the current user. Tokens are
    /// never cached; every authenticated call requests a new one.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let refresh_token = self
            .session
            .lock()
            .expect("auth session lock poisoned")
            .refresh_token
            .clone()
            .ok_or(AuthError::NotAuthenticated)?;

        let url = format!("{}/token?key={}", self.token_url, self.api_key);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;
        Ok(token.id_token)
    }

    async fn rejection(response: reqwest::Response) -> AuthError {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => AuthError::Rejected(body.error.message),
            Err(_) => AuthError::Request(format!("provider returned status {}", status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sign_in_response() {
        let json = r#"{
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": "uid-1",
            "email": "user@example.com",
            "idToken": "token",
            "refreshToken": "refresh",
            "expiresIn": "3600"
        }"#;

        let parsed: SignInResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.local_id, "uid-1");
        assert_eq!(parsed.email, "user@example.com");
        assert_eq!(parsed.refresh_token, "refresh");
    }

    #[test]
    fn test_parse_error_body() {
        let json = r#"{"error": {"code": 400, "message": "EMAIL_NOT_FOUND"}}"#;
        let parsed: ErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.message, "EMAIL_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_token_requires_session() {
        let client = AuthClient::new("key".into());
        let err = client.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }
}
