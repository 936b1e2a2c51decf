use auth::{AuthClient, AuthError, AuthState};
use mocks::{
    expect_sign_in, expect_sign_in_rejected, expect_sign_up, expect_token_times, identity_server,
};

fn client_for(server: &httptest::Server) -> AuthClient {
    AuthClient::with_endpoints(
        "test-key".into(),
        server.url_str("/v1"),
        server.url_str("/v1"),
    )
}

#[tokio::test]
async fn test_sign_in_publishes_state_change() {
    let server = identity_server();
    expect_sign_in(&server, "uid-1", "user@example.com");
    let client = client_for(&server);

    let mut events = client.subscribe();
    // Registration fires immediately with the current (signed-out) state.
    assert_eq!(events.recv().await, Some(AuthState::SignedOut));

    client.sign_in("user@example.com", "hunter2").await.unwrap();

    let user = client.current_user().expect("user after sign in");
    assert_eq!(user.uid, "uid-1");
    assert_eq!(user.email, "user@example.com");
    assert_eq!(events.recv().await, Some(AuthState::SignedIn(user)));
}

#[tokio::test]
async fn test_sign_up_creates_session() {
    let server = identity_server();
    expect_sign_up(&server, "uid-2", "new@example.com");
    let client = client_for(&server);

    client.sign_up("new@example.com", "hunter2").await.unwrap();
    assert_eq!(client.current_user().unwrap().uid, "uid-2");
}

#[tokio::test]
async fn test_rejection_message_is_verbatim() {
    let server = identity_server();
    expect_sign_in_rejected(&server, "INVALID_PASSWORD");
    let client = client_for(&server);

    let err = client
        .sign_in("user@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected(ref m) if m == "INVALID_PASSWORD"));
    assert!(client.current_user().is_none());
}

#[tokio::test]
async fn test_token_minted_fresh_on_every_call() {
    let server = identity_server();
    expect_sign_in(&server, "uid-1", "user@example.com");
    expect_token_times(&server, "fresh-token", 2);
    let client = client_for(&server);

    client.sign_in("user@example.com", "hunter2").await.unwrap();
    assert_eq!(client.get_token().await.unwrap(), "fresh-token");
    assert_eq!(client.get_token().await.unwrap(), "fresh-token");
}

#[tokio::test]
async fn test_sign_out_emits_and_invalidates_token() {
    let server = identity_server();
    expect_sign_in(&server, "uid-1", "user@example.com");
    let client = client_for(&server);
    let mut events = client.subscribe();
    assert_eq!(events.recv().await, Some(AuthState::SignedOut));

    client.sign_in("user@example.com", "hunter2").await.unwrap();
    let _ = events.recv().await;

    client.sign_out();
    assert_eq!(events.recv().await, Some(AuthState::SignedOut));
    assert!(client.current_user().is_none());
    assert!(matches!(
        client.get_token().await,
        Err(AuthError::NotAuthenticated)
    ));
}
