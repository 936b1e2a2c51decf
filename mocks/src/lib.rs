use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;

/// Create an empty mock server for the identity provider endpoints.
pub fn identity_server() -> Server {
    Server::run()
}

/// Expect a POST to `accounts:signInWithPassword` and answer with a session
/// for the given user.
pub fn expect_sign_in(server: &Server, uid: &str, email: &str) {
    server.expect(
        Expectation::matching(request::method_path(
            "POST",
            "/v1/accounts:signInWithPassword",
        ))
        .respond_with(json_encoded(json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": uid,
            "email": email,
            "idToken": "initial-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600"
        }))),
    );
}

/// Expect a POST to `accounts:signUp` answering with a session for a new user.
pub fn expect_sign_up(server: &Server, uid: &str, email: &str) {
    server.expect(
        Expectation::matching(request::method_path("POST", "/v1/accounts:signUp"))
            .respond_with(json_encoded(json!({
                "kind": "identitytoolkit#SignupNewUserResponse",
                "localId": uid,
                "email": email,
                "idToken": "initial-token",
                "refreshToken": "refresh-token",
                "expiresIn": "3600"
            }))),
    );
}

/// Expect a provider rejection with the given message on the sign-in endpoint.
pub fn expect_sign_in_rejected(server: &Server, message: &str) {
    server.expect(
        Expectation::matching(request::method_path(
            "POST",
            "/v1/accounts:signInWithPassword",
        ))
        .respond_with(
            status_code(400).body(json!({"error": {"code": 400, "message": message}}).to_string()),
        ),
    );
}

/// Expect `times` token-minting calls, each answered with the same ID token.
pub fn expect_token_times(server: &Server, id_token: &str, times: usize) {
    server.expect(
        Expectation::matching(request::method_path("POST", "/v1/token"))
            .times(times)
            .respond_with(json_encoded(json!({
                "access_token": id_token,
                "expires_in": "3600",
                "token_type": "Bearer",
                "refresh_token": "refresh-token",
                "id_token": id_token,
                "user_id": "uid",
                "project_id": "project"
            }))),
    );
}

pub fn expect_token(server: &Server, id_token: &str) {
    expect_token_times(server, id_token, 1);
}

/// Create an empty mock server for the moderation backend.
pub fn moderation_server() -> Server {
    Server::run()
}

/// A DRF-style image record as the backend serializes it.
pub fn image_record(id: i64, status: &str, confidence: f64) -> serde_json::Value {
    json!({
        "id": id,
        "image": format!("http://media.example.com/uploads/{}.jpg", id),
        "moderation_status": status,
        "confidence": confidence,
        "uploaded_at": "2024-05-01T12:00:00Z",
        "user_id": "uid-1"
    })
}

/// Expect an authenticated GET on the image listing endpoint, answering with
/// the given page envelope.
pub fn expect_images_page(server: &Server, token: &str, body: serde_json::Value) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/api/images/"),
            request::headers(contains(("authorization", format!("Bearer {}", token)))),
        ])
        .respond_with(json_encoded(body)),
    );
}

/// Expect a multipart upload on the moderation endpoint, answering with the
/// given moderation outcome.
pub fn expect_moderate(server: &Server, token: &str, status: &str, confidence: f64) {
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/api/moderate/"),
            request::headers(contains(("authorization", format!("Bearer {}", token)))),
        ])
        .respond_with(json_encoded(json!({
            "status": status,
            "confidence": confidence
        }))),
    );
}

/// Expect a DELETE for the given image id, answering 204 No Content.
pub fn expect_delete_no_content(server: &Server, id: i64) {
    server.expect(
        Expectation::matching(request::method_path(
            "DELETE",
            format!("/api/images/{}/", id),
        ))
        .respond_with(status_code(204)),
    );
}
