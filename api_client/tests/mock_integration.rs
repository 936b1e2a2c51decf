use api_client::{ApiClient, ApiClientError, ModerationStatus};
use httptest::{matchers::*, responders::*, Expectation};
use mocks::{
    expect_delete_no_content, expect_images_page, expect_moderate, image_record, moderation_server,
};
use serde_json::json;

#[tokio::test]
async fn test_list_images_sends_bearer_token() {
    let server = moderation_server();
    expect_images_page(
        &server,
        "tok",
        json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [image_record(1, "safe", 0.99), image_record(2, "unsafe", 0.88)]
        }),
    );

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let page = client.list_images(&client.first_page_url()).await.unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].moderation_status, ModerationStatus::Safe);
    assert_eq!(page.results[1].moderation_status, ModerationStatus::Unsafe);
}

#[tokio::test]
async fn test_list_images_follows_page_reference() {
    let server = moderation_server();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/api/images/"),
            request::query(url_decoded(contains(("page", "2")))),
        ])
        .respond_with(json_encoded(json!({
            "count": 4,
            "next": null,
            "previous": server.url_str("/api/images/"),
            "results": [image_record(1, "safe", 0.9)]
        }))),
    );

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let page = client
        .list_images(&server.url_str("/api/images/?page=2"))
        .await
        .unwrap();
    assert_eq!(page.count, 4);
    assert!(page.next.is_none());
    assert!(page.previous.is_some());
}

#[tokio::test]
async fn test_list_images_non_2xx_is_error() {
    let server = moderation_server();
    server.expect(
        Expectation::matching(request::method_path("GET", "/api/images/"))
            .respond_with(status_code(500)),
    );

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let err = client
        .list_images(&client.first_page_url())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiClientError::Server(_)));
}

#[tokio::test]
async fn test_moderate_image_multipart_upload() {
    let server = moderation_server();
    expect_moderate(&server, "tok", "unsafe", 0.91);

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let outcome = client
        .moderate_image("cat.jpg", b"not really a jpeg".to_vec())
        .await
        .unwrap();
    assert_eq!(outcome.status, "unsafe");
    assert_eq!(outcome.confidence, 0.91);
}

#[tokio::test]
async fn test_moderate_image_surfaces_server_error() {
    let server = moderation_server();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/moderate/")).respond_with(
            status_code(500).body(json!({"error": "Moderation provider unavailable."}).to_string()),
        ),
    );

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let err = client
        .moderate_image("cat.jpg", b"bytes".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiClientError::Server(ref m) if m == "Moderation provider unavailable."
    ));
}

#[tokio::test]
async fn test_moderate_image_error_body_without_message_reports_status() {
    let server = moderation_server();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/moderate/"))
            .respond_with(status_code(413).body(json!({"code": "too_large"}).to_string())),
    );

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let err = client
        .moderate_image("cat.jpg", b"bytes".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiClientError::Server(ref m) if m == "Upload failed with status: 413"
    ));
}

#[tokio::test]
async fn test_moderate_image_unparseable_error_falls_back() {
    let server = moderation_server();
    server.expect(
        Expectation::matching(request::method_path("POST", "/api/moderate/"))
            .respond_with(status_code(502).body("bad gateway")),
    );

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let err = client
        .moderate_image("cat.jpg", b"bytes".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiClientError::Server(ref m) if m == "Could not parse server error."
    ));
}

#[tokio::test]
async fn test_delete_image_accepts_no_content() {
    let server = moderation_server();
    expect_delete_no_content(&server, 7);

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    client.delete_image(7).await.unwrap();
}

#[tokio::test]
async fn test_delete_image_surfaces_detail() {
    let server = moderation_server();
    server.expect(
        Expectation::matching(request::method_path("DELETE", "/api/images/9/"))
            .respond_with(status_code(404).body(json!({"detail": "Not found."}).to_string())),
    );

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let err = client.delete_image(9).await.unwrap_err();
    assert!(matches!(err, ApiClientError::Server(ref m) if m == "Not found."));
}

#[tokio::test]
async fn test_delete_image_unparseable_error_falls_back() {
    let server = moderation_server();
    server.expect(
        Expectation::matching(request::method_path("DELETE", "/api/images/9/"))
            .respond_with(status_code(403)),
    );

    let client = ApiClient::with_base_url("tok".into(), format!("http://{}", server.addr()));
    let err = client.delete_image(9).await.unwrap_err();
    assert!(matches!(err, ApiClientError::Server(ref m) if m == "Failed to delete image."));
}
