mod common;

use axum::{Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use common::{CountingRenderer, TestContext, VIDEO_URL};
use framelink::api::handlers::screenshot_handler;
use framelink::domain::capture::RenderError;
use std::time::Duration;

fn make_server(ctx: &TestContext) -> TestServer {
    let app = Router::new()
        .route("/screenshot", get(screenshot_handler))
        .with_state(ctx.state.clone());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_screenshot_returns_jpeg_with_cache_headers() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    let response = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("t", "42")
        .await;

    response.assert_status_ok();

    let key = ctx
        .state
        .screenshot_service
        .fingerprint(VIDEO_URL, 42.0, None, None)
        .unwrap()
        .key;

    assert_eq!(response.header("content-type"), "image/jpeg");
    assert_eq!(response.header("cache-control"), "public, max-age=3600");
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        format!("inline; filename={}.jpg", key)
    );
    assert_eq!(response.header("x-cache-key").to_str().unwrap(), key.as_str());
    assert!(response.as_bytes().starts_with(&[0xFF, 0xD8]));
}

#[tokio::test]
async fn test_repeated_request_is_served_from_cache() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    let first = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("t", "10")
        .await;
    let second = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("t", "10")
        .await;

    first.assert_status_ok();
    second.assert_status_ok();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(ctx.renderer.calls(), 1);
}

#[tokio::test]
async fn test_fractional_timestamp_shares_cache_entry() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("t", "7.2")
        .await
        .assert_status_ok();
    server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("t", "7.9")
        .await
        .assert_status_ok();

    assert_eq!(ctx.renderer.calls(), 1);
    assert_eq!(ctx.renderer.last_request().unwrap().timestamp, 7);
}

#[tokio::test]
async fn test_default_viewport_is_passed_to_renderer() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .await
        .assert_status_ok();

    let request = ctx.renderer.last_request().unwrap();
    assert_eq!(request.viewport.width, 1280);
    assert_eq!(request.viewport.height, 720);
    assert_eq!(request.timestamp, 0);
}

#[tokio::test]
async fn test_width_out_of_range_is_rejected_before_render() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    let response = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("w", "5000")
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(ctx.renderer.calls(), 0);
}

#[tokio::test]
async fn test_negative_timestamp_is_rejected() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    let response = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("t", "-3")
        .await;

    response.assert_status_bad_request();
    assert_eq!(ctx.renderer.calls(), 0);
}

#[tokio::test]
async fn test_malformed_query_is_json_error() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    let response = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("h", "tall")
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_missing_url_is_rejected() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    server
        .get("/screenshot")
        .add_query_param("t", "5")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_non_video_site_is_unsupported() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    let response = server
        .get("/screenshot")
        .add_query_param("url", "https://example.com/blog/post")
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "unsupported_site");
    assert_eq!(ctx.renderer.calls(), 0);
}

#[tokio::test]
async fn test_direct_video_file_is_accepted() {
    let ctx = TestContext::new().await;
    let server = make_server(&ctx);

    server
        .get("/screenshot")
        .add_query_param("url", "https://cdn.example.com/media/clip.mp4")
        .add_query_param("t", "3")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_render_failure_maps_to_bad_gateway() {
    let ctx = TestContext::with_renderer(CountingRenderer::failing(RenderError::Failed(
        "browser crashed".into(),
    )))
    .await;
    let server = make_server(&ctx);

    let response = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "render_failed");
}

#[tokio::test]
async fn test_failed_render_is_not_cached() {
    let ctx = TestContext::with_renderer(CountingRenderer::failing(
        RenderError::NavigationFailed("dns".into()),
    ))
    .await;
    let server = make_server(&ctx);

    for _ in 0..2 {
        server
            .get("/screenshot")
            .add_query_param("url", VIDEO_URL)
            .await
            .assert_status(StatusCode::BAD_GATEWAY);
    }

    assert_eq!(ctx.renderer.calls(), 2);
    assert_eq!(ctx.disk.stats().await.unwrap().entries, 0);
}

#[tokio::test]
async fn test_page_without_video_is_unsupported() {
    let ctx = TestContext::with_renderer(CountingRenderer::failing(RenderError::Unsupported(
        "no video element found on page".into(),
    )))
    .await;
    let server = make_server(&ctx);

    let response = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "unsupported_site");
}

#[tokio::test]
async fn test_slow_render_times_out() {
    let ctx = TestContext::build(
        CountingRenderer::with_delay(Duration::from_secs(5)),
        Duration::from_millis(100),
    )
    .await;
    let server = make_server(&ctx);

    let response = server
        .get("/screenshot")
        .add_query_param("url", VIDEO_URL)
        .await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "render_timeout");
}

#[tokio::test]
async fn test_concurrent_requests_share_one_render() {
    let ctx = TestContext::with_renderer(CountingRenderer::with_delay(Duration::from_millis(200)))
        .await;
    let service = ctx.state.screenshot_service.clone();

    let (a, b, c) = tokio::join!(
        service.screenshot(VIDEO_URL, 30.0, None, None),
        service.screenshot(VIDEO_URL, 30.0, None, None),
        service.screenshot(VIDEO_URL, 30.0, None, None),
    );

    let (_, a) = a.unwrap();
    let (_, b) = b.unwrap();
    let (_, c) = c.unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(ctx.renderer.calls(), 1);
}

#[tokio::test]
async fn test_expired_entry_is_rendered_again() {
    let ctx = TestContext::new().await;
    let service = ctx.state.screenshot_service.clone();

    let (fingerprint, _) = service.screenshot(VIDEO_URL, 1.0, None, None).await.unwrap();

    // Age the file past the TTL.
    let path = ctx.disk.dir().join(format!("{}.jpg", fingerprint.key));
    let stale = std::time::SystemTime::now() - Duration::from_secs(7200);
    std::fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(stale)
        .unwrap();

    service.screenshot(VIDEO_URL, 1.0, None, None).await.unwrap();
    assert_eq!(ctx.renderer.calls(), 2);
}
