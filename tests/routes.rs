use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use quoteboard::{init::init_database, routes::router, Data};
use tower::ServiceExt;

async fn build_test_router() -> Router {
    let db = init_database("sqlite::memory:", 1).await.unwrap();
    router(Data { db })
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// posts a form and returns the `name=value` part of the flash cookie it set.
async fn post_for_flash(app: &Router, uri: &str, body: &str) -> String {
    let response = app.clone().oneshot(form_post(uri, body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn vote(app: &Router, id: i64, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(form_post(&format!("/quotes/{id}/vote"), body))
        .await
        .unwrap();
    let status = response.status();
    let text = body_text(response).await;

    (status, serde_json::from_str(&text).unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
async fn empty_board_renders_empty_state() {
    let app = build_test_router().await;

    let response = app.oneshot(get("/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let html = body_text(response).await;
    assert!(html.contains("No quotes yet."));
    assert!(html.contains("action=\"/sources\""));
}

#[tokio::test]
async fn add_source_then_quote_then_see_it() {
    let app = build_test_router().await;

    let cookie = post_for_flash(&app, "/sources", "title=Meditations").await;
    assert!(cookie.starts_with("flash=success:"));

    // the flash is shown once and then cleared
    let response = app.clone().oneshot(get("/", Some(cookie.as_str()))).await.unwrap();
    assert!(response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));
    let html = body_text(response).await;
    assert!(html.contains("Source added successfully!"));
    assert!(html.contains("Meditations (0/3)"));

    let cookie = post_for_flash(
        &app,
        "/quotes",
        "text=You+have+power+over+your+mind.&source=1&weight=2",
    )
    .await;
    assert!(cookie.starts_with("flash=success:"));

    let html = body_text(app.clone().oneshot(get("/", None)).await.unwrap()).await;
    assert!(html.contains("You have power over your mind."));
    assert!(html.contains("1 view</p>"));
}

#[tokio::test]
async fn duplicate_source_is_flashed_not_failed() {
    let app = build_test_router().await;

    post_for_flash(&app, "/sources", "title=Dune").await;
    let cookie = post_for_flash(&app, "/sources", "title=Dune").await;

    assert!(cookie.starts_with("flash=error:"));

    let html = body_text(app.clone().oneshot(get("/", Some(cookie.as_str()))).await.unwrap()).await;
    assert!(html.contains("A source with this title already exists!"));
}

#[tokio::test]
async fn fourth_quote_is_refused() {
    let app = build_test_router().await;
    post_for_flash(&app, "/sources", "title=Dune").await;

    for text in ["one", "two", "three"] {
        let cookie = post_for_flash(&app, "/quotes", &format!("text={text}&source=1")).await;
        assert!(cookie.starts_with("flash=success:"), "{text}: {cookie}");
    }

    let cookie = post_for_flash(&app, "/quotes", "text=four&source=1").await;
    assert!(cookie.starts_with("flash=error:"));

    let html = body_text(app.clone().oneshot(get("/quotes", Some(cookie.as_str()))).await.unwrap()).await;
    assert!(html.contains("already has the maximum number of quotes (3)"));
    assert!(!html.contains("<p>four</p>"));
    // a full source is no longer offered in the form
    let html = body_text(app.clone().oneshot(get("/", None)).await.unwrap()).await;
    assert!(!html.contains("<option value=\"1\">"));
}

#[tokio::test]
async fn invalid_quote_form_is_flashed() {
    let app = build_test_router().await;
    post_for_flash(&app, "/sources", "title=Dune").await;

    for body in ["text=&source=1", "text=hi&source=abc", "text=hi&source=1&weight=0"] {
        let cookie = post_for_flash(&app, "/quotes", body).await;
        assert!(cookie.starts_with("flash=error:"), "{body}: {cookie}");
    }
}

#[tokio::test]
async fn non_form_bodies_are_flashed() {
    let app = build_test_router().await;

    for uri in ["/sources", "/quotes"] {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"title":"Dune"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.headers()[header::LOCATION], "/");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash=error:"), "{uri}: {cookie}");
        assert!(cookie.contains("could%20not%20be%20read"), "{uri}: {cookie}");
    }

    let html = body_text(app.oneshot(get("/", None)).await.unwrap()).await;
    assert!(html.contains("No quotes yet."));
    assert!(!html.contains("<option"));
}

#[tokio::test]
async fn voting_returns_counters() {
    let app = build_test_router().await;
    post_for_flash(&app, "/sources", "title=Dune").await;
    post_for_flash(&app, "/quotes", "text=The+spice+must+flow.&source=1").await;

    let (status, tally) = vote(&app, 1, "action=like").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        tally,
        serde_json::json!({ "likes": 1, "dislikes": 0, "rating": 1 })
    );

    let (_, tally) = vote(&app, 1, "action=dislike").await;
    let (_, tally2) = vote(&app, 1, "action=dislike").await;
    assert_eq!(tally["dislikes"], 1);
    assert_eq!(
        tally2,
        serde_json::json!({ "likes": 1, "dislikes": 2, "rating": -1 })
    );

    let (status, unchanged) = vote(&app, 1, "action=love").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, tally2);

    let (status, unchanged) = vote(&app, 1, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged, tally2);
}

#[tokio::test]
async fn voting_on_unknown_quote_is_not_found() {
    let app = build_test_router().await;

    let (status, _) = vote(&app, 77, "action=like").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = app
        .oneshot(form_post("/quotes/not-a-number/vote", "action=like"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listings_tolerate_bad_page_numbers() {
    let app = build_test_router().await;

    for n in 0..9 {
        post_for_flash(&app, "/sources", &format!("title=source+{n}")).await;
        for text in ["a", "b", "c"] {
            post_for_flash(&app, "/quotes", &format!("text={text}{n}&source={}", n + 1)).await;
        }
    }

    for path in ["/popular", "/quotes"] {
        let html = body_text(
            app.clone()
                .oneshot(get(&format!("{path}?page=abc"), None))
                .await
                .unwrap(),
        )
        .await;
        assert!(html.contains("page 1 of 3"), "{path}");

        let html = body_text(
            app.clone()
                .oneshot(get(&format!("{path}?page=999"), None))
                .await
                .unwrap(),
        )
        .await;
        assert!(html.contains("page 3 of 3"), "{path}");
    }
}

#[tokio::test]
async fn dashboard_reports_totals() {
    let app = build_test_router().await;
    post_for_flash(&app, "/sources", "title=Dune").await;
    post_for_flash(&app, "/sources", "title=Empty").await;
    post_for_flash(&app, "/quotes", "text=The+spice+must+flow.&source=1").await;
    vote(&app, 1, "action=like").await;
    vote(&app, 1, "action=like").await;
    app.clone().oneshot(get("/", None)).await.unwrap();

    let response = app.oneshot(get("/dashboard", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<tr><th>Quotes</th><td>1</td></tr>"));
    assert!(html.contains("<tr><th>Sources</th><td>2</td></tr>"));
    assert!(html.contains("<tr><th>Views</th><td>1</td></tr>"));
    assert!(html.contains("<tr><th>Likes</th><td>2</td></tr>"));
    assert!(html.contains("<tr><td>Dune</td><td>1</td><td>2</td></tr>"));

    let dune = html.find("<td>Dune</td>").unwrap();
    let empty = html.find("<td>Empty</td>").unwrap();
    assert!(dune < empty);
}

#[tokio::test]
async fn health_reports_database() {
    let app = build_test_router().await;

    let response = app.oneshot(get("/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}
