//! Integration tests for xicon-server API endpoints
//!
//! Tests cover:
//! - Health and build info endpoints (no auth required)
//! - Admin create/edit/delete of entries
//! - Public submission and the approve/reject workflow
//! - Browse: search, AND/OR tag filtering, pagination, CSV export
//! - `@(Name)` reference resolution

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method
use xicon_server::{build_router, db, AppState};

const ADMIN_USER: &str = "admin";
const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Test helper: Fresh in-memory database with one admin account
async fn setup_app() -> Router {
    let pool = db::init_memory_database()
        .await
        .expect("Should create in-memory database");
    db::users::upsert_admin(&pool, ADMIN_USER, ADMIN_PASSWORD)
        .await
        .expect("Should create admin");
    build_router(AppState::new(pool))
}

/// Test helper: Send a request, return status and JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn admin_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Log in as the admin and return the bearer token
async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

async fn create_exercise(app: &Router, token: &str, payload: Value) -> Value {
    let (status, body) = send(
        app,
        json_request("POST", "/api/exicon/create", Some(token), payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}

// =============================================================================
// Health / build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "xicon-server");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let pool = db::init_memory_database().await.unwrap();
    let app = build_router(AppState::new(pool.clone()));
    pool.close().await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn test_buildinfo() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/api/buildinfo")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Entries
// =============================================================================

#[tokio::test]
async fn test_create_get_update_delete_exercise() {
    let app = setup_app().await;
    let token = login(&app).await;

    let created = create_exercise(
        &app,
        &token,
        json!({
            "name": "Merkin",
            "definition": "A pushup",
            "tags": "Arms|Core",
            "video_url": "https://youtu.be/abc123"
        }),
    )
    .await;
    assert_eq!(created["slug"], "merkin");
    assert_eq!(created["tags"], "Arms|Core");

    let (status, fetched) = send(&app, get("/api/exicon/merkin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["definition"], "A pushup");

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            "/api/exicon/merkin",
            Some(&token),
            json!({"name": "Diamond Merkin", "definition": "Hands together", "tags": ["Arms"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["slug"], "diamond-merkin");
    assert_eq!(updated["tags"], "Arms");
    assert_eq!(updated["id"], created["id"]);

    let (status, body) = send(&app, get("/api/exicon/merkin")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Exercise not found");

    let (status, _) = send(&app, admin_request("DELETE", "/api/exicon/diamond-merkin", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = send(&app, get("/api/exicon")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let app = setup_app().await;
    let token = login(&app).await;

    create_exercise(&app, &token, json!({"name": "Burpee", "definition": "Down and up"})).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/exicon/create",
            Some(&token),
            json!({"name": "Burpee", "definition": "Again"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "An exercise with this name already exists");
}

#[tokio::test]
async fn test_missing_fields_are_bad_request() {
    let app = setup_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/lexicon/create", Some(&token), json!({"name": "Q"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and definition are required");

    let bad_json = Request::builder()
        .method("POST")
        .uri("/api/lexicon/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, bad_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_list_sorted_by_name() {
    let app = setup_app().await;
    let token = login(&app).await;

    for name in ["Side Straddle Hop", "abyss merkin", "Burpee"] {
        create_exercise(&app, &token, json!({"name": name, "definition": "x"})).await;
    }

    let (status, list) = send(&app, get("/api/exicon")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["abyss merkin", "Burpee", "Side Straddle Hop"]);
}

// =============================================================================
// Submissions and moderation
// =============================================================================

#[tokio::test]
async fn test_submit_then_list_and_count() {
    let app = setup_app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/exicon/submit",
            None,
            json!({"name": "Bear Crawl", "definition": "Crawl on all fours", "f3name": "Sasquatch", "region": "Lake"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Submission received");
    assert!(body["id"].is_i64());

    let (status, _) = send(
        &app,
        json_request("POST", "/api/lexicon/submit", None, json!({"name": "Q", "definition": "Leader"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, list) = send(&app, admin_request("GET", "/api/submissions/list", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["exiconSubmissions"].as_array().unwrap().len(), 1);
    assert_eq!(list["exiconSubmissions"][0]["name"], "Bear Crawl");
    assert_eq!(list["exiconSubmissions"][0]["f3name"], "Sasquatch");
    assert_eq!(list["lexiconSubmissions"].as_array().unwrap().len(), 1);

    let (status, counts) = send(&app, admin_request("GET", "/api/submissions/count", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts, json!({"exiconCount": 1, "lexiconCount": 1, "totalCount": 2}));
}

#[tokio::test]
async fn test_duplicate_submit_is_conflict() {
    let app = setup_app().await;
    let submit = || json_request("POST", "/api/lexicon/submit", None, json!({"name": "PAX", "definition": "Participants"}));

    let (status, _) = send(&app, submit()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, submit()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "A term with this name already exists");
}

#[tokio::test]
async fn test_approve_publishes_and_removes_submission() {
    let app = setup_app().await;
    let token = login(&app).await;

    let (_, submitted) = send(
        &app,
        json_request(
            "POST",
            "/api/exicon/submit",
            None,
            json!({"name": "Big Boy Situp", "definition": "Full situp", "tags": "Core", "aliases": "BBS"}),
        ),
    )
    .await;
    let id = submitted["id"].as_i64().unwrap();

    let (status, review) = send(
        &app,
        admin_request("GET", &format!("/api/exicon/submissions/{}", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["name"], "Big Boy Situp");

    let (status, approved) = send(
        &app,
        admin_request("POST", &format!("/api/exicon/submissions/{}/approve", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(approved["slug"], "big-boy-situp");

    let (status, entry) = send(&app, get("/api/exicon/big-boy-situp")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["name"], "Big Boy Situp");
    assert_eq!(entry["definition"], "Full situp");
    assert_eq!(entry["tags"], "Core");
    assert_eq!(entry["aliases"], "BBS");

    let (status, _) = send(
        &app,
        admin_request("GET", &format!("/api/exicon/submissions/{}", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_approve_with_edits() {
    let app = setup_app().await;
    let token = login(&app).await;

    let (_, submitted) = send(
        &app,
        json_request("POST", "/api/lexicon/submit", None, json!({"name": "Mumbelchater", "definition": "talk"})),
    )
    .await;
    let id = submitted["id"].as_i64().unwrap();

    let (status, approved) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/lexicon/submissions/{}/approve", id),
            Some(&token),
            json!({"name": "Mumblechatter", "definition": "Talking during the beatdown"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(approved["slug"], "mumblechatter");
    assert_eq!(approved["definition"], "Talking during the beatdown");
}

#[tokio::test]
async fn test_approve_colliding_name_keeps_submission() {
    let app = setup_app().await;
    let token = login(&app).await;

    let (_, submitted) = send(
        &app,
        json_request("POST", "/api/exicon/submit", None, json!({"name": "Mosey", "definition": "Slow run"})),
    )
    .await;
    let id = submitted["id"].as_i64().unwrap();

    // Published directly while the submission waited
    create_exercise(&app, &token, json!({"name": "Mosey", "definition": "Jog"})).await;

    let (status, _) = send(
        &app,
        admin_request("POST", &format!("/api/exicon/submissions/{}/approve", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        admin_request("GET", &format!("/api/exicon/submissions/{}", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reject_removes_without_publishing() {
    let app = setup_app().await;
    let token = login(&app).await;

    let (_, submitted) = send(
        &app,
        json_request("POST", "/api/exicon/submit", None, json!({"name": "Flutter Kick", "definition": "Kick"})),
    )
    .await;
    let id = submitted["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        admin_request("DELETE", &format!("/api/exicon/submissions/{}", id), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, get("/api/exicon/flutter-kick")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, counts) = send(&app, admin_request("GET", "/api/submissions/count", &token)).await;
    assert_eq!(counts["totalCount"], 0);
}

// =============================================================================
// Browse, tags, references
// =============================================================================

async fn seed_browse_catalog(app: &Router, token: &str) {
    for (name, tags, video) in [
        ("Both", "Core|Legs", "https://www.youtube.com/watch?v=xyz"),
        ("Core Only", "Core", ""),
        ("Video Only", "Arms", "https://example.com/clip"),
        ("Neither", "Arms", ""),
    ] {
        create_exercise(
            app,
            token,
            json!({"name": name, "definition": "x", "tags": tags, "video_url": video}),
        )
        .await;
    }
}

fn item_names(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_browse_tag_and_or() {
    let app = setup_app().await;
    let token = login(&app).await;
    seed_browse_catalog(&app, &token).await;

    let (status, body) = send(&app, get("/api/exicon/browse?tags=Core,Video&op=and")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_names(&body), vec!["Both"]);
    assert_eq!(body["items"][0]["embed_url"], "https://www.youtube.com/embed/xyz");

    let (_, body) = send(&app, get("/api/exicon/browse?tags=Core,Video&op=or")).await;
    assert_eq!(item_names(&body), vec!["Both", "Core Only", "Video Only"]);
    assert_eq!(body["total_results"], 3);
}

#[tokio::test]
async fn test_browse_starred_and_pagination() {
    let app = setup_app().await;
    let token = login(&app).await;
    seed_browse_catalog(&app, &token).await;

    let (_, body) = send(
        &app,
        get("/api/exicon/browse?tags=%E2%AD%90%20Starred&starred=neither,core-only"),
    )
    .await;
    assert_eq!(item_names(&body), vec!["Core Only", "Neither"]);
    assert_eq!(body["items"][0]["starred"], true);

    let (_, body) = send(&app, get("/api/exicon/browse?page_size=3&page=2")).await;
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["page"], 2);
    assert_eq!(item_names(&body), vec!["Video Only"]);

    // Out-of-range pages clamp to the last page
    let (_, body) = send(&app, get("/api/exicon/browse?page_size=3&page=9")).await;
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_browse_search_relevance() {
    let app = setup_app().await;
    let token = login(&app).await;

    create_exercise(&app, &token, json!({"name": "Zed", "definition": "Finish with a plank"})).await;
    create_exercise(&app, &token, json!({"name": "Plank Jack", "definition": "Jumping"})).await;

    let (_, body) = send(&app, get("/api/exicon/browse?q=PLANK")).await;
    assert_eq!(item_names(&body), vec!["Plank Jack", "Zed"]);
}

#[tokio::test]
async fn test_browse_bad_operator() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/api/exicon/browse?op=xor")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("operator"));
}

#[tokio::test]
async fn test_export_csv_honors_filters() {
    let app = setup_app().await;
    let token = login(&app).await;
    seed_browse_catalog(&app, &token).await;
    create_exercise(
        &app,
        &token,
        json!({"name": "Merkin, Diamond", "definition": "Hands in a \"diamond\"", "tags": "Arms", "aliases": "Diamonds"}),
    )
    .await;

    let response = app
        .clone()
        .oneshot(get("/api/exicon/export?tags=Arms&page_size=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE].to_str().unwrap(), "text/csv; charset=utf-8");
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("f3-exicon-export.csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#""Name","Definition","Tags","Aliases","Video URL""#,
            r#""Merkin, Diamond","Hands in a ""diamond""","Arms","Diamonds","""#,
            r#""Neither","x","Arms","","""#,
            r#""Video Only","x","Arms","","https://example.com/clip""#,
        ]
    );

    let response = app
        .clone()
        .oneshot(get("/api/exicon/export?q=diamond"))
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap().lines().count(), 2);

    let (status, _) = send(&app, get("/api/exicon/export?op=xor")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reserved_names_rejected_everywhere() {
    let app = setup_app().await;
    let token = login(&app).await;
    create_exercise(&app, &token, json!({"name": "Mosey", "definition": "Slow run"})).await;

    for word in xicon_common::slug::RESERVED_SLUGS {
        let name = format!("{}!", word.to_uppercase());
        let payload = json!({"name": name, "definition": "x"});

        for uri in ["/api/exicon/create", "/api/lexicon/create"] {
            let (status, body) = send(&app, json_request("POST", uri, Some(&token), payload.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} via {}", name, uri);
            assert!(body["error"].as_str().unwrap().contains("reserved"));
        }

        let (status, _) = send(&app, json_request("POST", "/api/exicon/submit", None, payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} via submit", name);

        let (status, _) = send(&app, json_request("PUT", "/api/exicon/mosey", Some(&token), payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} via update", name);
    }

    let (_, list) = send(&app, get("/api/exicon")).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (status, _) = send(&app, get("/api/exicon/mosey")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, counts) = send(&app, admin_request("GET", "/api/submissions/count", &token)).await;
    assert_eq!(counts["totalCount"], 0);
}

#[tokio::test]
async fn test_tag_catalog() {
    let app = setup_app().await;
    let (status, body) = send(&app, get("/api/exicon/tags")).await;
    assert_eq!(status, StatusCode::OK);

    let tags = body["tags"].as_array().unwrap();
    assert!(tags.contains(&json!("Full Body")));
    assert!(tags.contains(&json!("Video")));
    assert!(tags.contains(&json!("⭐ Starred")));
}

#[tokio::test]
async fn test_references_resolve_existing_names_only() {
    let app = setup_app().await;
    let token = login(&app).await;

    create_exercise(&app, &token, json!({"name": "Merkin", "definition": "Pushup"})).await;
    create_exercise(
        &app,
        &token,
        json!({"name": "Man Maker", "definition": "@(Merkin) then @(Burpee)"}),
    )
    .await;

    let (status, body) = send(&app, get("/api/exicon/man-maker/references")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["segments"],
        json!([
            {"type": "link", "name": "Merkin", "slug": "merkin"},
            {"type": "text", "text": " then @(Burpee)"}
        ])
    );
}

#[tokio::test]
async fn test_term_references_link_to_exercises() {
    let app = setup_app().await;
    let token = login(&app).await;

    create_exercise(&app, &token, json!({"name": "Merkin", "definition": "Pushup"})).await;
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/lexicon/create",
            Some(&token),
            json!({"name": "Beatdown", "definition": "Plenty of @(Merkin)"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/api/lexicon/beatdown/references")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["segments"],
        json!([
            {"type": "text", "text": "Plenty of "},
            {"type": "link", "name": "Merkin", "slug": "merkin"}
        ])
    );
}
