use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use schoolhouse::{config::Settings, create_router, service::ServiceContext};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const HEAD: &str = "head@school.org";
const HEAD_PASSWORD: &str = "head-pass";

struct TestApp {
    router: Router,
    _tmp: TempDir,
}

async fn spawn_app() -> anyhow::Result<TestApp> {
    spawn_app_with(|_| {}).await
}

async fn spawn_app_with(configure: impl FnOnce(&mut Settings)) -> anyhow::Result<TestApp> {
    let tmp = TempDir::new()?;

    let mut settings = Settings::default();
    settings.storage.data_dir = tmp.path().join("data");
    settings.storage.uploads_dir = tmp.path().join("uploads");
    settings.server.public_dir = tmp.path().join("public");
    settings.auth.protected_admin = HEAD.to_string();

    configure(&mut settings);

    std::fs::create_dir_all(&settings.server.public_dir)?;
    std::fs::write(settings.server.public_dir.join("index.html"), "<h1>Welcome</h1>")?;
    std::fs::write(settings.server.public_dir.join("about.html"), "<h1>About us</h1>")?;

    let service_context = Arc::new(ServiceContext::from_settings(&settings));
    service_context.admin_service.bootstrap(Some(HEAD_PASSWORD)).await?;

    Ok(TestApp {
        router: create_router(service_context, Arc::new(settings)),
        _tmp: tmp,
    })
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Multipart body with text fields and `(field, filename, bytes)` file parts.
fn multipart_request(uri: &str, token: Option<&str>, fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Request<Body> {
    const BOUNDARY: &str = "----schoolhouse-test-boundary";

    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", BOUNDARY, name, value).as_bytes(),
        );
    }
    for (name, filename, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY));
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Uncompressed bitmap, so the encoded size is predictable (about 3 bytes per pixel).
fn bmp(width: u32, height: u32) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut buf, image::ImageFormat::Bmp)
        .unwrap();
    buf.into_inner()
}

fn data_url(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    format!("data:image/bmp;base64,{}", STANDARD.encode(bytes))
}

async fn send(app: &TestApp, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, body))
}

async fn login(app: &TestApp, email: &str, password: &str) -> anyhow::Result<String> {
    let (status, body) = send(
        app,
        json_request(Method::POST, "/api/auth", None, json!({ "email": email, "password": password })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

async fn create_admin(app: &TestApp, token: &str, email: &str) -> anyhow::Result<()> {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/create-admin",
            Some(token),
            json!({ "email": email, "password": "secret1" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "create-admin failed: {}", body);
    Ok(())
}

#[tokio::test]
async fn test_posted_announcement_is_listed_first() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;

    for title in ["Older", "Test"] {
        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/announcements",
                Some(&token),
                json!({ "title": title, "content": "<p>Hi</p>", "type": "general" }),
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (status, body) = send(&app, empty_request(Method::GET, "/api/announcements", None)).await?;
    assert_eq!(status, StatusCode::OK);
    let first = &body[0];
    assert_eq!(first["title"], "Test");
    assert!(first["id"].is_i64());
    assert_eq!(first["content"], "<p>Hi</p>");
    assert_eq!(first["preview"], "<p>Hi</p>");
    assert_eq!(first["truncated"], false);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    Ok(())
}

#[tokio::test]
async fn test_login_sets_session_cookie_and_reports_display_name() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth",
            None,
            json!({ "email": HEAD, "password": HEAD_PASSWORD }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["email"], "Head");
    assert!(body["loginTime"].is_string());
    assert_eq!(body["session"]["isAuthenticated"], true);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/auth", None, json!({ "email": HEAD, "password": "wrong-pass" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    Ok(())
}

#[tokio::test]
async fn test_mutations_require_a_session() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/announcements",
            None,
            json!({ "title": "Sneaky", "content": "<p>x</p>", "type": "general" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    for (method, uri) in [
        (Method::DELETE, "/api/announcements?id=1"),
        (Method::DELETE, "/api/gallery?id=1"),
        (Method::DELETE, "/api/results?id=1"),
        (Method::GET, "/api/admins-list"),
        (Method::GET, "/api/recovery-requests"),
    ] {
        let (status, _) = send(&app, empty_request(method.clone(), uri, Some("not-a-token"))).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }

    // Reads stay public
    for uri in ["/api/announcements", "/api/gallery", "/api/gallery/categories", "/api/results", "/api/admin-count"] {
        let (status, _) = send(&app, empty_request(Method::GET, uri, None)).await?;
        assert_eq!(status, StatusCode::OK, "GET {}", uri);
    }

    Ok(())
}

#[tokio::test]
async fn test_logout_revokes_token() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;

    let (status, _) = send(&app, empty_request(Method::GET, "/api/admins-list", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, empty_request(Method::POST, "/api/logout", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, empty_request(Method::GET, "/api/admins-list", Some(&token))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_delete_requires_id_and_ignores_unknown_ids() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;

    let (status, body) = send(&app, empty_request(Method::DELETE, "/api/announcements", Some(&token))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Announcement ID required");

    let (status, body) = send(
        &app,
        empty_request(Method::DELETE, "/api/announcements?id=424242", Some(&token)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    Ok(())
}

#[tokio::test]
async fn test_invalid_payloads_are_rejected() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/announcements")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("{not json"))?;
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/announcements",
            Some(&token),
            json!({ "title": "", "content": "<p>x</p>", "type": "general" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/results",
            Some(&token),
            json!({ "year": 2024, "grade": "Grade 12", "subject": "Maths", "passRate": 90.0, "enrolled": 10, "passed": 11 }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "passed cannot exceed enrolled");

    Ok(())
}

#[tokio::test]
async fn test_results_can_be_filtered() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;

    for (year, grade) in [(2023, "Grade 12"), (2024, "Grade 12"), (2024, "Grade 10")] {
        let (status, _) = send(
            &app,
            json_request(
                Method::POST,
                "/api/results",
                Some(&token),
                json!({ "year": year, "grade": grade, "subject": "Mathematics", "passRate": 87.5 }),
            ),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, empty_request(Method::GET, "/api/results?year=2024", None)).await?;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (_, body) = send(&app, empty_request(Method::GET, "/api/results?year=2024&grade=Grade%2012", None)).await?;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_protected_admin_cannot_be_removed() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;
    create_admin(&app, &token, "deputy@school.org").await?;
    let deputy = login(&app, "deputy@school.org", "secret1").await?;

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/remove-admin", Some(&deputy), json!({ "email": HEAD })),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/create-admin", Some(&token), json!({ "email": "deputy@school.org", "password": "secret1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, empty_request(Method::GET, "/api/admins-list", Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    let admins = body.as_array().cloned().unwrap_or_default();
    assert_eq!(admins.len(), 2);
    assert!(admins.iter().all(|a| a.get("passwordHash").is_none()));

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/remove-admin", Some(&token), json!({ "email": "deputy@school.org" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // The removed admin's session died with the account
    let (status, _) = send(&app, empty_request(Method::GET, "/api/admins-list", Some(&deputy))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_admin_count_is_public() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    let (status, body) = send(&app, empty_request(Method::GET, "/api/admin-count", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"], 1);
    assert_eq!(body["minimum"], 2);
    assert_eq!(body["recommended"], 3);
    assert_eq!(body["admins"], json!(["head"]));
    assert_eq!(body["isMinimumMet"], false);

    Ok(())
}

#[tokio::test]
async fn test_password_recovery_needs_two_other_admins() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let head = login(&app, HEAD, HEAD_PASSWORD).await?;
    create_admin(&app, &head, "b@school.org").await?;
    create_admin(&app, &head, "c@school.org").await?;
    let c = login(&app, "c@school.org", "secret1").await?;

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/password-recovery", None, json!({ "email": "nobody@school.org" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/password-recovery",
            None,
            json!({ "email": "b@school.org", "reason": "Forgot it over the holidays" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let request_id = body["requestId"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/password-recovery", None, json!({ "email": "b@school.org" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, pending) = send(&app, empty_request(Method::GET, "/api/recovery-requests", Some(&head))).await?;
    assert_eq!(pending[0]["id"], request_id.as_str());
    assert_eq!(pending[0]["requiredApprovals"], 2);

    // An approver cannot claim someone else's identity
    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/approve-recovery",
            Some(&head),
            json!({ "requestId": request_id, "action": "approve", "approverEmail": "c@school.org" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/approve-recovery",
            Some(&head),
            json!({ "requestId": request_id, "action": "approve" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "pending");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/approve-recovery",
            Some(&c),
            json!({ "requestId": request_id, "action": "approve", "newPassword": "brand-new" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "approved");
    assert_eq!(body["message"], "Password reset completed successfully");

    login(&app, "b@school.org", "brand-new").await?;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/approve-recovery",
            Some(&c),
            json!({ "requestId": request_id, "action": "reject" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn test_static_pages_are_served_uncached() -> anyhow::Result<()> {
    let app = spawn_app().await?;

    for uri in ["/", "/about", "/about.html"] {
        let response = app.router.clone().oneshot(empty_request(Method::GET, uri, None)).await?;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
            Some("no-cache, no-store, must-revalidate, max-age=0")
        );
        assert_eq!(response.headers().get(header::PRAGMA).and_then(|v| v.to_str().ok()), Some("no-cache"));
    }

    let response = app.router.clone().oneshot(empty_request(Method::GET, "/missing", None)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (status, body) = send(&app, empty_request(Method::GET, "/api/nope", None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    Ok(())
}

#[tokio::test]
async fn test_gallery_upload_edit_and_delete() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;
    let small = bmp(40, 30);

    let (status, _) = send(
        &app,
        multipart_request("/api/gallery", None, &[("title", "Sports Day")], &[("image", "a.bmp", &small)]),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        multipart_request(
            "/api/gallery",
            Some(&token),
            &[("title", "Sports Day"), ("category", "Sports")],
            &[
                ("image", "a.bmp", &small),
                ("image", "notes.txt", b"not a picture"),
                ("image", "c.bmp", &small),
            ],
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", body);
    assert_eq!(body["photos"][0]["title"], "Sports Day");
    assert_eq!(body["photos"][1]["title"], "Sports Day (3)");
    assert_eq!(body["skipped"][0]["filename"], "notes.txt");

    let (status, body) = send(
        &app,
        multipart_request("/api/gallery", Some(&token), &[("title", "Play"), ("category", "Drama")], &[("image", "p.bmp", &small)]),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["photos"][0]["title"], "Play");
    let play_id = body["photos"][0]["id"].as_i64().unwrap_or_default();
    let play_image = body["photos"][0]["image"].as_str().unwrap_or_default().to_string();

    let (_, sports) = send(&app, empty_request(Method::GET, "/api/gallery?category=sports", None)).await?;
    assert_eq!(sports.as_array().map(Vec::len), Some(2));

    let (status, categories) = send(&app, empty_request(Method::GET, "/api/gallery/categories", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        categories,
        json!([{ "name": "drama", "count": 1 }, { "name": "sports", "count": 2 }])
    );

    // Stored images are served from /uploads
    let response = app.router.clone().oneshot(empty_request(Method::GET, &format!("/{}", play_image), None)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(
        &app,
        json_request(Method::PUT, "/api/gallery", Some(&token), json!({ "id": play_id, "category": "School Events" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["photo"]["category"], "school events");
    assert_eq!(body["photo"]["title"], "Play");

    let (status, body) = send(
        &app,
        json_request(Method::PUT, "/api/gallery/update", Some(&token), json!({ "id": play_id, "title": "  Spring Play " })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["photo"]["title"], "Spring Play");

    let (status, body) = send(
        &app,
        json_request(Method::PUT, "/api/gallery/update", Some(&token), json!({ "id": 1, "title": "Ghost" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, empty_request(Method::DELETE, &format!("/api/gallery?id={}", play_id), Some(&token))).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, all) = send(&app, empty_request(Method::GET, "/api/gallery", None)).await?;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
    let response = app.router.clone().oneshot(empty_request(Method::GET, &format!("/{}", play_image), None)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_full_size_images_fit_through_the_body_limits() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;
    let max_file_bytes = Settings::default().uploads.max_file_bytes;

    // Each file is under the per-file ceiling; together they are not
    let photo = bmp(1400, 1400);
    assert!(photo.len() < max_file_bytes && photo.len() * 2 > max_file_bytes + 1024 * 1024);
    let (status, body) = send(
        &app,
        multipart_request(
            "/api/gallery",
            Some(&token),
            &[("title", "Assembly")],
            &[("image", "one.bmp", &photo), ("image", "two.bmp", &photo)],
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "gallery upload failed: {}", body);
    assert_eq!(body["photos"].as_array().map(Vec::len), Some(2));

    // Base64 inflates a just-under-the-ceiling image well past the raw size
    let poster = bmp(1800, 1800);
    assert!(poster.len() < max_file_bytes);
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/announcements",
            Some(&token),
            json!({ "title": "Poster", "content": "<p>See poster</p>", "type": "events", "image": data_url(&poster) }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "announcement failed: {}", body);
    assert!(body["announcement"]["image"].as_str().unwrap_or_default().ends_with(".jpg"));

    Ok(())
}

#[tokio::test]
async fn test_upload_ceilings_answer_in_json() -> anyhow::Result<()> {
    let app = spawn_app_with(|settings| settings.uploads.max_file_bytes = 64 * 1024).await?;
    let token = login(&app, HEAD, HEAD_PASSWORD).await?;
    let small = bmp(40, 30);
    let large = bmp(200, 200);

    // One oversized file among good ones is skipped and reported
    let (status, body) = send(
        &app,
        multipart_request(
            "/api/gallery",
            Some(&token),
            &[("title", "Field Trip")],
            &[("image", "ok.bmp", &small), ("image", "huge.bmp", &large)],
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["photos"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["skipped"][0]["filename"], "huge.bmp");

    let (status, body) = send(
        &app,
        multipart_request("/api/gallery", Some(&token), &[("title", "Huge")], &[("image", "huge.bmp", &large)]),
    )
    .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/announcements",
            Some(&token),
            json!({ "title": "Big", "content": "<p>x</p>", "type": "general", "image": data_url(&large) }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);

    // A body past the route limit is refused before it is parsed
    let padding = "a".repeat(2 * 1024 * 1024);
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/announcements",
            Some(&token),
            json!({ "title": "Long", "content": padding, "type": "general" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/announcements")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("title=Hi"))?;
    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], false);

    Ok(())
}
