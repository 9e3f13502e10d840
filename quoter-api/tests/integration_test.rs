use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use quoter_api::{app, AppState, AuthConfig};
use quoter_store::{RateLimitRule, RateLimits};
use serde_json::{json, Value};
use std::io::{Cursor, Read};
use std::net::SocketAddr;
use tower::ServiceExt;

// ============================================================================
// Helpers
// ============================================================================

fn test_auth() -> AuthConfig {
    AuthConfig {
        secret: "integration-secret".to_string(),
        expiration: 3600,
        bcrypt_cost: 4,
    }
}

fn generous_limits() -> RateLimits {
    let rule = RateLimitRule::new(1000, 60);
    RateLimits {
        calculate: rule,
        auth: rule,
        history: rule,
        export: rule,
        default: vec![rule],
    }
}

fn router_with(limits: RateLimits) -> Router {
    let state = AppState::in_memory(test_auth(), limits).unwrap();
    app(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
}

fn router() -> Router {
    router_with(generous_limits())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn supplement() -> Value {
    json!({
        "category": "supplement",
        "purchasePrice": 10,
        "fxRate": 50,
        "weightGrams": 30,
        "count": 60,
        "dailyDose": 2,
        "productShape": "Capsules/Tablets",
        "packingMaterial": "Plastic",
        "bottleSize": "Normal",
        "isMaleSupport": "No",
        "importFrom": "US"
    })
}

fn device() -> Value {
    json!({
        "category": "device",
        "purchasePrice": 100,
        "fxRate": 50,
        "lengthCm": 20,
        "widthCm": 20,
        "heightCm": 20,
        "weightKg": 5,
        "isMaleSupport": "No",
        "importFrom": "US"
    })
}

async fn register(app: &Router, username: &str) -> String {
    let response = send(
        app,
        post_json(
            "/auth/register",
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "s3cret-pass"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

// ============================================================================
// Quotes
// ============================================================================

#[tokio::test]
async fn test_supplement_quote() {
    let app = router();
    let response = send(&app, post_json("/calculate", supplement())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["baseCost"], 500.0);
    assert_eq!(body["totalCost"], 1147.0);
    assert_eq!(body["finalPrice"], 1600.0);
    assert_eq!(body["profit"], 453.0);
    assert_eq!(body["margin"], 28.3);
}

#[tokio::test]
async fn test_device_quote() {
    let app = router();
    let response = send(&app, post_json("/calculate", device())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["baseCost"], 5000.0);
    assert_eq!(body["totalCost"], 65000.0);
    assert_eq!(body["finalPrice"], 74750.0);
    assert_eq!(body["profit"], 9750.0);
    assert_eq!(body["margin"], 13.0);
}

#[tokio::test]
async fn test_category_defaults_to_supplement() {
    let app = router();
    let mut payload = supplement();
    payload.as_object_mut().unwrap().remove("category");

    let response = send(&app, post_json("/calculate", payload)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["finalPrice"], 1600.0);
}

#[tokio::test]
async fn test_empty_body_rejected() {
    let app = router();

    let response = send(&app, post_json("/calculate", json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No input data provided");

    let no_body = Request::builder()
        .method("POST")
        .uri("/calculate")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, no_body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No input data provided");
}

#[tokio::test]
async fn test_unknown_category_rejected() {
    let app = router();
    let response = send(&app, post_json("/calculate", json!({"category": "food", "purchasePrice": 1}))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Invalid category. Must be 'supplement' or 'device'"
    );
}

#[tokio::test]
async fn test_validation_failures() {
    let app = router();

    let mut negative = supplement();
    negative["purchasePrice"] = json!(-1);
    let response = send(&app, post_json("/calculate", negative)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["message"], "Negative value not allowed for purchasePrice");

    let mut missing = device();
    missing.as_object_mut().unwrap().remove("weightKg");
    let response = send(&app, post_json("/calculate", missing)).await;
    let body = body_json(response).await;
    assert_eq!(body["message"], "Missing required field: weightKg");

    let mut not_numeric = supplement();
    not_numeric["fxRate"] = json!("abc");
    let response = send(&app, post_json("/calculate", not_numeric)).await;
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid numeric value for fxRate");

    // Rejected quotes are not recorded
    let history = body_json(send(&app, get("/calculations")).await).await;
    assert_eq!(history["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_numeric_strings_accepted() {
    let app = router();
    let mut payload = supplement();
    payload["purchasePrice"] = json!("10");
    payload["fxRate"] = json!("50.0");

    let response = send(&app, post_json("/calculate", payload)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["finalPrice"], 1600.0);
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
async fn test_history_pagination_and_filter() {
    let app = router();
    for _ in 0..3 {
        send(&app, post_json("/calculate", supplement())).await;
    }
    for _ in 0..2 {
        send(&app, post_json("/calculate", device())).await;
    }

    let body = body_json(send(&app, get("/calculations?page=1&per_page=2")).await).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["calculations"].as_array().unwrap().len(), 2);
    assert_eq!(body["calculations"][0]["category"], "device");
    assert_eq!(body["calculations"][0]["inputs"]["lengthCm"], 20);
    assert_eq!(body["calculations"][0]["results"]["finalPrice"], 74750.0);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["pages"], 3);
    assert_eq!(body["pagination"]["has_next"], true);
    assert_eq!(body["pagination"]["has_prev"], false);

    let body = body_json(send(&app, get("/calculations?category=supplement")).await).await;
    assert_eq!(body["pagination"]["total"], 3);
    assert!(body["calculations"]
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["category"] == "supplement"));

    // Unknown filters are ignored, bad numbers fall back to defaults
    let body = body_json(send(&app, get("/calculations?category=food&page=abc&per_page=0")).await).await;
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["per_page"], 1);

    let body = body_json(send(&app, get("/calculations?per_page=500")).await).await;
    assert_eq!(body["pagination"]["per_page"], 100);
}

#[tokio::test]
async fn test_history_far_page_is_empty() {
    let app = router();
    send(&app, post_json("/calculate", supplement())).await;

    let response = send(&app, get("/calculations?page=9223372036854775807&per_page=100")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["calculations"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["page"], i64::MAX as u64);
    assert_eq!(body["pagination"]["has_next"], false);
    assert_eq!(body["pagination"]["has_prev"], true);
}

// ============================================================================
// Identity
// ============================================================================

#[tokio::test]
async fn test_register_login_me() {
    let app = router();
    let token = register(&app, "amira").await;

    let response = send(
        &app,
        post_json("/auth/login", json!({"username": "amira", "password": "s3cret-pass"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "amira");
    assert!(body["user"].get("password_hash").is_none());

    let me = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, me).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["email"], "amira@example.com");
}

#[tokio::test]
async fn test_register_conflicts_and_missing_fields() {
    let app = router();
    register(&app, "amira").await;

    let response = send(
        &app,
        post_json(
            "/auth/register",
            json!({"username": "amira", "email": "new@example.com", "password": "x"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Username already exists");

    let response = send(
        &app,
        post_json(
            "/auth/register",
            json!({"username": "other", "email": "amira@example.com", "password": "x"}),
        ),
    )
    .await;
    assert_eq!(body_json(response).await["error"], "Email already exists");

    let response = send(&app, post_json("/auth/register", json!({"username": "other"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing required fields");
}

#[tokio::test]
async fn test_login_failures() {
    let app = router();
    register(&app, "amira").await;

    let response = send(
        &app,
        post_json("/auth/login", json!({"username": "amira", "password": "wrong"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials");

    let response = send(
        &app,
        post_json("/auth/login", json!({"username": "nobody", "password": "wrong"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, post_json("/auth/login", json!({"username": "amira"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing credentials");
}

#[tokio::test]
async fn test_me_requires_valid_token() {
    let app = router();

    let response = send(&app, get("/auth/me")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "No token provided");

    let bad = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, bad).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid token");
}

#[tokio::test]
async fn test_signed_in_quote_is_attributed() {
    let app = router();
    let token = register(&app, "amira").await;

    let me = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let user_id = body_json(send(&app, me).await).await["user"]["id"].clone();

    let mut req = post_json("/calculate", device());
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    assert_eq!(send(&app, req).await.status(), StatusCode::OK);

    // A broken token does not block an anonymous quote
    let mut req = post_json("/calculate", device());
    req.headers_mut().insert(header::AUTHORIZATION, "Bearer junk".parse().unwrap());
    assert_eq!(send(&app, req).await.status(), StatusCode::OK);

    let body = body_json(send(&app, get("/calculations")).await).await;
    assert_eq!(body["calculations"][0]["user_id"], Value::Null);
    assert_eq!(body["calculations"][1]["user_id"], user_id);
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_export_csv() {
    let app = router();
    let response = send(
        &app,
        post_json(
            "/export/csv",
            json!({
                "category": "supplement",
                "results": {"finalPrice": 1600, "totalCost": 1147, "profit": 453, "margin": 28.3, "baseCost": 500}
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"calculation_"));
    assert!(disposition.ends_with(".csv\""));

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Category,Final Price,Total Cost,Profit,Margin %,Base Cost,Timestamp"
    );
    assert!(lines.next().unwrap().starts_with("supplement,1600,1147,453,28.3,500,"));
}

#[tokio::test]
async fn test_export_csv_non_string_category() {
    let app = router();
    let response = send(
        &app,
        post_json("/export/csv", json!({"category": 5, "results": {"finalPrice": 550}})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.lines().nth(1).unwrap().starts_with("5,550,0,0,0,0,"));
}

#[tokio::test]
async fn test_export_excel() {
    let app = router();
    let response = send(
        &app,
        post_json(
            "/export/excel",
            json!({
                "results": {"finalPrice": 74750, "totalCost": 65000, "profit": 9750, "margin": 13.0, "baseCost": 5000},
                "inputs": {"purchasePrice": 100, "importFrom": "US"}
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut inputs_sheet = String::new();
    archive
        .by_name("xl/worksheets/sheet2.xml")
        .unwrap()
        .read_to_string(&mut inputs_sheet)
        .unwrap();
    assert!(inputs_sheet.contains("purchasePrice"));
    assert!(inputs_sheet.contains("importFrom"));
}

#[tokio::test]
async fn test_export_requires_data() {
    let app = router();
    for uri in ["/export/csv", "/export/excel"] {
        let response = send(&app, post_json(uri, json!({}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No data provided");
    }
}

// ============================================================================
// Operations
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = router();
    let response = send(&app, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["service"], "pricing-calculator");
}

#[tokio::test]
async fn test_metrics_count_quotes() {
    let app = router();
    send(&app, post_json("/calculate", device())).await;
    send(&app, post_json("/calculate", json!({"category": "food", "x": 1}))).await;

    let response = send(&app, get("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains(r#"quoter_quotes_total{category="device"} 1"#));
    assert!(text.contains(r#"quoter_quote_failures_total{reason="unknown_category"} 1"#));
}

#[tokio::test]
async fn test_rate_limit_per_scope() {
    let limits = RateLimits {
        calculate: RateLimitRule::new(2, 60),
        ..generous_limits()
    };
    let app = router_with(limits);

    for _ in 0..2 {
        let response = send(&app, post_json("/calculate", device())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(&app, post_json("/calculate", device())).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["error"], "Rate limit exceeded");

    // Other scopes keep their own budget
    let response = send(&app, get("/calculations")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Health probes are never limited
    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
}
