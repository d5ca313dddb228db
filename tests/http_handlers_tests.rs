use access_profiles_service::{
    interface::routes,
    test_utils::{TEST_USER_HEADER, create_test_app_state, create_test_context},
};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(TEST_USER_HEADER.0, TEST_USER_HEADER.1);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn empty_app() -> Router {
    routes(create_test_context().await.state)
}

fn lawyer_payload(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Equipe jurídica",
        "permissions": [
            { "screen_id": "processos", "permissions": ["view", "edit"] },
            { "screen_id": "agenda", "permissions": ["view"] }
        ]
    })
}

#[tokio::test]
async fn test_requests_without_user_are_rejected() {
    let app = empty_app().await;
    let request = Request::builder()
        .uri("/v1/access-profiles")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_lists_modules_and_screens() {
    let app = empty_app().await;
    let (status, body) = send(&app, "GET", "/v1/access-profiles/catalog", None).await;

    assert_eq!(status, StatusCode::OK);
    let modules = body["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 4);
    assert_eq!(modules[0]["key"], "escritorio");
    assert_eq!(modules[1]["screens"][0]["id"], "balancete");
    assert_eq!(
        modules[1]["screens"][0]["available_permissions"],
        json!(["view", "export"])
    );
    assert!(body["total_permissions"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_create_and_fetch_profile() {
    let app = empty_app().await;
    let (status, created) = send(
        &app,
        "POST",
        "/v1/access-profiles",
        Some(lawyer_payload("Advogado")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Advogado");
    assert_eq!(created["status"], "active");
    assert_eq!(created["permission_count"], 3);
    assert_eq!(created["created_by"], "admin");

    let uri = format!("/v1/access-profiles/{}", created["id"].as_str().unwrap());
    let (status, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(
        fetched["permissions"][0],
        json!({ "screen_id": "processos", "permissions": ["view", "edit"] })
    );
}

#[tokio::test]
async fn test_create_errors_map_to_form_fields() {
    let app = empty_app().await;
    send(&app, "POST", "/v1/access-profiles", Some(lawyer_payload("Advogado"))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/access-profiles",
        Some(lawyer_payload("ADVOGADO")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "name");

    let (status, body) = send(
        &app,
        "POST",
        "/v1/access-profiles",
        Some(json!({ "name": "Teste", "permissions": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "permissions");

    // Permissions a screen does not offer are dropped before validation.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/access-profiles",
        Some(json!({
            "name": "Teste",
            "permissions": [{ "screen_id": "dashboard", "permissions": ["delete"] }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "permissions");

    let (_, list) = send(&app, "GET", "/v1/access-profiles", None).await;
    assert_eq!(list["total"], 1);
}

#[tokio::test]
async fn test_update_profile_keeps_omitted_fields() {
    let app = empty_app().await;
    let (_, created) = send(
        &app,
        "POST",
        "/v1/access-profiles",
        Some(lawyer_payload("Advogado")),
    )
    .await;
    let uri = format!("/v1/access-profiles/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "name": "Advogado Sênior", "status": "inactive" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Advogado Sênior");
    assert_eq!(updated["status"], "inactive");
    assert_eq!(updated["description"], "Equipe jurídica");
    assert_eq!(updated["permissions"], created["permissions"]);

    let (status, _) = send(
        &app,
        "PUT",
        "/v1/access-profiles/missing",
        Some(json!({ "name": "Outro" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_filters_by_term_and_status() {
    let app = routes(create_test_app_state().await);

    let (status, body) = send(&app, "GET", "/v1/access-profiles?status=inactive", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["profiles"][0]["name"], "Atendimento");

    let (_, body) = send(&app, "GET", "/v1/access-profiles?q=ADMIN", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["profiles"][0]["users_count"], 1);

    let (status, body) = send(&app, "GET", "/v1/access-profiles?status=archived", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "status");
}

#[tokio::test]
async fn test_delete_guard_and_deactivation_flow() {
    let app = routes(create_test_app_state().await);
    let (_, body) = send(&app, "GET", "/v1/access-profiles?q=Advogado", None).await;
    let lawyer = &body["profiles"][0];
    assert_eq!(lawyer["users_count"], 3);
    let uri = format!("/v1/access-profiles/{}", lawyer["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["field"].is_null());

    let (status, toggled) = send(&app, "POST", &format!("{uri}/toggle-status"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["status"], "inactive");
    assert_eq!(toggled["users_count"], 0);

    let (_, body) = send(&app, "GET", "/v1/access-profiles?q=Administrador", None).await;
    assert_eq!(body["profiles"][0]["users_count"], 4);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}
