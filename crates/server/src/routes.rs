//! Router, shared state, and the per-entity HTTP handlers.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Json;
use axum::routing::{get, post};
use axum::{Form, Router};
use axum_extra::extract::Form as MultiForm;
use serde_json::{json, Value};
use storage::{AdminStore, GrantId, GroupId, NameId};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::Authenticator;
use crate::error::ApiError;

use admin::{DeleteRequest, DeleteResponse, GrantForm, GroupForm, NameForm};
use policy::Principal;

/// Shared state for the axum handlers.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<Mutex<AdminStore>>,
    pub auth: Arc<dyn Authenticator>,
}

impl ServerState {
    pub fn new(store: AdminStore, auth: impl Authenticator + 'static) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            auth: Arc::new(auth),
        }
    }
}

/// Build the application router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/names", get(list_names).post(create_name))
        .route("/names/{id}", post(update_name))
        .route("/names/del", post(delete_names))
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}", post(update_group))
        .route("/groups/del", post(delete_groups))
        .route("/grants", get(list_grants).post(create_grant))
        .route("/grants/{id}", post(update_grant))
        .route("/grants/del", post(delete_grants))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the task is cancelled.
pub async fn serve(addr: SocketAddr, state: ServerState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, router(state)).await
}

fn principal(state: &ServerState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;
    state.auth.authenticate(token).ok_or(ApiError::Unauthorized)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// --- names ---

async fn list_names(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let records = admin::list_names(&principal, &store)?;
    Ok(Json(json!(records)))
}

async fn create_name(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(form): Form<NameForm>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let record = admin::create_name(&principal, &store, &form)?;
    Ok(Json(json!(record)))
}

async fn update_name(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(form): Form<NameForm>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let record = admin::update_name(&principal, &store, NameId(id), &form)?;
    Ok(Json(json!(record)))
}

async fn delete_names(
    State(state): State<ServerState>,
    headers: HeaderMap,
    MultiForm(request): MultiForm<DeleteRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    // Always 200 with the status blob once past the capability gate.
    Ok(Json(admin::delete_names(&principal, &store, &request)?))
}

// --- groups ---

async fn list_groups(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let records = admin::list_groups(&principal, &store)?;
    Ok(Json(json!(records)))
}

async fn create_group(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(form): Form<GroupForm>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let record = admin::create_group(&principal, &store, &form)?;
    Ok(Json(json!(record)))
}

async fn update_group(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(form): Form<GroupForm>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let record = admin::update_group(&principal, &store, GroupId(id), &form)?;
    Ok(Json(json!(record)))
}

async fn delete_groups(
    State(state): State<ServerState>,
    headers: HeaderMap,
    MultiForm(request): MultiForm<DeleteRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    Ok(Json(admin::delete_groups(&principal, &store, &request)?))
}

// --- grants ---

async fn list_grants(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let records = admin::list_grants(&principal, &store)?;
    Ok(Json(json!(records)))
}

async fn create_grant(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Form(form): Form<GrantForm>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let record = admin::create_grant(&principal, &store, &form)?;
    Ok(Json(json!(record)))
}

async fn update_grant(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(form): Form<GrantForm>,
) -> Result<Json<Value>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    let record = admin::update_grant(&principal, &store, GrantId(id), &form)?;
    Ok(Json(json!(record)))
}

async fn delete_grants(
    State(state): State<ServerState>,
    headers: HeaderMap,
    MultiForm(request): MultiForm<DeleteRequest>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let principal = principal(&state, &headers)?;
    let store = state.store.lock().unwrap();
    Ok(Json(admin::delete_grants(&principal, &store, &request)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenAuthenticator;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use policy::Capability;
    use tower::ServiceExt;

    const FORM: &str = "application/x-www-form-urlencoded";

    fn test_router() -> Router {
        let store = AdminStore::in_memory().unwrap();
        let admin = Capability::ALL
            .into_iter()
            .fold(Principal::new("admin"), Principal::grant);
        let auth = TokenAuthenticator::new()
            .register("admin-token", admin)
            .register("viewer-token", Principal::new("viewer"));
        router(ServerState::new(store, auth))
    }

    fn form_post(uri: &str, token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", FORM)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = test_router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/names")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_capability_is_forbidden() {
        let app = test_router();
        let response = app
            .oneshot(form_post(
                "/names",
                "viewer-token",
                "username=alice&password=pw",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await, json!({ "error": "forbidden" }));
    }

    #[tokio::test]
    async fn create_then_list_names() {
        let app = test_router();
        let response = app
            .clone()
            .oneshot(form_post(
                "/names",
                "admin-token",
                "username=alice&full_name=Alice&password=hunter2",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let created = body_json(response).await;
        assert_eq!(created["username"], "alice");
        // The hash never leaves the service.
        assert!(created.get("password_hash").is_none());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/names")
                    .header("authorization", "Bearer admin-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_is_unprocessable_not_a_fault() {
        let app = test_router();
        let response = app
            .clone()
            .oneshot(form_post(
                "/names",
                "admin-token",
                "username=alice&password=pw",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(form_post(
                "/names",
                "admin-token",
                "username=alice&password=other",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["errors"]["username"].is_array());
    }

    #[tokio::test]
    async fn validation_failure_echoes_field_errors() {
        let app = test_router();
        let response = app
            .oneshot(form_post("/names", "admin-token", "username=&password="))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["errors"]["username"].is_array());
        assert!(body["errors"]["password"].is_array());
    }

    #[tokio::test]
    async fn delete_answers_200_with_status_blob() {
        let app = test_router();
        app.clone()
            .oneshot(form_post(
                "/names",
                "admin-token",
                "username=alice&password=pw",
            ))
            .await
            .unwrap();

        // Missing record: still 200, status=false in-band.
        let response = app
            .clone()
            .oneshot(form_post("/names/del", "admin-token", "nid=999"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], false);
        assert!(body["error"].is_string());

        // Existing record via the repeated-id form.
        let response = app
            .oneshot(form_post("/names/del", "admin-token", "id=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "status": true, "error": null }));
    }

    #[tokio::test]
    async fn delete_accepts_repeated_ids() {
        let app = test_router();
        for user in ["a", "b", "c"] {
            app.clone()
                .oneshot(form_post(
                    "/names",
                    "admin-token",
                    &format!("username={user}&password=pw"),
                ))
                .await
                .unwrap();
        }

        let response = app
            .clone()
            .oneshot(form_post("/names/del", "admin-token", "id=1&id=2&id=3"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["status"], true);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/names")
                    .header("authorization", "Bearer admin-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn update_name_by_path_id() {
        let app = test_router();
        app.clone()
            .oneshot(form_post(
                "/names",
                "admin-token",
                "username=alice&password=pw",
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(form_post(
                "/names/1",
                "admin-token",
                "username=alice&full_name=Alice+Example&password=1",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["full_name"], "Alice Example");
    }
}
