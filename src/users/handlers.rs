use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::UserResult,
    state::AppState,
    users::{
        dto::{CreateUserRequest, DeletedResponse, UpdateUserRequest},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> UserResult<(StatusCode, Json<User>)> {
    let Json(payload) = payload?;
    let user = state.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UserResult<Json<User>> {
    Ok(Json(state.users.get(&id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> UserResult<Json<User>> {
    let Json(payload) = payload?;
    Ok(Json(state.users.update(&id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UserResult<Json<DeletedResponse>> {
    state.users.delete(&id).await?;
    Ok(Json(DeletedResponse {
        message: "User deleted".into(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{app::build_app, users::memory::InMemoryUserStore};

    use super::*;

    fn app() -> Router {
        build_app(AppState::new(Arc::new(InMemoryUserStore::new())))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn ankit() -> Value {
        json!({
            "username": "ankit",
            "email": "ankit@example.com",
            "password": "securepassword",
            "roles": { "isSeller": true }
        })
    }

    #[tokio::test]
    async fn create_returns_201_without_password() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/api/v1/users", Some(ankit())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "ankit");
        assert_eq!(
            body["roles"],
            json!({ "isSeller": true, "isCustomer": true, "isAdmin": false })
        );
        assert!(body["id"].is_string());
        assert!(body["updatedAt"].is_string());
        let text = body.to_string();
        assert!(!text.contains("securepassword"));
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn validation_failures_are_400() {
        let app = app();
        let mut short = ankit();
        short["username"] = json!("ab");
        let (status, body) = send(&app, Method::POST, "/api/v1/users", Some(short)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation_error");

        let mut bad_role = ankit();
        bad_role["roles"] = json!({ "isAdmin": "yes" });
        let (status, _) = send(&app, Method::POST, "/api/v1/users", Some(bad_role)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_is_409() {
        let app = app();
        send(&app, Method::POST, "/api/v1/users", Some(ankit())).await;
        let mut dup = ankit();
        dup["email"] = json!("other@example.com");
        let (status, body) = send(&app, Method::POST, "/api/v1/users", Some(dup)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["type"], "conflict");
    }

    #[tokio::test]
    async fn read_update_delete_lifecycle() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/v1/users", Some(ankit())).await;
        let uri = format!("/api/v1/users/{}", created["id"].as_str().unwrap());

        let (status, read) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["email"], "ankit@example.com");

        let (status, updated) =
            send(&app, Method::PUT, &uri, Some(json!({ "username": "ankit_k" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["username"], "ankit_k");
        assert_eq!(updated["email"], "ankit@example.com");

        let (status, _) =
            send(&app, Method::PUT, &uri, Some(json!({ "password": "rotated!" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, ack) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["message"], "User deleted");

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found");
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids() {
        let app = app();
        let uri = format!("/api/v1/users/{}", uuid::Uuid::new_v4());
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::GET, "/api/v1/users/not-an-id", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = app();
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
