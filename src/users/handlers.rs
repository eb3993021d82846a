use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::dto::{
    CreateUserRequest, ExistsQuery, ExistsResponse, GenerateJwtRequest, TokenResponse,
    UpdateUserRequest, UserResponse,
};
use crate::{
    auth::services::authenticate,
    entity::User,
    error::{Error, Result},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    }
    EMAIL_RE.is_match(email)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/generate-jwt", post(generate_jwt))
        .route("/users/exists", get(user_exists))
        .route("/users/email/:email", get(get_user_by_email))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_argument(format!("{field} is required")));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(body) = payload?;
    require("username", &body.username)?;
    require("email", &body.email)?;
    require("password", &body.password)?;

    if !is_valid_email(body.email.trim()) {
        warn!("invalid email");
        return Err(Error::invalid_argument("invalid email"));
    }

    let mut user = tokio::task::spawn_blocking(move || {
        User::new(body.username, body.email, &body.password, body.role)
    })
    .await
    .map_err(|e| Error::Hashing(e.to_string()))??;
    state.users.create(&mut user).await?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{}", user.id))],
        Json(UserResponse::from(&user)),
    ))
}

#[instrument(skip(state))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state.users.find_by_email(&email).await?;
    Ok(Json(UserResponse::from(&user)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state.users.find_by_id(&id).await?;
    Ok(Json(UserResponse::from(&user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let mut user = state.users.find_by_id(&id).await?;
    let Json(body) = payload?;

    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    if let Some(username) = present(body.username) {
        user.username = username;
    }
    if let Some(email) = present(body.email) {
        if !is_valid_email(email.trim()) {
            return Err(Error::invalid_argument("invalid email"));
        }
        user.email = email;
    }
    if let Some(role) = present(body.role) {
        user.role = role;
    }

    state.users.update(&mut user).await?;
    info!(user_id = %user.id, "user updated");
    Ok(Json(UserResponse::from(&user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.users.find_by_id(&id).await?;
    state.users.delete(&id).await?;
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn user_exists(
    State(state): State<AppState>,
    Query(q): Query<ExistsQuery>,
) -> Result<Json<ExistsResponse>> {
    let email = q.email.unwrap_or_default();
    require("email", &email)?;
    let exists = state.users.exists(&email).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// Unknown email answers 404 and a wrong password 401, so this endpoint
/// reveals whether an address is registered.
#[instrument(skip(state, payload))]
pub async fn generate_jwt(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateJwtRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(body) = payload?;
    let token = authenticate(state.users.as_ref(), &state.jwt, &body.email, &body.password)
        .await
        .inspect_err(|e| {
            if matches!(e, Error::NotFound) {
                warn!("login unknown email");
            }
        })?;
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use crate::config::JwtConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn keys() -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: "test".into(),
            issuer: "test".into(),
            expires_in_seconds: 60,
        })
    }

    fn app() -> Router {
        routes().with_state(AppState::in_memory(keys()))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, email: &str) -> axum::response::Response {
        app.clone()
            .oneshot(json_request(
                "POST",
                "/users",
                json!({
                    "username": "foo",
                    "email": email,
                    "password": "password123",
                    "role": "admin"
                }),
            ))
            .await
            .unwrap()
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("foo@bar.com"));
        assert!(!is_valid_email("foo@bar"));
        assert!(!is_valid_email("foo bar@baz.com"));
    }

    #[tokio::test]
    async fn create_user_returns_view_without_hash() {
        let app = app();
        let res = register(&app, " Foo@Bar.COM ").await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body = json_body(res).await;
        assert_eq!(body["email"], "foo@bar.com");
        assert_eq!(body["role"], "admin");
        assert!(body["created_at"].is_string());
        assert!(body.get("password_hash").is_none());
        assert!(body.get("password").is_none());

        let res = app
            .clone()
            .oneshot(empty_request("GET", "/users/email/FOO@BAR.COM"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["id"], body["id"]);
    }

    #[tokio::test]
    async fn duplicate_email_is_409() {
        let app = app();
        assert_eq!(register(&app, "dup@example.com").await.status(), StatusCode::CREATED);
        assert_eq!(register(&app, "DUP@example.com").await.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_fields_are_400() {
        let app = app();
        let res = app
            .clone()
            .oneshot(json_request("POST", "/users", json!({ "email": "a@b.co" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        assert_eq!(register(&app, "not-an-email").await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_update_delete_by_id() {
        let app = app();
        let created = json_body(register(&app, "crud@example.com").await).await;
        let id = created["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(empty_request("GET", &format!("/users/{id}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/users/{id}"),
                json!({ "username": "renamed", "role": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["username"], "renamed");
        assert_eq!(body["role"], "admin");

        let res = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/users/{id}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = app
            .oneshot(empty_request("GET", &format!("/users/{id}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_to_taken_email_is_409() {
        let app = app();
        register(&app, "first@example.com").await;
        let second = json_body(register(&app, "second@example.com").await).await;
        let id = second["id"].as_str().unwrap();

        let res = app
            .oneshot(json_request(
                "PUT",
                &format!("/users/{id}"),
                json!({ "email": "FIRST@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn exists_endpoint() {
        let app = app();
        register(&app, "here@example.com").await;

        let res = app
            .clone()
            .oneshot(empty_request("GET", "/users/exists?email=HERE@example.com"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["exists"], true);

        let res = app
            .oneshot(empty_request("GET", "/users/exists"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn generate_jwt_statuses() {
        let app = app();
        let created = json_body(register(&app, "jwt@example.com").await).await;

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/generate-jwt",
                json!({ "email": "JWT@example.com", "password": "password123" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let token = json_body(res).await["token"].as_str().unwrap().to_string();
        let claims = keys().verify(&token).unwrap();
        assert_eq!(claims.sub.to_string(), created["id"].as_str().unwrap());

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/generate-jwt",
                json!({ "email": "jwt@example.com", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(json_body(res).await.get("token").is_none());

        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/generate-jwt",
                json!({ "email": "nobody@example.com", "password": "password123" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .oneshot(json_request(
                "POST",
                "/users/generate-jwt",
                json!({ "email": "jwt@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
