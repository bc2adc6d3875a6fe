//! Authentication: login/signup handlers, bearer-token extraction, and
//! role-gate middleware.
//!
//! Every protected scope demands an exact role match: `/api/admin/*`
//! requires `admin`, `/api/pegawai/*` requires `pegawai`. Verified claims
//! are inserted into request extensions for handlers that want them.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
    Json,
};
use serde_json::json;

use servisku_core::{hash_password, verify_password, Claims, ROLE_ADMIN, ROLE_PEGAWAI};

use crate::models::{LoginRequest, LoginResponse, SignupRequest, UserPublic};
use crate::state::AppState;
use crate::{Error, Result};

fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("missing Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("invalid Authorization header".to_string()))
}

async fn require_role(
    state: AppState,
    mut req: Request,
    next: Next,
    role: &'static str,
) -> Result<Response> {
    let claims = {
        let token = bearer_token(req.headers())?;
        state
            .auth()
            .verify(token)
            .map_err(|_| Error::Unauthorized("invalid token".to_string()))?
    };

    if claims.role != role {
        return Err(Error::Forbidden("forbidden".to_string()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    require_role(state, req, next, ROLE_ADMIN).await
}

pub async fn require_pegawai(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    require_role(state, req, next, ROLE_PEGAWAI).await
}

/// POST /api/signup - Register a pegawai-role account
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<serde_json::Value>> {
    if req.nama.is_empty() || req.username.is_empty() || req.password.is_empty() {
        return Err(Error::BadRequest(
            "nama, username and password are required".to_string(),
        ));
    }

    let exists: Option<(String,)> = sqlx::query_as("SELECT username FROM user WHERE username = ?")
        .bind(&req.username)
        .fetch_optional(state.pool())
        .await?;

    if exists.is_some() {
        return Err(Error::Conflict("username already exists".to_string()));
    }

    let hashed = hash_password(&req.password)?;

    let (id_user,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO user (nama, username, password, role)
        VALUES (?, ?, ?, ?)
        RETURNING id_user
        "#,
    )
    .bind(&req.nama)
    .bind(&req.username)
    .bind(&hashed)
    .bind(ROLE_PEGAWAI)
    .fetch_one(state.pool())
    .await?;

    Ok(Json(json!({
        "message": "User created",
        "user": UserPublic {
            id_user,
            nama: req.nama,
            username: req.username,
            role: ROLE_PEGAWAI.to_string(),
        },
    })))
}

/// POST /api/login - Verify credentials, hand out a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let row: Option<(i64, String, String, String, String)> = sqlx::query_as(
        "SELECT id_user, nama, username, password, role FROM user WHERE username = ?",
    )
    .bind(&req.username)
    .fetch_optional(state.pool())
    .await?;

    let (id_user, nama, username, password_hash, role) =
        row.ok_or_else(|| Error::Unauthorized("user not found".to_string()))?;

    if !verify_password(&req.password, &password_hash)? {
        return Err(Error::Unauthorized("wrong password".to_string()));
    }

    let claims = Claims::new(id_user, username.clone(), role.clone());
    let token = state.auth().sign(&claims)?;

    Ok(Json(LoginResponse {
        message: "Login success".to_string(),
        token,
        user: UserPublic {
            id_user,
            nama,
            username,
            role,
        },
    }))
}
