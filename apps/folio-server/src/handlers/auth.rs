//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use folio_core::domain::{Profile, User};
use folio_core::ports::{PasswordService, TokenService};
use folio_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest};

use super::forms;
use super::present::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn auth_response(token_service: &dyn TokenService, user: &User) -> AppResult<AuthResponse> {
    let token = token_service.generate_token(user.id, &user.username, user.roles())?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds().max(0) as u64,
        user: user_response(user),
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = forms::registration(body.into_inner())?;

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::field(
            "username",
            "A user with that username already exists.",
        ));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::field("email", "That email is already in use."));
    }

    let password_hash = password_service.hash(&req.password)?;

    let user = state
        .users
        .save(User::new(req.username, req.email, password_hash))
        .await?;
    state.profiles.save(Profile::empty(user.id)).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(auth_response(token_service.get_ref().as_ref(), &user)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let login = req.login.trim();

    // Usernames may contain `@`, so an exact username match wins over email.
    let user = match state.users.find_by_username(login).await? {
        Some(user) => Some(user),
        None if login.contains('@') => state.users.find_by_email(login).await?,
        None => None,
    }
    .ok_or(AppError::Unauthorized)?;

    if !password_service.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Rejected login");
        return Err(AppError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(auth_response(token_service.get_ref().as_ref(), &user)?))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}
