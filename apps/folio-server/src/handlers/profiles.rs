//! Profile handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use folio_core::PostScope;
use folio_core::domain::Profile;
use folio_core::pagination::{DEFAULT_PER_PAGE, PageRequest};
use folio_core::ports::PostFilter;
use folio_shared::dto::{ListQuery, ProfileRequest, UserProfileResponse};

use super::forms;
use super::present::{Lookup, profile_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/users/{username}?page=
pub async fn show(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user named `{username}`")))?;

    let profile = state
        .profiles
        .find_by_user(user.id)
        .await?
        .unwrap_or_else(|| Profile::empty(user.id));

    let page = state
        .posts
        .list(
            PostScope::Published,
            &PostFilter::default().by_author(user.id),
            PageRequest::parse(query.page.as_deref(), DEFAULT_PER_PAGE),
        )
        .await?;

    let lookup = Lookup::for_posts(&state, &page.items).await?;
    Ok(HttpResponse::Ok().json(UserProfileResponse {
        profile: profile_response(&user.username, profile),
        posts: lookup.post_page(page),
    }))
}

/// PUT /api/profile
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    forms::profile(&req)?;

    let mut profile = state.profiles.get_or_create(identity.user_id).await?;
    if let Some(bio) = req.bio {
        profile.bio = bio;
    }
    if let Some(avatar) = req.avatar {
        profile.avatar = Some(avatar.trim().to_string()).filter(|a| !a.is_empty());
    }
    if let Some(location) = req.location {
        profile.location = location.trim().to_string();
    }
    profile.updated_at = Utc::now();

    let profile = state.profiles.save(profile).await?;
    tracing::info!(user_id = %identity.user_id, "Profile updated");

    Ok(HttpResponse::Ok().json(profile_response(&identity.username, profile)))
}
