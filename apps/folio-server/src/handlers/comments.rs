//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use folio_core::domain::Comment;
use folio_shared::dto::CommentRequest;

use super::forms;
use super::posts::visible_post;
use super::present::Lookup;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/posts/{slug}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post = visible_post(&state, identity.viewer(), &path).await?;
    let content = forms::comment(body.into_inner())?;

    let comment = state
        .comments
        .save(Comment::new(post.id, identity.user_id, content))
        .await?;
    tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment published");

    let lookup = Lookup::load(&state, [comment.author_id], std::iter::empty()).await?;
    Ok(HttpResponse::Created().json(lookup.comment(comment)))
}

/// DELETE /api/comments/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let not_found = || AppError::NotFound(format!("No comment found with id `{id}`"));

    let comment = state.comments.find_by_id(id).await?.ok_or_else(not_found)?;
    let post = state
        .posts
        .find_by_id(comment.post_id)
        .await?
        .ok_or_else(not_found)?;

    if !comment.deletable_by(&post, &identity.viewer()) {
        return Err(AppError::Forbidden(
            "You don't have permission to delete this comment.".to_string(),
        ));
    }

    state.comments.delete(comment.id).await?;
    tracing::info!(comment_id = %comment.id, "Comment deleted");
    Ok(HttpResponse::NoContent().finish())
}
