//! Post handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use folio_core::domain::Post;
use folio_core::pagination::{DEFAULT_PER_PAGE, PageRequest};
use folio_core::ports::PostFilter;
use folio_core::{PostScope, Viewer, publishing};
use folio_shared::dto::{ListQuery, PostDetailResponse, PostRequest};

use super::forms::{self, PostInput};
use super::present::Lookup;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_not_found(slug: &str) -> AppError {
    AppError::NotFound(format!("No post found with slug `{slug}`"))
}

/// Resolve a post the viewer may see; invisible posts are not found.
pub(crate) async fn visible_post(state: &AppState, viewer: Viewer, slug: &str) -> AppResult<Post> {
    state
        .posts
        .find_by_slug(PostScope::VisibleTo(viewer), slug)
        .await?
        .ok_or_else(|| post_not_found(slug))
}

/// Resolve a post the viewer authored; anything else is not found.
async fn authored_post(state: &AppState, identity: &Identity, slug: &str) -> AppResult<Post> {
    let post = visible_post(state, identity.viewer(), slug).await?;
    if post.author_id != identity.user_id {
        return Err(post_not_found(slug));
    }
    Ok(post)
}

async fn ensure_category(state: &AppState, input: &PostInput) -> AppResult<()> {
    if state.categories.find_by_id(input.category_id).await?.is_none() {
        return Err(AppError::field(
            "category",
            "Select a valid choice. That choice is not one of the available choices.",
        ));
    }
    Ok(())
}

/// Run the pre-save hook and persist.
async fn persist(state: &AppState, mut post: Post) -> AppResult<Post> {
    publishing::ensure_unique_published_title(state.posts.as_ref(), &post).await?;

    let posts = state.posts.clone();
    publishing::prepare_for_save(&mut post, Utc::now(), |candidate| {
        let posts = posts.clone();
        let candidate = candidate.to_string();
        async move { posts.slug_exists(&candidate).await }
    })
    .await?;

    Ok(state.posts.save(post).await?)
}

/// GET /api/posts?q=&page=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let filter = PostFilter::search(query.q.as_deref());
    let page = state
        .posts
        .list(
            PostScope::Published,
            &filter,
            PageRequest::parse(query.page.as_deref(), DEFAULT_PER_PAGE),
        )
        .await?;

    let lookup = Lookup::for_posts(&state, &page.items).await?;
    Ok(HttpResponse::Ok().json(lookup.post_page(page)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let input = forms::post(body.into_inner())?;
    ensure_category(&state, &input).await?;

    let mut post = Post::new(identity.user_id, input.category_id, input.title, input.content)
        .with_status(input.status);
    post.featured_image = input.featured_image;

    let post = persist(&state, post).await?;
    tracing::info!(
        post_id = %post.id,
        slug = %post.slug_str(),
        status = %post.status,
        "Post created"
    );

    let lookup = Lookup::for_posts(&state, std::slice::from_ref(&post)).await?;
    Ok(HttpResponse::Created().json(lookup.post(post)))
}

/// GET /api/posts/{slug}
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let post = visible_post(&state, identity.viewer(), &slug).await?;
    let comments = state.comments.list_for_post(post.id).await?;

    let lookup = Lookup::load(
        &state,
        std::iter::once(post.author_id).chain(comments.iter().map(|c| c.author_id)),
        [post.category_id],
    )
    .await?;

    let is_preview = !post.is_public();
    Ok(HttpResponse::Ok().json(PostDetailResponse {
        comments: comments.into_iter().map(|c| lookup.comment(c)).collect(),
        post: lookup.post(post),
        is_preview,
    }))
}

/// PUT /api/posts/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = authored_post(&state, &identity, &path).await?;
    let input = forms::post(body.into_inner())?;
    ensure_category(&state, &input).await?;

    post.title = input.title;
    post.content = input.content;
    post.category_id = input.category_id;
    post.status = input.status;
    post.featured_image = input.featured_image;

    let post = persist(&state, post).await?;
    tracing::info!(post_id = %post.id, status = %post.status, "Post updated");

    let lookup = Lookup::for_posts(&state, std::slice::from_ref(&post)).await?;
    Ok(HttpResponse::Ok().json(lookup.post(post)))
}

/// DELETE /api/posts/{slug}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = authored_post(&state, &identity, &path).await?;
    state.posts.delete(post.id).await?;

    tracing::info!(post_id = %post.id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/me/posts?page=
pub async fn mine(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let filter = PostFilter::search(query.q.as_deref()).by_author(identity.user_id);
    let page = state
        .posts
        .list(
            PostScope::VisibleTo(identity.viewer()),
            &filter,
            PageRequest::parse(query.page.as_deref(), DEFAULT_PER_PAGE),
        )
        .await?;

    let lookup = Lookup::for_posts(&state, &page.items).await?;
    Ok(HttpResponse::Ok().json(lookup.post_page(page)))
}
