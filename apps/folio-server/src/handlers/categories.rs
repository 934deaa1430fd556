//! Category handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use folio_core::PostScope;
use folio_core::domain::Category;
use folio_core::pagination::{DEFAULT_PER_PAGE, PageRequest};
use folio_core::ports::PostFilter;
use folio_shared::dto::{CategoryDetailResponse, CategoryRequest, ListQuery};

use super::forms;
use super::present::{Lookup, category_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn find(state: &AppState, slug: &str) -> AppResult<Category> {
    state
        .categories
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No category found with slug `{slug}`")))
}

/// GET /api/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.categories.list_all().await?;
    Ok(HttpResponse::Ok().json(
        categories
            .into_iter()
            .map(category_response)
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/categories
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let input = forms::category(body.into_inner())?;

    let category = state
        .categories
        .save(Category::new(input.name, input.slug, input.description))
        .await?;
    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");

    Ok(HttpResponse::Created().json(category_response(category)))
}

/// GET /api/categories/{slug}?q=&page=
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let category = find(&state, &path).await?;

    let filter = PostFilter::search(query.q.as_deref()).in_category(category.id);
    let page = state
        .posts
        .list(
            PostScope::Published,
            &filter,
            PageRequest::parse(query.page.as_deref(), DEFAULT_PER_PAGE),
        )
        .await?;

    let lookup = Lookup::for_posts(&state, &page.items).await?;
    Ok(HttpResponse::Ok().json(CategoryDetailResponse {
        category: category_response(category),
        posts: lookup.post_page(page),
    }))
}

/// PUT /api/categories/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let mut category = find(&state, &path).await?;
    let input = forms::category(body.into_inner())?;

    let derived = Category::new(input.name, input.slug, input.description);
    category.name = derived.name;
    category.slug = derived.slug;
    category.description = derived.description;
    category.updated_at = Utc::now();

    let category = state.categories.save(category).await?;
    Ok(HttpResponse::Ok().json(category_response(category)))
}

/// DELETE /api/categories/{slug}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    identity.require_staff()?;
    let category = find(&state, &path).await?;

    state.categories.delete(category.id).await?;
    tracing::info!(category_id = %category.id, "Category deleted");
    Ok(HttpResponse::NoContent().finish())
}
