//! Feeds, sitemap and robots.txt.

use actix_web::{HttpResponse, http::header::ContentType, web};

use folio_core::PostScope;
use folio_core::pagination::PageRequest;
use folio_core::ports::PostFilter;

use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::syndication::{self, FEED_ITEMS};

fn xml(content_type: &'static str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("Content-Type", content_type))
        .body(body)
}

async fn latest(state: &AppState) -> AppResult<Vec<folio_core::domain::Post>> {
    let page = state
        .posts
        .list(
            PostScope::Published,
            &PostFilter::default(),
            PageRequest::new(1, FEED_ITEMS),
        )
        .await?;
    Ok(page.items)
}

/// GET /feed/
pub async fn rss(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = latest(&state).await?;
    Ok(xml(
        "application/rss+xml; charset=utf-8",
        syndication::rss(&state.site, &posts),
    ))
}

/// GET /feed/atom/
pub async fn atom(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = latest(&state).await?;
    Ok(xml(
        "application/atom+xml; charset=utf-8",
        syndication::atom(&state.site, &posts),
    ))
}

/// GET /sitemap.xml
pub async fn sitemap(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.all(PostScope::Published).await?;
    let categories = state.categories.list_all().await?;
    Ok(xml(
        "application/xml; charset=utf-8",
        syndication::sitemap(&state.site, &posts, &categories),
    ))
}

/// GET /robots.txt
pub async fn robots(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(syndication::robots(&state.site))
}
