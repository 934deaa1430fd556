//! Pre-save hook for posts: slug assignment and publish timestamping.
//!
//! Callers run [`prepare_for_save`] explicitly before handing a post to a
//! repository. Slugs are assigned once and never recomputed; `published_at`
//! is stamped on the first transition into [`PostStatus::Published`] and
//! never moved afterwards.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{Post, PostStatus};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;

/// Upper bound of the base slug, leaving room for a `-N` suffix.
pub const SLUG_BASE_MAX_LEN: usize = 160;

/// Length limit of the stored slug column.
pub const SLUG_MAX_LEN: usize = 170;

/// Lowercase and hyphenate `title`, truncated to [`SLUG_BASE_MAX_LEN`].
///
/// Never fails; titles with no representable characters give an empty base.
pub fn base_slug(title: &str) -> String {
    let mut slug = slug::slugify(title);
    // slugify only emits ASCII, so byte truncation is a char boundary.
    slug.truncate(SLUG_BASE_MAX_LEN);
    slug
}

/// Find the first slug for `title` that `is_taken` reports as free.
///
/// Candidates are the base slug, then `base-2`, `base-3`, … The predicate
/// must check the whole post collection, drafts included.
pub async fn unique_slug<F, Fut, E>(title: &str, mut is_taken: F) -> Result<String, E>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let base = base_slug(title);
    if !is_taken(&base).await? {
        return Ok(base);
    }

    let mut suffix: u64 = 2;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !is_taken(&candidate).await? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

/// Stamp `published_at` on the first transition into published state.
///
/// Returns `true` when the timestamp was set by this call.
pub fn stamp_publication(post: &mut Post, now: DateTime<Utc>) -> bool {
    if post.status == PostStatus::Published && post.published_at.is_none() {
        post.published_at = Some(now);
        return true;
    }
    false
}

/// Run the pre-save hook on `post`.
///
/// Assigns a unique slug when the post has none yet, then stamps the
/// publication time. `slug_taken` reports whether a candidate slug is already
/// in use by any post.
pub async fn prepare_for_save<F, Fut, E>(
    post: &mut Post,
    now: DateTime<Utc>,
    slug_taken: F,
) -> Result<(), E>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    if post.slug.is_none() {
        let slug = unique_slug(&post.title, slug_taken).await?;
        post.slug = Some(slug);
    }

    stamp_publication(post, now);
    post.updated_at = now;
    Ok(())
}

/// Reject a published post whose title collides, case-insensitively, with
/// another published post.
///
/// Drafts are never checked. The storage layer enforces the same rule with a
/// partial unique index; this check turns the common case into a field error
/// before the write is attempted.
pub async fn ensure_unique_published_title(
    posts: &dyn PostRepository,
    post: &Post,
) -> Result<(), DomainError> {
    if post.status != PostStatus::Published {
        return Ok(());
    }

    let taken = posts
        .published_title_exists(&post.title, Some(post.id))
        .await
        .map_err(|e: RepoError| DomainError::Internal(e.to_string()))?;

    if taken {
        return Err(DomainError::Duplicate {
            field: "title",
            message: "A published post with this title already exists.".to_string(),
        });
    }
    Ok(())
}
