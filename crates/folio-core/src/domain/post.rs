use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a post title.
pub const TITLE_MAX_LEN: usize = 150;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status `{other}`")),
        }
    }
}

/// Post entity - a blog article owned by its author.
///
/// `slug` is `None` until the pre-save hook in [`crate::publishing`] assigns
/// it; after that it never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new, unsaved draft.
    pub fn new(author_id: Uuid, category_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id,
            title,
            slug: None,
            content,
            featured_image: None,
            status: PostStatus::Draft,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the post is live for the public at `now`.
    pub fn is_public_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published
            && self.published_at.is_some_and(|published| published <= now)
    }

    pub fn is_public(&self) -> bool {
        self.is_public_at(Utc::now())
    }

    /// Slug as a string slice; empty when not yet assigned.
    pub fn slug_str(&self) -> &str {
        self.slug.as_deref().unwrap_or_default()
    }

    /// Listing order: newest publication first, unpublished posts last,
    /// ties broken by newest creation.
    pub fn listing_cmp(&self, other: &Post) -> Ordering {
        let by_publication = match (self.published_at, other.published_at) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_publication.then_with(|| other.created_at.cmp(&self.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn post() -> Post {
        Post::new(Uuid::new_v4(), Uuid::new_v4(), "Live".into(), "Body".into())
    }

    #[test]
    fn draft_is_never_public() {
        let mut p = post();
        p.published_at = Some(Utc::now() - TimeDelta::days(1));
        assert!(!p.is_public());
    }

    #[test]
    fn scheduled_post_is_not_public_until_due() {
        let now = Utc::now();
        let mut p = post().with_status(PostStatus::Published);
        p.published_at = Some(now + TimeDelta::hours(1));

        assert!(!p.is_public_at(now));
        assert!(p.is_public_at(now + TimeDelta::hours(2)));
    }

    #[test]
    fn published_without_timestamp_is_not_public() {
        let p = post().with_status(PostStatus::Published);
        assert!(!p.is_public());
    }

    #[test]
    fn listing_puts_unpublished_posts_last() {
        let now = Utc::now();
        let mut old = post();
        old.published_at = Some(now - TimeDelta::days(2));
        let mut new = post();
        new.published_at = Some(now - TimeDelta::days(1));
        let draft = post();

        let mut posts = vec![draft.clone(), old.clone(), new.clone()];
        posts.sort_by(Post::listing_cmp);

        let ids: Vec<_> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![new.id, old.id, draft.id]);
    }

    #[test]
    fn status_parses_from_wire_value() {
        assert_eq!("published".parse::<PostStatus>(), Ok(PostStatus::Published));
        assert!("archived".parse::<PostStatus>().is_err());
    }
}
