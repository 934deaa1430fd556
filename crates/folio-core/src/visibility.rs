//! Post visibility rules.
//!
//! A [`Viewer`] is resolved into a [`VisibilityRule`], which storage adapters
//! translate into a query predicate. The same rule is also evaluable in
//! memory through [`VisibilityRule::admits`], so every adapter shares one
//! definition of "who sees what".

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Post;

/// The party looking at posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    /// Authenticated, non-staff user.
    Member(Uuid),
    /// Staff user with unrestricted visibility.
    Staff(Uuid),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Member(id) | Viewer::Staff(id) => Some(*id),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Viewer::Staff(_))
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Viewer::Anonymous)
    }

    /// Visibility rule that applies to this viewer.
    pub fn rule(&self) -> VisibilityRule {
        match self {
            Viewer::Anonymous => VisibilityRule::Public,
            Viewer::Staff(_) => VisibilityRule::Everything,
            Viewer::Member(id) => VisibilityRule::PublicOrAuthoredBy(*id),
        }
    }
}

/// Filter predicate over the post collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityRule {
    /// Published with `published_at <= now`.
    Public,
    /// Public, or written by the given user.
    PublicOrAuthoredBy(Uuid),
    /// No filtering.
    Everything,
}

impl VisibilityRule {
    /// Evaluate the rule against a single post at `now`.
    pub fn admits(&self, post: &Post, now: DateTime<Utc>) -> bool {
        match self {
            VisibilityRule::Public => post.is_public_at(now),
            VisibilityRule::PublicOrAuthoredBy(id) => {
                post.is_public_at(now) || post.author_id == *id
            }
            VisibilityRule::Everything => true,
        }
    }
}

/// Which slice of the post collection a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Public posts only, whoever asks. Feeds, sitemaps, listings and
    /// search use this scope.
    Published,
    /// Posts the viewer may see.
    VisibleTo(Viewer),
}

impl PostScope {
    pub fn rule(&self) -> VisibilityRule {
        match self {
            PostScope::Published => VisibilityRule::Public,
            PostScope::VisibleTo(viewer) => viewer.rule(),
        }
    }

    /// Keep the posts this scope admits at `now`, in their original order.
    pub fn filter<'a, I>(self, posts: I, now: DateTime<Utc>) -> impl Iterator<Item = &'a Post>
    where
        I: IntoIterator<Item = &'a Post>,
    {
        let rule = self.rule();
        posts.into_iter().filter(move |post| rule.admits(post, now))
    }
}
