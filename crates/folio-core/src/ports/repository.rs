use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, Post, Profile, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};
use crate::visibility::PostScope;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Narrowing applied on top of a [`PostScope`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive substring match on title or content.
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    /// Build a search filter; blank queries are dropped.
    pub fn search(query: Option<&str>) -> Self {
        Self {
            search: query
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            ..Self::default()
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// In-memory evaluation, mirroring the SQL predicate.
    pub fn matches(&self, post: &Post) -> bool {
        if self.category_id.is_some_and(|id| id != post.category_id) {
            return false;
        }
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        match &self.search {
            Some(q) => {
                let q = q.to_lowercase();
                post.title.to_lowercase().contains(&q) || post.content.to_lowercase().contains(&q)
            }
            None => true,
        }
    }
}

/// Post repository. Every read is scoped by a [`PostScope`].
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of posts in `scope`, newest publication first.
    async fn list(
        &self,
        scope: PostScope,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Every post in `scope`, newest publication first.
    async fn all(&self, scope: PostScope) -> Result<Vec<Post>, RepoError>;

    /// Look up a post by slug; `None` when absent or outside `scope`.
    async fn find_by_slug(&self, scope: PostScope, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Whether any post, in any state, already uses `slug`.
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    /// Whether a published post other than `exclude` has `title`,
    /// compared case-insensitively.
    async fn published_title_exists(
        &self,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// All categories ordered by name.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;

    /// Categories among `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, newest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}

/// Profile repository.
#[async_trait]
pub trait ProfileRepository: BaseRepository<Profile, Uuid> {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError>;

    /// Return the user's profile, creating an empty one if absent.
    async fn get_or_create(&self, user_id: Uuid) -> Result<Profile, RepoError> {
        if let Some(profile) = self.find_by_user(user_id).await? {
            return Ok(profile);
        }
        self.save(Profile::empty(user_id)).await
    }
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}
