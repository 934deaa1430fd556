//! In-memory storage - used when no database is configured, and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Category, Comment, Post, PostStatus, Profile, User};
use folio_core::error::RepoError;
use folio_core::pagination::{Page, PageRequest};
use folio_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostFilter, PostRepository,
    ProfileRepository, UserRepository,
};
use folio_core::PostScope;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    categories: HashMap<Uuid, Category>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn check_user(&self, user: &User) -> Result<(), RepoError> {
        let others = self.users.values().filter(|u| u.id != user.id);
        for other in others {
            if other.username == user.username {
                return Err(RepoError::constraint("username", "That username is already taken."));
            }
            if other.email == user.email {
                return Err(RepoError::constraint("email", "That email is already in use."));
            }
        }
        Ok(())
    }

    fn check_category(&self, category: &Category) -> Result<(), RepoError> {
        let others = self.categories.values().filter(|c| c.id != category.id);
        for other in others {
            if other.name == category.name {
                return Err(RepoError::constraint(
                    "name",
                    "A category with this name already exists.",
                ));
            }
            if other.slug == category.slug {
                return Err(RepoError::constraint(
                    "slug",
                    "A category with this slug already exists.",
                ));
            }
        }
        Ok(())
    }

    fn check_post(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id)
            || !self.categories.contains_key(&post.category_id)
        {
            return Err(RepoError::constraint(
                "__all__",
                "A referenced record does not exist.",
            ));
        }

        let title = post.title.to_lowercase();
        let others = self.posts.values().filter(|p| p.id != post.id);
        for other in others {
            if post.slug.is_some() && other.slug == post.slug {
                return Err(RepoError::constraint(
                    "slug",
                    "A post with this slug already exists.",
                ));
            }
            if post.status == PostStatus::Published
                && other.status == PostStatus::Published
                && other.title.to_lowercase() == title
            {
                return Err(RepoError::constraint(
                    "title",
                    "A published post with this title already exists.",
                ));
            }
        }
        Ok(())
    }

    fn check_comment(&self, comment: &Comment) -> Result<(), RepoError> {
        if !self.posts.contains_key(&comment.post_id)
            || !self.users.contains_key(&comment.author_id)
        {
            return Err(RepoError::constraint(
                "__all__",
                "A referenced record does not exist.",
            ));
        }
        Ok(())
    }

    fn check_profile(&self, profile: &Profile) -> Result<(), RepoError> {
        if !self.users.contains_key(&profile.user_id) {
            return Err(RepoError::constraint(
                "__all__",
                "A referenced record does not exist.",
            ));
        }
        if self
            .profiles
            .values()
            .any(|p| p.id != profile.id && p.user_id == profile.user_id)
        {
            return Err(RepoError::constraint("user", "This user already has a profile."));
        }
        Ok(())
    }

    fn remove_post(&mut self, id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        self.comments.retain(|_, c| c.post_id != id);
        Some(post)
    }

    fn remove_user(&mut self, id: Uuid) -> Option<User> {
        let user = self.users.remove(&id)?;
        let authored: Vec<Uuid> = self
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            self.remove_post(post_id);
        }
        self.comments.retain(|_, c| c.author_id != id);
        self.profiles.retain(|_, p| p.user_id != id);
        Some(user)
    }

    fn scoped_posts(&self, scope: PostScope, filter: &PostFilter) -> Vec<Post> {
        let mut posts: Vec<Post> = scope
            .filter(self.posts.values(), Utc::now())
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        posts.sort_by(Post::listing_cmp);
        posts
    }
}

/// Every repository over one set of tables guarded by an async `RwLock`.
///
/// Enforces the same uniqueness, reference and cascade rules as the
/// PostgreSQL schema. Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_user(&user)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_user(id).map(drop).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Profile, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn save(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_profile(&profile)?;
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.profiles.remove(&id).map(drop).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_category(&category)?;
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        if tables.posts.values().any(|p| p.category_id == id) {
            return Err(RepoError::Protected(
                "category is referenced by existing posts".to_string(),
            ));
        }
        tables.categories.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.categories.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_post(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).map(drop).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list(
        &self,
        scope: PostScope,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let posts = self.tables.read().await.scoped_posts(scope, filter);
        let total = posts.len() as u64;
        let window = page.resolve(total);

        let items = posts
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect();

        Ok(window.into_page(items, total))
    }

    async fn all(&self, scope: PostScope) -> Result<Vec<Post>, RepoError> {
        Ok(self
            .tables
            .read()
            .await
            .scoped_posts(scope, &PostFilter::default()))
    }

    async fn find_by_slug(&self, scope: PostScope, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(scope
            .filter(tables.posts.values(), Utc::now())
            .find(|p| p.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .any(|p| p.slug.as_deref() == Some(slug)))
    }

    async fn published_title_exists(
        &self,
        title: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, RepoError> {
        let title = title.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.posts.values().any(|p| {
            Some(p.id) != exclude
                && p.status == PostStatus::Published
                && p.title.to_lowercase() == title
        }))
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_comment(&comment)?;
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.remove(&id).map(drop).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }
}
