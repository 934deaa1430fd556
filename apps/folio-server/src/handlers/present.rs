//! Domain to response conversions.

use std::collections::HashMap;

use uuid::Uuid;

use folio_core::domain::{Category, Comment, Post, Profile, User};
use folio_core::pagination::Page;
use folio_shared::dto::{
    AuthorSummary, CategoryResponse, CategorySummary, CommentResponse, PageResponse,
    PostResponse, ProfileResponse, UserResponse,
};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Authors and categories referenced by a batch of posts or comments.
#[derive(Default)]
pub struct Lookup {
    authors: HashMap<Uuid, AuthorSummary>,
    categories: HashMap<Uuid, CategorySummary>,
}

impl Lookup {
    /// Load the users in `user_ids` and the categories in `category_ids`.
    pub async fn load(
        state: &AppState,
        user_ids: impl IntoIterator<Item = Uuid>,
        category_ids: impl IntoIterator<Item = Uuid>,
    ) -> AppResult<Self> {
        let authors = state
            .users
            .find_by_ids(&distinct(user_ids))
            .await?
            .into_iter()
            .map(|u| (u.id, author_summary(&u)))
            .collect();

        let categories = state
            .categories
            .find_by_ids(&distinct(category_ids))
            .await?
            .into_iter()
            .map(|c| {
                (
                    c.id,
                    CategorySummary {
                        id: c.id,
                        name: c.name,
                        slug: c.slug,
                    },
                )
            })
            .collect();

        Ok(Self {
            authors,
            categories,
        })
    }

    pub async fn for_posts(state: &AppState, posts: &[Post]) -> AppResult<Self> {
        Self::load(
            state,
            posts.iter().map(|p| p.author_id),
            posts.iter().map(|p| p.category_id),
        )
        .await
    }

    pub fn post(&self, post: Post) -> PostResponse {
        PostResponse {
            author: self.authors.get(&post.author_id).cloned(),
            category: self.categories.get(&post.category_id).cloned(),
            id: post.id,
            slug: post.slug.unwrap_or_default(),
            title: post.title,
            content: post.content,
            featured_image: post.featured_image,
            status: post.status.to_string(),
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    pub fn comment(&self, comment: Comment) -> CommentResponse {
        CommentResponse {
            author: self.authors.get(&comment.author_id).cloned(),
            id: comment.id,
            post_id: comment.post_id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }

    pub fn post_page(&self, page: Page<Post>) -> PageResponse<PostResponse> {
        page_response(page.map(|p| self.post(p)))
    }
}

fn distinct(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

pub fn page_response<T>(page: Page<T>) -> PageResponse<T> {
    PageResponse {
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        page: page.number,
        num_pages: page.num_pages,
        total: page.total,
        items: page.items,
    }
}

pub fn author_summary(user: &User) -> AuthorSummary {
    AuthorSummary {
        id: user.id,
        username: user.username.clone(),
    }
}

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_staff: user.is_staff,
        created_at: user.created_at,
    }
}

pub fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        slug: category.slug,
        description: category.description,
    }
}

pub fn profile_response(username: &str, profile: Profile) -> ProfileResponse {
    ProfileResponse {
        username: username.to_string(),
        bio: profile.bio,
        avatar: profile.avatar,
        location: profile.location,
        updated_at: profile.updated_at,
    }
}
