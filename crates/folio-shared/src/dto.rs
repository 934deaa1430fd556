//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---- Auth ----

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Request to login with a username or an email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub login: String,
    pub password: String,
}

/// Response containing a user's account information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

// ---- Listings ----

/// `?q=&page=` query string. `page` stays raw so malformed values can fall
/// back to the first page instead of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub page: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub num_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

// ---- Posts ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    /// `draft` (default) or `published`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub status: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Option<AuthorSummary>,
    pub category: Option<CategorySummary>,
}

/// A single post with its comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    /// True when the post is not yet live for the public.
    pub is_preview: bool,
}

// ---- Comments ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
    /// Honeypot; must be left empty.
    #[serde(default)]
    pub website: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: Option<AuthorSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ---- Categories ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDetailResponse {
    pub category: CategoryResponse,
    pub posts: PageResponse<PostResponse>,
}

// ---- Profiles ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub location: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub profile: ProfileResponse,
    pub posts: PageResponse<PostResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_accepts_username_or_email_key() {
        let by_name: LoginRequest =
            serde_json::from_str(r#"{"username":"ada","password":"pw"}"#).unwrap();
        let by_email: LoginRequest =
            serde_json::from_str(r#"{"email":"ada@example.com","password":"pw"}"#).unwrap();

        assert_eq!(by_name.login, "ada");
        assert_eq!(by_email.login, "ada@example.com");
    }

    #[test]
    fn comment_honeypot_defaults_to_empty() {
        let req: CommentRequest = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert!(req.website.is_empty());
    }
}
