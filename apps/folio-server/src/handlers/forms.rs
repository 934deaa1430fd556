//! Request validation producing field-level errors.

use uuid::Uuid;

use folio_core::domain::{
    CATEGORY_NAME_MAX_LEN, CATEGORY_SLUG_MAX_LEN, LOCATION_MAX_LEN, PostStatus, TITLE_MAX_LEN,
};
use folio_shared::FieldErrors;
use folio_shared::dto::{
    CategoryRequest, CommentRequest, PostRequest, ProfileRequest, RegisterUserRequest,
};

use crate::middleware::error::{AppError, AppResult, NON_FIELD_ERRORS};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const IMAGE_REF_MAX_LEN: usize = 255;

/// Accumulates errors across fields.
#[derive(Default)]
pub struct Errors(FieldErrors);

impl Errors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record `message` against `field` when `value` is blank or too long.
    fn text(&mut self, field: &str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.add(field, "This field is required.");
        } else if value.chars().count() > max_len {
            self.add(
                field,
                format!("Ensure this value has at most {max_len} characters."),
            );
        }
    }

    fn optional(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if value.is_some_and(|v| v.chars().count() > max_len) {
            self.add(
                field,
                format!("Ensure this value has at most {max_len} characters."),
            );
        }
    }

    pub fn finish(self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

/// Registration fields after validation.
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub fn registration(req: RegisterUserRequest) -> AppResult<Registration> {
    let mut errors = Errors::default();

    let username = req.username.trim().to_string();
    errors.text("username", &username, USERNAME_MAX_LEN);
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, \
             and @/./+/-/_ characters.",
        );
    }

    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        errors.add("email", "Email is required.");
    } else if !is_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }

    if req.password1 != req.password2 {
        errors.add("password2", "The two password fields didn't match.");
    } else if req.password1.chars().count() < PASSWORD_MIN_LEN {
        errors.add(
            "password2",
            format!(
                "This password is too short. \
                 It must contain at least {PASSWORD_MIN_LEN} characters."
            ),
        );
    }

    errors.finish()?;
    Ok(Registration {
        username,
        email,
        password: req.password1,
    })
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Post fields after validation.
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub category_id: Uuid,
    pub status: PostStatus,
    pub featured_image: Option<String>,
}

pub fn post(req: PostRequest) -> AppResult<PostInput> {
    let mut errors = Errors::default();

    let title = req.title.trim().to_string();
    errors.text("title", &title, TITLE_MAX_LEN);
    if req.content.trim().is_empty() {
        errors.add("content", "This field is required.");
    }

    let status = match req.status.as_deref().map(str::trim) {
        None | Some("") => PostStatus::Draft,
        Some(raw) => raw.parse::<PostStatus>().unwrap_or_else(|_| {
            errors.add(
                "status",
                format!("Select a valid choice. {raw} is not one of the available choices."),
            );
            PostStatus::Draft
        }),
    };

    let featured_image = req
        .featured_image
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    errors.optional("featured_image", featured_image.as_deref(), IMAGE_REF_MAX_LEN);

    errors.finish()?;
    Ok(PostInput {
        title,
        content: req.content,
        category_id: req.category_id,
        status,
        featured_image,
    })
}

pub fn comment(req: CommentRequest) -> AppResult<String> {
    let mut errors = Errors::default();
    if !req.website.is_empty() {
        errors.add(NON_FIELD_ERRORS, "Spam detected.");
    }
    if req.content.trim().is_empty() {
        errors.add("content", "This field is required.");
    }
    errors.finish()?;
    Ok(req.content)
}

/// Category fields after validation; an empty slug is derived from the name.
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: String,
}

pub fn category(req: CategoryRequest) -> AppResult<CategoryInput> {
    let mut errors = Errors::default();

    let name = req.name.trim().to_string();
    errors.text("name", &name, CATEGORY_NAME_MAX_LEN);

    let slug = req.slug.unwrap_or_default().trim().to_string();
    errors.optional("slug", Some(&slug), CATEGORY_SLUG_MAX_LEN);
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.add(
            "slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        );
    }

    errors.finish()?;
    Ok(CategoryInput {
        name,
        slug,
        description: req.description.unwrap_or_default(),
    })
}

pub fn profile(req: &ProfileRequest) -> AppResult<()> {
    let mut errors = Errors::default();
    errors.optional("location", req.location.as_deref(), LOCATION_MAX_LEN);
    errors.optional("avatar", req.avatar.as_deref(), IMAGE_REF_MAX_LEN);
    errors.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, p1: &str, p2: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.into(),
            email: email.into(),
            password1: p1.into(),
            password2: p2.into(),
        }
    }

    fn field_errors(result: AppResult<impl Sized>) -> FieldErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("expected validation failure"),
        }
    }

    #[test]
    fn registration_normalises_email() {
        let reg = registration(register(
            "ada",
            " Ada@Example.COM ",
            "correct-horse",
            "correct-horse",
        ))
        .unwrap();
        assert_eq!(reg.email, "ada@example.com");
    }

    #[test]
    fn registration_rejects_mismatched_and_short_passwords() {
        let errors = field_errors(registration(register("ada", "a@b.co", "one-password", "two")));
        assert!(errors["password2"][0].contains("didn't match"));

        let errors = field_errors(registration(register("ada", "a@b.co", "short", "short")));
        assert!(errors["password2"][0].contains("too short"));
    }

    #[test]
    fn registration_rejects_bad_username_and_email() {
        let req = register("no spaces", "nope", "long-enough", "long-enough");
        let errors = field_errors(registration(req));
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("email"));
    }

    #[test]
    fn post_status_defaults_to_draft_and_rejects_unknown_values() {
        let req = PostRequest {
            title: "Hello".into(),
            content: "Body".into(),
            category_id: Uuid::new_v4(),
            status: None,
            featured_image: Some("  ".into()),
        };
        let input = post(req.clone()).unwrap();
        assert_eq!(input.status, PostStatus::Draft);
        assert_eq!(input.featured_image, None);

        let errors = field_errors(post(PostRequest {
            status: Some("archived".into()),
            ..req
        }));
        assert!(errors.contains_key("status"));
    }

    #[test]
    fn long_titles_are_rejected() {
        let errors = field_errors(post(PostRequest {
            title: "x".repeat(TITLE_MAX_LEN + 1),
            content: "Body".into(),
            category_id: Uuid::new_v4(),
            status: None,
            featured_image: None,
        }));
        assert!(errors["title"][0].contains("150"));
    }

    #[test]
    fn filled_honeypot_is_spam() {
        let errors = field_errors(comment(CommentRequest {
            content: "Buy now".into(),
            website: "http://spam.example".into(),
        }));
        assert_eq!(errors[NON_FIELD_ERRORS], vec!["Spam detected."]);
    }
}
