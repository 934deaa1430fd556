//! Domain entities - the core business objects.

mod category;
mod comment;
mod post;
mod profile;
mod user;

pub use category::{CATEGORY_NAME_MAX_LEN, CATEGORY_SLUG_MAX_LEN, Category};
pub use comment::Comment;
pub use post::{Post, PostStatus, TITLE_MAX_LEN};
pub use profile::{LOCATION_MAX_LEN, Profile};
pub use user::User;
