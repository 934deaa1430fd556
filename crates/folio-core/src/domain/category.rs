use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CATEGORY_NAME_MAX_LEN: usize = 60;
pub const CATEGORY_SLUG_MAX_LEN: usize = 80;

/// Category entity - groups posts. Protected from deletion while referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category. An empty `slug` is derived from the name.
    pub fn new(name: String, slug: String, description: String) -> Self {
        let now = Utc::now();
        let slug = if slug.trim().is_empty() {
            let mut derived = slug::slugify(&name);
            derived.truncate(CATEGORY_SLUG_MAX_LEN);
            derived
        } else {
            slug.trim().to_string()
        };

        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}
