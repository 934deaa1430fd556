use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Post;
use crate::visibility::Viewer;

/// Comment entity - belongs to exactly one post and one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Comment author, post author and staff may delete a comment.
    pub fn deletable_by(&self, post: &Post, viewer: &Viewer) -> bool {
        match viewer {
            Viewer::Anonymous => false,
            Viewer::Staff(_) => true,
            Viewer::Member(id) => *id == self.author_id || *id == post.author_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_rights() {
        let post_author = Uuid::new_v4();
        let commenter = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let post = Post::new(post_author, Uuid::new_v4(), "T".into(), "C".into());
        let comment = Comment::new(post.id, commenter, "Nice".into());

        assert!(comment.deletable_by(&post, &Viewer::Member(commenter)));
        assert!(comment.deletable_by(&post, &Viewer::Member(post_author)));
        assert!(comment.deletable_by(&post, &Viewer::Staff(stranger)));
        assert!(!comment.deletable_by(&post, &Viewer::Member(stranger)));
        assert!(!comment.deletable_by(&post, &Viewer::Anonymous));
    }
}
