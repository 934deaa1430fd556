//! Shared application state.

use std::sync::Arc;

use folio_core::ports::{
    CategoryRepository, CommentRepository, PostRepository, ProfileRepository, UserRepository,
};
use folio_infra::InMemoryStore;

use crate::config::{AppConfig, SiteConfig};

/// Repositories and site settings shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub users: Arc<dyn UserRepository>,
    pub site: SiteConfig,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match folio_infra::database::connect(db_config).await {
                    Ok(conn) => {
                        tracing::info!("Application state initialized (postgres)");
                        return Self::postgres(conn, config.site.clone());
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!(
                    "DATABASE_URL not set. Running without database (in-memory mode)."
                );
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory storage");

        Self::in_memory(config.site.clone())
    }

    /// State backed by one shared in-memory store.
    pub fn in_memory(site: SiteConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            posts: store.clone(),
            categories: store.clone(),
            comments: store.clone(),
            profiles: store.clone(),
            users: store,
            site,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(conn: folio_infra::database::DbConn, site: SiteConfig) -> Self {
        use folio_infra::database::{
            PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
            PostgresProfileRepository, PostgresUserRepository,
        };

        Self {
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            profiles: Arc::new(PostgresProfileRepository::new(conn.clone())),
            users: Arc::new(PostgresUserRepository::new(conn)),
            site,
        }
    }
}
