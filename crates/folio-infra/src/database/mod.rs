//! PostgreSQL storage via SeaORM.

mod connections;
pub mod entity;
pub mod post_query;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use sea_orm::DbConn;
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresProfileRepository, PostgresUserRepository,
};
