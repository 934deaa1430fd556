use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, SqlErr,
};

use folio_core::error::RepoError;
use folio_core::ports::BaseRepository;

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Clone + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        // Domain entities carry their own ids, so try an update first and
        // fall back to an insert when no row matched.
        let active_model: E::ActiveModel = entity.into();
        let model = match active_model.clone().update(&self.db).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => active_model
                .insert(&self.db)
                .await
                .map_err(write_error)?,
            Err(e) => return Err(write_error(e)),
        };

        Ok(model.into())
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let result = E::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(delete_error)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// Unique indexes created by the schema migration, mapped to the field they
/// guard and the message shown to the client.
const UNIQUE_INDEXES: &[(&str, &str, &str)] = &[
    ("uq_posts_slug", "slug", "A post with this slug already exists."),
    (
        "uq_posts_published_title",
        "title",
        "A published post with this title already exists.",
    ),
    ("uq_categories_name", "name", "A category with this name already exists."),
    ("uq_categories_slug", "slug", "A category with this slug already exists."),
    ("uq_users_username", "username", "That username is already taken."),
    ("uq_users_email", "email", "That email is already in use."),
    ("uq_profiles_user", "user", "This user already has a profile."),
];

/// Map a unique-violation message to the offending field.
pub(crate) fn describe_unique_violation(detail: &str) -> (&'static str, String) {
    UNIQUE_INDEXES
        .iter()
        .find(|(index, _, _)| detail.contains(index))
        .map(|(_, field, message)| (*field, message.to_string()))
        .unwrap_or(("__all__", "A record with these values already exists.".to_string()))
}

pub(crate) fn query_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

pub(crate) fn write_error(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            let (field, message) = describe_unique_violation(&detail);
            tracing::debug!(field, detail = %detail, "Unique constraint rejected write");
            RepoError::Constraint { field, message }
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            tracing::debug!(detail = %detail, "Foreign key rejected write");
            RepoError::constraint("__all__", "A referenced record does not exist.")
        }
        _ => query_error(err),
    }
}

pub(crate) fn delete_error(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => RepoError::Protected(detail),
        _ => query_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_map_to_fields() {
        let (field, message) = describe_unique_violation(
            "duplicate key value violates unique constraint \"uq_posts_published_title\"",
        );
        assert_eq!(field, "title");
        assert!(message.contains("published post"));

        let (field, _) = describe_unique_violation(
            "duplicate key value violates unique constraint \"uq_posts_slug\"",
        );
        assert_eq!(field, "slug");
    }

    #[test]
    fn unknown_index_maps_to_non_field_error() {
        let (field, _) = describe_unique_violation("constraint \"something_else\"");
        assert_eq!(field, "__all__");
    }
}
