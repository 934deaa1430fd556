//! Post visibility and search expressed as SQL conditions.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr, NullOrdering};
use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QueryOrder, Select};

use folio_core::ports::PostFilter;
use folio_core::{PostScope, VisibilityRule};

use super::entity::post::{self, Entity as PostEntity};

/// Live to the public: published, with a publication time not in the future.
pub fn public_condition(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(post::Column::Status.eq(post::Status::Published))
        .add(post::Column::PublishedAt.is_not_null())
        .add(post::Column::PublishedAt.lte(now))
}

/// Translate a visibility rule into a WHERE clause.
pub fn rule_condition(rule: VisibilityRule, now: DateTime<Utc>) -> Condition {
    match rule {
        VisibilityRule::Public => public_condition(now),
        VisibilityRule::PublicOrAuthoredBy(user_id) => Condition::any()
            .add(public_condition(now))
            .add(post::Column::AuthorId.eq(user_id)),
        VisibilityRule::Everything => Condition::all(),
    }
}

pub fn scope_condition(scope: PostScope, now: DateTime<Utc>) -> Condition {
    rule_condition(scope.rule(), now)
}

pub fn filter_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }
    if let Some(author_id) = filter.author_id {
        condition = condition.add(post::Column::AuthorId.eq(author_id));
    }
    if let Some(query) = &filter.search {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        condition = condition.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(post::Column::Title)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(post::Column::Content)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    condition
}

/// Scoped, filtered and ordered post query.
pub fn scoped_posts(
    scope: PostScope,
    filter: &PostFilter,
    now: DateTime<Utc>,
) -> Select<PostEntity> {
    PostEntity::find()
        .filter(scope_condition(scope, now))
        .filter(filter_condition(filter))
        .order_by_with_nulls(post::Column::PublishedAt, Order::Desc, NullOrdering::Last)
        .order_by_desc(post::Column::CreatedAt)
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::Viewer;
    use sea_orm::{DbBackend, QueryTrait};
    use uuid::Uuid;

    fn sql(scope: PostScope, filter: &PostFilter) -> String {
        scoped_posts(scope, filter, Utc::now())
            .build(DbBackend::Postgres)
            .to_string()
    }

    /// The text between `WHERE` and `ORDER BY`, empty when there is no filter.
    fn where_clause(sql: &str) -> &str {
        let Some((_, rest)) = sql.split_once(" WHERE ") else {
            return "";
        };
        rest.split_once(" ORDER BY ").map_or(rest, |(clause, _)| clause)
    }

    #[test]
    fn published_scope_filters_status_and_time() {
        let sql = sql(PostScope::Published, &PostFilter::default());
        assert!(sql.contains(r#""status" = 'published'"#), "{sql}");
        assert!(sql.contains(r#""published_at" IS NOT NULL"#), "{sql}");
        assert!(sql.contains(r#""published_at" <="#), "{sql}");
    }

    #[test]
    fn anonymous_viewer_gets_the_published_predicate() {
        let filter = PostFilter::default();
        let now = Utc::now();
        let anon = scoped_posts(PostScope::VisibleTo(Viewer::Anonymous), &filter, now)
            .build(DbBackend::Postgres)
            .to_string();
        let public = scoped_posts(PostScope::Published, &filter, now)
            .build(DbBackend::Postgres)
            .to_string();
        assert_eq!(anon, public);
    }

    #[test]
    fn member_scope_ors_in_authorship() {
        let user_id = Uuid::new_v4();
        let sql = sql(PostScope::VisibleTo(Viewer::Member(user_id)), &PostFilter::default());
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains(&format!(r#""author_id" = '{user_id}'"#)), "{sql}");
    }

    #[test]
    fn staff_scope_has_no_visibility_clause() {
        let sql = sql(
            PostScope::VisibleTo(Viewer::Staff(Uuid::new_v4())),
            &PostFilter::default(),
        );
        let clause = where_clause(&sql);
        assert!(!clause.contains(r#""status""#), "{sql}");
        assert!(!clause.contains(r#""author_id""#), "{sql}");
        assert!(!clause.contains(r#""published_at""#), "{sql}");
        let (_, ordering) = sql.split_once(" ORDER BY ").unwrap_or_default();
        assert!(ordering.contains(r#""published_at" DESC"#), "{sql}");
    }

    #[test]
    fn search_is_case_insensitive_and_escaped() {
        let filter = PostFilter::search(Some("100%_Rust"));
        let sql = sql(PostScope::Published, &filter);
        assert!(sql.contains(r#"LOWER("title") LIKE"#), "{sql}");
        assert!(sql.contains(r#"LOWER("content") LIKE"#), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(!sql.contains("100%_"), "{sql}");
    }

    #[test]
    fn listing_orders_by_publication_then_creation() {
        let sql = sql(PostScope::Published, &PostFilter::default());
        assert!(sql.contains(r#""published_at" DESC NULLS LAST"#), "{sql}");
        assert!(sql.contains(r#""created_at" DESC"#), "{sql}");
    }
}
