//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::extension::postgres::{PgBinOper, PgExpr};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use quill_core::domain::{Pagination, Post, PostFilter, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let masked = mask_email(email);
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

/// Keep the first character of the local part and the domain; hide the rest.
fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return "***".to_string();
    };
    let mut chars = local.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(_)) => format!("{first}***@{domain}"),
        _ => format!("***@{domain}"),
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Translate a listing filter into a SQL condition over published posts.
fn list_condition(filter: &PostFilter) -> Condition {
    let mut cond = Condition::all().add(post::Column::IsPublished.eq(true));

    if let Some(category) = filter.category {
        cond = cond.add(post::Column::Category.eq(category));
    }
    if let Some(author) = filter.author {
        cond = cond.add(post::Column::Author.eq(author));
    }
    if !filter.tags.is_empty() {
        // tags && ARRAY[...]: any shared element
        cond = cond.add(
            Expr::col(post::Column::Tags).binary(PgBinOper::Overlap, Expr::val(filter.tags.clone())),
        );
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        cond = cond.add(
            Condition::any()
                .add(Expr::col(post::Column::Title).ilike(LikeExpr::new(pattern.clone()).escape('\\')))
                .add(Expr::col(post::Column::Content).ilike(LikeExpr::new(pattern).escape('\\'))),
        );
    }

    cond
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let cond = list_condition(filter);

        let items = PostEntity::find()
            .filter(cond.clone())
            .order_by_desc(post::Column::CreatedAt)
            .offset(pagination.skip())
            .limit(pagination.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let total = PostEntity::find()
            .filter(cond)
            .count(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        BaseRepository::<Post, Uuid>::find_by_id(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("javascript"), "javascript");
    }

    #[test]
    fn test_mask_email_is_char_aware() {
        assert_eq!(mask_email("élodie@example.com"), "é***@example.com");
        assert_eq!(mask_email("jo@example.com"), "j***@example.com");
        assert_eq!(mask_email("j@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
