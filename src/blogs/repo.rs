use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A post joined with its author's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct BlogWithCreator {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub user_id: i64,
    pub creator_name: String,
    pub creator_email: String,
}

#[async_trait]
pub trait BlogRepo: Send + Sync {
    async fn create(&self, user_id: i64, title: &str, body: &str) -> AppResult<Blog>;
    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BlogWithCreator>>;
    async fn find(&self, id: i64) -> AppResult<Option<BlogWithCreator>>;
    /// Returns `false` when no post has this id.
    async fn update(&self, id: i64, title: &str, body: &str) -> AppResult<bool>;
    /// Returns `false` when no post has this id.
    async fn delete(&self, id: i64) -> AppResult<bool>;
    async fn list_by_author(&self, user_id: i64) -> AppResult<Vec<Blog>>;
}

#[derive(Clone)]
pub struct PgBlogRepo {
    db: PgPool,
}

impl PgBlogRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlogRepo for PgBlogRepo {
    async fn create(&self, user_id: i64, title: &str, body: &str) -> AppResult<Blog> {
        let blog = sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (title, body, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, body, user_id, created_at
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(blog)
    }

    async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BlogWithCreator>> {
        let rows = sqlx::query_as::<_, BlogWithCreator>(
            r#"
            SELECT b.id, b.title, b.body, b.user_id,
                   u.name AS creator_name, u.email AS creator_email
            FROM blogs b
            JOIN users u ON u.id = b.user_id
            ORDER BY b.id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> AppResult<Option<BlogWithCreator>> {
        let row = sqlx::query_as::<_, BlogWithCreator>(
            r#"
            SELECT b.id, b.title, b.body, b.user_id,
                   u.name AS creator_name, u.email AS creator_email
            FROM blogs b
            JOIN users u ON u.id = b.user_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, title: &str, body: &str) -> AppResult<bool> {
        let res = sqlx::query(r#"UPDATE blogs SET title = $1, body = $2 WHERE id = $3"#)
            .bind(title)
            .bind(body)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query(r#"DELETE FROM blogs WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_by_author(&self, user_id: i64) -> AppResult<Vec<Blog>> {
        let rows = sqlx::query_as::<_, Blog>(
            r#"
            SELECT id, title, body, user_id, created_at
            FROM blogs
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
