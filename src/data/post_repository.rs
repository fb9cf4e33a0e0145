use crate::domain::post::{NewPost, PostPatch};
use crate::domain::{DomainError, Post};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Raw persistence over post rows. Absence is a value here: lookups return
/// `None` and delete returns `false` for unknown ids, errors are reserved
/// for storage failures.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, new_post: NewPost) -> Result<Post, DomainError>;
    async fn list_all(&self) -> Result<Vec<Post>, DomainError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, DomainError>;
    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}

pub struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &SqliteRow) -> Result<Post, DomainError> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        excerpt: row.try_get("excerpt")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        cover_image: row.try_get("cover_image")?,
        tags: row.try_get("tags")?,
        read_time: row.try_get("read_time")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, DomainError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO posts (id, title, excerpt, content, author, cover_image, tags, read_time, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, excerpt, content, author, cover_image, tags, read_time, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&new_post.title)
        .bind(&new_post.excerpt)
        .bind(&new_post.content)
        .bind(&new_post.author)
        .bind(&new_post.cover_image)
        .bind(&new_post.tags)
        .bind(new_post.read_time)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        post_from_row(&row)
    }

    async fn list_all(&self) -> Result<Vec<Post>, DomainError> {
        // Tie order for rows sharing created_at is storage-defined.
        let rows = sqlx::query(
            r#"
            SELECT id, title, excerpt, content, author, cover_image, tags, read_time, created_at, updated_at
            FROM posts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(post_from_row).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, excerpt, content, author, cover_image, tags, read_time, created_at, updated_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let now = Utc::now();

        // Enumerated field-by-field merge: COALESCE keeps the stored value
        // for every patch field left as None.
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET
                title = COALESCE(?, title),
                excerpt = COALESCE(?, excerpt),
                content = COALESCE(?, content),
                author = COALESCE(?, author),
                cover_image = COALESCE(?, cover_image),
                tags = COALESCE(?, tags),
                read_time = COALESCE(?, read_time),
                updated_at = ?
            WHERE id = ?
            RETURNING id, title, excerpt, content, author, cover_image, tags, read_time, created_at, updated_at
            "#,
        )
        .bind(patch.title)
        .bind(patch.excerpt)
        .bind(patch.content)
        .bind(patch.author)
        .bind(patch.cover_image)
        .bind(patch.tags)
        .bind(patch.read_time)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post {}: {}", id, e);
            DomainError::DatabaseError(e.to_string())
        })?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
