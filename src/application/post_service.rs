use crate::data::PostRepository;
use crate::domain::post::{CreatePostRequest, PostResponse, UpdatePostRequest};
use crate::domain::DomainError;
use std::sync::Arc;

pub struct PostService {
    post_repo: Arc<dyn PostRepository + Send + Sync>,
}

impl PostService {
    pub fn new(post_repo: Arc<dyn PostRepository + Send + Sync>) -> Self {
        Self { post_repo }
    }

    pub async fn create_post(&self, req: CreatePostRequest) -> Result<PostResponse, DomainError> {
        validate_title(&req.title)?;
        if req.content.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Content cannot be empty".to_string(),
            ));
        }
        validate_author(&req.author)?;
        validate_read_time(req.read_time)?;

        let post = self.post_repo.create(req.into_new_post()).await?;

        tracing::info!("Post created: id={}", post.id);

        Ok(post.into_response())
    }

    pub async fn list_posts(&self) -> Result<Vec<PostResponse>, DomainError> {
        let posts = self.post_repo.list_all().await?;
        Ok(posts.into_iter().map(|p| p.into_response()).collect())
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<PostResponse>, DomainError> {
        let post = self.post_repo.find_by_id(id).await?;
        Ok(post.map(|p| p.into_response()))
    }

    pub async fn update_post(
        &self,
        id: &str,
        req: UpdatePostRequest,
    ) -> Result<Option<PostResponse>, DomainError> {
        if let Some(title) = req.title.as_deref() {
            validate_title(title)?;
        }
        if let Some(content) = req.content.as_deref() {
            if content.trim().is_empty() {
                return Err(DomainError::ValidationError(
                    "Content cannot be empty".to_string(),
                ));
            }
        }
        if let Some(author) = req.author.as_deref() {
            validate_author(author)?;
        }
        if let Some(read_time) = req.read_time {
            validate_read_time(read_time)?;
        }

        let updated = self.post_repo.update(id, req.into_patch()).await?;

        if updated.is_some() {
            tracing::info!("Post updated: id={}", id);
        }

        Ok(updated.map(|p| p.into_response()))
    }

    pub async fn delete_post(&self, id: &str) -> Result<bool, DomainError> {
        let deleted = self.post_repo.delete(id).await?;

        if deleted {
            tracing::info!("Post deleted: id={}", id);
        }

        Ok(deleted)
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    let len = title.chars().count();
    if title.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if len > 200 {
        return Err(DomainError::ValidationError(
            "Title must be at most 200 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_author(author: &str) -> Result<(), DomainError> {
    if author.chars().count() > 100 {
        return Err(DomainError::ValidationError(
            "Author must be at most 100 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_read_time(read_time: i32) -> Result<(), DomainError> {
    if !(1..=120).contains(&read_time) {
        return Err(DomainError::ValidationError(
            "Read time must be between 1 and 120 minutes".to_string(),
        ));
    }
    Ok(())
}
