use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters of content used for a derived excerpt.
const EXCERPT_LEN: usize = 100;

/// Stored representation of a post row. `tags` is kept as the raw JSON
/// text column; decoding happens in `into_response`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub tags: Option<String>,
    pub read_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new row, already in storage shape (tags serialized,
/// excerpt defaulted). The repository assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub tags: String,
    pub read_time: i32,
}

/// Partial update in storage shape. `None` means "leave the stored value
/// alone"; an explicit empty string or empty tag list is a real value.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<String>,
    pub read_time: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default = "default_author")]
    pub author: String,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_read_time")]
    pub read_time: i32,
}

fn default_author() -> String {
    "Anonymous".to_string()
}

fn default_read_time() -> i32 {
    5
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub read_time: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub read_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serialize a tag list into the JSON text stored in the `tags` column.
pub fn encode_tags(tags: &[String]) -> String {
    // Vec<String> -> JSON array cannot fail
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

/// Decode the stored `tags` column back into an ordered tag list.
/// NULL, empty, or unreadable text all decode to an empty list.
pub fn decode_tags(raw: Option<&str>) -> Vec<String> {
    raw.filter(|s| !s.is_empty())
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

/// First `EXCERPT_LEN` characters of content plus an ellipsis marker.
pub fn derive_excerpt(content: &str) -> String {
    let mut excerpt: String = content.chars().take(EXCERPT_LEN).collect();
    excerpt.push_str("...");
    excerpt
}

impl Post {
    /// Outbound transformation: stored row -> API shape. Tags are decoded
    /// and excerpt is guaranteed non-null.
    pub fn into_response(self) -> PostResponse {
        let tags = decode_tags(self.tags.as_deref());
        PostResponse {
            id: self.id,
            title: self.title,
            excerpt: self.excerpt.unwrap_or_default(),
            content: self.content,
            author: self.author,
            cover_image: self.cover_image,
            tags,
            read_time: self.read_time,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl CreatePostRequest {
    /// Inbound transformation for the create path: derive the excerpt when
    /// the caller supplied none and serialize the tag list.
    pub fn into_new_post(self) -> NewPost {
        let excerpt = self
            .excerpt
            .or_else(|| Some(derive_excerpt(&self.content)));
        NewPost {
            title: self.title,
            excerpt,
            content: self.content,
            author: self.author,
            cover_image: self.cover_image,
            tags: encode_tags(&self.tags),
            read_time: self.read_time,
        }
    }
}

impl UpdatePostRequest {
    /// Inbound transformation for the update path: forward only the fields
    /// the caller supplied. The excerpt is never recomputed here, even when
    /// content changes.
    pub fn into_patch(self) -> PostPatch {
        PostPatch {
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            author: self.author,
            cover_image: self.cover_image,
            tags: self.tags.as_deref().map(encode_tags),
            read_time: self.read_time,
        }
    }
}
