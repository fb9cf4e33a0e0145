use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures::TryStreamExt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FALLBACK_EXTENSION: &str = "png";

/// Local image storage: a flat directory of uniquely named files.
/// No versioning, no dedup; the filename is the whole contract.
pub struct ImageStore {
    upload_dir: PathBuf,
}

impl ImageStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self { upload_dir })
    }

    /// Write bytes under a fresh `uuid.ext` name and return that name.
    async fn save(&self, extension: &str, bytes: &[u8]) -> std::io::Result<String> {
        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        tokio::fs::write(self.upload_dir.join(&filename), bytes).await?;
        Ok(filename)
    }

    /// Resolve a stored filename, rejecting anything that could escape
    /// the upload directory.
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return None;
        }
        Some(self.upload_dir.join(filename))
    }
}

/// Extension of the uploaded file, without the dot. Falls back to `png`
/// when the name has none or it looks suspicious.
fn extension_of(filename: Option<&str>) -> &str {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(FALLBACK_EXTENSION)
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

pub async fn upload_image(
    store: web::Data<ImageStore>,
    mut payload: Multipart,
) -> impl Responder {
    let mut field = match payload.try_next().await {
        Ok(Some(field)) => field,
        Ok(None) => return bad_request("No file supplied"),
        Err(err) => {
            tracing::warn!("Malformed multipart payload: {}", err);
            return bad_request("Malformed multipart payload");
        }
    };

    let is_image = field
        .content_type()
        .map(|mime| mime.essence_str().starts_with("image/"))
        .unwrap_or(false);
    if !is_image {
        return bad_request("Only image files can be uploaded");
    }

    let extension = extension_of(
        field
            .content_disposition()
            .and_then(|cd| cd.get_filename()),
    )
    .to_string();

    let mut bytes = Vec::new();
    loop {
        match field.try_next().await {
            Ok(Some(chunk)) => bytes.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("Failed to read upload body: {}", err);
                return bad_request("Malformed multipart payload");
            }
        }
    }

    match store.save(&extension, &bytes).await {
        Ok(filename) => {
            tracing::info!("Image uploaded: {}", filename);
            HttpResponse::Ok().json(serde_json::json!({
                "url": format!("/api/posts/images/{}", filename)
            }))
        }
        Err(err) => {
            tracing::error!("Failed to store image: {}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Internal server error" }))
        }
    }
}

pub async fn get_image(
    req: HttpRequest,
    store: web::Data<ImageStore>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    let filename = path.into_inner();

    let Some(filepath) = store.resolve(&filename) else {
        return Ok(image_not_found());
    };

    match NamedFile::open_async(filepath).await {
        Ok(file) => Ok(file.into_response(&req)),
        Err(_) => Ok(image_not_found()),
    }
}

fn image_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Image not found" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_falls_back_when_absent_or_odd() {
        assert_eq!(extension_of(Some("photo.jpeg")), "jpeg");
        assert_eq!(extension_of(Some("photo")), "png");
        assert_eq!(extension_of(Some("weird.j/pg")), "png");
        assert_eq!(extension_of(None), "png");
    }

    #[tokio::test]
    async fn store_saves_and_resolves_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();

        let filename = store.save("png", b"fake image bytes").await.unwrap();
        assert!(filename.ends_with(".png"));

        let path = store.resolve(&filename).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"fake image bytes");
    }

    #[test]
    fn resolve_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();

        assert!(store.resolve("../secret.txt").is_none());
        assert!(store.resolve("a/b.png").is_none());
        assert!(store.resolve("").is_none());
    }
}
