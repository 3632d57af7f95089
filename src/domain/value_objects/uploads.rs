use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Mime types the upload pipeline accepts. Anything else is rejected at
/// submission time, or terminally failed if it slips through to a worker.
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

pub const MAX_UPLOAD_SIZE_BYTES: i64 = 5_000_000;

pub fn is_allowed_image_mime(mime_type: &str) -> bool {
    ALLOWED_IMAGE_MIME_TYPES.contains(&mime_type)
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadJobStatusDto {
    pub job_id: Uuid,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageDto {
    pub id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_image_types() {
        assert!(is_allowed_image_mime("image/jpeg"));
        assert!(is_allowed_image_mime("image/png"));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!is_allowed_image_mime("text/plain"));
        assert!(!is_allowed_image_mime("application/pdf"));
        assert!(!is_allowed_image_mime("image/svg+xml"));
    }
}
