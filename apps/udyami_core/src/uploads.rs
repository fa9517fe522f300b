use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::ApiError;

const IMAGE_EXTS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const DOCUMENT_EXTS: &[&str] = &["pdf", "doc", "docx", "txt", "csv", "xlsx", "xls", "ppt", "pptx"];

const MB: usize = 1024 * 1024;

/// What kind of file is being accepted. Each kind carries its own
/// extension allowlist and size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    ProfilePicture,
    Document,
}

impl UploadKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Self::Image),
            "profile_picture" => Some(Self::ProfilePicture),
            "document" => Some(Self::Document),
            _ => None,
        }
    }

    pub fn allowed_exts(self) -> &'static [&'static str] {
        match self {
            Self::Image | Self::ProfilePicture => IMAGE_EXTS,
            Self::Document => DOCUMENT_EXTS,
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            Self::Image => 5 * MB,
            Self::ProfilePicture => 2 * MB,
            Self::Document => 10 * MB,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::ProfilePicture => "profile",
            Self::Document => "document",
        }
    }

    fn mime_ok(self, mime: &str) -> bool {
        match self {
            Self::Image | Self::ProfilePicture => mime.starts_with("image/"),
            Self::Document => mime.starts_with("application/") || mime.starts_with("text/"),
        }
    }
}

/// Where uploaded files land on disk.
#[derive(Debug, Clone)]
pub struct UploadCfg {
    pub dir: PathBuf,
}

impl UploadCfg {
    pub fn from_env() -> Self {
        let dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        Self { dir: PathBuf::from(dir) }
    }
}

/// Validates and persists one uploaded file. Returns the public path
/// (`/uploads/<name>`) the client can fetch it back from.
pub async fn accept_file(
    cfg: &UploadCfg,
    kind: UploadKind,
    filename: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<String, ApiError> {
    let ext = filename
        .rsplit('.')
        .next()
        .filter(|e| *e != filename)
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| ApiError::validation("File has no extension"))?;

    if !kind.allowed_exts().contains(&ext.as_str()) {
        return Err(ApiError::validation(format!(
            "File type .{ext} is not allowed here"
        )));
    }

    if let Some(mime) = content_type {
        if !kind.mime_ok(mime) {
            return Err(ApiError::validation(format!(
                "Content type {mime} does not match the upload kind"
            )));
        }
    }

    if data.len() > kind.max_bytes() {
        return Err(ApiError::validation(format!(
            "File exceeds the {} MB limit",
            kind.max_bytes() / MB
        )));
    }

    let name = format!(
        "{}-{}-{}.{ext}",
        kind.prefix(),
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    );

    tokio::fs::create_dir_all(&cfg.dir)
        .await
        .map_err(anyhow::Error::from)?;
    tokio::fs::write(cfg.dir.join(&name), data)
        .await
        .map_err(anyhow::Error::from)?;

    Ok(format!("/uploads/{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cfg() -> UploadCfg {
        let dir = std::env::temp_dir().join(format!("udyami-test-{}", Uuid::new_v4().simple()));
        UploadCfg { dir }
    }

    #[tokio::test]
    async fn rejects_unknown_extension() {
        let cfg = temp_cfg();
        let err = accept_file(&cfg, UploadKind::Image, "shell.exe", None, b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_mismatched_mime() {
        let cfg = temp_cfg();
        let err = accept_file(
            &cfg,
            UploadKind::Image,
            "photo.png",
            Some("application/pdf"),
            b"x",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_oversized_file() {
        let cfg = temp_cfg();
        let big = vec![0u8; 2 * MB + 1];
        let err = accept_file(
            &cfg,
            UploadKind::ProfilePicture,
            "me.jpg",
            Some("image/jpeg"),
            &big,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn stores_valid_file_under_unique_name() {
        let cfg = temp_cfg();
        let path = accept_file(
            &cfg,
            UploadKind::Image,
            "product.png",
            Some("image/png"),
            b"png bytes",
        )
        .await
        .unwrap();
        assert!(path.starts_with("/uploads/image-"));
        assert!(path.ends_with(".png"));

        let name = path.strip_prefix("/uploads/").unwrap();
        let stored = tokio::fs::read(cfg.dir.join(name)).await.unwrap();
        assert_eq!(stored, b"png bytes");
    }
}
