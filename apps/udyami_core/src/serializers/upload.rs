use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// "image" (default), "profile_picture" or "document".
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadOut {
    pub path: String,
}
