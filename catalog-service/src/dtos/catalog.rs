use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::AssetPointer;
use crate::services::Claims;

/// Text fields of the multipart publish request.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PublishForm {
    #[validate(length(min = 1, max = 255))]
    pub path: Option<String>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub message: String,
    pub user: Claims,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub message: String,
    pub catalog: AssetPointer,
}
