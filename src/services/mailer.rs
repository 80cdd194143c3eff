use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::AppResult;

/// An HTML mail with optional attachments and inline images. Inline images
/// get a Content-ID derived from the file stem so the body can reference
/// them as `cid:<stem>`.
#[derive(Debug, Clone, Default)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    /// Overrides the relay's default sender when set.
    pub from: Option<String>,
    pub subject: String,
    pub body_html: String,
    pub attachments: Vec<PathBuf>,
    pub inline_images: Vec<PathBuf>,
}

#[async_trait]
pub trait MailerService: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> AppResult<()>;
}
