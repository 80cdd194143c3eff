use std::path::Path;

use async_trait::async_trait;

use crate::error::AppResult;

/// A Confluence-style wiki: pages addressed by space and title, HTML bodies,
/// file attachments.
#[async_trait]
pub trait WikiService: Send + Sync {
    /// Display name of the wiki, used when linking tickets to pages.
    fn site_name(&self) -> &str;
    /// Application identifier used in ticket remote links.
    fn global_identifier(&self) -> &str;
    async fn page_id(&self, space: &str, title: &str) -> AppResult<Option<String>>;
    async fn page_url(&self, page_id: &str) -> AppResult<String>;
    async fn page_body(&self, page_id: &str) -> AppResult<String>;
    async fn update_page(&self, page_id: &str, title: &str, body: &str) -> AppResult<()>;
    async fn attach_file(&self, file: &Path, mime: &str, page_id: &str) -> AppResult<()>;
}
