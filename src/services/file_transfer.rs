use std::path::Path;

use async_trait::async_trait;

use crate::error::AppResult;

#[async_trait]
pub trait FileTransferService: Send + Sync {
    /// Upload a local file into a remote directory, creating intermediate
    /// directories as needed.
    async fn upload(&self, local: &Path, remote_dir: &str, remote_name: &str) -> AppResult<()>;
}
