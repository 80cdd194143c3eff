use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use suppaftp::FtpStream;
use suppaftp::types::FileType;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::FileTransferService;

/// Plain FTP endpoint; one connection per upload.
pub struct FtpClient {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl FtpClient {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn upload_blocking(&self, contents: Vec<u8>, remote_dir: &str, remote_name: &str) -> AppResult<()> {
        let mut stream = FtpStream::connect((self.host.as_str(), self.port))
            .map_err(|err| AppError::FileTransfer(format!("cannot connect: {err}")))?;
        stream
            .login(&self.username, &self.password)
            .map_err(|err| AppError::FileTransfer(format!("login failed: {err}")))?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|err| AppError::FileTransfer(format!("cannot switch to binary: {err}")))?;
        for component in remote_dir.split('/').filter(|part| !part.is_empty()) {
            // The directory may exist already; only the cwd has to succeed.
            let _ = stream.mkdir(component);
            stream
                .cwd(component)
                .map_err(|err| AppError::FileTransfer(format!("cannot enter {component}: {err}")))?;
        }
        stream
            .put_file(remote_name, &mut Cursor::new(contents))
            .map_err(|err| AppError::FileTransfer(format!("upload failed: {err}")))?;
        let _ = stream.quit();
        Ok(())
    }
}

#[async_trait]
impl FileTransferService for FtpClient {
    async fn upload(&self, local: &Path, remote_dir: &str, remote_name: &str) -> AppResult<()> {
        debug!(file = %local.display(), remote_dir, remote_name, "ftp upload");
        let contents = tokio::fs::read(local).await?;
        let client = FtpClient::new(&self.host, self.port, &self.username, &self.password);
        let remote_dir = remote_dir.to_string();
        let remote_name = remote_name.to_string();
        tokio::task::spawn_blocking(move || {
            client.upload_blocking(contents, &remote_dir, &remote_name)
        })
        .await
        .map_err(|err| AppError::FileTransfer(format!("upload task failed: {err}")))?
    }
}
