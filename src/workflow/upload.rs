use std::path::Path;

use tracing::info;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};

/// Where the file goes: the forge's chunked file store or the plain FTP
/// area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    Forge,
    Ftp,
}

fn file_name(file: &Path) -> AppResult<String> {
    file.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::FileTransfer(format!("invalid file path {}", file.display())))
}

/// Upload a local file. Returns the forge file handle or the remote FTP
/// path.
pub async fn run(
    ctx: &AppContext,
    helper_name: Option<&str>,
    target: UploadTarget,
    file: &Path,
    remote_name: Option<&str>,
) -> AppResult<String> {
    let helper = ctx.helper("upload", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let name = match remote_name {
        Some(name) => name.to_string(),
        None => file_name(file)?,
    };
    match target {
        UploadTarget::Forge => {
            let forge = org.forge()?;
            let file_phid = forge.upload_file(file, &name).await?;
            let stored = forge
                .file_by_phid(&file_phid)
                .await?
                .ok_or_else(|| AppError::Forge(format!("uploaded file {file_phid} not found")))?;
            info!(handle = stored.handle(), "file uploaded to the forge");
            Ok(stored.handle())
        }
        UploadTarget::Ftp => {
            let remote_dir = helper.param("remote_dir")?;
            org.file_transfer()?.upload(file, remote_dir, &name).await?;
            let remote = format!("{}/{name}", remote_dir.trim_end_matches('/'));
            info!(remote, "file uploaded over ftp");
            Ok(remote)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn remote_name_defaults_to_the_file_name() {
        assert_eq!(
            file_name(&PathBuf::from("/tmp/scans/receipt.pdf")).unwrap(),
            "receipt.pdf"
        );
    }
}
