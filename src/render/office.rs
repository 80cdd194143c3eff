use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use crate::error::{AppError, AppResult};

const MACOS_SOFFICE: &str = "/Applications/LibreOffice.app/Contents/MacOS/soffice";

/// Concatenate the inputs into one PDF with pdftk.
pub async fn concatenate_pdfs(inputs: &[PathBuf], output: &Path) -> AppResult<()> {
    if inputs.is_empty() {
        return Err(AppError::Document("no documents to concatenate".to_string()));
    }
    let mut command = Command::new("pdftk");
    for input in inputs {
        command.arg(input);
    }
    command.arg("cat").arg("output").arg(output);
    run(command, "pdftk").await
}

/// Convert an office document to PDF with a headless LibreOffice. Returns
/// the path of the converted file.
pub async fn convert_to_pdf(input: &Path, output_dir: &Path) -> AppResult<PathBuf> {
    let mut command = Command::new(soffice_binary());
    command
        .args(["--headless", "--convert-to", "pdf", "--outdir"])
        .arg(output_dir)
        .arg(input);
    run(command, "soffice").await?;
    let stem = input
        .file_stem()
        .ok_or_else(|| AppError::Document(format!("invalid document path {}", input.display())))?;
    Ok(output_dir.join(stem).with_extension("pdf"))
}

fn soffice_binary() -> &'static str {
    if Path::new(MACOS_SOFFICE).exists() {
        MACOS_SOFFICE
    } else {
        "soffice"
    }
}

async fn run(mut command: Command, tool: &str) -> AppResult<()> {
    debug!(tool, "running external tool");
    let output = command
        .output()
        .await
        .map_err(|err| AppError::Document(format!("cannot run {tool}: {err}")))?;
    if !output.status.success() {
        return Err(AppError::Document(format!(
            "{tool} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refuses_an_empty_concatenation() {
        let dir = tempfile::tempdir().unwrap();
        let err = concatenate_pdfs(&[], &dir.path().join("out.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no documents"));
    }
}
