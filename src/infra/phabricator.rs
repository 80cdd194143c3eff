use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::{ForgeDocument, ForgeFile, ForgeService, ForgeTask, ForgeTaskRequest};

const PRIORITY_NORMAL: u32 = 50;
const CHUNK_ATTEMPTS: u32 = 3;
const CHUNK_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct PhabricatorClient {
    http: Client,
    base_url: String,
    user_phid: String,
    token: String,
}

impl PhabricatorClient {
    pub fn new(base_url: &str, user_phid: &str, token: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_phid: user_phid.to_string(),
            token: token.to_string(),
        }
    }

    /// One Conduit call: form-encoded fields (nested parameters use bracket
    /// syntax), result wrapped in an envelope that reports errors even on
    /// HTTP 200.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<(String, String)>,
    ) -> AppResult<T> {
        debug!(method, "conduit call");
        let mut form = vec![("api.token".to_string(), self.token.clone())];
        form.extend(params);
        let response = self
            .http
            .post(format!("{}/api/{method}", self.base_url))
            .form(&form)
            .send()
            .await
            .map_err(|err| AppError::Forge(format!("{method}: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Forge(format!(
                "{method}: forge responded with {status}: {body}"
            )));
        }
        let envelope: ConduitEnvelope<T> = response
            .json()
            .await
            .map_err(|err| AppError::Forge(format!("{method}: failed to parse reply: {err}")))?;
        if let Some(code) = envelope.error_code {
            let info = envelope.error_info.unwrap_or_default();
            return Err(AppError::Forge(format!("{method}: {code}: {info}")));
        }
        envelope
            .result
            .ok_or_else(|| AppError::Forge(format!("{method}: empty result")))
    }

    fn transaction_params(
        transactions: &[(String, serde_json::Value)],
        first_index: usize,
    ) -> Vec<(String, String)> {
        transactions
            .iter()
            .enumerate()
            .flat_map(|(i, (kind, value))| {
                let index = first_index + i;
                let value = match value.as_str() {
                    Some(text) => text.to_string(),
                    None => value.to_string(),
                };
                vec![
                    (format!("transactions[{index}][type]"), kind.clone()),
                    (format!("transactions[{index}][value]"), value),
                ]
            })
            .collect()
    }

    async fn upload_whole(&self, contents: &[u8], name: &str) -> AppResult<String> {
        let encoded = BASE64_STANDARD.encode(contents);
        self.call(
            "file.upload",
            vec![
                ("data_base64".to_string(), encoded),
                ("name".to_string(), name.to_string()),
            ],
        )
        .await
    }

    async fn upload_chunks(&self, contents: &[u8], file_phid: &str) -> AppResult<()> {
        let chunks: Vec<ChunkInfo> = self
            .call(
                "file.querychunks",
                vec![("filePHID".to_string(), file_phid.to_string())],
            )
            .await?;
        for chunk in chunks.iter().filter(|chunk| !chunk.complete) {
            let start = chunk.byte_start.parse::<usize>().map_err(|_| {
                AppError::Forge(format!("bad chunk offset '{}'", chunk.byte_start))
            })?;
            let end = chunk.byte_end.parse::<usize>().map_err(|_| {
                AppError::Forge(format!("bad chunk offset '{}'", chunk.byte_end))
            })?;
            let end = end.min(contents.len());
            let encoded = BASE64_STANDARD.encode(&contents[start..end]);
            let params = vec![
                ("filePHID".to_string(), file_phid.to_string()),
                ("byteStart".to_string(), start.to_string()),
                ("data".to_string(), encoded),
                ("dataEncoding".to_string(), "base64".to_string()),
            ];
            // The only retry in the whole tool: each chunk gets three
            // attempts with a fixed pause.
            let mut last_error = None;
            for attempt in 1..=CHUNK_ATTEMPTS {
                match self
                    .call::<serde_json::Value>("file.uploadchunk", params.clone())
                    .await
                {
                    Ok(_) => {
                        last_error = None;
                        break;
                    }
                    Err(err) => {
                        debug!(attempt, start, "chunk upload failed: {err}");
                        last_error = Some(err);
                        if attempt < CHUNK_ATTEMPTS {
                            tokio::time::sleep(CHUNK_RETRY_DELAY).await;
                        }
                    }
                }
            }
            if let Some(err) = last_error {
                return Err(err);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ForgeService for PhabricatorClient {
    fn user_phid(&self) -> &str {
        &self.user_phid
    }

    fn document_url(&self, slug: &str) -> String {
        format!("{}/w/{}", self.base_url, slug.trim_start_matches('/'))
    }

    async fn find_document(
        &self,
        path: &str,
        include_body: bool,
    ) -> AppResult<Option<ForgeDocument>> {
        let mut path = path.to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        let mut params = vec![("constraints[paths][0]".to_string(), path)];
        if include_body {
            params.push(("attachments[content]".to_string(), "true".to_string()));
        }
        let result: DocumentSearchResult = self.call("phriction.document.search", params).await?;
        Ok(result.data.into_iter().next().map(|item| {
            let content = item.attachments.and_then(|attachments| attachments.content);
            ForgeDocument {
                phid: item.phid,
                slug: item.fields.and_then(|fields| fields.path).unwrap_or_default(),
                title: content
                    .as_ref()
                    .and_then(|content| content.title.clone())
                    .unwrap_or_default(),
                body: content
                    .and_then(|content| content.content)
                    .map(|content| content.raw),
            }
        }))
    }

    async fn create_document(
        &self,
        slug: &str,
        title: &str,
        body: &str,
    ) -> AppResult<ForgeDocument> {
        let result: DocumentEditResult = self
            .call(
                "phriction.create",
                vec![
                    ("slug".to_string(), slug.to_string()),
                    ("title".to_string(), title.to_string()),
                    ("content".to_string(), body.to_string()),
                ],
            )
            .await?;
        Ok(ForgeDocument {
            phid: result.phid.unwrap_or_default(),
            slug: result.slug.unwrap_or_else(|| slug.to_string()),
            title: title.to_string(),
            body: None,
        })
    }

    async fn update_document(&self, slug: &str, title: &str, body: &str) -> AppResult<()> {
        self.call::<serde_json::Value>(
            "phriction.edit",
            vec![
                ("slug".to_string(), slug.to_string()),
                ("title".to_string(), title.to_string()),
                ("content".to_string(), body.to_string()),
            ],
        )
        .await?;
        Ok(())
    }

    async fn create_task(&self, request: ForgeTaskRequest) -> AppResult<ForgeTask> {
        let created: TaskCreateResult = self
            .call(
                "maniphest.createtask",
                vec![
                    ("title".to_string(), request.title),
                    ("description".to_string(), request.description),
                    ("ownerPHID".to_string(), self.user_phid.clone()),
                    ("projectPHIDs[0]".to_string(), request.project_phid),
                    ("priority".to_string(), PRIORITY_NORMAL.to_string()),
                ],
            )
            .await?;
        // New tasks open explicitly, then get their custom fields.
        let mut transactions = vec![(
            "status".to_string(),
            serde_json::Value::String("open".to_string()),
        )];
        transactions.extend(request.transactions);
        self.edit_task(&created.phid, &transactions).await?;
        Ok(ForgeTask {
            id: created.id,
            phid: created.phid,
        })
    }

    async fn edit_task(
        &self,
        task_phid: &str,
        transactions: &[(String, serde_json::Value)],
    ) -> AppResult<()> {
        let mut params = vec![("objectIdentifier".to_string(), task_phid.to_string())];
        params.extend(Self::transaction_params(transactions, 0));
        self.call::<serde_json::Value>("maniphest.edit", params)
            .await?;
        Ok(())
    }

    async fn upload_file(&self, file: &Path, name: &str) -> AppResult<String> {
        let contents = tokio::fs::read(file).await?;
        let hash = format!("{:x}", Sha256::digest(&contents));
        debug!(name, bytes = contents.len(), "forge: upload file");
        let allocated: AllocateResult = self
            .call(
                "file.allocate",
                vec![
                    ("name".to_string(), name.to_string()),
                    ("contentLength".to_string(), contents.len().to_string()),
                    ("contentHash".to_string(), hash),
                ],
            )
            .await?;
        match allocated.file_phid {
            // Small files skip the chunk store entirely.
            None => self.upload_whole(&contents, name).await,
            Some(phid) => {
                self.upload_chunks(&contents, &phid).await?;
                Ok(phid)
            }
        }
    }

    async fn file_by_phid(&self, file_phid: &str) -> AppResult<Option<ForgeFile>> {
        let result: FileSearchResult = self
            .call(
                "file.search",
                vec![("constraints[phids][0]".to_string(), file_phid.to_string())],
            )
            .await?;
        Ok(result.data.into_iter().next().map(|file| ForgeFile {
            id: file.id,
            phid: file.phid,
        }))
    }
}

#[derive(Deserialize)]
struct ConduitEnvelope<T> {
    result: Option<T>,
    error_code: Option<String>,
    error_info: Option<String>,
}

#[derive(Deserialize)]
struct DocumentSearchResult {
    #[serde(default)]
    data: Vec<DocumentSearchItem>,
}

#[derive(Deserialize)]
struct DocumentSearchItem {
    phid: String,
    fields: Option<DocumentFields>,
    attachments: Option<DocumentAttachments>,
}

#[derive(Deserialize)]
struct DocumentFields {
    path: Option<String>,
}

#[derive(Deserialize)]
struct DocumentAttachments {
    content: Option<DocumentContent>,
}

#[derive(Deserialize)]
struct DocumentContent {
    title: Option<String>,
    content: Option<DocumentRawContent>,
}

#[derive(Deserialize)]
struct DocumentRawContent {
    raw: String,
}

#[derive(Deserialize)]
struct DocumentEditResult {
    phid: Option<String>,
    slug: Option<String>,
}

#[derive(Deserialize)]
struct TaskCreateResult {
    id: String,
    phid: String,
}

#[derive(Deserialize)]
struct AllocateResult {
    #[serde(rename = "filePHID")]
    file_phid: Option<String>,
}

#[derive(Deserialize)]
struct ChunkInfo {
    #[serde(rename = "byteStart")]
    byte_start: String,
    #[serde(rename = "byteEnd")]
    byte_end: String,
    complete: bool,
}

#[derive(Deserialize)]
struct FileSearchResult {
    #[serde(default)]
    data: Vec<FileSearchItem>,
}

#[derive(Deserialize)]
struct FileSearchItem {
    id: u64,
    phid: String,
}
