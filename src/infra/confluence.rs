use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::WikiService;

pub struct ConfluenceClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    global_identifier: String,
    name: String,
}

impl ConfluenceClient {
    pub fn new(
        base_url: &str,
        username: &str,
        password: &str,
        global_identifier: &str,
        name: &str,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            global_identifier: global_identifier.to_string(),
            name: name.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/rest/api/{path}", self.base_url)
    }

    async fn check(response: Response, what: &str) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Err(AppError::Wiki(format!(
            "{what}: Confluence responded with {status}: {body}"
        )))
    }

    async fn get_page(&self, page_id: &str, expand: Option<&str>) -> AppResult<PageResponse> {
        let mut request = self
            .http
            .get(self.endpoint(&format!("content/{page_id}")))
            .basic_auth(&self.username, Some(&self.password));
        if let Some(expand) = expand {
            request = request.query(&[("expand", expand)]);
        }
        let response = request
            .send()
            .await
            .map_err(|err| AppError::Wiki(format!("fetch page: {err}")))?;
        let response = Self::check(response, "fetch page").await?;
        response
            .json()
            .await
            .map_err(|err| AppError::Wiki(format!("failed to parse page reply: {err}")))
    }
}

#[async_trait]
impl WikiService for ConfluenceClient {
    fn site_name(&self) -> &str {
        &self.name
    }

    fn global_identifier(&self) -> &str {
        &self.global_identifier
    }

    async fn page_id(&self, space: &str, title: &str) -> AppResult<Option<String>> {
        debug!(space, title, "confluence: look up page id");
        let response = self
            .http
            .get(self.endpoint("content"))
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("spaceKey", space), ("title", title)])
            .send()
            .await
            .map_err(|err| AppError::Wiki(format!("look up page: {err}")))?;
        let response = Self::check(response, "look up page").await?;
        let payload: ContentListResponse = response
            .json()
            .await
            .map_err(|err| AppError::Wiki(format!("failed to parse page list: {err}")))?;
        Ok(payload.results.into_iter().next().map(|page| page.id))
    }

    async fn page_url(&self, page_id: &str) -> AppResult<String> {
        let page = self.get_page(page_id, None).await?;
        let webui = page
            .links
            .and_then(|links| links.webui)
            .ok_or_else(|| AppError::Wiki(format!("page {page_id} has no web link")))?;
        Ok(format!("{}/{}", self.base_url, webui.trim_start_matches('/')))
    }

    async fn page_body(&self, page_id: &str) -> AppResult<String> {
        let page = self.get_page(page_id, Some("body.view")).await?;
        page.body
            .and_then(|body| body.view)
            .map(|view| view.value)
            .ok_or_else(|| AppError::Wiki(format!("page {page_id} has no body")))
    }

    async fn update_page(&self, page_id: &str, title: &str, body: &str) -> AppResult<()> {
        let current = self.get_page(page_id, Some("version")).await?;
        let version = current
            .version
            .map(|version| version.number)
            .ok_or_else(|| AppError::Wiki(format!("page {page_id} has no version")))?;
        debug!(page_id, version, "confluence: update page");
        let payload = json!({
            "id": page_id,
            "type": "page",
            "title": title,
            "version": {"number": version + 1},
            "body": {"storage": {"value": body, "representation": "storage"}},
        });
        let response = self
            .http
            .put(self.endpoint(&format!("content/{page_id}")))
            .basic_auth(&self.username, Some(&self.password))
            .json(&payload)
            .send()
            .await
            .map_err(|err| AppError::Wiki(format!("update page: {err}")))?;
        Self::check(response, "update page").await?;
        Ok(())
    }

    async fn attach_file(&self, file: &Path, mime: &str, page_id: &str) -> AppResult<()> {
        let file_name = file
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| AppError::Wiki(format!("invalid attachment path {}", file.display())))?
            .to_string();
        debug!(page_id, file = %file_name, "confluence: attach file");
        let contents = tokio::fs::read(file).await?;
        let part = Part::bytes(contents)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|err| AppError::Wiki(format!("invalid attachment MIME type: {err}")))?;
        let form = Form::new().part("file", part);
        let response = self
            .http
            .post(self.endpoint(&format!("content/{page_id}/child/attachment")))
            .basic_auth(&self.username, Some(&self.password))
            .header("X-Atlassian-Token", "nocheck")
            .multipart(form)
            .send()
            .await
            .map_err(|err| AppError::Wiki(format!("attach file: {err}")))?;
        Self::check(response, "attach file").await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ContentListResponse {
    #[serde(default)]
    results: Vec<ContentRef>,
}

#[derive(Deserialize)]
struct ContentRef {
    id: String,
}

#[derive(Deserialize)]
struct PageResponse {
    #[serde(rename = "_links")]
    links: Option<PageLinks>,
    body: Option<PageBody>,
    version: Option<PageVersion>,
}

#[derive(Deserialize)]
struct PageLinks {
    webui: Option<String>,
}

#[derive(Deserialize)]
struct PageBody {
    view: Option<PageBodyView>,
}

#[derive(Deserialize)]
struct PageBodyView {
    value: String,
}

#[derive(Deserialize)]
struct PageVersion {
    number: u64,
}
