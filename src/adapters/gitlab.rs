use crate::adapters::http::{parse_json, read_success_body};
use crate::config::AppConfig;
use crate::domain::model::UploadedFile;
use crate::domain::ports::IssueTracker;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::json;
use std::path::Path;

const SERVICE: &str = "GitLab";
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// 上傳附件並在固定議題下評論
pub struct GitlabClient {
    client: Client,
    base_url: String,
    project_id: u64,
    issue_iid: u64,
    access_token: String,
}

impl GitlabClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        let url = &config.gitlab.url;
        Self {
            client,
            base_url: url.strip_suffix('/').unwrap_or(url).to_string(),
            project_id: config.gitlab.project_id,
            issue_iid: config.gitlab.issue_iid,
            access_token: config.gitlab.access_token.clone(),
        }
    }

    pub fn uploads_url(&self) -> String {
        format!("{}/api/v4/projects/{}/uploads", self.base_url, self.project_id)
    }

    pub fn notes_url(&self) -> String {
        format!(
            "{}/api/v4/projects/{}/issues/{}/notes",
            self.base_url, self.project_id, self.issue_iid
        )
    }

    pub async fn upload(&self, path: &Path) -> Result<UploadedFile> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| EtlError::ResponseError {
                service: SERVICE,
                message: format!("cannot upload {}: no file name", path.display()),
            })?
            .to_string();
        let content = tokio::fs::read(path).await?;

        tracing::debug!("Uploading {} ({} bytes) to GitLab", file_name, content.len());

        let part = Part::bytes(content)
            .file_name(file_name)
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.uploads_url())
            .header(TOKEN_HEADER, &self.access_token)
            .multipart(form)
            .send()
            .await?;

        let body = read_success_body(SERVICE, response).await?;
        parse_json(SERVICE, &body)
    }
}

#[async_trait]
impl IssueTracker for GitlabClient {
    async fn upload_file(&self, path: &Path) -> Result<String> {
        let uploaded = self.upload(path).await?;
        tracing::debug!("GitLab stored {} at {}", uploaded.alt, uploaded.url);
        Ok(uploaded.markdown)
    }

    async fn create_comment(&self, body: &str) -> Result<()> {
        let response = self
            .client
            .post(self.notes_url())
            .header(TOKEN_HEADER, &self.access_token)
            .json(&json!({ "body": body }))
            .send()
            .await?;

        read_success_body(SERVICE, response).await?;
        Ok(())
    }
}
