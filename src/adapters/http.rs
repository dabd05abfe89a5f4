use crate::utils::error::{EtlError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!("slowlog-export/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// 讀取響應體，非 2xx 時連同響應體一起返回錯誤
pub async fn read_success_body(service: &'static str, response: Response) -> Result<String> {
    let status = response.status();
    tracing::debug!("📡 {} response status: {}", service, status);

    let body = response.text().await?;
    if !status.is_success() {
        return Err(EtlError::HttpStatusError {
            service,
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

pub fn parse_json<T: DeserializeOwned>(service: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| EtlError::ResponseError {
        service,
        message: format!("malformed JSON: {}", e),
    })
}

/// 拼接基礎 URL 與路徑，保證中間恰好一個 `/`
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", base, path)
}
