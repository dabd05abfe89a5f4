use crate::adapters::http::{parse_json, read_success_body};
use crate::config::AppConfig;
use crate::domain::ports::ChatNotifier;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const SERVICE: &str = "WeCom robot";

/// 企業微信群機器人
pub struct WeixinRobot {
    client: Client,
    webhook_url: String,
}

/// 機器人接口即使失敗也返回 HTTP 200，需檢查 errcode
#[derive(Debug, Deserialize)]
struct RobotResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

impl WeixinRobot {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            webhook_url: config.weixin_robot.webhook_url.clone(),
        }
    }
}

#[async_trait]
impl ChatNotifier for WeixinRobot {
    async fn notify(&self, markdown: &str) -> Result<()> {
        let payload = json!({
            "msgtype": "markdown",
            "markdown": { "content": markdown },
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        let body = read_success_body(SERVICE, response).await?;
        let parsed: RobotResponse = parse_json(SERVICE, &body)?;
        if parsed.errcode != 0 {
            return Err(EtlError::ResponseError {
                service: SERVICE,
                message: format!("errcode {}: {}", parsed.errcode, parsed.errmsg),
            });
        }
        Ok(())
    }
}
