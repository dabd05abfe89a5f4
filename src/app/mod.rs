use crate::adapters::{http, GitlabClient, GrafanaClient, RdsClient, WeixinRobot};
use crate::config::AppConfig;
use crate::core::etl::EtlEngine;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;

/// 以真實的 HTTP 客戶端執行一次完整導出
pub async fn run(config: &AppConfig) -> Result<RunSummary> {
    let client = http::build_client(config.request_timeout())?;

    let rds = RdsClient::new(client.clone(), config)?;
    let grafana = GrafanaClient::new(client.clone(), config);
    let gitlab = GitlabClient::new(client.clone(), config);
    let robot = WeixinRobot::new(client, config);

    EtlEngine::new(config, &rds, &grafana, &gitlab, &robot)
        .run()
        .await
}
