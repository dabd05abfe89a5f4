use crate::adapters::acs_signer::{self, AcsCredentials, RpcCall};
use crate::adapters::http::{parse_json, read_success_body};
use crate::config::AppConfig;
use crate::domain::model::{QueryWindow, Record, SlowLogReport};
use crate::domain::ports::ReportSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

const SERVICE: &str = "Aliyun RDS";
const ACTION: &str = "DescribeSlowLogRecords";
const API_VERSION: &str = "2014-08-15";

/// 一頁慢日誌
#[derive(Debug, Clone, Default)]
pub struct SlowLogPage {
    pub total_record_count: u64,
    pub records: Vec<Record>,
}

/// 按頁獲取慢日誌的能力，分頁邏輯與 HTTP 細節分離
#[async_trait]
pub trait SlowLogPageFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        window: &QueryWindow,
        page_number: u32,
        page_size: u32,
    ) -> Result<SlowLogPage>;
}

/// 總頁數，向上取整
pub fn page_count(total_record_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_record_count.div_ceil(u64::from(page_size))
}

/// 順序拉取全部分頁：先取第 1 頁得到總數，再依序取 2..=總頁數。
/// 任何一頁失敗都直接返回錯誤，不使用已取到的部分結果。
pub async fn fetch_all_pages<F>(fetcher: &F, window: &QueryWindow, page_size: u32) -> Result<Vec<Record>>
where
    F: SlowLogPageFetcher + ?Sized,
{
    let first = fetcher.fetch_page(window, 1, page_size).await?;
    let total_pages = page_count(first.total_record_count, page_size);
    tracing::debug!(
        "RDS reports {} slow logs across {} pages",
        first.total_record_count,
        total_pages
    );

    let mut records = first.records;
    let mut page_number: u32 = 2;
    while u64::from(page_number) <= total_pages {
        let page = fetcher.fetch_page(window, page_number, page_size).await?;
        records.extend(page.records);
        page_number += 1;
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSlowLogRecordsResponse {
    #[serde(default)]
    total_record_count: u64,
    #[serde(default)]
    items: SlowRecordItems,
}

#[derive(Debug, Default, Deserialize)]
struct SlowRecordItems {
    #[serde(rename = "SQLSlowRecord", default)]
    sql_slow_record: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// 阿里雲 RDS 服務商慢日誌接口
pub struct RdsClient {
    client: Client,
    endpoint: Url,
    host: String,
    credentials: AcsCredentials,
    db_instance_id: String,
    page_size: u32,
}

impl RdsClient {
    pub fn new(client: Client, config: &AppConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.aliyun.endpoint).map_err(|e| {
            EtlError::InvalidConfigValueError {
                field: "aliyun.endpoint".to_string(),
                value: config.aliyun.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(EtlError::InvalidConfigValueError {
                    field: "aliyun.endpoint".to_string(),
                    value: config.aliyun.endpoint.clone(),
                    reason: "URL has no host".to_string(),
                })
            }
        };

        Ok(Self {
            client,
            endpoint,
            host,
            credentials: AcsCredentials {
                access_key_id: config.aliyun.access_key_id.clone(),
                access_key_secret: config.aliyun.access_key_secret.clone(),
            },
            db_instance_id: config.aliyun.db_instance_id.clone(),
            page_size: config.aliyun.page_size,
        })
    }

    fn page_params(&self, window: &QueryWindow, page_number: u32, page_size: u32) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("DBInstanceId".to_string(), self.db_instance_id.clone());
        params.insert("StartTime".to_string(), window.start_utc_minutes());
        params.insert("EndTime".to_string(), window.end_utc_minutes());
        params.insert("PageSize".to_string(), page_size.to_string());
        params.insert("PageNumber".to_string(), page_number.to_string());
        params
    }

    pub async fn fetch_slow_logs(&self, window: &QueryWindow) -> Result<Vec<Record>> {
        fetch_all_pages(self, window, self.page_size).await
    }
}

#[async_trait]
impl SlowLogPageFetcher for RdsClient {
    async fn fetch_page(
        &self,
        window: &QueryWindow,
        page_number: u32,
        page_size: u32,
    ) -> Result<SlowLogPage> {
        let params = self.page_params(window, page_number, page_size);
        let date = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let nonce = uuid::Uuid::new_v4().simple().to_string();

        let signed = acs_signer::sign(
            &self.credentials,
            &RpcCall {
                method: "POST",
                host: &self.host,
                action: ACTION,
                version: API_VERSION,
                params: &params,
                date: &date,
                nonce: &nonce,
            },
        );

        let mut url = self.endpoint.clone();
        url.set_path("/");
        url.set_query(Some(&signed.query));

        tracing::debug!("Requesting RDS slow logs page {} (size {})", page_number, page_size);

        let mut request = self.client.post(url);
        for (name, value) in &signed.headers {
            request = request.header(*name, value);
        }
        let response = request.send().await?;

        let body = read_success_body(SERVICE, response).await?;
        let parsed: DescribeSlowLogRecordsResponse = parse_json(SERVICE, &body)?;

        Ok(SlowLogPage {
            total_record_count: parsed.total_record_count,
            records: parsed
                .items
                .sql_slow_record
                .into_iter()
                .map(Record::from)
                .collect(),
        })
    }
}

#[async_trait]
impl ReportSource for RdsClient {
    fn name(&self) -> &str {
        "aliyun-rds"
    }

    async fn fetch(&self, window: &QueryWindow) -> Result<SlowLogReport> {
        let records = self.fetch_slow_logs(window).await?;
        Ok(SlowLogReport::CloudProvider(records))
    }
}
