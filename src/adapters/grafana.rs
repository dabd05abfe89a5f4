use crate::adapters::http::{join_url, parse_json, read_success_body};
use crate::config::AppConfig;
use crate::domain::model::{QueryWindow, Record, SlowLogReport};
use crate::domain::ports::ReportSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const SERVICE: &str = "Grafana";

/// 單次查詢最多返回的日誌數
const MAX_HITS: u32 = 10_000;

/// 經 Grafana 數據源代理查詢 Elasticsearch 中的自建庫慢日誌
pub struct GrafanaClient {
    client: Client,
    search_url: String,
    auth_token: String,
    index: String,
    interval: String,
    query_time_threshold: String,
}

#[derive(Debug, Deserialize)]
struct MultiSearchResponse {
    responses: Vec<SearchResponse>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Option<SearchHits>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    total: Option<HitsTotal>,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// ES 7+ 返回 `{"value": n}`，舊版本直接返回數字
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HitsTotal {
    Object { value: u64 },
    Count(u64),
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct DashboardHits {
    /// 命中總數（可能大於實際返回的條數）
    pub total: u64,
    pub records: Vec<Record>,
}

impl GrafanaClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            search_url: join_url(&config.grafana.url, &config.grafana.slow_query_api),
            auth_token: config.grafana.auth_token.clone(),
            index: config.grafana.index.clone(),
            interval: config.query.interval.clone(),
            query_time_threshold: config.query.query_time_threshold.clone(),
        }
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// `_msearch` 請求體：一行頭部、一行查詢，均以換行結尾
    pub fn build_request_body(&self, window: &QueryWindow) -> String {
        let header = json!({
            "search_type": "query_then_fetch",
            "ignore_unavailable": true,
            "index": self.index,
        });
        let query = json!({
            "size": MAX_HITS,
            "query": {
                "bool": {
                    "filter": [
                        {"range": {"@timestamp": {
                            "gte": window.start_millis(),
                            "lte": window.end_millis(),
                            "format": "epoch_millis",
                        }}},
                        {"range": {"query_time": {"gt": self.query_time_threshold}}},
                        {"query_string": {"analyze_wildcard": true, "query": "*"}},
                    ]
                }
            },
            "sort": [
                {"@timestamp": {"order": "desc", "unmapped_type": "boolean"}},
                {"_doc": {"order": "desc"}},
            ],
            "aggs": {
                "1": {
                    "date_histogram": {
                        "interval": self.interval,
                        "field": "@timestamp",
                        "min_doc_count": 0,
                        "extended_bounds": {
                            "min": window.start_millis(),
                            "max": window.end_millis(),
                        },
                        "format": "epoch_millis",
                    },
                    "aggs": {},
                }
            },
        });

        format!("{}\n{}\n", header, query)
    }

    pub async fn fetch_slow_logs(&self, window: &QueryWindow) -> Result<DashboardHits> {
        tracing::debug!("Making Grafana request to: {}", self.search_url);

        let response = self
            .client
            .post(&self.search_url)
            .bearer_auth(&self.auth_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(self.build_request_body(window))
            .send()
            .await?;

        let body = read_success_body(SERVICE, response).await?;
        parse_hits(&body)
    }
}

fn parse_hits(body: &str) -> Result<DashboardHits> {
    let parsed: MultiSearchResponse = parse_json(SERVICE, body)?;

    let first = parsed
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| EtlError::ResponseError {
            service: SERVICE,
            message: "empty responses array".to_string(),
        })?;

    if let Some(error) = first.error {
        return Err(EtlError::ResponseError {
            service: SERVICE,
            message: format!("search failed: {}", error),
        });
    }

    let hits = first.hits.ok_or_else(|| EtlError::ResponseError {
        service: SERVICE,
        message: "response has no hits".to_string(),
    })?;

    let records: Vec<Record> = hits.hits.into_iter().map(|hit| Record::from(hit.source)).collect();
    let total = match hits.total {
        Some(HitsTotal::Object { value }) | Some(HitsTotal::Count(value)) => value,
        None => records.len() as u64,
    };

    Ok(DashboardHits { total, records })
}

#[async_trait]
impl ReportSource for GrafanaClient {
    fn name(&self) -> &str {
        "grafana"
    }

    async fn fetch(&self, window: &QueryWindow) -> Result<SlowLogReport> {
        let hits = self.fetch_slow_logs(window).await?;
        if hits.total > hits.records.len() as u64 {
            tracing::warn!(
                "Grafana matched {} slow logs but returned {}; the report is truncated",
                hits.total,
                hits.records.len()
            );
        }
        Ok(SlowLogReport::Dashboard(hits.records))
    }
}
