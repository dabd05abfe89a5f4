use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// 一筆慢查詢日誌：鍵值對，值為標量
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            data: map.into_iter().collect(),
        }
    }
}

/// 來源欄位鍵與 CSV 中文列名的對應
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
}

impl Field {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// 一次執行中某個來源的全部慢日誌
#[derive(Debug, Clone, PartialEq)]
pub enum SlowLogReport {
    /// Grafana/Elasticsearch 自建庫日誌
    Dashboard(Vec<Record>),
    /// 阿里雲 RDS 服務商日誌
    CloudProvider(Vec<Record>),
}

impl SlowLogReport {
    pub fn records(&self) -> &[Record] {
        match self {
            SlowLogReport::Dashboard(records) | SlowLogReport::CloudProvider(records) => records,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self {
            SlowLogReport::Dashboard(_) => crate::domain::fields::DASHBOARD_FIELDS,
            SlowLogReport::CloudProvider(_) => crate::domain::fields::CLOUD_PROVIDER_FIELDS,
        }
    }

    /// 未指定文件名時使用的前綴
    pub fn fallback_stem(&self) -> &'static str {
        match self {
            SlowLogReport::Dashboard(_) => "unknown_mysql_slow_query",
            SlowLogReport::CloudProvider(_) => "unknown_service_mysql_slow_log",
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            SlowLogReport::Dashboard(_) => "grafana",
            SlowLogReport::CloudProvider(_) => "aliyun-rds",
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
}

/// GitLab 上傳接口的返回
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub url: String,
    pub markdown: String,
}

/// 查詢時間窗口：[start 當日 00:00:00, 昨日 23:59:59]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// 一次完整執行的產出
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub window: QueryWindow,
    pub files: Vec<ExportedFile>,
    pub upload_refs: Vec<String>,
    pub comment: String,
}
