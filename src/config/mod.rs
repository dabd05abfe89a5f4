pub mod cli;

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub global: GlobalConfig,
    pub grafana: GrafanaConfig,
    pub aliyun: AliyunConfig,
    pub gitlab: GitlabConfig,
    pub weixin_robot: WeixinRobotConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_export_file_path")]
    pub export_file_path: String,
    pub log_file: String,
    /// 每個 HTTP 請求的超時
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrafanaConfig {
    pub url: String,
    /// 數據源代理路徑，例如 `api/datasources/proxy/1/_msearch`
    pub slow_query_api: String,
    pub auth_token: String,
    #[serde(default = "default_index")]
    pub index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliyunConfig {
    #[serde(default = "default_rds_endpoint")]
    pub endpoint: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub db_instance_id: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitlabConfig {
    pub url: String,
    pub project_id: u64,
    pub issue_iid: u64,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeixinRobotConfig {
    pub webhook_url: String,
    /// 通知中「跳轉詳情」指向的議題頁面
    pub detail_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_interval")]
    pub interval: String,
    /// 只導出 query_time 大於此值（秒）的日誌
    #[serde(default = "default_query_time_threshold")]
    pub query_time_threshold: String,
    #[serde(default = "default_look_back_days")]
    pub look_back_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_cloud_stem")]
    pub cloud_provider_file_stem: String,
    #[serde(default = "default_dashboard_stem")]
    pub dashboard_file_stem: String,
}

fn default_export_file_path() -> String {
    "/tmp".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_index() -> String {
    "mysql_slow_log-*".to_string()
}

fn default_rds_endpoint() -> String {
    "https://rds.aliyuncs.com".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_interval() -> String {
    "1h".to_string()
}

fn default_query_time_threshold() -> String {
    "1".to_string()
}

fn default_look_back_days() -> u32 {
    1
}

fn default_cloud_stem() -> String {
    "service_mysql_slow_log_weekly".to_string()
}

fn default_dashboard_stem() -> String {
    "main_mysql_slow_log_weekly".to_string()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            query_time_threshold: default_query_time_threshold(),
            look_back_days: default_look_back_days(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            cloud_provider_file_stem: default_cloud_stem(),
            dashboard_file_stem: default_dashboard_stem(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EtlError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GITLAB_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid env var pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.global.timeout_seconds)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("global.export_file_path", &self.global.export_file_path)?;
        validation::validate_path("global.log_file", &self.global.log_file)?;
        validation::validate_positive_number("global.timeout_seconds", self.global.timeout_seconds, 1)?;

        validation::validate_url("grafana.url", &self.grafana.url)?;
        validation::validate_non_empty_string("grafana.slow_query_api", &self.grafana.slow_query_api)?;
        validation::validate_secret("grafana.auth_token", &self.grafana.auth_token)?;
        validation::validate_non_empty_string("grafana.index", &self.grafana.index)?;

        validation::validate_url("aliyun.endpoint", &self.aliyun.endpoint)?;
        validation::validate_secret("aliyun.access_key_id", &self.aliyun.access_key_id)?;
        validation::validate_secret("aliyun.access_key_secret", &self.aliyun.access_key_secret)?;
        validation::validate_non_empty_string("aliyun.db_instance_id", &self.aliyun.db_instance_id)?;
        validation::validate_range("aliyun.page_size", self.aliyun.page_size, 1, 100)?;

        validation::validate_url("gitlab.url", &self.gitlab.url)?;
        validation::validate_positive_number("gitlab.project_id", self.gitlab.project_id, 1)?;
        validation::validate_positive_number("gitlab.issue_iid", self.gitlab.issue_iid, 1)?;
        validation::validate_secret("gitlab.access_token", &self.gitlab.access_token)?;

        validation::validate_url("weixin_robot.webhook_url", &self.weixin_robot.webhook_url)?;
        validation::validate_url("weixin_robot.detail_url", &self.weixin_robot.detail_url)?;

        validation::validate_non_empty_string("query.interval", &self.query.interval)?;
        if self.query.query_time_threshold.trim().parse::<f64>().is_err() {
            return Err(EtlError::InvalidConfigValueError {
                field: "query.query_time_threshold".to_string(),
                value: self.query.query_time_threshold.clone(),
                reason: "Must be a number of seconds".to_string(),
            });
        }
        // 0 按 1 天處理
        validation::validate_range("query.look_back_days", self.query.look_back_days, 0, 366)?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::model::QueryWindow;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) const MINIMAL_TOML: &str = r#"
[global]
log_file = "/var/log/slowlog-export.log"

[grafana]
url = "https://grafana.example.com/"
slow_query_api = "/api/datasources/proxy/3/_msearch"
auth_token = "glsa_token"

[aliyun]
access_key_id = "LTAI-id"
access_key_secret = "secret"
db_instance_id = "rm-bp1"

[gitlab]
url = "https://gitlab.example.com"
project_id = 12
issue_iid = 9
access_token = "glpat-token"

[weixin_robot]
webhook_url = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=abc"
detail_url = "https://gitlab.example.com/op/public/issues/9"
"#;

    #[test]
    fn test_parse_minimal_config_applies_defaults() {
        let config = AppConfig::from_toml_str(MINIMAL_TOML).unwrap();

        assert_eq!(config.global.export_file_path, "/tmp");
        assert_eq!(config.global.timeout_seconds, 30);
        assert_eq!(config.grafana.index, "mysql_slow_log-*");
        assert_eq!(config.aliyun.endpoint, "https://rds.aliyuncs.com");
        assert_eq!(config.aliyun.page_size, 100);
        assert_eq!(config.query.look_back_days, 1);
        assert_eq!(config.query.interval, "1h");
        assert_eq!(config.export.dashboard_file_stem, "main_mysql_slow_log_weekly");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SLOWLOG_TEST_GITLAB_TOKEN", "from-env");

        let content = MINIMAL_TOML.replace("glpat-token", "${SLOWLOG_TEST_GITLAB_TOKEN}");
        let config = AppConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.gitlab.access_token, "from-env");

        std::env::remove_var("SLOWLOG_TEST_GITLAB_TOKEN");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let content = MINIMAL_TOML.replace("glsa_token", "${SLOWLOG_TEST_UNSET_VAR}");
        let config = AppConfig::from_toml_str(&content).unwrap();

        assert_eq!(config.grafana.auth_token, "${SLOWLOG_TEST_UNSET_VAR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let bad_url = MINIMAL_TOML.replace("https://grafana.example.com/", "grafana");
        assert!(AppConfig::from_toml_str(&bad_url).unwrap().validate().is_err());

        let mut config = AppConfig::from_toml_str(MINIMAL_TOML).unwrap();
        config.query.query_time_threshold = "slow".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_toml_str(MINIMAL_TOML).unwrap();
        config.aliyun.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_look_back_days_means_yesterday() {
        let content = format!("{}\n[query]\nlook_back_days = 0\n", MINIMAL_TOML);
        let config = AppConfig::from_toml_str(&content).unwrap();

        assert_eq!(config.query.look_back_days, 0);
        assert!(config.validate().is_ok());

        let now = Utc.with_ymd_and_hms(2026, 10, 19, 2, 0, 0).unwrap();
        let window = QueryWindow::trailing_days(now, config.query.look_back_days);
        assert_eq!(window.date_range_label(), "2026-10-18至2026-10-18");

        let mut config = config;
        config.query.look_back_days = 367;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let content = MINIMAL_TOML.replace("[gitlab]", "[gitlab_old]");
        assert!(matches!(
            AppConfig::from_toml_str(&content),
            Err(EtlError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.gitlab.project_id, 12);
        assert!(AppConfig::from_file("/nonexistent/config.toml").is_err());
    }
}
