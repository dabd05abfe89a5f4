use std::fmt;
use thiserror::Error;

/// 管道階段，用於錯誤上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Export,
    Upload,
    Comment,
    Notify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Export => "export",
            Stage::Upload => "upload",
            Stage::Comment => "comment",
            Stage::Notify => "notify",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    HttpStatusError {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {service}: {message}")]
    ResponseError {
        service: &'static str,
        message: String,
    },

    #[error("No data to export for {report}")]
    NoDataError { report: String },

    #[error("Failed to create export directory {path}: {source}")]
    CreateDirError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create export file {path}: {source}")]
    CreateFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV header to {path}: {source}")]
    HeaderWriteError {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write CSV row {row} to {path}: {source}")]
    RowWriteError {
        path: String,
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("{stage} stage failed ({target}): {source}")]
    StageError {
        stage: Stage,
        target: String,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    pub fn at_stage(self, stage: Stage, target: impl Into<String>) -> Self {
        EtlError::StageError {
            stage,
            target: target.into(),
            source: Box::new(self),
        }
    }

    /// 失敗所在的管道階段（配置錯誤時為 None）
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EtlError::StageError { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// 去掉階段包裝後的原始錯誤
    pub fn root(&self) -> &EtlError {
        match self {
            EtlError::StageError { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root() {
            EtlError::ApiError(_) => "Check network connectivity and the configured endpoints",
            EtlError::HttpStatusError { status: 401 | 403, .. } => {
                "Check the access tokens and keys in the configuration file"
            }
            EtlError::HttpStatusError { .. } | EtlError::ResponseError { .. } => {
                "Inspect the upstream service; the response body is included above"
            }
            EtlError::NoDataError { .. } => {
                "Verify the look-back window and query threshold actually match slow-log entries"
            }
            EtlError::CreateDirError { .. }
            | EtlError::CreateFileError { .. }
            | EtlError::HeaderWriteError { .. }
            | EtlError::RowWriteError { .. }
            | EtlError::IoError(_) => "Check permissions and free space of the export directory",
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => "Fix the configuration file and run again",
            EtlError::StageError { .. } => "Re-run after fixing the failing stage",
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
