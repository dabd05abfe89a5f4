use crate::domain::model::{QueryWindow, SlowLogReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// 慢日誌來源
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// 日誌與錯誤上下文中使用的名稱
    fn name(&self) -> &str;

    async fn fetch(&self, window: &QueryWindow) -> Result<SlowLogReport>;
}

/// 議題追蹤系統：上傳附件並在議題下評論
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// 上傳文件，返回可嵌入評論的 markdown 引用
    async fn upload_file(&self, path: &Path) -> Result<String>;

    async fn create_comment(&self, body: &str) -> Result<()>;
}

/// 群聊機器人
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn notify(&self, markdown: &str) -> Result<()>;
}
