use crate::config::AppConfig;
use crate::core::export::export_report;
use crate::domain::model::{ExportedFile, QueryWindow, RunSummary, SlowLogReport};
use crate::domain::ports::{ChatNotifier, IssueTracker, ReportSource};
use crate::utils::error::{EtlError, Result, Stage};
use chrono::{DateTime, Utc};

/// 組裝議題評論，`cloud_ref` 與 `dashboard_ref` 為上傳返回的 markdown 引用
pub fn compose_comment(window: &QueryWindow, cloud_ref: &str, dashboard_ref: &str) -> String {
    format!(
        "## {} MySQL慢日志数据导出\n> 阿里云RDS服务商：{}\n\n> 阿里云自建数据库： {}\n",
        window.date_range_label(),
        cloud_ref,
        dashboard_ref
    )
}

pub fn compose_notification(detail_url: &str) -> String {
    format!(
        "<font color=\"warning\">【生产】MySQL慢查询数据报表已更新</font>\n> [跳转详情]({})\n",
        detail_url
    )
}

/// 抓取 → 導出 → 上傳 → 評論 → 通知，任一步失敗即中止
pub struct EtlEngine<'a> {
    config: &'a AppConfig,
    cloud_source: &'a dyn ReportSource,
    dashboard_source: &'a dyn ReportSource,
    tracker: &'a dyn IssueTracker,
    notifier: &'a dyn ChatNotifier,
}

impl<'a> EtlEngine<'a> {
    pub fn new(
        config: &'a AppConfig,
        cloud_source: &'a dyn ReportSource,
        dashboard_source: &'a dyn ReportSource,
        tracker: &'a dyn IssueTracker,
        notifier: &'a dyn ChatNotifier,
    ) -> Self {
        Self {
            config,
            cloud_source,
            dashboard_source,
            tracker,
            notifier,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_at(Utc::now()).await
    }

    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        let window = QueryWindow::trailing_days(now, self.config.query.look_back_days);
        tracing::info!(
            "🚀 Exporting MySQL slow logs for {}",
            window.date_range_label()
        );

        // Fetch：先自建，後服務商
        let dashboard = self.fetch(self.dashboard_source, &window).await?;
        let cloud = self.fetch(self.cloud_source, &window).await?;

        // Export：先服務商，後自建
        let files = [
            (&cloud, self.config.export.cloud_provider_file_stem.as_str()),
            (&dashboard, self.config.export.dashboard_file_stem.as_str()),
        ]
        .into_iter()
        .map(|(report, stem)| self.export(report, stem))
        .collect::<Result<Vec<_>>>()?;
        tracing::info!("✅ Wrote {} CSV reports", files.len());

        // Upload
        let mut upload_refs = Vec::with_capacity(files.len());
        for file in &files {
            let reference = self
                .tracker
                .upload_file(&file.path)
                .await
                .map_err(|e| e.at_stage(Stage::Upload, file.path.display().to_string()))?;
            upload_refs.push(reference);
        }
        tracing::info!("✅ Uploaded {} reports to GitLab", upload_refs.len());

        // Comment
        let comment = compose_comment(&window, &upload_refs[0], &upload_refs[1]);
        self.tracker
            .create_comment(&comment)
            .await
            .map_err(|e| e.at_stage(Stage::Comment, "gitlab issue"))?;
        tracing::info!("✅ Commented on GitLab issue {}", self.config.gitlab.issue_iid);

        // Notify
        let message = compose_notification(&self.config.weixin_robot.detail_url);
        self.notifier
            .notify(&message)
            .await
            .map_err(|e| e.at_stage(Stage::Notify, "wecom robot"))?;
        tracing::info!("✅ WeCom robot notified");

        Ok(RunSummary {
            window,
            files,
            upload_refs,
            comment,
        })
    }

    async fn fetch(&self, source: &dyn ReportSource, window: &QueryWindow) -> Result<SlowLogReport> {
        tracing::info!("📡 Fetching slow logs from {}", source.name());
        let report = source
            .fetch(window)
            .await
            .map_err(|e| e.at_stage(Stage::Fetch, source.name()))?;
        tracing::info!("Fetched {} slow logs from {}", report.len(), source.name());
        Ok(report)
    }

    fn export(&self, report: &SlowLogReport, stem: &str) -> Result<ExportedFile> {
        export_report(report, &self.config.global.export_file_path, stem)
            .map_err(|e: EtlError| e.at_stage(Stage::Export, report.source_name()))
            .inspect(|file| tracing::info!("📁 {} report saved to {}", report.source_name(), file.path.display()))
    }
}
