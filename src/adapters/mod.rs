// Adapters layer: HTTP clients for the slow-log sources, GitLab and the WeCom robot.

pub mod acs_signer;
pub mod aliyun;
pub mod gitlab;
pub mod grafana;
pub mod http;
pub mod weixin;

pub use aliyun::RdsClient;
pub use gitlab::GitlabClient;
pub use grafana::GrafanaClient;
pub use weixin::WeixinRobot;
