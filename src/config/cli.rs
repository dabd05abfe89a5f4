use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "slowlog-export", version)]
#[command(about = "Export MySQL slow-query logs to CSV, attach them to a GitLab issue and notify WeCom")]
pub struct CliArgs {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/config.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
