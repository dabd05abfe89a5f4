pub mod etl;
pub mod export;
pub mod extract;
pub mod window;

pub use crate::domain::model::{ExportedFile, Field, QueryWindow, Record, RunSummary, SlowLogReport};
pub use crate::domain::ports::{ChatNotifier, IssueTracker, ReportSource};
pub use crate::utils::error::Result;
