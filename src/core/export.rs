use crate::core::extract::{extract_row, header_row};
use crate::domain::model::{ExportedFile, SlowLogReport};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// UTF-8 BOM，讓 Windows Excel 正確識別中文表頭
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// 去掉結尾的一個路徑分隔符
pub fn trim_trailing_separator(dir: &str) -> &str {
    dir.strip_suffix('/')
        .or_else(|| dir.strip_suffix(MAIN_SEPARATOR))
        .unwrap_or(dir)
}

pub fn report_file_name<Tz: TimeZone>(stem: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.csv", stem, at.format(FILE_TIMESTAMP_FORMAT))
}

/// 將報表寫成 CSV，返回文件的絕對路徑
pub fn export_report(report: &SlowLogReport, base_dir: &str, stem: &str) -> Result<ExportedFile> {
    export_report_at(report, base_dir, stem, &Local::now())
}

/// 同上，時間戳由調用方指定。
///
/// 同一秒內以相同前綴導出兩次會得到同一路徑，後一次覆蓋前一次。
pub fn export_report_at<Tz: TimeZone>(
    report: &SlowLogReport,
    base_dir: &str,
    stem: &str,
    at: &DateTime<Tz>,
) -> Result<ExportedFile>
where
    Tz::Offset: std::fmt::Display,
{
    if report.is_empty() {
        return Err(EtlError::NoDataError {
            report: report.source_name().to_string(),
        });
    }

    let dir = ensure_dir(trim_trailing_separator(base_dir))?;
    let stem = if stem.is_empty() {
        report.fallback_stem()
    } else {
        stem
    };
    let path = dir.join(report_file_name(stem, at));
    let display_path = path.display().to_string();

    tracing::debug!("Writing {} records to {}", report.len(), display_path);

    let mut file = File::create(&path).map_err(|source| EtlError::CreateFileError {
        path: display_path.clone(),
        source,
    })?;
    file.write_all(UTF8_BOM)
        .map_err(|e| EtlError::HeaderWriteError {
            path: display_path.clone(),
            source: csv::Error::from(e),
        })?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(file);

    let fields = report.fields();
    writer
        .write_record(header_row(fields))
        .map_err(|source| EtlError::HeaderWriteError {
            path: display_path.clone(),
            source,
        })?;

    for (index, record) in report.records().iter().enumerate() {
        writer
            .write_record(extract_row(record, fields))
            .map_err(|source| EtlError::RowWriteError {
                path: display_path.clone(),
                row: index + 1,
                source,
            })?;
    }

    writer.flush().map_err(|e| EtlError::RowWriteError {
        path: display_path.clone(),
        row: report.len(),
        source: csv::Error::from(e),
    })?;

    Ok(ExportedFile { path })
}

fn ensure_dir(dir: &str) -> Result<PathBuf> {
    let dir = if dir.is_empty() { "/" } else { dir };
    fs::create_dir_all(dir).map_err(|source| EtlError::CreateDirError {
        path: dir.to_string(),
        source,
    })?;
    Path::new(dir)
        .canonicalize()
        .map_err(|source| EtlError::CreateDirError {
            path: dir.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;
    use serde_json::json;
    use tempfile::TempDir;

    fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::Object(map) => Record::from(map),
                _ => panic!("test records must be objects"),
            })
            .collect()
    }

    fn fixed_time() -> DateTime<chrono::FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-19T09:30:05+08:00").unwrap()
    }

    #[test]
    fn test_trim_trailing_separator() {
        assert_eq!(trim_trailing_separator("/tmp/export/"), "/tmp/export");
        assert_eq!(trim_trailing_separator("/tmp/export//"), "/tmp/export/");
        assert_eq!(trim_trailing_separator("/tmp/export"), "/tmp/export");
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name("main_mysql_slow_log_weekly", &fixed_time()),
            "main_mysql_slow_log_weekly_20261019093005.csv"
        );
    }

    #[test]
    fn test_export_writes_bom_header_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let report = SlowLogReport::CloudProvider(records(vec![
            json!({"DBName": "orders", "QueryTimes": 12, "SQLText": "select * from t where a = \"x\", b = 1"}),
            json!({"DBName": "users", "LockTimes": 0}),
        ]));

        let exported = export_report_at(
            &report,
            temp_dir.path().to_str().unwrap(),
            "service_mysql_slow_log_weekly",
            &fixed_time(),
        )
        .unwrap();

        assert!(exported.path.is_absolute());
        assert!(exported
            .path
            .ends_with("service_mysql_slow_log_weekly_20261019093005.csv"));

        let bytes = fs::read(&exported.path).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);
        let content = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "执行开始时间,数据库,锁等待时间,查询耗时,解析行数,返回行数,SQL语句,数据库客户端及地址,查询时间（毫秒）,SQL唯一标识"
        );
        assert_eq!(
            lines[1],
            r#"N/A,orders,N/A,12,N/A,N/A,"select * from t where a = ""x"", b = 1",N/A,N/A,N/A"#
        );
        assert_eq!(lines[2], "N/A,users,0,N/A,N/A,N/A,N/A,N/A,N/A,N/A");
    }

    #[test]
    fn test_export_exact_bytes_single_column() {
        let temp_dir = TempDir::new().unwrap();
        let exported = export_report_at(
            &SlowLogReport::Dashboard(records(vec![
                json!({"db_name": "x"}),
                json!({"db_name": "y"}),
            ])),
            temp_dir.path().to_str().unwrap(),
            "main",
            &fixed_time(),
        )
        .unwrap();

        let content = fs::read_to_string(&exported.path).unwrap();
        let mut expected = String::from("\u{feff}");
        expected.push_str("时间戳,数据库,数据库用户名,锁等待时间,查询耗时,扫描行数,返回行数,SQL语句,日志消息\n");
        expected.push_str("N/A,x,N/A,N/A,N/A,N/A,N/A,N/A,N/A\n");
        expected.push_str("N/A,y,N/A,N/A,N/A,N/A,N/A,N/A,N/A\n");
        assert_eq!(content, expected);
    }

    #[test]
    fn test_export_creates_missing_directory_with_trailing_slash() {
        let temp_dir = TempDir::new().unwrap();
        let nested = format!("{}/a/b/", temp_dir.path().display());
        let report = SlowLogReport::Dashboard(records(vec![json!({"message": "m"})]));

        let exported = export_report_at(&report, &nested, "main", &fixed_time()).unwrap();

        assert!(exported.path.exists());
        assert!(temp_dir.path().join("a/b").is_dir());
    }

    #[test]
    fn test_empty_report_is_error_and_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out");

        let result = export_report(
            &SlowLogReport::Dashboard(vec![]),
            target.to_str().unwrap(),
            "main",
        );

        assert!(matches!(result, Err(EtlError::NoDataError { .. })));
        assert!(!target.exists());
    }

    #[test]
    fn test_empty_stem_uses_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let report = SlowLogReport::CloudProvider(records(vec![json!({"DBName": "d"})]));

        let exported =
            export_report_at(&report, temp_dir.path().to_str().unwrap(), "", &fixed_time()).unwrap();

        assert!(exported
            .path
            .ends_with("unknown_service_mysql_slow_log_20261019093005.csv"));
    }

    #[test]
    fn test_same_second_export_overwrites_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let first = SlowLogReport::Dashboard(records(vec![
            json!({"db_name": "first"}),
            json!({"db_name": "first"}),
        ]));
        let second = SlowLogReport::Dashboard(records(vec![json!({"db_name": "second"})]));

        let a = export_report_at(&first, dir, "main", &fixed_time()).unwrap();
        let b = export_report_at(&second, dir, "main", &fixed_time()).unwrap();

        assert_eq!(a.path, b.path);
        let content = fs::read_to_string(&b.path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("second"));
        assert!(!content.contains("first"));
        assert_eq!(fs::read_dir(dir).unwrap().count(), 1);
    }

    #[test]
    fn test_export_into_file_path_fails_with_dir_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let report = SlowLogReport::Dashboard(records(vec![json!({"db_name": "x"})]));

        let result = export_report(&report, blocker.join("sub").to_str().unwrap(), "main");

        assert!(matches!(result, Err(EtlError::CreateDirError { .. })));
    }

    #[test]
    fn test_target_path_taken_by_directory_fails_with_file_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("main_20261019093005.csv")).unwrap();
        let report = SlowLogReport::Dashboard(records(vec![json!({"db_name": "x"})]));

        let result = export_report_at(&report, temp_dir.path().to_str().unwrap(), "main", &fixed_time());

        match result {
            Err(EtlError::CreateFileError { path, .. }) => {
                assert!(path.ends_with("main_20261019093005.csv"))
            }
            other => panic!("expected CreateFileError, got {:?}", other),
        }
    }
}
