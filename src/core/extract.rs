use crate::domain::model::{Field, Record};
use serde_json::Value;

/// 記錄缺少欄位時填入的值
pub const MISSING_VALUE: &str = "N/A";

/// 將單個標量轉成 CSV 單元格文本。
///
/// 浮點數使用最短的可往返十進位表示（`Display` 不會產生科學記號），
/// 整數照原樣輸出，布林為 `true`/`false`，`null` 為空字串，
/// 巢狀結構以緊湊 JSON 表示。
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else if let Some(f) = n.as_f64() {
                f.to_string()
            } else {
                n.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// 依欄位順序取出一行，長度恆等於 `fields.len()`
pub fn extract_row(record: &Record, fields: &[Field]) -> Vec<String> {
    fields
        .iter()
        .map(|field| match record.get(field.key) {
            Some(value) => coerce_value(value),
            None => MISSING_VALUE.to_string(),
        })
        .collect()
}

pub fn header_row(fields: &[Field]) -> Vec<&'static str> {
    fields.iter().map(|field| field.label).collect()
}
