//! Alibaba Cloud OpenAPI V3 signature (`ACS3-HMAC-SHA256`) for RPC-style calls.
//!
//! Parameters travel in the query string and the body is empty, so the
//! signed payload hash is always the SHA-256 of the empty string.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const ALGORITHM: &str = "ACS3-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct AcsCredentials {
    pub access_key_id: String,
    pub access_key_secret: String,
}

/// 一次調用的輸入，`date` 為 UTC `%Y-%m-%dT%H:%M:%SZ`
#[derive(Debug, Clone)]
pub struct RpcCall<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub action: &'a str,
    pub version: &'a str,
    pub params: &'a BTreeMap<String, String>,
    pub date: &'a str,
    pub nonce: &'a str,
}

#[derive(Debug, Clone)]
pub struct SignedRpcCall {
    /// 已編碼、已排序的查詢字串，直接拼在 `?` 之後
    pub query: String,
    /// 需要附加的請求頭（host 由 HTTP 客戶端自行設置）
    pub headers: Vec<(&'static str, String)>,
}

/// RFC 3986 編碼：僅保留 `A-Z a-z 0-9 - _ . ~`
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

pub fn sign(credentials: &AcsCredentials, call: &RpcCall<'_>) -> SignedRpcCall {
    let query = canonical_query(call.params);
    let payload_hash = sha256_hex(b"");

    // 必須按名稱排序
    let signed: [(&'static str, &str); 6] = [
        ("host", call.host),
        ("x-acs-action", call.action),
        ("x-acs-content-sha256", &payload_hash),
        ("x-acs-date", call.date),
        ("x-acs-signature-nonce", call.nonce),
        ("x-acs-version", call.version),
    ];

    let canonical_headers: String = signed
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
        .collect();
    let signed_headers = signed
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n/\n{}\n{}\n{}\n{}",
        call.method, query, canonical_headers, signed_headers, payload_hash
    );
    let string_to_sign = format!(
        "{}\n{}",
        ALGORITHM,
        sha256_hex(canonical_request.as_bytes())
    );

    // HMAC 接受任意長度的密鑰
    let mut mac = HmacSha256::new_from_slice(credentials.access_key_secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let authorization = format!(
        "{} Credential={},SignedHeaders={},Signature={}",
        ALGORITHM, credentials.access_key_id, signed_headers, signature
    );

    let mut headers: Vec<(&'static str, String)> = signed
        .iter()
        .filter(|(name, _)| *name != "host")
        .map(|(name, value)| (*name, value.to_string()))
        .collect();
    headers.push(("authorization", authorization));

    SignedRpcCall { query, headers }
}
