//! Thin typed wrapper over the EquipViz HTTP API.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response, multipart};
use serde::Deserialize;

/// Aggregates attached to a successful upload.
#[derive(Debug, Deserialize)]
pub struct Summary {
    pub total_count: i64,
    pub avg_flowrate: Option<f64>,
    pub avg_pressure: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub equipment_types: BTreeMap<String, i64>,
}

/// Response to an upload.
#[derive(Debug, Deserialize)]
pub struct UploadResult {
    pub id: i32,
    pub name: String,
    pub uploaded_at: String,
    pub summary: Summary,
}

/// A stored dataset record.
#[derive(Debug, Deserialize)]
pub struct DatasetRecord {
    pub id: i32,
    pub name: String,
    pub uploaded_at: String,
    pub file_size: i64,
    pub total_count: i64,
    pub avg_flowrate: Option<f64>,
    pub avg_pressure: Option<f64>,
    pub avg_temperature: Option<f64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct LoginResult {
    token: String,
}

pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub fn register(&self, username: &str, password: &str) -> Result<()> {
        let res = self
            .http
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .context("Could not reach the server")?;
        let _ = check(res)?;
        Ok(())
    }

    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .context("Could not reach the server")?;
        let result: LoginResult = check(res)?.json().context("Malformed login response")?;
        Ok(result.token)
    }

    pub fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResult> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .context("Failed to build multipart field")?;
        let form = multipart::Form::new().part("file", part);

        let res = self
            .http
            .post(self.url("/datasets/upload"))
            .multipart(form)
            .send()
            .context("Could not reach the server")?;
        check(res)?.json().context("Malformed upload response")
    }

    pub fn list(&self) -> Result<Vec<DatasetRecord>> {
        let res = self
            .http
            .get(self.url("/datasets"))
            .send()
            .context("Could not reach the server")?;
        check(res)?.json().context("Malformed dataset list")
    }

    pub fn get(&self, id: i32) -> Result<DatasetRecord> {
        let res = self
            .http
            .get(self.url(&format!("/datasets/{id}")))
            .send()
            .context("Could not reach the server")?;
        check(res)?.json().context("Malformed dataset record")
    }

    pub fn download_report(&self, id: i32, token: &str) -> Result<Vec<u8>> {
        let res = self
            .http
            .get(self.url(&format!("/datasets/{id}/report")))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .context("Could not reach the server")?;
        let bytes = check(res)?.bytes().context("Failed to read report body")?;
        Ok(bytes.to_vec())
    }
}

/// Turn a non-success response into the server's `{error}` message.
fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let message = res
        .json::<ErrorBody>()
        .map(|b| b.error)
        .unwrap_or_else(|_| status_fallback(status));
    bail!("{message}")
}

fn status_fallback(status: StatusCode) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "Invalid username or password".to_string(),
        StatusCode::NOT_FOUND => "Not found".to_string(),
        other => format!("Request failed with status {other}"),
    }
}
