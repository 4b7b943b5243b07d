//! Client for the remote harmony task service.
//!
//! Read-only: the service exposes task listing and detail lookup,
//! independent of the local repository. Responses are validated with the
//! same record validator the repository uses, so callers only ever see
//! well-formed tasks.

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{validate_record, HarmonyTask};

/// Default base URL of the task service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP client for the task service.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Fetch every task the service knows about.
    pub fn get_tasks(&self) -> Result<Vec<HarmonyTask>> {
        let records: Vec<Value> = self.get_json(&format!("{}/tasks", self.base_url))?;
        records.iter().map(validate_record).collect()
    }

    /// Fetch a single task by id.
    pub fn get_task(&self, task_id: &str) -> Result<HarmonyTask> {
        let record: Value = self.get_json(&format!("{}/tasks/{}", self.base_url, task_id))?;
        validate_record(&record)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "requesting tasks from remote service");
        let response = self.http.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RequestFailed(status.as_u16()));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}
