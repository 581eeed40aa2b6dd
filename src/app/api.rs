// Communication with the task board server. All four operations are one
// blocking HTTP round trip; every failure is normalized into ApiError so
// the UI only ever handles one error shape.
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::models::{NewTask, Status, Task};

#[derive(Debug, Error)]
pub enum ApiError {
    // The server answered with a non-2xx status; the message is what the
    // server put in its error body, or an operation-specific fallback.
    #[error("{0}")]
    Server(String),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

// GET /api/tasks answers { "data": [ ... ] }.
#[derive(Deserialize)]
struct TaskListBody {
    data: Vec<Task>,
}

// Failure bodies are { "error": "..." }, with the field optional.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Serialize)]
struct StatusPatch {
    status: Status,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // READ
    pub fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        tracing::debug!("fetching task list");
        let response = self.http.get(self.url("/api/tasks")).send()?;
        let response = check(response, "Failed to load tasks")?;
        let body: TaskListBody = response.json()?;
        Ok(body.data)
    }

    // CREATE
    pub fn create_task(&self, input: &NewTask) -> Result<(), ApiError> {
        tracing::debug!(title = %input.title, "creating task");
        let response = self
            .http
            .post(self.url("/api/tasks"))
            .json(input)
            .send()?;
        check(response, "Failed to create task")?;
        Ok(())
    }

    // UPDATE
    pub fn update_status(&self, id: i64, status: Status) -> Result<(), ApiError> {
        tracing::debug!(id, status = status.label(), "updating task status");
        let response = self
            .http
            .put(self.url(&format!("/api/tasks/{id}")))
            .json(&StatusPatch { status })
            .send()?;
        check(response, "Failed to update status")?;
        Ok(())
    }

    // DELETE
    pub fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        tracing::debug!(id, "deleting task");
        let response = self.http.delete(self.url(&format!("/api/tasks/{id}"))).send()?;
        check(response, "Failed to delete task")?;
        Ok(())
    }
}

// Turn a non-2xx response into ApiError::Server, pulling the message out of
// the body when the server supplied one.
fn check(response: Response, fallback: &str) -> Result<Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ApiError::Server(error_message(&body, fallback)))
}

fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_message_prefers_the_server_text() {
        assert_eq!(
            error_message(r#"{"error": "Title already taken"}"#, "Failed to create task"),
            "Title already taken"
        );
    }

    #[test]
    fn error_message_falls_back_when_body_is_malformed() {
        let fallback = "Failed to update status";
        assert_eq!(error_message("", fallback), fallback);
        assert_eq!(error_message("<html>502</html>", fallback), fallback);
        assert_eq!(error_message(r#"{"error": null}"#, fallback), fallback);
        assert_eq!(error_message(r#"{"detail": "nope"}"#, fallback), fallback);
    }

    #[test]
    fn urls_are_rooted_at_the_fixed_api_path() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.url("/api/tasks"), "http://localhost:3000/api/tasks");
        assert_eq!(
            client.url(&format!("/api/tasks/{}", 42)),
            "http://localhost:3000/api/tasks/42"
        );
    }
}
