//! Online tracker talking to the tracking service's REST API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use urlencoding::encode;

use super::{new_run_id, LogPayload, Result, Run, RunState, Tracker, TrackingError};

/// Creates runs through `POST {base}/api/v1/projects/{project}/runs`.
#[derive(Debug, Clone)]
pub struct HttpTracker {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    entity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunCreated {
    id: String,
}

impl HttpTracker {
    pub fn new(base_url: &str, api_key: Option<String>, entity: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("entity-tracker/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            entity,
        })
    }
}

fn authorize(request: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key {
        Some(key) => request.bearer_auth(key),
        None => request,
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TrackingError::Status { status, body })
}

#[async_trait]
impl Tracker for HttpTracker {
    #[instrument(skip(self))]
    async fn init(&self, project: &str) -> Result<Box<dyn Run>> {
        let url = format!("{}/api/v1/projects/{}/runs", self.base_url, encode(project));
        let body = json!({
            "name": new_run_id(),
            "entity": self.entity,
            "started_at": Utc::now().to_rfc3339(),
        });
        let request = authorize(self.client.post(url).json(&body), self.api_key.as_deref());
        let created: RunCreated = check(request.send().await?).await?.json().await?;
        info!(run = %created.id, %project, "opened tracking run");
        Ok(Box::new(HttpRun {
            tracker: self.clone(),
            state: RunState::new(created.id),
        }))
    }
}

struct HttpRun {
    tracker: HttpTracker,
    state: RunState,
}

impl HttpRun {
    fn run_url(&self, action: &str) -> String {
        format!(
            "{}/api/v1/runs/{}/{action}",
            self.tracker.base_url,
            encode(&self.state.id)
        )
    }

    async fn post(&self, action: &str, body: serde_json::Value) -> Result<()> {
        let request = authorize(
            self.tracker.client.post(self.run_url(action)).json(&body),
            self.tracker.api_key.as_deref(),
        );
        check(request.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl Run for HttpRun {
    fn id(&self) -> &str {
        &self.state.id
    }

    async fn log(&mut self, payload: LogPayload) -> Result<()> {
        let step = self.state.next_step()?;
        let body = json!({
            "step": step,
            "timestamp": Utc::now().to_rfc3339(),
            "data": payload,
        });
        self.post("history", body).await?;
        info!(run = %self.state.id, step, "logged payload");
        Ok(())
    }

    async fn finish(&mut self, exit_code: i32) -> Result<()> {
        self.state.mark_finished()?;
        let body = json!({
            "exit_code": exit_code,
            "finished_at": Utc::now().to_rfc3339(),
        });
        self.post("finish", body).await?;
        info!(run = %self.state.id, exit_code, "finished tracking run");
        Ok(())
    }
}
