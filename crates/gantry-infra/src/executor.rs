//! JenkinsExecutor -- concrete [`BuildExecutor`] for Jenkins.
//!
//! Posts the dispatch form to `{url}/job/{job}/buildWithParameters` with
//! HTTP basic auth. The response is returned as-is; deciding what counts as
//! success is the dispatcher's job.
//!
//! The API token is wrapped in [`secrecy::SecretString`] and only exposed
//! while building the request.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use gantry_core::port::executor::{BuildExecutor, ExecutorResponse};
use gantry_types::config::ExecutorConfig;
use gantry_types::error::{ConfigError, DispatchError};
use gantry_types::workflow::DispatchRequest;

/// Jenkins build executor.
///
/// Does not derive Debug; the token must never reach log output.
pub struct JenkinsExecutor {
    client: reqwest::Client,
    base_url: String,
    job: String,
    username: String,
    api_token: Option<SecretString>,
}

impl JenkinsExecutor {
    /// Build an executor from config. Fails when no URL is configured.
    pub fn from_config(config: &ExecutorConfig) -> Result<Self, ConfigError> {
        let base_url = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ConfigError::Invalid(
                    "executor.url is required (set [executor].url or JENKINS_URL)".to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            job: config.job.clone(),
            username: config.username.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// Full trigger endpoint URL.
    pub fn trigger_url(&self) -> String {
        format!("{}/job/{}/buildWithParameters", self.base_url, self.job)
    }
}

impl BuildExecutor for JenkinsExecutor {
    async fn trigger(&self, request: &DispatchRequest) -> Result<ExecutorResponse, DispatchError> {
        let fields = request.to_form_fields()?;
        let url = self.trigger_url();

        let mut builder = self.client.post(&url).form(&fields);
        if let Some(token) = &self.api_token {
            builder = builder.basic_auth(&self.username, Some(token.expose_secret()));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DispatchError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %url, status, error = %e, "failed to read executor response body");
                format!("<unreadable body: {e}>")
            }
        };
        tracing::debug!(url = %url, status, "build executor responded");

        Ok(ExecutorResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::{Form, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::json;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[derive(Debug, Clone)]
    struct Captured {
        authorization: Option<String>,
        form: HashMap<String, String>,
    }

    #[derive(Clone)]
    struct StubState {
        status: StatusCode,
        body: &'static str,
        captured: Arc<Mutex<Vec<Captured>>>,
    }

    struct StubJenkins {
        base_url: String,
        captured: Arc<Mutex<Vec<Captured>>>,
        shutdown: Option<oneshot::Sender<()>>,
    }

    impl Drop for StubJenkins {
        fn drop(&mut self) {
            if let Some(tx) = self.shutdown.take() {
                let _ = tx.send(());
            }
        }
    }

    async fn record(
        State(state): State<StubState>,
        headers: HeaderMap,
        Form(form): Form<HashMap<String, String>>,
    ) -> (StatusCode, &'static str) {
        state.captured.lock().unwrap().push(Captured {
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            form,
        });
        (state.status, state.body)
    }

    async fn spawn_stub(status: StatusCode, body: &'static str) -> StubJenkins {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status,
            body,
            captured: Arc::clone(&captured),
        };
        let app = Router::new()
            .route("/job/shared-library/buildWithParameters", post(record))
            .with_state(state);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        StubJenkins {
            base_url: format!("http://{addr}"),
            captured,
            shutdown: Some(tx),
        }
    }

    fn config(url: &str) -> ExecutorConfig {
        ExecutorConfig {
            url: Some(url.to_string()),
            username: "bot".to_string(),
            api_token: Some(SecretString::from("s3cret")),
            ..ExecutorConfig::default()
        }
    }

    fn request() -> DispatchRequest {
        DispatchRequest {
            workflow_metadata: json!({"on": "push", "name": "build"}),
            repo_name: "r".to_string(),
            repo_url: "https://github.com/acme/r.git".to_string(),
            branch: "main".to_string(),
            commit_id: "abc123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_trigger_posts_form_with_basic_auth() {
        let stub = spawn_stub(StatusCode::CREATED, "").await;
        let executor = JenkinsExecutor::from_config(&config(&stub.base_url)).unwrap();

        let response = executor.trigger(&request()).await.unwrap();
        assert_eq!(response.status, 201);

        let captured = stub.captured.lock().unwrap();
        assert_eq!(captured.len(), 1);
        let call = &captured[0];
        assert_eq!(call.authorization.as_deref(), Some("Basic Ym90OnMzY3JldA=="));
        assert_eq!(call.form["repo_name"], "r");
        assert_eq!(call.form["repo_url"], "https://github.com/acme/r.git");
        assert_eq!(call.form["branch"], "main");
        assert_eq!(call.form["commit_id"], "abc123");
        let metadata: serde_json::Value =
            serde_json::from_str(&call.form["workflow_metadata"]).unwrap();
        assert_eq!(metadata, json!({"on": "push", "name": "build"}));
    }

    #[tokio::test]
    async fn test_non_created_status_is_returned_not_raised() {
        let stub = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, "nope").await;
        let executor = JenkinsExecutor::from_config(&config(&stub.base_url)).unwrap();

        let response = executor.trigger(&request()).await.unwrap();
        assert_eq!(
            response,
            ExecutorResponse {
                status: 500,
                body: "nope".to_string()
            }
        );
    }

    /// One-shot HTTP server that answers with `status` and a `Content-Length`
    /// larger than the body it actually sends, then closes the connection.
    async fn spawn_truncating_server(status_line: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            // Read headers plus the declared request body before answering.
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    return;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort"
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_truncated_body_is_reported_not_swallowed() {
        let base_url = spawn_truncating_server("502 Bad Gateway").await;
        let executor = JenkinsExecutor::from_config(&config(&base_url)).unwrap();

        let response = executor.trigger(&request()).await.unwrap();
        assert_eq!(response.status, 502);
        assert!(
            response.body.starts_with("<unreadable body"),
            "got {:?}",
            response.body
        );
    }

    #[tokio::test]
    async fn test_unreachable_executor_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let executor = JenkinsExecutor::from_config(&config(&format!("http://{addr}"))).unwrap();
        let err = executor.trigger(&request()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let err = JenkinsExecutor::from_config(&ExecutorConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("executor.url")));
    }

    #[test]
    fn test_trigger_url_uses_job_and_trims_slash() {
        let mut cfg = config("https://jenkins.example.com/");
        cfg.job = "pipelines".to_string();
        let executor = JenkinsExecutor::from_config(&cfg).unwrap();
        assert_eq!(
            executor.trigger_url(),
            "https://jenkins.example.com/job/pipelines/buildWithParameters"
        );
    }
}
