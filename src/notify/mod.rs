//! Search engine notification for newly saved posts
//!
//! Submissions run on a background queue. Saving a post only enqueues its
//! URL; delivery failures end up in the log and are never retried.

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::IndexNowConfig;
use crate::error::{Error, Result};

/// Something that can announce a post URL
pub trait Notifier: Send + Sync + 'static {
    fn submit(&self, url: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Request body of the IndexNow API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexNowRequest {
    pub host: String,
    pub key: String,
    pub key_location: String,
    pub url_list: Vec<String>,
}

/// IndexNow client
pub struct IndexNow {
    client: reqwest::Client,
    config: IndexNowConfig,
}

impl IndexNow {
    pub fn new(config: IndexNowConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn request(&self, url: &str) -> IndexNowRequest {
        IndexNowRequest {
            host: self.config.host.clone(),
            key: self.config.key.clone(),
            key_location: self.config.key_location(),
            url_list: vec![url.to_string()],
        }
    }
}

impl Notifier for IndexNow {
    async fn submit(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json; charset=utf-8",
            )
            .json(&self.request(url))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            tracing::info!("Submitted {} to IndexNow: {}", url, body);
            Ok(())
        } else {
            Err(Error::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Detached worker delivering post URLs to a notifier
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl NotificationQueue {
    /// Start the worker on the current tokio runtime
    pub fn spawn<N: Notifier>(notifier: N, delay: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let worker = tokio::spawn(async move {
            while let Some(url) = rx.recv().await {
                tokio::time::sleep(delay).await;
                if let Err(e) = notifier.submit(&url).await {
                    tracing::warn!("Failed to submit {} for indexing: {}", url, e);
                }
            }
        });

        Self { tx, worker }
    }

    /// Queue a URL; never blocks and never fails the caller
    pub fn enqueue(&self, url: String) {
        if let Err(e) = self.tx.send(url) {
            tracing::warn!("Notification worker is gone, dropping {}", e.0);
        }
    }

    /// Stop accepting URLs and wait for the queued ones to be delivered
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            tracing::error!("Notification worker panicked: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        urls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Notifier for Recorder {
        async fn submit(&self, url: &str) -> Result<()> {
            self.urls.lock().unwrap().push(url.to_string());
            if self.fail {
                Err(Error::Rejected {
                    status: 403,
                    body: "forbidden".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_queue_delivers_in_order() {
        let recorder = Recorder::default();
        let queue = NotificationQueue::spawn(recorder.clone(), Duration::ZERO);
        queue.enqueue("https://a.example/1/".to_string());
        queue.enqueue("https://a.example/2/".to_string());
        queue.close().await;

        assert_eq!(
            *recorder.urls.lock().unwrap(),
            vec!["https://a.example/1/", "https://a.example/2/"]
        );
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_queue() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let queue = NotificationQueue::spawn(recorder.clone(), Duration::from_millis(1));
        queue.enqueue("one".to_string());
        queue.enqueue("two".to_string());
        queue.close().await;

        assert_eq!(recorder.urls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_request_body() {
        let notifier = IndexNow::new(IndexNowConfig {
            host: "blog.example.org".to_string(),
            key: "k1".to_string(),
            ..Default::default()
        })
        .unwrap();

        let json = serde_json::to_value(notifier.request("https://blog.example.org/p/")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "host": "blog.example.org",
                "key": "k1",
                "keyLocation": "https://blog.example.org/k1.txt",
                "urlList": ["https://blog.example.org/p/"],
            })
        );
    }
}
