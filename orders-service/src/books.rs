//! Existence checks against the books service.
//!
//! The HTTP directory fails closed: a non-2xx answer and a transport failure (timeout,
//! refused connection, DNS) both read as "no such book". Probes are never retried.

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait BookDirectory: Send + Sync {
    async fn exists(&self, book_id: i64) -> bool;
}

/// Probes `HEAD {base_url}/api/books/{id}` on the books service.
#[derive(Clone, Debug)]
pub struct HttpBookDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn book_url(&self, book_id: i64) -> String {
        format!("{}/api/books/{}", self.base_url, book_id)
    }
}

#[async_trait]
impl BookDirectory for HttpBookDirectory {
    async fn exists(&self, book_id: i64) -> bool {
        let url = self.book_url(book_id);
        match self.client.head(&url).send().await {
            Ok(resp) => {
                let status = resp.status();
                if !status.is_success() {
                    tracing::debug!(book_id, status = %status, "books service did not confirm book");
                }
                status.is_success()
            }
            Err(e) => {
                tracing::warn!(book_id, url = %url, error = %e, "books service unreachable; treating book as missing");
                false
            }
        }
    }
}
