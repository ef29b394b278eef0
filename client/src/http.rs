//! HTTP remote for the Gather server's activity endpoints

use crate::error::{RemoteError, RemoteResult};
use crate::{ClientConfig, RemoteCollection};
use async_trait::async_trait;
use gather_engine::{Activity, PaginationHeader, MAX_PAGE_SIZE};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Header carrying [`PaginationHeader`] JSON on list responses
pub const PAGINATION_HEADER: &str = "Pagination";

/// [`RemoteCollection`] over the server's `/activities` endpoints
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    config: ClientConfig,
}

impl HttpRemote {
    /// Create a remote from configuration
    pub fn new(config: ClientConfig) -> RemoteResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Fetch one page of activities along with its pagination metadata
    pub async fn list_page(
        &self,
        page_number: u64,
        page_size: u64,
    ) -> RemoteResult<(Vec<Activity>, Option<PaginationHeader>)> {
        let url = self.config.url(&format!(
            "activities?pageNumber={}&pageSize={}",
            page_number, page_size
        ));

        let response = Self::check(self.client.get(&url).send().await?).await?;

        let header = match response.headers().get(PAGINATION_HEADER) {
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
                Some(serde_json::from_str::<PaginationHeader>(raw)?)
            }
            None => None,
        };

        let items = response.json().await?;
        Ok((items, header))
    }

    /// URL of a single activity, with the id escaped as one path segment
    fn item_url(&self, id: &str) -> RemoteResult<Url> {
        let mut url = Url::parse(&self.config.url("activities"))
            .map_err(|e| RemoteError::Transport(format!("invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Transport("base url cannot carry a path".into()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Turn non-success statuses into errors
    async fn check(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => RemoteError::NotFound(text),
            _ => RemoteError::Rejected {
                status: status.as_u16(),
                message: text,
            },
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl RemoteCollection<Activity> for HttpRemote {
    async fn list(&self) -> RemoteResult<Vec<Activity>> {
        let mut activities = Vec::new();
        let mut page_number = 1;

        loop {
            let (items, header) = self.list_page(page_number, MAX_PAGE_SIZE).await?;
            activities.extend(items);

            match header {
                Some(header) if page_number < header.total_pages => page_number += 1,
                _ => break,
            }
        }

        tracing::debug!(count = activities.len(), "listed activities");
        Ok(activities)
    }

    async fn get(&self, id: &str) -> RemoteResult<Activity> {
        let url = self.item_url(id)?;
        Self::json(self.client.get(url).send().await?).await
    }

    async fn create(&self, activity: &Activity) -> RemoteResult<()> {
        let url = self.config.url("activities");
        Self::check(self.client.post(&url).json(activity).send().await?).await?;
        Ok(())
    }

    async fn update(&self, activity: &Activity) -> RemoteResult<()> {
        let url = self.item_url(&activity.id)?;
        Self::check(self.client.put(url).json(activity).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        let url = self.item_url(id)?;
        Self::check(self.client.delete(url).send().await?).await?;
        Ok(())
    }
}

/// Generate a fresh client-side activity id
pub fn new_activity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
