use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;

use super::{ApiClient, BackendError, id_segment, required};
use crate::models::{Page, QueryParam};

/// Whatever the backend echoes back from a save; shapes vary per endpoint.
pub type Echo = Option<serde_json::Value>;

/// Generic get/list/save/remove over one entity URI.
#[derive(Debug, Clone)]
pub struct CrudService<T> {
    client: ApiClient,
    uri: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> CrudService<T> {
    pub fn new(client: ApiClient, uri: &str) -> Self {
        Self { client, uri: uri.trim_end_matches('/').to_string(), _entity: PhantomData }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `{uri}/{id}`, refusing ids that would leave the entity path.
    pub fn entity_path(&self, id: &str) -> Result<String, BackendError> {
        Ok(format!("{}/{}", self.uri, id_segment(id)?))
    }

    pub async fn get(&self, id: &str) -> Result<T, BackendError> {
        let path = self.entity_path(id)?;
        required(self.client.get(&path, &[]).await?)
    }

    pub async fn list(&self, query: &QueryParam) -> Result<Page<T>, BackendError> {
        let page: Option<Page<T>> = self
            .client
            .get(&format!("{}/_query", self.uri), &query.encode())
            .await?;
        Ok(page.unwrap_or_else(|| Page::empty(query.page_size)))
    }

    /// Create-or-update keyed by the item's id.
    pub async fn save(&self, item: &T) -> Result<Echo, BackendError> {
        self.client.patch(&self.uri, item).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), BackendError> {
        let path = self.entity_path(id)?;
        let _: Echo = self.client.delete(&path).await?;
        Ok(())
    }
}
