use super::crud::{CrudService, Echo};
use super::{ApiClient, BackendError};
use crate::models::protocol::{DeployAction, ProtocolItem};
use crate::models::{Page, QueryParam};

pub const PROTOCOL_URI: &str = "/jetlinks/protocol";

/// Protocol definitions: CRUD plus the publish/unpublish toggle.
#[derive(Debug, Clone)]
pub struct ProtocolService {
    crud: CrudService<ProtocolItem>,
}

impl ProtocolService {
    pub fn new(client: ApiClient) -> Self {
        Self { crud: CrudService::new(client, PROTOCOL_URI) }
    }

    pub async fn query(&self, query: &QueryParam) -> Result<Page<ProtocolItem>, BackendError> {
        self.crud.list(query).await
    }

    pub async fn get(&self, id: &str) -> Result<ProtocolItem, BackendError> {
        self.crud.get(id).await
    }

    pub async fn save(&self, item: &ProtocolItem) -> Result<Echo, BackendError> {
        self.crud.save(item).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), BackendError> {
        self.crud.remove(id).await
    }

    pub async fn change_deploy(&self, id: &str, action: DeployAction) -> Result<(), BackendError> {
        let path = format!("{}/{}", self.crud.entity_path(id)?, action.path_segment());
        let _: Echo = self.crud.client().post(&path, None::<&()>).await?;
        log::info!("protocol {id}: {} succeeded", action.path_segment());
        Ok(())
    }
}
