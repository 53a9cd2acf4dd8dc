use mc_protocol::{DependencyInfo, DependencySpec, MasterRequest};

use crate::client::MasterClient;
use crate::types::ClientError;

impl MasterClient {
    /// Register a lineage dependency and return its id.
    pub async fn create_dependency(&self, spec: DependencySpec) -> Result<i32, ClientError> {
        self.call(MasterRequest::CreateDependency { spec }).await
    }

    pub async fn get_dependency_info(
        &self,
        dependency_id: i32,
    ) -> Result<DependencyInfo, ClientError> {
        self.call(MasterRequest::GetDependencyInfo { dependency_id })
            .await
    }

    /// Ask the master to recompute the files of a dependency.
    pub async fn request_files_in_dependency(&self, dependency_id: i32) -> Result<(), ClientError> {
        self.call(MasterRequest::RequestFilesInDependency { dependency_id })
            .await
    }
}
