use mc_protocol::{MasterRequest, RawTableInfo};

use super::{check_absolute, check_target};
use crate::client::MasterClient;
use crate::types::ClientError;

impl MasterClient {
    /// Create a raw table and return its id. Absent metadata is sent as an
    /// empty buffer.
    pub async fn create_raw_table(
        &self,
        path: &str,
        columns: i32,
        metadata: Option<Vec<u8>>,
    ) -> Result<i32, ClientError> {
        check_absolute(path)?;
        if columns <= 0 {
            return Err(ClientError::validation(format!(
                "column count must be positive, got {columns}"
            )));
        }
        self.call(MasterRequest::CreateRawTable {
            path: path.to_string(),
            columns,
            metadata: metadata.unwrap_or_default(),
        })
        .await
    }

    pub async fn get_raw_table_info(
        &self,
        table_id: i32,
        path: &str,
    ) -> Result<RawTableInfo, ClientError> {
        check_target(table_id, path)?;
        self.call(MasterRequest::GetRawTableInfo {
            table_id,
            path: path.to_string(),
        })
        .await
    }

    pub async fn get_raw_table_id(&self, path: &str) -> Result<i32, ClientError> {
        self.call(MasterRequest::GetRawTableId {
            path: path.to_string(),
        })
        .await
    }

    pub async fn update_raw_table_metadata(
        &self,
        table_id: i32,
        metadata: Option<Vec<u8>>,
    ) -> Result<(), ClientError> {
        self.call(MasterRequest::UpdateRawTableMetadata {
            table_id,
            metadata: metadata.unwrap_or_default(),
        })
        .await
    }
}
