use mc_protocol::{BlockInfo, MasterRequest};

use super::check_target;
use crate::client::MasterClient;
use crate::types::ClientError;

impl MasterClient {
    /// Allocate the next block of a file and return its id.
    pub async fn create_new_block(&self, file_id: i32) -> Result<i64, ClientError> {
        self.call(MasterRequest::CreateNewBlock { file_id }).await
    }

    pub async fn get_block_id(&self, file_id: i32, block_index: i32) -> Result<i64, ClientError> {
        self.call(MasterRequest::GetBlockId {
            file_id,
            block_index,
        })
        .await
    }

    pub async fn get_block_info(&self, block_id: i64) -> Result<BlockInfo, ClientError> {
        self.call(MasterRequest::GetBlockInfo { block_id }).await
    }

    /// Every block of a file, by id or (when `file_id` is unset) by
    /// absolute path.
    pub async fn get_file_blocks(
        &self,
        file_id: i32,
        path: &str,
    ) -> Result<Vec<BlockInfo>, ClientError> {
        check_target(file_id, path)?;
        self.call(MasterRequest::GetFileBlocks {
            file_id,
            path: path.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mc_domain::MasterAddress;
    use mc_protocol::{DomainError, DomainErrorKind, NetAddress, UNSET_ID};
    use serde_json::json;

    use super::*;
    use crate::testing::{MockFactory, MockMaster, Reply};

    fn client(master: &Arc<MockMaster>) -> MasterClient {
        MasterClient::builder()
            .static_master(MasterAddress::new("127.0.0.1", 19998))
            .transport(Arc::new(MockFactory(master.clone())))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn file_blocks_decode_locations() {
        let master = MockMaster::new();
        let client = client(&master);
        master.push_reply(Reply::Value(json!([{
            "block_id": 8589934592i64,
            "offset": 0,
            "length": 4096,
            "locations": [{ "host": "w1", "rpc_port": 29998, "data_port": 29999 }]
        }])));

        let blocks = client.get_file_blocks(UNSET_ID, "/data/a").await.unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].length, 4096);
        assert_eq!(
            blocks[0].locations,
            vec![NetAddress {
                host: "w1".into(),
                rpc_port: 29998,
                data_port: 29999,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn file_blocks_reject_relative_path() {
        let master = MockMaster::new();
        let client = client(&master);

        let err = client.get_file_blocks(UNSET_ID, "data/a").await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(master.opens(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn corrupted_block_info_is_a_domain_error() {
        let master = MockMaster::new();
        let client = client(&master);
        master.push_reply(Reply::Rejected(DomainError::new(
            DomainErrorKind::BlockInfo,
            "block 12 has no locations",
        )));

        let err = client.get_block_info(12).await.unwrap_err();

        assert_eq!(err.domain_kind(), Some(DomainErrorKind::BlockInfo));
        assert_eq!(master.opens(), 1);
    }
}
