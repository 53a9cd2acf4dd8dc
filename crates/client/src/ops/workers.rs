use std::collections::HashSet;

use mc_protocol::{Command, MasterRequest, NetAddress, StorageDirBlocks, WorkerInfo};

use crate::client::MasterClient;
use crate::types::ClientError;

// ── cluster ──────────────────────────────────────────────────────────

impl MasterClient {
    pub async fn get_workers_info(&self) -> Result<Vec<WorkerInfo>, ClientError> {
        self.call(MasterRequest::GetWorkersInfo).await
    }

    pub async fn get_capacity_bytes(&self) -> Result<i64, ClientError> {
        self.call(MasterRequest::GetCapacityBytes).await
    }

    pub async fn get_used_bytes(&self) -> Result<i64, ClientError> {
        self.call(MasterRequest::GetUsedBytes).await
    }

    /// Pick a worker, either at random or the one on `hostname`.
    pub async fn get_worker(&self, random: bool, hostname: &str) -> Result<NetAddress, ClientError> {
        self.call(MasterRequest::GetWorker {
            random,
            hostname: hostname.to_string(),
        })
        .await
    }

    /// Explicit liveness ping, outside the background heartbeat.
    pub async fn user_heartbeat(&self) -> Result<(), ClientError> {
        self.call(MasterRequest::UserHeartbeat).await
    }
}

// ── worker-side calls ────────────────────────────────────────────────

impl MasterClient {
    /// Register a worker and return the id the master assigned.
    pub async fn worker_register(
        &self,
        address: NetAddress,
        total_bytes_on_tiers: Vec<i64>,
        used_bytes_on_tiers: Vec<i64>,
        current_blocks: Vec<StorageDirBlocks>,
    ) -> Result<i64, ClientError> {
        self.call(MasterRequest::WorkerRegister {
            address,
            total_bytes_on_tiers,
            used_bytes_on_tiers,
            current_blocks,
        })
        .await
    }

    pub async fn worker_heartbeat(
        &self,
        worker_id: i64,
        used_bytes_on_tiers: Vec<i64>,
        removed_block_ids: Vec<i64>,
        added_block_ids: Vec<StorageDirBlocks>,
    ) -> Result<Command, ClientError> {
        self.call(MasterRequest::WorkerHeartbeat {
            worker_id,
            used_bytes_on_tiers,
            removed_block_ids,
            added_block_ids,
        })
        .await
    }

    pub async fn worker_cache_block(
        &self,
        worker_id: i64,
        used_bytes_on_tier: i64,
        storage_dir_id: i64,
        block_id: i64,
        length: i64,
    ) -> Result<(), ClientError> {
        self.call(MasterRequest::WorkerCacheBlock {
            worker_id,
            used_bytes_on_tier,
            storage_dir_id,
            block_id,
            length,
        })
        .await
    }

    /// Ids of pinned files.
    pub async fn worker_get_pin_id_list(&self) -> Result<HashSet<i32>, ClientError> {
        self.call(MasterRequest::WorkerGetPinIdList).await
    }

    pub async fn worker_get_priority_dependency_list(&self) -> Result<Vec<i32>, ClientError> {
        self.call(MasterRequest::WorkerGetPriorityDependencyList)
            .await
    }
}
