//! Master RPC protocol: request catalogue, reply envelope, rejection kinds,
//! and the metadata records the master returns.
//!
//! Every call travels as an [`RpcRequest`] carrying a [`MasterRequest`]
//! tagged by `method`; the master answers with an [`RpcReply`] echoing the
//! request id.

mod error;
mod records;

pub use error::{DomainError, DomainErrorKind};
pub use records::*;

use serde::{Deserialize, Serialize};

/// Sentinel for "no id given, identify the target by path instead".
pub const UNSET_ID: i32 = -1;

/// Path separator; a path is absolute iff it starts with it.
pub const PATH_SEPARATOR: char = '/';

/// One remote invocation against the master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MasterRequest {
    /// Session handshake: the master assigns a session (user) id.
    GetUserId,
    /// Client liveness ping.
    UserHeartbeat,

    // ── files ────────────────────────────────────────────────────
    AddCheckpoint {
        worker_id: i64,
        file_id: i32,
        length: i64,
        checkpoint_path: String,
    },
    GetFileStatus {
        file_id: i32,
        path: String,
    },
    ListStatus {
        path: String,
    },
    CompleteFile {
        file_id: i32,
    },
    CreateFile {
        path: String,
        ufs_path: String,
        block_size_bytes: i64,
        recursive: bool,
    },
    Delete {
        file_id: i32,
        path: String,
        recursive: bool,
    },
    Mkdirs {
        path: String,
        recursive: bool,
    },
    Rename {
        file_id: i32,
        src_path: String,
        dst_path: String,
    },
    FreePath {
        file_id: i32,
        path: String,
        recursive: bool,
    },
    SetPinned {
        file_id: i32,
        pinned: bool,
    },
    ReportLostFile {
        file_id: i32,
    },
    GetUfsAddress,

    // ── blocks ───────────────────────────────────────────────────
    CreateNewBlock {
        file_id: i32,
    },
    GetBlockId {
        file_id: i32,
        block_index: i32,
    },
    GetBlockInfo {
        block_id: i64,
    },
    GetFileBlocks {
        file_id: i32,
        path: String,
    },

    // ── raw tables ───────────────────────────────────────────────
    CreateRawTable {
        path: String,
        columns: i32,
        metadata: Vec<u8>,
    },
    GetRawTableInfo {
        table_id: i32,
        path: String,
    },
    GetRawTableId {
        path: String,
    },
    UpdateRawTableMetadata {
        table_id: i32,
        metadata: Vec<u8>,
    },

    // ── dependencies ─────────────────────────────────────────────
    CreateDependency {
        spec: DependencySpec,
    },
    GetDependencyInfo {
        dependency_id: i32,
    },
    RequestFilesInDependency {
        dependency_id: i32,
    },

    // ── cluster / workers ────────────────────────────────────────
    GetWorkersInfo,
    GetCapacityBytes,
    GetUsedBytes,
    GetWorker {
        random: bool,
        hostname: String,
    },
    WorkerRegister {
        address: NetAddress,
        total_bytes_on_tiers: Vec<i64>,
        used_bytes_on_tiers: Vec<i64>,
        current_blocks: Vec<StorageDirBlocks>,
    },
    WorkerHeartbeat {
        worker_id: i64,
        used_bytes_on_tiers: Vec<i64>,
        removed_block_ids: Vec<i64>,
        added_block_ids: Vec<StorageDirBlocks>,
    },
    WorkerCacheBlock {
        worker_id: i64,
        used_bytes_on_tier: i64,
        storage_dir_id: i64,
        block_id: i64,
        length: i64,
    },
    WorkerGetPinIdList,
    WorkerGetPriorityDependencyList,
}

impl MasterRequest {
    /// Wire name of the method, for logs.
    pub fn method(&self) -> &'static str {
        match self {
            Self::GetUserId => "get_user_id",
            Self::UserHeartbeat => "user_heartbeat",
            Self::AddCheckpoint { .. } => "add_checkpoint",
            Self::GetFileStatus { .. } => "get_file_status",
            Self::ListStatus { .. } => "list_status",
            Self::CompleteFile { .. } => "complete_file",
            Self::CreateFile { .. } => "create_file",
            Self::Delete { .. } => "delete",
            Self::Mkdirs { .. } => "mkdirs",
            Self::Rename { .. } => "rename",
            Self::FreePath { .. } => "free_path",
            Self::SetPinned { .. } => "set_pinned",
            Self::ReportLostFile { .. } => "report_lost_file",
            Self::GetUfsAddress => "get_ufs_address",
            Self::CreateNewBlock { .. } => "create_new_block",
            Self::GetBlockId { .. } => "get_block_id",
            Self::GetBlockInfo { .. } => "get_block_info",
            Self::GetFileBlocks { .. } => "get_file_blocks",
            Self::CreateRawTable { .. } => "create_raw_table",
            Self::GetRawTableInfo { .. } => "get_raw_table_info",
            Self::GetRawTableId { .. } => "get_raw_table_id",
            Self::UpdateRawTableMetadata { .. } => "update_raw_table_metadata",
            Self::CreateDependency { .. } => "create_dependency",
            Self::GetDependencyInfo { .. } => "get_dependency_info",
            Self::RequestFilesInDependency { .. } => "request_files_in_dependency",
            Self::GetWorkersInfo => "get_workers_info",
            Self::GetCapacityBytes => "get_capacity_bytes",
            Self::GetUsedBytes => "get_used_bytes",
            Self::GetWorker { .. } => "get_worker",
            Self::WorkerRegister { .. } => "worker_register",
            Self::WorkerHeartbeat { .. } => "worker_heartbeat",
            Self::WorkerCacheBlock { .. } => "worker_cache_block",
            Self::WorkerGetPinIdList => "worker_get_pin_id_list",
            Self::WorkerGetPriorityDependencyList => "worker_get_priority_dependency_list",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Envelope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Client → master frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Correlation id, echoed in the reply.
    pub id: u64,
    pub call: MasterRequest,
}

/// Master → client frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcReply {
    pub id: u64,
    pub outcome: RpcOutcome,
}

/// Result of one call as reported by the master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RpcOutcome {
    /// The call succeeded; `result` is the method-specific payload (`null`
    /// for methods without one).
    Ok {
        #[serde(default)]
        result: serde_json::Value,
    },
    /// The master rejected the call on its merits.
    Rejected { error: DomainError },
}

impl RpcReply {
    pub fn ok(id: u64, result: serde_json::Value) -> Self {
        Self {
            id,
            outcome: RpcOutcome::Ok { result },
        }
    }

    pub fn rejected(id: u64, error: DomainError) -> Self {
        Self {
            id,
            outcome: RpcOutcome::Rejected { error },
        }
    }
}

/// `true` if `path` is absolute.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(PATH_SEPARATOR)
}
