//! Metadata records exchanged with the master.

use serde::{Deserialize, Serialize};

/// Network address of a worker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NetAddress {
    pub host: String,
    pub rpc_port: u16,
    pub data_port: u16,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: i32,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub ufs_path: String,
    pub length: i64,
    pub block_size_bytes: i64,
    pub creation_time_ms: i64,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub is_folder: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_cache: bool,
    #[serde(default)]
    pub block_ids: Vec<i64>,
    #[serde(default = "d_unset")]
    pub dependency_id: i32,
    #[serde(default)]
    pub in_memory_percentage: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockInfo {
    pub block_id: i64,
    pub offset: i64,
    pub length: i64,
    #[serde(default)]
    pub locations: Vec<NetAddress>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTableInfo {
    pub id: i32,
    pub name: String,
    pub path: String,
    pub columns: i32,
    #[serde(default)]
    pub metadata: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencyInfo {
    pub id: i32,
    #[serde(default)]
    pub parents: Vec<i32>,
    #[serde(default)]
    pub children: Vec<i32>,
    #[serde(default)]
    pub data: Vec<Vec<u8>>,
}

/// Arguments of a `create_dependency` call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencySpec {
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub command_prefix: String,
    #[serde(default)]
    pub data: Vec<Vec<u8>>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub framework: String,
    #[serde(default)]
    pub framework_version: String,
    pub dependency_type: i32,
    pub children_block_size_bytes: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub id: i64,
    pub address: NetAddress,
    pub last_contact_sec: i32,
    #[serde(default)]
    pub state: String,
    pub capacity_bytes: i64,
    pub used_bytes: i64,
    pub start_time_ms: i64,
}

/// Block ids held in one worker storage directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageDirBlocks {
    pub storage_dir_id: i64,
    #[serde(default)]
    pub block_ids: Vec<i64>,
}

/// Instruction the master hands back to a heartbeating worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    #[default]
    Unknown,
    Nothing,
    Register,
    Free,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Command {
    pub command_type: CommandType,
    #[serde(default)]
    pub data: Vec<i64>,
}

fn d_unset() -> i32 {
    crate::UNSET_ID
}
