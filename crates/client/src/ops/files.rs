use mc_protocol::{FileInfo, MasterRequest};

use super::{check_absolute, check_target};
use crate::client::MasterClient;
use crate::types::ClientError;

impl MasterClient {
    /// Record a checkpoint a worker wrote to the under filesystem.
    pub async fn add_checkpoint(
        &self,
        worker_id: i64,
        file_id: i32,
        length: i64,
        checkpoint_path: &str,
    ) -> Result<bool, ClientError> {
        self.call(MasterRequest::AddCheckpoint {
            worker_id,
            file_id,
            length,
            checkpoint_path: checkpoint_path.to_string(),
        })
        .await
    }

    /// Metadata of a file or folder, by id or (when `file_id` is unset) by
    /// absolute path. An absent path is sent as empty.
    pub async fn get_file_status(
        &self,
        file_id: i32,
        path: Option<&str>,
    ) -> Result<FileInfo, ClientError> {
        let path = path.unwrap_or_default();
        check_target(file_id, path)?;
        self.call(MasterRequest::GetFileStatus {
            file_id,
            path: path.to_string(),
        })
        .await
    }

    pub async fn list_status(&self, path: &str) -> Result<Vec<FileInfo>, ClientError> {
        self.call(MasterRequest::ListStatus {
            path: path.to_string(),
        })
        .await
    }

    pub async fn complete_file(&self, file_id: i32) -> Result<(), ClientError> {
        self.call(MasterRequest::CompleteFile { file_id }).await
    }

    /// Create a file and return its id.
    pub async fn create_file(
        &self,
        path: &str,
        ufs_path: Option<&str>,
        block_size_bytes: i64,
        recursive: bool,
    ) -> Result<i32, ClientError> {
        check_absolute(path)?;
        self.call(MasterRequest::CreateFile {
            path: path.to_string(),
            ufs_path: ufs_path.unwrap_or_default().to_string(),
            block_size_bytes,
            recursive,
        })
        .await
    }

    pub async fn delete(
        &self,
        file_id: i32,
        path: &str,
        recursive: bool,
    ) -> Result<bool, ClientError> {
        check_target(file_id, path)?;
        self.call(MasterRequest::Delete {
            file_id,
            path: path.to_string(),
            recursive,
        })
        .await
    }

    pub async fn mkdirs(&self, path: &str, recursive: bool) -> Result<bool, ClientError> {
        check_absolute(path)?;
        self.call(MasterRequest::Mkdirs {
            path: path.to_string(),
            recursive,
        })
        .await
    }

    pub async fn rename(
        &self,
        file_id: i32,
        src_path: &str,
        dst_path: &str,
    ) -> Result<bool, ClientError> {
        check_target(file_id, src_path)?;
        self.call(MasterRequest::Rename {
            file_id,
            src_path: src_path.to_string(),
            dst_path: dst_path.to_string(),
        })
        .await
    }

    /// Evict a file or folder from worker memory.
    pub async fn free_path(
        &self,
        file_id: i32,
        path: &str,
        recursive: bool,
    ) -> Result<bool, ClientError> {
        check_target(file_id, path)?;
        self.call(MasterRequest::FreePath {
            file_id,
            path: path.to_string(),
            recursive,
        })
        .await
    }

    pub async fn set_pinned(&self, file_id: i32, pinned: bool) -> Result<(), ClientError> {
        self.call(MasterRequest::SetPinned { file_id, pinned }).await
    }

    pub async fn report_lost_file(&self, file_id: i32) -> Result<(), ClientError> {
        self.call(MasterRequest::ReportLostFile { file_id }).await
    }

    /// Address of the under filesystem backing the master.
    pub async fn get_ufs_address(&self) -> Result<String, ClientError> {
        self.call(MasterRequest::GetUfsAddress).await
    }
}
