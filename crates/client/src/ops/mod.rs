//! Typed master operations. Each one validates its arguments locally and
//! then goes through the dispatcher exactly once.

mod blocks;
mod dependencies;
mod files;
mod tables;
mod workers;

use mc_protocol::{is_absolute, UNSET_ID};

use crate::types::ClientError;

/// A target named by id, or by absolute path when the id is unset.
fn check_target(id: i32, path: &str) -> Result<(), ClientError> {
    if id == UNSET_ID && !is_absolute(path) {
        return Err(ClientError::validation(format!(
            "illegal path parameter: {path:?}"
        )));
    }
    Ok(())
}

fn check_absolute(path: &str) -> Result<(), ClientError> {
    if !is_absolute(path) {
        return Err(ClientError::validation(format!(
            "path must be absolute: {path:?}"
        )));
    }
    Ok(())
}
