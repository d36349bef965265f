//! Remote Backup API port
//!
//! Used only in delegated mode, where backup stats and creation are served
//! by a host-side collaborator instead of being computed in-process.

use crate::domain::result::Result;
use crate::domain::{BackupCreationResult, BackupStats};

pub trait BackupApi: Send + Sync {
    /// `GET /api/backup/stats`
    fn stats(&self) -> Result<BackupStats>;

    /// `POST /api/backup/create`
    ///
    /// A structured failure body from the host is returned as `Ok` with
    /// `success: false`; only transport problems and timeouts are `Err`.
    fn create(&self) -> Result<BackupCreationResult>;
}
