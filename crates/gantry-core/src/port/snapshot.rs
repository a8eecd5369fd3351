//! SnapshotProvider trait definition.

use std::path::Path;

use gantry_types::error::SnapshotError;

/// Materializes a read-only copy of a repository at a ref or commit.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
/// The returned snapshot is released when dropped, so implementations backed
/// by temporary directories clean up automatically.
pub trait SnapshotProvider: Send + Sync {
    /// Handle to the materialized tree. `as_ref()` yields its root directory.
    type Snapshot: AsRef<Path> + Send + Sync;

    /// Fetch `clone_url` and check out `ref_or_commit`.
    fn fetch(
        &self,
        clone_url: &str,
        ref_or_commit: &str,
    ) -> impl std::future::Future<Output = Result<Self::Snapshot, SnapshotError>> + Send;
}
