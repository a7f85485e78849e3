//! A shared, bounded worker pool for the concurrency spec §5 calls out:
//! tablet serialization within `partition_records`, and sibling subtree
//! updates within the bulk-update algorithm, may run in parallel, capped at
//! 6 concurrent workers to bound memory.
//!
//! Grounded on the teacher's own use of `lazy_static` for process-wide
//! constants (`src/robt/marker.rs`'s `ROOT_MARKER`), repurposed here for a
//! lazily-initialized `rayon` pool rather than a byte constant.

use lazy_static::lazy_static;

/// Upper bound on concurrent node-store writers (spec §5).
pub const MAX_WORKERS: usize = 6;

lazy_static! {
    static ref POOL: rayon::ThreadPool = rayon::ThreadPoolBuilder::new()
        .num_threads(MAX_WORKERS)
        .thread_name(|i| format!("merkledb-worker-{}", i))
        .build()
        .expect("failed to build bounded worker pool");
}

/// Run `f` on the shared bounded pool, blocking the caller until it returns.
pub(crate) fn install<F, R>(f: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    POOL.install(f)
}
