use crate::engine::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Temp files younger than this may belong to a write still in flight.
const STALE_AFTER: Duration = Duration::from_secs(300);
/// The root may be a working directory; keep the scan shallow.
const MAX_DEPTH: usize = 4;

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now)).await {
        Ok((0, 0)) => {},
        Ok((removed, failed)) => info!(removed, failed, "Purged stale temp files"),
        Err(e) => error!(error = %e, "Temp file purge task failed"),
    }
}

fn remove_stale(root: &Path, now: SystemTime) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    let stale = WalkDir::new(root)
        .max_depth(MAX_DEPTH)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| is_tmp(entry) && is_stale(entry, now));

    for entry in stale {
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to remove temp file");
                failed += 1;
            },
        }
    }

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|meta| meta.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > STALE_AFTER)
}
