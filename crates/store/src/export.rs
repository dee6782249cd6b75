//! Archive export of finished artifacts.
//!
//! Bundles every `Success` job's video into one zip archive. Entries
//! are named by the job's position in the displayed queue plus a
//! sanitized slice of its prompt, so the archive reads in the same
//! order as the queue.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use veobatch_core::naming::{archive_entry_name, ARCHIVE_FILENAME};
use veobatch_core::{Job, JobStatus};
use zip::write::SimpleFileOptions;

use crate::error::StoreError;

/// Build a zip archive of all successful jobs' artifacts.
///
/// Entry names use each job's index in the *full* queue, so they stay
/// aligned with what the user sees. Returns `Ok(None)` when no job
/// qualifies: exporting an empty queue has no side effect.
pub fn build_archive(jobs: &[Job]) -> Result<Option<Vec<u8>>, StoreError> {
    let qualifying: Vec<(usize, &Job)> = jobs
        .iter()
        .enumerate()
        .filter(|(_, job)| job.status == JobStatus::Success && job.result.is_some())
        .collect();

    if qualifying.is_empty() {
        return Ok(None);
    }

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (index, job) in &qualifying {
        let handle = job.result.as_ref().expect("filtered on result presence");
        writer.start_file(archive_entry_name(*index, &job.prompt), options)?;
        writer.write_all(handle.bytes())?;
    }

    let archive = writer.finish()?.into_inner();
    tracing::info!(entries = qualifying.len(), size = archive.len(), "Archive built");
    Ok(Some(archive))
}

/// Build the archive and save it under the fixed filename in `dir`.
///
/// Returns the written path, or `None` when nothing qualified.
pub fn write_archive(jobs: &[Job], dir: impl AsRef<Path>) -> Result<Option<PathBuf>, StoreError> {
    let Some(archive) = build_archive(jobs)? else {
        return Ok(None);
    };
    let path = dir.as_ref().join(ARCHIVE_FILENAME);
    std::fs::write(&path, archive)?;
    Ok(Some(path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
