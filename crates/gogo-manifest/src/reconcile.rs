// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Removal of store files no longer referenced upstream

use crate::error::Result;
use crate::report::FailedStep;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub removed: Vec<String>,
    pub failed: Vec<FailedStep>,
}

/// Delete every entry in `dir` whose name is not in `kept`
///
/// An entry that cannot be deleted, subdirectories included, is reported and
/// skipped. Only failing to read the directory itself is an error.
pub fn reconcile_dir(dir: &Path, kept: &BTreeSet<String>) -> Result<ReconcileOutcome> {
    let mut outcome = ReconcileOutcome::default();

    let mut entries = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if kept.contains(&file_name) {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::info!("Deleted {file_name}");
                outcome.removed.push(file_name);
            }
            Err(e) => {
                tracing::error!("Error deleting {file_name}: {e}");
                outcome.failed.push(FailedStep::new(file_name, e));
            }
        }
    }

    Ok(outcome)
}
