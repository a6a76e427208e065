// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in label seeding.

use crate::error::StorageError;
use crate::repo::LabelRepo;
use falcon_core::builtin_labels;

/// Seed the built-in label set. Idempotent: labels already present by
/// name are skipped, so applying the seed twice leaves the built-in
/// count equal to the definition's length.
pub fn seed_builtin_labels(labels: &dyn LabelRepo) -> Result<usize, StorageError> {
    let mut created = 0;
    for label in builtin_labels() {
        if labels.find_builtin_by_name(&label.name).is_some() {
            continue;
        }
        labels.insert(label)?;
        created += 1;
    }
    if created > 0 {
        tracing::info!(created, "seeded built-in labels");
    }
    Ok(created)
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
