//! Replay of attributed changes onto a live line buffer.
//!
//! Changes carry positions in the coordinates of the original diff, but
//! the buffer drifts as earlier changes add and remove lines. A per-file
//! offset table accumulates the line-count delta of every change already
//! applied; replaying a change first corrects its position by the sum of
//! all deltas recorded at or before its own position key.

use std::collections::BTreeMap;

use crate::authorship::change::Change;
use crate::error::GitFaultError;

/// Position key -> accumulated line-count delta for one file. Lives for
/// the whole replay of a file, across every commit produced from it.
pub type OffsetTable = BTreeMap<(usize, usize), i64>;

fn out_of_range(change: &Change, position: i64, len: usize) -> GitFaultError {
    GitFaultError::OutOfRangeEdit {
        filename: change.filename.clone(),
        position,
        len,
    }
}

/// Apply one change to `lines`, shifting its target position by every
/// offset recorded at or before the change's own key.
///
/// The caller records the change afterwards with [`record_offset`]; the
/// table is read-only here so a change never shifts against itself.
pub fn apply_change_on_lines(
    change: &Change,
    lines: &mut Vec<Vec<u8>>,
    offsets: &OffsetTable,
) -> Result<(), GitFaultError> {
    let key = change.offset_key();
    let shift: i64 = offsets.range(..=key).map(|(_, delta)| *delta).sum();

    if change.old_lines.is_empty() {
        // Pure insertion: there is no old content to replace, so the
        // position among the added lines is the only usable anchor.
        let position = change.new_start as i64 + shift;
        let insert_at = usize::try_from(position)
            .ok()
            .filter(|at| *at <= lines.len())
            .ok_or_else(|| out_of_range(change, position, 0))?;
        lines.splice(insert_at..insert_at, change.new_lines.iter().cloned());
    } else {
        let position = change.old_start as i64 + shift;
        let remove_at = usize::try_from(position)
            .ok()
            .filter(|at| at + change.old_lines.len() <= lines.len())
            .ok_or_else(|| out_of_range(change, position, change.old_lines.len()))?;
        lines.splice(
            remove_at..remove_at + change.old_lines.len(),
            change.new_lines.iter().cloned(),
        );
    }

    Ok(())
}

/// Record an applied change's line-count delta under its position key,
/// adding to whatever an earlier change at the same key contributed.
pub fn record_offset(offsets: &mut OffsetTable, change: &Change) {
    let delta = change.new_lines.len() as i64 - change.old_lines.len() as i64;
    *offsets.entry(change.offset_key()).or_insert(0) += delta;
}
