//! Reordering of the running order.
//!
//! A move removes the row at `from`, reinserts it at `to` and renumbers every
//! row so `order` is again `0..N` in array order. Only positions change; the
//! set of rows never does.

use crate::error::ValidationError;
use crate::types::ScheduleItem;
use serde::{Deserialize, Serialize};

/// Where a dragged row was dropped relative to the target row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropPosition {
    /// Insert immediately before the target
    Above,
    /// Insert immediately after the target
    Below,
}

/// Move the row at `from` to `to`, returning the renumbered running order.
///
/// `from == to` returns the same rows, renumbered.
///
/// # Errors
///
/// Returns [`ValidationError::IndexOutOfRange`] if either index is outside
/// the running order.
pub fn move_item(items: &[ScheduleItem], from: usize, to: usize) -> Result<Vec<ScheduleItem>, ValidationError> {
    check_index(from, items.len())?;
    check_index(to, items.len())?;

    let mut reordered = items.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    renumber(&mut reordered);
    Ok(reordered)
}

/// Translate a drop onto `target` into the `to` index for [`move_item`].
///
/// Indices are positions before the move. Dropping a row onto itself keeps
/// it where it is.
///
/// # Errors
///
/// Returns [`ValidationError::IndexOutOfRange`] if either index is outside
/// a running order of `len` rows.
pub fn drop_index(from: usize, target: usize, position: DropPosition, len: usize) -> Result<usize, ValidationError> {
    check_index(from, len)?;
    check_index(target, len)?;

    if from == target {
        return Ok(from);
    }

    // Once `from` is removed, rows after it shift up by one.
    let to = match (position, from < target) {
        (DropPosition::Above, true) => target - 1,
        (DropPosition::Above, false) | (DropPosition::Below, true) => target,
        (DropPosition::Below, false) => target + 1,
    };
    Ok(to)
}

/// Set every row's `order` to its array position
pub fn renumber(items: &mut [ScheduleItem]) {
    for (position, item) in (0u32..).zip(items.iter_mut()) {
        item.order = position;
    }
}

/// Whether `order` is exactly `0..N` in array order
#[must_use]
pub fn is_contiguous(items: &[ScheduleItem]) -> bool {
    (0u32..).zip(items).all(|(position, item)| item.order == position)
}

const fn check_index(index: usize, len: usize) -> Result<(), ValidationError> {
    if index < len {
        Ok(())
    } else {
        Err(ValidationError::IndexOutOfRange { index, len })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Category, Gender, LevelId, Phase, ScheduleItemId};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn schedule(len: usize) -> Vec<ScheduleItem> {
        let mut items: Vec<ScheduleItem> = (0..len)
            .map(|index| ScheduleItem {
                id: ScheduleItemId::new(),
                level_id: LevelId::new("Seriado"),
                category: Category::new(format!("C{index}")),
                gender: Gender::Mixto,
                phase: Phase::Final,
                order: 0,
                estimated_time: 10,
            })
            .collect();
        renumber(&mut items);
        items
    }

    fn categories(items: &[ScheduleItem]) -> Vec<String> {
        items.iter().map(|item| item.category.to_string()).collect()
    }

    #[test]
    fn moving_down_shifts_rows_up() {
        let moved = move_item(&schedule(4), 0, 2).unwrap();
        assert_eq!(categories(&moved), vec!["C1", "C2", "C0", "C3"]);
        assert!(is_contiguous(&moved));
    }

    #[test]
    fn moving_up_shifts_rows_down() {
        let moved = move_item(&schedule(4), 3, 1).unwrap();
        assert_eq!(categories(&moved), vec!["C0", "C3", "C1", "C2"]);
        assert!(is_contiguous(&moved));
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(
            move_item(&schedule(3), 0, 3),
            Err(ValidationError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert!(move_item(&[], 0, 0).is_err());
    }

    #[test]
    fn drop_above_inserts_before_target() {
        let items = schedule(5);
        let to = drop_index(0, 3, DropPosition::Above, items.len()).unwrap();
        let moved = move_item(&items, 0, to).unwrap();
        assert_eq!(categories(&moved), vec!["C1", "C2", "C0", "C3", "C4"]);

        let to = drop_index(4, 1, DropPosition::Above, items.len()).unwrap();
        let moved = move_item(&items, 4, to).unwrap();
        assert_eq!(categories(&moved), vec!["C0", "C4", "C1", "C2", "C3"]);
    }

    #[test]
    fn drop_below_inserts_after_target() {
        let items = schedule(5);
        let to = drop_index(0, 3, DropPosition::Below, items.len()).unwrap();
        let moved = move_item(&items, 0, to).unwrap();
        assert_eq!(categories(&moved), vec!["C1", "C2", "C3", "C0", "C4"]);

        let to = drop_index(4, 1, DropPosition::Below, items.len()).unwrap();
        let moved = move_item(&items, 4, to).unwrap();
        assert_eq!(categories(&moved), vec!["C0", "C1", "C4", "C2", "C3"]);
    }

    #[test]
    fn drop_below_last_row_moves_to_end() {
        let items = schedule(3);
        let to = drop_index(0, 2, DropPosition::Below, items.len()).unwrap();
        assert_eq!(categories(&move_item(&items, 0, to).unwrap()), vec!["C1", "C2", "C0"]);
    }

    #[test]
    fn drop_onto_itself_is_a_no_op() {
        for position in [DropPosition::Above, DropPosition::Below] {
            assert_eq!(drop_index(2, 2, position, 4).unwrap(), 2);
        }
    }

    proptest! {
        #[test]
        fn move_is_a_permutation(len in 1usize..30, from_seed in any::<usize>(), to_seed in any::<usize>()) {
            let items = schedule(len);
            let from = from_seed % len;
            let to = to_seed % len;
            let moved = move_item(&items, from, to).unwrap();

            let before: BTreeSet<_> = items.iter().map(|item| item.id).collect();
            let after: BTreeSet<_> = moved.iter().map(|item| item.id).collect();
            prop_assert_eq!(before, after);
            prop_assert_eq!(moved.len(), items.len());
            prop_assert!(is_contiguous(&moved));
            prop_assert_eq!(moved[to].id, items[from].id);
        }

        #[test]
        fn drop_lands_next_to_target(len in 2usize..20, from_seed in any::<usize>(), target_seed in any::<usize>(), below in any::<bool>()) {
            let items = schedule(len);
            let from = from_seed % len;
            let target = target_seed % len;
            prop_assume!(from != target);
            let position = if below { DropPosition::Below } else { DropPosition::Above };

            let to = drop_index(from, target, position, len).unwrap();
            let moved = move_item(&items, from, to).unwrap();
            let moved_at = moved.iter().position(|item| item.id == items[from].id).unwrap();
            let target_at = moved.iter().position(|item| item.id == items[target].id).unwrap();

            match position {
                DropPosition::Above => prop_assert_eq!(moved_at + 1, target_at),
                DropPosition::Below => prop_assert_eq!(target_at + 1, moved_at),
            }
        }
    }
}
