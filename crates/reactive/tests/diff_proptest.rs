//! Property-based tests for the diff engine.
//!
//! These tests verify that replaying a change onto the previous result
//! reproduces the new result, and that the change lists are well formed,
//! for randomly generated pairs of ordered results.

use larder_core::Identified;
use larder_reactive::{diff, CollectionChange};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: String,
    version: u8,
}

impl Identified for Row {
    fn document_id(&self) -> &str {
        &self.id
    }
}

/// Strategy for an ordered result drawn from a small id universe, so that
/// two draws share many ids.
fn ordered_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::sample::subsequence((0..24u32).collect::<Vec<_>>(), 0..=24)
        .prop_flat_map(|ids| {
            let n = ids.len();
            (Just(ids).prop_shuffle(), prop::collection::vec(0u8..3, n))
        })
        .prop_map(|(ids, versions)| {
            ids.into_iter()
                .zip(versions)
                .map(|(id, version)| Row {
                    id: format!("d{}", id),
                    version,
                })
                .collect()
        })
}

fn is_ascending(indices: &[usize]) -> bool {
    indices.windows(2).all(|w| w[0] < w[1])
}

proptest! {
    /// Property: replaying the change onto the previous result reproduces
    /// the new result exactly.
    #[test]
    fn replay_reproduces_result(prev in ordered_rows(), next in ordered_rows()) {
        let change = CollectionChange::from_diff(next.clone(), diff(&prev, &next).unwrap());
        prop_assert_eq!(change.apply(&prev), Some(next));
    }

    /// Property: deletions and insertions name exactly the vanished and new ids.
    #[test]
    fn change_lists_are_well_formed(prev in ordered_rows(), next in ordered_rows()) {
        let d = diff(&prev, &next).unwrap();
        let prev_ids: HashSet<&str> = prev.iter().map(|r| r.id.as_str()).collect();
        let next_ids: HashSet<&str> = next.iter().map(|r| r.id.as_str()).collect();

        prop_assert!(is_ascending(&d.deletions));
        prop_assert!(is_ascending(&d.insertions));
        prop_assert!(d.modifications.windows(2).all(|w| w[0].0 < w[1].0));

        let deleted: HashSet<&str> = d.deletions.iter().map(|&i| prev[i].id.as_str()).collect();
        let inserted: HashSet<&str> = d.insertions.iter().map(|&j| next[j].id.as_str()).collect();
        prop_assert_eq!(deleted, &prev_ids - &next_ids);
        prop_assert_eq!(inserted, &next_ids - &prev_ids);

        for &(i, j) in &d.modifications {
            prop_assert_eq!(&prev[i].id, &next[j].id);
        }
        prop_assert_eq!(d.correspondences.len(), (&prev_ids & &next_ids).len());
    }

    /// Property: a result diffed against itself has no changes.
    #[test]
    fn self_diff_is_empty(rows in ordered_rows()) {
        let d = diff(&rows, &rows).unwrap();
        prop_assert!(d.is_empty());
    }

    /// Property: dropping entries without reordering reports only deletions.
    #[test]
    fn removals_report_no_moves(rows in ordered_rows(), keep in prop::collection::vec(any::<bool>(), 24)) {
        let next: Vec<Row> = rows
            .iter()
            .zip(keep.iter().cycle())
            .filter(|(_, &k)| k)
            .map(|(r, _)| r.clone())
            .collect();
        let d = diff(&rows, &next).unwrap();
        prop_assert!(d.insertions.is_empty());
        prop_assert!(d.modifications.is_empty());
        prop_assert_eq!(d.deletions.len(), rows.len() - next.len());
    }
}
