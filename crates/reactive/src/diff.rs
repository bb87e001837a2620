//! Positional diff between two ordered results.
//!
//! Identity across the two orderings is the document id. Ids only in
//! `previous` become deletions (prior position), ids only in `next` become
//! insertions (new position). Survivors are reported as modifications when
//! their content changed or when they moved relative to the other unchanged
//! survivors; unchanged survivors on a longest increasing run of prior
//! positions stay put, so the set of moves is minimal.

use hashbrown::HashMap;
use larder_core::{Error, Identified, Result};
use tracing::trace;

/// Minimal positional delta between two ordered results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    /// Prior positions of removed documents, ascending.
    pub deletions: Vec<usize>,
    /// New positions of added documents, ascending.
    pub insertions: Vec<usize>,
    /// `(prior, new)` pairs of moved or changed survivors, ascending by prior.
    pub modifications: Vec<(usize, usize)>,
    /// `(prior, new)` pairs of every survivor, ascending by prior.
    pub correspondences: Vec<(usize, usize)>,
}

impl Diff {
    /// Returns true if there is nothing to delete, insert or modify.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.insertions.is_empty() && self.modifications.is_empty()
    }

    /// Returns the total number of reported changes.
    #[inline]
    pub fn len(&self) -> usize {
        self.deletions.len() + self.insertions.len() + self.modifications.len()
    }
}

fn index_by_id<T: Identified>(items: &[T]) -> Result<HashMap<&str, usize>> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if index.insert(item.document_id(), i).is_some() {
            return Err(Error::duplicate_document(item.document_id()));
        }
    }
    Ok(index)
}

/// Marks the members of one longest strictly increasing subsequence.
fn longest_increasing_run(seq: &[usize]) -> Vec<bool> {
    // tails[k]: index into seq of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (k, &value) in seq.iter().enumerate() {
        let pos = tails.partition_point(|&t| seq[t] < value);
        if pos > 0 {
            prev[k] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(k);
        } else {
            tails[pos] = k;
        }
    }

    let mut keep = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(k) = cursor {
        keep[k] = true;
        cursor = prev[k];
    }
    keep
}

/// Diffs two ordered results, treating survivors with unequal values as changed.
pub fn diff<T: Identified + PartialEq>(previous: &[T], next: &[T]) -> Result<Diff> {
    diff_by(previous, next, |a, b| a == b)
}

/// Diffs two ordered results with a caller-supplied content comparison.
///
/// Fails with `Error::DuplicateDocument` if either side repeats an id.
pub fn diff_by<T, F>(previous: &[T], next: &[T], same_content: F) -> Result<Diff>
where
    T: Identified,
    F: Fn(&T, &T) -> bool,
{
    let prev_index = index_by_id(previous)?;
    let next_index = index_by_id(next)?;

    let deletions: Vec<usize> = previous
        .iter()
        .enumerate()
        .filter(|(_, item)| !next_index.contains_key(item.document_id()))
        .map(|(i, _)| i)
        .collect();

    // Survivors in new order, as (prior, new).
    let mut insertions = Vec::new();
    let mut survivors = Vec::with_capacity(next.len().min(previous.len()));
    for (j, item) in next.iter().enumerate() {
        match prev_index.get(item.document_id()) {
            Some(&i) => survivors.push((i, j)),
            None => insertions.push(j),
        }
    }

    // Changed survivors are reported regardless of position, so only the
    // unchanged ones compete for staying put.
    let (mut modifications, unchanged): (Vec<(usize, usize)>, Vec<(usize, usize)>) = survivors
        .iter()
        .partition(|&&(i, j)| !same_content(&previous[i], &next[j]));

    let priors: Vec<usize> = unchanged.iter().map(|&(i, _)| i).collect();
    let stable = longest_increasing_run(&priors);
    modifications.extend(
        unchanged
            .iter()
            .zip(&stable)
            .filter(|(_, &keep)| !keep)
            .map(|(&pair, _)| pair),
    );
    modifications.sort_unstable();

    let mut correspondences = survivors;
    correspondences.sort_unstable();

    trace!(
        previous = previous.len(),
        next = next.len(),
        deletions = deletions.len(),
        insertions = insertions.len(),
        modifications = modifications.len(),
        "diffed ordered results"
    );

    Ok(Diff {
        deletions,
        insertions,
        modifications,
        correspondences,
    })
}
