//! Collection change for tracking live query result changes.
//!
//! A `CollectionChange` is what UI binding layers consume: the new ordered
//! result plus the positional changes that turn the previously delivered
//! result into it.

use crate::diff::Diff;

/// Changes to an ordered query result.
///
/// Built once per store notification and never mutated afterwards:
/// - `result`: the complete ordered result after the change
/// - `deletions`: prior positions, ascending
/// - `insertions`: new positions, ascending
/// - `modifications`: `(prior, new)` pairs, ascending by prior
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionChange<E> {
    result: Vec<E>,
    deletions: Vec<usize>,
    insertions: Vec<usize>,
    modifications: Vec<(usize, usize)>,
}

impl<E> CollectionChange<E> {
    /// Creates a change representing an initial result: everything is inserted.
    pub fn initial(result: Vec<E>) -> Self {
        let insertions = (0..result.len()).collect();
        Self {
            result,
            deletions: Vec::new(),
            insertions,
            modifications: Vec::new(),
        }
    }

    /// Packages an already filtered and sorted result with its diff.
    pub fn from_diff(result: Vec<E>, diff: Diff) -> Self {
        Self {
            result,
            deletions: diff.deletions,
            insertions: diff.insertions,
            modifications: diff.modifications,
        }
    }

    /// Returns the complete ordered result.
    #[inline]
    pub fn result(&self) -> &[E] {
        &self.result
    }

    /// Consumes the change and returns the result.
    #[inline]
    pub fn into_result(self) -> Vec<E> {
        self.result
    }

    #[inline]
    pub fn deletions(&self) -> &[usize] {
        &self.deletions
    }

    #[inline]
    pub fn insertions(&self) -> &[usize] {
        &self.insertions
    }

    #[inline]
    pub fn modifications(&self) -> &[(usize, usize)] {
        &self.modifications
    }

    /// Returns the modifications whose position changed.
    pub fn moves(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.modifications.iter().copied().filter(|(from, to)| from != to)
    }

    /// Returns true if there are no changes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.insertions.is_empty() && self.modifications.is_empty()
    }

    /// Returns the total number of changes.
    #[inline]
    pub fn len(&self) -> usize {
        self.deletions.len() + self.insertions.len() + self.modifications.len()
    }

    /// Maps the result entities, keeping the change lists.
    pub fn map<U, F>(self, f: F) -> CollectionChange<U>
    where
        F: FnMut(E) -> U,
    {
        CollectionChange {
            result: self.result.into_iter().map(f).collect(),
            deletions: self.deletions,
            insertions: self.insertions,
            modifications: self.modifications,
        }
    }

    /// Replays this change onto the previously delivered result.
    ///
    /// Deleted positions and modification sources leave `previous`; the
    /// remaining entries keep their relative order and fill, in order, every
    /// new position that is neither an insertion nor a modification target.
    /// Inserted and modified positions take their entity from `result`.
    ///
    /// Returns `None` if the change does not fit `previous`.
    pub fn apply(&self, previous: &[E]) -> Option<Vec<E>>
    where
        E: Clone,
    {
        let mut leaving = vec![false; previous.len()];
        for &i in &self.deletions {
            *leaving.get_mut(i)? = true;
        }
        let mut targeted = vec![false; self.result.len()];
        for &j in &self.insertions {
            *targeted.get_mut(j)? = true;
        }
        for &(i, j) in &self.modifications {
            *leaving.get_mut(i)? = true;
            *targeted.get_mut(j)? = true;
        }

        let mut stable = previous
            .iter()
            .zip(&leaving)
            .filter(|(_, &gone)| !gone)
            .map(|(item, _)| item);

        let mut rebuilt = Vec::with_capacity(self.result.len());
        for (j, fresh) in self.result.iter().enumerate() {
            if targeted[j] {
                rebuilt.push(fresh.clone());
            } else {
                rebuilt.push(stable.next()?.clone());
            }
        }
        if stable.next().is_some() {
            return None;
        }
        Some(rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use larder_core::Identified;

    #[derive(Clone, Debug, PartialEq)]
    struct Item(&'static str, i64);

    impl Identified for Item {
        fn document_id(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_change_initial() {
        let change = CollectionChange::initial(vec![Item("a", 1), Item("b", 2)]);
        assert_eq!(change.insertions(), &[0, 1]);
        assert!(change.deletions().is_empty());
        assert!(change.modifications().is_empty());
        assert_eq!(change.len(), 2);
        assert_eq!(change.apply(&[]).unwrap(), change.result());
    }

    #[test]
    fn test_change_empty_initial() {
        let change: CollectionChange<Item> = CollectionChange::initial(Vec::new());
        assert!(change.is_empty());
        assert!(change.result().is_empty());
    }

    #[test]
    fn test_change_apply_reproduces_result() {
        let prev = vec![Item("a", 1), Item("b", 2), Item("c", 3), Item("d", 4)];
        let next = vec![Item("c", 30), Item("e", 5), Item("a", 1), Item("d", 4)];
        let change = CollectionChange::from_diff(next.clone(), diff(&prev, &next).unwrap());

        assert_eq!(change.deletions(), &[1]);
        assert_eq!(change.insertions(), &[1]);
        assert_eq!(change.apply(&prev).unwrap(), next);
    }

    #[test]
    fn test_change_apply_takes_stable_entries_from_previous() {
        // Content-blind diff: the stale "a" survives from the previous list.
        let prev = vec![Item("a", 1)];
        let next = vec![Item("a", 2)];
        let d = crate::diff::diff_by(&prev, &next, |_, _| true).unwrap();
        let change = CollectionChange::from_diff(next, d);
        assert_eq!(change.apply(&prev).unwrap(), vec![Item("a", 1)]);
    }

    #[test]
    fn test_change_apply_rejects_mismatched_previous() {
        let change = CollectionChange::from_diff(
            vec![Item("a", 1)],
            Diff {
                deletions: vec![5],
                ..Diff::default()
            },
        );
        assert!(change.apply(&[Item("a", 1)]).is_none());

        let change = CollectionChange::initial(vec![Item("a", 1)]);
        assert!(change.apply(&[Item("z", 0)]).is_none());
    }

    #[test]
    fn test_change_moves_and_map() {
        let prev = vec![Item("a", 0), Item("b", 0)];
        let next = vec![Item("b", 0), Item("a", 0)];
        let change = CollectionChange::from_diff(next.clone(), diff(&prev, &next).unwrap());
        assert_eq!(change.moves().count(), 1);

        let names = change.map(|item| item.0);
        assert_eq!(names.result(), &["b", "a"]);
        assert_eq!(names.modifications().len(), 1);
    }
}
