//! Sort editing on the entity catalog.
//!
//! The catalog's entries carry the sort specification in their `ordering`.
//! Columns apply in ascending rank order, each with its own direction.

use serde::{Deserialize, Serialize};

use crate::schema::{FieldType, Path};

use super::filter_path::SortKey;
use super::group::OrFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards rank 0 (higher priority).
    Up,
    Down,
}

/// One column of the effective sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortColumn {
    pub path: Path,
    pub descending: bool,
}

/// Direction assigned when a field is first added to the sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortPolicy {
    #[serde(default)]
    pub text_descending: bool,
    #[serde(default = "default_other_descending")]
    pub other_descending: bool,
}

fn default_other_descending() -> bool {
    true
}

impl Default for SortPolicy {
    fn default() -> Self {
        Self {
            text_descending: false,
            other_descending: default_other_descending(),
        }
    }
}

impl SortPolicy {
    pub fn descending_for(&self, field_type: &FieldType) -> bool {
        if field_type.is_text() {
            self.text_descending
        } else {
            self.other_descending
        }
    }
}

impl OrFilter {
    /// Append `path` to the sort with the next free rank.
    ///
    /// No-op when the field is already sorted or not in the catalog.
    pub fn add_sort(mut self, path: &Path, ascending: bool) -> Self {
        let rank = self
            .filter_paths
            .iter()
            .filter_map(|fp| fp.ordering.map(|o| o.rank))
            .max()
            .map_or(0, |max| max + 1);
        if let Some(entry) = self.filter_paths.iter_mut().find(|fp| &fp.path == path) {
            if entry.ordering.is_none() {
                entry.ordering = Some(SortKey {
                    rank,
                    descending: !ascending,
                });
            }
        }
        self
    }

    /// Drop `path` from the sort. The catalog entry itself stays.
    pub fn remove_sort(mut self, path: &Path) -> Self {
        if let Some(entry) = self.filter_paths.iter_mut().find(|fp| &fp.path == path) {
            entry.ordering = None;
        }
        self
    }

    /// Swap ranks with the entry directly above or below `path`.
    ///
    /// Each entry keeps its own direction. No-op when there is no entry at the
    /// adjacent rank.
    pub fn move_sort(mut self, path: &Path, direction: MoveDirection) -> Self {
        let Some(rank) = self.entry(path).and_then(|fp| fp.ordering).map(|o| o.rank) else {
            return self;
        };
        let target = match direction {
            MoveDirection::Up => match rank.checked_sub(1) {
                Some(target) => target,
                None => return self,
            },
            MoveDirection::Down => rank + 1,
        };
        let Some(neighbour) = self
            .filter_paths
            .iter()
            .position(|fp| fp.ordering.is_some_and(|o| o.rank == target))
        else {
            return self;
        };
        let Some(own) = self.filter_paths.iter().position(|fp| &fp.path == path) else {
            return self;
        };

        if let Some(ordering) = self.filter_paths[neighbour].ordering.as_mut() {
            ordering.rank = rank;
        }
        if let Some(ordering) = self.filter_paths[own].ordering.as_mut() {
            ordering.rank = target;
        }
        self
    }

    /// Flip the direction of a sorted field. No-op when not sorted.
    pub fn toggle_sort_direction(mut self, path: &Path) -> Self {
        if let Some(ordering) = self
            .filter_paths
            .iter_mut()
            .find(|fp| &fp.path == path)
            .and_then(|fp| fp.ordering.as_mut())
        {
            ordering.descending = !ordering.descending;
        }
        self
    }

    /// Effective sort order: sorted entries by ascending rank.
    pub fn sort_spec(&self) -> Vec<SortColumn> {
        let mut sorted: Vec<(SortKey, &Path)> = self
            .filter_paths
            .iter()
            .filter_map(|fp| fp.ordering.map(|o| (o, &fp.path)))
            .collect();
        sorted.sort_by_key(|(key, _)| key.rank);
        sorted
            .into_iter()
            .map(|(key, path)| SortColumn {
                path: path.clone(),
                descending: key.descending,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPath;

    fn catalog() -> OrFilter {
        OrFilter::new(0)
            .with_filter_path(FilterPath::new("Title", Path::field("title"), FieldType::Str))
            .with_filter_path(FilterPath::new("Pages", Path::field("pages"), FieldType::U32))
            .with_filter_path(FilterPath::new("Year", Path::field("year"), FieldType::I32))
    }

    fn rank_of(catalog: &OrFilter, field: &str) -> Option<u32> {
        catalog
            .entry(&Path::field(field))
            .and_then(|fp| fp.ordering)
            .map(|o| o.rank)
    }

    #[test]
    fn add_sort_assigns_increasing_ranks() {
        let catalog = catalog()
            .add_sort(&Path::field("year"), false)
            .add_sort(&Path::field("title"), true);

        assert_eq!(rank_of(&catalog, "year"), Some(0));
        assert_eq!(rank_of(&catalog, "title"), Some(1));
        assert_eq!(
            catalog.sort_spec(),
            vec![
                SortColumn {
                    path: Path::field("year"),
                    descending: true
                },
                SortColumn {
                    path: Path::field("title"),
                    descending: false
                },
            ]
        );
    }

    #[test]
    fn add_sort_twice_is_noop() {
        let once = catalog().add_sort(&Path::field("year"), true);
        let twice = once.clone().add_sort(&Path::field("year"), false);
        assert_eq!(once, twice);
    }

    #[test]
    fn add_sort_unknown_field_is_noop() {
        let before = catalog();
        assert_eq!(before.clone().add_sort(&Path::field("isbn"), true), before);
    }

    #[test]
    fn remove_sort_keeps_entry() {
        let catalog = catalog()
            .add_sort(&Path::field("year"), true)
            .remove_sort(&Path::field("year"));
        assert_eq!(rank_of(&catalog, "year"), None);
        assert!(catalog.entry(&Path::field("year")).is_some());
        assert!(catalog.sort_spec().is_empty());
    }

    #[test]
    fn move_sort_swaps_ranks_and_keeps_directions() {
        let catalog = catalog()
            .add_sort(&Path::field("title"), true)
            .add_sort(&Path::field("year"), false)
            .move_sort(&Path::field("year"), MoveDirection::Up);

        let spec = catalog.sort_spec();
        assert_eq!(spec[0].path, Path::field("year"));
        assert!(spec[0].descending);
        assert_eq!(spec[1].path, Path::field("title"));
        assert!(!spec[1].descending);
    }

    #[test]
    fn move_sort_without_neighbour_is_noop() {
        let catalog = catalog().add_sort(&Path::field("title"), true);
        let moved = catalog.clone().move_sort(&Path::field("title"), MoveDirection::Up);
        assert_eq!(moved, catalog);
        let moved = catalog.clone().move_sort(&Path::field("title"), MoveDirection::Down);
        assert_eq!(moved, catalog);
    }

    #[test]
    fn toggle_flips_only_sorted_fields() {
        let catalog = catalog().add_sort(&Path::field("pages"), true);
        let toggled = catalog
            .clone()
            .toggle_sort_direction(&Path::field("pages"))
            .toggle_sort_direction(&Path::field("title"));

        assert!(toggled.sort_spec()[0].descending);
        assert!(toggled.entry(&Path::field("title")).unwrap().ordering.is_none());
    }

    #[test]
    fn policy_distinguishes_text() {
        let policy = SortPolicy::default();
        assert!(!policy.descending_for(&FieldType::Clob));
        assert!(policy.descending_for(&FieldType::Timestamp));
    }
}
