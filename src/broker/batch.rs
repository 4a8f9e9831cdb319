/// Ids touched by one committed write, grouped by kind of change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeBatch {
    pub create: Vec<u64>,
    pub update: Vec<u64>,
    pub remove: Vec<u64>,
}

impl ChangeBatch {
    pub fn created(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            create: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn updated(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            update: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn removed(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            remove: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }

    /// Append all three lists of `other`, returning the lengths beforehand.
    pub(super) fn append(&mut self, other: &ChangeBatch) -> (usize, usize, usize) {
        let marks = (self.create.len(), self.update.len(), self.remove.len());
        self.create.extend_from_slice(&other.create);
        self.update.extend_from_slice(&other.update);
        self.remove.extend_from_slice(&other.remove);
        marks
    }

    /// Drop everything appended since `marks` was taken.
    pub(super) fn truncate(&mut self, marks: (usize, usize, usize)) {
        self.create.truncate(marks.0);
        self.update.truncate(marks.1);
        self.remove.truncate(marks.2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_truncate_restores_previous_content() {
        let mut mailbox = ChangeBatch::updated([1]);
        let marks = mailbox.append(&ChangeBatch {
            create: vec![2],
            update: vec![3],
            remove: vec![4],
        });
        assert_eq!(mailbox.update, vec![1, 3]);

        mailbox.truncate(marks);
        assert_eq!(mailbox, ChangeBatch::updated([1]));
    }

    #[test]
    fn is_empty_checks_all_lists() {
        assert!(ChangeBatch::default().is_empty());
        assert!(!ChangeBatch::removed([9]).is_empty());
    }
}
