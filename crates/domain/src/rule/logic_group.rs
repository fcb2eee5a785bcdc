//! Logic group — a boolean AND/OR node combining items and nested groups.

use serde::{Deserialize, Serialize};

/// How the children of a [`LogicGroup`] combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicGroupOperator {
    #[default]
    And,
    Or,
}

/// A recursive tree node whose leaves are `T` items.
///
/// Both lists are optional on the wire; an absent list and an empty list
/// are treated the same by every reader in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicGroup<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<LogicGroupOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<LogicGroup<T>>>,
}

impl<T> Default for LogicGroup<T> {
    fn default() -> Self {
        Self {
            operator: None,
            items: None,
            groups: None,
        }
    }
}

impl<T> LogicGroup<T> {
    /// Create an empty group combining its children with `operator`.
    #[must_use]
    pub fn new(operator: LogicGroupOperator) -> Self {
        Self {
            operator: Some(operator),
            items: None,
            groups: None,
        }
    }

    /// Append an item, returning the group.
    #[must_use]
    pub fn with_item(mut self, item: T) -> Self {
        self.items.get_or_insert_with(Vec::new).push(item);
        self
    }

    /// Append a nested group, returning the group.
    #[must_use]
    pub fn with_group(mut self, group: LogicGroup<T>) -> Self {
        self.groups.get_or_insert_with(Vec::new).push(group);
        self
    }

    /// Direct items, empty when the list is absent.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Direct child groups, empty when the list is absent.
    #[must_use]
    pub fn groups(&self) -> &[LogicGroup<T>] {
        self.groups.as_deref().unwrap_or_default()
    }

    /// `true` when the group has neither items nor child groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty() && self.groups().is_empty()
    }

    /// Follow `path` (child group indexes from this group) to a nested group.
    #[must_use]
    pub fn group_at(&self, path: &[usize]) -> Option<&LogicGroup<T>> {
        path.iter()
            .try_fold(self, |group, &index| group.groups().get(index))
    }

    /// Mutable counterpart of [`LogicGroup::group_at`].
    pub fn group_at_mut(&mut self, path: &[usize]) -> Option<&mut LogicGroup<T>> {
        path.iter().try_fold(self, |group, &index| {
            group.groups.as_mut().and_then(|groups| groups.get_mut(index))
        })
    }
}
