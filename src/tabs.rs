//! Tab provider interface.
//!
//! The input layer never owns tabs. The host exposes the currently open tabs
//! through [`TabProvider`] and reports lifecycle changes to the session.

use std::path::PathBuf;

/// Unique identifier for a tab
pub type TabId = u64;

/// Read-only view of an open tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    /// Pinned tabs may be excluded from recent-tab cycling
    pub is_pinned: bool,
    /// Has unsaved changes
    pub is_dirty: bool,
    /// Backing file, if the document has been saved
    pub path: Option<PathBuf>,
}

impl TabInfo {
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            is_pinned: false,
            is_dirty: false,
            path: None,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.is_pinned = true;
        self
    }

    pub fn dirty(mut self) -> Self {
        self.is_dirty = true;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// File name of the backing path, or "Untitled"
    pub fn title(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }
}

/// Source of the currently open tabs.
pub trait TabProvider {
    /// All open tabs, in tab-bar order.
    fn open_tabs(&self) -> Vec<TabInfo>;

    fn is_open(&self, id: TabId) -> bool {
        self.open_tabs().iter().any(|tab| tab.id == id)
    }
}

impl TabProvider for [TabInfo] {
    fn open_tabs(&self) -> Vec<TabInfo> {
        self.to_vec()
    }

    fn is_open(&self, id: TabId) -> bool {
        self.iter().any(|tab| tab.id == id)
    }
}

impl TabProvider for Vec<TabInfo> {
    fn open_tabs(&self) -> Vec<TabInfo> {
        self.as_slice().open_tabs()
    }

    fn is_open(&self, id: TabId) -> bool {
        self.as_slice().is_open(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        assert_eq!(TabInfo::new(1).title(), "Untitled");
        assert_eq!(
            TabInfo::new(2).with_path("/home/me/notes.md").title(),
            "notes.md"
        );
    }

    #[test]
    fn test_vec_provider() {
        let tabs = vec![TabInfo::new(1), TabInfo::new(2).pinned().dirty()];
        assert!(tabs.is_open(2));
        assert!(!tabs.is_open(3));
        assert_eq!(tabs.open_tabs().len(), 2);
        assert!(tabs.open_tabs()[1].is_pinned);
    }
}
