//! Tab lifecycle and the registry that switches between tabs.

/// Hooks a tab receives from the [`TabRegistry`]
pub trait TabLifecycle {
    /// Called once, right before the first activation
    fn initialize(&mut self);

    fn activate(&mut self);

    fn deactivate(&mut self);

    /// May the user leave this tab now. A `false` keeps it active.
    fn can_deactivate(&self) -> bool;

    /// Reload whatever the tab shows
    fn refresh(&mut self);
}

struct TabEntry<T: ?Sized> {
    id: String,
    initialized: bool,
    tab: Box<T>,
}

/// Tabs by identifier, at most one of them active
pub struct TabRegistry<T: ?Sized> {
    tabs: Vec<TabEntry<T>>,
    active: Option<usize>,
}

impl<T: ?Sized> Default for TabRegistry<T> {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
        }
    }
}

impl<T: ?Sized + TabLifecycle> TabRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tab. A tab with the same `id` is replaced.
    pub fn register(&mut self, id: impl Into<String>, tab: Box<T>) {
        let id = id.into();
        let entry = TabEntry {
            id,
            initialized: false,
            tab,
        };

        if let Some(existing) = self.tabs.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry;
        } else {
            self.tabs.push(entry);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tabs.iter().map(|e| e.id.as_str())
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active
            .and_then(|i| self.tabs.get(i))
            .map(|e| e.id.as_str())
    }

    #[must_use]
    pub fn active(&self) -> Option<&T> {
        self.active
            .and_then(|i| self.tabs.get(i))
            .map(|e| e.tab.as_ref())
    }

    pub fn active_mut(&mut self) -> Option<&mut T> {
        self.active
            .and_then(|i| self.tabs.get_mut(i))
            .map(|e| e.tab.as_mut())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.tabs
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| e.tab.as_mut())
    }

    /// Switch to tab `id`. Returns `false` if there is no such tab or the active one
    /// refused to be left.
    pub fn activate(&mut self, id: &str) -> bool {
        let Some(target) = self.tabs.iter().position(|e| e.id == id) else {
            return false;
        };
        if self.active == Some(target) {
            return true;
        }

        if let Some(current) = self.active.and_then(|i| self.tabs.get_mut(i)) {
            if !current.tab.can_deactivate() {
                return false;
            }
            current.tab.deactivate();
        }

        let entry = &mut self.tabs[target];
        if !entry.initialized {
            entry.tab.initialize();
            entry.initialized = true;
        }
        entry.tab.activate();
        self.active = Some(target);
        true
    }

    pub fn refresh_active(&mut self) {
        if let Some(tab) = self.active_mut() {
            tab.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        calls: Vec<&'static str>,
        locked: bool,
    }

    impl TabLifecycle for Probe {
        fn initialize(&mut self) {
            self.calls.push("init");
        }
        fn activate(&mut self) {
            self.calls.push("activate");
        }
        fn deactivate(&mut self) {
            self.calls.push("deactivate");
        }
        fn can_deactivate(&self) -> bool {
            !self.locked
        }
        fn refresh(&mut self) {
            self.calls.push("refresh");
        }
    }

    fn registry() -> TabRegistry<Probe> {
        let mut reg = TabRegistry::new();
        reg.register("memory", Box::new(Probe::default()));
        reg.register("disassembly", Box::new(Probe::default()));
        reg
    }

    #[test]
    fn test_initialize_once() {
        // Arrange
        let mut reg = registry();

        // Act
        assert!(reg.activate("memory"));
        assert!(reg.activate("disassembly"));
        assert!(reg.activate("memory"));
        reg.refresh_active();

        // Assert
        assert_eq!(reg.active_id(), Some("memory"));
        let calls = reg.active().map(|t| t.calls.clone()).unwrap_or_default();
        assert_eq!(
            calls,
            vec!["init", "activate", "deactivate", "activate", "refresh"]
        );
    }

    #[test]
    fn test_refusing_tab_stays_active() {
        let mut reg = registry();
        reg.activate("memory");
        if let Some(tab) = reg.active_mut() {
            tab.locked = true;
        }

        assert!(!reg.activate("disassembly"));
        assert_eq!(reg.active_id(), Some("memory"));
        assert!(!reg.activate("nope"));
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut reg = registry();
        reg.register("memory", Box::new(Probe::default()));

        assert_eq!(reg.ids().collect::<Vec<_>>(), vec!["memory", "disassembly"]);
    }
}
