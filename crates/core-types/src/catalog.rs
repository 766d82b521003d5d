use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The variables a session offers and the subset currently selected.
///
/// Every transition returns a new catalog and leaves `self` untouched. The
/// selection keeps insertion order, which is also the order variables are sent
/// to the gateway in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableCatalog {
    all: Vec<String>,
    selected: Vec<String>,
}

impl VariableCatalog {
    /// Builds a catalog with every variable selected. Duplicate names are
    /// dropped, keeping the first occurrence.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let mut seen = HashSet::new();
        let all: Vec<String> = names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self {
            selected: all.clone(),
            all,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[String] {
        &self.all
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.all.iter().any(|n| n == name)
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.iter().any(|n| n == name)
    }

    /// Flips one variable in or out of the selection. A newly selected name
    /// goes to the end. Returns `None` for a name the catalog does not offer.
    pub fn with_toggled(&self, name: &str) -> Option<Self> {
        if !self.contains(name) {
            return None;
        }
        let selected = if self.is_selected(name) {
            self.selected.iter().filter(|n| *n != name).cloned().collect()
        } else {
            let mut next = self.selected.clone();
            next.push(name.to_string());
            next
        };
        Some(Self {
            all: self.all.clone(),
            selected,
        })
    }

    pub fn with_all_selected(&self) -> Self {
        Self {
            all: self.all.clone(),
            selected: self.all.clone(),
        }
    }

    pub fn with_cleared(&self) -> Self {
        Self {
            all: self.all.clone(),
            selected: Vec::new(),
        }
    }

    /// Names containing `query`, ignoring case, in catalog order.
    /// An empty query matches everything.
    pub fn matching(&self, query: &str) -> Vec<&str> {
        let needle = query.trim().to_lowercase();
        self.all
            .iter()
            .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }
}
