use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An insertion-ordered, duplicate-free list of link strings
///
/// Serializes as a plain JSON array. Duplicates in a loaded array are
/// dropped, keeping the first occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LinkSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl LinkSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a link if it is not already present
    ///
    /// Returns `true` if the link was new.
    pub fn insert(&mut self, link: impl Into<String>) -> bool {
        let link = link.into();
        if self.index.contains(&link) {
            return false;
        }
        self.index.insert(link.clone());
        self.order.push(link);
        true
    }

    /// Appends every new link from `links`, returning how many were new
    pub fn extend_new<I, S>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for link in links {
            if self.insert(link) {
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, link: &str) -> bool {
        self.index.contains(link)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates links in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }
}

impl PartialEq for LinkSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for LinkSet {}

impl From<Vec<String>> for LinkSet {
    fn from(links: Vec<String>) -> Self {
        let mut set = LinkSet::new();
        for link in links {
            set.insert(link);
        }
        set
    }
}

impl From<LinkSet> for Vec<String> {
    fn from(set: LinkSet) -> Self {
        set.order
    }
}

impl<S: Into<String>> FromIterator<S> for LinkSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LinkSet::new();
        for link in iter {
            set.insert(link);
        }
        set
    }
}
