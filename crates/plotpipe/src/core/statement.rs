//! Command line builder shared by all serializers
//!
//! A [`Statement`] collects whitespace-separated fragments; its `Display` impl
//! joins them into one line without a terminator.

use std::fmt;

/// One gnuplot statement under construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    fragments: Vec<String>,
}

impl Statement {
    /// Create an empty statement
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a statement with a leading keyword or fragment
    pub fn starting_with(head: impl Into<String>) -> Self {
        let mut statement = Self::new();
        statement.push(head);
        statement
    }

    /// Append a fragment, ignoring empty ones
    pub fn push(&mut self, fragment: impl Into<String>) -> &mut Self {
        let fragment = fragment.into();
        if !fragment.is_empty() {
            self.fragments.push(fragment);
        }
        self
    }

    /// Append `keyword value`
    pub fn push_pair(&mut self, keyword: &str, value: impl fmt::Display) -> &mut Self {
        self.push(format!("{} {}", keyword, value))
    }

    /// Number of fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Iterate over fragments in order
    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(String::as_str)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fragments.join(" "))
    }
}
