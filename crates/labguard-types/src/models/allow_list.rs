//! Operator-supplied model allow-list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Model identifiers that keep their quota, in the order the operator gave
/// them. Duplicates keep their first position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AllowList {
    models: Vec<String>,
}

impl AllowList {
    /// Parse a comma-separated list. Entries are trimmed; empty entries are dropped.
    pub fn parse(raw: &str) -> Self {
        raw.split(',').map(str::trim).filter(|m| !m.is_empty()).map(str::to_string).collect()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }
}

impl FromIterator<String> for AllowList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut models: Vec<String> = Vec::new();
        for model in iter {
            if !models.contains(&model) {
                models.push(model);
            }
        }
        Self { models }
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.models.is_empty() {
            return f.write_str("(none)");
        }
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(", "))
    }
}
