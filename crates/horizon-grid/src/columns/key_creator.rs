//! Unique id allocation for columns and groups.
//!
//! Ids are deterministic: the same sequence of requests against the same
//! seeded keys always yields the same ids. Two grids configured with the
//! same definitions therefore agree on every column id.

use std::collections::HashSet;

/// Prefix used for columns with neither an id nor a field.
const COLUMN_KEY_PREFIX: &str = "col";

/// Prefix used for groups without an id, including padding groups.
const GROUP_KEY_PREFIX: &str = "group";

/// Hands out ids that are unique within one tree build.
#[derive(Debug, Default, Clone)]
pub struct ColumnKeyCreator {
    existing_keys: HashSet<String>,
}

impl ColumnKeyCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark keys as taken, typically the ids of the previous tree.
    pub fn add_existing_keys<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.existing_keys.extend(keys.into_iter().map(Into::into));
    }

    /// Allocate a column id from its requested id, else its field.
    pub fn unique_column_key(&mut self, col_id: Option<&str>, field: Option<&str>) -> String {
        let base = non_empty(col_id)
            .or_else(|| non_empty(field))
            .unwrap_or(COLUMN_KEY_PREFIX);
        self.claim(base)
    }

    /// Allocate a group id from its requested id.
    pub fn unique_group_key(&mut self, group_id: Option<&str>) -> String {
        let base = non_empty(group_id).unwrap_or(GROUP_KEY_PREFIX);
        self.claim(base)
    }

    fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut count = 0;
        while self.existing_keys.contains(&candidate) {
            count += 1;
            candidate = format!("{base}_{count}");
        }
        self.existing_keys.insert(candidate.clone());
        candidate
    }
}

fn non_empty(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty())
}
