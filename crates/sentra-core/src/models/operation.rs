//! The closed set of operations a permission can grant.

use serde::{Deserialize, Serialize};

/// An action performed on a [`Resource`](super::resource::Resource).
///
/// Stored and serialized in upper-case form (`"CREATE"`, `"READ"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Read => "READ",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&Operation::Create).unwrap(),
            "\"CREATE\""
        );
        let parsed: Operation = serde_json::from_str("\"DELETE\"").unwrap();
        assert_eq!(parsed, Operation::Delete);
    }

    #[test]
    fn display_matches_as_str() {
        for op in Operation::ALL {
            assert_eq!(op.to_string(), op.as_str());
        }
    }
}
