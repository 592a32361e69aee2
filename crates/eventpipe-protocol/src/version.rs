/// Wire protocol version. Only two versions have ever been emitted; the
/// unsupported-operation set differs between them and must be enforced
/// exactly (see `unsupported_operations`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V1,
    V2,
}

impl Version {
    pub fn from_i64(raw: i64) -> Option<Self> {
        match raw {
            1 => Some(Version::V1),
            2 => Some(Version::V2),
            _ => None,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Version::V1 => 1,
            Version::V2 => 2,
        }
    }

    /// Operations that are known to exist on the wire for this version but
    /// carry no post-processing work; the decoder drops them silently
    /// rather than failing.
    pub fn unsupported_operations(self) -> &'static [&'static str] {
        match self {
            Version::V1 => &["delete", "delete_groups", "merge", "unmerge"],
            Version::V2 => &[
                "start_delete_groups",
                "end_delete_groups",
                "start_merge",
                "end_merge",
                "start_unmerge",
                "end_unmerge",
                "start_delete_tag",
                "end_delete_tag",
                "exclude_groups",
                "tombstone_events",
                "replace_group",
            ],
        }
    }

    pub fn is_unsupported(self, operation: &str) -> bool {
        self.unsupported_operations().contains(&operation)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}
