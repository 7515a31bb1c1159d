use std::fmt::{self, Display};

/// Identifier for a queued message.
///
/// A ULID: globally unique, lexicographically sortable by creation time, and
/// collision-resistant, so no two queue entries can share an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueuedMessageId {
    id: ulid::Ulid,
}

impl QueuedMessageId {
    /// Generate a new unique message ID.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            id: ulid::Ulid::new(),
        }
    }

    /// Create a message ID from an existing ULID.
    #[must_use]
    pub const fn new(id: ulid::Ulid) -> Self {
        Self { id }
    }

    /// The underlying ULID.
    #[must_use]
    pub const fn ulid(&self) -> ulid::Ulid {
        self.id
    }
}

impl Display for QueuedMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.id, f)
    }
}

impl From<ulid::Ulid> for QueuedMessageId {
    fn from(id: ulid::Ulid) -> Self {
        Self { id }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = QueuedMessageId::generate();
        let b = QueuedMessageId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn displays_as_ulid_string() {
        let id = QueuedMessageId::generate();
        assert_eq!(id.to_string().len(), 26);
    }
}
