use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a model element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub Uuid);

impl ElementId {
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of fresh element identifiers.
pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    fn generate(&self) -> ElementId;
}

/// Random 128-bit (UUID v4) identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn generate(&self) -> ElementId {
        ElementId(Uuid::new_v4())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use sequential::SequentialIds;

#[cfg(any(test, feature = "test-utils"))]
mod sequential {
    use std::sync::atomic::{AtomicU64, Ordering};

    use uuid::Uuid;

    use super::{ElementId, IdGenerator};

    /// Predictable identifiers 1, 2, 3, ... for tests.
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        next: AtomicU64,
    }

    impl SequentialIds {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl IdGenerator for SequentialIds {
        fn generate(&self) -> ElementId {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            ElementId(Uuid::from_u128(u128::from(n)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_differ() {
        let ids = RandomIds;
        let a = ids.generate();
        let b = ids.generate();
        assert_ne!(a, b);
        assert!(!a.is_nil());
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new();
        assert_eq!(ids.generate(), ElementId(Uuid::from_u128(1)));
        assert_eq!(ids.generate(), ElementId(Uuid::from_u128(2)));
    }

    #[test]
    fn test_element_id_display() {
        let id = ElementId(Uuid::from_u128(1));
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000001");
    }
}
