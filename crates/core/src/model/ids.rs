use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a research stage
    StageId
);
numeric_id!(
    /// Unique identifier for a topic within a stage
    TopicId
);
numeric_id!(
    /// Unique identifier for a checklist within a topic
    ChecklistId
);
numeric_id!(
    /// Identifier of an item, unique only inside its checklist
    ItemId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_formats() {
        let id = StageId::new(3);
        assert_eq!(format!("{id:?}"), "StageId(3)");
        assert_eq!(id.to_string(), "3");
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&TopicId::new(12)).unwrap();
        assert_eq!(json, "12");
        let back: TopicId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TopicId::new(12));
    }
}
