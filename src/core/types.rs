//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Short prefix for log and ledger text
            pub fn short(&self) -> String {
                self.0.to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Unique identifier for tracked units
    UnitId
);
id_type!(
    /// Unique identifier for artillery pieces
    PieceId
);
id_type!(
    /// Unique identifier for forward observers
    ObserverId
);
id_type!(
    /// Unique identifier for fire missions (shared across the pending/active phases)
    MissionId
);
id_type!(
    /// Unique identifier for alerts
    AlertId
);
id_type!(
    /// Unique identifier for history events
    EventId
);
id_type!(
    /// Unique identifier for logistics requests
    RequestId
);
id_type!(
    /// Unique identifier for after-action reports
    ReportId
);
id_type!(
    /// Unique identifier for roster users
    UserId
);

/// Unix timestamp in milliseconds
pub type Timestamp = u64;

/// A fire mission requester: tracked units and forward observers both qualify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequesterId {
    Unit(UnitId),
    Observer(ObserverId),
}

/// Reference from a ledger entry to the entity it concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    Unit(UnitId),
    Piece(PieceId),
    Observer(ObserverId),
    Mission(MissionId),
    Alert(AlertId),
    Report(ReportId),
    LogisticsRequest(RequestId),
    User(UserId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(UnitId::new(), UnitId::new());
        assert_ne!(MissionId::new(), MissionId::new());
    }

    #[test]
    fn test_id_hash() {
        use std::collections::HashMap;
        let id = UnitId::new();
        let mut map: HashMap<UnitId, &str> = HashMap::new();
        map.insert(id, "first platoon");
        assert_eq!(map.get(&id), Some(&"first platoon"));
    }

    #[test]
    fn test_short_prefix_length() {
        assert_eq!(AlertId::new().short().len(), 8);
    }
}
