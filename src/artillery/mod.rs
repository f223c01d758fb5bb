//! Artillery pieces, ammunition stocks and forward observers

use serde::{Deserialize, Serialize};

use crate::core::types::{MissionId, ObserverId, PieceId, Timestamp, UnitId, UserId};
use crate::geo::GeoPoint;

/// Supported gun and launcher types, each with a fixed range bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtilleryKind {
    Howitzer155,
    Mlrs,
    Howitzer105M101A1,
    Howitzer105Lg1,
    Howitzer105L119,
    Mortar120M120,
    Mortar120Hy112,
}

impl ArtilleryKind {
    /// Minimum and maximum engagement range in meters
    pub fn range_bracket(&self) -> (f64, f64) {
        match self {
            ArtilleryKind::Howitzer155 => (3_000.0, 22_000.0),
            ArtilleryKind::Mlrs => (8_000.0, 70_000.0),
            ArtilleryKind::Howitzer105M101A1 => (2_000.0, 11_500.0),
            ArtilleryKind::Howitzer105Lg1 => (3_000.0, 22_000.0),
            ArtilleryKind::Howitzer105L119 => (3_000.0, 17_200.0),
            ArtilleryKind::Mortar120M120 => (620.0, 13_000.0),
            ArtilleryKind::Mortar120Hy112 => (600.0, 9_500.0),
        }
    }
}

impl std::fmt::Display for ArtilleryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ArtilleryKind::Howitzer155 => "155mm Howitzer",
            ArtilleryKind::Mlrs => "MLRS",
            ArtilleryKind::Howitzer105M101A1 => "105mm Howitzer M101A1",
            ArtilleryKind::Howitzer105Lg1 => "105mm Howitzer LG1",
            ArtilleryKind::Howitzer105L119 => "105mm Howitzer L119",
            ArtilleryKind::Mortar120M120 => "120mm Mortar M120",
            ArtilleryKind::Mortar120Hy112 => "120mm Mortar HY12",
        };
        f.write_str(label)
    }
}

/// Artillery piece availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtilleryStatus {
    Ready,
    Firing,
    Moving,
    OutOfAmmo,
    Maintenance,
}

impl std::fmt::Display for ArtilleryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ArtilleryStatus::Ready => "READY",
            ArtilleryStatus::Firing => "FIRING",
            ArtilleryStatus::Moving => "MOVING",
            ArtilleryStatus::OutOfAmmo => "OUT_OF_AMMO",
            ArtilleryStatus::Maintenance => "MAINTENANCE",
        };
        f.write_str(label)
    }
}

/// Ammunition classes a piece stocks separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmmoClass {
    He,
    Smoke,
    Illum,
}

impl std::fmt::Display for AmmoClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AmmoClass::He => "HE",
            AmmoClass::Smoke => "SMOKE",
            AmmoClass::Illum => "ILLUM",
        };
        f.write_str(label)
    }
}

/// Per-class round counts for one piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoStock {
    pub he: u32,
    pub smoke: u32,
    pub illum: u32,
}

impl AmmoStock {
    pub fn new(he: u32, smoke: u32, illum: u32) -> Self {
        Self { he, smoke, illum }
    }

    pub fn rounds(&self, class: AmmoClass) -> u32 {
        match class {
            AmmoClass::He => self.he,
            AmmoClass::Smoke => self.smoke,
            AmmoClass::Illum => self.illum,
        }
    }

    /// Deduct rounds of a class, saturating at zero. Returns the rounds
    /// actually expended.
    pub fn expend(&mut self, class: AmmoClass, rounds: u32) -> u32 {
        let slot = match class {
            AmmoClass::He => &mut self.he,
            AmmoClass::Smoke => &mut self.smoke,
            AmmoClass::Illum => &mut self.illum,
        };
        let expended = rounds.min(*slot);
        *slot -= expended;
        expended
    }

    pub fn total(&self) -> u32 {
        self.he + self.smoke + self.illum
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// A single gun, mortar or launcher on the picture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtilleryPiece {
    pub id: PieceId,
    pub name: String,
    pub kind: ArtilleryKind,
    pub location: GeoPoint,
    pub status: ArtilleryStatus,
    pub ammo: AmmoStock,
    /// The active mission this piece is firing, if any
    pub current_mission: Option<MissionId>,
    /// Formation this piece belongs to
    pub unit_id: Option<UnitId>,
    pub commander: Option<UserId>,
    /// Fire direction officer, the mission notification recipient
    pub fdo: Option<UserId>,
}

impl ArtilleryPiece {
    pub fn new(name: impl Into<String>, kind: ArtilleryKind, location: GeoPoint, ammo: AmmoStock) -> Self {
        let status = if ammo.is_empty() { ArtilleryStatus::OutOfAmmo } else { ArtilleryStatus::Ready };
        Self {
            id: PieceId::new(),
            name: name.into(),
            kind,
            location,
            status,
            ammo,
            current_mission: None,
            unit_id: None,
            commander: None,
            fdo: None,
        }
    }

    /// Whether a target at this distance sits inside the piece's bracket
    pub fn in_range(&self, distance: f64) -> bool {
        let (min, max) = self.kind.range_bracket();
        distance >= min && distance <= max
    }

    /// Whether the piece can take a mission needing this ammo class
    pub fn can_fire(&self, class: AmmoClass) -> bool {
        self.status == ArtilleryStatus::Ready && self.ammo.rounds(class) > 0
    }
}

/// Forward observer availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObserverStatus {
    Active,
    Repositioning,
    Offline,
}

/// A forward observer able to request fire missions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardObserver {
    pub id: ObserverId,
    pub callsign: String,
    pub location: GeoPoint,
    pub status: ObserverStatus,
    pub unit_id: Option<UnitId>,
    pub commander: Option<UserId>,
    pub last_contact: Timestamp,
}

impl ForwardObserver {
    pub fn new(callsign: impl Into<String>, location: GeoPoint, now: Timestamp) -> Self {
        Self {
            id: ObserverId::new(),
            callsign: callsign.into(),
            location,
            status: ObserverStatus::Active,
            unit_id: None,
            commander: None,
            last_contact: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_brackets() {
        let piece = ArtilleryPiece::new(
            "Gun 1",
            ArtilleryKind::Howitzer155,
            GeoPoint::new(0.0, 0.0),
            AmmoStock::new(10, 5, 5),
        );
        assert!(!piece.in_range(2_999.0));
        assert!(piece.in_range(3_000.0));
        assert!(piece.in_range(22_000.0));
        assert!(!piece.in_range(22_001.0));
    }

    #[test]
    fn test_mortar_minimum_range() {
        let (min, _) = ArtilleryKind::Mortar120Hy112.range_bracket();
        assert_eq!(min, 600.0);
    }

    #[test]
    fn test_expend_saturates() {
        let mut stock = AmmoStock::new(3, 0, 0);
        assert_eq!(stock.expend(AmmoClass::He, 10), 3);
        assert_eq!(stock.he, 0);
        assert!(stock.is_empty() || stock.total() == 0);
    }

    #[test]
    fn test_can_fire_requires_ready_and_stock() {
        let mut piece = ArtilleryPiece::new(
            "Gun 2",
            ArtilleryKind::Mlrs,
            GeoPoint::new(0.0, 0.0),
            AmmoStock::new(6, 0, 0),
        );
        assert!(piece.can_fire(AmmoClass::He));
        assert!(!piece.can_fire(AmmoClass::Smoke));
        piece.status = ArtilleryStatus::Firing;
        assert!(!piece.can_fire(AmmoClass::He));
    }

    #[test]
    fn test_empty_stock_starts_out_of_ammo() {
        let piece = ArtilleryPiece::new(
            "Gun 3",
            ArtilleryKind::Mortar120M120,
            GeoPoint::new(0.0, 0.0),
            AmmoStock::new(0, 0, 0),
        );
        assert_eq!(piece.status, ArtilleryStatus::OutOfAmmo);
    }
}
