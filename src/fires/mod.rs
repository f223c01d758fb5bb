//! Fire missions: requests, assignments and the shot lifecycle

pub mod coordinator;

use serde::{Deserialize, Serialize};

use crate::artillery::AmmoClass;
use crate::core::types::{MissionId, PieceId, RequesterId, Timestamp, UserId};
use crate::geo::GeoPoint;

/// Projectile natures a fire direction officer can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projectile {
    HeM107,
    HeL15,
    HeM795,
    SmokeM825,
    SmokeL47,
    SmokeM722,
    SmokeY12,
    IllumM485,
    IllumL48,
    IllumM821,
    IllumY12,
    RocketM26,
}

impl Projectile {
    /// Which ammo class a shot of this projectile expends
    pub fn ammo_class(&self) -> AmmoClass {
        match self {
            Projectile::SmokeM825 | Projectile::SmokeL47 | Projectile::SmokeM722 | Projectile::SmokeY12 => {
                AmmoClass::Smoke
            }
            Projectile::IllumM485 | Projectile::IllumL48 | Projectile::IllumM821 | Projectile::IllumY12 => {
                AmmoClass::Illum
            }
            Projectile::HeM107 | Projectile::HeL15 | Projectile::HeM795 | Projectile::RocketM26 => {
                AmmoClass::He
            }
        }
    }
}

impl std::fmt::Display for Projectile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Projectile::HeM107 => "HE M107",
            Projectile::HeL15 => "HE L15",
            Projectile::HeM795 => "HE M795",
            Projectile::SmokeM825 => "SMOKE M825",
            Projectile::SmokeL47 => "SMOKE L47",
            Projectile::SmokeM722 => "SMOKE M722",
            Projectile::SmokeY12 => "SMOKE Y12-SMK",
            Projectile::IllumM485 => "ILLUM M485",
            Projectile::IllumL48 => "ILLUM L48",
            Projectile::IllumM821 => "ILLUM M821",
            Projectile::IllumY12 => "ILLUM Y12-ILL",
            Projectile::RocketM26 => "ROCKET M26",
        };
        f.write_str(label)
    }
}

/// State of a mission awaiting fire direction action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingStatus {
    /// Waiting for the FDO to accept or reject
    Pending,
    /// No piece in range with ammunition; kept visible with the reason
    NoAssets,
    Rejected,
}

/// A fire mission request before the FDO acts on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingFireMission {
    pub id: MissionId,
    pub requester: RequesterId,
    pub target: GeoPoint,
    pub requested_at: Timestamp,
    /// Piece the coordinator picked, absent when status is NoAssets
    pub candidate: Option<PieceId>,
    /// Gun-to-target distance of the candidate, meters
    pub candidate_distance: Option<f64>,
    pub status: PendingStatus,
    /// Present iff status is not Pending
    pub reason: Option<String>,
    pub rejected_by: Option<UserId>,
}

/// State of a mission a piece has accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveStatus {
    Active,
    Complete,
}

/// The firing solution the FDO committed to
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FiringSolution {
    /// Gun-to-target distance in meters
    pub distance: f64,
    /// Gun-to-target bearing in degrees
    pub bearing: f64,
}

/// A fire mission a piece is executing or has completed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveFireMission {
    pub id: MissionId,
    pub artillery_id: PieceId,
    pub requester: RequesterId,
    pub target: GeoPoint,
    pub status: ActiveStatus,
    pub fired_at: Timestamp,
    /// Present iff status is Complete
    pub completed_at: Option<Timestamp>,
    pub projectile: Projectile,
    pub charge: u8,
    pub mrsi: bool,
    pub solution: FiringSolution,
}
