//! Tracked units and their lifecycle state machine
//!
//! Unit status changes are table-driven: every operation maps to a
//! `UnitEvent`, and `transition` is the single source of truth for which
//! (status, event) pairs are legal. Illegal pairs are rejected, never
//! silently applied.

pub mod lifecycle;
pub mod logistics;

use serde::{Deserialize, Serialize};

use crate::core::types::{Timestamp, UnitId};
use crate::geo::GeoPoint;

/// Unit echelon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Echelon {
    Team,
    Squad,
    Platoon,
    Company,
    Battalion,
    Brigade,
    Division,
    CommandPost,
}

/// Unit lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    Operational,
    Moving,
    Static,
    Engaged,
    LowSupplies,
    NoCommunication,
    Maintenance,
    AarPending,
    OnLeaveRetraining,
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            UnitStatus::Operational => "OPERATIONAL",
            UnitStatus::Moving => "MOVING",
            UnitStatus::Static => "STATIC",
            UnitStatus::Engaged => "ENGAGED",
            UnitStatus::LowSupplies => "LOW_SUPPLIES",
            UnitStatus::NoCommunication => "NO_COMMUNICATION",
            UnitStatus::Maintenance => "MAINTENANCE",
            UnitStatus::AarPending => "AAR_PENDING",
            UnitStatus::OnLeaveRetraining => "ON_LEAVE_RETRAINING",
        };
        f.write_str(label)
    }
}

/// Events that can drive a unit status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitEvent {
    Engage,
    Ceasefire,
    SubmitAar,
    HourlyReport,
    SendToRetraining,
    ReturnFromRetraining,
    CommsLost,
    Resupply,
}

impl std::fmt::Display for UnitEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outcome of looking up the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The event moves the unit to a new status
    To(UnitStatus),
    /// The event is legal but leaves the status alone
    Unchanged,
    /// The (status, event) pair is not allowed
    Illegal,
}

/// The unit lifecycle transition table
///
/// Keyed by (current status, event). Everything not listed is illegal.
pub fn transition(status: UnitStatus, event: UnitEvent) -> Transition {
    use Transition::{Illegal, To, Unchanged};
    use UnitStatus as S;

    match event {
        // Any state can enter combat; re-reporting combat is a no-op
        UnitEvent::Engage => match status {
            S::Engaged => Unchanged,
            _ => To(S::Engaged),
        },

        // Ceasefire only makes sense while engaged
        UnitEvent::Ceasefire => match status {
            S::Engaged => To(S::AarPending),
            _ => Illegal,
        },

        // The AAR closes the combat episode
        UnitEvent::SubmitAar => match status {
            S::AarPending => To(S::Operational),
            _ => Illegal,
        },

        // An hourly report restores a silent unit; otherwise just a refresh
        UnitEvent::HourlyReport => match status {
            S::NoCommunication => To(S::Operational),
            _ => Unchanged,
        },

        UnitEvent::SendToRetraining => match status {
            S::OnLeaveRetraining => Illegal,
            _ => To(S::OnLeaveRetraining),
        },

        UnitEvent::ReturnFromRetraining => match status {
            S::OnLeaveRetraining => To(S::Operational),
            _ => Illegal,
        },

        UnitEvent::CommsLost => match status {
            S::NoCommunication => Unchanged,
            // A unit in contact or off the map stays in its current state
            S::Engaged | S::AarPending | S::OnLeaveRetraining => Unchanged,
            _ => To(S::NoCommunication),
        },

        // Resupply above thresholds clears a supply warning, nothing else
        UnitEvent::Resupply => match status {
            S::LowSupplies => To(S::Operational),
            _ => Unchanged,
        },
    }
}

/// One point of a unit's recorded route
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoutePoint {
    pub location: GeoPoint,
    pub timestamp: Timestamp,
}

/// Combat-end marker, present only while a unit is AAR_PENDING
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CombatEnd {
    pub timestamp: Timestamp,
    pub location: GeoPoint,
}

/// Leave metadata, populated by `start_leave` after a unit has been sent
/// to the leave/retraining area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveInfo {
    pub start: Timestamp,
    pub duration_days: u32,
}

/// Retraining metadata, populated by `start_retraining`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainingInfo {
    pub start: Timestamp,
    pub focus: String,
    pub duration_days: u32,
}

/// Unit attachment relative to its parent formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSituation {
    Organic,
    Attached,
    Detached,
}

/// A tracked unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub echelon: Echelon,
    pub parent_id: Option<UnitId>,
    pub location: GeoPoint,
    pub status: UnitStatus,
    pub situation: UnitSituation,
    pub route_history: Vec<RoutePoint>,
    pub equipment: Vec<String>,
    pub capabilities: Vec<String>,
    pub current_mission: Option<String>,
    /// Percentages 0-100
    pub fuel_level: u8,
    pub ammo_level: u8,
    pub days_of_supply: u32,
    pub last_resupply: Timestamp,
    pub last_movement: Timestamp,
    pub last_communication: Timestamp,
    pub last_hourly_report: Timestamp,
    pub combat_end: Option<CombatEnd>,
    pub leave: Option<LeaveInfo>,
    pub retraining: Option<RetrainingInfo>,
}

impl Unit {
    pub fn new(name: impl Into<String>, echelon: Echelon, location: GeoPoint, now: Timestamp) -> Self {
        Self {
            id: UnitId::new(),
            name: name.into(),
            echelon,
            parent_id: None,
            location,
            status: UnitStatus::Operational,
            situation: UnitSituation::Organic,
            route_history: vec![RoutePoint { location, timestamp: now }],
            equipment: Vec::new(),
            capabilities: Vec::new(),
            current_mission: None,
            fuel_level: 100,
            ammo_level: 100,
            days_of_supply: 30,
            last_resupply: now,
            last_movement: now,
            last_communication: now,
            last_hourly_report: now,
            combat_end: None,
            leave: None,
            retraining: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engage_from_any_state() {
        for status in [
            UnitStatus::Operational,
            UnitStatus::Moving,
            UnitStatus::LowSupplies,
            UnitStatus::Maintenance,
        ] {
            assert_eq!(transition(status, UnitEvent::Engage), Transition::To(UnitStatus::Engaged));
        }
        // Idempotent when already engaged
        assert_eq!(transition(UnitStatus::Engaged, UnitEvent::Engage), Transition::Unchanged);
    }

    #[test]
    fn test_ceasefire_requires_engaged() {
        assert_eq!(
            transition(UnitStatus::Engaged, UnitEvent::Ceasefire),
            Transition::To(UnitStatus::AarPending)
        );
        assert_eq!(transition(UnitStatus::Operational, UnitEvent::Ceasefire), Transition::Illegal);
        assert_eq!(transition(UnitStatus::AarPending, UnitEvent::Ceasefire), Transition::Illegal);
    }

    #[test]
    fn test_aar_requires_pending() {
        assert_eq!(
            transition(UnitStatus::AarPending, UnitEvent::SubmitAar),
            Transition::To(UnitStatus::Operational)
        );
        assert_eq!(transition(UnitStatus::Engaged, UnitEvent::SubmitAar), Transition::Illegal);
    }

    #[test]
    fn test_hourly_report_restores_silent_unit() {
        assert_eq!(
            transition(UnitStatus::NoCommunication, UnitEvent::HourlyReport),
            Transition::To(UnitStatus::Operational)
        );
        assert_eq!(transition(UnitStatus::Moving, UnitEvent::HourlyReport), Transition::Unchanged);
    }

    #[test]
    fn test_comms_lost_spares_engaged_units() {
        assert_eq!(
            transition(UnitStatus::Static, UnitEvent::CommsLost),
            Transition::To(UnitStatus::NoCommunication)
        );
        assert_eq!(transition(UnitStatus::Engaged, UnitEvent::CommsLost), Transition::Unchanged);
        assert_eq!(transition(UnitStatus::AarPending, UnitEvent::CommsLost), Transition::Unchanged);
    }

    #[test]
    fn test_retraining_round_trip() {
        assert_eq!(
            transition(UnitStatus::Static, UnitEvent::SendToRetraining),
            Transition::To(UnitStatus::OnLeaveRetraining)
        );
        assert_eq!(
            transition(UnitStatus::OnLeaveRetraining, UnitEvent::SendToRetraining),
            Transition::Illegal
        );
        assert_eq!(
            transition(UnitStatus::OnLeaveRetraining, UnitEvent::ReturnFromRetraining),
            Transition::To(UnitStatus::Operational)
        );
        assert_eq!(
            transition(UnitStatus::Operational, UnitEvent::ReturnFromRetraining),
            Transition::Illegal
        );
    }

    #[test]
    fn test_new_unit_is_operational() {
        let unit = Unit::new("1st Platoon", Echelon::Platoon, GeoPoint::new(4.6, -74.0), 1000);
        assert_eq!(unit.status, UnitStatus::Operational);
        assert_eq!(unit.route_history.len(), 1);
        assert!(unit.combat_end.is_none());
    }
}
