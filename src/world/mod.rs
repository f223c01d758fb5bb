//! The world snapshot: every entity the coordination core tracks
//!
//! `WorldState` is plain data plus registration and lookup. All domain
//! transitions live in the subsystem modules and take `&mut WorldState`;
//! the command layer serializes access to a single writer.

use serde::{Deserialize, Serialize};

use crate::artillery::{AmmoStock, ArtilleryKind, ArtilleryPiece, ForwardObserver};
use crate::core::config::config;
use crate::core::error::{FirelineError, Result};
use crate::core::types::{
    AlertId, MissionId, ObserverId, PieceId, RequestId, RequesterId, Timestamp, UnitId,
};
use crate::fires::{ActiveFireMission, PendingFireMission};
use crate::geo::{format_dms, GeoPoint};
use crate::ledger::{Alert, AlertBus, AlertKind, HistoryEvent, HistoryKind, HistoryLedger, Severity};
use crate::logistics::LogisticsRequest;
use crate::roster::Roster;
use crate::unit::lifecycle::AfterActionReport;
use crate::unit::{Echelon, Unit};

/// Everything the command post knows, serializable as one snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldState {
    units: Vec<Unit>,
    pieces: Vec<ArtilleryPiece>,
    observers: Vec<ForwardObserver>,
    pending_missions: Vec<PendingFireMission>,
    active_missions: Vec<ActiveFireMission>,
    logistics_requests: Vec<LogisticsRequest>,
    after_action_reports: Vec<AfterActionReport>,
    pub alerts: AlertBus,
    pub history: HistoryLedger,
    pub roster: Roster,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    // === REGISTRATION ===

    /// Register a unit on the picture. Raises an INFO alert and records
    /// the creation.
    pub fn add_unit(
        &mut self,
        name: impl Into<String>,
        echelon: Echelon,
        location: GeoPoint,
        now: Timestamp,
    ) -> Result<UnitId> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FirelineError::Validation("A unit needs a name".into()));
        }

        let unit = Unit::new(name.clone(), echelon, location, now);
        let unit_id = unit.id;
        self.units.push(unit);

        self.alerts.raise(
            Alert::new(AlertKind::UnitCreated, Severity::Info, format!("{} added to the picture.", name), now)
                .for_unit(unit_id)
                .at(location),
        );
        self.history.record(
            HistoryEvent::new(
                HistoryKind::UnitCreated,
                format!("{} ({:?}) registered at {}.", name, echelon, format_dms(location)),
                now,
            )
            .with_unit(unit_id, name)
            .with_location(location),
        );

        Ok(unit_id)
    }

    /// Register an artillery piece. Range bracket comes from the kind
    /// table; an empty stock registers the piece OUT_OF_AMMO.
    pub fn add_artillery_piece(
        &mut self,
        name: impl Into<String>,
        kind: ArtilleryKind,
        location: GeoPoint,
        ammo: AmmoStock,
        now: Timestamp,
    ) -> Result<PieceId> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FirelineError::Validation("An artillery piece needs a name".into()));
        }

        let piece = ArtilleryPiece::new(name.clone(), kind, location, ammo);
        let piece_id = piece.id;
        self.pieces.push(piece);

        self.alerts.raise(
            Alert::new(
                AlertKind::PieceCreated,
                Severity::Info,
                format!("{} ({}) added to the picture.", name, kind),
                now,
            )
            .at(location),
        );
        self.history.record(
            HistoryEvent::new(
                HistoryKind::PieceCreated,
                format!("{} ({}) registered with {} rounds.", name, kind, ammo.total()),
                now,
            )
            .with_location(location),
        );

        Ok(piece_id)
    }

    /// Register a forward observer.
    pub fn add_forward_observer(
        &mut self,
        callsign: impl Into<String>,
        location: GeoPoint,
        now: Timestamp,
    ) -> Result<ObserverId> {
        let callsign = callsign.into();
        if callsign.trim().is_empty() {
            return Err(FirelineError::Validation("An observer needs a callsign".into()));
        }

        let observer = ForwardObserver::new(callsign.clone(), location, now);
        let observer_id = observer.id;
        self.observers.push(observer);

        self.alerts.raise(
            Alert::new(
                AlertKind::ObserverCreated,
                Severity::Info,
                format!("Observer {} added to the picture.", callsign),
                now,
            )
            .at(location),
        );
        self.history.record(
            HistoryEvent::new(
                HistoryKind::ObserverCreated,
                format!("Observer {} registered at {}.", callsign, format_dms(location)),
                now,
            )
            .with_location(location),
        );

        Ok(observer_id)
    }

    // === LOOKUPS ===

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn require_unit(&self, id: UnitId) -> Result<&Unit> {
        self.unit(id).ok_or(FirelineError::UnitNotFound(id))
    }

    pub(crate) fn require_unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id).ok_or(FirelineError::UnitNotFound(id))
    }

    pub fn pieces(&self) -> &[ArtilleryPiece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&ArtilleryPiece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn require_piece(&self, id: PieceId) -> Result<&ArtilleryPiece> {
        self.piece(id).ok_or(FirelineError::PieceNotFound(id))
    }

    pub(crate) fn require_piece_mut(&mut self, id: PieceId) -> Result<&mut ArtilleryPiece> {
        self.pieces.iter_mut().find(|p| p.id == id).ok_or(FirelineError::PieceNotFound(id))
    }

    pub fn observers(&self) -> &[ForwardObserver] {
        &self.observers
    }

    pub fn observer(&self, id: ObserverId) -> Option<&ForwardObserver> {
        self.observers.iter().find(|o| o.id == id)
    }

    /// Resolve a requester to its display text: unit name or observer
    /// callsign.
    pub fn requester_name(&self, requester: RequesterId) -> Option<String> {
        match requester {
            RequesterId::Unit(id) => self.unit(id).map(|u| u.name.clone()),
            RequesterId::Observer(id) => self.observer(id).map(|o| o.callsign.clone()),
        }
    }

    pub(crate) fn require_requester_name(&self, requester: RequesterId) -> Result<String> {
        self.requester_name(requester).ok_or(match requester {
            RequesterId::Unit(id) => FirelineError::UnitNotFound(id),
            RequesterId::Observer(id) => FirelineError::ObserverNotFound(id),
        })
    }

    // === MISSIONS ===

    pub fn pending_missions(&self) -> &[PendingFireMission] {
        &self.pending_missions
    }

    pub fn pending_mission(&self, id: MissionId) -> Option<&PendingFireMission> {
        self.pending_missions.iter().find(|m| m.id == id)
    }

    pub(crate) fn pending_mission_mut(&mut self, id: MissionId) -> Option<&mut PendingFireMission> {
        self.pending_missions.iter_mut().find(|m| m.id == id)
    }

    pub(crate) fn push_pending_mission(&mut self, mission: PendingFireMission) {
        self.pending_missions.push(mission);
    }

    pub(crate) fn remove_pending_mission(&mut self, id: MissionId) -> Option<PendingFireMission> {
        let index = self.pending_missions.iter().position(|m| m.id == id)?;
        Some(self.pending_missions.remove(index))
    }

    pub fn active_missions(&self) -> &[ActiveFireMission] {
        &self.active_missions
    }

    pub fn active_mission(&self, id: MissionId) -> Option<&ActiveFireMission> {
        self.active_missions.iter().find(|m| m.id == id)
    }

    pub(crate) fn active_mission_mut(&mut self, id: MissionId) -> Option<&mut ActiveFireMission> {
        self.active_missions.iter_mut().find(|m| m.id == id)
    }

    pub(crate) fn push_active_mission(&mut self, mission: ActiveFireMission) {
        self.active_missions.push(mission);
    }

    /// Retain active missions matching the predicate; returns how many
    /// were dropped.
    pub(crate) fn retain_active_missions(&mut self, keep: impl Fn(&ActiveFireMission) -> bool) -> usize {
        let before = self.active_missions.len();
        self.active_missions.retain(|m| keep(m));
        before - self.active_missions.len()
    }

    // === LOGISTICS & REPORTS ===

    pub fn logistics_requests(&self) -> &[LogisticsRequest] {
        &self.logistics_requests
    }

    pub fn logistics_request(&self, id: RequestId) -> Option<&LogisticsRequest> {
        self.logistics_requests.iter().find(|r| r.id == id)
    }

    pub(crate) fn logistics_request_mut(&mut self, id: RequestId) -> Option<&mut LogisticsRequest> {
        self.logistics_requests.iter_mut().find(|r| r.id == id)
    }

    pub(crate) fn push_logistics_request(&mut self, request: LogisticsRequest) {
        self.logistics_requests.push(request);
    }

    pub fn after_action_reports(&self) -> &[AfterActionReport] {
        &self.after_action_reports
    }

    /// Append an AAR, trimming the oldest past the retention cap
    pub(crate) fn push_after_action_report(&mut self, report: AfterActionReport) {
        self.after_action_reports.push(report);
        let cap = config().max_after_action_reports;
        if self.after_action_reports.len() > cap {
            let excess = self.after_action_reports.len() - cap;
            self.after_action_reports.drain(..excess);
        }
    }

    // === ALERTS ===

    /// Acknowledge an alert by id. Returns false if it has fallen off the
    /// bus.
    pub fn acknowledge_alert(&mut self, id: AlertId) -> bool {
        self.alerts.acknowledge(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_unit_raises_alert_and_history() {
        let mut world = WorldState::new();
        let unit_id = world.add_unit("2nd Company", Echelon::Company, GeoPoint::new(4.6, -74.0), 1000).unwrap();
        assert!(world.unit(unit_id).is_some());
        assert_eq!(world.alerts.len(), 1);
        assert_eq!(world.alerts.alerts()[0].kind, AlertKind::UnitCreated);
        assert_eq!(world.history.len(), 1);
    }

    #[test]
    fn test_add_unit_rejects_blank_name() {
        let mut world = WorldState::new();
        assert!(world.add_unit("  ", Echelon::Platoon, GeoPoint::new(0.0, 0.0), 0).is_err());
    }

    #[test]
    fn test_requester_name_resolution() {
        let mut world = WorldState::new();
        let unit_id = world.add_unit("1st Platoon", Echelon::Platoon, GeoPoint::new(4.6, -74.0), 0).unwrap();
        let observer_id = world.add_forward_observer("EAGLE-6", GeoPoint::new(4.7, -74.1), 0).unwrap();

        assert_eq!(world.requester_name(RequesterId::Unit(unit_id)).as_deref(), Some("1st Platoon"));
        assert_eq!(world.requester_name(RequesterId::Observer(observer_id)).as_deref(), Some("EAGLE-6"));
        assert!(world.requester_name(RequesterId::Unit(UnitId::new())).is_none());
    }

    #[test]
    fn test_empty_piece_registers_out_of_ammo() {
        use crate::artillery::ArtilleryStatus;
        let mut world = WorldState::new();
        let piece_id = world
            .add_artillery_piece(
                "Gun 1",
                ArtilleryKind::Mortar120M120,
                GeoPoint::new(0.0, 0.0),
                AmmoStock::new(0, 0, 0),
                0,
            )
            .unwrap();
        assert_eq!(world.piece(piece_id).unwrap().status, ArtilleryStatus::OutOfAmmo);
    }
}
