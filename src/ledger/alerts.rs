//! Alert bus: user-facing notifications with an acknowledge-once flag

use serde::{Deserialize, Serialize};

use crate::core::types::{AlertId, Timestamp, UnitId, UserId};
use crate::geo::GeoPoint;

/// Alert severity, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// The closed set of alert kinds raised by the coordination core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    UnitEngaged,
    CommunicationLost,
    HourlyReportMissed,
    AmmoReportPending,
    NoveltyPending,
    LogisticsRequestPending,
    LogisticsRequestFulfilled,
    UnitToRetraining,
    UnitReturnedFromRetraining,
    LeaveStarted,
    RetrainingStarted,
    UnitCreated,
    PieceCreated,
    ObserverCreated,
    NotifyFailed,
}

/// Payload submitted with an ammo expenditure report, carried on its
/// pending alert until a commander approves or rejects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoReportPayload {
    pub unit_id: UnitId,
    pub unit_name: String,
    pub submitted_by: UserId,
    /// Percentage points of the unit's ammo level, 0-100
    pub amount_percent: u8,
    pub justification: String,
}

/// Payload submitted with a platoon novelty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoveltyPayload {
    pub unit_id: UnitId,
    pub unit_name: String,
    pub submitted_by: UserId,
    pub details: String,
    /// Approval of a flagged novelty also opens a logistics request
    pub is_logistics_request: bool,
}

/// Typed alert payload, one variant per approvable report kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertPayload {
    AmmoReport(AmmoReportPayload),
    Novelty(NoveltyPayload),
}

/// A single alert on the bus
///
/// `acknowledged` is the only mutable field, and only ever goes
/// false -> true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub message: String,
    pub timestamp: Timestamp,
    pub severity: Severity,
    pub acknowledged: bool,
    pub unit_id: Option<UnitId>,
    pub location: Option<GeoPoint>,
    pub payload: Option<AlertPayload>,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        message: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: AlertId::new(),
            kind,
            message: message.into(),
            timestamp,
            severity,
            acknowledged: false,
            unit_id: None,
            location: None,
            payload: None,
        }
    }

    pub fn for_unit(mut self, unit_id: UnitId) -> Self {
        self.unit_id = Some(unit_id);
        self
    }

    pub fn at(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_payload(mut self, payload: AlertPayload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// The capped alert bus, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertBus {
    alerts: Vec<Alert>,
    cap: usize,
}

impl Default for AlertBus {
    fn default() -> Self {
        Self::with_cap(crate::core::config::config().max_alerts)
    }
}

impl AlertBus {
    pub fn with_cap(cap: usize) -> Self {
        Self { alerts: Vec::new(), cap }
    }

    /// Insert an alert, re-sort newest first and trim to the cap
    pub fn raise(&mut self, alert: Alert) -> AlertId {
        let id = alert.id;
        self.alerts.push(alert);
        self.alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.alerts.truncate(self.cap);
        id
    }

    /// Mark an alert acknowledged. Returns false if the id is unknown
    /// (it may have been trimmed off the bus).
    pub fn acknowledge(&mut self, id: AlertId) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.acknowledged = true;
                true
            }
            None => false,
        }
    }

    /// Acknowledge every open alert of the given kinds for one unit
    pub fn acknowledge_for_unit(&mut self, unit_id: UnitId, kinds: &[AlertKind]) -> usize {
        let mut count = 0;
        for alert in &mut self.alerts {
            if alert.unit_id == Some(unit_id) && !alert.acknowledged && kinds.contains(&alert.kind) {
                alert.acknowledged = true;
                count += 1;
            }
        }
        count
    }

    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// Newest open alert of a kind for a unit, if any
    pub fn open_for_unit(&self, unit_id: UnitId, kind: AlertKind) -> Option<&Alert> {
        self.alerts
            .iter()
            .find(|a| a.unit_id == Some(unit_id) && a.kind == kind && !a.acknowledged)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(kind: AlertKind, ts: Timestamp) -> Alert {
        Alert::new(kind, Severity::Info, "test", ts)
    }

    #[test]
    fn test_raise_sorts_newest_first() {
        let mut bus = AlertBus::with_cap(10);
        bus.raise(alert(AlertKind::UnitCreated, 10));
        bus.raise(alert(AlertKind::UnitEngaged, 30));
        bus.raise(alert(AlertKind::NoveltyPending, 20));
        let stamps: Vec<_> = bus.alerts().iter().map(|a| a.timestamp).collect();
        assert_eq!(stamps, vec![30, 20, 10]);
    }

    #[test]
    fn test_cap_is_enforced() {
        let mut bus = AlertBus::with_cap(5);
        for t in 0..20u64 {
            bus.raise(alert(AlertKind::UnitCreated, t));
        }
        assert_eq!(bus.len(), 5);
        assert_eq!(bus.alerts()[0].timestamp, 19);
    }

    #[test]
    fn test_acknowledge_sticks() {
        let mut bus = AlertBus::with_cap(5);
        let id = bus.raise(alert(AlertKind::UnitEngaged, 1));
        assert!(bus.acknowledge(id));
        assert!(bus.get(id).unwrap().acknowledged);
        // Acknowledging again is harmless and the flag stays set
        assert!(bus.acknowledge(id));
        assert!(bus.get(id).unwrap().acknowledged);
    }

    #[test]
    fn test_acknowledge_unknown_id() {
        let mut bus = AlertBus::with_cap(5);
        assert!(!bus.acknowledge(AlertId::new()));
    }

    #[test]
    fn test_acknowledge_for_unit_scopes_by_kind() {
        let unit = UnitId::new();
        let mut bus = AlertBus::with_cap(10);
        bus.raise(alert(AlertKind::CommunicationLost, 1).for_unit(unit));
        bus.raise(alert(AlertKind::HourlyReportMissed, 2).for_unit(unit));
        bus.raise(alert(AlertKind::UnitEngaged, 3).for_unit(unit));

        let n = bus.acknowledge_for_unit(
            unit,
            &[AlertKind::CommunicationLost, AlertKind::HourlyReportMissed],
        );
        assert_eq!(n, 2);
        assert!(bus.open_for_unit(unit, AlertKind::UnitEngaged).is_some());
        assert!(bus.open_for_unit(unit, AlertKind::CommunicationLost).is_none());
    }
}
