//! History ledger: the audit trail for every named operation

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityRef, EventId, Timestamp, UnitId, UserId};
use crate::geo::GeoPoint;

/// What happened, as a closed set of event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryKind {
    UnitCreated,
    PieceCreated,
    ObserverCreated,
    SpotReport,
    LogisticsUpdated,
    AttributesUpdated,
    MissionChanged,
    SituationChanged,
    HourlyReportMarked,
    ReportOverdue,
    CommunicationLost,
    CombatStarted,
    Ceasefire,
    AarRecorded,
    SentToRetraining,
    ReturnedFromRetraining,
    LeaveStarted,
    RetrainingStarted,
    AmmoReportSubmitted,
    AmmoReportApproved,
    AmmoReportRejected,
    NoveltySubmitted,
    NoveltyApproved,
    NoveltyRejected,
    LogisticsRequestCreated,
    LogisticsRequestFulfilled,
    FireMissionRequested,
    FireMissionStarted,
    FireMissionRejected,
    FireMissionCompleted,
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            HistoryKind::UnitCreated => "Unit created",
            HistoryKind::PieceCreated => "Artillery piece created",
            HistoryKind::ObserverCreated => "Forward observer created",
            HistoryKind::SpotReport => "SPOT report received",
            HistoryKind::LogisticsUpdated => "Logistics updated",
            HistoryKind::AttributesUpdated => "Attributes updated",
            HistoryKind::MissionChanged => "Mission changed",
            HistoryKind::SituationChanged => "Situation changed",
            HistoryKind::HourlyReportMarked => "Hourly report marked",
            HistoryKind::ReportOverdue => "Hourly report overdue",
            HistoryKind::CommunicationLost => "Communication lost",
            HistoryKind::CombatStarted => "Entered combat",
            HistoryKind::Ceasefire => "Ceasefire reported",
            HistoryKind::AarRecorded => "After-action report recorded",
            HistoryKind::SentToRetraining => "Sent to leave/retraining",
            HistoryKind::ReturnedFromRetraining => "Returned from leave/retraining",
            HistoryKind::LeaveStarted => "Leave started",
            HistoryKind::RetrainingStarted => "Retraining started",
            HistoryKind::AmmoReportSubmitted => "Ammo expenditure report submitted",
            HistoryKind::AmmoReportApproved => "Ammo expenditure report approved",
            HistoryKind::AmmoReportRejected => "Ammo expenditure report rejected",
            HistoryKind::NoveltySubmitted => "Platoon novelty submitted",
            HistoryKind::NoveltyApproved => "Platoon novelty approved",
            HistoryKind::NoveltyRejected => "Platoon novelty rejected",
            HistoryKind::LogisticsRequestCreated => "Logistics request created",
            HistoryKind::LogisticsRequestFulfilled => "Logistics request fulfilled",
            HistoryKind::FireMissionRequested => "Fire mission requested",
            HistoryKind::FireMissionStarted => "Fire mission started",
            HistoryKind::FireMissionRejected => "Fire mission rejected",
            HistoryKind::FireMissionCompleted => "Fire mission completed",
        };
        f.write_str(label)
    }
}

/// A single ledger entry, immutable once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub kind: HistoryKind,
    pub details: String,
    pub unit_id: Option<UnitId>,
    pub unit_name: Option<String>,
    pub user_id: Option<UserId>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub location: Option<GeoPoint>,
    pub related: Option<EntityRef>,
}

impl HistoryEvent {
    pub fn new(kind: HistoryKind, details: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            id: EventId::new(),
            timestamp,
            kind,
            details: details.into(),
            unit_id: None,
            unit_name: None,
            user_id: None,
            old_value: None,
            new_value: None,
            location: None,
            related: None,
        }
    }

    pub fn with_unit(mut self, id: UnitId, name: impl Into<String>) -> Self {
        self.unit_id = Some(id);
        self.unit_name = Some(name.into());
        self
    }

    pub fn with_user(mut self, id: UserId) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn with_values(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.old_value = Some(old.into());
        self.new_value = Some(new.into());
        self
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_related(mut self, related: EntityRef) -> Self {
        self.related = Some(related);
        self
    }
}

/// The capped history log, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryLedger {
    events: Vec<HistoryEvent>,
    cap: usize,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::with_cap(crate::core::config::config().max_history_events)
    }
}

impl HistoryLedger {
    pub fn with_cap(cap: usize) -> Self {
        Self { events: Vec::new(), cap }
    }

    /// Append an event, keeping the ledger sorted newest first and trimmed
    /// to the cap
    pub fn record(&mut self, event: HistoryEvent) -> EventId {
        let id = event.id;
        self.events.push(event);
        self.events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.events.truncate(self.cap);
        id
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_for_unit(&self, unit_id: UnitId) -> impl Iterator<Item = &HistoryEvent> {
        self.events.iter().filter(move |e| e.unit_id == Some(unit_id))
    }
}
