//! Logistics requests raised for units and their fulfillment

use serde::{Deserialize, Serialize};

use crate::core::error::{FirelineError, Result};
use crate::core::types::{AlertId, EntityRef, RequestId, Timestamp, UnitId, UserId};
use crate::ledger::{Alert, AlertKind, HistoryEvent, HistoryKind, Severity};
use crate::world::WorldState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Fulfilled,
}

/// A supply request raised for a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticsRequest {
    pub id: RequestId,
    pub unit_id: UnitId,
    pub unit_name: String,
    pub details: String,
    pub requested_at: Timestamp,
    pub status: RequestStatus,
    /// Present iff status is Fulfilled
    pub fulfilled_at: Option<Timestamp>,
    pub fulfilled_by: Option<UserId>,
    /// The pending alert raised with this request
    pub alert_id: AlertId,
}

/// Open a logistics request for a unit: LOW alert + history entry.
pub fn create_request(
    world: &mut WorldState,
    unit_id: UnitId,
    details: impl Into<String>,
    now: Timestamp,
) -> Result<RequestId> {
    let details = details.into();
    if details.trim().is_empty() {
        return Err(FirelineError::Validation("A logistics request must carry details".into()));
    }
    let unit_name = world.require_unit(unit_id)?.name.clone();

    let request_id = RequestId::new();
    let alert_id = world.alerts.raise(
        Alert::new(
            AlertKind::LogisticsRequestPending,
            Severity::Low,
            format!("Logistics request for {}: {}", unit_name, details),
            now,
        )
        .for_unit(unit_id),
    );

    world.push_logistics_request(LogisticsRequest {
        id: request_id,
        unit_id,
        unit_name: unit_name.clone(),
        details: details.clone(),
        requested_at: now,
        status: RequestStatus::Pending,
        fulfilled_at: None,
        fulfilled_by: None,
        alert_id,
    });

    world.history.record(
        HistoryEvent::new(
            HistoryKind::LogisticsRequestCreated,
            format!("Logistics request opened for {}: {}", unit_name, details),
            now,
        )
        .with_unit(unit_id, unit_name)
        .with_related(EntityRef::LogisticsRequest(request_id)),
    );

    Ok(request_id)
}

/// Mark a request fulfilled, acknowledge its originating alert and raise
/// an INFO alert for the requesting unit.
pub fn fulfill_request(
    world: &mut WorldState,
    request_id: RequestId,
    user: UserId,
    now: Timestamp,
) -> Result<()> {
    let user_name = world.roster.display_name(user);

    let (unit_id, unit_name, details, alert_id) = {
        let request = world
            .logistics_request_mut(request_id)
            .ok_or(FirelineError::RequestNotFound(request_id))?;
        if request.status == RequestStatus::Fulfilled {
            return Err(FirelineError::Conflict(format!(
                "Request {} has already been fulfilled",
                request_id.short()
            )));
        }
        request.status = RequestStatus::Fulfilled;
        request.fulfilled_at = Some(now);
        request.fulfilled_by = Some(user);
        (request.unit_id, request.unit_name.clone(), request.details.clone(), request.alert_id)
    };

    world.alerts.acknowledge(alert_id);
    world.alerts.raise(
        Alert::new(
            AlertKind::LogisticsRequestFulfilled,
            Severity::Info,
            format!("Logistics request for {} fulfilled by {}.", unit_name, user_name),
            now,
        )
        .for_unit(unit_id),
    );

    world.history.record(
        HistoryEvent::new(
            HistoryKind::LogisticsRequestFulfilled,
            format!("{} fulfilled the request for {}: {}", user_name, unit_name, details),
            now,
        )
        .with_unit(unit_id, unit_name)
        .with_user(user)
        .with_related(EntityRef::LogisticsRequest(request_id)),
    );

    Ok(())
}
