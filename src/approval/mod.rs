//! Two-party approval workflow
//!
//! Platoon-level reports ride the alert bus as unacknowledged alerts
//! carrying a typed payload; a commander resolves each one exactly once.
//! Acknowledgement is the commit point: a second approve or reject of
//! the same alert is a conflict and changes nothing.

use crate::core::error::{FirelineError, Result};
use crate::core::types::{AlertId, EntityRef, Timestamp, UnitId, UserId};
use crate::ledger::{
    Alert, AlertKind, AlertPayload, AmmoReportPayload, HistoryEvent, HistoryKind, NoveltyPayload,
    Severity,
};
use crate::logistics;
use crate::world::WorldState;

fn require_approver(world: &WorldState, user: UserId) -> Result<String> {
    let user_record = world.roster.get(user).ok_or(FirelineError::UserNotFound(user))?;
    if !user_record.role.can_approve() {
        return Err(FirelineError::Validation(format!(
            "{} ({:?}) is not authorized to approve or reject reports",
            user_record.display_name, user_record.role
        )));
    }
    Ok(user_record.display_name.clone())
}

/// Submit an ammo expenditure report for commander approval
pub fn submit_ammo_report(
    world: &mut WorldState,
    unit_id: UnitId,
    submitter: UserId,
    amount_percent: u8,
    justification: impl Into<String>,
    now: Timestamp,
) -> Result<AlertId> {
    if amount_percent == 0 || amount_percent > 100 {
        return Err(FirelineError::Validation(format!(
            "Expenditure must be between 1 and 100 percent, got {}",
            amount_percent
        )));
    }
    let justification = justification.into();
    let unit_name = world.require_unit(unit_id)?.name.clone();
    let submitter_name = world.roster.display_name(submitter);

    let alert_id = world.alerts.raise(
        Alert::new(
            AlertKind::AmmoReportPending,
            Severity::Medium,
            format!(
                "{} reports {}% ammunition expended for {}. Awaiting approval.",
                submitter_name, amount_percent, unit_name
            ),
            now,
        )
        .for_unit(unit_id)
        .with_payload(AlertPayload::AmmoReport(AmmoReportPayload {
            unit_id,
            unit_name: unit_name.clone(),
            submitted_by: submitter,
            amount_percent,
            justification: justification.clone(),
        })),
    );

    world.history.record(
        HistoryEvent::new(
            HistoryKind::AmmoReportSubmitted,
            format!(
                "Ammo expenditure report for {}: {}%. Justification: {}",
                unit_name, amount_percent, justification
            ),
            now,
        )
        .with_unit(unit_id, unit_name)
        .with_user(submitter)
        .with_related(EntityRef::Alert(alert_id)),
    );

    Ok(alert_id)
}

/// Log a platoon novelty for commander review
pub fn log_novelty(
    world: &mut WorldState,
    unit_id: UnitId,
    submitter: UserId,
    details: impl Into<String>,
    is_logistics_request: bool,
    now: Timestamp,
) -> Result<AlertId> {
    let details = details.into();
    if details.trim().is_empty() {
        return Err(FirelineError::Validation("A novelty must carry details".into()));
    }
    let unit_name = world.require_unit(unit_id)?.name.clone();
    let submitter_name = world.roster.display_name(submitter);

    let alert_id = world.alerts.raise(
        Alert::new(
            AlertKind::NoveltyPending,
            Severity::Low,
            format!("Novelty from {} for {}: {}", submitter_name, unit_name, details),
            now,
        )
        .for_unit(unit_id)
        .with_payload(AlertPayload::Novelty(NoveltyPayload {
            unit_id,
            unit_name: unit_name.clone(),
            submitted_by: submitter,
            details: details.clone(),
            is_logistics_request,
        })),
    );

    world.history.record(
        HistoryEvent::new(HistoryKind::NoveltySubmitted, format!("Novelty logged: {}", details), now)
            .with_unit(unit_id, unit_name)
            .with_user(submitter)
            .with_related(EntityRef::Alert(alert_id)),
    );

    Ok(alert_id)
}

fn pending_ammo_payload(world: &WorldState, alert_id: AlertId) -> Result<AmmoReportPayload> {
    let alert = world.alerts.get(alert_id).ok_or(FirelineError::AlertNotFound(alert_id))?;
    if alert.acknowledged {
        return Err(FirelineError::Conflict(format!(
            "Report {} has already been resolved",
            alert_id.short()
        )));
    }
    match &alert.payload {
        Some(AlertPayload::AmmoReport(payload)) if alert.kind == AlertKind::AmmoReportPending => {
            Ok(payload.clone())
        }
        _ => Err(FirelineError::Validation(format!(
            "Alert {} is not a pending ammo expenditure report",
            alert_id.short()
        ))),
    }
}

fn pending_novelty_payload(world: &WorldState, alert_id: AlertId) -> Result<NoveltyPayload> {
    let alert = world.alerts.get(alert_id).ok_or(FirelineError::AlertNotFound(alert_id))?;
    if alert.acknowledged {
        return Err(FirelineError::Conflict(format!(
            "Novelty {} has already been resolved",
            alert_id.short()
        )));
    }
    match &alert.payload {
        Some(AlertPayload::Novelty(payload)) if alert.kind == AlertKind::NoveltyPending => {
            Ok(payload.clone())
        }
        _ => Err(FirelineError::Validation(format!(
            "Alert {} is not a pending novelty",
            alert_id.short()
        ))),
    }
}

/// Approve a pending ammo expenditure report: the unit's ammo level drops
/// by the reported percentage points, floored at zero.
pub fn approve_ammo_report(world: &mut WorldState, alert_id: AlertId, approver: UserId, now: Timestamp) -> Result<()> {
    let approver_name = require_approver(world, approver)?;
    let payload = pending_ammo_payload(world, alert_id)?;

    let (old_level, new_level) = {
        let unit = world.require_unit_mut(payload.unit_id)?;
        let old = unit.ammo_level;
        unit.ammo_level = old.saturating_sub(payload.amount_percent);
        (old, unit.ammo_level)
    };

    world.alerts.acknowledge(alert_id);
    world.history.record(
        HistoryEvent::new(
            HistoryKind::AmmoReportApproved,
            format!(
                "{} approved the {}% expenditure for {}.",
                approver_name, payload.amount_percent, payload.unit_name
            ),
            now,
        )
        .with_unit(payload.unit_id, payload.unit_name)
        .with_user(approver)
        .with_values(format!("{}%", old_level), format!("{}%", new_level))
        .with_related(EntityRef::Alert(alert_id)),
    );

    Ok(())
}

/// Reject a pending ammo expenditure report. The unit is untouched.
pub fn reject_ammo_report(
    world: &mut WorldState,
    alert_id: AlertId,
    approver: UserId,
    reason: impl Into<String>,
    now: Timestamp,
) -> Result<()> {
    let approver_name = require_approver(world, approver)?;
    let payload = pending_ammo_payload(world, alert_id)?;

    world.alerts.acknowledge(alert_id);
    world.history.record(
        HistoryEvent::new(
            HistoryKind::AmmoReportRejected,
            format!(
                "{} rejected the {}% expenditure for {}: {}",
                approver_name,
                payload.amount_percent,
                payload.unit_name,
                reason.into()
            ),
            now,
        )
        .with_unit(payload.unit_id, payload.unit_name)
        .with_user(approver)
        .with_related(EntityRef::Alert(alert_id)),
    );

    Ok(())
}

/// Approve a pending novelty. Novelties flagged as logistics requests
/// open one on approval.
pub fn approve_novelty(world: &mut WorldState, alert_id: AlertId, approver: UserId, now: Timestamp) -> Result<()> {
    let approver_name = require_approver(world, approver)?;
    let payload = pending_novelty_payload(world, alert_id)?;

    world.alerts.acknowledge(alert_id);
    world.history.record(
        HistoryEvent::new(
            HistoryKind::NoveltyApproved,
            format!("{} approved the novelty for {}.", approver_name, payload.unit_name),
            now,
        )
        .with_unit(payload.unit_id, payload.unit_name.clone())
        .with_user(approver)
        .with_related(EntityRef::Alert(alert_id)),
    );

    if payload.is_logistics_request {
        logistics::create_request(world, payload.unit_id, payload.details, now)?;
    }

    Ok(())
}

/// Reject a pending novelty.
pub fn reject_novelty(
    world: &mut WorldState,
    alert_id: AlertId,
    approver: UserId,
    reason: impl Into<String>,
    now: Timestamp,
) -> Result<()> {
    let approver_name = require_approver(world, approver)?;
    let payload = pending_novelty_payload(world, alert_id)?;

    world.alerts.acknowledge(alert_id);
    world.history.record(
        HistoryEvent::new(
            HistoryKind::NoveltyRejected,
            format!(
                "{} rejected the novelty for {}: {}",
                approver_name,
                payload.unit_name,
                reason.into()
            ),
            now,
        )
        .with_unit(payload.unit_id, payload.unit_name)
        .with_user(approver)
        .with_related(EntityRef::Alert(alert_id)),
    );

    Ok(())
}
