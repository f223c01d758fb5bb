//! Unit lifecycle operations
//!
//! Each operation validates against the transition table, mutates the
//! world snapshot, and emits correlated history/alert entries. Nothing
//! here talks to the outside; notification dispatch is the command
//! layer's job.

use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::error::{FirelineError, Result};
use crate::core::types::{AlertId, EntityRef, ReportId, Timestamp, UnitId};
use crate::geo::{format_dms, GeoPoint};
use crate::ledger::{Alert, AlertKind, HistoryEvent, HistoryKind, Severity};
use crate::unit::{transition, CombatEnd, LeaveInfo, RetrainingInfo, Transition, UnitEvent, UnitStatus};
use crate::world::WorldState;

/// After-action report filed when a unit closes a combat episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfterActionReport {
    pub id: ReportId,
    pub unit_id: UnitId,
    pub unit_name: String,
    pub report_timestamp: Timestamp,
    pub location: GeoPoint,
    pub casualties_kia: u32,
    pub casualties_wia: u32,
    pub casualties_mia: u32,
    pub ammunition_expended_percent: u8,
    pub summary: String,
    /// The combat alert this report answers, when still on the bus
    pub combat_alert: Option<AlertId>,
}

/// Input for `add_after_action_report`
#[derive(Debug, Clone)]
pub struct NewAfterActionReport {
    pub unit_id: UnitId,
    pub location: GeoPoint,
    pub casualties_kia: u32,
    pub casualties_wia: u32,
    pub casualties_mia: u32,
    pub ammunition_expended_percent: u8,
    pub summary: String,
}

fn illegal(status: UnitStatus, event: UnitEvent) -> FirelineError {
    FirelineError::InvalidTransition { from: status.to_string(), event: event.to_string() }
}

/// Report a unit in contact. Idempotent when the unit is already engaged.
pub fn report_engaged(world: &mut WorldState, unit_id: UnitId, now: Timestamp) -> Result<()> {
    let unit = world.require_unit(unit_id)?;
    let (name, location, status) = (unit.name.clone(), unit.location, unit.status);

    match transition(status, UnitEvent::Engage) {
        Transition::Unchanged => return Ok(()),
        Transition::Illegal => return Err(illegal(status, UnitEvent::Engage)),
        Transition::To(next) => {
            world.require_unit_mut(unit_id)?.status = next;
        }
    }

    tracing::info!("{} reported in contact", name);

    let alert_id = world.alerts.raise(
        Alert::new(
            AlertKind::UnitEngaged,
            Severity::Critical,
            format!("COMBAT ALERT! {} has entered armed contact.", name),
            now,
        )
        .for_unit(unit_id)
        .at(location),
    );

    world.history.record(
        HistoryEvent::new(HistoryKind::CombatStarted, format!("{} reported entering combat.", name), now)
            .with_unit(unit_id, name)
            .with_location(location)
            .with_related(EntityRef::Alert(alert_id)),
    );

    Ok(())
}

/// Report a ceasefire. Only legal from ENGAGED; captures the combat-end
/// marker and acknowledges the originating combat alert.
pub fn report_ceasefire(world: &mut WorldState, unit_id: UnitId, now: Timestamp) -> Result<()> {
    let unit = world.require_unit(unit_id)?;
    let (name, location, status) = (unit.name.clone(), unit.location, unit.status);

    let next = match transition(status, UnitEvent::Ceasefire) {
        Transition::To(next) => next,
        _ => return Err(illegal(status, UnitEvent::Ceasefire)),
    };

    let combat_alert = world.alerts.open_for_unit(unit_id, AlertKind::UnitEngaged).map(|a| a.id);

    {
        let unit = world.require_unit_mut(unit_id)?;
        unit.status = next;
        unit.combat_end = Some(CombatEnd { timestamp: now, location });
    }

    if let Some(alert_id) = combat_alert {
        world.alerts.acknowledge(alert_id);
    }

    world.history.record(
        HistoryEvent::new(
            HistoryKind::Ceasefire,
            format!("{} reported ceasefire. After-action report pending.", name),
            now,
        )
        .with_unit(unit_id, name)
        .with_location(location),
    );

    Ok(())
}

/// File the after-action report that closes a combat episode:
/// AAR_PENDING -> OPERATIONAL, combat-end fields cleared.
pub fn add_after_action_report(
    world: &mut WorldState,
    report: NewAfterActionReport,
    now: Timestamp,
) -> Result<ReportId> {
    if report.ammunition_expended_percent > 100 {
        return Err(FirelineError::Validation(format!(
            "Ammunition expended must be a percentage, got {}",
            report.ammunition_expended_percent
        )));
    }

    let unit = world.require_unit(report.unit_id)?;
    let (name, status) = (unit.name.clone(), unit.status);

    let next = match transition(status, UnitEvent::SubmitAar) {
        Transition::To(next) => next,
        _ => return Err(illegal(status, UnitEvent::SubmitAar)),
    };

    // Link back to the combat alert if it is still on the bus
    let combat_alert = world
        .alerts
        .alerts()
        .iter()
        .find(|a| a.unit_id == Some(report.unit_id) && a.kind == AlertKind::UnitEngaged)
        .map(|a| a.id);

    let aar = AfterActionReport {
        id: ReportId::new(),
        unit_id: report.unit_id,
        unit_name: name.clone(),
        report_timestamp: now,
        location: report.location,
        casualties_kia: report.casualties_kia,
        casualties_wia: report.casualties_wia,
        casualties_mia: report.casualties_mia,
        ammunition_expended_percent: report.ammunition_expended_percent,
        summary: report.summary,
        combat_alert,
    };
    let aar_id = aar.id;

    {
        let unit = world.require_unit_mut(report.unit_id)?;
        unit.status = next;
        unit.combat_end = None;
    }

    let details = format!(
        "After-action report recorded. Casualties (KIA/WIA/MIA): {}/{}/{}. Ammunition expended: {}%.",
        aar.casualties_kia, aar.casualties_wia, aar.casualties_mia, aar.ammunition_expended_percent
    );
    world.push_after_action_report(aar);

    world.history.record(
        HistoryEvent::new(HistoryKind::AarRecorded, details, now)
            .with_unit(report.unit_id, name)
            .with_location(report.location)
            .with_related(EntityRef::Report(aar_id)),
    );

    Ok(aar_id)
}

/// Mark the unit's hourly report as received. Restores a NO_COMMUNICATION
/// unit to OPERATIONAL and clears its open comms alerts.
pub fn mark_hourly_report(world: &mut WorldState, unit_id: UnitId, now: Timestamp) -> Result<()> {
    let unit = world.require_unit(unit_id)?;
    let (name, status) = (unit.name.clone(), unit.status);

    let next = match transition(status, UnitEvent::HourlyReport) {
        Transition::To(next) => Some(next),
        Transition::Unchanged => None,
        Transition::Illegal => return Err(illegal(status, UnitEvent::HourlyReport)),
    };

    {
        let unit = world.require_unit_mut(unit_id)?;
        unit.last_hourly_report = now;
        unit.last_communication = now;
        if let Some(next) = next {
            unit.status = next;
        }
    }

    world
        .alerts
        .acknowledge_for_unit(unit_id, &[AlertKind::CommunicationLost, AlertKind::HourlyReportMissed]);

    world.history.record(
        HistoryEvent::new(
            HistoryKind::HourlyReportMarked,
            format!("Hourly report for {} marked as received.", name),
            now,
        )
        .with_unit(unit_id, name),
    );

    Ok(())
}

/// Move a unit off the operational picture into the leave/retraining area.
///
/// Clears any leave/retraining metadata; callers populate it afterwards
/// with `start_leave` or `start_retraining`.
pub fn send_to_retraining(world: &mut WorldState, unit_id: UnitId, now: Timestamp) -> Result<()> {
    let unit = world.require_unit(unit_id)?;
    let (name, status) = (unit.name.clone(), unit.status);

    let next = match transition(status, UnitEvent::SendToRetraining) {
        Transition::To(next) => next,
        _ => return Err(illegal(status, UnitEvent::SendToRetraining)),
    };

    {
        let unit = world.require_unit_mut(unit_id)?;
        unit.status = next;
        unit.leave = None;
        unit.retraining = None;
    }

    world.history.record(
        HistoryEvent::new(
            HistoryKind::SentToRetraining,
            format!("{} sent to the leave/retraining area, temporarily off the operational picture.", name),
            now,
        )
        .with_unit(unit_id, name.clone()),
    );
    world.alerts.raise(
        Alert::new(
            AlertKind::UnitToRetraining,
            Severity::Info,
            format!("{} sent to the leave/retraining area.", name),
            now,
        )
        .for_unit(unit_id),
    );

    Ok(())
}

/// Return a unit from the leave/retraining area to operations.
pub fn return_from_retraining(world: &mut WorldState, unit_id: UnitId, now: Timestamp) -> Result<()> {
    let unit = world.require_unit(unit_id)?;
    let (name, status) = (unit.name.clone(), unit.status);

    let next = match transition(status, UnitEvent::ReturnFromRetraining) {
        Transition::To(next) => next,
        _ => return Err(illegal(status, UnitEvent::ReturnFromRetraining)),
    };

    {
        let unit = world.require_unit_mut(unit_id)?;
        unit.status = next;
        unit.leave = None;
        unit.retraining = None;
    }

    world.history.record(
        HistoryEvent::new(
            HistoryKind::ReturnedFromRetraining,
            format!("{} reintegrated into the area of operations.", name),
            now,
        )
        .with_unit(unit_id, name.clone()),
    );
    world.alerts.raise(
        Alert::new(
            AlertKind::UnitReturnedFromRetraining,
            Severity::Info,
            format!("{} returned to operations.", name),
            now,
        )
        .for_unit(unit_id),
    );

    Ok(())
}

/// Record the start of a leave period for a unit already in the
/// leave/retraining area. Clears any retraining metadata.
pub fn start_leave(world: &mut WorldState, unit_id: UnitId, duration_days: u32, now: Timestamp) -> Result<()> {
    if duration_days == 0 {
        return Err(FirelineError::Validation("Leave duration must be at least one day".into()));
    }

    let name = world.require_unit(unit_id)?.name.clone();
    {
        let unit = world.require_unit_mut(unit_id)?;
        unit.leave = Some(LeaveInfo { start: now, duration_days });
        unit.retraining = None;
    }

    world.history.record(
        HistoryEvent::new(
            HistoryKind::LeaveStarted,
            format!("{}-day leave started for {}.", duration_days, name),
            now,
        )
        .with_unit(unit_id, name.clone()),
    );
    world.alerts.raise(
        Alert::new(
            AlertKind::LeaveStarted,
            Severity::Info,
            format!("{}-day leave started for {}.", duration_days, name),
            now,
        )
        .for_unit(unit_id),
    );

    Ok(())
}

/// Record the start of a retraining period. Clears any leave metadata.
pub fn start_retraining(
    world: &mut WorldState,
    unit_id: UnitId,
    focus: impl Into<String>,
    duration_days: u32,
    now: Timestamp,
) -> Result<()> {
    if duration_days == 0 {
        return Err(FirelineError::Validation("Retraining duration must be at least one day".into()));
    }

    let focus = focus.into();
    let name = world.require_unit(unit_id)?.name.clone();
    {
        let unit = world.require_unit_mut(unit_id)?;
        unit.retraining = Some(RetrainingInfo { start: now, focus: focus.clone(), duration_days });
        unit.leave = None;
    }

    world.history.record(
        HistoryEvent::new(
            HistoryKind::RetrainingStarted,
            format!("{}-day retraining started for {}. Focus: {}.", duration_days, name, focus),
            now,
        )
        .with_unit(unit_id, name.clone()),
    );
    world.alerts.raise(
        Alert::new(
            AlertKind::RetrainingStarted,
            Severity::Info,
            format!("{}-day retraining (focus: {}) started for {}.", duration_days, focus, name),
            now,
        )
        .for_unit(unit_id),
    );

    Ok(())
}

/// Sweep all units for overdue hourly reports.
///
/// One missed interval raises a report-missed alert; silence past the
/// overdue threshold flips the unit to NO_COMMUNICATION. Engaged units
/// and units off the picture are left alone. Returns the number of
/// alerts raised.
pub fn check_overdue_reports(world: &mut WorldState, now: Timestamp) -> usize {
    let cfg = config();
    let mut raised = 0;

    let unit_ids: Vec<UnitId> = world.units().iter().map(|u| u.id).collect();
    for unit_id in unit_ids {
        let Some(unit) = world.unit(unit_id) else { continue };
        let (name, location, status) = (unit.name.clone(), unit.location, unit.status);
        let silence = now.saturating_sub(unit.last_hourly_report);

        if silence > cfg.communication_overdue_ms {
            match transition(status, UnitEvent::CommsLost) {
                Transition::To(next) => {
                    if let Ok(unit) = world.require_unit_mut(unit_id) {
                        unit.status = next;
                    }
                    tracing::warn!("{} declared out of communication after {}ms of silence", name, silence);
                    let alert_id = world.alerts.raise(
                        Alert::new(
                            AlertKind::CommunicationLost,
                            Severity::High,
                            format!("Communication lost with {}. Last report at {}.", name, format_dms(location)),
                            now,
                        )
                        .for_unit(unit_id)
                        .at(location),
                    );
                    world.history.record(
                        HistoryEvent::new(
                            HistoryKind::CommunicationLost,
                            format!("{} has missed reports past the overdue threshold.", name),
                            now,
                        )
                        .with_unit(unit_id, name)
                        .with_related(EntityRef::Alert(alert_id)),
                    );
                    raised += 1;
                }
                Transition::Unchanged | Transition::Illegal => {}
            }
        } else if silence > cfg.hourly_report_interval_ms
            && status != UnitStatus::OnLeaveRetraining
            && world.alerts.open_for_unit(unit_id, AlertKind::HourlyReportMissed).is_none()
        {
            let alert_id = world.alerts.raise(
                Alert::new(
                    AlertKind::HourlyReportMissed,
                    Severity::Medium,
                    format!("{} has missed its hourly report.", name),
                    now,
                )
                .for_unit(unit_id),
            );
            world.history.record(
                HistoryEvent::new(
                    HistoryKind::ReportOverdue,
                    format!("Hourly report from {} is overdue.", name),
                    now,
                )
                .with_unit(unit_id, name)
                .with_related(EntityRef::Alert(alert_id)),
            );
            raised += 1;
        }
    }

    raised
}
