//! Unit lifecycle integration tests

use fireline::core::error::FirelineError;
use fireline::geo::GeoPoint;
use fireline::ledger::AlertKind;
use fireline::unit::lifecycle::{
    add_after_action_report, check_overdue_reports, mark_hourly_report, report_ceasefire,
    report_engaged, return_from_retraining, send_to_retraining, start_leave, start_retraining,
    NewAfterActionReport,
};
use fireline::unit::logistics::{process_spot_report, update_logistics, LogisticsUpdate};
use fireline::unit::{Echelon, UnitStatus};
use fireline::world::WorldState;

const HOUR: u64 = 60 * 60 * 1000;

fn world_with_unit() -> (WorldState, fireline::core::types::UnitId) {
    let mut world = WorldState::new();
    let unit = world.add_unit("1st Platoon", Echelon::Platoon, GeoPoint::new(4.6, -74.0), 0).unwrap();
    (world, unit)
}

fn aar(unit_id: fireline::core::types::UnitId) -> NewAfterActionReport {
    NewAfterActionReport {
        unit_id,
        location: GeoPoint::new(4.61, -74.01),
        casualties_kia: 0,
        casualties_wia: 2,
        casualties_mia: 0,
        ammunition_expended_percent: 35,
        summary: "Contact broken after 40 minutes".into(),
    }
}

#[test]
fn test_combat_cycle_round_trip() {
    let (mut world, unit) = world_with_unit();

    report_engaged(&mut world, unit, 1_000).unwrap();
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::Engaged);
    let combat_alert = world.alerts.open_for_unit(unit, AlertKind::UnitEngaged).unwrap().id;

    report_ceasefire(&mut world, unit, 2_000).unwrap();
    let u = world.unit(unit).unwrap();
    assert_eq!(u.status, UnitStatus::AarPending);
    assert_eq!(u.combat_end.unwrap().timestamp, 2_000);
    // The combat alert is resolved at ceasefire
    assert!(world.alerts.get(combat_alert).unwrap().acknowledged);

    let report_id = add_after_action_report(&mut world, aar(unit), 3_000).unwrap();
    let u = world.unit(unit).unwrap();
    assert_eq!(u.status, UnitStatus::Operational);
    assert!(u.combat_end.is_none());

    let report = world.after_action_reports().iter().find(|r| r.id == report_id).unwrap();
    assert_eq!(report.casualties_wia, 2);
    assert_eq!(report.combat_alert, Some(combat_alert));
}

#[test]
fn test_engage_is_idempotent() {
    let (mut world, unit) = world_with_unit();
    report_engaged(&mut world, unit, 1_000).unwrap();
    let alerts_before = world.alerts.len();
    report_engaged(&mut world, unit, 2_000).unwrap();
    // No duplicate combat alert
    assert_eq!(world.alerts.len(), alerts_before);
}

#[test]
fn test_ceasefire_without_combat_is_illegal() {
    let (mut world, unit) = world_with_unit();
    let err = report_ceasefire(&mut world, unit, 1_000).unwrap_err();
    assert!(matches!(err, FirelineError::InvalidTransition { .. }));

    let err = add_after_action_report(&mut world, aar(unit), 1_000).unwrap_err();
    assert!(matches!(err, FirelineError::InvalidTransition { .. }));
}

#[test]
fn test_overdue_sweep_escalates_to_no_communication() {
    let (mut world, unit) = world_with_unit();

    // Past one interval: report-missed alert, status untouched
    let raised = check_overdue_reports(&mut world, HOUR + 1);
    assert_eq!(raised, 1);
    assert!(world.alerts.open_for_unit(unit, AlertKind::HourlyReportMissed).is_some());
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::Operational);

    // A second sweep in the same window raises nothing new
    assert_eq!(check_overdue_reports(&mut world, HOUR + 2), 0);

    // Past the overdue threshold the unit goes silent
    let raised = check_overdue_reports(&mut world, 4 * HOUR + 1);
    assert_eq!(raised, 1);
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::NoCommunication);
    assert!(world.alerts.open_for_unit(unit, AlertKind::CommunicationLost).is_some());
}

#[test]
fn test_hourly_report_restores_comms_and_clears_alerts() {
    let (mut world, unit) = world_with_unit();
    check_overdue_reports(&mut world, HOUR + 1);
    check_overdue_reports(&mut world, 4 * HOUR + 1);
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::NoCommunication);

    mark_hourly_report(&mut world, unit, 5 * HOUR).unwrap();
    let u = world.unit(unit).unwrap();
    assert_eq!(u.status, UnitStatus::Operational);
    assert_eq!(u.last_hourly_report, 5 * HOUR);
    assert!(world.alerts.open_for_unit(unit, AlertKind::CommunicationLost).is_none());
    assert!(world.alerts.open_for_unit(unit, AlertKind::HourlyReportMissed).is_none());
}

#[test]
fn test_overdue_sweep_spares_engaged_units() {
    let (mut world, unit) = world_with_unit();
    report_engaged(&mut world, unit, 0).unwrap();

    check_overdue_reports(&mut world, 5 * HOUR);
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::Engaged);
}

#[test]
fn test_retraining_clears_leave_metadata() {
    let (mut world, unit) = world_with_unit();

    send_to_retraining(&mut world, unit, 1_000).unwrap();
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::OnLeaveRetraining);

    start_leave(&mut world, unit, 14, 2_000).unwrap();
    assert_eq!(world.unit(unit).unwrap().leave.as_ref().unwrap().duration_days, 14);

    // Starting retraining displaces the leave record
    start_retraining(&mut world, unit, "Gunnery", 7, 3_000).unwrap();
    let u = world.unit(unit).unwrap();
    assert!(u.leave.is_none());
    assert_eq!(u.retraining.as_ref().unwrap().focus, "Gunnery");

    return_from_retraining(&mut world, unit, 4_000).unwrap();
    let u = world.unit(unit).unwrap();
    assert_eq!(u.status, UnitStatus::Operational);
    assert!(u.retraining.is_none());

    let err = return_from_retraining(&mut world, unit, 5_000).unwrap_err();
    assert!(matches!(err, FirelineError::InvalidTransition { .. }));
}

#[test]
fn test_send_to_retraining_wipes_stale_metadata() {
    let (mut world, unit) = world_with_unit();
    send_to_retraining(&mut world, unit, 1_000).unwrap();
    start_leave(&mut world, unit, 14, 2_000).unwrap();
    return_from_retraining(&mut world, unit, 3_000).unwrap();

    // A later send starts from a clean slate
    send_to_retraining(&mut world, unit, 4_000).unwrap();
    let u = world.unit(unit).unwrap();
    assert!(u.leave.is_none());
    assert!(u.retraining.is_none());
}

#[test]
fn test_spot_report_moves_unit_and_caps_route() {
    let (mut world, unit) = world_with_unit();

    process_spot_report(&mut world, unit, GeoPoint::new(4.62, -74.02), 1_000).unwrap();
    let u = world.unit(unit).unwrap();
    assert_eq!(u.status, UnitStatus::Moving);
    assert_eq!(u.location, GeoPoint::new(4.62, -74.02));
    assert_eq!(u.last_movement, 1_000);

    // Holding in place reads as static
    process_spot_report(&mut world, unit, GeoPoint::new(4.62, -74.02), 2_000).unwrap();
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::Static);

    for i in 0..60u64 {
        process_spot_report(&mut world, unit, GeoPoint::new(4.62 + i as f64 * 0.001, -74.02), 3_000 + i)
            .unwrap();
    }
    let u = world.unit(unit).unwrap();
    assert_eq!(u.route_history.len(), 50);
    // The newest point survives the trim
    assert_eq!(u.route_history.last().unwrap().timestamp, 3_059);
}

#[test]
fn test_spot_report_preserves_combat_status() {
    let (mut world, unit) = world_with_unit();
    report_engaged(&mut world, unit, 500).unwrap();
    process_spot_report(&mut world, unit, GeoPoint::new(4.63, -74.03), 1_000).unwrap();
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::Engaged);
}

#[test]
fn test_logistics_thresholds_raise_and_clear_supply_warning() {
    let (mut world, unit) = world_with_unit();

    update_logistics(
        &mut world,
        unit,
        LogisticsUpdate { ammo_level: Some(15), ..Default::default() },
        None,
        1_000,
    )
    .unwrap();
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::LowSupplies);

    // Ammo alone is not enough to clear; both thresholds must be exceeded
    update_logistics(
        &mut world,
        unit,
        LogisticsUpdate { ammo_level: Some(80), days_of_supply: Some(2), ..Default::default() },
        None,
        2_000,
    )
    .unwrap();
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::LowSupplies);

    update_logistics(
        &mut world,
        unit,
        LogisticsUpdate { days_of_supply: Some(10), ..Default::default() },
        None,
        3_000,
    )
    .unwrap();
    assert_eq!(world.unit(unit).unwrap().status, UnitStatus::Operational);
}

#[test]
fn test_logistics_rejects_bad_percentages() {
    let (mut world, unit) = world_with_unit();
    let err = update_logistics(
        &mut world,
        unit,
        LogisticsUpdate { fuel_level: Some(140), ..Default::default() },
        None,
        1_000,
    )
    .unwrap_err();
    assert!(matches!(err, FirelineError::Validation(_)));
}
