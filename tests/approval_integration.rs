//! Approval workflow and logistics request integration tests

use fireline::approval::{
    approve_ammo_report, approve_novelty, log_novelty, reject_ammo_report, reject_novelty,
    submit_ammo_report,
};
use fireline::core::error::FirelineError;
use fireline::core::types::{UnitId, UserId};
use fireline::geo::GeoPoint;
use fireline::ledger::{AlertKind, AlertPayload, Severity};
use fireline::logistics::{create_request, fulfill_request, RequestStatus};
use fireline::roster::{Role, User};
use fireline::unit::Echelon;
use fireline::world::WorldState;

struct Fixture {
    world: WorldState,
    unit: UnitId,
    commander: UserId,
    platoon_leader: UserId,
}

fn fixture() -> Fixture {
    let mut world = WorldState::new();
    let unit = world.add_unit("1st Platoon", Echelon::Platoon, GeoPoint::new(4.6, -74.0), 0).unwrap();

    let commander = User {
        id: UserId::new(),
        username: "cmd6".into(),
        display_name: "Maj. Rojas".into(),
        role: Role::Commander,
        chat_id: None,
    };
    let platoon_leader = User {
        id: UserId::new(),
        username: "pl1".into(),
        display_name: "Lt. Vargas".into(),
        role: Role::PlatoonLeader,
        chat_id: None,
    };
    let (commander_id, leader_id) = (commander.id, platoon_leader.id);
    world.roster.insert(commander);
    world.roster.insert(platoon_leader);

    Fixture { world, unit, commander: commander_id, platoon_leader: leader_id }
}

#[test]
fn test_ammo_report_approval_deducts_percentage() {
    let mut f = fixture();
    let alert_id =
        submit_ammo_report(&mut f.world, f.unit, f.platoon_leader, 30, "Contact on the ridge", 1_000).unwrap();

    let alert = f.world.alerts.get(alert_id).unwrap();
    assert_eq!(alert.kind, AlertKind::AmmoReportPending);
    assert_eq!(alert.severity, Severity::Medium);
    assert!(matches!(alert.payload, Some(AlertPayload::AmmoReport(_))));

    approve_ammo_report(&mut f.world, alert_id, f.commander, 2_000).unwrap();
    assert_eq!(f.world.unit(f.unit).unwrap().ammo_level, 70);
    assert!(f.world.alerts.get(alert_id).unwrap().acknowledged);
}

#[test]
fn test_deduction_floors_at_zero() {
    let mut f = fixture();
    let first = submit_ammo_report(&mut f.world, f.unit, f.platoon_leader, 80, "Sustained contact", 1_000).unwrap();
    approve_ammo_report(&mut f.world, first, f.commander, 1_500).unwrap();
    assert_eq!(f.world.unit(f.unit).unwrap().ammo_level, 20);

    let second = submit_ammo_report(&mut f.world, f.unit, f.platoon_leader, 80, "Again", 2_000).unwrap();
    approve_ammo_report(&mut f.world, second, f.commander, 2_500).unwrap();
    assert_eq!(f.world.unit(f.unit).unwrap().ammo_level, 0);
}

#[test]
fn test_double_approval_is_a_conflict_and_mutates_nothing() {
    let mut f = fixture();
    let alert_id = submit_ammo_report(&mut f.world, f.unit, f.platoon_leader, 30, "Contact", 1_000).unwrap();
    approve_ammo_report(&mut f.world, alert_id, f.commander, 2_000).unwrap();
    assert_eq!(f.world.unit(f.unit).unwrap().ammo_level, 70);

    let err = approve_ammo_report(&mut f.world, alert_id, f.commander, 3_000).unwrap_err();
    assert!(matches!(err, FirelineError::Conflict(_)));
    // No second deduction
    assert_eq!(f.world.unit(f.unit).unwrap().ammo_level, 70);

    // Rejecting after the fact is the same conflict
    let err = reject_ammo_report(&mut f.world, alert_id, f.commander, "late", 4_000).unwrap_err();
    assert!(matches!(err, FirelineError::Conflict(_)));
}

#[test]
fn test_rejection_leaves_the_unit_untouched() {
    let mut f = fixture();
    let alert_id = submit_ammo_report(&mut f.world, f.unit, f.platoon_leader, 30, "Contact", 1_000).unwrap();
    reject_ammo_report(&mut f.world, alert_id, f.commander, "Numbers do not add up", 2_000).unwrap();

    assert_eq!(f.world.unit(f.unit).unwrap().ammo_level, 100);
    assert!(f.world.alerts.get(alert_id).unwrap().acknowledged);
    assert!(f.world.history.events().iter().any(|e| e.details.contains("Numbers do not add up")));
}

#[test]
fn test_only_approving_roles_may_resolve() {
    let mut f = fixture();
    let alert_id = submit_ammo_report(&mut f.world, f.unit, f.platoon_leader, 30, "Contact", 1_000).unwrap();

    let err = approve_ammo_report(&mut f.world, alert_id, f.platoon_leader, 2_000).unwrap_err();
    assert!(matches!(err, FirelineError::Validation(_)));

    let err = approve_ammo_report(&mut f.world, alert_id, UserId::new(), 2_000).unwrap_err();
    assert!(matches!(err, FirelineError::UserNotFound(_)));

    // Still pending for the commander
    assert!(!f.world.alerts.get(alert_id).unwrap().acknowledged);
}

#[test]
fn test_submit_validates_the_percentage() {
    let mut f = fixture();
    assert!(submit_ammo_report(&mut f.world, f.unit, f.platoon_leader, 0, "x", 1_000).is_err());
    assert!(submit_ammo_report(&mut f.world, f.unit, f.platoon_leader, 101, "x", 1_000).is_err());
}

#[test]
fn test_novelty_approval_opens_a_logistics_request_when_flagged() {
    let mut f = fixture();
    let alert_id = log_novelty(
        &mut f.world,
        f.unit,
        f.platoon_leader,
        "Radio batteries depleted, need replacements",
        true,
        1_000,
    )
    .unwrap();
    assert_eq!(f.world.alerts.get(alert_id).unwrap().severity, Severity::Low);

    approve_novelty(&mut f.world, alert_id, f.commander, 2_000).unwrap();
    assert!(f.world.alerts.get(alert_id).unwrap().acknowledged);

    let requests = f.world.logistics_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].status, RequestStatus::Pending);
    assert!(requests[0].details.contains("Radio batteries"));
}

#[test]
fn test_plain_novelty_approval_opens_nothing() {
    let mut f = fixture();
    let alert_id =
        log_novelty(&mut f.world, f.unit, f.platoon_leader, "New OP established on hill 402", false, 1_000)
            .unwrap();
    approve_novelty(&mut f.world, alert_id, f.commander, 2_000).unwrap();
    assert!(f.world.logistics_requests().is_empty());
}

#[test]
fn test_novelty_rejection_is_final() {
    let mut f = fixture();
    let alert_id = log_novelty(&mut f.world, f.unit, f.platoon_leader, "Unverified sighting", false, 1_000).unwrap();
    reject_novelty(&mut f.world, alert_id, f.commander, "Needs confirmation", 2_000).unwrap();

    let err = approve_novelty(&mut f.world, alert_id, f.commander, 3_000).unwrap_err();
    assert!(matches!(err, FirelineError::Conflict(_)));
    assert!(f.world.logistics_requests().is_empty());
}

#[test]
fn test_logistics_request_fulfillment() {
    let mut f = fixture();
    let request_id = create_request(&mut f.world, f.unit, "5000L diesel", 1_000).unwrap();

    let pending_alert = f.world.logistics_request(request_id).unwrap().alert_id;
    assert!(!f.world.alerts.get(pending_alert).unwrap().acknowledged);

    fulfill_request(&mut f.world, request_id, f.commander, 2_000).unwrap();
    let request = f.world.logistics_request(request_id).unwrap();
    assert_eq!(request.status, RequestStatus::Fulfilled);
    assert_eq!(request.fulfilled_at, Some(2_000));
    assert_eq!(request.fulfilled_by, Some(f.commander));
    assert!(f.world.alerts.get(pending_alert).unwrap().acknowledged);
    assert!(f
        .world
        .alerts
        .alerts()
        .iter()
        .any(|a| a.kind == AlertKind::LogisticsRequestFulfilled));

    let err = fulfill_request(&mut f.world, request_id, f.commander, 3_000).unwrap_err();
    assert!(matches!(err, FirelineError::Conflict(_)));
}
