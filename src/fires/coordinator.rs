//! Fire mission coordinator
//!
//! Pure assignment over the world snapshot: candidate filtering by
//! readiness, HE stock and range bracket, then minimum gun-to-target
//! distance. Requesting never mutates pieces; the piece only changes
//! state when the fire direction officer accepts.

use ordered_float::OrderedFloat;

use crate::artillery::{AmmoClass, ArtilleryStatus};
use crate::core::config::config;
use crate::core::error::{FirelineError, Result};
use crate::core::types::{EntityRef, MissionId, PieceId, RequesterId, Timestamp, UserId};
use crate::fires::{
    ActiveFireMission, ActiveStatus, FiringSolution, PendingFireMission, PendingStatus, Projectile,
};
use crate::geo::{distance_and_bearing, format_dms, GeoPoint};
use crate::ledger::{HistoryEvent, HistoryKind};
use crate::world::WorldState;

/// Mission notification for the candidate piece's fire direction officer,
/// dispatched by the command layer
#[derive(Debug, Clone)]
pub struct MissionNotice {
    pub recipient: Option<UserId>,
    pub text: String,
}

/// What a fire mission request produced
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub mission_id: MissionId,
    /// The assigned candidate, absent when no asset qualified
    pub candidate: Option<PieceId>,
    pub notice: Option<MissionNotice>,
}

/// Request fires on a target. Picks the closest Ready piece with HE
/// rounds whose range bracket covers the target, or records a NoAssets
/// mission with the reason when none qualifies.
pub fn request_fire_mission(
    world: &mut WorldState,
    requester: RequesterId,
    target: GeoPoint,
    now: Timestamp,
) -> Result<RequestOutcome> {
    let requester_name = world.require_requester_name(requester)?;

    let candidate = world
        .pieces()
        .iter()
        .filter(|p| p.can_fire(AmmoClass::He))
        .filter_map(|p| {
            let distance = distance_and_bearing(p.location, target).distance;
            p.in_range(distance).then_some((p.id, distance))
        })
        .min_by_key(|(_, distance)| OrderedFloat(*distance));

    let mission_id = MissionId::new();
    match candidate {
        Some((piece_id, distance)) => {
            let piece = world
                .piece(piece_id)
                .ok_or(FirelineError::PieceNotFound(piece_id))?;
            let (piece_name, fdo) = (piece.name.clone(), piece.fdo);
            let bearing = distance_and_bearing(piece.location, target).bearing;

            world.push_pending_mission(PendingFireMission {
                id: mission_id,
                requester,
                target,
                requested_at: now,
                candidate: Some(piece_id),
                candidate_distance: Some(distance),
                status: PendingStatus::Pending,
                reason: None,
                rejected_by: None,
            });

            world.history.record(
                HistoryEvent::new(
                    HistoryKind::FireMissionRequested,
                    format!(
                        "Fire mission requested by {} on {}. Assigned to {} at {:.0}m.",
                        requester_name,
                        format_dms(target),
                        piece_name,
                        distance
                    ),
                    now,
                )
                .with_location(target)
                .with_related(EntityRef::Mission(mission_id)),
            );

            tracing::info!("fire mission {} assigned to {}", mission_id.short(), piece_name);

            let text = format!(
                "FIRE MISSION\nRequested by: {}\nTarget: {}\nAssigned piece: {}\nDistance: {:.0} m, bearing {:.0}°",
                requester_name,
                format_dms(target),
                piece_name,
                distance,
                bearing
            );
            Ok(RequestOutcome {
                mission_id,
                candidate: Some(piece_id),
                notice: Some(MissionNotice { recipient: fdo, text }),
            })
        }
        None => {
            let reason = no_assets_reason(world, target);

            world.push_pending_mission(PendingFireMission {
                id: mission_id,
                requester,
                target,
                requested_at: now,
                candidate: None,
                candidate_distance: None,
                status: PendingStatus::NoAssets,
                reason: Some(reason.clone()),
                rejected_by: None,
            });

            world.history.record(
                HistoryEvent::new(
                    HistoryKind::FireMissionRequested,
                    format!(
                        "Fire mission requested by {} on {}. No assets: {}",
                        requester_name,
                        format_dms(target),
                        reason
                    ),
                    now,
                )
                .with_location(target)
                .with_related(EntityRef::Mission(mission_id)),
            );

            tracing::warn!("fire mission {} has no qualifying assets", mission_id.short());

            Ok(RequestOutcome { mission_id, candidate: None, notice: None })
        }
    }
}

/// Explain why no piece qualified, in decreasing order of severity
fn no_assets_reason(world: &WorldState, target: GeoPoint) -> String {
    let pieces = world.pieces();
    if pieces.is_empty() {
        return "No artillery pieces on the picture.".to_string();
    }
    let able: Vec<_> = pieces.iter().filter(|p| p.can_fire(AmmoClass::He)).collect();
    if able.is_empty() {
        return format!("None of the {} piece(s) is ready with HE rounds.", pieces.len());
    }
    let in_range = able
        .iter()
        .filter(|p| p.in_range(distance_and_bearing(p.location, target).distance))
        .count();
    debug_assert_eq!(in_range, 0);
    format!("{} piece(s) ready with HE, but the target is outside every range bracket.", able.len())
}

/// Accept a pending mission: the piece starts firing and the mission
/// moves to the active set with its committed firing solution.
pub fn accept_fire_mission(
    world: &mut WorldState,
    mission_id: MissionId,
    artillery_id: PieceId,
    projectile: Projectile,
    charge: u8,
    mrsi: bool,
    now: Timestamp,
) -> Result<()> {
    let pending = world
        .pending_mission(mission_id)
        .ok_or(FirelineError::MissionNotFound(mission_id))?;
    if pending.status != PendingStatus::Pending {
        return Err(FirelineError::Conflict(format!(
            "Mission {} is {:?}, not awaiting acceptance",
            mission_id.short(),
            pending.status
        )));
    }
    let (requester, target) = (pending.requester, pending.target);

    let piece = world
        .piece(artillery_id)
        .ok_or(FirelineError::PieceNotFound(artillery_id))?;
    if piece.status == ArtilleryStatus::Firing {
        return Err(FirelineError::Conflict(format!(
            "{} is already firing mission {}",
            piece.name,
            piece.current_mission.map(|m| m.short()).unwrap_or_default()
        )));
    }
    let class = projectile.ammo_class();
    if piece.ammo.rounds(class) == 0 {
        return Err(FirelineError::Validation(format!(
            "{} has no {} rounds for {}",
            piece.name, class, projectile
        )));
    }
    let piece_name = piece.name.clone();
    let db = distance_and_bearing(piece.location, target);

    world.remove_pending_mission(mission_id);
    world.push_active_mission(ActiveFireMission {
        id: mission_id,
        artillery_id,
        requester,
        target,
        status: ActiveStatus::Active,
        fired_at: now,
        completed_at: None,
        projectile,
        charge,
        mrsi,
        solution: FiringSolution { distance: db.distance, bearing: db.bearing },
    });
    {
        let piece = world.require_piece_mut(artillery_id)?;
        piece.status = ArtilleryStatus::Firing;
        piece.current_mission = Some(mission_id);
    }

    world.history.record(
        HistoryEvent::new(
            HistoryKind::FireMissionStarted,
            format!(
                "{} firing {} (charge {}{}) on {}.",
                piece_name,
                projectile,
                charge,
                if mrsi { ", MRSI" } else { "" },
                format_dms(target)
            ),
            now,
        )
        .with_location(target)
        .with_related(EntityRef::Mission(mission_id)),
    );

    Ok(())
}

/// Reject a pending mission. The entry stays visible with the reason
/// until dismissed.
pub fn reject_fire_mission(
    world: &mut WorldState,
    mission_id: MissionId,
    rejector: UserId,
    reason: impl Into<String>,
    now: Timestamp,
) -> Result<()> {
    let reason = reason.into();
    if reason.trim().is_empty() {
        return Err(FirelineError::Validation("A rejection must carry a reason".into()));
    }

    let rejector_name = world.roster.display_name(rejector);
    let pending = world
        .pending_mission_mut(mission_id)
        .ok_or(FirelineError::MissionNotFound(mission_id))?;
    if pending.status != PendingStatus::Pending {
        return Err(FirelineError::Conflict(format!(
            "Mission {} is {:?} and can no longer be rejected",
            mission_id.short(),
            pending.status
        )));
    }
    pending.status = PendingStatus::Rejected;
    pending.reason = Some(reason.clone());
    pending.rejected_by = Some(rejector);

    world.history.record(
        HistoryEvent::new(
            HistoryKind::FireMissionRejected,
            format!("Fire mission rejected by {}: {}", rejector_name, reason),
            now,
        )
        .with_user(rejector)
        .with_related(EntityRef::Mission(mission_id)),
    );

    Ok(())
}

/// Drop a pending entry from the board. No side effects.
pub fn dismiss_pending_mission(world: &mut WorldState, mission_id: MissionId) -> Result<()> {
    if world.remove_pending_mission(mission_id).is_none() {
        return Err(FirelineError::MissionNotFound(mission_id));
    }
    Ok(())
}

/// Confirm the shot: expend one round of the projectile's class and
/// release the piece. A piece whose every ammo class hits zero goes to
/// OUT_OF_AMMO instead of READY.
pub fn confirm_shot_fired(world: &mut WorldState, mission_id: MissionId, now: Timestamp) -> Result<()> {
    let mission = world
        .active_mission(mission_id)
        .ok_or(FirelineError::MissionNotFound(mission_id))?;
    if mission.status == ActiveStatus::Complete {
        return Err(FirelineError::Conflict(format!(
            "Mission {} is already complete",
            mission_id.short()
        )));
    }
    let (artillery_id, class) = (mission.artillery_id, mission.projectile.ammo_class());

    let (piece_name, remaining, exhausted) = {
        let piece = world.require_piece_mut(artillery_id)?;
        piece.ammo.expend(class, 1);
        let exhausted = piece.ammo.is_empty();
        piece.status = if exhausted { ArtilleryStatus::OutOfAmmo } else { ArtilleryStatus::Ready };
        piece.current_mission = None;
        (piece.name.clone(), piece.ammo.rounds(class), exhausted)
    };

    {
        let mission = world
            .active_mission_mut(mission_id)
            .ok_or(FirelineError::MissionNotFound(mission_id))?;
        mission.status = ActiveStatus::Complete;
        mission.completed_at = Some(now);
    }

    if exhausted {
        tracing::warn!("{} is out of ammunition", piece_name);
    }

    world.history.record(
        HistoryEvent::new(
            HistoryKind::FireMissionCompleted,
            format!(
                "Shot confirmed by {}. {} rounds {} remaining{}.",
                piece_name,
                remaining,
                class,
                if exhausted { "; piece out of ammunition" } else { "" }
            ),
            now,
        )
        .with_related(EntityRef::Mission(mission_id)),
    );

    Ok(())
}

/// Drop completed missions older than the configured linger window.
/// Returns how many were purged.
pub fn purge_completed(world: &mut WorldState, now: Timestamp) -> usize {
    let linger = config().completed_mission_linger_ms;
    world.retain_active_missions(|m| match (m.status, m.completed_at) {
        (ActiveStatus::Complete, Some(done)) => now.saturating_sub(done) <= linger,
        _ => true,
    })
}
