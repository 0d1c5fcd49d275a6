//! Flee / defend / attack selection and the opposed flee check.

use crate::dice::DiceOracle;
use crate::equipment::Posture;
use crate::stats::{CombatantSnapshot, ability_score};
use crate::tables::BalanceTables;
use crate::types::ParticipantId;

/// The one action an NPC takes this round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NpcAction {
    /// Attempt to run; resolved by [`resolve_flee`].
    Flee,
    /// Spend the round switching defensive posture.
    ChangePosture(Posture),
    /// Strike the given opponent.
    Attack(ParticipantId),
}

/// What the policy needs to know about one standing opponent.
#[derive(Clone, Copy, Debug)]
pub struct OpponentView<'a> {
    pub participant: ParticipantId,
    pub snapshot: CombatantSnapshot<'a>,
}

/// Decide the NPC's action for this round.
///
/// Strict priority order:
/// 1. Flee when remaining vitality drops below the personality-modified
///    threshold.
/// 2. Improve posture: fall back to the no-cost parry when the fatigue
///    reserve is under the configured floor (a bare blade parries too, so
///    this needs no gear), otherwise move up to the best posture the gear
///    supports. Never regress from a strictly better posture.
/// 3. Attack the primary opponent (first in the caller's join-ordered
///    slice).
///
/// Opponents must be the active hostile participants; an empty slice means
/// the encounter is already over and the NPC simply holds posture.
pub fn decide(
    npc: &CombatantSnapshot<'_>,
    personality: u8,
    opponents: &[OpponentView<'_>],
    tables: &BalanceTables,
) -> NpcAction {
    let threshold = tables.flee_threshold_for(personality);
    if npc.pools.remaining_vitality_permille() < threshold {
        return NpcAction::Flee;
    }

    let desired = if npc.pools.fatigue_reserve() < tables.parry_fatigue_floor {
        // Running on fumes: parry costs nothing to hold.
        Posture::Parry
    } else {
        npc.gear.best_posture()
    };
    // Parry is always attainable; the rest depend on gear.
    let attainable =
        desired == Posture::Parry || npc.gear.available_postures().contains(&desired);
    if desired > npc.posture && attainable {
        return NpcAction::ChangePosture(desired);
    }

    match opponents.first() {
        Some(primary) => NpcAction::Attack(primary.participant),
        None => NpcAction::ChangePosture(npc.posture),
    }
}

/// Opposed flee check: the NPC's mobility against every active opponent's
/// awareness, each side adding a fudge roll. The NPC escapes only by
/// beating all pursuers outright; any tie or loss keeps it in the fight
/// with its action spent.
pub fn resolve_flee(
    npc: &CombatantSnapshot<'_>,
    opponents: &[OpponentView<'_>],
    dice: &mut dyn DiceOracle,
) -> bool {
    let mobility = ability_score(npc.attributes.agility, npc.skills.mobility);
    let escape = mobility as i32 + dice.roll_fudge4() as i32;

    opponents.iter().all(|op| {
        let pursuit = ability_score(op.snapshot.attributes.perception, op.snapshot.skills.awareness);
        escape > pursuit as i32 + dice.roll_fudge4() as i32
    })
}
