//! Per-round tick processing.
//!
//! A tick runs each active session through two passes under its session
//! lock: upkeep (penalty expiry, pending-pool drain, fatigue recovery,
//! death detection) and NPC decisions (flee, posture, attack). State is
//! mutated in memory and persisted at the end; log entries and events are
//! only flushed once persistence succeeded, so subscribers never see a
//! round that was not committed.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError};

use tokio::task::JoinSet;

use combat_core::{
    ActionKind, ActionLogEntry, CombatParticipant, CombatantRecord, LeaveReason, NpcAction,
    OpponentView, ParticipantId, SessionId, Side, Timestamp, decide, evaluate_end, resolve_attack,
    resolve_flee,
};

use crate::error::{Result, RuntimeError};
use crate::events::{CombatEvent, Scope};
use crate::repository::RepositoryError;

use super::CombatEngine;

/// Outcome of one scheduler sweep over the active sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub ticked: usize,
    pub failed: usize,
}

impl CombatEngine {
    /// Tick every active session concurrently.
    ///
    /// Sessions are independent: one failing tick is logged and counted,
    /// never allowed to stall the others.
    pub async fn tick_all(self: &Arc<Self>, now: Timestamp) -> TickReport {
        let sessions = match self.sessions.list_active().await {
            Ok(ids) => ids,
            Err(error) => {
                tracing::error!(target: "runtime::tick", %error, "failed to list active sessions");
                return TickReport::default();
            }
        };

        let mut workers = JoinSet::new();
        for id in sessions {
            let engine = Arc::clone(self);
            workers.spawn(async move { (id, engine.run_session_tick(id, now).await) });
        }

        let mut report = TickReport::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((id, Ok(()))) => {
                    tracing::trace!(target: "runtime::tick", session = %id, "round complete");
                    report.ticked += 1;
                }
                Ok((id, Err(error))) => {
                    report.failed += 1;
                    tracing::warn!(
                        target: "runtime::tick",
                        session = %id,
                        %error,
                        "session tick failed, skipping this round"
                    );
                }
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(target: "runtime::tick", %error, "session tick task panicked");
                }
            }
        }
        report
    }

    /// Run one round for one session. No-op when the session has already
    /// ended between listing and locking.
    pub async fn run_session_tick(&self, session_id: SessionId, now: Timestamp) -> Result<()> {
        let lock = self.locks.lock_for(session_id);
        let _guard = lock.lock().await;

        let mut session = self
            .sessions
            .load(session_id)
            .await?
            .ok_or(RuntimeError::SessionNotFound(session_id))?;
        if !session.is_active() {
            return Ok(());
        }

        let mut roster = self.participants.in_session(session_id).await?;
        let mut records: HashMap<ParticipantId, CombatantRecord> = HashMap::new();
        for p in roster.iter().filter(|p| p.active) {
            let record = self
                .combatants
                .load(p.combatant)
                .await?
                .ok_or(RepositoryError::CombatantNotFound(p.combatant))?;
            records.insert(p.id, record);
        }

        // Buffered until the round persists.
        let mut events: Vec<(Scope, CombatEvent)> = Vec::new();
        let mut entries: Vec<ActionLogEntry> = Vec::new();

        // Upkeep pass, in join order.
        for p in roster.iter_mut().filter(|p| p.active) {
            p.expire_penalties(now);
            let Some(record) = records.get_mut(&p.id) else {
                continue;
            };
            record.pools.drain_step();
            record
                .pools
                .recover_fatigue(self.tables.fatigue_recovery_per_round);
            record.pools.end_round();

            if record.pools.is_dead() {
                p.leave(LeaveReason::Death, now)?;
                entries.push(ActionLogEntry::event(
                    now,
                    session_id,
                    ActionKind::Death,
                    p.combatant,
                    p.name.clone(),
                    format!("{} collapses and dies", p.name),
                ));
                events.push((
                    Scope::Room(session.room),
                    CombatEvent::ParticipantDied {
                        session: session_id,
                        participant: p.id,
                        name: p.name.clone(),
                    },
                ));
            }
        }

        // Decision pass: each surviving NPC acts once, in join order.
        // Earlier actions are visible to later deciders.
        let npc_ids: Vec<ParticipantId> = roster
            .iter()
            .filter(|p| p.active && p.is_npc())
            .map(|p| p.id)
            .collect();
        for pid in npc_ids {
            let Some(idx) = roster.iter().position(|p| p.id == pid) else {
                continue;
            };
            if !roster[idx].active {
                continue;
            }

            let action = {
                let npc = &roster[idx];
                let snapshot = records[&pid].snapshot(npc.posture, &npc.penalties);
                let opponents = opponent_views(&roster, &records, npc.side);
                decide(&snapshot, records[&pid].personality, &opponents, &self.tables)
            };

            match action {
                NpcAction::Flee => {
                    let escaped = {
                        let npc = &roster[idx];
                        let snapshot = records[&pid].snapshot(npc.posture, &npc.penalties);
                        let opponents = opponent_views(&roster, &records, npc.side);
                        let mut dice = self.dice.lock().unwrap_or_else(PoisonError::into_inner);
                        resolve_flee(&snapshot, &opponents, dice.as_mut())
                    };
                    events.push((
                        Scope::Room(session.room),
                        CombatEvent::FleeAttempted {
                            session: session_id,
                            participant: pid,
                            name: roster[idx].name.clone(),
                            succeeded: escaped,
                        },
                    ));
                    if escaped {
                        roster[idx].leave(LeaveReason::Flee, now)?;
                        entries.push(ActionLogEntry::event(
                            now,
                            session_id,
                            ActionKind::Flee,
                            roster[idx].combatant,
                            roster[idx].name.clone(),
                            format!("{} breaks away and flees", roster[idx].name),
                        ));
                        events.push((
                            Scope::Room(session.room),
                            CombatEvent::ParticipantFled {
                                session: session_id,
                                participant: pid,
                                name: roster[idx].name.clone(),
                            },
                        ));
                    }
                }
                NpcAction::ChangePosture(posture) => {
                    if posture != roster[idx].posture {
                        roster[idx].posture = posture;
                        events.push((
                            Scope::Room(session.room),
                            CombatEvent::PostureChanged {
                                session: session_id,
                                participant: pid,
                                name: roster[idx].name.clone(),
                                posture,
                            },
                        ));
                    }
                }
                NpcAction::Attack(target) => {
                    let Some(target_idx) = roster.iter().position(|p| p.id == target) else {
                        continue;
                    };
                    let result = {
                        let attacker = &roster[idx];
                        let defender = &roster[target_idx];
                        let a = records[&pid].snapshot(attacker.posture, &attacker.penalties);
                        let d = records[&target].snapshot(defender.posture, &defender.penalties);
                        let mut dice = self.dice.lock().unwrap_or_else(PoisonError::into_inner);
                        resolve_attack(&a, &d, &self.tables, dice.as_mut(), now)
                    };

                    // Damage only queues pending deltas; deaths surface in
                    // the next round's upkeep pass.
                    if let Some(damage) = result.damage {
                        if let Some(record) = records.get_mut(&target) {
                            record.pools.queue_damage(damage.fatigue, damage.vitality, damage.wounds);
                        }
                        events.push((
                            Scope::Participant(target),
                            CombatEvent::DamageTaken {
                                session: session_id,
                                participant: target,
                                damage,
                            },
                        ));
                    }
                    if let Some(penalty) = result.attacker_penalty {
                        roster[idx].add_penalty(penalty);
                    }
                    entries.push(ActionLogEntry::attack(
                        now,
                        session_id,
                        roster[idx].combatant,
                        roster[idx].name.clone(),
                        roster[target_idx].combatant,
                        roster[target_idx].name.clone(),
                        result.rolls,
                        result.damage,
                        result.location,
                        result.damage_type,
                        result.narrative.clone(),
                    ));
                    events.push((
                        Scope::Room(session.room),
                        CombatEvent::AttackResolved {
                            session: session_id,
                            attacker: pid,
                            defender: target,
                            result,
                        },
                    ));
                }
            }
        }

        // A collapsed side ends the encounter; survivor rows are closed so
        // their combatants are free to fight again.
        let ended = evaluate_end(&roster);
        if let Some(reason) = ended {
            for p in roster.iter_mut().filter(|p| p.active) {
                p.leave(LeaveReason::Disengage, now)?;
            }
            session.end(reason, now)?;
        }

        // Persist, then flush. The tick holds the session lock, so these
        // saves only conflict with out-of-band writers.
        for p in &roster {
            self.participants.save(p).await?;
        }
        for (pid, record) in &records {
            if let Some(p) = roster.iter().find(|p| p.id == *pid) {
                self.combatants.save(p.combatant, record).await?;
            }
        }
        if ended.is_some() {
            self.sessions.save(&session).await?;
        }

        for entry in entries {
            self.action_log.append(entry).await?;
        }
        for (scope, event) in events {
            self.publisher.publish(scope, event);
        }

        if let Some(reason) = ended {
            tracing::info!(
                target: "runtime::tick",
                session = %session_id,
                %reason,
                "combat session ended"
            );
            self.publisher.publish(
                Scope::Room(session.room),
                CombatEvent::SessionEnded {
                    session: session_id,
                    room: session.room,
                    reason,
                    at: now,
                },
            );
            self.locks.release(session_id);
        }

        Ok(())
    }
}

/// Active hostile participants for one decider, in join order.
fn opponent_views<'a>(
    roster: &'a [CombatParticipant],
    records: &'a HashMap<ParticipantId, CombatantRecord>,
    side: Side,
) -> Vec<OpponentView<'a>> {
    roster
        .iter()
        .filter(|p| p.active && p.side != side)
        .filter_map(|p| {
            records.get(&p.id).map(|record| OpponentView {
                participant: p.id,
                snapshot: record.snapshot(p.posture, &p.penalties),
            })
        })
        .collect()
}
