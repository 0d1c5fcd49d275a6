//! Session orchestration: the `engage` entry point.
//!
//! [`CombatEngine`] wires repositories, the world oracle, the publisher,
//! and the balance tables together. The command dispatcher calls
//! [`CombatEngine::engage`] when a player attacks; the round scheduler
//! calls [`CombatEngine::run_session_tick`] (see [`tick`]).

pub mod locks;
pub mod tick;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

use combat_core::{
    ActionKind, ActionLogEntry, AttackResult, BalanceTables, CombatParticipant, CombatSession,
    CombatantRecord, CombatantRef, DiceOracle, EndReason, LeaveReason, ParticipantId, RoomId,
    SessionError, SessionId, Side, Timestamp, resolve_attack,
};

use crate::dice::ThreadRngDice;
use crate::error::{EngageError, Result, RuntimeError};
use crate::events::{CombatEvent, Publisher, Scope};
use crate::oracle::WorldOracle;
use crate::repository::{
    ActionLogRepository, CombatantRepository, ParticipantRepository, RepositoryError,
    SessionRepository,
};

pub use locks::SessionLocks;
pub use tick::TickReport;

/// Result of a successful engagement, returned for display.
#[derive(Clone, Debug)]
pub struct EngageOutcome {
    pub session: SessionId,
    pub attacker: ParticipantId,
    pub defender: ParticipantId,
    pub result: AttackResult,
}

/// The combat engine: session resolution, attack application, tick
/// processing.
///
/// All state lives behind the injected repositories; the engine itself
/// only holds the per-session lock registry, so it can be shared as an
/// `Arc` between the scheduler worker and command handlers.
pub struct CombatEngine {
    sessions: Arc<dyn SessionRepository>,
    participants: Arc<dyn ParticipantRepository>,
    combatants: Arc<dyn CombatantRepository>,
    action_log: Arc<dyn ActionLogRepository>,
    publisher: Arc<dyn Publisher>,
    world: Arc<dyn WorldOracle>,
    tables: BalanceTables,
    dice: Mutex<Box<dyn DiceOracle>>,
    locks: SessionLocks,
    /// Serializes session resolve-or-create so two simultaneous first
    /// attacks against one target cannot open duplicate sessions.
    engage_gate: tokio::sync::Mutex<()>,
}

impl CombatEngine {
    pub fn builder() -> CombatEngineBuilder {
        CombatEngineBuilder::new()
    }

    pub fn tables(&self) -> &BalanceTables {
        &self.tables
    }

    /// Resolve a player-initiated attack.
    ///
    /// Validates the engagement, resolves or creates the session (joining
    /// the target's existing fight rather than opening a duplicate), then
    /// performs one attack under the session lock and persists the result.
    /// Rejections mutate nothing; a version conflict is retried once and
    /// then surfaced as [`EngageError::Transient`].
    pub async fn engage(
        &self,
        attacker: CombatantRef,
        target: CombatantRef,
        now: Timestamp,
    ) -> Result<EngageOutcome> {
        if attacker == target {
            return Err(EngageError::SelfTarget.into());
        }
        if !self.world.colocated(attacker, target) {
            return Err(EngageError::NotColocated.into());
        }
        let room = self
            .world
            .room_of(attacker)
            .ok_or(EngageError::NotColocated)?;

        let attacker_record = self
            .combatants
            .load(attacker)
            .await?
            .ok_or(EngageError::CombatantNotFound(attacker))?;
        let target_record = self
            .combatants
            .load(target)
            .await?
            .ok_or(EngageError::CombatantNotFound(target))?;
        if attacker_record.pools.is_dead() {
            return Err(EngageError::AttackerDead.into());
        }
        if target_record.pools.is_dead() {
            return Err(EngageError::TargetDead(target_record.name.clone()).into());
        }

        let (session_id, attacker_pid, defender_pid, _guard) = self
            .resolve_or_create_session(attacker, &attacker_record, target, &target_record, room, now)
            .await?;

        match self
            .attack_once(session_id, attacker_pid, defender_pid, now)
            .await
        {
            Err(RuntimeError::Repository(e)) if e.is_version_conflict() => {
                tracing::warn!(
                    target: "runtime::engage",
                    session = %session_id,
                    "version conflict applying attack, retrying once"
                );
                match self
                    .attack_once(session_id, attacker_pid, defender_pid, now)
                    .await
                {
                    Err(RuntimeError::Repository(e)) if e.is_version_conflict() => {
                        Err(EngageError::Transient.into())
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    /// Find the session this engagement belongs to, creating one when
    /// neither side is fighting yet. Runs under the engage gate and
    /// returns with the session lock held, so the enrollment and the
    /// attack that follows cannot interleave with the round tick.
    async fn resolve_or_create_session(
        &self,
        attacker: CombatantRef,
        attacker_record: &CombatantRecord,
        target: CombatantRef,
        target_record: &CombatantRecord,
        room: RoomId,
        now: Timestamp,
    ) -> Result<(SessionId, ParticipantId, ParticipantId, OwnedMutexGuard<()>)> {
        let _gate = self.engage_gate.lock().await;

        let attacker_active = self.participants.active_for(attacker).await?;
        let target_active = self.participants.active_for(target).await?;

        match (attacker_active, target_active) {
            // Both already in the same fight: re-target within it.
            (Some(a), Some(t)) if a.session == t.session => {
                let guard = self.locks.lock_for(a.session).lock_owned().await;
                Ok((a.session, a.id, t.id, guard))
            }

            // Fighting in two different sessions; a combatant is in at
            // most one fight at a time.
            (Some(_), Some(_)) => Err(EngageError::AlreadyEngaged.into()),

            // Target is already fighting: join that session on the
            // opposite side instead of opening a duplicate. The tick may
            // end the fight between the lookup and the lock, so the
            // session state is re-checked under the lock.
            (None, Some(t)) => {
                let guard = self.locks.lock_for(t.session).lock_owned().await;
                match self.sessions.load(t.session).await? {
                    Some(session) if session.is_active() => {
                        let pid = self
                            .enroll(t.session, attacker, attacker_record, t.side.opposite(), now)
                            .await?;
                        Ok((t.session, pid, t.id, guard))
                    }
                    // The fight just ended; both combatants are free.
                    _ => {
                        drop(guard);
                        self.open_session(attacker, attacker_record, target, target_record, room, now)
                            .await
                    }
                }
            }

            // Attacker is fighting and pulls a fresh target into it.
            (Some(a), None) => {
                let guard = self.locks.lock_for(a.session).lock_owned().await;
                match self.sessions.load(a.session).await? {
                    Some(session) if session.is_active() => {
                        let pid = self
                            .enroll(a.session, target, target_record, a.side.opposite(), now)
                            .await?;
                        Ok((a.session, a.id, pid, guard))
                    }
                    _ => {
                        drop(guard);
                        self.open_session(attacker, attacker_record, target, target_record, room, now)
                            .await
                    }
                }
            }

            // No session on either side: open one.
            (None, None) => {
                self.open_session(attacker, attacker_record, target, target_record, room, now)
                    .await
            }
        }
    }

    /// Open a fresh session and seat both combatants. If seating fails
    /// partway, the half-created session is closed again so its rows do
    /// not leave either combatant stuck in a fight that never started.
    async fn open_session(
        &self,
        attacker: CombatantRef,
        attacker_record: &CombatantRecord,
        target: CombatantRef,
        target_record: &CombatantRecord,
        room: RoomId,
        now: Timestamp,
    ) -> Result<(SessionId, ParticipantId, ParticipantId, OwnedMutexGuard<()>)> {
        let mut session = CombatSession::new(room, now);
        let id = self.sessions.create(session.clone()).await?;
        session.id = id;
        session.version = 1;
        let guard = self.locks.lock_for(id).lock_owned().await;

        tracing::info!(
            target: "runtime::engage",
            session = %id,
            %room,
            %attacker,
            %target,
            "combat session opened"
        );
        self.publisher.publish(
            Scope::Room(room),
            CombatEvent::SessionStarted {
                session: id,
                room,
                at: now,
            },
        );

        let seated = async {
            let attacker_pid = self
                .enroll(id, attacker, attacker_record, Side::Attackers, now)
                .await?;
            let defender_pid = self
                .enroll(id, target, target_record, Side::Defenders, now)
                .await?;
            session.activate()?;
            self.sessions.save(&session).await?;
            Ok::<_, RuntimeError>((attacker_pid, defender_pid))
        }
        .await;

        match seated {
            Ok((attacker_pid, defender_pid)) => Ok((id, attacker_pid, defender_pid, guard)),
            Err(error) => {
                self.abandon_session(id, now).await;
                drop(guard);
                self.locks.release(id);
                Err(error)
            }
        }
    }

    /// Best-effort teardown of a session that failed before activation:
    /// close any rows already seated and end the session itself.
    async fn abandon_session(&self, id: SessionId, now: Timestamp) {
        tracing::warn!(
            target: "runtime::engage",
            session = %id,
            "closing half-created session"
        );
        match self.participants.in_session(id).await {
            Ok(rows) => {
                for mut row in rows.into_iter().filter(|r| r.active) {
                    if row.leave(LeaveReason::Disengage, now).is_ok() {
                        if let Err(error) = self.participants.save(&row).await {
                            tracing::warn!(
                                target: "runtime::engage",
                                session = %id,
                                participant = %row.id,
                                %error,
                                "failed to close stranded participant"
                            );
                        }
                    }
                }
            }
            Err(error) => {
                tracing::warn!(
                    target: "runtime::engage",
                    session = %id,
                    %error,
                    "failed to list stranded participants"
                );
            }
        }
        match self.sessions.load(id).await {
            Ok(Some(mut session)) => {
                if session.end(EndReason::Disengage, now).is_ok() {
                    if let Err(error) = self.sessions.save(&session).await {
                        tracing::warn!(
                            target: "runtime::engage",
                            session = %id,
                            %error,
                            "failed to end stranded session"
                        );
                    }
                }
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    target: "runtime::engage",
                    session = %id,
                    %error,
                    "failed to reload stranded session"
                );
            }
        }
    }

    /// Add a combatant to a session and announce it.
    async fn enroll(
        &self,
        session: SessionId,
        combatant: CombatantRef,
        record: &CombatantRecord,
        side: Side,
        now: Timestamp,
    ) -> Result<ParticipantId> {
        let mut participant =
            CombatParticipant::new(session, combatant, record.name.clone(), side, now);
        participant.active = true;
        let pid = self.participants.create(participant).await?;

        self.action_log
            .append(ActionLogEntry::event(
                now,
                session,
                ActionKind::Join,
                combatant,
                record.name.clone(),
                format!("{} joins the fight", record.name),
            ))
            .await?;
        self.publisher.publish(
            Scope::Room(self.room_of_session(session).await?),
            CombatEvent::ParticipantJoined {
                session,
                participant: pid,
                combatant,
                name: record.name.clone(),
            },
        );
        Ok(pid)
    }

    async fn room_of_session(&self, session: SessionId) -> Result<RoomId> {
        let session = self
            .sessions
            .load(session)
            .await?
            .ok_or(RuntimeError::SessionNotFound(session))?;
        Ok(session.room)
    }

    /// Load, resolve, and persist one attack between two participants.
    /// Must be called with the session lock held.
    async fn attack_once(
        &self,
        session_id: SessionId,
        attacker_pid: ParticipantId,
        defender_pid: ParticipantId,
        now: Timestamp,
    ) -> Result<EngageOutcome> {
        let session = self
            .sessions
            .load(session_id)
            .await?
            .ok_or(RuntimeError::SessionNotFound(session_id))?;
        // The fight may have ended between session resolution and this
        // call landing on the lock.
        if !session.is_active() {
            return Err(SessionError::NotActive {
                session: session_id,
            }
            .into());
        }

        let mut attacker_p = self
            .participants
            .load(attacker_pid)
            .await?
            .ok_or(RepositoryError::ParticipantNotFound(attacker_pid))?;
        let defender_p = self
            .participants
            .load(defender_pid)
            .await?
            .ok_or(RepositoryError::ParticipantNotFound(defender_pid))?;

        let attacker_rec = self
            .combatants
            .load(attacker_p.combatant)
            .await?
            .ok_or(RepositoryError::CombatantNotFound(attacker_p.combatant))?;
        let mut defender_rec = self
            .combatants
            .load(defender_p.combatant)
            .await?
            .ok_or(RepositoryError::CombatantNotFound(defender_p.combatant))?;

        attacker_p.expire_penalties(now);
        let result = {
            let mut dice = self.dice.lock().unwrap_or_else(PoisonError::into_inner);
            resolve_attack(
                &attacker_rec.snapshot(attacker_p.posture, &attacker_p.penalties),
                &defender_rec.snapshot(defender_p.posture, &defender_p.penalties),
                &self.tables,
                dice.as_mut(),
                now,
            )
        };

        if let Some(penalty) = result.attacker_penalty {
            attacker_p.add_penalty(penalty);
        }
        // The versioned save goes first: a conflict here aborts before
        // anything is written, so a retry resolves from clean state.
        self.participants.save(&attacker_p).await?;

        // Damage is queued against the pending pools; the scheduler drains
        // them over the coming rounds.
        if let Some(damage) = result.damage {
            defender_rec
                .pools
                .queue_damage(damage.fatigue, damage.vitality, damage.wounds);
            self.combatants
                .save(defender_p.combatant, &defender_rec)
                .await?;
        }

        self.action_log
            .append(ActionLogEntry::attack(
                now,
                session_id,
                attacker_p.combatant,
                attacker_p.name.clone(),
                defender_p.combatant,
                defender_p.name.clone(),
                result.rolls,
                result.damage,
                result.location,
                result.damage_type,
                result.narrative.clone(),
            ))
            .await?;

        self.publisher.publish(
            Scope::Room(session.room),
            CombatEvent::AttackResolved {
                session: session_id,
                attacker: attacker_pid,
                defender: defender_pid,
                result: result.clone(),
            },
        );
        if let Some(damage) = result.damage {
            self.publisher.publish(
                Scope::Participant(defender_pid),
                CombatEvent::DamageTaken {
                    session: session_id,
                    participant: defender_pid,
                    damage,
                },
            );
        }

        Ok(EngageOutcome {
            session: session_id,
            attacker: attacker_pid,
            defender: defender_pid,
            result,
        })
    }
}

/// Builder for [`CombatEngine`] with flexible configuration.
pub struct CombatEngineBuilder {
    sessions: Option<Arc<dyn SessionRepository>>,
    participants: Option<Arc<dyn ParticipantRepository>>,
    combatants: Option<Arc<dyn CombatantRepository>>,
    action_log: Option<Arc<dyn ActionLogRepository>>,
    publisher: Option<Arc<dyn Publisher>>,
    world: Option<Arc<dyn WorldOracle>>,
    tables: BalanceTables,
    dice: Option<Box<dyn DiceOracle>>,
}

impl CombatEngineBuilder {
    fn new() -> Self {
        Self {
            sessions: None,
            participants: None,
            combatants: None,
            action_log: None,
            publisher: None,
            world: None,
            tables: BalanceTables::default(),
            dice: None,
        }
    }

    pub fn sessions(mut self, repo: Arc<dyn SessionRepository>) -> Self {
        self.sessions = Some(repo);
        self
    }

    pub fn participants(mut self, repo: Arc<dyn ParticipantRepository>) -> Self {
        self.participants = Some(repo);
        self
    }

    pub fn combatants(mut self, repo: Arc<dyn CombatantRepository>) -> Self {
        self.combatants = Some(repo);
        self
    }

    pub fn action_log(mut self, repo: Arc<dyn ActionLogRepository>) -> Self {
        self.action_log = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn world(mut self, world: Arc<dyn WorldOracle>) -> Self {
        self.world = Some(world);
        self
    }

    pub fn tables(mut self, tables: BalanceTables) -> Self {
        self.tables = tables;
        self
    }

    /// Override the dice source (defaults to [`ThreadRngDice`]).
    pub fn dice(mut self, dice: Box<dyn DiceOracle>) -> Self {
        self.dice = Some(dice);
        self
    }

    pub fn build(self) -> Result<CombatEngine> {
        Ok(CombatEngine {
            sessions: self.sessions.ok_or(RuntimeError::MissingComponent("sessions"))?,
            participants: self
                .participants
                .ok_or(RuntimeError::MissingComponent("participants"))?,
            combatants: self
                .combatants
                .ok_or(RuntimeError::MissingComponent("combatants"))?,
            action_log: self
                .action_log
                .ok_or(RuntimeError::MissingComponent("action_log"))?,
            publisher: self
                .publisher
                .ok_or(RuntimeError::MissingComponent("publisher"))?,
            world: self.world.ok_or(RuntimeError::MissingComponent("world"))?,
            tables: self.tables,
            dice: Mutex::new(self.dice.unwrap_or_else(|| Box::new(ThreadRngDice))),
            locks: SessionLocks::new(),
            engage_gate: tokio::sync::Mutex::new(()),
        })
    }
}
