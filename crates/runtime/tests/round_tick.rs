//! Round processing: pending-pool drain, deaths, NPC turns, isolation.

mod common;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use combat_core::{
    ActionKind, Attributes, CombatParticipant, CombatSession, CombatSkills, CombatantRecord,
    CombatantRef, EndReason, LeaveReason, ParticipantId, Posture, ScriptedDice, SessionId,
    SessionState,
};
use runtime::{
    CombatEngine, CombatEvent, EngageError, EventBus, InMemoryActionLog, InMemoryCombatantRepo,
    InMemoryParticipantRepo, InMemorySessionRepo, ParticipantRepository, RepositoryError,
    RuntimeError, SessionRepository, StaticWorld, TickWorker,
};

use common::*;

#[tokio::test]
async fn pending_damage_drains_by_halves() {
    let dice = ScriptedDice::new().with_fudge([-1, 0]);
    let h = harness(Box::new(dice));
    h.seed(player(1), commoner("Ann"));
    h.seed(player(2), commoner("Bo"));

    let outcome = h.engine.engage(player(1), player(2), t(0)).await.unwrap();
    assert!(!outcome.result.is_hit());

    let mut record = h.combatants.load(player(2)).await.unwrap().unwrap();
    record.pools.queue_damage(0, 5, 0);
    h.combatants.insert(player(2), record);

    // 5 pending drains 3, 1, 1.
    h.engine.run_session_tick(outcome.session, t(3_000)).await.unwrap();
    let record = h.combatants.load(player(2)).await.unwrap().unwrap();
    assert_eq!(record.pools.vitality, 3);
    assert_eq!(record.pools.pending_vitality, 2);

    h.engine.run_session_tick(outcome.session, t(6_000)).await.unwrap();
    let record = h.combatants.load(player(2)).await.unwrap().unwrap();
    assert_eq!(record.pools.vitality, 4);

    h.engine.run_session_tick(outcome.session, t(9_000)).await.unwrap();
    let record = h.combatants.load(player(2)).await.unwrap().unwrap();
    assert_eq!(record.pools.vitality, 5);
    assert_eq!(record.pools.pending_vitality, 0);

    // Nobody died: the fight goes on.
    let session = h.sessions.load(outcome.session).await.unwrap().unwrap();
    assert_eq!(session.state, SessionState::Active);
}

#[tokio::test]
async fn overdamage_clamps_at_max_and_ends_with_death() {
    let dice = ScriptedDice::new().with_fudge([-1, 0]);
    let h = harness(Box::new(dice));
    h.seed(player(1), commoner("Ann"));
    h.seed(player(2), commoner("Bo"));

    let outcome = h.engine.engage(player(1), player(2), t(0)).await.unwrap();

    let mut record = h.combatants.load(player(2)).await.unwrap().unwrap();
    record.pools.queue_damage(0, 30, 0);
    h.combatants.insert(player(2), record);

    let mut rx = h.bus.subscribe();
    h.engine.run_session_tick(outcome.session, t(3_000)).await.unwrap();

    // The drain never overshoots the pool maximum.
    let record = h.combatants.load(player(2)).await.unwrap().unwrap();
    assert_eq!(record.pools.vitality, record.pools.max_vitality);
    assert!(record.pools.is_dead());

    let session = h.sessions.load(outcome.session).await.unwrap().unwrap();
    assert_eq!(session.state, SessionState::Ended);
    assert_eq!(session.end_reason, Some(EndReason::Death));
    assert!(h.sessions.list_active().await.unwrap().is_empty());

    let roster = h.participants.in_session(outcome.session).await.unwrap();
    let bo = roster.iter().find(|p| p.combatant == player(2)).unwrap();
    let ann = roster.iter().find(|p| p.combatant == player(1)).unwrap();
    assert_eq!(bo.leave_reason, Some(LeaveReason::Death));
    assert!(!ann.active);

    let mut died = false;
    let mut ended = false;
    while let Ok(envelope) = rx.try_recv() {
        match envelope.event {
            CombatEvent::ParticipantDied { .. } => died = true,
            CombatEvent::SessionEnded { reason, .. } => {
                ended = true;
                assert_eq!(reason, EndReason::Death);
            }
            _ => {}
        }
    }
    assert!(died && ended);
}

#[tokio::test]
async fn npc_raises_posture_then_strikes_back() {
    // Engage misses; tick 1 has the goblin improve to dodge; tick 2 it
    // attacks (AS 3 + 1 vs TV 0, SV 4 blunt to the torso: 2 FAT / 2 VIT).
    let dice = ScriptedDice::new().with_fudge([-1, 0, 1, 0]).with_dies([7]);
    let h = harness(Box::new(dice));
    h.seed(player(1), commoner("Ann"));
    let goblin = CombatantRecord::new(
        "goblin",
        Attributes::default(),
        CombatSkills::new(3, 0, 0, 0),
    );
    h.seed(npc(1), goblin);

    let outcome = h.engine.engage(player(1), npc(1), t(0)).await.unwrap();

    h.engine.run_session_tick(outcome.session, t(3_000)).await.unwrap();
    let roster = h.participants.in_session(outcome.session).await.unwrap();
    let goblin_row = roster.iter().find(|p| p.combatant == npc(1)).unwrap();
    assert_eq!(goblin_row.posture, Posture::Dodge);

    h.engine.run_session_tick(outcome.session, t(6_000)).await.unwrap();
    let record = h.combatants.load(player(1)).await.unwrap().unwrap();
    assert_eq!(record.pools.pending_fatigue, 2);
    assert_eq!(record.pools.pending_vitality, 2);

    let entries = h.log.for_session(outcome.session).await.unwrap();
    let npc_attacks = entries
        .iter()
        .filter(|e| e.kind == ActionKind::Attack && e.actor == npc(1))
        .count();
    assert_eq!(npc_attacks, 1);
}

#[tokio::test]
async fn cornered_npc_flees_and_ends_the_session() {
    // Mobility AS 6 + 2 beats pursuit AS 0 + 0 outright.
    let dice = ScriptedDice::new().with_fudge([-1, 0, 2, 0]);
    let h = harness(Box::new(dice));
    h.seed(player(1), commoner("Ann"));
    let mut rabbit = CombatantRecord::new(
        "rabbit",
        Attributes::new(5, 7, 5, 5, 5),
        CombatSkills::new(0, 0, 4, 0),
    );
    // 8 of 10 vitality gone: well under the flee threshold.
    rabbit.pools.vitality = 8;
    h.seed(npc(1), rabbit);

    let outcome = h.engine.engage(player(1), npc(1), t(0)).await.unwrap();
    let mut rx = h.bus.subscribe();

    h.engine.run_session_tick(outcome.session, t(3_000)).await.unwrap();

    let session = h.sessions.load(outcome.session).await.unwrap().unwrap();
    assert_eq!(session.state, SessionState::Ended);
    assert_eq!(session.end_reason, Some(EndReason::Flee));

    let roster = h.participants.in_session(outcome.session).await.unwrap();
    let rabbit_row = roster.iter().find(|p| p.combatant == npc(1)).unwrap();
    assert_eq!(rabbit_row.leave_reason, Some(LeaveReason::Flee));

    let entries = h.log.for_session(outcome.session).await.unwrap();
    assert!(entries.iter().any(|e| e.kind == ActionKind::Flee));

    let mut attempted = false;
    let mut fled = false;
    while let Ok(envelope) = rx.try_recv() {
        match envelope.event {
            CombatEvent::FleeAttempted { succeeded, .. } => {
                attempted = true;
                assert!(succeeded);
            }
            CombatEvent::ParticipantFled { .. } => fled = true,
            _ => {}
        }
    }
    assert!(attempted && fled);
}

/// Session repo that fails loads for one poisoned session id.
struct FailingSessionRepo {
    inner: InMemorySessionRepo,
    fail_on: Mutex<Option<SessionId>>,
}

#[async_trait::async_trait]
impl SessionRepository for FailingSessionRepo {
    async fn create(
        &self,
        session: CombatSession,
    ) -> Result<SessionId, RepositoryError> {
        self.inner.create(session).await
    }

    async fn load(&self, id: SessionId) -> Result<Option<CombatSession>, RepositoryError> {
        if *self.fail_on.lock().unwrap() == Some(id) {
            return Err(RepositoryError::Storage("backend offline".into()));
        }
        self.inner.load(id).await
    }

    async fn save(&self, session: &CombatSession) -> Result<u64, RepositoryError> {
        self.inner.save(session).await
    }

    async fn list_active(&self) -> Result<Vec<SessionId>, RepositoryError> {
        self.inner.list_active().await
    }
}

#[tokio::test]
async fn one_broken_session_does_not_stall_the_sweep() {
    let sessions = Arc::new(FailingSessionRepo {
        inner: InMemorySessionRepo::new(),
        fail_on: Mutex::new(None),
    });
    let participants = Arc::new(InMemoryParticipantRepo::new());
    let combatants = Arc::new(InMemoryCombatantRepo::new());
    let log = Arc::new(InMemoryActionLog::new());
    let world = Arc::new(StaticWorld::new());
    let engine = Arc::new(
        CombatEngine::builder()
            .sessions(sessions.clone())
            .participants(participants.clone())
            .combatants(combatants.clone())
            .action_log(log)
            .publisher(Arc::new(EventBus::new()))
            .world(world.clone())
            .dice(Box::new(ScriptedDice::new().with_fudge([-1, 0, -1, 0])))
            .build()
            .unwrap(),
    );

    for (id, name) in [(1, "Ann"), (2, "Bo"), (3, "Cleo"), (4, "Dag")] {
        combatants.insert(player(id), commoner(name));
        world.place(player(id), ARENA);
    }

    let doomed = engine.engage(player(1), player(2), t(0)).await.unwrap();
    let healthy = engine.engage(player(3), player(4), t(0)).await.unwrap();

    let mut record = combatants.load(player(4)).await.unwrap().unwrap();
    record.pools.queue_damage(0, 5, 0);
    combatants.insert(player(4), record);

    *sessions.fail_on.lock().unwrap() = Some(doomed.session);
    let report = engine.tick_all(t(3_000)).await;
    assert_eq!(report.ticked, 1);
    assert_eq!(report.failed, 1);

    // The healthy session still advanced.
    let record = combatants.load(player(4)).await.unwrap().unwrap();
    assert_eq!(record.pools.vitality, 3);
    let active = sessions.list_active().await.unwrap();
    assert!(active.contains(&healthy.session));
}

/// Participant repo whose saves fail with a version conflict while the
/// flag is set; with `once` the flag clears after the first rejection.
struct ConflictingParticipantRepo {
    inner: InMemoryParticipantRepo,
    conflict: AtomicBool,
    once: bool,
}

#[async_trait::async_trait]
impl ParticipantRepository for ConflictingParticipantRepo {
    async fn create(
        &self,
        participant: CombatParticipant,
    ) -> Result<ParticipantId, RepositoryError> {
        self.inner.create(participant).await
    }

    async fn load(
        &self,
        id: ParticipantId,
    ) -> Result<Option<CombatParticipant>, RepositoryError> {
        self.inner.load(id).await
    }

    async fn save(&self, participant: &CombatParticipant) -> Result<u64, RepositoryError> {
        if self.conflict.load(Ordering::SeqCst) {
            if self.once {
                self.conflict.store(false, Ordering::SeqCst);
            }
            return Err(RepositoryError::VersionConflict {
                entity: "participant".into(),
                expected: participant.version,
                stored: participant.version + 1,
            });
        }
        self.inner.save(participant).await
    }

    async fn in_session(
        &self,
        session: SessionId,
    ) -> Result<Vec<CombatParticipant>, RepositoryError> {
        self.inner.in_session(session).await
    }

    async fn active_for(
        &self,
        combatant: CombatantRef,
    ) -> Result<Option<CombatParticipant>, RepositoryError> {
        self.inner.active_for(combatant).await
    }
}

#[tokio::test]
async fn persistent_version_conflict_surfaces_as_transient() {
    let participants = Arc::new(ConflictingParticipantRepo {
        inner: InMemoryParticipantRepo::new(),
        conflict: AtomicBool::new(true),
        once: false,
    });
    let combatants = Arc::new(InMemoryCombatantRepo::new());
    let world = Arc::new(StaticWorld::new());
    let engine = CombatEngine::builder()
        .sessions(Arc::new(InMemorySessionRepo::new()))
        .participants(participants)
        .combatants(combatants.clone())
        .action_log(Arc::new(InMemoryActionLog::new()))
        .publisher(Arc::new(EventBus::new()))
        .world(world.clone())
        .dice(Box::new(ScriptedDice::new().with_fudge([-1, 0, -1, 0])))
        .build()
        .unwrap();

    combatants.insert(player(1), commoner("Ann"));
    combatants.insert(player(2), commoner("Bo"));
    world.place(player(1), ARENA);
    world.place(player(2), ARENA);

    let err = engine.engage(player(1), player(2), t(0)).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Engage(EngageError::Transient)));

    // Nothing was written on either rejected attempt.
    let record = combatants.load(player(2)).await.unwrap().unwrap();
    assert_eq!(record.pools.pending_fatigue, 0);
    assert_eq!(record.pools.pending_vitality, 0);
}

#[tokio::test]
async fn conflicted_save_is_retried_without_doubling_damage() {
    let participants = Arc::new(ConflictingParticipantRepo {
        inner: InMemoryParticipantRepo::new(),
        conflict: AtomicBool::new(true),
        once: true,
    });
    let combatants = Arc::new(InMemoryCombatantRepo::new());
    let log = Arc::new(InMemoryActionLog::new());
    let world = Arc::new(StaticWorld::new());
    // Both the first attempt and the retry roll the same SV 5 torso hit.
    let dice = ScriptedDice::new().with_fudge([2, 0, 2, 0]).with_dies([7, 7]);
    let engine = CombatEngine::builder()
        .sessions(Arc::new(InMemorySessionRepo::new()))
        .participants(participants)
        .combatants(combatants.clone())
        .action_log(log.clone())
        .publisher(Arc::new(EventBus::new()))
        .world(world.clone())
        .dice(Box::new(dice))
        .build()
        .unwrap();

    combatants.insert(player(1), swordsman("Aldric"));
    combatants.insert(player(2), duelist("Torvald"));
    world.place(player(1), ARENA);
    world.place(player(2), ARENA);

    let outcome = engine.engage(player(1), player(2), t(0)).await.unwrap();
    assert!(outcome.result.is_hit());

    // The aborted first attempt left nothing behind: one hit's worth of
    // damage pending, one attack in the log.
    let record = combatants.load(player(2)).await.unwrap().unwrap();
    assert_eq!(record.pools.pending_fatigue, 1);
    assert_eq!(record.pools.pending_vitality, 4);
    let entries = log.for_session(outcome.session).await.unwrap();
    let attacks = entries
        .iter()
        .filter(|e| e.kind == ActionKind::Attack)
        .count();
    assert_eq!(attacks, 1);
}

/// Participant repo whose second create fails outright.
struct FlakyCreateParticipantRepo {
    inner: InMemoryParticipantRepo,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl ParticipantRepository for FlakyCreateParticipantRepo {
    async fn create(
        &self,
        participant: CombatParticipant,
    ) -> Result<ParticipantId, RepositoryError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
            return Err(RepositoryError::Storage("backend offline".into()));
        }
        self.inner.create(participant).await
    }

    async fn load(
        &self,
        id: ParticipantId,
    ) -> Result<Option<CombatParticipant>, RepositoryError> {
        self.inner.load(id).await
    }

    async fn save(&self, participant: &CombatParticipant) -> Result<u64, RepositoryError> {
        self.inner.save(participant).await
    }

    async fn in_session(
        &self,
        session: SessionId,
    ) -> Result<Vec<CombatParticipant>, RepositoryError> {
        self.inner.in_session(session).await
    }

    async fn active_for(
        &self,
        combatant: CombatantRef,
    ) -> Result<Option<CombatParticipant>, RepositoryError> {
        self.inner.active_for(combatant).await
    }
}

#[tokio::test]
async fn failed_session_creation_does_not_strand_combatants() {
    let participants = Arc::new(FlakyCreateParticipantRepo {
        inner: InMemoryParticipantRepo::new(),
        calls: AtomicUsize::new(0),
    });
    let sessions = Arc::new(InMemorySessionRepo::new());
    let combatants = Arc::new(InMemoryCombatantRepo::new());
    let world = Arc::new(StaticWorld::new());
    let engine = CombatEngine::builder()
        .sessions(sessions.clone())
        .participants(participants.clone())
        .combatants(combatants.clone())
        .action_log(Arc::new(InMemoryActionLog::new()))
        .publisher(Arc::new(EventBus::new()))
        .world(world.clone())
        .dice(Box::new(ScriptedDice::new().with_fudge([-1, 0])))
        .build()
        .unwrap();

    combatants.insert(player(1), commoner("Ann"));
    combatants.insert(player(2), commoner("Bo"));
    world.place(player(1), ARENA);
    world.place(player(2), ARENA);

    let err = engine.engage(player(1), player(2), t(0)).await.unwrap_err();
    assert!(matches!(err, RuntimeError::Repository(_)));

    // The half-created fight was torn down: nobody stays enrolled and
    // no active session is left for the scheduler.
    assert!(participants.active_for(player(1)).await.unwrap().is_none());
    assert!(participants.active_for(player(2)).await.unwrap().is_none());
    assert!(sessions.list_active().await.unwrap().is_empty());

    // Both combatants can fight again once the backend recovers.
    let outcome = engine.engage(player(1), player(2), t(1_000)).await.unwrap();
    assert_eq!(sessions.list_active().await.unwrap(), vec![outcome.session]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tick_worker_drains_and_shuts_down_cleanly() {
    let mut tables = combat_core::BalanceTables::default();
    tables.round_interval_ms = 50;
    let dice = ScriptedDice::new().with_fudge([-1, 0]);
    let h = harness_with_tables(Box::new(dice), tables);
    h.seed(player(1), commoner("Ann"));
    h.seed(player(2), commoner("Bo"));

    let outcome = h.engine.engage(player(1), player(2), t(0)).await.unwrap();
    let mut record = h.combatants.load(player(2)).await.unwrap().unwrap();
    record.pools.queue_damage(0, 5, 0);
    h.combatants.insert(player(2), record);

    let worker = TickWorker::spawn(h.engine.clone());
    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    worker.shutdown().await.unwrap();

    // At least one round ran; the drain never exceeds what was queued.
    let record = h.combatants.load(player(2)).await.unwrap().unwrap();
    assert!(record.pools.vitality >= 3);
    assert!(record.pools.vitality <= 5);

    // Nobody died, so the session outlives the worker.
    let session = h.sessions.load(outcome.session).await.unwrap().unwrap();
    assert_eq!(session.state, SessionState::Active);
}
