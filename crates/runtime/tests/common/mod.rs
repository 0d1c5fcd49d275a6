//! Shared wiring for runtime integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use combat_core::{
    Attributes, BalanceTables, CharacterId, CombatSkills, CombatantRecord, CombatantRef,
    DamageType, DiceOracle, NpcInstanceId, RoomId, Timestamp, Weapon,
};
use runtime::{
    CombatEngine, EventBus, InMemoryActionLog, InMemoryCombatantRepo, InMemoryParticipantRepo,
    InMemorySessionRepo, StaticWorld,
};

pub use runtime::{
    ActionLogRepository, CombatantRepository, ParticipantRepository, SessionRepository,
};

pub const ARENA: RoomId = RoomId(42);

pub struct Harness {
    pub engine: Arc<CombatEngine>,
    pub sessions: Arc<InMemorySessionRepo>,
    pub participants: Arc<InMemoryParticipantRepo>,
    pub combatants: Arc<InMemoryCombatantRepo>,
    pub log: Arc<InMemoryActionLog>,
    pub bus: Arc<EventBus>,
    pub world: Arc<StaticWorld>,
}

pub fn harness(dice: Box<dyn DiceOracle>) -> Harness {
    harness_with_tables(dice, BalanceTables::default())
}

/// Route tracing output through the test harness, once per process.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn harness_with_tables(dice: Box<dyn DiceOracle>, tables: BalanceTables) -> Harness {
    init_tracing();
    let sessions = Arc::new(InMemorySessionRepo::new());
    let participants = Arc::new(InMemoryParticipantRepo::new());
    let combatants = Arc::new(InMemoryCombatantRepo::new());
    let log = Arc::new(InMemoryActionLog::new());
    let bus = Arc::new(EventBus::new());
    let world = Arc::new(StaticWorld::new());

    let engine = CombatEngine::builder()
        .sessions(sessions.clone())
        .participants(participants.clone())
        .combatants(combatants.clone())
        .action_log(log.clone())
        .publisher(bus.clone())
        .world(world.clone())
        .tables(tables)
        .dice(dice)
        .build()
        .expect("engine wiring");

    Harness {
        engine: Arc::new(engine),
        sessions,
        participants,
        combatants,
        log,
        bus,
        world,
    }
}

impl Harness {
    /// Seed a record and place the combatant in the arena.
    pub fn seed(&self, combatant: CombatantRef, record: CombatantRecord) {
        self.combatants.insert(combatant, record);
        self.world.place(combatant, ARENA);
    }
}

pub fn player(id: u64) -> CombatantRef {
    CombatantRef::Player(CharacterId(id))
}

pub fn npc(id: u64) -> CombatantRef {
    CombatantRef::Npc(NpcInstanceId(id))
}

pub fn t(millis: i64) -> Timestamp {
    Timestamp::new(millis)
}

/// Weapon AS 8: strength 8 with skill 5.
pub fn swordsman(name: &str) -> CombatantRecord {
    CombatantRecord::new(
        name,
        Attributes::new(8, 5, 6, 5, 5),
        CombatSkills::new(5, 0, 0, 0),
    )
    .with_weapon(Weapon::new("sword", DamageType::Cut))
}

/// Defense AS 5: agility 6 with skill 4, no armor.
pub fn duelist(name: &str) -> CombatantRecord {
    CombatantRecord::new(
        name,
        Attributes::new(6, 6, 6, 5, 5),
        CombatSkills::new(0, 4, 0, 0),
    )
}

/// Baseline combatant: every ability score 0, bare fists.
pub fn commoner(name: &str) -> CombatantRecord {
    CombatantRecord::new(name, Attributes::default(), CombatSkills::default())
}
