//! Round scheduler: the periodic worker that advances every session.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};

use combat_core::Timestamp;

use crate::engine::CombatEngine;
use crate::error::{Result, RuntimeError};

/// Current wall time as a combat timestamp (milliseconds since epoch).
pub fn wall_clock() -> Timestamp {
    Timestamp::new(chrono::Utc::now().timestamp_millis())
}

/// Handle to the running round loop.
///
/// The worker fires [`CombatEngine::tick_all`] once per configured round
/// interval. A missed deadline (a slow sweep) delays the next round rather
/// than bunching rounds together. Shutdown is graceful: the in-flight sweep
/// always runs to completion before the task exits.
pub struct TickWorker {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl TickWorker {
    /// Spawn the round loop at the engine's configured interval.
    pub fn spawn(engine: Arc<CombatEngine>) -> Self {
        let interval_ms = engine.tables().round_interval_ms.max(1);
        let (shutdown, mut stop) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(Duration::from_millis(interval_ms));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick fires immediately; swallow it so the
            // opening round lands one full interval after spawn.
            ticker.tick().await;

            tracing::info!(
                target: "runtime::scheduler",
                interval_ms,
                "round scheduler started"
            );
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // The sweep runs inside the selected arm, so a
                        // shutdown signal cannot cancel it mid-round.
                        let report = engine.tick_all(wall_clock()).await;
                        if report.failed > 0 {
                            tracing::warn!(
                                target: "runtime::scheduler",
                                ticked = report.ticked,
                                failed = report.failed,
                                "round sweep finished with failures"
                            );
                        } else {
                            tracing::trace!(
                                target: "runtime::scheduler",
                                ticked = report.ticked,
                                "round sweep finished"
                            );
                        }
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!(target: "runtime::scheduler", "round scheduler stopped");
        });

        Self { handle, shutdown }
    }

    /// Signal the worker to stop and wait for it to drain.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.handle.await.map_err(RuntimeError::WorkerJoin)
    }
}
