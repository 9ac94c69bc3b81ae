//! Fixed-cadence ATB ticker.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use super::Command;

/// Background task that fires gauge advances at a fixed cadence.
///
/// The ticker never touches state: each fire is a [`Command::Tick`] on the
/// worker queue, keeping the single-mutator discipline intact. Gauges keep
/// advancing while the decision layer waits on a human, which is the one
/// genuine concurrency requirement of the engine.
pub struct TickerWorker {
    command_tx: mpsc::Sender<Command>,
    interval: Duration,
    dt: u32,
}

impl TickerWorker {
    pub fn new(command_tx: mpsc::Sender<Command>, tick_hz: u32, dt: u32) -> Self {
        let tick_hz = tick_hz.max(1);
        Self {
            command_tx,
            interval: Duration::from_micros(1_000_000 / u64::from(tick_hz)),
            dt,
        }
    }

    /// Main ticker loop. Exits when the worker's command queue closes.
    pub async fn run(self) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if self
                .command_tx
                .send(Command::Tick { dt: self.dt })
                .await
                .is_err()
            {
                tracing::debug!(target: "runtime::ticker", "command channel closed, ticker stopping");
                break;
            }
        }
    }
}
