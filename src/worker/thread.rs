//! Simulation running on its own thread.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{debug, warn};

use super::engine::WorkerEngine;
use super::protocol::Request;
use crate::error::{Result, SimError};
use crate::solver::SimulatorConfig;

/// Handle to a background simulation thread.
///
/// The thread owns its own circuits; the only link to the caller is a pair
/// of channels carrying JSON text. Requests are applied as they arrive and
/// the active circuit is ticked once per period, each tick posting a
/// snapshot. Dropping the handle stops and joins the thread.
pub struct SimWorker {
    requests: Option<Sender<String>>,
    snapshots: Receiver<String>,
    handle: Option<JoinHandle<()>>,
}

impl SimWorker {
    /// Spawn a worker ticking at the configured timestep.
    pub fn spawn(config: SimulatorConfig) -> Result<Self> {
        let period = config.period()?;
        let engine = WorkerEngine::new(config)?;
        let (request_tx, request_rx) = unbounded();
        let (snapshot_tx, snapshot_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("mosfet-sim-worker".to_string())
            .spawn(move || run_worker(engine, period, request_rx, snapshot_tx))
            .map_err(SimError::WorkerSpawn)?;

        debug!("spawned simulation worker, period {:?}", period);
        Ok(Self {
            requests: Some(request_tx),
            snapshots: snapshot_rx,
            handle: Some(handle),
        })
    }

    /// Send a request.
    pub fn post(&self, request: &Request) -> Result<()> {
        self.post_raw(request.encode()?)
    }

    /// Send an already encoded request.
    pub fn post_raw(&self, text: impl Into<String>) -> Result<()> {
        let sender = self.requests.as_ref().ok_or(SimError::WorkerDisconnected)?;
        sender
            .send(text.into())
            .map_err(|_| SimError::WorkerDisconnected)
    }

    /// Next pending snapshot, if any.
    pub fn try_recv(&self) -> Result<Option<String>> {
        match self.snapshots.try_recv() {
            Ok(text) => Ok(Some(text)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(SimError::WorkerDisconnected),
        }
    }

    /// Wait up to `timeout` for the next snapshot.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<String>> {
        match self.snapshots.recv_timeout(timeout) {
            Ok(text) => Ok(Some(text)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(SimError::WorkerDisconnected),
        }
    }
}

impl Drop for SimWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("simulation worker panicked");
            }
        }
    }
}

fn run_worker(
    mut engine: WorkerEngine,
    period: Duration,
    requests: Receiver<String>,
    snapshots: Sender<String>,
) {
    let mut next_tick = Instant::now() + period;
    loop {
        match requests.recv_deadline(next_tick) {
            Ok(text) => {
                if let Err(e) = engine.handle_message(&text) {
                    warn!("worker rejected message: {}", e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        // A busy request queue must not hold back a due tick.
        if Instant::now() < next_tick {
            continue;
        }
        if let Some(snapshot) = engine.tick_active() {
            match snapshot.encode() {
                Ok(text) => {
                    if snapshots.send(text).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("failed to encode snapshot: {}", e),
            }
        }
        // Next tick is scheduled only once this one is done.
        next_tick = Instant::now() + period;
    }
    debug!("simulation worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::protocol::{DriveState, FeatureFlags, VoltageSnapshot};
    use std::sync::atomic::{AtomicBool, Ordering};

    const WAIT: Duration = Duration::from_secs(5);

    fn fast_worker() -> SimWorker {
        SimWorker::spawn(SimulatorConfig::new().with_timestep_ms(1.0)).unwrap()
    }

    #[test]
    fn test_idle_worker_posts_nothing() {
        let worker = fast_worker();
        assert_eq!(
            worker.recv_timeout(Duration::from_millis(30)).unwrap(),
            None
        );
    }

    #[test]
    fn test_request_starts_snapshots() {
        let worker = fast_worker();
        worker
            .post(&Request::new(
                "nmos",
                DriveState::new().with_pin("gate", 4.0),
                FeatureFlags::default(),
            ))
            .unwrap();

        let text = worker.recv_timeout(WAIT).unwrap().unwrap();
        let snapshot = VoltageSnapshot::decode(&text).unwrap();
        assert_eq!(snapshot.circuit, "nmos");
        assert_eq!(snapshot.voltages["gate"], 4.0);
    }

    #[test]
    fn test_bad_request_does_not_stop_worker() {
        let worker = fast_worker();
        worker.post_raw("garbage").unwrap();
        worker
            .post_raw(r#"["inverter", {"pinned": {}}, {}]"#)
            .unwrap();
        let text = worker.recv_timeout(WAIT).unwrap().unwrap();
        assert!(text.contains("\"inverter\""));
    }

    #[test]
    fn test_invalid_config_rejected() {
        for dt in [-1.0, 0.0, f64::NAN, 1e300] {
            assert!(matches!(
                SimWorker::spawn(SimulatorConfig::new().with_timestep_ms(dt)),
                Err(SimError::InvalidSimulationParam { .. })
            ));
        }
    }

    #[test]
    fn test_ticks_continue_under_request_flood() {
        let worker = fast_worker();
        let request = Request::new(
            "inverter",
            DriveState::new().with_pin("in", 5.0),
            FeatureFlags::default(),
        );
        worker.post(&request).unwrap();

        let done = AtomicBool::new(false);
        let received = thread::scope(|scope| {
            scope.spawn(|| {
                let stop = Instant::now() + WAIT;
                while !done.load(Ordering::Relaxed) && Instant::now() < stop {
                    if worker.post(&request).is_err() {
                        break;
                    }
                }
            });
            let received = worker.recv_timeout(Duration::from_secs(2)).unwrap();
            done.store(true, Ordering::Relaxed);
            received
        });

        let snapshot = VoltageSnapshot::decode(&received.unwrap()).unwrap();
        assert_eq!(snapshot.circuit, "inverter");
    }
}
