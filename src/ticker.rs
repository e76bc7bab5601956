//! Fixed-period tick driver for the main thread.

use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::solver::{Simulator, SimulatorConfig};

/// Runs a simulator in real time.
///
/// Each tick is followed by a sleep of one full period, so a tick that runs
/// long delays the next one instead of piling up behind it.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    period: Duration,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Ticker matching the simulator's timestep.
    pub fn from_config(config: &SimulatorConfig) -> Result<Self> {
        Ok(Self::new(config.period()?))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick until `on_tick` breaks. Returns the number of ticks run.
    ///
    /// `on_tick` sees the simulator after each tick and may pin or release
    /// nodes before the next one.
    pub fn run<F>(&self, sim: &mut Simulator, mut on_tick: F) -> u64
    where
        F: FnMut(&mut Simulator) -> ControlFlow<()>,
    {
        let mut ticks = 0;
        loop {
            sim.step();
            ticks += 1;
            if on_tick(sim).is_break() {
                break;
            }
            if !self.period.is_zero() {
                thread::sleep(self.period);
            }
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits;

    #[test]
    fn test_runs_until_break() {
        let mut sim = Simulator::new(circuits::load("inverter").unwrap());
        let ticker = Ticker::new(Duration::ZERO);
        let ran = ticker.run(&mut sim, |s| {
            if s.ticks() == 12 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(ran, 12);
        assert_eq!(sim.ticks(), 12);
    }

    #[test]
    fn test_callback_can_drive_nodes() {
        let mut sim = Simulator::new(circuits::load("inverter").unwrap());
        Ticker::new(Duration::ZERO).run(&mut sim, |s| {
            if s.ticks() == 1 {
                s.pin("in", 5.0).unwrap();
            }
            if s.ticks() < 300 {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        });
        assert!(sim.node_voltage("out").unwrap() < 0.5);
    }

    #[test]
    fn test_period_from_config() {
        let config = SimulatorConfig::new().with_timestep_ms(40.0);
        let ticker = Ticker::from_config(&config).unwrap();
        assert!((ticker.period().as_secs_f64() - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_period_is_an_error() {
        let config = SimulatorConfig::new().with_timestep_ms(-5.0);
        assert!(Ticker::from_config(&config).is_err());
    }
}
