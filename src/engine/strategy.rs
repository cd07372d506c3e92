//! Strategy contract for the replay loop.

use crate::domain::BarSet;

/// Boxed error a strategy may return; the run loop carries it to the caller
/// untouched.
pub type StrategyError = Box<dyn std::error::Error + Send + Sync>;

/// Flow-control signal returned by a strategy callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Keep replaying.
    Continue,
    /// Halt the run; no further bar sets are delivered.
    Stop,
}

/// A bar-set consumer driven by the replay loop.
///
/// `on_bars` is invoked exactly once per distinct date in the merged stream,
/// in ascending order, synchronously; each invocation completes before the
/// next bar set is produced.
pub trait Strategy {
    fn on_bars(&mut self, bars: &BarSet) -> Result<Signal, StrategyError>;
}
