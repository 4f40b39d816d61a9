//! Simulation utilities and program loading.
//!
//! Provides the program loader and the `Simulator` driver that owns a
//! pipeline core together with its configuration.

/// Program image loading (raw binaries and hex word listings).
pub mod loader;

/// Top-level simulation driver.
pub mod simulator;

pub use loader::{LoadError, load_binary};
pub use simulator::{RunOutcome, SimError, Simulator};
