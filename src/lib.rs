//! Heart rate to MIDI CC bridge.
//!
//! Samples flow from a [`source::Source`] through a sliding-window
//! [`processor::HeartRateProcessor`], get mapped onto a controller value
//! and are sent to a [`midi::Sink`] by the [`dispatch::Dispatcher`].

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod midi;
pub mod processor;
pub mod source;

pub use config::Config;
pub use dispatch::{DispatchSettings, DispatchStats, Dispatcher, StepOutcome};
pub use error::{PulseError, Result};
pub use mapper::map_to_cc;
pub use processor::HeartRateProcessor;
pub use source::{Sample, Source};
