//! Heart-rate measurement sources.
//!
//! A source hands out one sample per call. Replay sources loop over a
//! recorded file forever; live sources poll a remote API and may fail
//! on any given call.

mod csv;
mod pulsoid;

pub use self::csv::CsvSource;
pub use self::pulsoid::PulsoidSource;

use crate::config::{DataSourceConfig, SourceKind};
use crate::error::Result;

/// One timestamped heart-rate reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Epoch milliseconds.
    pub measured_at: i64,
    /// Beats per minute.
    pub heart_rate: i32,
}

pub trait Source {
    fn fetch_one(&mut self) -> Result<Sample>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn fetch_one(&mut self) -> Result<Sample> {
        (**self).fetch_one()
    }
}

/// Builds the source selected in the config.
pub fn from_config(config: &DataSourceConfig) -> Result<Box<dyn Source>> {
    match config.kind {
        SourceKind::Csv => {
            let source = CsvSource::open(&config.csv.path, config.csv.start_index)?;
            tracing::info!(
                path = %config.csv.path.display(),
                rows = source.len(),
                "replaying heart rate from csv"
            );
            Ok(Box::new(source))
        }
        SourceKind::Pulsoid => {
            let source = PulsoidSource::from_config(&config.pulsoid)?;
            tracing::info!(url = %config.pulsoid.url, "polling heart rate from pulsoid");
            Ok(Box::new(source))
        }
    }
}
