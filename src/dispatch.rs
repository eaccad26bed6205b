use crate::config::Config;
use crate::constants::TRIGGER_CC_VALUE;
use crate::mapper::map_to_cc;
use crate::midi::Sink;
use crate::processor::HeartRateProcessor;
use crate::source::{Sample, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

// 睡眠期间检查退出标志的间隔
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// MIDI routing and cadence for the dispatch loop. Channel is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub channel: u8,
    pub tempo_cc: u8,
    pub rapid_growth_cc: u8,
    pub decrease_cc: Option<u8>,
    pub min_tempo: i32,
    pub interval: Duration,
}

impl From<&Config> for DispatchSettings {
    fn from(config: &Config) -> Self {
        DispatchSettings {
            channel: config.midi.channel,
            tempo_cc: config.midi.tempo_change_cc,
            rapid_growth_cc: config.midi.rapid_growth_cc,
            decrease_cc: config.midi.decrease_cc,
            min_tempo: config.midi.min_tempo,
            interval: config.dispatch.interval(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub iterations: u64,
    pub fetch_errors: u64,
    pub send_errors: u64,
    pub rapid_growth_triggers: u64,
    pub decrease_triggers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Sent {
        sample: Sample,
        smoothed: i32,
        tempo_value: u8,
    },
    FetchFailed,
}

/// Drives source -> processor -> mapper -> sink.
pub struct Dispatcher<S, K> {
    source: S,
    sink: K,
    processor: HeartRateProcessor,
    settings: DispatchSettings,
    stats: DispatchStats,
}

impl<S: Source, K: Sink> Dispatcher<S, K> {
    pub fn new(
        source: S,
        sink: K,
        processor: HeartRateProcessor,
        settings: DispatchSettings,
    ) -> Self {
        Dispatcher {
            source,
            sink,
            processor,
            settings,
            stats: DispatchStats::default(),
        }
    }

    /// One iteration without the cadence wait.
    pub fn step(&mut self) -> StepOutcome {
        self.stats.iterations += 1;

        // 1. 取一个心率样本，失败只记录，下一拍重试
        let sample = match self.source.fetch_one() {
            Ok(sample) => sample,
            Err(e) => {
                self.stats.fetch_errors += 1;
                tracing::warn!(error = %e, "fetching heart rate failed");
                return StepOutcome::FetchFailed;
            }
        };

        // 2. 平滑
        let smoothed = self.processor.add_value(sample.heart_rate);
        tracing::info!(
            measured_at = sample.measured_at,
            heart_rate = sample.heart_rate,
            smoothed,
            "heart rate"
        );

        // 3. 趋势触发，先于常规 tempo 消息发送
        if self.processor.has_rapid_growth() {
            self.stats.rapid_growth_triggers += 1;
            tracing::info!(smoothed, "rapid growth");
            self.send(self.settings.rapid_growth_cc, TRIGGER_CC_VALUE);
        }
        if let Some(cc) = self.settings.decrease_cc {
            if self.processor.has_decrease() {
                self.stats.decrease_triggers += 1;
                tracing::info!(smoothed, "decrease");
                self.send(cc, TRIGGER_CC_VALUE);
            }
        }

        // 4. tempo
        let tempo_value = map_to_cc(smoothed, self.settings.min_tempo);
        self.send(self.settings.tempo_cc, tempo_value);

        StepOutcome::Sent {
            sample,
            smoothed,
            tempo_value,
        }
    }

    /// Loops until `shutdown` is set, sleeping one interval after every
    /// iteration. Never returns on its own otherwise.
    pub fn run(&mut self, shutdown: &AtomicBool) -> DispatchStats {
        let interval = self.settings.interval;
        tracing::info!(interval_ms = interval.as_millis() as u64, "dispatch loop started");

        while !shutdown.load(Ordering::SeqCst) {
            self.step();
            sleep_unless_shutdown(interval, shutdown);
        }

        tracing::info!(
            iterations = self.stats.iterations,
            fetch_errors = self.stats.fetch_errors,
            send_errors = self.stats.send_errors,
            rapid_growth = self.stats.rapid_growth_triggers,
            decrease = self.stats.decrease_triggers,
            "dispatch loop stopped"
        );
        self.stats
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn processor(&self) -> &HeartRateProcessor {
        &self.processor
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    fn send(&mut self, controller: u8, value: u8) {
        let channel = self.settings.channel;
        match self.sink.send_cc(channel, controller, value) {
            Ok(()) => tracing::debug!(channel, controller, value, "midi cc sent"),
            Err(e) => {
                self.stats.send_errors += 1;
                tracing::warn!(error = %e, controller, value, "sending midi cc failed");
            }
        }
    }
}

fn sleep_unless_shutdown(interval: Duration, shutdown: &AtomicBool) {
    let start = Instant::now();
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return;
        }
        let remaining = match interval.checked_sub(start.elapsed()) {
            Some(d) if !d.is_zero() => d,
            _ => return,
        };
        thread::sleep(remaining.min(SHUTDOWN_POLL));
    }
}
