//! # Stepper Tick Pacing
//!
//! Fixed-rate pacing with an idle throttle.
//!
//! ## Design
//!
//! ```text
//! input seen ──► Active: 1000/120 ms per tick
//!                   │ no input for 3 s
//!                   ▼
//!                 Idle: 1000 ms per tick ──► input / Wake ──► Active
//! ```
//!
//! The step length handed to the engine is the measured time since the
//! previous tick, not the nominal interval. The engine clamps it.

use std::time::{Duration, Instant};

/// Pacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerSettings {
    /// Active tick rate.
    pub tick_rate_hz: u32,
    /// Quiet period after which the pacer throttles.
    pub idle_after: Duration,
    /// Tick interval while throttled.
    pub idle_interval: Duration,
}

impl Default for PacerSettings {
    fn default() -> Self {
        Self {
            tick_rate_hz: 120,
            idle_after: Duration::from_millis(3_000),
            idle_interval: Duration::from_millis(1_000),
        }
    }
}

impl PacerSettings {
    /// Nominal active interval.
    #[must_use]
    pub fn active_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate_hz.max(1)))
    }
}

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Minimum tick duration observed.
    pub min_tick_us: u64,
    /// Maximum tick duration observed.
    pub max_tick_us: u64,
    /// Average tick duration (rolling).
    pub avg_tick_us: u64,
    /// Number of late ticks (took longer than the active interval).
    pub late_ticks: u64,
    /// Total ticks measured.
    pub total_ticks: u64,
    /// Ticks executed while throttled.
    pub idle_ticks: u64,
}

impl Default for TickStats {
    fn default() -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: 0,
            late_ticks: 0,
            total_ticks: 0,
            idle_ticks: 0,
        }
    }
}

/// Paces the stepper and tracks idleness.
#[derive(Debug, Clone)]
pub struct TickPacer {
    settings: PacerSettings,
    active_interval: Duration,
    last_tick: Instant,
    last_input: Instant,
    idle: bool,
    tick_count: u64,
    stats: TickStats,
}

impl TickPacer {
    /// Creates an active pacer whose clocks start at `now`.
    #[must_use]
    pub fn new(settings: PacerSettings, now: Instant) -> Self {
        Self {
            settings,
            active_interval: settings.active_interval(),
            last_tick: now,
            last_input: now,
            idle: false,
            tick_count: 0,
            stats: TickStats::default(),
        }
    }

    /// Records user input. The next [`update_idle`](Self::update_idle)
    /// reports the flip back to active.
    pub fn note_input(&mut self, now: Instant) {
        self.last_input = now;
    }

    /// Re-evaluates the idle throttle. Returns true if the state flipped.
    pub fn update_idle(&mut self, now: Instant) -> bool {
        let idle = now.saturating_duration_since(self.last_input) >= self.settings.idle_after;
        let changed = idle != self.idle;
        self.idle = idle;
        changed
    }

    /// Marks the start of a tick; returns seconds since the previous one.
    pub fn begin_tick(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.tick_count += 1;
        elapsed.as_secs_f64()
    }

    /// Marks the end of a tick. Returns `(duration_us, late)`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn end_tick(&mut self, start: Instant, now: Instant) -> (u32, bool) {
        let duration = now.saturating_duration_since(start);
        let duration_us = duration.as_micros() as u64;

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);
        self.stats.avg_tick_us = if self.stats.total_ticks == 1 {
            duration_us
        } else {
            (self.stats.avg_tick_us * 15 + duration_us) / 16
        };

        let late = duration > self.active_interval;
        if late {
            self.stats.late_ticks += 1;
        }
        if self.idle {
            self.stats.idle_ticks += 1;
        }
        (u32::try_from(duration_us).unwrap_or(u32::MAX), late)
    }

    /// Current tick interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        if self.idle {
            self.settings.idle_interval
        } else {
            self.active_interval
        }
    }

    /// Time left until the next tick is due.
    #[must_use]
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.interval()
            .saturating_sub(now.saturating_duration_since(self.last_tick))
    }

    /// True while throttled.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.idle
    }

    /// Ticks begun.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Pacing parameters.
    #[must_use]
    pub const fn settings(&self) -> &PacerSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacer_creation() {
        let pacer = TickPacer::new(PacerSettings::default(), Instant::now());
        assert_eq!(pacer.tick_count(), 0);
        assert_eq!(pacer.interval(), Duration::from_micros(8_333));
        assert!(!pacer.is_idle());
    }

    #[test]
    fn test_idle_throttle_after_quiet_period() {
        let t0 = Instant::now();
        let mut pacer = TickPacer::new(PacerSettings::default(), t0);

        assert!(!pacer.update_idle(t0 + Duration::from_millis(2_999)));
        assert!(pacer.update_idle(t0 + Duration::from_millis(3_000)));
        assert!(pacer.is_idle());
        assert_eq!(pacer.interval(), Duration::from_millis(1_000));

        pacer.note_input(t0 + Duration::from_millis(3_500));
        assert!(pacer.update_idle(t0 + Duration::from_millis(3_600)));
        assert!(!pacer.is_idle());
        assert!(!pacer.update_idle(t0 + Duration::from_millis(3_700)));
    }

    #[test]
    fn test_input_after_idle_reports_flip() {
        let t0 = Instant::now();
        let mut pacer = TickPacer::new(PacerSettings::default(), t0);
        assert!(pacer.update_idle(t0 + Duration::from_millis(4_000)));
        assert!(pacer.is_idle());

        pacer.note_input(t0 + Duration::from_millis(4_100));
        assert!(pacer.update_idle(t0 + Duration::from_millis(4_110)));
        assert!(!pacer.is_idle());
        assert_eq!(pacer.interval(), Duration::from_micros(8_333));

        // Second idle period flips again.
        assert!(pacer.update_idle(t0 + Duration::from_millis(7_100)));
        assert!(pacer.is_idle());
    }

    #[test]
    fn test_begin_tick_measures_elapsed() {
        let t0 = Instant::now();
        let mut pacer = TickPacer::new(PacerSettings::default(), t0);
        let dt = pacer.begin_tick(t0 + Duration::from_millis(10));
        assert!((dt - 0.010).abs() < 1e-9);
        let dt = pacer.begin_tick(t0 + Duration::from_millis(15));
        assert!((dt - 0.005).abs() < 1e-9);
        assert_eq!(pacer.tick_count(), 2);
    }

    #[test]
    fn test_late_tick_counted() {
        let t0 = Instant::now();
        let mut pacer = TickPacer::new(PacerSettings::default(), t0);
        let (us, late) = pacer.end_tick(t0, t0 + Duration::from_millis(1));
        assert_eq!(us, 1_000);
        assert!(!late);
        let (_, late) = pacer.end_tick(t0, t0 + Duration::from_millis(20));
        assert!(late);
        assert_eq!(pacer.stats().late_ticks, 1);
        assert_eq!(pacer.stats().min_tick_us, 1_000);
        assert_eq!(pacer.stats().max_tick_us, 20_000);
    }

    #[test]
    fn test_time_until_next() {
        let t0 = Instant::now();
        let mut pacer = TickPacer::new(PacerSettings::default(), t0);
        let _ = pacer.begin_tick(t0);
        assert_eq!(pacer.time_until_next(t0 + Duration::from_micros(3_333)), Duration::from_micros(5_000));
        assert_eq!(pacer.time_until_next(t0 + Duration::from_millis(50)), Duration::ZERO);
    }
}
