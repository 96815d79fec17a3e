//! Interrupt timing profile.
//!
//! The audio callback samples a free-running period counter (on the RP2040,
//! the PWM slice counter) when it starts and when it finishes. The entry value
//! shows how late the callback started within its period; the difference is
//! the processing time. Both are kept as "last" and "worst seen" for the
//! lifetime of the process.

use core::sync::atomic::{AtomicU32, Ordering};

/// A counter that runs once per sample period.
///
/// Implementations return the current count; wrap-around at the end of the
/// period is expected and handled with wrapping subtraction.
pub trait PeriodCounter {
    /// Current counter value.
    fn ticks(&self) -> u32;
}

impl<F: Fn() -> u32> PeriodCounter for F {
    fn ticks(&self) -> u32 {
        self()
    }
}

/// Last and worst entry/processing times, written by the audio context only.
#[derive(Debug)]
pub struct TimingProfile {
    entry: AtomicU32,
    max_entry: AtomicU32,
    processing: AtomicU32,
    max_processing: AtomicU32,
}

/// Plain copy of a [`TimingProfile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingSnapshot {
    /// Counter value at the most recent callback entry.
    pub entry: u32,
    /// Largest entry value seen.
    pub max_entry: u32,
    /// Duration of the most recent callback in counter ticks.
    pub processing: u32,
    /// Largest duration seen.
    pub max_processing: u32,
}

impl TimingProfile {
    /// Profile with every field at zero.
    pub const fn new() -> Self {
        Self {
            entry: AtomicU32::new(0),
            max_entry: AtomicU32::new(0),
            processing: AtomicU32::new(0),
            max_processing: AtomicU32::new(0),
        }
    }

    /// Record one callback from its entry and exit counter values.
    ///
    /// Single writer: the running maximum is a load and a store, not a
    /// read-modify-write, so this also works on cores without CAS.
    pub fn record(&self, entry: u32, exit: u32) {
        let processing = exit.wrapping_sub(entry);
        self.entry.store(entry, Ordering::Relaxed);
        self.processing.store(processing, Ordering::Relaxed);
        if entry > self.max_entry.load(Ordering::Relaxed) {
            self.max_entry.store(entry, Ordering::Relaxed);
        }
        if processing > self.max_processing.load(Ordering::Relaxed) {
            self.max_processing.store(processing, Ordering::Relaxed);
        }
    }

    /// Read all four fields. Fields are read independently.
    pub fn snapshot(&self) -> TimingSnapshot {
        TimingSnapshot {
            entry: self.entry.load(Ordering::Relaxed),
            max_entry: self.max_entry.load(Ordering::Relaxed),
            processing: self.processing.load(Ordering::Relaxed),
            max_processing: self.max_processing.load(Ordering::Relaxed),
        }
    }
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_and_worst() {
        let profile = TimingProfile::new();
        profile.record(10, 110);
        profile.record(30, 80);
        profile.record(5, 300);
        let snap = profile.snapshot();
        assert_eq!(snap.entry, 5);
        assert_eq!(snap.max_entry, 30);
        assert_eq!(snap.processing, 295);
        assert_eq!(snap.max_processing, 295);

        profile.record(1, 2);
        let snap = profile.snapshot();
        assert_eq!(snap.processing, 1);
        assert_eq!(snap.max_processing, 295);
    }

    #[test]
    fn processing_time_survives_counter_wrap() {
        let profile = TimingProfile::new();
        profile.record(u32::MAX - 9, 10);
        assert_eq!(profile.snapshot().processing, 20);
    }

    #[test]
    fn closures_are_period_counters() {
        let counter = || 42;
        assert_eq!(counter.ticks(), 42);
    }
}
