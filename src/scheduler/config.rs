use std::time::Duration;

use crate::emulator::timers::TIMER_HZ;

pub const DEFAULT_INSTRUCTIONS_PER_SECOND: u32 = 700;
/// Faster rates are clamped to this, so every instruction period is at least a microsecond.
pub const MAX_INSTRUCTIONS_PER_SECOND: u32 = 1_000_000;

/// Settings for an `EmulationCore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Instruction rate. Zero is treated as one, and anything above
    /// `MAX_INSTRUCTIONS_PER_SECOND` as that maximum.
    pub instructions_per_second: u32,
    /// Seed for `CXNN`. A fresh random seed is drawn for every run when unset.
    pub rng_seed: Option<u64>,
}

impl Config {
    /// The rate actually used, after clamping.
    pub fn effective_rate(&self) -> u32 {
        self.instructions_per_second
            .max(1)
            .min(MAX_INSTRUCTIONS_PER_SECOND)
    }

    pub fn instruction_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.effective_rate() as u64)
    }

    pub fn timer_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / TIMER_HZ as u64)
    }

    pub(crate) fn seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(rand::random)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            rng_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods() {
        let config = Config {
            instructions_per_second: 1000,
            rng_seed: None,
        };
        assert_eq!(config.instruction_period(), Duration::from_millis(1));
        assert_eq!(config.timer_period(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn zero_rate_is_clamped() {
        let config = Config {
            instructions_per_second: 0,
            ..Config::default()
        };
        assert_eq!(config.instruction_period(), Duration::from_secs(1));
    }

    #[test]
    fn huge_rate_is_clamped() {
        for rate in &[MAX_INSTRUCTIONS_PER_SECOND + 1, 1_000_000_001, u32::MAX] {
            let config = Config {
                instructions_per_second: *rate,
                ..Config::default()
            };
            assert_eq!(config.effective_rate(), MAX_INSTRUCTIONS_PER_SECOND);
            assert_eq!(config.instruction_period(), Duration::from_micros(1));
        }
    }

    #[test]
    fn fixed_seed_is_used() {
        let config = Config {
            rng_seed: Some(9),
            ..Config::default()
        };
        assert_eq!(config.seed(), 9);
    }
}
