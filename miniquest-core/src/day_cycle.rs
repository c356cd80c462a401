//! In-game clock: hours since dawn, dusk and night, exhaustion.

use crate::messages::MessageLog;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_EXHAUSTION_HOUR: u32 = 12;
pub const DEFAULT_NIGHT_START_HOUR: u32 = 8;
pub const DEFAULT_NIGHT_MODIFIER: f64 = 2.0;

/// Hour counter for the current day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCycle {
    /// Hours elapsed since dawn.
    pub hour: u32,
    pub exhaustion_hour: u32,
    pub night_start_hour: u32,
    pub night_modifier: f64,
    #[serde(default)]
    night_announced: bool,
    #[serde(default)]
    dusk_announced: bool,
    #[serde(default)]
    exhausted: bool,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXHAUSTION_HOUR,
            DEFAULT_NIGHT_START_HOUR,
            DEFAULT_NIGHT_MODIFIER,
        )
    }
}

impl DayCycle {
    pub fn new(exhaustion_hour: u32, night_start_hour: u32, night_modifier: f64) -> Self {
        Self {
            hour: 0,
            exhaustion_hour: exhaustion_hour.max(1),
            night_start_hour,
            night_modifier,
            night_announced: false,
            dusk_announced: false,
            exhausted: false,
        }
    }

    /// Advance the clock by `hours`.
    ///
    /// Returns `true` the first time the exhaustion hour is reached in a
    /// day; the caller must then end the day. Dusk and night are announced
    /// once per day each.
    pub fn increment_hour(&mut self, hours: u32, log: &mut MessageLog) -> bool {
        self.hour = self.hour.saturating_add(hours);
        debug!(hour = self.hour, "clock advanced");

        if self.hour >= self.exhaustion_hour {
            if self.exhausted {
                return false;
            }
            self.exhausted = true;
            log.push("Exhaustion takes you.");
            return true;
        }

        if self.hour >= self.night_start_hour {
            if !self.night_announced {
                log.push("Night has fallen.");
                self.night_announced = true;
                self.dusk_announced = true;
            }
        } else if self.hour + 1 >= self.night_start_hour && !self.dusk_announced {
            log.push("Dusk is upon you.");
            self.dusk_announced = true;
        }
        false
    }

    pub fn is_night(&self) -> bool {
        self.hour >= self.night_start_hour
    }

    /// Start a new day at hour zero.
    pub fn reset_day(&mut self, log: &mut MessageLog) {
        self.hour = 0;
        self.night_announced = false;
        self.dusk_announced = false;
        self.exhausted = false;
        log.push("A new dawn breaks.");
    }

    /// Stat multiplier for enemies spawned now.
    pub fn get_enemy_night_modifier(&self) -> f64 {
        if self.is_night() {
            self.night_modifier
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dusk_then_night_announced_once() {
        let mut day = DayCycle::default();
        let mut log = MessageLog::default();
        for _ in 0..6 {
            assert!(!day.increment_hour(1, &mut log));
        }
        assert!(log.is_empty());
        assert!(!day.is_night());

        day.increment_hour(1, &mut log);
        assert_eq!(log.drain(), vec!["Dusk is upon you."]);
        assert!(!day.is_night());

        day.increment_hour(1, &mut log);
        assert_eq!(log.drain(), vec!["Night has fallen."]);
        assert!(day.is_night());
        assert_eq!(day.get_enemy_night_modifier(), 2.0);

        day.increment_hour(1, &mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_exhaustion_fires_once() {
        let mut day = DayCycle::default();
        let mut log = MessageLog::default();
        let fired: usize = (0..15)
            .filter(|_| day.increment_hour(1, &mut log))
            .count();
        assert_eq!(fired, 1);
        assert!(log.contains("Exhaustion takes you."));
    }

    #[test]
    fn test_jump_straight_to_night_skips_dusk() {
        let mut day = DayCycle::default();
        let mut log = MessageLog::default();
        day.increment_hour(9, &mut log);
        assert_eq!(log.drain(), vec!["Night has fallen."]);
    }

    #[test]
    fn test_reset_day() {
        let mut day = DayCycle::default();
        let mut log = MessageLog::default();
        day.increment_hour(12, &mut log);
        day.reset_day(&mut log);
        assert_eq!(day.hour, 0);
        assert_eq!(day.get_enemy_night_modifier(), 1.0);
        assert!(log.contains("A new dawn breaks."));
        assert!(day.increment_hour(12, &mut log));
    }
}
