//! Hour-of-day and weather shared by every organism.

use rand::seq::SliceRandom;
use rand::Rng;
use savanna_core::Weather;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tracks the hour of day and the weather.
///
/// One tick is one hour. Weather only changes when the hour wraps past 23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentClock {
    hour: u8,
    weather: Weather,
}

impl EnvironmentClock {
    pub const HOURS_PER_DAY: u8 = 24;

    /// Midnight, clear skies.
    pub fn new() -> Self {
        Self {
            hour: 0,
            weather: Weather::Clear,
        }
    }

    /// A clock set to a given hour and weather. Hours past 23 wrap.
    pub fn at(hour: u8, weather: Weather) -> Self {
        Self {
            hour: hour % Self::HOURS_PER_DAY,
            weather,
        }
    }

    /// Advance one hour, drawing fresh weather at the start of each day.
    pub fn advance<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.hour += 1;
        if self.hour >= Self::HOURS_PER_DAY {
            self.hour = 0;
            if let Some(weather) = Weather::ALL.choose(rng) {
                self.weather = *weather;
            }
            debug!(weather = %self.weather, "New day");
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn weather(&self) -> Weather {
        self.weather
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for EnvironmentClock {
    fn default() -> Self {
        Self::new()
    }
}
