use std::fmt;

use crate::ValidationError;

/// Smallest interval a custom cadence may use, in minutes.
pub const MIN_CUSTOM_MINUTES: u32 = 1;
/// Largest interval a custom cadence may use, in minutes (one day).
pub const MAX_CUSTOM_MINUTES: u32 = 1440;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_DAY: u64 = 86_400;

/// Recurrence rule for a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily,
    Weekly,
    Custom { minutes: u32 },
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Custom { minutes: 12 }
    }
}

/// Unit half of the wire pair sent to the schedule endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceUnit {
    Minutes,
    Days,
}

impl CadenceUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            CadenceUnit::Minutes => "minutes",
            CadenceUnit::Days => "days",
        }
    }
}

impl fmt::Display for CadenceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(quantity, unit)` pair; `quantity` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedCadence {
    pub quantity: u32,
    pub unit: CadenceUnit,
}

impl NormalizedCadence {
    pub fn interval_secs(self) -> u64 {
        let per_unit = match self.unit {
            CadenceUnit::Minutes => SECONDS_PER_MINUTE,
            CadenceUnit::Days => SECONDS_PER_DAY,
        };
        u64::from(self.quantity) * per_unit
    }
}

impl Cadence {
    /// Builds a custom cadence, rejecting intervals outside `[1, 1440]` minutes.
    pub fn custom(minutes: u32) -> Result<Self, ValidationError> {
        if (MIN_CUSTOM_MINUTES..=MAX_CUSTOM_MINUTES).contains(&minutes) {
            Ok(Cadence::Custom { minutes })
        } else {
            Err(ValidationError::CadenceOutOfRange { minutes })
        }
    }

    /// Input-boundary helper: pins any raw operator value into the valid range.
    pub fn custom_clamped(raw_minutes: i64) -> Self {
        let minutes = raw_minutes.clamp(
            i64::from(MIN_CUSTOM_MINUTES),
            i64::from(MAX_CUSTOM_MINUTES),
        );
        // In range after the clamp above.
        Cadence::Custom {
            minutes: minutes as u32,
        }
    }

    pub fn validate(self) -> Result<Self, ValidationError> {
        match self {
            Cadence::Custom { minutes } => Cadence::custom(minutes),
            other => Ok(other),
        }
    }

    pub fn normalize(self) -> NormalizedCadence {
        match self {
            Cadence::Daily => NormalizedCadence {
                quantity: 1,
                unit: CadenceUnit::Days,
            },
            Cadence::Weekly => NormalizedCadence {
                quantity: 7,
                unit: CadenceUnit::Days,
            },
            Cadence::Custom { minutes } => NormalizedCadence {
                quantity: minutes.max(MIN_CUSTOM_MINUTES),
                unit: CadenceUnit::Minutes,
            },
        }
    }

    /// Full interval in seconds; seeds and re-arms the countdown.
    pub fn interval_secs(self) -> u64 {
        self.normalize().interval_secs()
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Daily => write!(f, "daily"),
            Cadence::Weekly => write!(f, "weekly"),
            Cadence::Custom { minutes } => write!(f, "every {minutes} min"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_every_cadence_kind() {
        assert_eq!(
            Cadence::Daily.normalize(),
            NormalizedCadence {
                quantity: 1,
                unit: CadenceUnit::Days
            }
        );
        assert_eq!(
            Cadence::Weekly.normalize(),
            NormalizedCadence {
                quantity: 7,
                unit: CadenceUnit::Days
            }
        );
        for minutes in [1, 12, 720, 1440] {
            let normalized = Cadence::Custom { minutes }.normalize();
            assert_eq!(normalized.quantity, minutes);
            assert_eq!(normalized.unit, CadenceUnit::Minutes);
        }
    }

    #[test]
    fn interval_seconds_match_cadence() {
        assert_eq!(Cadence::Daily.interval_secs(), 86_400);
        assert_eq!(Cadence::Weekly.interval_secs(), 604_800);
        assert_eq!(Cadence::Custom { minutes: 1 }.interval_secs(), 60);
        assert_eq!(Cadence::Custom { minutes: 12 }.interval_secs(), 720);
        assert_eq!(Cadence::Custom { minutes: 1440 }.interval_secs(), 86_400);
    }

    #[test]
    fn custom_rejects_out_of_range() {
        assert_eq!(
            Cadence::custom(0),
            Err(ValidationError::CadenceOutOfRange { minutes: 0 })
        );
        assert_eq!(
            Cadence::custom(1441),
            Err(ValidationError::CadenceOutOfRange { minutes: 1441 })
        );
        assert_eq!(Cadence::custom(30), Ok(Cadence::Custom { minutes: 30 }));
    }

    #[test]
    fn clamping_pins_to_bounds() {
        assert_eq!(Cadence::custom_clamped(-5), Cadence::Custom { minutes: 1 });
        assert_eq!(Cadence::custom_clamped(0), Cadence::Custom { minutes: 1 });
        assert_eq!(
            Cadence::custom_clamped(99_999),
            Cadence::Custom { minutes: 1440 }
        );
        assert_eq!(Cadence::custom_clamped(45), Cadence::Custom { minutes: 45 });
    }
}
