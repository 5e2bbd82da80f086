// Sample rate value object
use super::error::DomainError;
use std::fmt;
use std::str::FromStr;

/// Retention fraction in [0, 1]. 1 keeps everything, 0 keeps nothing.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SampleRate(f64);

impl SampleRate {
    pub const ALL: SampleRate = SampleRate(1.0);
    pub const NONE: SampleRate = SampleRate(0.0);

    pub fn new(rate: f64) -> Result<Self, DomainError> {
        if !rate.is_finite() {
            return Err(DomainError::invalid(
                "sample_rate",
                format!("{} is not a finite number", rate),
            ));
        }
        if !(0.0..=1.0).contains(&rate) {
            return Err(DomainError::invalid(
                "sample_rate",
                format!("{} is outside [0, 1]", rate),
            ));
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn keeps_everything(&self) -> bool {
        self.0 >= 1.0
    }

    pub fn keeps_nothing(&self) -> bool {
        self.0 <= 0.0
    }
}

impl TryFrom<f64> for SampleRate {
    type Error = DomainError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        SampleRate::new(rate)
    }
}

impl FromStr for SampleRate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = s.trim().parse::<f64>().map_err(|_| {
            DomainError::invalid("sample_rate", format!("'{}' is not a number", s))
        })?;
        SampleRate::new(rate)
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
