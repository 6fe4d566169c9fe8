//! Metric Value - a single scalar cell

use std::fmt;

/// A scalar metric value.
///
/// Integer-typed inputs up to 32 bits unsigned / 64 bits signed are stored
/// as [`MetricValue::Int`]; floating-point inputs as [`MetricValue::Float`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// Integral metric (counts, token totals, epoch numbers).
    Int(i64),
    /// Real-valued metric (losses, accuracies, learning rates).
    Float(f64),
}

impl MetricValue {
    /// Value as `f64`, widening integers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Integer value, if this is an integral metric.
    #[must_use]
    pub const fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(_) => None,
        }
    }

    /// Whether this value is stored as an integer.
    #[must_use]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for MetricValue {
            fn from(v: $t) -> Self {
                Self::Int(i64::from(v))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for MetricValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_stay_integers() {
        assert_eq!(MetricValue::from(7_i32), MetricValue::Int(7));
        assert_eq!(MetricValue::from(-7_i64), MetricValue::Int(-7));
        assert_eq!(MetricValue::from(u32::MAX), MetricValue::Int(i64::from(u32::MAX)));
        assert!(MetricValue::from(3_u8).is_int());
    }

    #[test]
    fn test_floats_become_floats() {
        assert_eq!(MetricValue::from(0.5_f64), MetricValue::Float(0.5));
        let v = MetricValue::from(0.1_f32);
        assert!(!v.is_int());
        assert!((v.as_f64() - 0.1).abs() < 1e-7);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(MetricValue::Int(3).as_i64(), Some(3));
        assert_eq!(MetricValue::Float(3.0).as_i64(), None);
        assert!((MetricValue::Int(3).as_f64() - 3.0).abs() < f64::EPSILON);
        assert_eq!(MetricValue::Int(3).to_string(), "3");
        assert_eq!(MetricValue::Float(0.25).to_string(), "0.25");
    }
}
