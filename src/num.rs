// Defines the numeric abstraction the controller is generic over and
// instantiates it for the sample representations the library supports.

use core::fmt::Debug;
use core::ops::{Add, Neg, Sub};

use num_traits::{Bounded, NumCast, ToPrimitive, Zero};

/// A numeric sample type the controller can operate on.
///
/// The controller stores feedback, error, and output in this type and only
/// widens to `f64` at the points where a value is multiplied by a gain or
/// scaled by elapsed time. `Sample` asks for exactly the arithmetic the
/// control law needs: ordering, addition, subtraction, negation, and a
/// round trip through `f64`.
///
/// The provided `from_gain` saturates at the type's representable range
/// instead of wrapping, so an integer controller fed an enormous correction
/// pins at `i32::MAX` rather than flipping sign.
pub trait Sample:
    Copy
    + PartialOrd
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Bounded
    + NumCast
    + ToPrimitive
    + Debug
{
    /// Widens this sample to `f64` so it can be multiplied by a gain.
    fn to_gain(self) -> f64 {
        self.to_f64().unwrap_or_default()
    }

    /// Narrows a gain-domain value back to the sample type, saturating at
    /// the type's bounds. For integer samples the fractional part is
    /// truncated toward zero.
    fn from_gain(value: f64) -> Self {
        NumCast::from(value).unwrap_or_else(|| {
            if value < 0.0 {
                Self::min_value()
            } else {
                Self::max_value()
            }
        })
    }

    /// Absolute magnitude, used when ranking wrap-around error candidates.
    fn magnitude(self) -> Self {
        if self < Self::zero() {
            -self
        } else {
            self
        }
    }
}

impl Sample for i32 {}
impl Sample for i64 {}
impl Sample for f32 {}
impl Sample for f64 {}

#[cfg(test)]
mod tests {
    use super::Sample;

    #[test]
    fn test_from_gain_truncates_toward_zero() {
        assert_eq!(i32::from_gain(3.9), 3);
        assert_eq!(i32::from_gain(-3.9), -3);
    }

    #[test]
    fn test_from_gain_saturates() {
        assert_eq!(i32::from_gain(1e12), i32::MAX);
        assert_eq!(i32::from_gain(-1e12), i32::MIN);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!((-7i64).magnitude(), 7);
        assert_eq!(7.5f64.magnitude(), 7.5);
        assert_eq!((-7.5f32).magnitude(), 7.5);
    }
}
