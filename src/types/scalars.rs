use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Floating point scalar used for positions, distances and assembled
/// quantities. The trait is implemented for `f32` and `f64`; all inner loops
/// are monomorphised over it, there is no runtime dispatch on the precision.
pub trait Scalar:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + Debug
    + Display
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + std::iter::Sum
{
    const ZERO: Self;
    const ONE: Self;
    const TWO: Self;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;

    fn floor(self) -> Self;
    fn ceil(self) -> Self;
    fn sqrt(self) -> Self;
    fn abs(self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
    fn is_finite(self) -> bool;
}

macro_rules! impl_scalar {
    ($Type: ty) => {
        impl Scalar for $Type {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const TWO: Self = 2.0;

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $Type
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn floor(self) -> Self {
                <$Type>::floor(self)
            }

            #[inline]
            fn ceil(self) -> Self {
                <$Type>::ceil(self)
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$Type>::sqrt(self)
            }

            #[inline]
            fn abs(self) -> Self {
                <$Type>::abs(self)
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                <$Type>::min(self, other)
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                <$Type>::max(self, other)
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$Type>::is_finite(self)
            }
        }
    };
}

impl_scalar!(f32);
impl_scalar!(f64);

/// Signed integer type used to index particles and bins in a pair list.
///
/// The linked-cell structures use `NONE` (always `-1`) as the "no entry"
/// sentinel, since `0` is a valid particle or bin index. The pair list
/// builder checks, using widened arithmetic, that both the particle count
/// and the total bin count fit the chosen index type before allocating
/// anything.
pub trait PairIndex:
    Copy + Eq + Ord + Default + Debug + Display + Send + Sync + 'static
{
    /// The "no entry" marker used in linked lists.
    const NONE: Self;

    /// Largest representable value, widened for overflow checks.
    fn max_value_widened() -> i128;

    /// Convert from an in-range `usize`, `None` when the value does not fit.
    fn from_usize(value: usize) -> Option<Self>;

    /// Convert back to `usize`. Must only be called on non-negative values,
    /// never on `NONE`.
    fn to_usize(self) -> usize;

    /// Is this the `NONE` sentinel?
    fn is_none(self) -> bool {
        self == Self::NONE
    }
}

macro_rules! impl_pair_index {
    ($Type: ty) => {
        impl PairIndex for $Type {
            const NONE: Self = -1;

            #[inline]
            fn max_value_widened() -> i128 {
                <$Type>::MAX as i128
            }

            #[inline]
            fn from_usize(value: usize) -> Option<Self> {
                <$Type>::try_from(value).ok()
            }

            #[inline]
            fn to_usize(self) -> usize {
                debug_assert!(self >= 0);
                self as usize
            }
        }
    };
}

impl_pair_index!(i32);
impl_pair_index!(i64);
