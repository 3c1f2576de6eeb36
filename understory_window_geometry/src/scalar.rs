// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar abstraction for heights, offsets, and scroll positions.

use core::fmt::Debug;
use core::ops::{Add, Div, Mul, Sub};

/// A floating-point type usable for row heights and scroll offsets.
///
/// Implemented for `f32` and `f64`. Everything here is available in `core`, so
/// the crate needs neither `std` nor `libm`.
pub trait Scalar:
    Copy
    + Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// Additive identity.
    fn zero() -> Self;

    /// Converts a count or index into this scalar.
    fn from_usize(value: usize) -> Self;

    /// Rounds toward negative infinity and converts to `isize`.
    ///
    /// NaN maps to `0`; values outside the `isize` range saturate.
    fn floor_to_isize(self) -> isize;

    /// Returns `true` if this value is neither infinite nor NaN.
    fn is_finite(self) -> bool;

    /// Returns `true` if the sign bit is set (including `-0.0`).
    fn is_sign_negative(self) -> bool;

    /// Returns the larger of two values.
    #[must_use]
    fn max(self, other: Self) -> Self;

    /// Returns the smaller of two values.
    #[must_use]
    fn min(self, other: Self) -> Self;
}

macro_rules! impl_scalar {
    ($ty:ty) => {
        impl Scalar for $ty {
            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            #[allow(
                clippy::cast_precision_loss,
                reason = "Row counts far beyond the mantissa are not meaningful for scrolling"
            )]
            fn from_usize(value: usize) -> Self {
                value as Self
            }

            #[inline]
            #[allow(
                clippy::cast_possible_truncation,
                reason = "`as` saturates; callers clamp the result into their index range"
            )]
            fn floor_to_isize(self) -> isize {
                let truncated = self as isize;
                if (truncated as Self) > self {
                    truncated - 1
                } else {
                    truncated
                }
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$ty>::is_finite(self)
            }

            #[inline]
            fn is_sign_negative(self) -> bool {
                <$ty>::is_sign_negative(self)
            }

            #[inline]
            fn max(self, other: Self) -> Self {
                <$ty>::max(self, other)
            }

            #[inline]
            fn min(self, other: Self) -> Self {
                <$ty>::min(self, other)
            }
        }
    };
}

impl_scalar!(f32);
impl_scalar!(f64);
