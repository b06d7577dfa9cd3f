//! Validation of caller-supplied numbers.

use crate::error::{ExpressionError, Result};
use std::any::{self, Any};

/// The number of fractional digits used when displaying an integer value.
pub const INTEGER_PRECISION: usize = 0;
/// The number of fractional digits used when displaying a floating point
/// value.
pub const FLOAT_PRECISION: usize = 2;

/// What sort of number a value originally was.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Float,
}

/// A validated numeric value.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Number {
    value: f64,
    kind: NumberKind,
}

impl Number {
    pub fn integer(value: f64) -> Self {
        Number {
            value,
            kind: NumberKind::Integer,
        }
    }

    pub fn float(value: f64) -> Self {
        Number {
            value,
            kind: NumberKind::Float,
        }
    }

    /// Check that some arbitrary value is one of the supported numeric
    /// types.
    pub fn from_any<T: Any>(value: &T) -> Result<Number> {
        downcast(value).ok_or_else(|| ExpressionError::InvalidValueKind {
            type_name: any::type_name::<T>().into(),
        })
    }

    pub fn value(self) -> f64 { self.value }

    pub fn kind(self) -> NumberKind { self.kind }

    /// How many fractional digits to show when nobody asked for anything
    /// specific.
    pub fn default_precision(self) -> usize {
        match self.kind {
            NumberKind::Integer => INTEGER_PRECISION,
            NumberKind::Float => FLOAT_PRECISION,
        }
    }
}

/// Something which may be converted into a [`Number`].
///
/// This is implemented for every primitive integer and float, and for
/// `&dyn Any` so dynamically typed values get checked at runtime.
pub trait IntoNumber {
    fn into_number(self) -> Result<Number>;
}

impl IntoNumber for Number {
    fn into_number(self) -> Result<Number> { Ok(self) }
}

impl<'a> IntoNumber for &'a (dyn Any + 'static) {
    fn into_number(self) -> Result<Number> {
        downcast(self).ok_or_else(|| ExpressionError::InvalidValueKind {
            type_name: "dyn Any".into(),
        })
    }
}

macro_rules! numeric_types {
    ($( $constructor:ident => [$($ty:ty),*] ),* $(,)?) => {
        $(
            $(
                impl IntoNumber for $ty {
                    fn into_number(self) -> Result<Number> {
                        Ok(Number::$constructor(self as f64))
                    }
                }
            )*
        )*

        fn downcast(value: &dyn Any) -> Option<Number> {
            $(
                $(
                    if let Some(v) = value.downcast_ref::<$ty>() {
                        return Some(Number::$constructor(*v as f64));
                    }
                )*
            )*

            None
        }
    };
}

numeric_types! {
    integer => [i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize],
    float => [f32, f64],
}

/// Negative precisions don't make sense, treat them as "no decimal places".
pub(crate) fn clamp_precision(precision: i32) -> usize {
    if precision > 0 {
        precision as usize
    } else {
        0
    }
}
