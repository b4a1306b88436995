//! Conversion of dynamically typed ABI output values into the typed slots
//! requested at the call site.

use {
    crate::error::Error,
    alloy::{
        dyn_abi::DynSolValue,
        primitives::{Address, Bytes, U256},
    },
};

/// A single ABI value converted into a concrete Rust type.
pub trait FromValue: Sized {
    fn from_value(value: DynSolValue) -> Result<Self, Error>;
}

/// A method's full output value list converted into a concrete Rust type.
/// Implemented for every [`FromValue`] type (single-output methods) and for
/// tuples of them.
pub trait FromValues: Sized {
    fn from_values(values: Vec<DynSolValue>) -> Result<Self, Error>;
}

impl FromValue for U256 {
    fn from_value(value: DynSolValue) -> Result<Self, Error> {
        match value {
            DynSolValue::Uint(value, _) => Ok(value),
            other => Err(Error::Value(format!("expected uint, got {other:?}"))),
        }
    }
}

// Narrowing from the wire's arbitrary precision is only performed after
// confirming the value is in range.
impl FromValue for u64 {
    fn from_value(value: DynSolValue) -> Result<Self, Error> {
        let value = U256::from_value(value)?;
        u64::try_from(value).map_err(|_| Error::Value(format!("uint {value} out of u64 range")))
    }
}

impl FromValue for bool {
    fn from_value(value: DynSolValue) -> Result<Self, Error> {
        match value {
            DynSolValue::Bool(value) => Ok(value),
            other => Err(Error::Value(format!("expected bool, got {other:?}"))),
        }
    }
}

impl FromValue for Address {
    fn from_value(value: DynSolValue) -> Result<Self, Error> {
        match value {
            DynSolValue::Address(value) => Ok(value),
            other => Err(Error::Value(format!("expected address, got {other:?}"))),
        }
    }
}

impl FromValue for String {
    fn from_value(value: DynSolValue) -> Result<Self, Error> {
        match value {
            DynSolValue::String(value) => Ok(value),
            other => Err(Error::Value(format!("expected string, got {other:?}"))),
        }
    }
}

impl FromValue for Bytes {
    fn from_value(value: DynSolValue) -> Result<Self, Error> {
        match value {
            DynSolValue::Bytes(value) => Ok(value.into()),
            DynSolValue::FixedBytes(word, size) => Ok(word[..size].to_vec().into()),
            other => Err(Error::Value(format!("expected bytes, got {other:?}"))),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: DynSolValue) -> Result<Self, Error> {
        match value {
            DynSolValue::Array(values) | DynSolValue::FixedArray(values) => {
                values.into_iter().map(T::from_value).collect()
            }
            other => Err(Error::Value(format!("expected array, got {other:?}"))),
        }
    }
}

impl FromValues for () {
    fn from_values(_: Vec<DynSolValue>) -> Result<Self, Error> {
        Ok(())
    }
}

macro_rules! impl_from_values_for_single {
    ($($t:ty),+) => {$(
        impl FromValues for $t {
            fn from_values(values: Vec<DynSolValue>) -> Result<Self, Error> {
                match <[DynSolValue; 1]>::try_from(values) {
                    Ok([value]) => FromValue::from_value(value),
                    Err(values) => Err(Error::Value(format!(
                        "expected a single output value, got {}",
                        values.len()
                    ))),
                }
            }
        }
    )+};
}

impl_from_values_for_single!(U256, u64, bool, Address, String, Bytes);

impl<T: FromValue> FromValues for Vec<T> {
    fn from_values(values: Vec<DynSolValue>) -> Result<Self, Error> {
        match <[DynSolValue; 1]>::try_from(values) {
            Ok([value]) => FromValue::from_value(value),
            Err(values) => Err(Error::Value(format!(
                "expected a single output value, got {}",
                values.len()
            ))),
        }
    }
}

macro_rules! impl_from_values_for_tuple {
    ($($t:ident),+) => {
        impl<$($t: FromValue),+> FromValues for ($($t,)+) {
            fn from_values(values: Vec<DynSolValue>) -> Result<Self, Error> {
                const LEN: usize = [$(stringify!($t)),+].len();
                match <[DynSolValue; LEN]>::try_from(values) {
                    #[allow(non_snake_case)]
                    Ok([$($t),+]) => Ok(($($t::from_value($t)?,)+)),
                    Err(values) => Err(Error::Value(format!(
                        "expected {LEN} output values, got {}",
                        values.len()
                    ))),
                }
            }
        }
    };
}

impl_from_values_for_tuple!(A, B);
impl_from_values_for_tuple!(A, B, C);
impl_from_values_for_tuple!(A, B, C, D);
