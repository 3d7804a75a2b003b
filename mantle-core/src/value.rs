use crate::{Error, Result};
use rust_decimal::Decimal;
use std::{any, fmt::Write};
use time::PrimitiveDateTime;

/// Dynamically typed cell value moving between entity fields, query
/// parameters and result rows.
///
/// Each variant carries an `Option` so a variant with `None` doubles as a
/// typed NULL, and a bare variant works as a type prototype in field
/// bindings (see `FieldBinding::value`).
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Timestamp(Option<PrimitiveDateTime>),
    Blob(Option<Box<[u8]>>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
        }
    }

    /// The value a NULL database cell materializes to for this declared
    /// type: numeric and boolean fields get their zero equivalent, reference
    /// types keep the typed null.
    pub fn zero_fallback(&self) -> Value {
        match self {
            Value::Boolean(..) => Value::Boolean(Some(false)),
            Value::Int8(..) => Value::Int8(Some(0)),
            Value::Int16(..) => Value::Int16(Some(0)),
            Value::Int32(..) => Value::Int32(Some(0)),
            Value::Int64(..) => Value::Int64(Some(0)),
            Value::Float32(..) => Value::Float32(Some(0.0)),
            Value::Float64(..) => Value::Float64(Some(0.0)),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Null => Value::Null,
        }
    }

    /// Plain text rendering backing the string typed accessor path: string
    /// fields always go through here so formatting stays consistent no
    /// matter what variant the cursor produced.
    pub fn render(&self) -> String {
        macro_rules! render_integer {
            ($value:expr) => {{
                let mut buffer = itoa::Buffer::new();
                buffer.format($value).to_string()
            }};
        }
        macro_rules! render_float {
            ($value:expr) => {{
                let mut buffer = ryu::Buffer::new();
                buffer.format($value).to_string()
            }};
        }
        match self {
            Value::Boolean(Some(v)) => v.to_string(),
            Value::Int8(Some(v)) => render_integer!(*v),
            Value::Int16(Some(v)) => render_integer!(*v),
            Value::Int32(Some(v)) => render_integer!(*v),
            Value::Int64(Some(v)) => render_integer!(*v),
            Value::Float32(Some(v)) => render_float!(*v),
            Value::Float64(Some(v)) => render_float!(*v),
            Value::Decimal(Some(v)) => v.to_string(),
            Value::Varchar(Some(v)) => v.clone(),
            Value::Timestamp(Some(v)) => v.to_string(),
            Value::Blob(Some(v)) => {
                let mut out = String::with_capacity(v.len() * 2);
                for b in v.iter() {
                    let _ = write!(out, "{:02X}", b);
                }
                out
            }
            _ => String::new(),
        }
    }
}

/// Conversion contract between native Rust field types and [`Value`].
///
/// `as_value` wraps an owned value, `as_empty_value` produces the typed NULL
/// prototype and `try_from_value` converts back, accepting alternate numeric
/// widths with range checks.
pub trait AsValue {
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn widen_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Int8(Some(v)) => Some(*v as i128),
        Value::Int16(Some(v)) => Some(*v as i128),
        Value::Int32(Some(v)) => Some(*v as i128),
        Value::Int64(Some(v)) => Some(*v as i128),
        _ => None,
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} into {}",
        value,
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value_integer {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let Some(wide) = widen_integer(&value) else {
                    return Err(mismatch::<Self>(&value));
                };
                if wide < Self::MIN as i128 || wide > Self::MAX as i128 {
                    return Err(Error::msg(format!(
                        "Value {} is out of range for {}",
                        wide,
                        any::type_name::<Self>()
                    )));
                }
                Ok(wide as Self)
            }
        }
    };
}

impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);

macro_rules! impl_as_value_float {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Float32(Some(v)) => Ok(v as Self),
                    Value::Float64(Some(v)) => Ok(v as Self),
                    ref v => match widen_integer(v) {
                        Some(wide) => Ok(wide as Self),
                        None => Err(mismatch::<Self>(&value)),
                    },
                }
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            ref v => match widen_integer(v) {
                Some(wide) => Ok(wide != 0),
                None => Err(mismatch::<Self>(&value)),
            },
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            ref v => match widen_integer(v) {
                Some(wide) => Ok(Decimal::from(wide)),
                None => Err(mismatch::<Self>(&value)),
            },
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            ref v => Err(mismatch::<Self>(v)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(T::try_from_value(value)?))
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.to_owned()))
    }
}
