use smol_str::SmolStr;

/// A value bound to one placeholder of a compiled statement.
///
/// The bound-value list returned by a build is ordered: the value at index
/// `i` belongs to the `i + 1`-th placeholder of the statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    String(SmolStr),
    F32(f32),
    F64(f64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
}

pub type Values = Vec<Value>;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    #[inline(always)]
    fn into_value(self) -> Value {
        self
    }
}

impl<T> IntoValue for Option<T>
where
    T: IntoValue,
{
    fn into_value(self) -> Value {
        if let Some(value) = self {
            value.into_value()
        } else {
            Value::Null
        }
    }
}

impl IntoValue for &str {
    #[inline]
    fn into_value(self) -> Value {
        Value::String(SmolStr::new(self))
    }
}

impl IntoValue for String {
    #[inline]
    fn into_value(self) -> Value {
        Value::String(SmolStr::new(self))
    }
}

impl IntoValue for &String {
    #[inline]
    fn into_value(self) -> Value {
        Value::String(SmolStr::new(self))
    }
}

impl IntoValue for SmolStr {
    #[inline(always)]
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! impl_into_value {
    ( $($ty:ty => $variant:ident),+ $(,)? ) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )+
    };
}

impl_into_value! {
    f32 => F32,
    f64 => F64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}
