use ecow::{eco_format, EcoString};

use super::{Func, LResult, LazyErr, Value, ValueType};

impl Value {
    fn conv_err<T>(&self, expected: ValueType) -> LResult<T> {
        Err(LazyErr::TypeConv {
            expected,
            found: eco_format!("{self:?}"),
        })
    }

    pub fn as_int(&self) -> LResult<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            Self::Bool(b) => Ok(i64::from(*b)),
            _ => self.conv_err(ValueType::Int),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> LResult<f64> {
        match self {
            Self::Float(x) => Ok(*x),
            Self::Int(i) => Ok(*i as f64),
            _ => self.conv_err(ValueType::Float),
        }
    }

    /// truthiness, `nil` and `false` are the only falsy values
    pub const fn to_bool(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    pub fn as_bool(&self) -> LResult<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => self.conv_err(ValueType::Bool),
        }
    }

    pub fn as_str(&self) -> LResult<&str> {
        match self {
            Self::Str(s) => Ok(s),
            _ => self.conv_err(ValueType::Str),
        }
    }

    pub fn to_eco(&self) -> LResult<EcoString> {
        self.as_str().map(EcoString::from)
    }

    pub fn as_list(&self) -> LResult<&im::Vector<Self>> {
        match self {
            Self::List(l) => Ok(l),
            _ => self.conv_err(ValueType::List),
        }
    }

    pub fn as_func(&self) -> LResult<&Func> {
        match self {
            Self::Func(f) => Ok(f),
            _ => self.conv_err(ValueType::Func),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::value;

    use super::*;

    #[test]
    fn int_conversions() {
        assert_eq!(value!(int 4).as_int().unwrap(), 4);
        assert_eq!(value!(bool true).as_int().unwrap(), 1);
        assert!(matches!(
            value!(str "4").as_int(),
            Err(LazyErr::TypeConv {
                expected: ValueType::Int,
                ..
            })
        ));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.to_bool());
        assert!(!value!(bool false).to_bool());
        assert!(value!(int 0).to_bool());
        assert!(value!(str "").to_bool());
    }

    #[test]
    fn float_widens_ints() {
        assert!((value!(int 2).as_float().unwrap() - 2.0).abs() < f64::EPSILON);
    }
}
