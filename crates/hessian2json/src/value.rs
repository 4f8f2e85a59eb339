//! Decoded value tree.
//!
//! Every decoded node is also recorded here so that back-references can be
//! re-emitted from the already materialized value instead of re-reading the
//! wire.

use std::sync::Arc;

use crate::emitter::{JsonEmitter, push_double};

/// Elements of a decoded list.
pub type List = Vec<Value>;
/// Entries of a decoded map, in wire order.
pub type Map = Vec<(Value, Value)>;

/// A decoded Hessian value.
///
/// Lists and maps share their contents through [`Arc`], so cloning a value is
/// cheap and a snapshot taken while a container is still being decoded stays
/// frozen at that point.
///
/// # Examples
///
/// ```
/// use hessian2json::Value;
///
/// let v = Value::from(vec![Value::Int(1), Value::String("two".into())]);
/// assert_eq!(v.to_string(), r#"[1,"two"]"#);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    /// `null`
    #[default]
    Null,
    /// `true` or `false`
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer; dates decode to epoch milliseconds here as well.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// Reassembled string.
    String(String),
    /// List elements.
    List(Arc<List>),
    /// Map entries.
    Map(Arc<Map>),
    /// `java.math.BigDecimal` in plain notation.
    Decimal(String),
    /// `java.sql` date, time or timestamp as epoch milliseconds.
    Timestamp(i64),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<List> for Value {
    fn from(v: List) -> Self {
        Self::List(Arc::new(v))
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Map(Arc::new(v))
    }
}

impl Value {
    /// Returns `true` for lists and maps.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::List(..) | Self::Map(..))
    }

    /// Returns the list elements if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map entries if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Textual form used when this value is a map key.
    ///
    /// Null and composite values cannot name a field and return `None`.
    ///
    /// ```
    /// use hessian2json::Value;
    ///
    /// assert_eq!(Value::Int(1).key_text().as_deref(), Some("1"));
    /// assert_eq!(Value::Double(2.0).key_text().as_deref(), Some("2.0"));
    /// assert_eq!(Value::Null.key_text(), None);
    /// ```
    #[must_use]
    pub fn key_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::List(..) | Self::Map(..) => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Long(n) | Self::Timestamp(n) => Some(n.to_string()),
            Self::Double(n) => {
                let mut text = String::new();
                push_double(&mut text, *n);
                Some(text)
            }
            Self::String(s) | Self::Decimal(s) => Some(s.clone()),
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut json = JsonEmitter::new();
        json.value(self);
        f.write_str(json.as_str())
    }
}
