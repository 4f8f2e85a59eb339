//! Lists, maps, objects and back-references.

use std::{io::Read, str::FromStr};

use bigdecimal::BigDecimal;
use log::trace;

use super::{Emit, Transcoder};
use crate::{
    error::Result,
    refs::{ClassDefinition, ReducedKind, Shape},
    tag::{Production, classify},
    value::{List, Map, Value},
};

impl<R: Read> Transcoder<R> {
    /// ```text
    /// type ::= string
    ///      ::= int
    /// ```
    ///
    /// Type names are read and discarded.
    fn decode_type(&mut self) -> Result<()> {
        let code = self.peek()?;
        match code.map(classify) {
            Some(Production::String) => self.decode_string(Emit::Skip).map(drop),
            Some(Production::Int) => self.decode_int(Emit::Skip).map(drop),
            _ => self.unexpected("type", code),
        }
    }

    /// A non-negative int.
    fn decode_length(&mut self, expected: &'static str) -> Result<usize> {
        let n = self.decode_int(Emit::Skip)?;
        match usize::try_from(n) {
            Ok(n) => Ok(n),
            Err(_) => self.unexpected_text(expected, n.to_string()),
        }
    }

    fn decode_end(&mut self) -> Result<()> {
        let tag = self.tag()?;
        if tag != Some(b'Z') {
            return self.unexpected(Production::End.name(), tag);
        }
        Ok(())
    }

    /// ```text
    /// list ::= x55 type value* 'Z'   # variable-length list
    ///      ::= 'V' type int value*   # fixed-length list
    ///      ::= x57 value* 'Z'        # variable-length untyped list
    ///      ::= x58 int value*        # fixed-length untyped list
    ///      ::= [x70-77] type value*  # fixed-length typed list
    ///      ::= [x78-7f] value*       # fixed-length untyped list
    /// ```
    pub(crate) fn decode_list(&mut self, emit: Emit) -> Result<(Value, Shape)> {
        let code = self.tag()?;
        let length = match code {
            Some(0x55) => {
                self.decode_type()?;
                None
            }
            Some(b'V') => {
                self.decode_type()?;
                Some(self.decode_length("list length")?)
            }
            Some(0x57) => None,
            Some(0x58) => Some(self.decode_length("list length")?),
            Some(t @ 0x70..=0x77) => {
                self.decode_type()?;
                Some(usize::from(t - 0x70))
            }
            Some(t @ 0x78..=0x7f) => Some(usize::from(t - 0x78)),
            _ => return self.unexpected("list", code),
        };

        self.enter(code)?;
        let index = self.refs.push(Value::from(List::new()), Shape::CONTAINER);
        let child = emit.children();
        if emit == Emit::Value {
            self.json.begin_array();
        }
        if let Some(length) = length {
            for _ in 0..length {
                let element = self.decode_value(child)?;
                self.refs.push_element(index, element);
            }
        } else {
            while !self.at_end()? {
                let element = self.decode_value(child)?;
                self.refs.push_element(index, element);
            }
            self.decode_end()?;
        }
        if emit == Emit::Value {
            self.json.end_array();
        }
        self.leave();
        Ok(self.refs.snapshot(index))
    }

    /// ```text
    /// map ::= 'M' type (value value)* 'Z'
    ///     ::= 'H' (value value)* 'Z'
    /// ```
    pub(crate) fn decode_map(&mut self, emit: Emit) -> Result<(Value, Shape)> {
        let code = self.tag()?;
        match code {
            Some(b'M') => self.decode_type()?,
            Some(b'H') => {}
            _ => return self.unexpected("map", code),
        }

        self.enter(code)?;
        let index = self.refs.push(Value::from(Map::new()), Shape::CONTAINER);
        if emit == Emit::Value {
            self.json.begin_object();
        }
        while !self.at_end()? {
            let key = self.decode_key(emit.keys())?;
            let value = self.decode_value(emit.children())?;
            self.refs.push_entry(index, key, value);
        }
        self.decode_end()?;
        if emit == Emit::Value {
            self.json.end_object();
        }
        self.leave();
        Ok(self.refs.snapshot(index))
    }

    /// A map key: any value that has a textual form.
    fn decode_key(&mut self, emit: Emit) -> Result<(Value, Shape)> {
        let code = self.peek()?;
        let key = self.decode_value(emit)?;
        if key.0 == Value::Null || key.0.is_composite() {
            return self.unexpected("field name", code);
        }
        Ok(key)
    }

    /// ```text
    /// class-def ::= 'C' string int string*
    /// ```
    pub(crate) fn decode_class_def(&mut self) -> Result<()> {
        let tag = self.tag()?;
        if tag != Some(b'C') {
            return self.unexpected("class-def", tag);
        }
        let type_name = self.decode_string(Emit::Skip)?;
        let count = self.decode_length("field count")?;
        let mut field_names = Vec::with_capacity(count.min(16));
        for _ in 0..count {
            field_names.push(self.decode_string(Emit::Skip)?);
        }
        trace!("class-def #{}: {type_name}", self.class_defs.len());
        self.class_defs.push(ClassDefinition {
            type_name,
            field_names,
        });
        Ok(())
    }

    /// ```text
    /// object ::= 'O' int value*
    ///        ::= [x60-x6f] value*
    /// ```
    ///
    /// Only compact objects of a reduced type are accepted; each carries a
    /// single field.
    pub(crate) fn decode_object(&mut self, emit: Emit) -> Result<(Value, Shape)> {
        let tag = self.tag()?;
        let index = match tag {
            Some(t @ 0x60..=0x6f) => usize::from(t - 0x60),
            Some(b'O') => return self.unexpected("compact object", tag),
            _ => return self.unexpected("object", tag),
        };
        let Some(kind) = self.class_defs.get(index).map(ClassDefinition::reduced_kind) else {
            let expected = format!("class-def index below {}", self.class_defs.len());
            return self.unexpected(expected, tag);
        };

        let value = match kind {
            Some(ReducedKind::Decimal) => {
                let text = self.decode_string(Emit::Skip)?;
                match plain_decimal(&text) {
                    Some(plain) => Value::Decimal(plain),
                    None => return self.unexpected_text("decimal", text),
                }
            }
            Some(ReducedKind::Timestamp) => Value::Timestamp(self.decode_date(Emit::Skip)?),
            None => {
                let actual = self
                    .class_defs
                    .get(index)
                    .map_or_else(String::new, |def| def.type_name.clone());
                return self.unexpected_text("BigDecimal, sql time", actual);
            }
        };
        self.emit(emit, &value, tag)?;
        let shape = Shape::scalar(&value);
        let at = self.refs.push(value.clone(), shape);
        trace!("ref #{at}: reduced object");
        Ok((value, shape))
    }

    /// ```text
    /// ref ::= x51 int
    /// ```
    pub(crate) fn decode_ref(&mut self, emit: Emit) -> Result<(Value, Shape)> {
        let tag = self.tag()?;
        if tag != Some(0x51) {
            return self.unexpected("ref", tag);
        }
        let n = self.decode_int(Emit::Skip)?;
        let Some(entry) = usize::try_from(n).ok().and_then(|i| self.refs.get(i)) else {
            let expected = format!("ref index below {}", self.refs.len());
            return self.unexpected_text(expected, n.to_string());
        };
        let (value, shape) = entry.clone();
        trace!("ref #{n} resolved, size {}", shape.size);
        // Re-emitted values count toward the nesting limit where they land.
        self.check_depth(shape.nesting, tag)?;
        self.charge_expansion(shape.size, tag)?;
        self.emit(emit, &value, tag)?;
        Ok((value, shape))
    }
}

/// Largest scale magnitude accepted; it bounds the length of the plain form.
const MAX_DECIMAL_SCALE: u64 = 4096;

/// Renders `BigDecimal` text without an exponent, keeping its scale.
///
/// Returns `None` for anything but `[+-]digits[.digits][(e|E)[+-]digits]`.
fn plain_decimal(text: &str) -> Option<String> {
    let allowed = |b: u8| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E');
    if !text.bytes().all(allowed) {
        return None;
    }
    let decimal = BigDecimal::from_str(text).ok()?;
    let (_, scale) = decimal.as_bigint_and_exponent();
    if scale.unsigned_abs() > MAX_DECIMAL_SCALE {
        return None;
    }
    Some(decimal.to_plain_string())
}
