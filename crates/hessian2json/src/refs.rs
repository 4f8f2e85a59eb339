//! Per-message reference and class-definition tables.
//!
//! Both tables are append-only for the duration of one top-level decode and
//! are cleared before the next one. Entries are addressed by insertion order.

use std::sync::Arc;

use crate::value::Value;

/// Size and depth of a decoded value, maintained as the value is built so a
/// back-reference can be checked without walking the shared tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Shape {
    /// One unit per value plus one per byte of string or decimal text.
    pub(crate) size: usize,
    /// Levels of lists and maps: `0` for scalars.
    pub(crate) nesting: usize,
}

impl Shape {
    /// An empty list or map.
    pub(crate) const CONTAINER: Self = Self {
        size: 1,
        nesting: 1,
    };

    pub(crate) fn scalar(value: &Value) -> Self {
        let text = match value {
            Value::String(s) | Value::Decimal(s) => s.len(),
            _ => 0,
        };
        Self {
            size: 1 + text,
            nesting: 0,
        }
    }

    fn add_child(&mut self, child: Self) {
        self.size = self.size.saturating_add(child.size);
        self.nesting = self.nesting.max(child.nesting + 1);
    }
}

/// Arena of decoded lists, maps and reduced objects, indexed by decode order.
///
/// A container is registered before its children are decoded and filled in
/// place, so a back-reference to it from inside itself sees the elements
/// decoded up to that point.
#[derive(Debug, Default)]
pub(crate) struct RefTable {
    entries: Vec<(Value, Shape)>,
}

impl RefTable {
    pub(crate) fn push(&mut self, value: Value, shape: Shape) -> usize {
        self.entries.push((value, shape));
        self.entries.len() - 1
    }

    pub(crate) fn get(&self, index: usize) -> Option<&(Value, Shape)> {
        self.entries.get(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current state of an entry; cheap because containers are shared.
    pub(crate) fn snapshot(&self, index: usize) -> (Value, Shape) {
        self.entries
            .get(index)
            .cloned()
            .unwrap_or((Value::Null, Shape::scalar(&Value::Null)))
    }

    /// Appends an element to the list registered at `index`.
    ///
    /// Copy-on-write: snapshots handed out earlier keep their contents.
    pub(crate) fn push_element(&mut self, index: usize, (element, shape): (Value, Shape)) {
        let entry = self.entries.get_mut(index);
        debug_assert!(matches!(entry, Some((Value::List(..), _))), "ref {index} is not a list");
        if let Some((Value::List(items), total)) = entry {
            Arc::make_mut(items).push(element);
            total.add_child(shape);
        }
    }

    /// Appends an entry to the map registered at `index`.
    pub(crate) fn push_entry(
        &mut self,
        index: usize,
        (key, key_shape): (Value, Shape),
        (value, value_shape): (Value, Shape),
    ) {
        let entry = self.entries.get_mut(index);
        debug_assert!(matches!(entry, Some((Value::Map(..), _))), "ref {index} is not a map");
        if let Some((Value::Map(entries), total)) = entry {
            Arc::make_mut(entries).push((key, value));
            total.add_child(key_shape);
            total.add_child(value_shape);
        }
    }
}

/// Scalar types that may arrive as compact objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducedKind {
    /// `java.math.BigDecimal`, carried as its string form.
    Decimal,
    /// `java.sql.Timestamp`, `java.sql.Date` or `java.sql.Time`, carried as
    /// a date.
    Timestamp,
}

/// A declared type name and its field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    /// Fully qualified type name.
    pub type_name: String,
    /// Field names in declaration order.
    pub field_names: Vec<String>,
}

impl ClassDefinition {
    /// The scalar this type collapses to, if it is one of the supported ones.
    #[must_use]
    pub fn reduced_kind(&self) -> Option<ReducedKind> {
        match self.type_name.as_str() {
            "java.math.BigDecimal" => Some(ReducedKind::Decimal),
            "java.sql.Timestamp" | "java.sql.Date" | "java.sql.Time" => {
                Some(ReducedKind::Timestamp)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ClassDefTable {
    definitions: Vec<ClassDefinition>,
}

impl ClassDefTable {
    pub(crate) fn push(&mut self, definition: ClassDefinition) -> usize {
        self.definitions.push(definition);
        self.definitions.len() - 1
    }

    pub(crate) fn get(&self, index: usize) -> Option<&ClassDefinition> {
        self.definitions.get(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.definitions.len()
    }

    pub(crate) fn clear(&mut self) {
        self.definitions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{List, Map};

    fn scalar(value: Value) -> (Value, Shape) {
        let shape = Shape::scalar(&value);
        (value, shape)
    }

    #[test]
    fn snapshot_is_frozen_when_list_grows() {
        let mut refs = RefTable::default();
        let index = refs.push(Value::from(List::new()), Shape::CONTAINER);
        refs.push_element(index, scalar(Value::Int(1)));
        let snapshot = refs.snapshot(index);
        refs.push_element(index, snapshot.clone());

        assert_eq!(snapshot.0.to_string(), "[1]");
        assert_eq!(refs.snapshot(index).0.to_string(), "[1,[1]]");
    }

    #[test]
    fn maps_fill_in_place() {
        let mut refs = RefTable::default();
        let outer = refs.push(Value::from(Map::new()), Shape::CONTAINER);
        let inner = refs.push(Value::from(List::new()), Shape::CONTAINER);
        refs.push_element(inner, scalar(Value::Bool(true)));
        refs.push_entry(outer, scalar(Value::from("xs")), refs.snapshot(inner));

        assert_eq!(refs.len(), 2);
        assert_eq!(refs.snapshot(outer).0.to_string(), r#"{"xs":[true]}"#);
        assert_eq!(refs.get(2), None);
        assert_eq!(refs.snapshot(7).0, Value::Null);
    }

    #[test]
    fn shapes_track_size_and_nesting() {
        let mut refs = RefTable::default();
        let outer = refs.push(Value::from(List::new()), Shape::CONTAINER);
        let inner = refs.push(Value::from(Map::new()), Shape::CONTAINER);
        refs.push_entry(inner, scalar(Value::from("key")), scalar(Value::Int(7)));
        refs.push_element(outer, refs.snapshot(inner));
        refs.push_element(outer, refs.snapshot(inner));

        assert_eq!(refs.snapshot(inner).1, Shape { size: 6, nesting: 1 });
        assert_eq!(refs.snapshot(outer).1, Shape { size: 13, nesting: 2 });
        assert_eq!(Shape::scalar(&Value::Decimal("1.50".into())).size, 5);
    }

    #[test]
    fn reduced_kinds() {
        let def = |name: &str| ClassDefinition {
            type_name: name.to_owned(),
            field_names: vec!["value".to_owned()],
        };
        assert_eq!(def("java.math.BigDecimal").reduced_kind(), Some(ReducedKind::Decimal));
        assert_eq!(def("java.sql.Time").reduced_kind(), Some(ReducedKind::Timestamp));
        assert_eq!(def("java.util.Date").reduced_kind(), None);
        assert_eq!(def("com.example.User").reduced_kind(), None);
    }

    #[test]
    fn class_table_is_indexed_by_declaration_order() {
        let mut defs = ClassDefTable::default();
        let first = defs.push(ClassDefinition {
            type_name: "a".into(),
            field_names: vec![],
        });
        let second = defs.push(ClassDefinition {
            type_name: "b".into(),
            field_names: vec![],
        });
        assert_eq!((first, second), (0, 1));
        assert_eq!(defs.get(1).map(|d| d.type_name.as_str()), Some("b"));
        defs.clear();
        assert_eq!(defs.len(), 0);
    }
}
