//! Terms: the single data model for events, trigger patterns and responses.
//!
//! A [`Term`] is either ground data (null, booleans, integers, strings,
//! sequences and string-keyed mappings) or contains [`Variable`]
//! placeholders. Live events are always ground; placeholders only occur in
//! trigger and response templates.

use super::variable::Variable;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Run-time type constraint carried by a [`Variable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermType {
    /// Accepts every ground term.
    Any,
    Null,
    Bool,
    Int,
    Str,
    Sequence,
    Mapping,
}

impl TermType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Str => "str",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tagged variant unifying values and patterns.
///
/// Equality is structural. Mappings compare equal regardless of key order,
/// and variables compare by identity.
///
/// # Example
///
/// ```rust
/// use efsm::core::{Term, TermType, Variable};
/// use efsm::mapping;
///
/// let i = Variable::new("i", TermType::Int);
/// let trigger = mapping! { "command" => "Start", "arg" => &i };
///
/// assert!(!trigger.is_ground());
/// assert_eq!(trigger.variables(), vec![&i]);
/// assert_eq!(trigger.to_string(), r#"{"command": "Start", "arg": ?i:int}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Term {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Sequence(Vec<Term>),
    Mapping(Mapping),
    /// Placeholders serialize for diagnostics but are never deserialized:
    /// decoded data is always ground.
    Variable(Variable),
}

impl Term {
    /// Build a mapping term from key/value pairs, preserving their order.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Term>,
        I: IntoIterator<Item = (K, V)>,
    {
        Term::Mapping(entries.into_iter().collect())
    }

    /// Build a sequence term.
    pub fn sequence<V, I>(items: I) -> Self
    where
        V: Into<Term>,
        I: IntoIterator<Item = V>,
    {
        Term::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// The ground kind of this term, or `None` for a variable.
    pub fn kind(&self) -> Option<TermType> {
        match self {
            Self::Null => Some(TermType::Null),
            Self::Bool(_) => Some(TermType::Bool),
            Self::Int(_) => Some(TermType::Int),
            Self::Str(_) => Some(TermType::Str),
            Self::Sequence(_) => Some(TermType::Sequence),
            Self::Mapping(_) => Some(TermType::Mapping),
            Self::Variable(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind().map_or("variable", |kind| kind.name())
    }

    /// True when no variable occurs anywhere inside this term.
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Variable(_) => false,
            Self::Sequence(items) => items.iter().all(Term::is_ground),
            Self::Mapping(mapping) => mapping.values().all(Term::is_ground),
            _ => true,
        }
    }

    /// Whether this term is a ground value of the given type.
    pub fn satisfies(&self, ty: TermType) -> bool {
        match self.kind() {
            Some(kind) => (ty == TermType::Any || ty == kind) && self.is_ground(),
            None => false,
        }
    }

    /// Every distinct variable occurring in this term, in first-occurrence order.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables<'a>(&'a self, found: &mut Vec<&'a Variable>) {
        match self {
            Self::Variable(var) => {
                if !found.contains(&var) {
                    found.push(var);
                }
            }
            Self::Sequence(items) => items.iter().for_each(|item| item.collect_variables(found)),
            Self::Mapping(mapping) => mapping
                .values()
                .for_each(|value| value.collect_variables(found)),
            _ => {}
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Look up a key when this term is a mapping.
    pub fn get(&self, key: &str) -> Option<&Term> {
        match self {
            Self::Mapping(mapping) => mapping.get(key),
            _ => None,
        }
    }

    /// Convert a ground term into JSON. Returns `None` if a variable remains.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value;

        Some(match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Int(value) => Value::from(*value),
            Self::Str(value) => Value::String(value.clone()),
            Self::Sequence(items) => Value::Array(
                items
                    .iter()
                    .map(Term::to_json)
                    .collect::<Option<Vec<_>>>()?,
            ),
            Self::Mapping(mapping) => {
                let mut object = serde_json::Map::new();
                for (key, value) in mapping {
                    object.insert(key.clone(), value.to_json()?);
                }
                Value::Object(object)
            }
            Self::Variable(_) => return None,
        })
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => write_quoted(f, value),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Mapping(mapping) => write!(f, "{mapping}"),
            Self::Variable(var) => write!(f, "{var}"),
        }
    }
}

/// Quote and escape text the way JSON does.
fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let quoted = serde_json::to_string(text).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

/// Numbers outside the `i64` range keep their JSON decimal text.
fn number_term(number: &serde_json::Number) -> Term {
    number
        .as_i64()
        .map_or_else(|| Term::Str(number.to_string()), Term::Int)
}

impl From<serde_json::Value> for Term {
    /// Numbers that do not fit an `i64` (floats, large unsigned values)
    /// are kept as their decimal text, exactly as when deserializing.
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Term::Null,
            Value::Bool(value) => Term::Bool(value),
            Value::Number(number) => number_term(&number),
            Value::String(value) => Term::Str(value),
            Value::Array(items) => Term::Sequence(items.into_iter().map(Term::from).collect()),
            Value::Object(object) => Term::Mapping(object.into_iter().collect()),
        }
    }
}

impl From<()> for Term {
    fn from(_: ()) -> Self {
        Term::Null
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Term::Bool(value)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Int(value)
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Term::Int(i64::from(value))
    }
}

impl From<u32> for Term {
    fn from(value: u32) -> Self {
        Term::Int(i64::from(value))
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::Str(value.to_string())
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term::Str(value)
    }
}

impl From<Variable> for Term {
    fn from(var: Variable) -> Self {
        Term::Variable(var)
    }
}

impl From<&Variable> for Term {
    fn from(var: &Variable) -> Self {
        Term::Variable(var.clone())
    }
}

impl From<Vec<Term>> for Term {
    fn from(items: Vec<Term>) -> Self {
        Term::Sequence(items)
    }
}

impl From<Mapping> for Term {
    fn from(mapping: Mapping) -> Self {
        Term::Mapping(mapping)
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TermVisitor;

        impl<'de> Visitor<'de> for TermVisitor {
            type Value = Term;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON-shaped value")
            }

            fn visit_unit<E>(self) -> Result<Term, E> {
                Ok(Term::Null)
            }

            fn visit_none<E>(self) -> Result<Term, E> {
                Ok(Term::Null)
            }

            fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Term, D::Error> {
                Term::deserialize(deserializer)
            }

            fn visit_bool<E>(self, value: bool) -> Result<Term, E> {
                Ok(Term::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Term, E> {
                Ok(Term::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Term, E> {
                Ok(number_term(&serde_json::Number::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Term, E> {
                Ok(serde_json::Number::from_f64(value)
                    .map_or_else(|| Term::Str(value.to_string()), |number| number_term(&number)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Term, E> {
                Ok(Term::Str(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Term, E> {
                Ok(Term::Str(value))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Term, A::Error> {
                let mut items = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(item) = access.next_element::<Term>()? {
                    items.push(item);
                }
                Ok(Term::Sequence(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Term, A::Error> {
                MappingVisitor.visit_map(access).map(Term::Mapping)
            }
        }

        deserializer.deserialize_any(TermVisitor)
    }
}

/// String-keyed mapping that preserves insertion order.
///
/// Keys are unique; inserting an existing key replaces its value in place.
/// Equality ignores key order.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    entries: Vec<(String, Term)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a value, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Term>) -> Option<Term> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Term> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> MappingIter<'_> {
        MappingIter {
            inner: self.entries.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &Term> {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for Mapping {}

impl<K: Into<String>, V: Into<Term>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

/// Borrowing iterator over the entries of a [`Mapping`], in insertion order.
pub struct MappingIter<'a> {
    inner: std::slice::Iter<'a, (String, Term)>,
}

impl<'a> Iterator for MappingIter<'a> {
    type Item = (&'a String, &'a Term);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a String, &'a Term);
    type IntoIter = MappingIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (key, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, key)?;
            write!(f, ": {value}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct MappingVisitor;

impl<'de> Visitor<'de> for MappingVisitor {
    type Value = Mapping;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string-keyed map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Mapping, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((key, value)) = access.next_entry::<String, Term>()? {
            mapping.insert(key, value);
        }
        Ok(mapping)
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MappingVisitor)
    }
}
