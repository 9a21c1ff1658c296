// CurveMsg, Curve25519 and Ed25519 operations over structured messages
// Copyright (C) 2025 A. Russon
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Structured messages exchanged with the host.
//!
//! A message is a mapping from field names to loosely typed values, as
//! delivered by the transport. Nothing here checks that a message makes
//! sense as a request; see [`crate::request`].

use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    de::{
        Error as DeError,
        MapAccess,
        SeqAccess,
        Visitor,
        value::MapAccessDeserializer
    }
};
use zeroize::Zeroize;

use crate::errors::{
    Error,
    Result
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Str(String),
    Bytes(Vec<u8>),
    Other(serde_json::Value)
}

// Byte buffers are filled in place, without an intermediate JSON tree that
// would keep a copy of private keys.
struct ValueVisitor;

// keys and signatures fit without reallocation
const BYTES_CAPACITY: usize = 64;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "a message field value")
    }

    fn visit_bool<E>(self, v: bool) -> core::result::Result<Value, E>
    where
        E: DeError
    {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> core::result::Result<Value, E>
    where
        E: DeError
    {
        Ok(Value::Int(v))
    }

    fn visit_u64<E>(self, v: u64) -> core::result::Result<Value, E>
    where
        E: DeError
    {
        match i64::try_from(v) {
            Ok(i) => Ok(Value::Int(i)),
            Err(_) => Ok(Value::UInt(v))
        }
    }

    fn visit_f64<E>(self, v: f64) -> core::result::Result<Value, E>
    where
        E: DeError
    {
        Ok(Value::Other(serde_json::Value::from(v)))
    }

    fn visit_str<E>(self, v: &str) -> core::result::Result<Value, E>
    where
        E: DeError
    {
        Ok(Value::Str(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> core::result::Result<Value, E>
    where
        E: DeError
    {
        Ok(Value::Str(v))
    }

    fn visit_unit<E>(self) -> core::result::Result<Value, E>
    where
        E: DeError
    {
        Ok(Value::Other(serde_json::Value::Null))
    }

    fn visit_none<E>(self) -> core::result::Result<Value, E>
    where
        E: DeError
    {
        Ok(Value::Other(serde_json::Value::Null))
    }

    fn visit_seq<A>(self, mut seq: A) -> core::result::Result<Value, A::Error>
    where
        A: SeqAccess<'de>
    {
        let mut bytes = Vec::with_capacity(BYTES_CAPACITY);
        while let Some(element) = seq.next_element::<serde_json::Value>()? {
            match element.as_u64().and_then(|b| u8::try_from(b).ok()) {
                Some(b) => bytes.push(b),
                None => {
                    // not a buffer, keep the array as it is
                    let mut array = bytes
                        .iter()
                        .map(|b| serde_json::Value::from(*b))
                        .collect::<Vec<_>>();
                    bytes.zeroize();
                    array.push(element);
                    while let Some(element) = seq.next_element()? {
                        array.push(element);
                    }
                    return Ok(Value::Other(serde_json::Value::Array(array)));
                }
            }
        }
        Ok(Value::Bytes(bytes))
    }

    fn visit_map<A>(self, map: A) -> core::result::Result<Value, A::Error>
    where
        A: MapAccess<'de>
    {
        let object = serde_json::Value::deserialize(MapAccessDeserializer::new(map))?;
        Ok(Value::Other(object))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<CallId> for Value {
    fn from(value: CallId) -> Self {
        match value {
            CallId::Int(i) => Self::Int(i),
            CallId::UInt(u) => Self::UInt(u)
        }
    }
}

/// Correlation token chosen by the caller, echoed untouched.
///
/// Integers above `i64::MAX` keep their unsigned representation so that the
/// echoed value is exactly the received one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallId {
    Int(i64),
    UInt(u64)
}

impl CallId {
    pub(crate) fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(Self::Int(*i)),
            Value::UInt(u) => Ok(Self::UInt(*u)),
            _ => Err(Error::InvalidCallId)
        }
    }
}

impl From<i64> for CallId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for CallId {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Self::Int(i),
            Err(_) => Self::UInt(value)
        }
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}")
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(BTreeMap<String, Value>);

impl Message {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Message {
    fn from(fields: [(&str, Value); N]) -> Self {
        let mut message = Self::new();
        for (field, value) in fields {
            message.insert(field, value);
        }
        message
    }
}

// byte buffers may carry private keys or shared secrets
impl Zeroize for Message {
    fn zeroize(&mut self) {
        for value in self.0.values_mut() {
            if let Value::Bytes(bytes) = value {
                bytes.zeroize();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_values() {
        let message: Message = serde_json::from_str(
            r#"{"a":[1,2,255],"b":[1,256,"x"],"c":{"d":[1]},"e":null,"f":-3,"g":[]}"#
        ).unwrap();
        assert_eq!(message.get("a"), Some(&Value::Bytes(vec![1, 2, 255])));
        assert_eq!(
            message.get("b"),
            Some(&Value::Other(serde_json::json!([1, 256, "x"])))
        );
        assert_eq!(
            message.get("c"),
            Some(&Value::Other(serde_json::json!({"d": [1]})))
        );
        assert_eq!(message.get("e"), Some(&Value::Other(serde_json::Value::Null)));
        assert_eq!(message.get("f"), Some(&Value::Int(-3)));
        assert_eq!(message.get("g"), Some(&Value::Bytes(vec![])));

        // large buffers grow past the initial capacity
        let long = serde_json::to_string(&vec![7u8; 1000]).unwrap();
        let value: Value = serde_json::from_str(&long).unwrap();
        assert_eq!(value, Value::Bytes(vec![7u8; 1000]));
    }

    #[test]
    fn test_zeroize_buffers() {
        let mut message = Message::from([
            ("priv", Value::Bytes(vec![0xaa; 32])),
            ("command", Value::from("bytesToPriv"))
        ]);
        message.zeroize();
        assert_eq!(message.get("priv"), Some(&Value::Bytes(vec![])));
        assert_eq!(message.get("command"), Some(&Value::from("bytesToPriv")));
    }

    #[test]
    fn test_call_id_from_u64() {
        assert_eq!(CallId::from(7u64), CallId::Int(7));
        assert_eq!(CallId::from(i64::MAX as u64), CallId::Int(i64::MAX));
        assert_eq!(CallId::from(u64::MAX), CallId::UInt(u64::MAX));
        assert_eq!(CallId::UInt(u64::MAX).to_string(), "18446744073709551615");
    }

    #[test]
    fn test_call_id_from_value() {
        assert_eq!(CallId::from_value(&Value::Int(-3)).unwrap(), CallId::Int(-3));
        assert!(matches!(
            CallId::from_value(&Value::from("3")),
            Err(Error::InvalidCallId)
        ));
        assert!(CallId::from_value(&Value::Bool(true)).is_err());
    }

    #[test]
    fn test_message_fields() {
        let mut message = Message::from([
            ("command", Value::from("privToPub")),
            ("call_id", Value::Int(1))
        ]);
        assert_eq!(message.len(), 2);
        assert!(message.contains("command"));
        message.insert("priv", vec![0u8; 32]);
        assert_eq!(message.fields().collect::<Vec<_>>(), ["call_id", "command", "priv"]);
        assert_eq!(message.remove("call_id"), Some(Value::Int(1)));
        assert!(!message.contains("call_id"));
    }
}
