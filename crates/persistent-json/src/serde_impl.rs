// Serialization into any serde data format. Map keys use their default
// field-name text; keywords serialize as their text and extensions as a
// two-element `[tag, payload]` sequence, matching `Encoder::new()`.

use serde::{
    Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};

use crate::{
    key::{Key, Keyword},
    value::Value,
};

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Keyword(k) => k.serialize(serializer),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.size()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Value::Extension(ext) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(ext.tag())?;
                seq.serialize_element(&ext.payload())?;
                seq.end()
            }
        }
    }
}

impl Serialize for Keyword {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Key::String(s) => serializer.serialize_str(s),
            Key::Keyword(k) => k.serialize(serializer),
            Key::Integer(n) => serializer.collect_str(n),
        }
    }
}
