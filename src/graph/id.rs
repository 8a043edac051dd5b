//! Canonical node identifiers.
//!
//! The backend hands out ids as JSON numbers or as numeric-looking strings,
//! sometimes both for the same node. Everything past the wire boundary uses
//! [`NodeId`], which stores one canonical text form so `3` and `"3"` compare
//! equal.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Largest float magnitude that still converts to an exact integer id.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Integral floats print as integers; other floats keep their shortest form.
fn canonical_float(f: f64) -> String {
	if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT {
		(f as i64).to_string()
	} else {
		f.to_string()
	}
}

/// A normalized node identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
	/// Normalize a textual id. Numeric text becomes the same form the JSON
	/// number would, so `"3"`, `"3.0"` and `3` agree. Anything else keeps its
	/// trimmed text. Blank text is not an id.
	pub fn parse(raw: &str) -> Option<Self> {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			return None;
		}
		if let Ok(n) = trimmed.parse::<i64>() {
			return Some(Self(n.to_string()));
		}
		if let Ok(n) = trimmed.parse::<u64>() {
			return Some(Self(n.to_string()));
		}
		match trimmed.parse::<f64>() {
			Ok(f) if f.is_finite() => Some(Self(canonical_float(f))),
			_ => Some(Self(trimmed.to_owned())),
		}
	}

	/// Normalize an id as it appears in a JSON payload.
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					return Some(Self(i.to_string()));
				}
				if let Some(u) = n.as_u64() {
					return Some(Self(u.to_string()));
				}
				n.as_f64().map(|f| Self(canonical_float(f)))
			}
			Value::String(s) => Self::parse(s),
			// Links that were already bound to node objects carry them inline.
			Value::Object(map) => map.get("id").and_then(Self::from_value),
			_ => None,
		}
	}

	/// The canonical text.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The integer value, when the id is numeric.
	pub fn as_integer(&self) -> Option<i64> {
		self.0.parse().ok()
	}
}

impl From<i64> for NodeId {
	fn from(n: i64) -> Self {
		Self(n.to_string())
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Serialize for NodeId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self.as_integer() {
			Some(n) => serializer.serialize_i64(n),
			None => serializer.serialize_str(&self.0),
		}
	}
}

impl<'de> Deserialize<'de> for NodeId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = Value::deserialize(deserializer)?;
		Self::from_value(&value).ok_or_else(|| D::Error::custom(format!("invalid node id: {value}")))
	}
}
