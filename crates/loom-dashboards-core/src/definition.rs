// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dashboard definition documents and their normalization.
//!
//! A definition is a loosely-typed JSON configuration document. Callers may
//! supply partial or sloppily-shaped documents; normalization guarantees the
//! `time`, `layout`, and `widgets` sub-fields are always present with sane
//! defaults. Only a definition that is not a JSON object at all is rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{DashboardsError, Result};
use crate::types::{DashboardId, Visibility};

/// Owner sentinel for static/system dashboards.
pub const SYSTEM_OWNER: &str = "system";

/// Whether a dashboard is catalog-wide or bound to one feature pack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DashboardScope {
	Global,
	Pack { pack: String },
}

impl DashboardScope {
	/// The pack name, for pack-scoped dashboards.
	pub fn pack_name(&self) -> Option<&str> {
		match self {
			DashboardScope::Global => None,
			DashboardScope::Pack { pack } => Some(pack),
		}
	}
}

/// A stored dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
	pub id: DashboardId,
	/// Globally unique, stable identifier (e.g. `"system.company_overview"`),
	/// unique across static and stored dashboards combined.
	pub key: String,
	pub owner_user_id: String,
	/// True for template-derived, immutable, non-deletable dashboards.
	pub is_system: bool,
	pub name: String,
	pub description: Option<String>,
	pub visibility: Visibility,
	pub scope: DashboardScope,
	/// Config-language version (not renderer version).
	pub version: i64,
	/// The full dashboard config (layout + widgets + any future fields).
	pub definition: Value,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Dashboard {
	/// Converts a stored row into the uniform read model shared with the
	/// static catalog.
	pub fn into_definition(self) -> DashboardDefinition {
		DashboardDefinition {
			id: self.id.to_string(),
			key: self.key,
			name: self.name,
			description: self.description,
			owner_user_id: self.owner_user_id,
			is_system: self.is_system,
			visibility: self.visibility,
			scope: self.scope,
			version: self.version,
			definition: self.definition,
			updated_at: self.updated_at,
		}
	}
}

/// Uniform read model for a dashboard definition, whether it came from the
/// static catalog (`id = "static:{key}"`) or the store (`id = {uuid}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDefinition {
	pub id: String,
	pub key: String,
	pub name: String,
	pub description: Option<String>,
	pub owner_user_id: String,
	pub is_system: bool,
	pub visibility: Visibility,
	pub scope: DashboardScope,
	pub version: i64,
	pub definition: Value,
	pub updated_at: DateTime<Utc>,
}

/// Default grid layout for definitions that omit one.
pub fn default_layout() -> Value {
	json!({ "grid": { "cols": 12, "rowHeight": 36, "gap": 14 } })
}

/// Default time configuration for definitions that omit one.
pub fn default_time() -> Value {
	json!({ "mode": "picker", "default": "last_30_days" })
}

/// Normalizes a raw `scope` value.
///
/// An explicit `{kind: "global"}` wins; an explicit `{kind: "pack", pack}`
/// wins when the pack is non-empty; otherwise the fallback pack applies when
/// present, else global.
pub fn normalize_scope(input: Option<&Value>, fallback_pack: Option<&str>) -> DashboardScope {
	if let Some(Value::Object(obj)) = input {
		let kind = obj
			.get("kind")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.trim()
			.to_ascii_lowercase();
		if kind == "global" {
			return DashboardScope::Global;
		}
		if kind == "pack" {
			let pack = obj
				.get("pack")
				.and_then(Value::as_str)
				.map(str::trim)
				.filter(|p| !p.is_empty())
				.or(fallback_pack)
				.map(str::trim)
				.filter(|p| !p.is_empty());
			if let Some(pack) = pack {
				return DashboardScope::Pack {
					pack: pack.to_string(),
				};
			}
		}
	}
	match fallback_pack.map(str::trim).filter(|p| !p.is_empty()) {
		Some(pack) => DashboardScope::Pack {
			pack: pack.to_string(),
		},
		None => DashboardScope::Global,
	}
}

/// Normalizes a raw definition document.
///
/// Accepts a JSON-encoded string (parse failures fall through to treating the
/// string as-is, which then fails the object check), defaults an absent/null
/// value to `{}`, and rejects anything that does not end up as an object.
/// The returned object always carries `time`, `layout`, and `widgets`.
pub fn normalize_definition(input: Option<&Value>) -> Result<Value> {
	let mut value = match input {
		None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
		Some(v) => v.clone(),
	};

	if let Value::String(raw) = &value {
		let raw = raw.trim();
		if !raw.is_empty() {
			if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
				value = parsed;
			}
		}
	}
	if value.is_null() {
		value = Value::Object(serde_json::Map::new());
	}

	let Value::Object(mut obj) = value else {
		return Err(DashboardsError::DefinitionNotObject);
	};

	let widgets = match obj.get("widgets") {
		Some(Value::Array(w)) => Value::Array(w.clone()),
		_ => Value::Array(Vec::new()),
	};
	let layout = match obj.get("layout") {
		Some(Value::Object(l)) => Value::Object(l.clone()),
		_ => default_layout(),
	};
	let time = match obj.get("time") {
		Some(Value::Object(t)) => Value::Object(t.clone()),
		_ => default_time(),
	};

	obj.insert("widgets".to_string(), widgets);
	obj.insert("layout".to_string(), layout);
	obj.insert("time".to_string(), time);
	Ok(Value::Object(obj))
}

#[cfg(test)]
mod tests {
	use super::*;

	mod scope {
		use super::*;

		#[test]
		fn explicit_global_wins_over_fallback() {
			let input = json!({ "kind": "global" });
			assert_eq!(
				normalize_scope(Some(&input), Some("projects")),
				DashboardScope::Global
			);
		}

		#[test]
		fn explicit_pack_wins() {
			let input = json!({ "kind": "pack", "pack": "sales" });
			assert_eq!(
				normalize_scope(Some(&input), Some("projects")),
				DashboardScope::Pack { pack: "sales".into() }
			);
		}

		#[test]
		fn pack_kind_with_empty_pack_uses_fallback() {
			let input = json!({ "kind": "pack", "pack": "  " });
			assert_eq!(
				normalize_scope(Some(&input), Some("projects")),
				DashboardScope::Pack { pack: "projects".into() }
			);
		}

		#[test]
		fn missing_scope_uses_fallback_pack() {
			assert_eq!(
				normalize_scope(None, Some("projects")),
				DashboardScope::Pack { pack: "projects".into() }
			);
			assert_eq!(normalize_scope(None, None), DashboardScope::Global);
		}

		#[test]
		fn scope_serde_tagged_shape() {
			let global: DashboardScope = serde_json::from_value(json!({ "kind": "global" })).unwrap();
			assert_eq!(global, DashboardScope::Global);
			let pack: DashboardScope =
				serde_json::from_value(json!({ "kind": "pack", "pack": "projects" })).unwrap();
			assert_eq!(pack.pack_name(), Some("projects"));
			assert_eq!(
				serde_json::to_value(&global).unwrap(),
				json!({ "kind": "global" })
			);
		}
	}

	mod definition {
		use super::*;

		#[test]
		fn empty_input_gets_all_defaults() {
			let out = normalize_definition(None).unwrap();
			assert_eq!(out["widgets"], json!([]));
			assert_eq!(out["layout"], default_layout());
			assert_eq!(out["time"], default_time());
		}

		#[test]
		fn json_string_is_parsed() {
			let input = json!("{\"widgets\":[{\"kind\":\"kpi\"}]}");
			let out = normalize_definition(Some(&input)).unwrap();
			assert_eq!(out["widgets"], json!([{ "kind": "kpi" }]));
		}

		#[test]
		fn unparsable_string_is_rejected() {
			let input = json!("not json at all");
			assert!(matches!(
				normalize_definition(Some(&input)),
				Err(DashboardsError::DefinitionNotObject)
			));
			assert!(normalize_definition(Some(&json!(""))).is_err());
		}

		#[test]
		fn non_object_is_rejected() {
			assert!(normalize_definition(Some(&json!(42))).is_err());
			assert!(normalize_definition(Some(&json!([1, 2]))).is_err());
			assert!(normalize_definition(Some(&json!(true))).is_err());
		}

		#[test]
		fn existing_fields_are_preserved() {
			let input = json!({
				"time": { "mode": "fixed" },
				"layout": { "grid": { "cols": 6 } },
				"widgets": [{ "key": "w1" }],
				"extra": "kept"
			});
			let out = normalize_definition(Some(&input)).unwrap();
			assert_eq!(out["time"], json!({ "mode": "fixed" }));
			assert_eq!(out["layout"], json!({ "grid": { "cols": 6 } }));
			assert_eq!(out["widgets"], json!([{ "key": "w1" }]));
			assert_eq!(out["extra"], json!("kept"));
		}

		#[test]
		fn malformed_subfields_are_defaulted() {
			let input = json!({
				"time": "yesterday",
				"layout": [1, 2, 3],
				"widgets": { "not": "an array" }
			});
			let out = normalize_definition(Some(&input)).unwrap();
			assert_eq!(out["time"], default_time());
			assert_eq!(out["layout"], default_layout());
			assert_eq!(out["widgets"], json!([]));
		}
	}
}
