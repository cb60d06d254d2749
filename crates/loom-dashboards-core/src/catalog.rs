// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The static dashboard catalog.
//!
//! Static dashboards are read-only definitions sourced from a generated
//! template registry snapshot, with one legacy fallback template appended for
//! installations predating the registry. They are normalized and deduplicated
//! by key (first occurrence wins, so registry entries always shadow the
//! legacy fallback), and are never stored or mutated at runtime.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::definition::{
	normalize_definition, normalize_scope, DashboardDefinition, DashboardScope, SYSTEM_OWNER,
};
use crate::error::{DashboardsError, Result};
use crate::types::Visibility;

/// A raw template record as it appears in the registry snapshot.
///
/// Every field is optional; normalization decides what is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTemplate {
	pub template_key: Option<String>,
	pub key: Option<String>,
	pub pack_name: Option<String>,
	pub title: Option<String>,
	pub name: Option<String>,
	pub description: Option<Value>,
	pub version: Option<Value>,
	pub visibility: Option<Value>,
	pub scope: Option<Value>,
	pub definition: Option<Value>,
}

fn coerce_version(value: Option<&Value>) -> i64 {
	match value {
		Some(Value::Number(n)) => n
			.as_i64()
			.or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
			.unwrap_or(0),
		Some(Value::String(s)) => s
			.trim()
			.parse::<f64>()
			.ok()
			.filter(|f| f.is_finite())
			.map(|f| f as i64)
			.unwrap_or(0),
		_ => 0,
	}
}

fn coerce_description(value: Option<&Value>) -> Option<String> {
	match value {
		None | Some(Value::Null) => None,
		Some(Value::String(s)) => Some(s.clone()),
		Some(other) => Some(other.to_string()),
	}
}

/// Normalizes one raw template record into a static dashboard definition.
///
/// Records without a usable key or name, or with a definition that is not an
/// object, are rejected; the catalog builder skips them.
pub fn normalize_template(raw: &RawTemplate) -> Result<DashboardDefinition> {
	let key = raw
		.template_key
		.as_deref()
		.map(str::trim)
		.filter(|k| !k.is_empty())
		.or_else(|| raw.key.as_deref().map(str::trim).filter(|k| !k.is_empty()))
		.ok_or(DashboardsError::MissingTemplateKey)?
		.to_string();

	let pack_name = raw
		.pack_name
		.as_deref()
		.map(str::trim)
		.filter(|p| !p.is_empty());

	let name = raw
		.title
		.as_deref()
		.filter(|t| !t.is_empty())
		.or_else(|| raw.name.as_deref().filter(|n| !n.is_empty()))
		.unwrap_or(&key)
		.trim()
		.to_string();
	if name.is_empty() {
		return Err(DashboardsError::MissingTemplateName(key));
	}

	// Registry templates are public unless explicitly marked private.
	let visibility = match raw.visibility.as_ref().and_then(Value::as_str) {
		Some(v) if v.trim().eq_ignore_ascii_case("private") => Visibility::Private,
		_ => Visibility::Public,
	};

	let scope = normalize_scope(raw.scope.as_ref(), pack_name);
	let definition = normalize_definition(raw.definition.as_ref())?;

	Ok(DashboardDefinition {
		id: format!("static:{key}"),
		key,
		name,
		description: coerce_description(raw.description.as_ref()),
		owner_user_id: SYSTEM_OWNER.to_string(),
		is_system: true,
		visibility,
		scope,
		version: coerce_version(raw.version.as_ref()),
		definition,
		updated_at: Utc::now(),
	})
}

/// The fixed fallback template for installations predating the registry.
pub fn legacy_fallback_templates() -> Vec<RawTemplate> {
	vec![RawTemplate {
		template_key: Some("system.projects_kpi_catalog".to_string()),
		pack_name: Some("projects".to_string()),
		title: Some("All Project KPIs".to_string()),
		description: Some(json!(
			"KPI-only dashboard that shows every project-scoped metric (summed across projects)."
		)),
		version: Some(json!(0)),
		definition: Some(json!({
			"time": { "mode": "picker", "default": "last_30_days" },
			"layout": { "grid": { "cols": 12, "rowHeight": 36, "gap": 14 } },
			"widgets": [
				{
					"key": "kpi_catalog.project_metrics",
					"kind": "kpi_catalog",
					"title": "All Metrics (Auto-scoped totals)",
					"grid": { "x": 0, "y": 0, "w": 12, "h": 8 },
					"time": "inherit",
					"presentation": {
						"entityKind": "auto",
						"owner": { "kind": "feature_pack", "id": "projects" },
						"onlyWithPoints": false
					}
				}
			]
		})),
		..Default::default()
	}]
}

/// The resolved, deduplicated set of static dashboards.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
	dashboards: Vec<DashboardDefinition>,
}

impl StaticCatalog {
	/// Builds the catalog from registry templates. Registry entries are
	/// processed before the legacy fallback; on key collision the first
	/// occurrence wins. Unusable records are skipped.
	pub fn from_templates(registry: &[RawTemplate]) -> Self {
		let mut keys = std::collections::HashSet::new();
		let mut dashboards = Vec::new();

		let legacy = legacy_fallback_templates();
		for raw in registry.iter().chain(legacy.iter()) {
			let Ok(normalized) = normalize_template(raw) else {
				continue;
			};
			if !keys.insert(normalized.key.clone()) {
				continue;
			}
			dashboards.push(normalized);
		}

		Self { dashboards }
	}

	pub fn all(&self) -> &[DashboardDefinition] {
		&self.dashboards
	}

	/// Filters the catalog for one pack. Pack-scoped entries match by exact
	/// pack name; global entries are included only when `include_global` is
	/// set. An empty pack name returns the whole catalog.
	pub fn for_pack(&self, pack: &str, include_global: bool) -> Vec<&DashboardDefinition> {
		let pack = pack.trim();
		if pack.is_empty() {
			return self.dashboards.iter().collect();
		}
		self
			.dashboards
			.iter()
			.filter(|d| match &d.scope {
				DashboardScope::Pack { pack: p } => p == pack,
				DashboardScope::Global => include_global,
			})
			.collect()
	}

	pub fn by_key(&self, key: &str) -> Option<&DashboardDefinition> {
		let key = key.trim();
		if key.is_empty() {
			return None;
		}
		self.dashboards.iter().find(|d| d.key == key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.by_key(key).is_some()
	}

	pub fn len(&self) -> usize {
		self.dashboards.len()
	}

	pub fn is_empty(&self) -> bool {
		self.dashboards.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn template(key: &str, pack: Option<&str>) -> RawTemplate {
		RawTemplate {
			template_key: Some(key.to_string()),
			pack_name: pack.map(str::to_string),
			title: Some(format!("Template {key}")),
			..Default::default()
		}
	}

	#[test]
	fn empty_registry_still_has_legacy_fallback() {
		let catalog = StaticCatalog::from_templates(&[]);
		assert_eq!(catalog.len(), 1);
		let legacy = catalog.by_key("system.projects_kpi_catalog").unwrap();
		assert_eq!(legacy.name, "All Project KPIs");
		assert_eq!(legacy.owner_user_id, SYSTEM_OWNER);
		assert!(legacy.is_system);
		assert_eq!(legacy.scope.pack_name(), Some("projects"));
		assert_eq!(legacy.id, "static:system.projects_kpi_catalog");
	}

	#[test]
	fn registry_entry_shadows_legacy_fallback() {
		let mut shadow = template("system.projects_kpi_catalog", Some("projects"));
		shadow.title = Some("Registry Wins".to_string());
		let catalog = StaticCatalog::from_templates(&[shadow]);
		assert_eq!(catalog.len(), 1);
		assert_eq!(
			catalog.by_key("system.projects_kpi_catalog").unwrap().name,
			"Registry Wins"
		);
	}

	#[test]
	fn duplicate_keys_first_wins() {
		let mut first = template("system.overview", None);
		first.title = Some("First".to_string());
		let mut second = template("system.overview", None);
		second.title = Some("Second".to_string());
		let catalog = StaticCatalog::from_templates(&[first, second]);
		assert_eq!(catalog.by_key("system.overview").unwrap().name, "First");
		// legacy fallback plus the single deduplicated entry
		assert_eq!(catalog.len(), 2);
	}

	#[test]
	fn unusable_records_are_skipped() {
		let no_key = RawTemplate {
			title: Some("No key".to_string()),
			..Default::default()
		};
		let bad_definition = RawTemplate {
			template_key: Some("system.broken".to_string()),
			definition: Some(json!(17)),
			..Default::default()
		};
		let catalog = StaticCatalog::from_templates(&[no_key, bad_definition]);
		assert!(!catalog.contains_key("system.broken"));
		assert_eq!(catalog.len(), 1);
	}

	#[test]
	fn for_pack_filters_by_scope() {
		let catalog = StaticCatalog::from_templates(&[
			template("system.global_home", None),
			template("system.projects_summary", Some("projects")),
			template("system.sales_summary", Some("sales")),
		]);

		let projects = catalog.for_pack("projects", false);
		let keys: Vec<&str> = projects.iter().map(|d| d.key.as_str()).collect();
		// legacy fallback is projects-scoped too
		assert_eq!(keys, vec!["system.projects_summary", "system.projects_kpi_catalog"]);

		let with_global = catalog.for_pack("projects", true);
		assert!(with_global.iter().any(|d| d.key == "system.global_home"));
		assert!(!with_global.iter().any(|d| d.key == "system.sales_summary"));

		let everything = catalog.for_pack("  ", false);
		assert_eq!(everything.len(), catalog.len());
	}

	#[test]
	fn name_falls_back_from_title_to_name_to_key() {
		let titled = RawTemplate {
			template_key: Some("a".to_string()),
			title: Some("Title".to_string()),
			name: Some("Name".to_string()),
			..Default::default()
		};
		assert_eq!(normalize_template(&titled).unwrap().name, "Title");

		let named = RawTemplate {
			template_key: Some("a".to_string()),
			name: Some("Name".to_string()),
			..Default::default()
		};
		assert_eq!(normalize_template(&named).unwrap().name, "Name");

		let bare = RawTemplate {
			template_key: Some("a.b".to_string()),
			..Default::default()
		};
		assert_eq!(normalize_template(&bare).unwrap().name, "a.b");

		let blank_title = RawTemplate {
			template_key: Some("a".to_string()),
			title: Some("   ".to_string()),
			..Default::default()
		};
		assert!(normalize_template(&blank_title).is_err());
	}

	#[test]
	fn version_is_coerced_to_integer() {
		let mut raw = template("v", None);
		raw.version = Some(json!(3));
		assert_eq!(normalize_template(&raw).unwrap().version, 3);
		raw.version = Some(json!("7"));
		assert_eq!(normalize_template(&raw).unwrap().version, 7);
		raw.version = Some(json!("not a number"));
		assert_eq!(normalize_template(&raw).unwrap().version, 0);
		raw.version = None;
		assert_eq!(normalize_template(&raw).unwrap().version, 0);
	}

	#[test]
	fn visibility_defaults_public_unless_explicitly_private() {
		let mut raw = template("v", None);
		assert_eq!(normalize_template(&raw).unwrap().visibility, Visibility::Public);
		raw.visibility = Some(json!("private"));
		assert_eq!(normalize_template(&raw).unwrap().visibility, Visibility::Private);
		raw.visibility = Some(json!("internal"));
		assert_eq!(normalize_template(&raw).unwrap().visibility, Visibility::Public);
	}

	#[test]
	fn definition_accepts_json_string() {
		let mut raw = template("v", None);
		raw.definition = Some(json!("{\"widgets\":[{\"kind\":\"kpi\"}]}"));
		let normalized = normalize_template(&raw).unwrap();
		assert_eq!(normalized.definition["widgets"], json!([{ "kind": "kpi" }]));
		// defaults are filled in alongside parsed content
		assert!(normalized.definition["layout"].is_object());
		assert!(normalized.definition["time"].is_object());
	}

	#[test]
	fn key_prefers_template_key_then_key() {
		let raw = RawTemplate {
			template_key: Some("preferred".to_string()),
			key: Some("fallback".to_string()),
			..Default::default()
		};
		assert_eq!(normalize_template(&raw).unwrap().key, "preferred");

		let fallback = RawTemplate {
			key: Some("fallback".to_string()),
			..Default::default()
		};
		assert_eq!(normalize_template(&fallback).unwrap().key, "fallback");
	}
}
