// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Template registry snapshot loading.
//!
//! The registry is a generated JSON snapshot (`{ "templates": [...] }`)
//! produced at build time. An absent or unreadable snapshot is not an error:
//! the catalog then consists of the legacy fallback alone.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

use loom_dashboards_core::{RawTemplate, StaticCatalog};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RegistrySnapshot {
	templates: Vec<RawTemplate>,
}

/// Point-in-time reader for the generated template registry.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
	path: PathBuf,
}

impl TemplateRegistry {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Loads the raw template records. Missing or unparsable snapshots yield
	/// the empty list.
	pub fn load(&self) -> Vec<RawTemplate> {
		let raw = match std::fs::read_to_string(&self.path) {
			Ok(raw) => raw,
			Err(err) => {
				debug!(path = %self.path.display(), error = %err, "no template registry snapshot");
				return Vec::new();
			}
		};
		match serde_json::from_str::<RegistrySnapshot>(&raw) {
			Ok(snapshot) => snapshot.templates,
			Err(err) => {
				warn!(path = %self.path.display(), error = %err, "ignoring unparsable template registry snapshot");
				Vec::new()
			}
		}
	}

	/// Loads and resolves the full static catalog.
	pub fn load_catalog(&self) -> StaticCatalog {
		StaticCatalog::from_templates(&self.load())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn missing_snapshot_yields_legacy_only_catalog() {
		let registry = TemplateRegistry::new("/nonexistent/dashboard-templates.json");
		assert!(registry.load().is_empty());

		let catalog = registry.load_catalog();
		assert_eq!(catalog.len(), 1);
		assert!(catalog.contains_key("system.projects_kpi_catalog"));
	}

	#[test]
	fn snapshot_templates_are_loaded() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"{{
				"generatedAt": "2025-06-01T00:00:00Z",
				"templates": [
					{{ "templateKey": "system.company_overview", "title": "Company Overview", "packName": "company" }},
					{{ "templateKey": "system.sales_funnel", "title": "Sales Funnel", "scope": {{ "kind": "global" }} }}
				]
			}}"#
		)
		.unwrap();

		let registry = TemplateRegistry::new(file.path());
		let catalog = registry.load_catalog();
		assert!(catalog.contains_key("system.company_overview"));
		assert_eq!(
			catalog
				.by_key("system.company_overview")
				.unwrap()
				.scope
				.pack_name(),
			Some("company")
		);
		assert!(catalog.contains_key("system.sales_funnel"));
		// registry entries plus the legacy fallback
		assert_eq!(catalog.len(), 3);
	}

	#[test]
	fn corrupt_snapshot_is_ignored() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "{{ not json").unwrap();

		let registry = TemplateRegistry::new(file.path());
		assert!(registry.load().is_empty());
		assert_eq!(registry.load_catalog().len(), 1);
	}
}
