// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Loom dashboards system.
//!
//! This crate provides the shared vocabulary for dashboard access control and
//! the catalog of static dashboards. It is used by the server-side services
//! (`loom-server-dashboards`) and contains no IO: everything here is a pure
//! type or a pure function over loosely-typed configuration documents.
//!
//! # Overview
//!
//! - Typed action keys for the external authorization provider
//!   ([`ActionKey`], [`ScopeVerb`], [`ScopeMode`]) with the canonical
//!   restrictiveness probe order
//! - Share principals and grants ([`PrincipalType`], [`SharePermission`],
//!   [`DashboardShare`])
//! - Dashboard definition documents and their normalization
//!   ([`Dashboard`], [`DashboardDefinition`], [`normalize_definition`])
//! - The static template catalog ([`StaticCatalog`]) with first-wins
//!   key deduplication
//! - Report block normalization ([`normalize_pie_block`])
//!
//! # Example
//!
//! ```
//! use loom_dashboards_core::{ActionKey, ScopeEntity, ScopeMode, ScopeVerb};
//!
//! let key = ActionKey::scope(ScopeVerb::Write, Some(ScopeEntity::Dashboards), ScopeMode::Own);
//! assert_eq!(key.as_str(), "dashboard-core.dashboards.write.scope.own");
//! ```

pub mod action;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod identity;
pub mod report_block;
pub mod share;
pub mod types;

pub use action::{
	scope_probe_plan, ActionKey, ScopeEntity, ScopeMode, ScopeVerb, ACTION_NAMESPACE,
};
pub use catalog::{legacy_fallback_templates, normalize_template, RawTemplate, StaticCatalog};
pub use definition::{
	default_layout, default_time, normalize_definition, normalize_scope, Dashboard,
	DashboardDefinition, DashboardScope, SYSTEM_OWNER,
};
pub use error::{DashboardsError, Result};
pub use identity::Identity;
pub use report_block::{
	normalize_pie_block, Aggregation, Bucket, MetricsQuery, PieReportBlock, ReportBlock, TimeMode,
	ValueFormat,
};
pub use share::DashboardShare;
pub use types::{
	DashboardId, OrgUnitType, PrincipalType, ShareCategory, ShareId, SharePermission, Visibility,
};

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn arb_verb() -> impl Strategy<Value = ScopeVerb> {
		prop_oneof![
			Just(ScopeVerb::Read),
			Just(ScopeVerb::Write),
			Just(ScopeVerb::Delete),
		]
	}

	fn arb_mode() -> impl Strategy<Value = ScopeMode> {
		prop_oneof![
			Just(ScopeMode::None),
			Just(ScopeMode::Own),
			Just(ScopeMode::Ldd),
			Just(ScopeMode::All),
		]
	}

	proptest! {
		#[test]
		fn action_keys_stay_in_namespace(verb in arb_verb(), mode in arb_mode(), entity in any::<bool>()) {
			let entity = entity.then_some(ScopeEntity::Dashboards);
			let key = ActionKey::scope(verb, entity, mode);
			prop_assert!(key.as_str().starts_with("dashboard-core."));
			prop_assert!(key.as_str().ends_with(mode.as_str()));
		}

		#[test]
		fn probe_plan_respects_restrictiveness_order(verb in arb_verb(), entity in any::<bool>()) {
			let entity = entity.then_some(ScopeEntity::Dashboards);
			let plan = scope_probe_plan(verb, entity);
			// each prefix block walks none -> own -> ldd -> all
			for block in plan.chunks(4) {
				let modes: Vec<ScopeMode> = block.iter().map(|(m, _)| *m).collect();
				prop_assert_eq!(modes.as_slice(), ScopeMode::PROBE_ORDER.as_slice());
			}
		}

		#[test]
		fn catalog_never_contains_duplicate_keys(keys in proptest::collection::vec("[a-z]{1,6}", 0..12)) {
			let templates: Vec<RawTemplate> = keys
				.iter()
				.map(|k| RawTemplate {
					template_key: Some(k.clone()),
					title: Some(format!("T {k}")),
					..Default::default()
				})
				.collect();
			let catalog = StaticCatalog::from_templates(&templates);
			let mut seen = std::collections::HashSet::new();
			for dashboard in catalog.all() {
				prop_assert!(seen.insert(dashboard.key.clone()));
			}
		}

		#[test]
		fn normalized_top_n_is_always_in_range(n in any::<i64>()) {
			let block = normalize_pie_block(&serde_json::json!({ "topN": n }));
			prop_assert!((1..=25).contains(&block.top_n));
		}
	}
}
