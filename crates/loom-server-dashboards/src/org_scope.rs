// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The org-scope capability.
//!
//! An org scope is the set of organizational units (locations, divisions,
//! departments) a caller may act within. Resolving it, and answering whether
//! a given user belongs to it, requires the directory and lives behind the
//! [`OrgScopeResolver`] trait; unit-id membership is a pure set lookup.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use loom_dashboards_core::{Identity, OrgUnitType};

use crate::error::Result;

/// The organizational units a caller is authorized to act within.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgScope {
	pub locations: HashSet<String>,
	pub divisions: HashSet<String>,
	pub departments: HashSet<String>,
}

impl OrgScope {
	/// Whether the given org-unit id falls inside this scope.
	pub fn contains_unit(&self, unit_type: OrgUnitType, unit_id: &str) -> bool {
		match unit_type {
			OrgUnitType::Location => self.locations.contains(unit_id),
			OrgUnitType::Division => self.divisions.contains(unit_id),
			OrgUnitType::Department => self.departments.contains(unit_id),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.locations.is_empty() && self.divisions.is_empty() && self.departments.is_empty()
	}
}

/// External resolver for org scopes and directory membership.
#[async_trait]
pub trait OrgScopeResolver: Send + Sync {
	/// Resolves the caller's org scope. Failures surface as
	/// [`crate::DashboardsServerError::Upstream`]; callers fold them into
	/// the empty scope (fail closed).
	async fn resolve_scope(&self, identity: &Identity) -> Result<OrgScope>;

	/// Whether the given user belongs to any unit inside the scope.
	async fn is_user_in_scope(&self, user_id: &str, scope: &OrgScope) -> Result<bool>;

	/// Whether the given org-unit id falls inside the scope. Pure set
	/// membership; no directory round-trip.
	fn is_org_unit_in_scope(&self, unit_type: OrgUnitType, unit_id: &str, scope: &OrgScope) -> bool {
		scope.contains_unit(unit_type, unit_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn contains_unit_checks_the_matching_set() {
		let scope = OrgScope {
			locations: ["loc-1".to_string()].into_iter().collect(),
			divisions: ["div-1".to_string()].into_iter().collect(),
			departments: HashSet::new(),
		};
		assert!(scope.contains_unit(OrgUnitType::Location, "loc-1"));
		assert!(!scope.contains_unit(OrgUnitType::Division, "loc-1"));
		assert!(scope.contains_unit(OrgUnitType::Division, "div-1"));
		assert!(!scope.contains_unit(OrgUnitType::Department, "div-1"));
	}

	#[test]
	fn default_scope_is_empty() {
		let scope = OrgScope::default();
		assert!(scope.is_empty());
		assert!(!scope.contains_unit(OrgUnitType::Location, "anything"));
	}
}
