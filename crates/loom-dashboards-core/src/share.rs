// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ACL share entries attached to dashboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::types::{DashboardId, PrincipalType, ShareId, SharePermission};

/// One ACL grant attached to exactly one dashboard.
///
/// The row's identity is the `(dashboard_id, principal_type, principal_id)`
/// tuple; re-granting the same tuple updates `permission` and the audit
/// fields, never duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardShare {
	pub id: ShareId,
	pub dashboard_id: DashboardId,
	pub principal_type: PrincipalType,
	/// Interpretation depends on `principal_type` (user id, group/role id,
	/// or org-unit id).
	pub principal_id: String,
	pub permission: SharePermission,
	/// Audit: the acting subject at write time.
	pub shared_by: String,
	pub shared_by_name: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl DashboardShare {
	/// Builds a fresh share row for an upsert, stamped with the acting
	/// identity's audit fields.
	pub fn new(
		dashboard_id: DashboardId,
		principal_type: PrincipalType,
		principal_id: impl Into<String>,
		permission: SharePermission,
		shared_by: &Identity,
	) -> Self {
		Self {
			id: ShareId::generate(),
			dashboard_id,
			principal_type,
			principal_id: principal_id.into(),
			permission,
			shared_by: shared_by.subject_id.clone(),
			shared_by_name: Some(shared_by.audit_name()),
			created_at: Utc::now(),
		}
	}

	/// Whether this share grants access to the given identity, either
	/// directly (user principal) or through one of its groups.
	pub fn applies_to(&self, identity: &Identity) -> bool {
		match self.principal_type.category() {
			crate::types::ShareCategory::User => self.principal_id == identity.subject_id,
			crate::types::ShareCategory::Group => {
				identity.groups.iter().any(|g| g == &self.principal_id)
			}
			// Org-unit membership needs the directory; callers resolve it
			// through the org-scope capability instead.
			crate::types::ShareCategory::Ldd => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_share_stamps_audit_fields() {
		let caller = Identity::new("u1")
			.with_email("u1@example.com")
			.with_name("User One");
		let share = DashboardShare::new(
			DashboardId::generate(),
			PrincipalType::User,
			"u2",
			SharePermission::View,
			&caller,
		);
		assert_eq!(share.shared_by, "u1");
		assert_eq!(share.shared_by_name.as_deref(), Some("User One"));
		assert_eq!(share.permission, SharePermission::View);
	}

	#[test]
	fn applies_to_matches_user_and_group() {
		let dashboard_id = DashboardId::generate();
		let owner = Identity::new("owner");
		let user_share = DashboardShare::new(
			dashboard_id,
			PrincipalType::User,
			"u2",
			SharePermission::View,
			&owner,
		);
		assert!(user_share.applies_to(&Identity::new("u2")));
		assert!(!user_share.applies_to(&Identity::new("u3")));

		let group_share = DashboardShare::new(
			dashboard_id,
			PrincipalType::Group,
			"g1",
			SharePermission::View,
			&owner,
		);
		assert!(group_share.applies_to(&Identity::new("u3").with_group("g1")));
		assert!(!group_share.applies_to(&Identity::new("u3")));

		let ldd_share = DashboardShare::new(
			dashboard_id,
			PrincipalType::Location,
			"loc-1",
			SharePermission::View,
			&owner,
		);
		assert!(!ldd_share.applies_to(&Identity::new("u3").with_group("loc-1")));
	}
}
