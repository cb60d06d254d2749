// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Share management: who may list, create, and delete ACL entries on a
//! dashboard, and which share targets are permissible.
//!
//! Share management always requires write-level scope for the `dashboards`
//! entity, regardless of the verb of the surrounding operation, and is an
//! owner-only capability under every scope mode except `none`, which blocks
//! everyone including the owner.

use std::sync::Arc;

use tracing::{instrument, warn};

use loom_dashboards_core::{
	ActionKey, Dashboard, DashboardShare, Identity, PrincipalType, ScopeEntity, ScopeMode,
	ScopeVerb, ShareCategory, SharePermission,
};

use crate::authz::{ActionChecker, ActionDecision};
use crate::error::{DashboardsServerError, Result};
use crate::org_scope::{OrgScope, OrgScopeResolver};
use crate::repository::DashboardsRepository;
use crate::scope::ScopeResolver;

/// Enforces the sharing rules for a dashboard addressed by key.
#[derive(Clone)]
pub struct ShareManager {
	checker: Arc<dyn ActionChecker>,
	scope: ScopeResolver,
	org_scope: Arc<dyn OrgScopeResolver>,
	repository: Arc<dyn DashboardsRepository>,
}

impl ShareManager {
	pub fn new(
		checker: Arc<dyn ActionChecker>,
		org_scope: Arc<dyn OrgScopeResolver>,
		repository: Arc<dyn DashboardsRepository>,
	) -> Self {
		Self {
			scope: ScopeResolver::new(checker.clone()),
			checker,
			org_scope,
			repository,
		}
	}

	/// Lists the share entries of a dashboard. Owner only.
	#[instrument(skip(self, caller), fields(key = %key, subject = %caller.subject_id))]
	pub async fn list_shares(&self, key: &str, caller: &Identity) -> Result<Vec<DashboardShare>> {
		let dashboard = self.load_dashboard(key).await?;
		self.enforce_share_management(&dashboard, caller).await?;
		self.repository.list_shares(dashboard.id).await
	}

	/// Adds (or updates) a share entry. Owner only; the target must pass the
	/// per-category grant checks.
	#[instrument(
		skip(self, caller),
		fields(key = %key, subject = %caller.subject_id, principal_type = %principal_type, principal_id = %principal_id)
	)]
	pub async fn add_share(
		&self,
		key: &str,
		caller: &Identity,
		principal_type: PrincipalType,
		principal_id: &str,
		permission: SharePermission,
	) -> Result<DashboardShare> {
		let principal_id = principal_id.trim();
		if principal_id.is_empty() {
			return Err(DashboardsServerError::Validation(
				"principalId is required".to_string(),
			));
		}

		// Target validation runs before the ownership check, independently.
		self
			.enforce_share_target(caller, principal_type, principal_id)
			.await?;

		let dashboard = self.load_dashboard(key).await?;
		self.enforce_share_management(&dashboard, caller).await?;

		if principal_type == PrincipalType::User && principal_id == caller.subject_id {
			return Err(DashboardsServerError::SelfShare);
		}

		let share = DashboardShare::new(
			dashboard.id,
			principal_type,
			principal_id,
			permission,
			caller,
		);
		self.repository.upsert_share(&share).await
	}

	/// Removes an exact share tuple. Owner only; a missing grant is NotFound.
	#[instrument(
		skip(self, caller),
		fields(key = %key, subject = %caller.subject_id, principal_type = %principal_type, principal_id = %principal_id)
	)]
	pub async fn remove_share(
		&self,
		key: &str,
		caller: &Identity,
		principal_type: PrincipalType,
		principal_id: &str,
	) -> Result<()> {
		let principal_id = principal_id.trim();
		if principal_id.is_empty() {
			return Err(DashboardsServerError::Validation(
				"principalId is required".to_string(),
			));
		}

		let dashboard = self.load_dashboard(key).await?;
		self.enforce_share_management(&dashboard, caller).await?;

		let deleted = self
			.repository
			.delete_share(dashboard.id, principal_type, principal_id)
			.await?;
		if !deleted {
			return Err(DashboardsServerError::NotFound(format!(
				"no {principal_type} share for {principal_id}"
			)));
		}
		Ok(())
	}

	async fn load_dashboard(&self, key: &str) -> Result<Dashboard> {
		let key = key.trim();
		if key.is_empty() {
			return Err(DashboardsServerError::Validation(
				"dashboard key is required".to_string(),
			));
		}
		self
			.repository
			.find_dashboard_by_key(key)
			.await?
			.ok_or_else(|| DashboardsServerError::NotFound(format!("dashboard {key}")))
	}

	/// Shares management requires write scope, then explicit branching on the
	/// resolved mode.
	async fn enforce_share_management(&self, dashboard: &Dashboard, caller: &Identity) -> Result<()> {
		let mode = self
			.scope
			.resolve(ScopeVerb::Write, Some(ScopeEntity::Dashboards))
			.await?;

		let owned = dashboard.owner_user_id == caller.subject_id;
		match mode {
			ScopeMode::None => Err(DashboardsServerError::AccessDenied(
				"no write access to dashboards".to_string(),
			)),
			// Dashboards carry no org-unit fields of their own, so ldd
			// collapses to the same check as own.
			ScopeMode::Own | ScopeMode::Ldd => self.require_owner(owned),
			// Sharing is an owner-only capability even under the broadest
			// scope.
			ScopeMode::All => self.require_owner(owned),
		}
	}

	fn require_owner(&self, owned: bool) -> Result<()> {
		if owned {
			Ok(())
		} else {
			Err(DashboardsServerError::AccessDenied(
				"only the dashboard owner may manage shares".to_string(),
			))
		}
	}

	/// Validates that the caller may share with the given principal at all:
	/// the per-category grant, plus `share_outside` for targets outside the
	/// caller's organizational scope.
	async fn enforce_share_target(
		&self,
		caller: &Identity,
		principal_type: PrincipalType,
		principal_id: &str,
	) -> Result<()> {
		let category = principal_type.category();
		self.require_action(&ActionKey::share(category)).await?;

		match category {
			// Groups/roles have no org-unit mapping, treat as outside.
			ShareCategory::Group => self.require_action(&ActionKey::share_outside()).await,
			ShareCategory::User => {
				let scope = self.resolve_org_scope(caller).await;
				let in_scope = match self.org_scope.is_user_in_scope(principal_id, &scope).await {
					Ok(in_scope) => in_scope,
					Err(err) => {
						warn!(error = %err, "user scope lookup failed, treating target as outside scope");
						false
					}
				};
				if in_scope {
					Ok(())
				} else {
					self.require_action(&ActionKey::share_outside()).await
				}
			}
			ShareCategory::Ldd => {
				let Some(unit) = principal_type.org_unit() else {
					return Err(DashboardsServerError::Internal(
						"ldd principal without an org-unit type".to_string(),
					));
				};
				let scope = self.resolve_org_scope(caller).await;
				if self.org_scope.is_org_unit_in_scope(unit, principal_id, &scope) {
					Ok(())
				} else {
					self.require_action(&ActionKey::share_outside()).await
				}
			}
		}
	}

	async fn resolve_org_scope(&self, caller: &Identity) -> OrgScope {
		match self.org_scope.resolve_scope(caller).await {
			Ok(scope) => scope,
			Err(err) => {
				warn!(error = %err, "org scope resolution failed, treating all targets as outside scope");
				OrgScope::default()
			}
		}
	}

	async fn require_action(&self, action: &ActionKey) -> Result<()> {
		match self.checker.check(action).await {
			ActionDecision::Granted => Ok(()),
			ActionDecision::Denied => Err(DashboardsServerError::AccessDenied(format!(
				"missing grant {action}"
			))),
			ActionDecision::Unavailable { reason } => {
				warn!(action = %action, %reason, "authorization check unavailable, denying");
				Err(DashboardsServerError::Upstream(reason))
			}
		}
	}
}
