// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scope-guarded dashboard CRUD and the static/dynamic catalog union.
//!
//! Static dashboards are an additive overlay on the stored rows: the store
//! rejects creation of any key already present in the static catalog, so the
//! two sets never overlap in key space.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use loom_dashboards_core::{
	normalize_definition, Dashboard, DashboardDefinition, DashboardId, DashboardScope, Identity,
	ScopeEntity, ScopeMode, ScopeVerb, StaticCatalog, Visibility,
};

use crate::authz::ActionChecker;
use crate::error::{DashboardsServerError, Result};
use crate::repository::DashboardsRepository;
use crate::scope::ScopeResolver;

/// Caller input for creating a dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewDashboardInput {
	pub key: String,
	pub name: String,
	pub description: Option<String>,
	pub visibility: Option<Visibility>,
	pub scope: Option<DashboardScope>,
	pub definition: Option<Value>,
}

/// Caller input for updating a dashboard. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardUpdate {
	pub name: Option<String>,
	pub description: Option<String>,
	pub visibility: Option<Visibility>,
	pub definition: Option<Value>,
}

/// Dashboard definition service: CRUD over stored rows plus the read-only
/// static catalog, guarded by the caller's resolved scope mode.
#[derive(Clone)]
pub struct DashboardsService {
	scope: ScopeResolver,
	repository: Arc<dyn DashboardsRepository>,
	catalog: StaticCatalog,
}

impl DashboardsService {
	pub fn new(
		checker: Arc<dyn ActionChecker>,
		repository: Arc<dyn DashboardsRepository>,
		catalog: StaticCatalog,
	) -> Self {
		Self {
			scope: ScopeResolver::new(checker),
			repository,
			catalog,
		}
	}

	/// The static catalog this service was loaded with.
	pub fn static_catalog(&self) -> &StaticCatalog {
		&self.catalog
	}

	/// Fetches one dashboard by key, static catalog first.
	#[instrument(skip(self, caller), fields(key = %key, subject = %caller.subject_id))]
	pub async fn get_dashboard(&self, key: &str, caller: &Identity) -> Result<DashboardDefinition> {
		let key = required_key(key)?;
		let mode = self
			.scope
			.resolve(ScopeVerb::Read, Some(ScopeEntity::Dashboards))
			.await?;
		if mode == ScopeMode::None {
			return Err(DashboardsServerError::AccessDenied(
				"no read access to dashboards".to_string(),
			));
		}

		if let Some(statik) = self.catalog.by_key(key) {
			// Static dashboards have no shares; private ones are reachable
			// only under the broadest scope.
			if statik.visibility == Visibility::Public || mode == ScopeMode::All {
				return Ok(statik.clone());
			}
			return Err(DashboardsServerError::AccessDenied(
				"dashboard is not visible to this caller".to_string(),
			));
		}

		let dashboard = self
			.repository
			.find_dashboard_by_key(key)
			.await?
			.ok_or_else(|| DashboardsServerError::NotFound(format!("dashboard {key}")))?;

		if self.can_read_stored(mode, &dashboard, caller).await? {
			Ok(dashboard.into_definition())
		} else {
			Err(DashboardsServerError::AccessDenied(
				"dashboard is not visible to this caller".to_string(),
			))
		}
	}

	/// Lists the dashboards visible to the caller: the static catalog
	/// (optionally filtered by pack) unioned with visible stored rows.
	#[instrument(skip(self, caller), fields(subject = %caller.subject_id))]
	pub async fn list_dashboards(
		&self,
		caller: &Identity,
		pack: Option<&str>,
		include_global: bool,
	) -> Result<Vec<DashboardDefinition>> {
		let mode = self
			.scope
			.resolve(ScopeVerb::Read, Some(ScopeEntity::Dashboards))
			.await?;
		// `none` hides everything rather than erroring: a list is the one
		// read path with a natural empty outcome.
		if mode == ScopeMode::None {
			return Ok(Vec::new());
		}

		let mut out: Vec<DashboardDefinition> = Vec::new();

		let statics = match pack {
			Some(pack) => self.catalog.for_pack(pack, include_global),
			None => self.catalog.all().iter().collect(),
		};
		for statik in statics {
			if statik.visibility == Visibility::Public || mode == ScopeMode::All {
				out.push(statik.clone());
			}
		}

		for dashboard in self.repository.list_dashboards().await? {
			if !matches_pack(&dashboard.scope, pack, include_global) {
				continue;
			}
			if self.can_read_stored(mode, &dashboard, caller).await? {
				out.push(dashboard.into_definition());
			}
		}

		Ok(out)
	}

	/// Creates a user-authored dashboard owned by the caller.
	#[instrument(skip(self, caller, input), fields(key = %input.key, subject = %caller.subject_id))]
	pub async fn create_dashboard(
		&self,
		caller: &Identity,
		input: NewDashboardInput,
	) -> Result<Dashboard> {
		let mode = self
			.scope
			.resolve(ScopeVerb::Write, Some(ScopeEntity::Dashboards))
			.await?;
		if mode == ScopeMode::None {
			return Err(DashboardsServerError::AccessDenied(
				"no write access to dashboards".to_string(),
			));
		}

		let key = required_key(&input.key)?.to_string();
		let name = input.name.trim().to_string();
		if name.is_empty() {
			return Err(DashboardsServerError::Validation(
				"dashboard name is required".to_string(),
			));
		}
		if self.catalog.contains_key(&key) {
			return Err(DashboardsServerError::Validation(format!(
				"key {key} is reserved by a system dashboard"
			)));
		}

		let definition = normalize_definition(input.definition.as_ref())?;
		let now = Utc::now();
		let dashboard = Dashboard {
			id: DashboardId::generate(),
			key,
			owner_user_id: caller.subject_id.clone(),
			is_system: false,
			name,
			description: input.description,
			visibility: input.visibility.unwrap_or(Visibility::Private),
			scope: input.scope.unwrap_or(DashboardScope::Global),
			version: 0,
			definition,
			created_at: now,
			updated_at: now,
		};

		self.repository.create_dashboard(&dashboard).await?;
		Ok(dashboard)
	}

	/// Updates a stored dashboard. System dashboards are immutable.
	#[instrument(skip(self, caller, update), fields(key = %key, subject = %caller.subject_id))]
	pub async fn update_dashboard(
		&self,
		key: &str,
		caller: &Identity,
		update: DashboardUpdate,
	) -> Result<Dashboard> {
		let key = required_key(key)?;
		if self.catalog.contains_key(key) {
			return Err(DashboardsServerError::Validation(
				"system dashboards are immutable".to_string(),
			));
		}

		let mut dashboard = self
			.repository
			.find_dashboard_by_key(key)
			.await?
			.ok_or_else(|| DashboardsServerError::NotFound(format!("dashboard {key}")))?;
		if dashboard.is_system {
			return Err(DashboardsServerError::Validation(
				"system dashboards are immutable".to_string(),
			));
		}

		let mode = self
			.scope
			.resolve(ScopeVerb::Write, Some(ScopeEntity::Dashboards))
			.await?;
		self.enforce_mutation(mode, &dashboard, caller)?;

		if let Some(name) = update.name {
			let name = name.trim().to_string();
			if name.is_empty() {
				return Err(DashboardsServerError::Validation(
					"dashboard name is required".to_string(),
				));
			}
			dashboard.name = name;
		}
		if let Some(description) = update.description {
			dashboard.description = Some(description);
		}
		if let Some(visibility) = update.visibility {
			dashboard.visibility = visibility;
		}
		if let Some(definition) = update.definition {
			dashboard.definition = normalize_definition(Some(&definition))?;
		}
		dashboard.updated_at = Utc::now();

		self.repository.update_dashboard(&dashboard).await?;
		Ok(dashboard)
	}

	/// Deletes a stored dashboard and its shares. System dashboards are
	/// non-deletable.
	#[instrument(skip(self, caller), fields(key = %key, subject = %caller.subject_id))]
	pub async fn delete_dashboard(&self, key: &str, caller: &Identity) -> Result<()> {
		let key = required_key(key)?;
		if self.catalog.contains_key(key) {
			return Err(DashboardsServerError::Validation(
				"system dashboards cannot be deleted".to_string(),
			));
		}

		let dashboard = self
			.repository
			.find_dashboard_by_key(key)
			.await?
			.ok_or_else(|| DashboardsServerError::NotFound(format!("dashboard {key}")))?;
		if dashboard.is_system {
			return Err(DashboardsServerError::Validation(
				"system dashboards cannot be deleted".to_string(),
			));
		}

		let mode = self
			.scope
			.resolve(ScopeVerb::Delete, Some(ScopeEntity::Dashboards))
			.await?;
		self.enforce_mutation(mode, &dashboard, caller)?;

		let deleted = self.repository.delete_dashboard(dashboard.id).await?;
		if !deleted {
			return Err(DashboardsServerError::NotFound(format!("dashboard {key}")));
		}
		Ok(())
	}

	async fn can_read_stored(
		&self,
		mode: ScopeMode,
		dashboard: &Dashboard,
		caller: &Identity,
	) -> Result<bool> {
		match mode {
			ScopeMode::None => Ok(false),
			ScopeMode::All => Ok(true),
			// Dashboards carry no org-unit fields, so ldd reads like own:
			// public, owned, or explicitly shared.
			ScopeMode::Own | ScopeMode::Ldd => {
				if dashboard.visibility == Visibility::Public
					|| dashboard.owner_user_id == caller.subject_id
				{
					return Ok(true);
				}
				let shares = self.repository.list_shares(dashboard.id).await?;
				Ok(shares.iter().any(|share| share.applies_to(caller)))
			}
		}
	}

	fn enforce_mutation(
		&self,
		mode: ScopeMode,
		dashboard: &Dashboard,
		caller: &Identity,
	) -> Result<()> {
		match mode {
			ScopeMode::None => Err(DashboardsServerError::AccessDenied(
				"no access to dashboards".to_string(),
			)),
			// ldd degenerates to own: dashboards carry no org-unit fields.
			ScopeMode::Own | ScopeMode::Ldd => {
				if dashboard.owner_user_id == caller.subject_id {
					Ok(())
				} else {
					Err(DashboardsServerError::AccessDenied(
						"only the dashboard owner may modify it".to_string(),
					))
				}
			}
			ScopeMode::All => Ok(()),
		}
	}
}

fn required_key(key: &str) -> Result<&str> {
	let key = key.trim();
	if key.is_empty() {
		return Err(DashboardsServerError::Validation(
			"dashboard key is required".to_string(),
		));
	}
	Ok(key)
}

fn matches_pack(scope: &DashboardScope, pack: Option<&str>, include_global: bool) -> bool {
	match (pack, scope) {
		(None, _) => true,
		(Some(pack), DashboardScope::Pack { pack: p }) => p == pack.trim(),
		(Some(_), DashboardScope::Global) => include_global,
	}
}
