// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test fixtures: in-memory database pools and fixed-outcome fakes for the
//! external capabilities.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use loom_dashboards_core::{ActionKey, Identity};

use crate::authz::{ActionChecker, ActionDecision};
use crate::error::{DashboardsServerError, Result};
use crate::org_scope::{OrgScope, OrgScopeResolver};

pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:").await.unwrap()
}

pub async fn create_dashboard_definitions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS dashboard_definitions (
			id TEXT PRIMARY KEY,
			key TEXT NOT NULL UNIQUE,
			owner_user_id TEXT NOT NULL DEFAULT 'system',
			is_system INTEGER NOT NULL DEFAULT 0,
			name TEXT NOT NULL,
			description TEXT,
			visibility TEXT NOT NULL DEFAULT 'public',
			scope TEXT NOT NULL DEFAULT '{"kind":"global"}',
			version INTEGER NOT NULL DEFAULT 0,
			definition TEXT NOT NULL,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_dashboard_definition_shares_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS dashboard_definition_shares (
			id TEXT PRIMARY KEY,
			dashboard_id TEXT NOT NULL REFERENCES dashboard_definitions(id) ON DELETE CASCADE,
			principal_type TEXT NOT NULL,
			principal_id TEXT NOT NULL,
			permission TEXT NOT NULL DEFAULT 'view',
			shared_by TEXT NOT NULL,
			shared_by_name TEXT,
			created_at TEXT NOT NULL,
			UNIQUE(dashboard_id, principal_type, principal_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_dashboards_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	create_dashboard_definitions_table(&pool).await;
	create_dashboard_definition_shares_table(&pool).await;
	pool
}

/// Action checker with a fixed set of granted and unavailable keys.
#[derive(Debug, Clone, Default)]
pub struct FixedActionChecker {
	granted: HashSet<String>,
	unavailable: HashSet<String>,
	all_unavailable: bool,
}

impl FixedActionChecker {
	/// Denies every check.
	pub fn denying_all() -> Self {
		Self::default()
	}

	/// Grants exactly the given keys, denies the rest.
	pub fn granting(keys: &[&str]) -> Self {
		Self {
			granted: keys.iter().map(|k| k.to_string()).collect(),
			..Self::default()
		}
	}

	/// Marks the given keys as unavailable.
	pub fn with_unavailable(mut self, keys: &[&str]) -> Self {
		self.unavailable.extend(keys.iter().map(|k| k.to_string()));
		self
	}

	/// Every check reports the provider as unreachable.
	pub fn unavailable() -> Self {
		Self {
			all_unavailable: true,
			..Self::default()
		}
	}
}

#[async_trait]
impl ActionChecker for FixedActionChecker {
	async fn check(&self, action: &ActionKey) -> ActionDecision {
		if self.all_unavailable || self.unavailable.contains(action.as_str()) {
			return ActionDecision::Unavailable {
				reason: "provider offline".to_string(),
			};
		}
		if self.granted.contains(action.as_str()) {
			ActionDecision::Granted
		} else {
			ActionDecision::Denied
		}
	}
}

/// Org-scope resolver with a fixed scope and in-scope user set.
#[derive(Debug, Clone, Default)]
pub struct FixedOrgScopeResolver {
	scope: OrgScope,
	users_in_scope: HashSet<String>,
	fail: bool,
}

impl FixedOrgScopeResolver {
	pub fn new(scope: OrgScope) -> Self {
		Self {
			scope,
			..Self::default()
		}
	}

	pub fn with_user_in_scope(mut self, user_id: &str) -> Self {
		self.users_in_scope.insert(user_id.to_string());
		self
	}

	/// Every lookup reports the directory as unreachable.
	pub fn unavailable() -> Self {
		Self {
			fail: true,
			..Self::default()
		}
	}
}

#[async_trait]
impl OrgScopeResolver for FixedOrgScopeResolver {
	async fn resolve_scope(&self, _identity: &Identity) -> Result<OrgScope> {
		if self.fail {
			return Err(DashboardsServerError::Upstream(
				"org directory offline".to_string(),
			));
		}
		Ok(self.scope.clone())
	}

	async fn is_user_in_scope(&self, user_id: &str, _scope: &OrgScope) -> Result<bool> {
		if self.fail {
			return Err(DashboardsServerError::Upstream(
				"org directory offline".to_string(),
			));
		}
		Ok(self.users_in_scope.contains(user_id))
	}
}
