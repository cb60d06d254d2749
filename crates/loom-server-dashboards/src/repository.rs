// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::instrument;

use loom_dashboards_core::{
	Dashboard, DashboardId, DashboardShare, PrincipalType, SharePermission, Visibility,
};

use crate::error::{DashboardsServerError, Result};

/// Repository trait for dashboard and share persistence.
///
/// Uniqueness of dashboard `key` and of the share
/// `(dashboard_id, principal_type, principal_id)` tuple is enforced here.
#[async_trait]
pub trait DashboardsRepository: Send + Sync {
	// Dashboard operations
	async fn create_dashboard(&self, dashboard: &Dashboard) -> Result<()>;
	async fn find_dashboard_by_id(&self, id: DashboardId) -> Result<Option<Dashboard>>;
	async fn find_dashboard_by_key(&self, key: &str) -> Result<Option<Dashboard>>;
	async fn list_dashboards(&self) -> Result<Vec<Dashboard>>;
	async fn update_dashboard(&self, dashboard: &Dashboard) -> Result<()>;
	/// Deletes a dashboard and its share rows. Returns false when the id is
	/// unknown.
	async fn delete_dashboard(&self, id: DashboardId) -> Result<bool>;

	// Share operations
	async fn list_shares(&self, dashboard_id: DashboardId) -> Result<Vec<DashboardShare>>;
	/// Inserts a share, or on tuple conflict updates `permission` and the
	/// audit fields while preserving the stored `id` and `created_at`.
	/// Returns the row as stored.
	async fn upsert_share(&self, share: &DashboardShare) -> Result<DashboardShare>;
	/// Deletes an exact share tuple. Returns false when no such grant exists.
	async fn delete_share(
		&self,
		dashboard_id: DashboardId,
		principal_type: PrincipalType,
		principal_id: &str,
	) -> Result<bool>;
}

/// SQLite implementation of the dashboards repository.
#[derive(Clone)]
pub struct SqliteDashboardsRepository {
	pool: SqlitePool,
}

impl SqliteDashboardsRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
	match err {
		sqlx::Error::Database(db) => matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation),
		_ => false,
	}
}

#[async_trait]
impl DashboardsRepository for SqliteDashboardsRepository {
	#[instrument(skip(self, dashboard), fields(dashboard_id = %dashboard.id, key = %dashboard.key))]
	async fn create_dashboard(&self, dashboard: &Dashboard) -> Result<()> {
		let scope_json = serde_json::to_string(&dashboard.scope)?;
		let definition_json = serde_json::to_string(&dashboard.definition)?;

		sqlx::query(
			r#"
			INSERT INTO dashboard_definitions (id, key, owner_user_id, is_system, name, description,
											   visibility, scope, version, definition,
											   created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(dashboard.id.to_string())
		.bind(&dashboard.key)
		.bind(&dashboard.owner_user_id)
		.bind(dashboard.is_system)
		.bind(&dashboard.name)
		.bind(&dashboard.description)
		.bind(dashboard.visibility.as_str())
		.bind(scope_json)
		.bind(dashboard.version)
		.bind(definition_json)
		.bind(dashboard.created_at.to_rfc3339())
		.bind(dashboard.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| {
			if is_unique_violation(&e) {
				DashboardsServerError::Validation(format!(
					"a dashboard with key {} already exists",
					dashboard.key
				))
			} else {
				e.into()
			}
		})?;

		Ok(())
	}

	#[instrument(skip(self), fields(dashboard_id = %id))]
	async fn find_dashboard_by_id(&self, id: DashboardId) -> Result<Option<Dashboard>> {
		let row = sqlx::query_as::<_, DashboardRow>(
			r#"
			SELECT id, key, owner_user_id, is_system, name, description,
				   visibility, scope, version, definition, created_at, updated_at
			FROM dashboard_definitions
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(key = %key))]
	async fn find_dashboard_by_key(&self, key: &str) -> Result<Option<Dashboard>> {
		let row = sqlx::query_as::<_, DashboardRow>(
			r#"
			SELECT id, key, owner_user_id, is_system, name, description,
				   visibility, scope, version, definition, created_at, updated_at
			FROM dashboard_definitions
			WHERE key = ?
			"#,
		)
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self))]
	async fn list_dashboards(&self) -> Result<Vec<Dashboard>> {
		let rows = sqlx::query_as::<_, DashboardRow>(
			r#"
			SELECT id, key, owner_user_id, is_system, name, description,
				   visibility, scope, version, definition, created_at, updated_at
			FROM dashboard_definitions
			ORDER BY created_at ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self, dashboard), fields(dashboard_id = %dashboard.id))]
	async fn update_dashboard(&self, dashboard: &Dashboard) -> Result<()> {
		let scope_json = serde_json::to_string(&dashboard.scope)?;
		let definition_json = serde_json::to_string(&dashboard.definition)?;

		sqlx::query(
			r#"
			UPDATE dashboard_definitions
			SET name = ?, description = ?, visibility = ?, scope = ?,
				version = ?, definition = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&dashboard.name)
		.bind(&dashboard.description)
		.bind(dashboard.visibility.as_str())
		.bind(scope_json)
		.bind(dashboard.version)
		.bind(definition_json)
		.bind(dashboard.updated_at.to_rfc3339())
		.bind(dashboard.id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self), fields(dashboard_id = %id))]
	async fn delete_dashboard(&self, id: DashboardId) -> Result<bool> {
		// shares go with the dashboard
		sqlx::query(
			r#"
			DELETE FROM dashboard_definition_shares WHERE dashboard_id = ?
			"#,
		)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		let result = sqlx::query(
			r#"
			DELETE FROM dashboard_definitions WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	#[instrument(skip(self), fields(dashboard_id = %dashboard_id))]
	async fn list_shares(&self, dashboard_id: DashboardId) -> Result<Vec<DashboardShare>> {
		let rows = sqlx::query_as::<_, ShareRow>(
			r#"
			SELECT id, dashboard_id, principal_type, principal_id, permission,
				   shared_by, shared_by_name, created_at
			FROM dashboard_definition_shares
			WHERE dashboard_id = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(dashboard_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(
		skip(self, share),
		fields(dashboard_id = %share.dashboard_id, principal_type = %share.principal_type, principal_id = %share.principal_id)
	)]
	async fn upsert_share(&self, share: &DashboardShare) -> Result<DashboardShare> {
		sqlx::query(
			r#"
			INSERT INTO dashboard_definition_shares (id, dashboard_id, principal_type, principal_id,
													 permission, shared_by, shared_by_name, created_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT (dashboard_id, principal_type, principal_id) DO UPDATE SET
				permission = excluded.permission,
				shared_by = excluded.shared_by,
				shared_by_name = excluded.shared_by_name
			"#,
		)
		.bind(share.id.to_string())
		.bind(share.dashboard_id.to_string())
		.bind(share.principal_type.as_str())
		.bind(&share.principal_id)
		.bind(share.permission.as_str())
		.bind(&share.shared_by)
		.bind(&share.shared_by_name)
		.bind(share.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		let row = sqlx::query_as::<_, ShareRow>(
			r#"
			SELECT id, dashboard_id, principal_type, principal_id, permission,
				   shared_by, shared_by_name, created_at
			FROM dashboard_definition_shares
			WHERE dashboard_id = ? AND principal_type = ? AND principal_id = ?
			"#,
		)
		.bind(share.dashboard_id.to_string())
		.bind(share.principal_type.as_str())
		.bind(&share.principal_id)
		.fetch_one(&self.pool)
		.await?;

		row.try_into()
	}

	#[instrument(skip(self), fields(dashboard_id = %dashboard_id, principal_id = %principal_id))]
	async fn delete_share(
		&self,
		dashboard_id: DashboardId,
		principal_type: PrincipalType,
		principal_id: &str,
	) -> Result<bool> {
		let result = sqlx::query(
			r#"
			DELETE FROM dashboard_definition_shares
			WHERE dashboard_id = ? AND principal_type = ? AND principal_id = ?
			"#,
		)
		.bind(dashboard_id.to_string())
		.bind(principal_type.as_str())
		.bind(principal_id)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DashboardRow {
	id: String,
	key: String,
	owner_user_id: String,
	is_system: bool,
	name: String,
	description: Option<String>,
	visibility: String,
	scope: String,
	version: i64,
	definition: String,
	created_at: String,
	updated_at: String,
}

impl TryFrom<DashboardRow> for Dashboard {
	type Error = DashboardsServerError;

	fn try_from(row: DashboardRow) -> Result<Self> {
		Ok(Dashboard {
			id: row
				.id
				.parse()
				.map_err(|_| DashboardsServerError::Internal("Invalid dashboard ID".to_string()))?,
			key: row.key,
			owner_user_id: row.owner_user_id,
			is_system: row.is_system,
			name: row.name,
			description: row.description,
			visibility: Visibility::parse_lenient(&row.visibility),
			scope: serde_json::from_str(&row.scope)
				.map_err(|_| DashboardsServerError::Internal("Invalid dashboard scope".to_string()))?,
			version: row.version,
			definition: serde_json::from_str(&row.definition)?,
			created_at: parse_timestamp(&row.created_at, "created_at")?,
			updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct ShareRow {
	id: String,
	dashboard_id: String,
	principal_type: String,
	principal_id: String,
	permission: String,
	shared_by: String,
	shared_by_name: Option<String>,
	created_at: String,
}

impl TryFrom<ShareRow> for DashboardShare {
	type Error = DashboardsServerError;

	fn try_from(row: ShareRow) -> Result<Self> {
		Ok(DashboardShare {
			id: row
				.id
				.parse()
				.map_err(|_| DashboardsServerError::Internal("Invalid share ID".to_string()))?,
			dashboard_id: row
				.dashboard_id
				.parse()
				.map_err(|_| DashboardsServerError::Internal("Invalid dashboard ID".to_string()))?,
			principal_type: row
				.principal_type
				.parse::<PrincipalType>()
				.map_err(|_| DashboardsServerError::Internal("Invalid principal type".to_string()))?,
			principal_id: row.principal_id,
			permission: SharePermission::parse_lenient(&row.permission),
			shared_by: row.shared_by,
			shared_by_name: row.shared_by_name,
			created_at: parse_timestamp(&row.created_at, "created_at")?,
		})
	}
}

fn parse_timestamp(raw: &str, field: &str) -> Result<chrono::DateTime<chrono::Utc>> {
	chrono::DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&chrono::Utc))
		.map_err(|_| DashboardsServerError::Internal(format!("Invalid {field} timestamp")))
}
