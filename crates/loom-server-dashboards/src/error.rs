// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_dashboards_core::DashboardsError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardsServerError {
	/// Malformed caller input; the operation was not attempted.
	#[error("Validation error: {0}")]
	Validation(String),

	/// The caller's scope, ownership, or share grants do not permit the
	/// operation. Computed locally, never thrown by collaborators.
	#[error("Access denied: {0}")]
	AccessDenied(String),

	/// Dashboard key or share tuple does not exist.
	#[error("Not found: {0}")]
	NotFound(String),

	/// A caller attempting to share a dashboard with themself, rejected
	/// independently of scope mode.
	#[error("Cannot share a dashboard with yourself")]
	SelfShare,

	/// The authorization provider or org-scope resolver was unreachable.
	/// Distinct from [`DashboardsServerError::AccessDenied`] so operational
	/// tooling can tell "denied by policy" from "policy engine unreachable".
	#[error("Authorization upstream unavailable: {0}")]
	Upstream(String),

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Internal: {0}")]
	Internal(String),
}

impl From<DashboardsError> for DashboardsServerError {
	fn from(err: DashboardsError) -> Self {
		DashboardsServerError::Validation(err.to_string())
	}
}

pub type Result<T> = std::result::Result<T, DashboardsServerError>;
