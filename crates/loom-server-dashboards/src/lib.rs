// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dashboards server implementation for Loom.
//!
//! This crate provides the server-side services for the dashboards system:
//! scope-mode resolution against the external authorization provider, share
//! (ACL) management, scope-guarded dashboard CRUD, the template registry
//! loader, and the SQLite repository.
//!
//! # Architecture
//!
//! - `authz` - The authorization provider capability (action-key checks)
//! - `scope` - Precedence-ordered scope-mode resolution
//! - `org_scope` - The org-scope capability (organizational-unit membership)
//! - `sharing` - Share management rules (owner-only, share_outside, upsert)
//! - `dashboards` - Dashboard CRUD and the static/dynamic catalog union
//! - `registry` - Template registry snapshot loading
//! - `repository` - Database operations for dashboards and shares
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use loom_server_dashboards::{
//!     DashboardsService, ShareManager, SqliteDashboardsRepository, TemplateRegistry,
//! };
//!
//! let repo = Arc::new(SqliteDashboardsRepository::new(pool));
//! let catalog = TemplateRegistry::new("generated/dashboard-templates.json").load_catalog();
//!
//! let dashboards = DashboardsService::new(checker.clone(), repo.clone(), catalog);
//! let shares = ShareManager::new(checker, org_scope, repo);
//!
//! let dashboard = dashboards.get_dashboard("system.company_overview", &caller).await?;
//! let entries = shares.list_shares(&dashboard.key, &caller).await?;
//! ```

pub mod authz;
pub mod dashboards;
pub mod error;
pub mod org_scope;
pub mod pool;
pub mod registry;
pub mod repository;
pub mod scope;
pub mod sharing;
pub mod testing;

pub use authz::{ActionChecker, ActionDecision};
pub use dashboards::{DashboardUpdate, DashboardsService, NewDashboardInput};
pub use error::{DashboardsServerError, Result};
pub use org_scope::{OrgScope, OrgScopeResolver};
pub use pool::create_pool;
pub use registry::TemplateRegistry;
pub use repository::{DashboardsRepository, SqliteDashboardsRepository};
pub use scope::ScopeResolver;
pub use sharing::ShareManager;

// Re-export core types for convenience
pub use loom_dashboards_core::*;
