// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scope-mode resolution.
//!
//! Walks the precedence-ordered probe plan against the authorization
//! provider: entity-specific keys first, then the pack-wide keys, each block
//! in restrictiveness order (`none`, `own`, `ldd`, `all`). The first granted
//! mode wins; when nothing is granted the caller falls back to same-owner
//! access.

use std::sync::Arc;

use tracing::{instrument, warn};

use loom_dashboards_core::{scope_probe_plan, ScopeEntity, ScopeMode, ScopeVerb};

use crate::authz::{ActionChecker, ActionDecision};
use crate::error::{DashboardsServerError, Result};

/// Resolves the effective scope mode for a `(verb, entity)` pair.
#[derive(Clone)]
pub struct ScopeResolver {
	checker: Arc<dyn ActionChecker>,
}

impl ScopeResolver {
	pub fn new(checker: Arc<dyn ActionChecker>) -> Self {
		Self { checker }
	}

	/// Resolves the effective scope mode.
	///
	/// A probe that comes back unavailable is folded into not-granted (fail
	/// closed). When *every* probe is unavailable the provider itself is
	/// down, and that is reported as [`DashboardsServerError::Upstream`]
	/// rather than silently returning the fallback.
	#[instrument(level = "debug", skip(self), fields(verb = verb.as_str()))]
	pub async fn resolve(
		&self,
		verb: ScopeVerb,
		entity: Option<ScopeEntity>,
	) -> Result<ScopeMode> {
		let plan = scope_probe_plan(verb, entity);
		let mut unavailable = 0usize;

		for (mode, key) in &plan {
			match self.checker.check(key).await {
				ActionDecision::Granted => return Ok(*mode),
				ActionDecision::Denied => {}
				ActionDecision::Unavailable { reason } => {
					warn!(action = %key, %reason, "authorization probe unavailable, treating as not granted");
					unavailable += 1;
				}
			}
		}

		if unavailable == plan.len() {
			return Err(DashboardsServerError::Upstream(
				"authorization provider unreachable for all scope probes".to_string(),
			));
		}

		Ok(ScopeMode::FALLBACK)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FixedActionChecker;

	fn resolver(checker: FixedActionChecker) -> ScopeResolver {
		ScopeResolver::new(Arc::new(checker))
	}

	#[tokio::test]
	async fn falls_back_to_own_when_nothing_granted() {
		let r = resolver(FixedActionChecker::denying_all());
		let mode = r
			.resolve(ScopeVerb::Read, Some(ScopeEntity::Dashboards))
			.await
			.unwrap();
		assert_eq!(mode, ScopeMode::Own);
	}

	#[tokio::test]
	async fn entity_specific_grant_wins_over_global() {
		let r = resolver(FixedActionChecker::granting(&[
			"dashboard-core.dashboards.write.scope.own",
			"dashboard-core.write.scope.all",
		]));
		let mode = r
			.resolve(ScopeVerb::Write, Some(ScopeEntity::Dashboards))
			.await
			.unwrap();
		assert_eq!(mode, ScopeMode::Own);
	}

	#[tokio::test]
	async fn most_restrictive_mode_wins_within_prefix() {
		let r = resolver(FixedActionChecker::granting(&[
			"dashboard-core.dashboards.write.scope.all",
			"dashboard-core.dashboards.write.scope.none",
		]));
		let mode = r
			.resolve(ScopeVerb::Write, Some(ScopeEntity::Dashboards))
			.await
			.unwrap();
		assert_eq!(mode, ScopeMode::None);
	}

	#[tokio::test]
	async fn global_grant_applies_when_no_entity_override() {
		let r = resolver(FixedActionChecker::granting(&["dashboard-core.write.scope.all"]));
		let mode = r
			.resolve(ScopeVerb::Write, Some(ScopeEntity::Dashboards))
			.await
			.unwrap();
		assert_eq!(mode, ScopeMode::All);
	}

	#[tokio::test]
	async fn resolves_without_entity() {
		let r = resolver(FixedActionChecker::granting(&["dashboard-core.delete.scope.ldd"]));
		let mode = r.resolve(ScopeVerb::Delete, None).await.unwrap();
		assert_eq!(mode, ScopeMode::Ldd);
	}

	#[tokio::test]
	async fn partial_unavailability_fails_closed() {
		// the own-probe errors out but the all-probe is granted; the failed
		// probe must not be treated as granted
		let r = resolver(
			FixedActionChecker::granting(&["dashboard-core.dashboards.read.scope.all"])
				.with_unavailable(&["dashboard-core.dashboards.read.scope.own"]),
		);
		let mode = r
			.resolve(ScopeVerb::Read, Some(ScopeEntity::Dashboards))
			.await
			.unwrap();
		assert_eq!(mode, ScopeMode::All);
	}

	#[tokio::test]
	async fn total_unavailability_is_reported_upstream() {
		let r = resolver(FixedActionChecker::unavailable());
		let err = r
			.resolve(ScopeVerb::Write, Some(ScopeEntity::Dashboards))
			.await
			.unwrap_err();
		assert!(matches!(err, DashboardsServerError::Upstream(_)));
	}
}
