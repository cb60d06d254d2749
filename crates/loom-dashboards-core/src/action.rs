// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Typed action keys for the external authorization provider.
//!
//! The provider models permissions as a flat set of boolean-grantable dotted
//! strings (`dashboard-core.dashboards.write.scope.own`). This module is the
//! single boundary where typed `(verb, entity, mode)` tuples are rendered to
//! those wire strings, so probe ordering stays type-safe while the wire
//! format is preserved exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardsError;
use crate::types::ShareCategory;

/// Namespace prefix of every dashboards action key.
pub const ACTION_NAMESPACE: &str = "dashboard-core";

/// Verb a caller wants to apply to a resource class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeVerb {
	Read,
	Write,
	Delete,
}

impl ScopeVerb {
	pub fn as_str(&self) -> &'static str {
		match self {
			ScopeVerb::Read => "read",
			ScopeVerb::Write => "write",
			ScopeVerb::Delete => "delete",
		}
	}
}

/// Resource classes with entity-specific scope overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeEntity {
	Dashboards,
}

impl ScopeEntity {
	pub fn as_str(&self) -> &'static str {
		match self {
			ScopeEntity::Dashboards => "dashboards",
		}
	}
}

/// Breadth of access a caller has for a verb.
///
/// Variants are declared from most to least restrictive; [`ScopeMode::PROBE_ORDER`]
/// is the canonical probe order, and the first granted mode in that order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
	/// No access at all.
	None,
	/// Only resources the caller owns.
	Own,
	/// Resources within the caller's organizational units
	/// (location/division/department).
	Ldd,
	/// Every resource.
	All,
}

impl ScopeMode {
	/// Fixed restrictiveness order: most restrictive first.
	pub const PROBE_ORDER: [ScopeMode; 4] =
		[ScopeMode::None, ScopeMode::Own, ScopeMode::Ldd, ScopeMode::All];

	/// The safe default when no scope grant exists: a caller always has at
	/// least same-owner access.
	pub const FALLBACK: ScopeMode = ScopeMode::Own;

	pub fn as_str(&self) -> &'static str {
		match self {
			ScopeMode::None => "none",
			ScopeMode::Own => "own",
			ScopeMode::Ldd => "ldd",
			ScopeMode::All => "all",
		}
	}
}

impl FromStr for ScopeMode {
	type Err = DashboardsError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.trim() {
			"none" => Ok(ScopeMode::None),
			"own" => Ok(ScopeMode::Own),
			"ldd" => Ok(ScopeMode::Ldd),
			"all" => Ok(ScopeMode::All),
			other => Err(DashboardsError::InvalidScopeMode(other.to_string())),
		}
	}
}

impl fmt::Display for ScopeMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A fully-rendered action key, ready to hand to the authorization provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionKey(String);

impl ActionKey {
	/// Scope-mode probe key.
	///
	/// With an entity: `dashboard-core.{entity}.{verb}.scope.{mode}`.
	/// Without: `dashboard-core.{verb}.scope.{mode}`.
	pub fn scope(verb: ScopeVerb, entity: Option<ScopeEntity>, mode: ScopeMode) -> Self {
		match entity {
			Some(entity) => ActionKey(format!(
				"{}.{}.{}.scope.{}",
				ACTION_NAMESPACE,
				entity.as_str(),
				verb.as_str(),
				mode.as_str()
			)),
			None => ActionKey(format!(
				"{}.{}.scope.{}",
				ACTION_NAMESPACE,
				verb.as_str(),
				mode.as_str()
			)),
		}
	}

	/// Fine-grained grant for creating shares of the given category:
	/// `dashboard-core.dashboards.share.{user|group|ldd}`.
	pub fn share(category: ShareCategory) -> Self {
		ActionKey(format!(
			"{}.dashboards.share.{}",
			ACTION_NAMESPACE,
			category.as_str()
		))
	}

	/// Grant allowing shares with principals outside the caller's
	/// organizational scope: `dashboard-core.dashboards.scope.share_outside`.
	pub fn share_outside() -> Self {
		ActionKey(format!("{ACTION_NAMESPACE}.dashboards.scope.share_outside"))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ActionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// The ordered probe sequence for resolving a scope mode.
///
/// Entity-specific keys come first (all four modes in restrictiveness order),
/// then the pack-wide keys. When no entity is given the two prefixes are the
/// same string, so the plan contains each key only once; probing the same key
/// twice cannot change the outcome with a deterministic provider.
pub fn scope_probe_plan(
	verb: ScopeVerb,
	entity: Option<ScopeEntity>,
) -> Vec<(ScopeMode, ActionKey)> {
	let mut plan = Vec::with_capacity(8);
	for mode in ScopeMode::PROBE_ORDER {
		plan.push((mode, ActionKey::scope(verb, entity, mode)));
	}
	if entity.is_some() {
		for mode in ScopeMode::PROBE_ORDER {
			plan.push((mode, ActionKey::scope(verb, None, mode)));
		}
	}
	plan
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scope_keys_render_wire_format() {
		assert_eq!(
			ActionKey::scope(ScopeVerb::Write, Some(ScopeEntity::Dashboards), ScopeMode::Own)
				.as_str(),
			"dashboard-core.dashboards.write.scope.own"
		);
		assert_eq!(
			ActionKey::scope(ScopeVerb::Read, None, ScopeMode::All).as_str(),
			"dashboard-core.read.scope.all"
		);
		assert_eq!(
			ActionKey::scope(ScopeVerb::Delete, Some(ScopeEntity::Dashboards), ScopeMode::None)
				.as_str(),
			"dashboard-core.dashboards.delete.scope.none"
		);
	}

	#[test]
	fn share_keys_render_wire_format() {
		assert_eq!(
			ActionKey::share(ShareCategory::User).as_str(),
			"dashboard-core.dashboards.share.user"
		);
		assert_eq!(
			ActionKey::share(ShareCategory::Group).as_str(),
			"dashboard-core.dashboards.share.group"
		);
		assert_eq!(
			ActionKey::share(ShareCategory::Ldd).as_str(),
			"dashboard-core.dashboards.share.ldd"
		);
		assert_eq!(
			ActionKey::share_outside().as_str(),
			"dashboard-core.dashboards.scope.share_outside"
		);
	}

	#[test]
	fn probe_plan_entity_specific_first() {
		let plan = scope_probe_plan(ScopeVerb::Write, Some(ScopeEntity::Dashboards));
		assert_eq!(plan.len(), 8);
		assert_eq!(plan[0].0, ScopeMode::None);
		assert_eq!(plan[0].1.as_str(), "dashboard-core.dashboards.write.scope.none");
		assert_eq!(plan[3].1.as_str(), "dashboard-core.dashboards.write.scope.all");
		assert_eq!(plan[4].1.as_str(), "dashboard-core.write.scope.none");
		assert_eq!(plan[7].1.as_str(), "dashboard-core.write.scope.all");
	}

	#[test]
	fn probe_plan_without_entity_has_no_duplicates() {
		let plan = scope_probe_plan(ScopeVerb::Read, None);
		assert_eq!(plan.len(), 4);
		let modes: Vec<ScopeMode> = plan.iter().map(|(m, _)| *m).collect();
		assert_eq!(modes.as_slice(), ScopeMode::PROBE_ORDER.as_slice());
	}

	#[test]
	fn probe_order_is_most_restrictive_first() {
		assert_eq!(
			ScopeMode::PROBE_ORDER,
			[ScopeMode::None, ScopeMode::Own, ScopeMode::Ldd, ScopeMode::All]
		);
		assert_eq!(ScopeMode::FALLBACK, ScopeMode::Own);
	}
}
