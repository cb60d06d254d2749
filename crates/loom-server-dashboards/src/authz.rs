// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authorization provider capability.
//!
//! Permission checks go to an external provider as dotted action-key
//! strings. The provider answers with an explicit three-way decision so
//! callers are forced to handle the unavailable case; a check never throws.

use async_trait::async_trait;

use loom_dashboards_core::ActionKey;

/// Outcome of one action-key check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDecision {
	Granted,
	Denied,
	/// The provider failed or timed out. Callers fold this into the most
	/// restrictive outcome (fail closed); it is never treated as granted.
	Unavailable { reason: String },
}

impl ActionDecision {
	pub fn is_granted(&self) -> bool {
		matches!(self, ActionDecision::Granted)
	}

	pub fn is_unavailable(&self) -> bool {
		matches!(self, ActionDecision::Unavailable { .. })
	}
}

/// External authorization provider: answers whether the current caller holds
/// a given action key.
#[async_trait]
pub trait ActionChecker: Send + Sync {
	async fn check(&self, action: &ActionKey) -> ActionDecision;
}
