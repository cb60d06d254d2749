// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authenticated identity a request acts as.
//!
//! Identity *extraction* (tokens, cookies, proxy headers) belongs to the
//! identity provider in front of this crate; services here only consume the
//! resolved subject.

use serde::{Deserialize, Serialize};

/// Resolved identity of the current caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Stable subject id, used for ownership and audit fields.
	pub subject_id: String,
	pub email: String,
	pub name: Option<String>,
	pub roles: Vec<String>,
	/// Group ids the subject belongs to, used to match group shares.
	pub groups: Vec<String>,
}

impl Identity {
	pub fn new(subject_id: impl Into<String>) -> Self {
		Self {
			subject_id: subject_id.into(),
			email: String::new(),
			name: None,
			roles: Vec::new(),
			groups: Vec::new(),
		}
	}

	/// Builder: set email.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = email.into();
		self
	}

	/// Builder: set display name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Builder: add a role.
	pub fn with_role(mut self, role: impl Into<String>) -> Self {
		self.roles.push(role.into());
		self
	}

	/// Builder: add a group membership.
	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.groups.push(group.into());
		self
	}

	/// Case-insensitive check for the `admin` role, used by the access-gate
	/// layer in front of this crate.
	pub fn is_admin(&self) -> bool {
		self
			.roles
			.iter()
			.any(|r| r.trim().eq_ignore_ascii_case("admin"))
	}

	/// Display name for audit fields: name, else email, else subject id.
	pub fn audit_name(&self) -> String {
		self
			.name
			.as_deref()
			.filter(|n| !n.trim().is_empty())
			.map(str::to_string)
			.unwrap_or_else(|| {
				if self.email.trim().is_empty() {
					self.subject_id.clone()
				} else {
					self.email.clone()
				}
			})
	}
}
