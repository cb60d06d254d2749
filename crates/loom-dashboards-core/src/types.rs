// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Foundational type definitions for the dashboards system.
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs ([`DashboardId`],
//!   [`ShareId`]) preventing accidental mixing
//! - **Visibility levels**: Access control for dashboard definitions
//!   ([`Visibility`])
//! - **Share principals**: The targets a dashboard can be shared with
//!   ([`PrincipalType`], [`ShareCategory`], [`OrgUnitType`]) and the grant
//!   level ([`SharePermission`])
//!
//! All ID types implement transparent serde serialization (as UUID strings).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DashboardsError;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(pub Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
				Ok(Self(s.parse()?))
			}
		}
	};
}

define_id_type!(DashboardId, "Unique identifier for a stored dashboard definition.");
define_id_type!(ShareId, "Unique identifier for a dashboard share entry.");

// =============================================================================
// Visibility
// =============================================================================

/// Who may see a dashboard definition.
///
/// Public dashboards are visible to all authenticated users; private
/// dashboards require ownership or an explicit share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
	Public,
	Private,
}

impl Visibility {
	pub fn as_str(&self) -> &'static str {
		match self {
			Visibility::Public => "public",
			Visibility::Private => "private",
		}
	}

	/// Lenient parse: `"public"` (any case, surrounding whitespace ignored)
	/// is public, anything else is private.
	pub fn parse_lenient(value: &str) -> Self {
		if value.trim().eq_ignore_ascii_case("public") {
			Visibility::Public
		} else {
			Visibility::Private
		}
	}
}

// =============================================================================
// Share principals
// =============================================================================

/// The kind of principal a dashboard share targets.
///
/// `Group` and `Role` are both treated as group grants; `Location`,
/// `Division`, and `Department` are organizational-unit grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
	User,
	Group,
	Role,
	Location,
	Division,
	Department,
}

impl PrincipalType {
	pub fn as_str(&self) -> &'static str {
		match self {
			PrincipalType::User => "user",
			PrincipalType::Group => "group",
			PrincipalType::Role => "role",
			PrincipalType::Location => "location",
			PrincipalType::Division => "division",
			PrincipalType::Department => "department",
		}
	}

	/// The ACL category this principal type falls under.
	pub fn category(&self) -> ShareCategory {
		match self {
			PrincipalType::User => ShareCategory::User,
			PrincipalType::Group | PrincipalType::Role => ShareCategory::Group,
			PrincipalType::Location | PrincipalType::Division | PrincipalType::Department => {
				ShareCategory::Ldd
			}
		}
	}

	/// The organizational-unit type, for `ldd`-category principals.
	pub fn org_unit(&self) -> Option<OrgUnitType> {
		match self {
			PrincipalType::Location => Some(OrgUnitType::Location),
			PrincipalType::Division => Some(OrgUnitType::Division),
			PrincipalType::Department => Some(OrgUnitType::Department),
			_ => None,
		}
	}
}

impl FromStr for PrincipalType {
	type Err = DashboardsError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.trim() {
			"user" => Ok(PrincipalType::User),
			"group" => Ok(PrincipalType::Group),
			"role" => Ok(PrincipalType::Role),
			"location" => Ok(PrincipalType::Location),
			"division" => Ok(PrincipalType::Division),
			"department" => Ok(PrincipalType::Department),
			other => Err(DashboardsError::InvalidPrincipalType(other.to_string())),
		}
	}
}

impl fmt::Display for PrincipalType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// ACL category a share grant belongs to, used for fine-grained share
/// permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareCategory {
	User,
	Group,
	Ldd,
}

impl ShareCategory {
	pub fn as_str(&self) -> &'static str {
		match self {
			ShareCategory::User => "user",
			ShareCategory::Group => "group",
			ShareCategory::Ldd => "ldd",
		}
	}
}

/// Organizational unit kinds used for `ldd` scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgUnitType {
	Location,
	Division,
	Department,
}

impl OrgUnitType {
	pub fn as_str(&self) -> &'static str {
		match self {
			OrgUnitType::Location => "location",
			OrgUnitType::Division => "division",
			OrgUnitType::Department => "department",
		}
	}
}

// =============================================================================
// Share permission
// =============================================================================

/// Grant level attached to a share entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
	View,
	Full,
}

impl SharePermission {
	pub fn as_str(&self) -> &'static str {
		match self {
			SharePermission::View => "view",
			SharePermission::Full => "full",
		}
	}

	/// Lenient parse: `"full"` (any case) grants full access, anything else
	/// falls back to view.
	pub fn parse_lenient(value: &str) -> Self {
		if value.trim().eq_ignore_ascii_case("full") {
			SharePermission::Full
		} else {
			SharePermission::View
		}
	}
}

impl FromStr for SharePermission {
	type Err = DashboardsError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.trim() {
			"view" => Ok(SharePermission::View),
			"full" => Ok(SharePermission::Full),
			other => Err(DashboardsError::InvalidPermission(other.to_string())),
		}
	}
}
