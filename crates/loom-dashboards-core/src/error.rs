// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DashboardsError {
	/// Template record has no usable key
	#[error("template is missing a key")]
	MissingTemplateKey,

	/// Template record has no usable display name
	#[error("template {0} has an empty name")]
	MissingTemplateName(String),

	/// A dashboard definition document must be a JSON object
	#[error("definition must be an object")]
	DefinitionNotObject,

	/// Unknown share principal type
	#[error("principalType must be user, group, role, location, division, or department")]
	InvalidPrincipalType(String),

	/// Unknown share permission
	#[error("invalid share permission: {0}")]
	InvalidPermission(String),

	/// Unknown scope mode string
	#[error("invalid scope mode: {0}")]
	InvalidScopeMode(String),
}

pub type Result<T> = std::result::Result<T, DashboardsError>;
