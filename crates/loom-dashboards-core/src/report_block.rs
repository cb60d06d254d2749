// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Report block normalization.
//!
//! Report blocks arrive as partially-specified JSON documents from dashboard
//! configs. Normalization fills in every default so renderers and the metrics
//! backend never see a hole. Pie charts never time-bucket, and their
//! aggregation query always carries the keys needed for slice grouping,
//! display labeling, and drill-down identification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a block resolves its time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
	Inherit,
	AllTime,
}

/// Display format for slice values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
	Number,
	Usd,
}

/// Time bucketing of an aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
	None,
	Hour,
	Day,
	Week,
	Month,
}

/// Aggregation function applied to metric points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
	Sum,
	Avg,
	Min,
	Max,
	Count,
	Last,
}

impl Aggregation {
	fn parse_lenient(value: &str) -> Self {
		match value.trim() {
			"avg" => Aggregation::Avg,
			"min" => Aggregation::Min,
			"max" => Aggregation::Max,
			"count" => Aggregation::Count,
			"last" => Aggregation::Last,
			_ => Aggregation::Sum,
		}
	}
}

/// The aggregation query used to build the slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
	pub metric_key: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub start: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end: Option<String>,
	pub bucket: Bucket,
	pub agg: Aggregation,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub entity_kind: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub entity_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub entity_ids: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data_source_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source_granularity: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub params: Option<Map<String, Value>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<Map<String, Value>>,
	pub group_by: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub group_by_entity_id: Option<bool>,
	/// Fields the caller supplied that this version does not model; carried
	/// through untouched.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// A normalized pie-chart report block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieReportBlock {
	pub title: String,
	pub format: ValueFormat,
	pub time: TimeMode,
	/// The aggregation query used to build the slices (bucket is always
	/// `none`).
	pub query: MetricsQuery,
	/// Grouping + drilldown filter key, e.g. `"stage_id"`.
	pub group_by_key: String,
	/// Display label key, e.g. `"stage_name"`.
	pub label_key: String,
	/// Raw slice id key, e.g. `"stage_id"`.
	pub raw_key: String,
	pub top_n: i64,
	pub other_label: String,
}

/// Versioned report block variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ReportBlock {
	#[serde(rename = "pie_v0")]
	PieV0(PieReportBlock),
}

fn str_field<'a>(input: &'a Value, key: &str) -> Option<&'a str> {
	input
		.get(key)
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|s| !s.is_empty())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
	match value {
		Some(Value::Array(items)) => items
			.iter()
			.filter_map(Value::as_str)
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(str::to_string)
			.collect(),
		_ => Vec::new(),
	}
}

const QUERY_FIELDS: &[&str] = &[
	"metricKey",
	"start",
	"end",
	"bucket",
	"agg",
	"entityKind",
	"entityId",
	"entityIds",
	"dataSourceId",
	"sourceGranularity",
	"params",
	"dimensions",
	"groupBy",
	"groupByEntityId",
];

/// Normalizes a partially-specified pie block into a complete one.
///
/// The embedded query is forced to `bucket: none` and its `groupBy` set is
/// the union of the caller's requested keys with `groupByKey`, `labelKey`,
/// and `rawKey`.
pub fn normalize_pie_block(input: &Value) -> PieReportBlock {
	let title = str_field(input, "title").unwrap_or("Pie").to_string();
	let format = match str_field(input, "format") {
		Some("usd") => ValueFormat::Usd,
		_ => ValueFormat::Number,
	};
	let time = match str_field(input, "time") {
		Some("all_time") => TimeMode::AllTime,
		_ => TimeMode::Inherit,
	};
	let group_by_key = str_field(input, "groupByKey").unwrap_or("region").to_string();
	let label_key = str_field(input, "labelKey")
		.unwrap_or(&group_by_key)
		.to_string();
	let raw_key = str_field(input, "rawKey").unwrap_or(&group_by_key).to_string();
	let top_n = input
		.get("topN")
		.and_then(Value::as_f64)
		.filter(|n| n.is_finite())
		.map(|n| (n as i64).clamp(1, 25))
		.unwrap_or(5);
	let other_label = str_field(input, "otherLabel").unwrap_or("Other").to_string();

	let empty = Map::new();
	let q = match input.get("query") {
		Some(Value::Object(obj)) => obj,
		_ => &empty,
	};

	let mut group_by: Vec<String> = string_list(q.get("groupBy"));
	for key in [&group_by_key, &label_key, &raw_key] {
		if !group_by.iter().any(|g| g == key) {
			group_by.push(key.clone());
		}
	}

	let extra: Map<String, Value> = q
		.iter()
		.filter(|(k, _)| !QUERY_FIELDS.contains(&k.as_str()))
		.map(|(k, v)| (k.clone(), v.clone()))
		.collect();

	let query = MetricsQuery {
		metric_key: q
			.get("metricKey")
			.and_then(Value::as_str)
			.map(str::trim)
			.unwrap_or_default()
			.to_string(),
		start: q.get("start").and_then(Value::as_str).map(str::to_string),
		end: q.get("end").and_then(Value::as_str).map(str::to_string),
		// pie charts never time-bucket
		bucket: Bucket::None,
		agg: q
			.get("agg")
			.and_then(Value::as_str)
			.map(Aggregation::parse_lenient)
			.unwrap_or(Aggregation::Sum),
		entity_kind: q.get("entityKind").and_then(Value::as_str).map(str::to_string),
		entity_id: q.get("entityId").and_then(Value::as_str).map(str::to_string),
		entity_ids: match q.get("entityIds") {
			Some(Value::Array(_)) => Some(string_list(q.get("entityIds"))),
			_ => None,
		},
		data_source_id: q
			.get("dataSourceId")
			.and_then(Value::as_str)
			.map(str::to_string),
		source_granularity: q
			.get("sourceGranularity")
			.and_then(Value::as_str)
			.map(str::to_string),
		params: q.get("params").and_then(Value::as_object).cloned(),
		dimensions: q.get("dimensions").and_then(Value::as_object).cloned(),
		group_by,
		group_by_entity_id: q.get("groupByEntityId").and_then(Value::as_bool),
		extra,
	};

	PieReportBlock {
		title,
		format,
		time,
		query,
		group_by_key,
		label_key,
		raw_key,
		top_n,
		other_label,
	}
}
