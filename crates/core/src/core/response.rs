//! Backend response parsing.
//!
//! The submission endpoint answers either with [`ERROR_SENTINEL`] or with a
//! two-element array `[resultGroups, logText]`:
//!
//! ```text
//! [
//!   { "<run>": { "samples": 100,
//!                "queries": { "<key>": { "query": "P(A)",
//!                                        "distribution": [["A","p"],["true",0.6]] } } } },
//!   "log text"
//! ]
//! ```
//!
//! [`unpack`] flattens every query of every group into one [`ResultSet`].
//! Groups and queries are visited in JavaScript property order: array-index
//! keys ascending, then the other keys in document order.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Literal body the backend sends when inference failed.
pub const ERROR_SENTINEL: &str = "error occurred";

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("error occurred")]
    Server,
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a two-element array [resultGroups, logText]")]
    NotAPair,
    #[error("result groups must be an object keyed by run name")]
    GroupsNotAnObject,
    #[error("result group `{group}`: {source}")]
    Group {
        group: String,
        source: serde_json::Error,
    },
    #[error("query `{query}` in group `{group}`: {source}")]
    Query {
        group: String,
        query: String,
        source: serde_json::Error,
    },
}

impl ResponseError {
    /// True for the backend's own failure signal (as opposed to a broken response).
    pub fn is_server_error(&self) -> bool {
        matches!(self, ResponseError::Server)
    }
}

/// A 2-D table of JSON cells; row 0 is the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionTable(pub Vec<Vec<Value>>);

impl DistributionTable {
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn header(&self) -> Option<&[Value]> {
        self.0.first().map(Vec::as_slice)
    }

    pub fn data_rows(&self) -> &[Vec<Value>] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// First cell of the first data row.
    pub fn first_data_cell(&self) -> Option<&Value> {
        self.0.get(1).and_then(|row| row.first())
    }

    /// A numeric first column means samples over a numeric domain (line chart).
    pub fn has_numeric_domain(&self) -> bool {
        self.0.len() > 1 && self.first_data_cell().is_some_and(Value::is_number)
    }

    /// Number of value columns (everything after the domain column).
    pub fn series_count(&self) -> usize {
        self.0
            .iter()
            .map(|row| row.len().saturating_sub(1))
            .max()
            .unwrap_or(0)
    }
}

fn null_as_empty<'de, D>(de: D) -> Result<DistributionTable, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DistributionTable>::deserialize(de)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
struct WireQuery {
    query: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    distribution: DistributionTable,
}

#[derive(Debug, Clone, Deserialize)]
struct WireGroup {
    samples: Number,
    queries: Map<String, Value>,
}

/// One flattened query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEntry {
    /// Run (result group) the query came from.
    pub group: String,
    /// Key of the query inside its group.
    pub key: String,
    pub title: String,
    pub distribution: DistributionTable,
    pub samples: Number,
}

impl QueryEntry {
    /// Sample count as JavaScript would print it (`1e3` and `1000.0` give `1000`).
    pub fn samples_label(&self) -> String {
        number_label(&self.samples)
    }
}

pub fn number_label(n: &Number) -> String {
    if let Some(v) = n.as_u64() {
        return v.to_string();
    }
    if let Some(v) = n.as_i64() {
        return v.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => f.to_string(),
        _ => n.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub value: usize,
    pub label: String,
}

/// Every query of one response, flattened across groups.
///
/// Titles, distributions and sample counts are projections of the same entry
/// list, so they always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    entries: Vec<QueryEntry>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[QueryEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&QueryEntry> {
        self.entries.get(index)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.title.as_str())
    }

    pub fn distributions(&self) -> impl Iterator<Item = &DistributionTable> + '_ {
        self.entries.iter().map(|e| &e.distribution)
    }

    pub fn sample_counts(&self) -> impl Iterator<Item = &Number> + '_ {
        self.entries.iter().map(|e| &e.samples)
    }

    pub fn dropdown_options(&self) -> Vec<DropdownOption> {
        self.entries
            .iter()
            .enumerate()
            .map(|(value, e)| DropdownOption {
                value,
                label: e.title.clone(),
            })
            .collect()
    }
}

impl FromIterator<QueryEntry> for ResultSet {
    fn from_iter<I: IntoIterator<Item = QueryEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn array_index(key: &str) -> Option<u32> {
    let n: u32 = key.parse().ok()?;
    (n != u32::MAX && n.to_string() == key).then_some(n)
}

/// Keys of `map` in JavaScript property enumeration order.
pub fn property_order(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let (mut indexed, named): (Vec<_>, Vec<_>) =
        map.iter().partition(|(k, _)| array_index(k).is_some());
    indexed.sort_by_key(|(k, _)| array_index(k));
    indexed.extend(named);
    indexed
}

/// Flatten result groups into a [`ResultSet`].
pub fn unpack(groups: &Map<String, Value>) -> Result<ResultSet, ResponseError> {
    let mut entries = Vec::new();

    for (group_name, raw_group) in property_order(groups) {
        let group = WireGroup::deserialize(raw_group).map_err(|source| ResponseError::Group {
            group: group_name.clone(),
            source,
        })?;

        for (key, raw_query) in property_order(&group.queries) {
            let q = WireQuery::deserialize(raw_query).map_err(|source| ResponseError::Query {
                group: group_name.clone(),
                query: key.clone(),
                source,
            })?;
            entries.push(QueryEntry {
                group: group_name.clone(),
                key: key.clone(),
                title: q.query,
                distribution: q.distribution,
                samples: group.samples.clone(),
            });
        }
    }

    tracing::debug!(groups = groups.len(), queries = entries.len(), "unpacked response");
    Ok(ResultSet { entries })
}

/// A successfully parsed submission response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub results: ResultSet,
    pub log_text: String,
}

fn log_text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a raw response body.
pub fn parse_response(body: &str) -> Result<ParsedResponse, ResponseError> {
    if body.trim() == ERROR_SENTINEL {
        return Err(ResponseError::Server);
    }

    let value: Value = serde_json::from_str(body)?;
    let Value::Array(items) = value else {
        return Err(ResponseError::NotAPair);
    };
    if items.len() < 2 {
        return Err(ResponseError::NotAPair);
    }
    let Value::Object(groups) = &items[0] else {
        return Err(ResponseError::GroupsNotAnObject);
    };

    Ok(ParsedResponse {
        results: unpack(groups)?,
        log_text: log_text_of(&items[1]),
    })
}
