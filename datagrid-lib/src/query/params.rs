//! Query parameter grammar.
//!
//! The same grammar is spoken in both directions: the remote adapter encodes
//! a [`QueryRequest`] into query pairs, and the server-side engine decodes
//! them back.
//!
//! ```text
//! page=<n>&perPage=<n>&sort=<field>:<asc|desc>
//!     &filter[<key>]=<scalar | {"field","operator","value"}>
//!     &search=<text>&with=<relation>,<relation>
//! ```

use crate::model::Column;
use crate::model::ColumnType;
use crate::model::Value;
use crate::model::column_type_of;
use crate::model::format_number;
use crate::pipeline::coerce::coerce_bool;
use crate::pipeline::coerce::parse_number;

use super::Filter;
use super::FilterSet;
use super::Pagination;
use super::QueryRequest;
use super::SortConfig;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_PER_PAGE: usize = 10;

/// Returns `true` for keys that name identifiers (`id`, `user_id`, `userId`).
///
/// Identifier values keep their original representation on the wire so ids
/// like `007` or uuids survive untouched.
pub fn is_identifier_key(key: &str) -> bool {
    key.eq_ignore_ascii_case("id")
        || key.ends_with("_id")
        || key.ends_with("Id")
        || key.ends_with("ID")
}

/// Encodes a request into ordered query pairs.
///
/// Inactive filters are not sent. Structured filters are JSON-encoded;
/// scalars are coerced according to the column they target.
pub fn encode_params(request: &QueryRequest, columns: &[Column]) -> Vec<(String, String)> {
    let mut params = vec![
        ("page".to_string(), request.pagination.page.to_string()),
        ("perPage".to_string(), request.pagination.per_page.to_string()),
    ];

    if let Some(ref sort) = request.sort {
        params.push(("sort".to_string(), sort.to_string()));
    }

    for (key, filter) in request.filters.iter().filter(|(_, f)| f.is_active()) {
        let encoded = match filter {
            Filter::Simple(value) => encode_scalar(key, value, columns),
            Filter::Structured { .. } => filter.to_json().to_string(),
        };
        params.push((format!("filter[{}]", key), encoded));
    }

    if !request.search.trim().is_empty() {
        params.push(("search".to_string(), request.search.clone()));
    }

    if !request.relations.is_empty() {
        params.push(("with".to_string(), request.relations.join(",")));
    }

    params
}

/// Encodes a bare filter value.
fn encode_scalar(key: &str, value: &Value, columns: &[Column]) -> String {
    if is_identifier_key(key) {
        return value.to_display_string();
    }

    if column_type_of(columns, key) == Some(ColumnType::Boolean) || matches!(value, Value::Bool(_))
    {
        return coerce_bool(value).to_string();
    }

    match value {
        Value::Int(_) | Value::Float(_) => value.to_display_string(),
        Value::String(s) => match parse_number(s) {
            Some(n) => format_number(n),
            None => s.clone(),
        },
        other => other.to_display_string(),
    }
}

/// Decodes a raw query string into a request.
///
/// Never fails: missing or malformed numbers fall back to page 1 and 10 rows
/// per page, filter values that are not valid JSON are kept as strings.
pub fn parse_params(query: &str) -> QueryRequest {
    let mut page = DEFAULT_PAGE;
    let mut per_page = DEFAULT_PER_PAGE;
    let mut sort = None;
    let mut filters = FilterSet::new();
    let mut search = String::new();
    let mut relations = Vec::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "page" => page = parse_leading_int(&value).unwrap_or(DEFAULT_PAGE),
            "perPage" => per_page = parse_leading_int(&value).unwrap_or(DEFAULT_PER_PAGE),
            "sort" => sort = SortConfig::parse(&value),
            "search" => search = value.into_owned(),
            "with" => {
                relations = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            other => {
                if let Some(filter_key) = other
                    .strip_prefix("filter[")
                    .and_then(|rest| rest.strip_suffix(']'))
                {
                    filters.insert(filter_key.to_string(), decode_filter(&value));
                }
            }
        }
    }

    QueryRequest {
        pagination: Pagination {
            page,
            per_page,
            total: 0,
        },
        sort,
        filters,
        search,
        relations,
    }
}

/// Parses a filter value: JSON first, raw string otherwise.
fn decode_filter(raw: &str) -> Filter {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Filter::from_json(json),
        Err(_) => Filter::Simple(Value::String(raw.to_string())),
    }
}

/// Parses the leading digits of a string; zero and garbage yield `None`.
fn parse_leading_int(s: &str) -> Option<usize> {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok().filter(|n| *n > 0)
}
