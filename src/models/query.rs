//! Filter, pagination and sort state for backend list queries, and its
//! encoding into the backend's `terms[i].column` / `terms[i].value` format.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 50, 100];
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Term {
    pub column: String,
    pub value: String,
}

impl Term {
    pub fn new(column: &str, value: &str) -> Self {
        Term { column: column.to_string(), value: value.to_string() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder { #[default] Asc, Desc }

impl SortOrder {
    /// Accepts the table widget's `ascend`/`descend` as well as `asc`/`desc`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ascend" | "asc" => Some(SortOrder::Asc),
            "descend" | "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self { SortOrder::Asc => "asc", SortOrder::Desc => "desc" }
    }

    /// The widget-side spelling, used when building table links.
    pub fn as_table_str(&self) -> &'static str {
        match self { SortOrder::Asc => "ascend", SortOrder::Desc => "descend" }
    }

    pub fn toggle(&self) -> Self {
        match self { SortOrder::Asc => SortOrder::Desc, SortOrder::Desc => SortOrder::Asc }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sort {
    pub name: String,
    pub order: SortOrder,
}

/// A table pagination/sort event. `current` is the 1-based page number the
/// user clicked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableChange {
    #[serde(rename = "page")]
    pub current: Option<u32>,
    #[serde(rename = "size")]
    pub page_size: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl TableChange {
    /// True when the request carried no table parameters at all, i.e. a
    /// plain page load.
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.page_size.is_none() && self.sort.is_none() && self.order.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryParam {
    pub page_index: u32,
    pub page_size: u32,
    #[serde(default)]
    pub terms: Vec<Term>,
    #[serde(default)]
    pub sorts: Vec<Sort>,
}

impl Default for QueryParam {
    fn default() -> Self {
        QueryParam { page_index: 0, page_size: DEFAULT_PAGE_SIZE, terms: vec![], sorts: vec![] }
    }
}

impl QueryParam {
    /// A fresh search: new terms, first page, default page size.
    pub fn search(terms: Vec<Term>) -> Self {
        QueryParam { terms, ..QueryParam::default() }
    }

    /// Apply a table event, keeping the current filter terms.
    pub fn with_table_change(&self, change: &TableChange) -> Self {
        let page_index = change.current.map(|p| p.saturating_sub(1)).unwrap_or(self.page_index);
        let page_size = match change.page_size {
            Some(size) if (1..=MAX_PAGE_SIZE).contains(&size) => size,
            Some(_) => DEFAULT_PAGE_SIZE,
            None => self.page_size,
        };
        let sorts = match (change.sort.as_deref(), change.order.as_deref().and_then(SortOrder::parse)) {
            (Some(name), Some(order)) if !name.is_empty() => vec![Sort { name: name.to_string(), order }],
            (Some(_), None) | (Some(""), _) => vec![],
            (None, _) => self.sorts.clone(),
            _ => vec![],
        };
        QueryParam { page_index, page_size, terms: self.terms.clone(), sorts }
    }

    /// Value of the first term on `column`, for refilling the search form.
    pub fn term(&self, column: &str) -> &str {
        self.terms
            .iter()
            .find(|t| t.column == column)
            .map(|t| t.value.as_str())
            .unwrap_or("")
    }

    pub fn encode(&self) -> Vec<(String, String)> {
        encode_query_param(self)
    }
}

/// Serialize query state into the backend's flat key/value format.
///
/// Empty terms are skipped and the remaining ones are numbered densely.
pub fn encode_query_param(query: &QueryParam) -> Vec<(String, String)> {
    let mut out = vec![
        ("pageIndex".to_string(), query.page_index.to_string()),
        ("pageSize".to_string(), query.page_size.to_string()),
    ];

    let terms = query.terms.iter().filter(|t| !t.column.is_empty() && !t.value.trim().is_empty());
    for (i, term) in terms.enumerate() {
        out.push((format!("terms[{i}].column"), term.column.clone()));
        out.push((format!("terms[{i}].value"), encode_term_value(&term.column, term.value.trim())));
    }

    for (i, sort) in query.sorts.iter().enumerate() {
        out.push((format!("sorts[{i}].name"), sort.name.clone()));
        out.push((format!("sorts[{i}].order"), sort.order.as_str().to_string()));
    }
    out
}

/// Wildcards for the LIKE family of term suffixes.
fn encode_term_value(column: &str, value: &str) -> String {
    if value.contains('%') {
        return value.to_string();
    }
    if column.ends_with("$LIKE") || column.ends_with("$NLIKE") {
        format!("%{value}%")
    } else if column.ends_with("$START") {
        format!("{value}%")
    } else if column.ends_with("$END") {
        format!("%{value}")
    } else {
        value.to_string()
    }
}
