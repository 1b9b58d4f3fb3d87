//! Browsing the projected table rows: per-column substring filter, column
//! sort and pagination. The derived rows themselves are never reordered.

use crate::types::TableRow;
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableColumn {
    Name,
    Region,
    Ownership,
    FiscalYear,
}

impl TableColumn {
    fn text<'a>(self, row: &'a TableRow) -> std::borrow::Cow<'a, str> {
        match self {
            TableColumn::Name => row.name.as_str().into(),
            TableColumn::Region => row.region.as_str().into(),
            TableColumn::Ownership => row.ownership.as_str().into(),
            TableColumn::FiscalYear => row.fiscal_year.to_string().into(),
        }
    }

    fn compare(self, a: &TableRow, b: &TableRow) -> Ordering {
        match self {
            TableColumn::FiscalYear => a.fiscal_year.cmp(&b.fiscal_year),
            _ => self.text(a).cmp(&self.text(b)),
        }
    }
}

impl FromStr for TableColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" | "substation name" => Ok(TableColumn::Name),
            "region" => Ok(TableColumn::Region),
            "ownership" | "substation ownership" => Ok(TableColumn::Ownership),
            "year" | "fiscal year" | "ss_fisyearname" => Ok(TableColumn::FiscalYear),
            other => Err(format!("unknown column `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub filter: Option<(TableColumn, String)>,
    pub sort: Option<(TableColumn, SortOrder)>,
    /// Zero-based.
    pub page: usize,
    pub page_size: usize,
}

impl TableQuery {
    pub fn new(page_size: usize) -> Self {
        Self { filter: None, sort: None, page: 0, page_size: page_size.max(1) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePage {
    pub rows: Vec<TableRow>,
    pub page: usize,
    pub page_count: usize,
    /// Rows left after filtering, across all pages.
    pub matched: usize,
}

pub fn query_table(rows: &[TableRow], query: &TableQuery) -> TablePage {
    let mut matched: Vec<&TableRow> = match &query.filter {
        Some((column, needle)) => {
            let needle = needle.to_lowercase();
            rows.iter()
                .filter(|r| column.text(r).to_lowercase().contains(&needle))
                .collect()
        }
        None => rows.iter().collect(),
    };
    if let Some((column, order)) = query.sort {
        matched.sort_by(|a, b| match order {
            SortOrder::Ascending => column.compare(a, b),
            SortOrder::Descending => column.compare(b, a),
        });
    }

    let page_size = query.page_size.max(1);
    let page_count = matched.len().div_ceil(page_size).max(1);
    let rows = matched
        .iter()
        .skip(query.page.saturating_mul(page_size))
        .take(page_size)
        .map(|r| (*r).clone())
        .collect();
    TablePage { rows, page: query.page, page_count, matched: matched.len() }
}
