//! Filter set for the invoice list.
//!
//! Every filter change resets the page to 1. The invoice type is fixed for a
//! screen and survives [`InvoiceFilters::clear`], as do the sort key and
//! direction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billbook_invoicing::{InvoiceStatus, InvoiceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    VoucherDate,
    VoucherNumber,
    TotalAmount,
    CreatedAt,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::VoucherDate => "voucher_date",
            SortKey::VoucherNumber => "voucher_number",
            SortKey::TotalAmount => "total_amount",
            SortKey::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFilters {
    invoice_type: InvoiceType,
    status: Option<InvoiceStatus>,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    search: Option<String>,
    sort: SortKey,
    direction: SortDirection,
    page: u32,
    per_page: u32,
}

impl InvoiceFilters {
    pub fn new(invoice_type: InvoiceType, per_page: u32) -> Self {
        Self {
            invoice_type,
            status: None,
            from_date: None,
            to_date: None,
            search: None,
            sort: SortKey::default(),
            direction: SortDirection::default(),
            page: 1,
            per_page: per_page.max(1),
        }
    }

    pub fn invoice_type(&self) -> InvoiceType {
        self.invoice_type
    }

    pub fn status(&self) -> Option<InvoiceStatus> {
        self.status
    }

    pub fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.from_date, self.to_date)
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn sort(&self) -> (SortKey, SortDirection) {
        (self.sort, self.direction)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn set_status(&mut self, status: Option<InvoiceStatus>) {
        self.status = status;
        self.page = 1;
    }

    pub fn set_date_range(&mut self, from_date: Option<NaiveDate>, to_date: Option<NaiveDate>) {
        self.from_date = from_date;
        self.to_date = to_date;
        self.page = 1;
    }

    /// Blank text removes the search filter.
    pub fn set_search(&mut self, search: &str) {
        let trimmed = search.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortKey, direction: SortDirection) {
        self.sort = sort;
        self.direction = direction;
        self.page = 1;
    }

    /// Reset status, date range and search. Type and sort are kept.
    pub fn clear(&mut self) {
        self.status = None;
        self.from_date = None;
        self.to_date = None;
        self.search = None;
        self.page = 1;
    }

    pub fn has_active_filters(&self) -> bool {
        self.status.is_some()
            || self.from_date.is_some()
            || self.to_date.is_some()
            || self.search.is_some()
    }

    /// Copy of these filters pointing at `page`.
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Query parameters with unset values stripped.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("type", self.invoice_type.as_str().to_string())];
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(from) = self.from_date {
            query.push(("from_date", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to_date {
            query.push(("to_date", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        query.push(("sort", self.sort.as_str().to_string()));
        query.push(("direction", self.direction.as_str().to_string()));
        query.push(("page", self.page.to_string()));
        query.push(("per_page", self.per_page.to_string()));
        query
    }
}
