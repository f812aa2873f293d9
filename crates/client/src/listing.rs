//! Invoice list aggregator: filters, pagination and statistics.
//!
//! A filter change replaces the loaded rows with page 1. `load_more` appends
//! the next page. Statistics always describe the full filtered query as
//! reported by the server, never the rows loaded so far. A failed fetch leaves
//! rows, metadata, statistics and filters untouched.

use std::sync::Arc;

use chrono::NaiveDate;

use billbook_core::PageMeta;
use billbook_invoicing::{InvoiceRecord, InvoiceStatus, InvoiceType, Statistics};

use crate::error::ClientResult;
use crate::filters::{InvoiceFilters, SortDirection, SortKey};
use crate::gateway::{InvoiceGateway, InvoiceListing};

pub struct InvoiceList {
    gateway: Arc<dyn InvoiceGateway>,
    filters: InvoiceFilters,
    rows: Vec<InvoiceRecord>,
    meta: PageMeta,
    statistics: Statistics,
}

impl InvoiceList {
    pub fn new(gateway: Arc<dyn InvoiceGateway>, invoice_type: InvoiceType, per_page: u32) -> Self {
        Self::with_filters(gateway, InvoiceFilters::new(invoice_type, per_page))
    }

    /// Start from preset filters. Nothing is fetched until [`Self::refresh`].
    pub fn with_filters(gateway: Arc<dyn InvoiceGateway>, filters: InvoiceFilters) -> Self {
        Self {
            gateway,
            filters,
            rows: Vec::new(),
            meta: PageMeta::default(),
            statistics: Statistics::default(),
        }
    }

    pub fn filters(&self) -> &InvoiceFilters {
        &self.filters
    }

    pub fn rows(&self) -> &[InvoiceRecord] {
        &self.rows
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn has_more(&self) -> bool {
        self.meta.has_more()
    }

    /// Reload page 1 with the current filters.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.replace_with(self.filters.at_page(1)).await
    }

    pub async fn set_status(&mut self, status: Option<InvoiceStatus>) -> ClientResult<()> {
        let mut next = self.filters.clone();
        next.set_status(status);
        self.replace_with(next).await
    }

    pub async fn set_search(&mut self, search: &str) -> ClientResult<()> {
        let mut next = self.filters.clone();
        next.set_search(search);
        self.replace_with(next).await
    }

    pub async fn set_date_range(
        &mut self,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> ClientResult<()> {
        let mut next = self.filters.clone();
        next.set_date_range(from_date, to_date);
        self.replace_with(next).await
    }

    pub async fn set_sort(&mut self, sort: SortKey, direction: SortDirection) -> ClientResult<()> {
        let mut next = self.filters.clone();
        next.set_sort(sort, direction);
        self.replace_with(next).await
    }

    pub async fn clear_filters(&mut self) -> ClientResult<()> {
        let mut next = self.filters.clone();
        next.clear();
        self.replace_with(next).await
    }

    pub async fn go_to_page(&mut self, page: u32) -> ClientResult<()> {
        self.replace_with(self.filters.at_page(page)).await
    }

    /// Append the next page. Returns `false` when there was nothing more.
    pub async fn load_more(&mut self) -> ClientResult<bool> {
        if !self.has_more() {
            return Ok(false);
        }
        let next = self.filters.at_page(self.meta.current_page.saturating_add(1));
        let listing = self.fetch(&next).await?;

        self.filters = next;
        self.rows.extend(listing.page.items);
        self.meta = listing.page.meta;
        self.statistics = listing.statistics;
        Ok(true)
    }

    /// Drop a row locally after it was deleted on the server.
    pub fn forget(&mut self, id: billbook_core::InvoiceId) {
        self.rows.retain(|r| r.id != id);
    }

    /// Swap in a row that changed on the server (post, unpost, update).
    pub fn replace_row(&mut self, record: InvoiceRecord) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.id == record.id) {
            *row = record;
        }
    }

    async fn replace_with(&mut self, filters: InvoiceFilters) -> ClientResult<()> {
        let listing = self.fetch(&filters).await?;

        self.filters = filters;
        self.rows = listing.page.items;
        self.meta = listing.page.meta;
        self.statistics = listing.statistics;
        Ok(())
    }

    async fn fetch(&self, filters: &InvoiceFilters) -> ClientResult<InvoiceListing> {
        tracing::debug!(
            invoice_type = %filters.invoice_type(),
            page = filters.page(),
            "fetching invoice page"
        );
        self.gateway.list(filters).await.inspect_err(|err| {
            tracing::warn!(error = %err, "invoice list request failed");
        })
    }
}
