//! Seam between the invoice workflow and the remote API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use billbook_core::{InvoiceId, Page};
use billbook_invoicing::{
    CreateInvoicePayload, FormData, InvoicePayload, InvoiceRecord, InvoiceType, LedgerAccount,
    Party, PartyKind, Product, Statistics,
};

use crate::error::ClientResult;
use crate::filters::InvoiceFilters;

/// One list response: the page of rows plus statistics over the whole
/// filtered query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceListing {
    pub page: Page<InvoiceRecord>,
    pub statistics: Statistics,
}

/// Remote invoice endpoints (`/accounting/invoices`).
///
/// Implementations perform exactly one request per call: no retries, no
/// caching.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    /// `GET /create?type=`
    async fn form_data(&self, invoice_type: InvoiceType) -> ClientResult<FormData>;

    /// `GET /?<filters>`
    async fn list(&self, filters: &InvoiceFilters) -> ClientResult<InvoiceListing>;

    /// `GET /{id}`
    async fn show(&self, id: InvoiceId, invoice_type: InvoiceType) -> ClientResult<InvoiceRecord>;

    /// `POST /`
    async fn create(&self, payload: &CreateInvoicePayload) -> ClientResult<InvoiceRecord>;

    /// `PUT /{id}`
    async fn update(&self, id: InvoiceId, payload: &InvoicePayload) -> ClientResult<InvoiceRecord>;

    /// `DELETE /{id}`
    async fn delete(&self, id: InvoiceId, invoice_type: InvoiceType) -> ClientResult<()>;

    /// `POST /{id}/post`. Returns the updated invoice when the server sends it.
    async fn post(&self, id: InvoiceId, invoice_type: InvoiceType) -> ClientResult<Option<InvoiceRecord>>;

    /// `POST /{id}/unpost`. Returns the updated invoice when the server sends it.
    async fn unpost(&self, id: InvoiceId, invoice_type: InvoiceType) -> ClientResult<Option<InvoiceRecord>>;

    /// `GET /search-customers?search=&type=`
    async fn search_parties(&self, query: &str, kind: PartyKind) -> ClientResult<Vec<Party>>;

    /// `GET /search-products?search=&type=`
    async fn search_products(&self, query: &str, invoice_type: InvoiceType) -> ClientResult<Vec<Product>>;

    /// `GET /search-ledger-accounts?search=`
    async fn search_ledger_accounts(&self, query: &str) -> ClientResult<Vec<LedgerAccount>>;
}
