//! Invoicing domain module (sales and purchase vouchers).
//!
//! This crate contains the business rules of the invoice core, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage):
//! line-item computation, the draft aggregate and its validation, the
//! draft/posted lifecycle, and the normalization of server payloads into
//! canonical read models.

pub mod computation;
pub mod directory;
pub mod draft;
pub mod lifecycle;
pub mod payload;
pub mod record;
pub mod types;

pub use computation::{InvoiceTotals, LineBreakdown, LineInput, compute_line};
pub use directory::{
    FormData, InventoryEffect, LedgerAccount, Party, Product, ProductType, VoucherType,
};
pub use draft::{ChargeField, InvoiceDraft, ItemField, ValidationError};
pub use lifecycle::{LifecycleAction, transition};
pub use payload::{ChargePayload, CreateInvoicePayload, InvoicePayload, ItemPayload};
pub use record::{InvoiceEntry, InvoiceRecord, Statistics};
pub use types::{AdditionalCharge, InvoiceItem, InvoiceStatus, InvoiceType, PartyKind};
