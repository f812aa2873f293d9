//! `billbook-core`: shared building blocks for the invoice client.
//!
//! This crate contains **pure** primitives (no IO): the domain error model,
//! strongly-typed server identifiers, lenient decoding of wire values and the
//! pagination normalizer shared by every list endpoint.

pub mod error;
pub mod id;
pub mod lenient;
pub mod pagination;

pub use error::{DomainError, DomainResult};
pub use id::{InvoiceId, LedgerAccountId, PartyId, ProductId, VoucherTypeId};
pub use pagination::{Page, PageMeta};
