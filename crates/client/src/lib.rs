//! `billbook-client`
//!
//! **Responsibility:** talk to the invoice API on behalf of a screen.
//!
//! This crate provides:
//! - Configuration from the environment
//! - The `InvoiceGateway` seam and its HTTP implementation
//! - Debounced directory lookups
//! - The invoice list aggregator (filters, pagination, statistics)
//! - The lifecycle controller (create, update, delete, post, unpost)
//!
//! All domain rules live in `billbook-invoicing`; this crate only sequences
//! requests around them.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod filters;
pub mod gateway;
pub mod http;
pub mod listing;
pub mod lookup;

pub use config::ClientConfig;
pub use controller::{Confirm, InvoiceController, Outcome};
pub use debounce::DebouncedQuery;
pub use error::{ClientError, ClientResult};
pub use filters::{InvoiceFilters, SortDirection, SortKey};
pub use gateway::{InvoiceGateway, InvoiceListing};
pub use http::HttpInvoiceGateway;
pub use listing::InvoiceList;
pub use lookup::DirectoryLookup;
