//! Request bodies for the invoice endpoints.
//!
//! Monetary values are held as [`Decimal`] and go on the wire as plain JSON
//! numbers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use billbook_core::{LedgerAccountId, PartyId, ProductId, VoucherTypeId};

use crate::types::{InvoiceStatus, InvoiceType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemPayload {
    pub product_id: ProductId,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargePayload {
    pub ledger_account_id: LedgerAccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /{id}`.
///
/// The invoice type travels as the `type` query parameter, not in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoicePayload {
    #[serde(skip)]
    pub invoice_type: InvoiceType,
    pub voucher_type_id: VoucherTypeId,
    pub voucher_date: NaiveDate,
    pub party_id: PartyId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
    pub items: Vec<ItemPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_charges: Vec<ChargePayload>,
}

/// Body of `POST /`: the update body plus the initial status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateInvoicePayload {
    #[serde(flatten)]
    pub invoice: InvoicePayload,
    pub status: InvoiceStatus,
}

impl CreateInvoicePayload {
    pub fn invoice_type(&self) -> InvoiceType {
        self.invoice.invoice_type
    }
}
