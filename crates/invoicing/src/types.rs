//! Core invoice value types shared by the draft aggregate and read models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billbook_core::{LedgerAccountId, ProductId};

use crate::computation::{LineBreakdown, LineInput, compute_line};
use crate::directory::Product;

/// Sales or purchase voucher. Fixed for a whole screen, not a user filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    Sales,
    Purchase,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Sales => "sales",
            InvoiceType::Purchase => "purchase",
        }
    }

    /// Customers are invoiced on sales, vendors on purchases.
    pub fn party_kind(&self) -> PartyKind {
        match self {
            InvoiceType::Sales => PartyKind::Customer,
            InvoiceType::Purchase => PartyKind::Vendor,
        }
    }
}

impl core::fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for InvoiceType {
    type Err = billbook_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sales" | "sale" => Ok(InvoiceType::Sales),
            "purchase" | "purchases" => Ok(InvoiceType::Purchase),
            other => Err(billbook_core::DomainError::validation(format!(
                "unknown invoice type: {other}"
            ))),
        }
    }
}

/// Persisted invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Posted,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Posted => "posted",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Party discriminator used by the directory search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Customer,
    Vendor,
}

impl PartyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyKind::Customer => "customer",
            PartyKind::Vendor => "vendor",
        }
    }
}

/// Invoice line item in canonical shape.
///
/// `amount` is derived from the other fields; the draft aggregate recomputes
/// it after every edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub product_id: Option<ProductId>,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub discount_percent: Decimal,
    pub vat_percent: Decimal,
    pub amount: Decimal,
}

impl InvoiceItem {
    /// Blank line: quantity 1, everything else zero.
    pub fn blank() -> Self {
        Self::new(None, LineInput::new(Decimal::ONE, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO))
    }

    pub fn new(product_id: Option<ProductId>, input: LineInput) -> Self {
        let mut item = Self {
            product_id,
            quantity: input.quantity,
            rate: input.rate,
            discount_percent: input.discount_percent,
            vat_percent: input.vat_percent,
            amount: Decimal::ZERO,
        };
        item.recompute();
        item
    }

    /// Line for `product` with its list price as the default rate.
    pub fn for_product(product: &Product, invoice_type: InvoiceType) -> Self {
        Self::new(
            Some(product.id),
            LineInput::new(
                Decimal::ONE,
                product.default_rate(invoice_type),
                Decimal::ZERO,
                Decimal::ZERO,
            ),
        )
    }

    pub fn input(&self) -> LineInput {
        LineInput::new(self.quantity, self.rate, self.discount_percent, self.vat_percent)
    }

    pub fn breakdown(&self) -> LineBreakdown {
        compute_line(&self.input())
    }

    pub fn recompute(&mut self) {
        self.amount = self.breakdown().amount;
    }
}

impl Default for InvoiceItem {
    fn default() -> Self {
        Self::blank()
    }
}

/// Flat charge posted against a ledger account. Its amount is entered as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalCharge {
    pub ledger_account_id: Option<LedgerAccountId>,
    pub amount: Decimal,
    pub description: Option<String>,
}
