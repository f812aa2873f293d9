//! Reference entities picked while building an invoice.
//!
//! These are read-only views of the remote directories (voucher types,
//! customers/vendors, products, ledger accounts). Decoding is lenient because
//! the server mixes numeric and string encodings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use billbook_core::lenient::{self, first_present};
use billbook_core::pagination::{records, unwrap_data};
use billbook_core::{DomainResult, LedgerAccountId, PartyId, ProductId, VoucherTypeId};

use crate::types::InvoiceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryEffect {
    Increase,
    Decrease,
    #[serde(other)]
    None,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherType {
    pub id: VoucherTypeId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::label")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub category: Option<String>,
    #[serde(default)]
    pub inventory_effect: Option<InventoryEffect>,
    #[serde(default = "active", deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

/// Customer or vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    #[serde(default)]
    pub ledger_account_id: Option<LedgerAccountId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::label")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub outstanding_balance: Decimal,
    #[serde(default, deserialize_with = "lenient::label")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Goods,
    Service,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::label")]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub product_type: Option<ProductType>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub sales_price: Decimal,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub purchase_price: Decimal,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub current_stock: Decimal,
}

impl Product {
    /// List price used to prefill a new line's rate.
    pub fn default_rate(&self, invoice_type: InvoiceType) -> Decimal {
        match invoice_type {
            InvoiceType::Sales => self.sales_price,
            InvoiceType::Purchase => self.purchase_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub id: LedgerAccountId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::label")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::label")]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub current_balance: Decimal,
}

/// Reference data for the invoice form (`GET /create?type=`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub voucher_types: Vec<VoucherType>,
    pub parties: Vec<Party>,
    pub products: Vec<Product>,
    pub ledger_accounts: Vec<LedgerAccount>,
}

fn decode_list<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> DomainResult<Vec<T>> {
    value
        .map(records)
        .unwrap_or_default()
        .iter()
        .map(|v| Ok(T::deserialize(v)?))
        .collect()
}

impl FormData {
    /// Decode the form payload. Parties may be listed under `parties`, or
    /// under `customers`/`vendors` depending on the invoice type.
    pub fn from_value(value: &Value, invoice_type: InvoiceType) -> DomainResult<Self> {
        let body = unwrap_data(value);
        let Some(object) = body.as_object() else {
            return Ok(Self::default());
        };

        let party_keys: &[&str] = match invoice_type {
            InvoiceType::Sales => &["parties", "customers"],
            InvoiceType::Purchase => &["parties", "vendors"],
        };

        Ok(Self {
            voucher_types: decode_list(first_present(object, &["voucher_types"]))?,
            parties: decode_list(first_present(object, party_keys))?,
            products: decode_list(first_present(object, &["products"]))?,
            ledger_accounts: decode_list(first_present(object, &["ledger_accounts", "accounts"]))?,
        })
    }

    /// Voucher types the user may pick.
    pub fn active_voucher_types(&self) -> impl Iterator<Item = &VoucherType> {
        self.voucher_types.iter().filter(|v| v.is_active)
    }
}
