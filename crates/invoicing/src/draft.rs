//! Invoice draft aggregate (builder/editor).
//!
//! Holds the working set of header fields, line items and additional charges
//! while an invoice is created or edited. Items and charges are addressed by
//! position: they have no server ids until persisted, and removing one shifts
//! every later entry down by one.
//!
//! Totals are never stored. [`InvoiceDraft::totals`] recomputes them from the
//! current lines on every call, and each item's `amount` is recomputed after
//! every edit of an amount-bearing field.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use billbook_core::lenient::parse_decimal;
use billbook_core::{DomainError, DomainResult, LedgerAccountId, PartyId, ProductId, VoucherTypeId};

use crate::computation::InvoiceTotals;
use crate::directory::{LedgerAccount, Party, Product};
use crate::payload::{ChargePayload, CreateInvoicePayload, InvoicePayload, ItemPayload};
use crate::record::InvoiceRecord;
use crate::types::{AdditionalCharge, InvoiceItem, InvoiceStatus, InvoiceType};

/// First failing rule of [`InvoiceDraft::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please select a voucher type")]
    MissingVoucherType,
    #[error("please select a {0}")]
    MissingParty(&'static str),
    #[error("please add at least one item")]
    NoItems,
    #[error("item {} needs a product and a quantity greater than zero", .index + 1)]
    IncompleteItem { index: usize },
    #[error("charge {} needs a ledger account", .index + 1)]
    ChargeWithoutAccount { index: usize },
}

/// Editable field of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Product,
    Quantity,
    Rate,
    DiscountPercent,
    VatPercent,
}

/// Editable field of an additional charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeField {
    LedgerAccount,
    Amount,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    invoice_type: InvoiceType,
    voucher_type_id: Option<VoucherTypeId>,
    voucher_date: NaiveDate,
    party_id: Option<PartyId>,
    narration: Option<String>,
    items: Vec<InvoiceItem>,
    charges: Vec<AdditionalCharge>,
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_optional_id<T>(value: &str) -> DomainResult<Option<T>>
where
    T: core::str::FromStr<Err = DomainError>,
{
    match value.trim() {
        "" => Ok(None),
        raw => raw.parse().map(Some),
    }
}

impl InvoiceDraft {
    /// Empty draft: nothing selected, no lines.
    pub fn new(invoice_type: InvoiceType, voucher_date: NaiveDate) -> Self {
        Self {
            invoice_type,
            voucher_type_id: None,
            voucher_date,
            party_id: None,
            narration: None,
            items: Vec::new(),
            charges: Vec::new(),
        }
    }

    /// Seed a draft from a persisted invoice for editing.
    ///
    /// The record is already in canonical shape; item amounts are recomputed
    /// locally rather than trusted.
    pub fn from_record(record: &InvoiceRecord, fallback_type: InvoiceType) -> Self {
        let mut items = record.items.clone();
        items.iter_mut().for_each(InvoiceItem::recompute);

        Self {
            invoice_type: record.invoice_type.unwrap_or(fallback_type),
            voucher_type_id: record.voucher_type_id,
            voucher_date: record
                .voucher_date
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
            party_id: record.party_id,
            narration: record.narration.clone(),
            items,
            charges: record.additional_charges.clone(),
        }
    }

    pub fn invoice_type(&self) -> InvoiceType {
        self.invoice_type
    }

    pub fn voucher_type_id(&self) -> Option<VoucherTypeId> {
        self.voucher_type_id
    }

    pub fn voucher_date(&self) -> NaiveDate {
        self.voucher_date
    }

    pub fn party_id(&self) -> Option<PartyId> {
        self.party_id
    }

    pub fn narration(&self) -> Option<&str> {
        self.narration.as_deref()
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    pub fn charges(&self) -> &[AdditionalCharge] {
        &self.charges
    }

    pub fn set_voucher_type(&mut self, voucher_type_id: Option<VoucherTypeId>) {
        self.voucher_type_id = voucher_type_id;
    }

    pub fn set_voucher_date(&mut self, voucher_date: NaiveDate) {
        self.voucher_date = voucher_date;
    }

    pub fn set_party(&mut self, party_id: Option<PartyId>) {
        self.party_id = party_id;
    }

    /// Bind a party picked from the directory lookup.
    pub fn select_party(&mut self, party: &Party) {
        self.party_id = Some(party.id);
    }

    pub fn set_narration(&mut self, narration: &str) {
        self.narration = optional_text(narration);
    }

    // ---------------------------------------------------------------------
    // Line items
    // ---------------------------------------------------------------------

    /// Append a blank line and return its index.
    pub fn add_item(&mut self) -> usize {
        self.push_item(InvoiceItem::blank())
    }

    /// Append a prepared line (e.g. [`InvoiceItem::for_product`]).
    pub fn push_item(&mut self, mut item: InvoiceItem) -> usize {
        item.recompute();
        self.items.push(item);
        self.items.len() - 1
    }

    /// Edit one field of the line at `index` from raw form text.
    ///
    /// Numeric fields treat blank or non-numeric text as zero. The product
    /// field accepts an id or blank (unselect).
    pub fn update_item(&mut self, index: usize, field: ItemField, value: &str) -> DomainResult<()> {
        let product = match field {
            ItemField::Product => Some(parse_optional_id::<ProductId>(value)?),
            _ => None,
        };

        let item = self.item_mut(index)?;
        match field {
            ItemField::Product => item.product_id = product.flatten(),
            ItemField::Quantity => item.quantity = parse_decimal(value),
            ItemField::Rate => item.rate = parse_decimal(value),
            ItemField::DiscountPercent => item.discount_percent = parse_decimal(value),
            ItemField::VatPercent => item.vat_percent = parse_decimal(value),
        }
        item.recompute();
        Ok(())
    }

    /// Bind a product picked from the directory lookup. The rate is left as is.
    pub fn select_item_product(&mut self, index: usize, product: &Product) -> DomainResult<()> {
        self.item_mut(index)?.product_id = Some(product.id);
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> DomainResult<InvoiceItem> {
        if index >= self.items.len() {
            return Err(Self::out_of_range("item", index, self.items.len()));
        }
        Ok(self.items.remove(index))
    }

    fn item_mut(&mut self, index: usize) -> DomainResult<&mut InvoiceItem> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or_else(|| Self::out_of_range("item", index, len))
    }

    // ---------------------------------------------------------------------
    // Additional charges
    // ---------------------------------------------------------------------

    pub fn add_charge(&mut self) -> usize {
        self.charges.push(AdditionalCharge::default());
        self.charges.len() - 1
    }

    pub fn update_charge(&mut self, index: usize, field: ChargeField, value: &str) -> DomainResult<()> {
        let account = match field {
            ChargeField::LedgerAccount => Some(parse_optional_id::<LedgerAccountId>(value)?),
            _ => None,
        };

        let charge = self.charge_mut(index)?;
        match field {
            ChargeField::LedgerAccount => charge.ledger_account_id = account.flatten(),
            ChargeField::Amount => charge.amount = parse_decimal(value),
            ChargeField::Description => charge.description = optional_text(value),
        }
        Ok(())
    }

    /// Bind a ledger account picked from the directory lookup.
    pub fn select_charge_account(&mut self, index: usize, account: &LedgerAccount) -> DomainResult<()> {
        self.charge_mut(index)?.ledger_account_id = Some(account.id);
        Ok(())
    }

    pub fn remove_charge(&mut self, index: usize) -> DomainResult<AdditionalCharge> {
        if index >= self.charges.len() {
            return Err(Self::out_of_range("charge", index, self.charges.len()));
        }
        Ok(self.charges.remove(index))
    }

    fn charge_mut(&mut self, index: usize) -> DomainResult<&mut AdditionalCharge> {
        let len = self.charges.len();
        self.charges
            .get_mut(index)
            .ok_or_else(|| Self::out_of_range("charge", index, len))
    }

    fn out_of_range(what: &str, index: usize, len: usize) -> DomainError {
        DomainError::invariant(format!("no {what} at index {index} (have {len})"))
    }

    // ---------------------------------------------------------------------
    // Derived values and validation
    // ---------------------------------------------------------------------

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_amounts(
            self.items.iter().map(|i| i.amount),
            self.charges.iter().map(|c| c.amount),
        )
    }

    /// Fail fast on the first violated rule, in priority order.
    ///
    /// Rates, discounts and VAT are deliberately not range-checked.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.voucher_type_id.is_none() {
            return Err(ValidationError::MissingVoucherType);
        }
        if self.party_id.is_none() {
            return Err(ValidationError::MissingParty(
                self.invoice_type.party_kind().as_str(),
            ));
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        if let Some(index) = self
            .items
            .iter()
            .position(|i| i.product_id.is_none() || i.quantity <= Decimal::ZERO)
        {
            return Err(ValidationError::IncompleteItem { index });
        }
        if let Some(index) = self
            .charges
            .iter()
            .position(|c| c.ledger_account_id.is_none())
        {
            return Err(ValidationError::ChargeWithoutAccount { index });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Request body for `PUT /{id}`. Validates first.
    pub fn to_payload(&self) -> Result<InvoicePayload, ValidationError> {
        self.validate()?;

        // validate() guarantees every id below is present.
        let items = self
            .items
            .iter()
            .filter_map(|item| {
                item.product_id.map(|product_id| ItemPayload {
                    product_id,
                    quantity: item.quantity,
                    rate: item.rate,
                    discount_percent: item.discount_percent,
                    vat_percent: item.vat_percent,
                    amount: item.amount,
                })
            })
            .collect();
        let additional_charges = self
            .charges
            .iter()
            .filter_map(|charge| {
                charge.ledger_account_id.map(|ledger_account_id| ChargePayload {
                    ledger_account_id,
                    amount: charge.amount,
                    description: charge.description.clone(),
                })
            })
            .collect();

        Ok(InvoicePayload {
            invoice_type: self.invoice_type,
            voucher_type_id: self.voucher_type_id.ok_or(ValidationError::MissingVoucherType)?,
            voucher_date: self.voucher_date,
            party_id: self.party_id.ok_or(ValidationError::MissingParty(
                self.invoice_type.party_kind().as_str(),
            ))?,
            narration: self.narration.clone(),
            items,
            additional_charges,
        })
    }

    /// Request body for `POST /`. Validates first.
    pub fn to_create_payload(&self, status: InvoiceStatus) -> Result<CreateInvoicePayload, ValidationError> {
        Ok(CreateInvoicePayload {
            invoice: self.to_payload()?,
            status,
        })
    }
}
