//! Read models of persisted invoices.
//!
//! [`InvoiceRecord::from_value`] is the single load boundary: the server names
//! the same field differently depending on the endpoint (`discount` or
//! `discount_percentage`, `vat_rate` or `tax_percentage`, `amount` or `total`)
//! and every alias is resolved here into the canonical shape.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use billbook_core::lenient::{
    self, decimal_from_value, first_present, label_from_value, parse_date, parse_timestamp,
};
use billbook_core::pagination::{records, unwrap_data};
use billbook_core::{DomainError, DomainResult, InvoiceId, LedgerAccountId, PartyId, ProductId, VoucherTypeId};

use crate::types::{AdditionalCharge, InvoiceItem, InvoiceStatus, InvoiceType};

/// Ledger line produced by posting. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceEntry {
    pub ledger_account_id: Option<LedgerAccountId>,
    pub ledger_account_name: Option<String>,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub particulars: Option<String>,
}

/// Server-computed aggregates over the whole filtered query, not the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, deserialize_with = "lenient::count")]
    pub total_invoices: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub draft_invoices: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub posted_invoices: u64,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_sales_amount: Decimal,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_purchase_amount: Decimal,
}

impl Statistics {
    /// Statistics block of a list response, at the top level or under `data`.
    /// Absent statistics decode as all zeros.
    pub fn from_envelope(envelope: &Value) -> DomainResult<Self> {
        let block = envelope
            .get("statistics")
            .or_else(|| unwrap_data(envelope).get("statistics"))
            .filter(|v| v.is_object());
        match block {
            Some(value) => Ok(Self::deserialize(value)?),
            None => Ok(Self::default()),
        }
    }

    /// Amount total matching the screen's invoice type.
    pub fn amount_for(&self, invoice_type: InvoiceType) -> Decimal {
        match invoice_type {
            InvoiceType::Sales => self.total_sales_amount,
            InvoiceType::Purchase => self.total_purchase_amount,
        }
    }
}

/// Invoice as returned by `GET /{id}` or a list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub number: Option<String>,
    pub invoice_type: Option<InvoiceType>,
    pub status: InvoiceStatus,
    pub voucher_type_id: Option<VoucherTypeId>,
    pub voucher_type_name: Option<String>,
    pub voucher_date: Option<NaiveDate>,
    pub party_id: Option<PartyId>,
    pub party_name: Option<String>,
    pub narration: Option<String>,
    pub items: Vec<InvoiceItem>,
    pub additional_charges: Vec<AdditionalCharge>,
    pub entries: Vec<InvoiceEntry>,
    pub total_amount: Decimal,
    pub posted_at: Option<DateTime<Utc>>,
    pub posted_by: Option<String>,
}

fn object_of(value: &Value) -> DomainResult<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| DomainError::malformed("expected an invoice object"))
}

/// Id under any of `keys`, either bare or as the `id` of a nested object.
fn id_at<T: DeserializeOwned>(object: &Map<String, Value>, keys: &[&str]) -> Option<T> {
    keys.iter().filter_map(|k| object.get(*k)).find_map(|v| {
        let raw = match v {
            Value::Object(nested) => nested.get("id")?,
            other => other,
        };
        T::deserialize(raw).ok()
    })
}

fn decimal_at(object: &Map<String, Value>, keys: &[&str]) -> Decimal {
    first_present(object, keys)
        .map(decimal_from_value)
        .unwrap_or_default()
}

fn label_at(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| object.get(*k))
        .find_map(label_from_value)
}

fn list_at<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    first_present(object, keys).map(records).unwrap_or_default()
}

fn item_from_value(value: &Value) -> DomainResult<InvoiceItem> {
    let object = object_of(value)?;
    let mut item = InvoiceItem {
        product_id: id_at(object, &["product_id", "product"]),
        quantity: decimal_at(object, &["quantity", "qty"]),
        rate: decimal_at(object, &["rate", "unit_price", "price"]),
        discount_percent: decimal_at(
            object,
            &["discount_percent", "discount", "discount_percentage"],
        ),
        vat_percent: decimal_at(object, &["vat_percent", "vat_rate", "tax_percentage", "vat"]),
        amount: decimal_at(object, &["amount", "total"]),
    };
    item.recompute();
    Ok(item)
}

fn charge_from_value(value: &Value) -> DomainResult<AdditionalCharge> {
    let object = object_of(value)?;
    Ok(AdditionalCharge {
        ledger_account_id: id_at(object, &["ledger_account_id", "ledger_account", "account_id"]),
        amount: decimal_at(object, &["amount", "total"]),
        description: label_at(object, &["description", "particulars"]),
    })
}

fn entry_from_value(value: &Value) -> DomainResult<InvoiceEntry> {
    let object = object_of(value)?;
    Ok(InvoiceEntry {
        ledger_account_id: id_at(object, &["ledger_account_id", "ledger_account", "account_id"]),
        ledger_account_name: label_at(object, &["ledger_account_name", "ledger_account", "account"]),
        debit_amount: decimal_at(object, &["debit_amount", "debit"]),
        credit_amount: decimal_at(object, &["credit_amount", "credit"]),
        particulars: label_at(object, &["particulars", "description", "narration"]),
    })
}

fn status_of(object: &Map<String, Value>) -> InvoiceStatus {
    match first_present(object, &["status"]).and_then(Value::as_str) {
        Some(s) if s.eq_ignore_ascii_case("posted") => InvoiceStatus::Posted,
        Some(_) => InvoiceStatus::Draft,
        None if first_present(object, &["posted_at"]).is_some() => InvoiceStatus::Posted,
        None => InvoiceStatus::Draft,
    }
}

impl InvoiceRecord {
    /// Decode an invoice from any endpoint, tolerating a `data` wrapper and
    /// every known field alias.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        let body = unwrap_data(value);
        let body = body.get("invoice").filter(|v| v.is_object()).unwrap_or(body);
        let object = object_of(body)?;

        let id = id_at(object, &["id"])
            .ok_or_else(|| DomainError::malformed("invoice has no id"))?;

        let items = list_at(object, &["items", "invoice_items", "line_items"])
            .iter()
            .map(item_from_value)
            .collect::<DomainResult<Vec<_>>>()?;
        let additional_charges = list_at(object, &["additional_charges", "charges"])
            .iter()
            .map(charge_from_value)
            .collect::<DomainResult<Vec<_>>>()?;
        let entries = list_at(object, &["entries", "ledger_entries"])
            .iter()
            .map(entry_from_value)
            .collect::<DomainResult<Vec<_>>>()?;

        let total_amount = match first_present(object, &["total_amount", "grand_total", "total"]) {
            Some(v) => decimal_from_value(v),
            None => crate::computation::InvoiceTotals::from_amounts(
                items.iter().map(|i| i.amount),
                additional_charges.iter().map(|c| c.amount),
            )
            .grand_total,
        };

        Ok(Self {
            id,
            number: label_at(object, &["invoice_number", "voucher_number", "number"]),
            invoice_type: first_present(object, &["type", "invoice_type"])
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok()),
            status: status_of(object),
            voucher_type_id: id_at(object, &["voucher_type_id", "voucher_type"]),
            voucher_type_name: label_at(object, &["voucher_type_name", "voucher_type"]),
            voucher_date: first_present(object, &["voucher_date", "date"])
                .and_then(Value::as_str)
                .and_then(parse_date),
            party_id: id_at(object, &["party_id", "customer_id", "vendor_id", "party"]),
            party_name: label_at(object, &["party_name", "party", "customer", "vendor"]),
            narration: label_at(object, &["narration"]),
            items,
            additional_charges,
            entries,
            total_amount,
            posted_at: first_present(object, &["posted_at"])
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
            posted_by: label_at(object, &["posted_by", "posted_by_name", "posted_by_user"]),
        })
    }

    pub fn is_draft(&self) -> bool {
        self.status == InvoiceStatus::Draft
    }

    pub fn is_posted(&self) -> bool {
        self.status == InvoiceStatus::Posted
    }

    /// Product ids referenced by the lines, for the edit screen's lookups.
    pub fn product_ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.items.iter().filter_map(|i| i.product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn aliases_resolve_to_canonical_item_fields() {
        let record = InvoiceRecord::from_value(&json!({
            "success": true,
            "data": {
                "id": "12",
                "voucher_number": "SI-0012",
                "type": "sales",
                "status": "draft",
                "voucher_type": {"id": 1, "name": "Sales Invoice"},
                "voucher_date": "2024-05-01T00:00:00.000000Z",
                "party": {"id": 7, "name": "ACME Ltd"},
                "items": [
                    {"product_id": 3, "quantity": "2", "rate": "500.00",
                     "discount_percentage": 0, "tax_percentage": "7.5", "total": "1075.00"},
                    {"product": {"id": 4}, "quantity": 10, "rate": 100,
                     "discount": 10, "vat_rate": 10, "amount": 0}
                ],
                "charges": [{"ledger_account": {"id": 40, "name": "Freight"}, "amount": "50"}],
                "total_amount": "2115.00"
            }
        }))
        .unwrap();

        assert_eq!(record.id, InvoiceId::new(12));
        assert_eq!(record.number.as_deref(), Some("SI-0012"));
        assert_eq!(record.invoice_type, Some(InvoiceType::Sales));
        assert!(record.is_draft());
        assert_eq!(record.voucher_type_id, Some(VoucherTypeId::new(1)));
        assert_eq!(record.voucher_type_name.as_deref(), Some("Sales Invoice"));
        assert_eq!(record.voucher_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(record.party_id, Some(PartyId::new(7)));
        assert_eq!(record.party_name.as_deref(), Some("ACME Ltd"));

        assert_eq!(record.items[0].vat_percent, dec!(7.5));
        assert_eq!(record.items[0].amount, dec!(1075));
        assert_eq!(record.items[1].product_id, Some(ProductId::new(4)));
        assert_eq!(record.items[1].discount_percent, dec!(10));
        // stale server amount is replaced by the local computation
        assert_eq!(record.items[1].amount, dec!(990));
        assert_eq!(record.additional_charges[0].ledger_account_id, Some(LedgerAccountId::new(40)));
        assert_eq!(record.total_amount, dec!(2115));
        assert_eq!(record.product_ids().count(), 2);
    }

    #[test]
    fn posted_record_with_entries_and_poster() {
        let record = InvoiceRecord::from_value(&json!({
            "id": 5,
            "status": "posted",
            "posted_at": "2024-05-02 09:30:00",
            "posted_by": {"id": 1, "name": "Admin"},
            "ledger_entries": [
                {"ledger_account": {"id": 10, "name": "Receivables"}, "debit": "1125", "credit": 0},
                {"ledger_account_id": 20, "debit_amount": 0, "credit_amount": 1125, "particulars": "Sales"}
            ]
        }))
        .unwrap();

        assert!(record.is_posted());
        assert!(record.posted_at.is_some());
        assert_eq!(record.posted_by.as_deref(), Some("Admin"));
        assert_eq!(record.entries.len(), 2);
        assert_eq!(record.entries[0].ledger_account_name.as_deref(), Some("Receivables"));
        assert_eq!(record.entries[0].debit_amount, dec!(1125));
        assert_eq!(record.entries[1].credit_amount, dec!(1125));
        assert_eq!(record.entries[1].particulars.as_deref(), Some("Sales"));
        assert_eq!(record.total_amount, Decimal::ZERO);
    }

    #[test]
    fn missing_total_is_derived_from_lines() {
        let record = InvoiceRecord::from_value(&json!({
            "id": 1,
            "items": [{"product_id": 1, "quantity": 2, "rate": 500, "vat_percent": 7.5}],
            "additional_charges": [{"ledger_account_id": 2, "amount": 50}]
        }))
        .unwrap();
        assert_eq!(record.total_amount, dec!(1125));
    }

    #[test]
    fn record_without_id_is_malformed() {
        let err = InvoiceRecord::from_value(&json!({"data": {"status": "draft"}})).unwrap_err();
        assert!(matches!(err, DomainError::Malformed(_)));
    }

    #[test]
    fn statistics_found_at_top_level_or_under_data() {
        let top = Statistics::from_envelope(&json!({
            "data": [],
            "statistics": {"total_invoices": "42", "draft_invoices": 2, "posted_invoices": 40,
                           "total_sales_amount": "99000.50", "total_purchase_amount": null}
        }))
        .unwrap();
        assert_eq!(top.total_invoices, 42);
        assert_eq!(top.amount_for(InvoiceType::Sales), dec!(99000.50));
        assert_eq!(top.total_purchase_amount, Decimal::ZERO);

        let nested = Statistics::from_envelope(&json!({
            "data": {"invoices": {"data": []}, "statistics": {"total_invoices": 3}}
        }))
        .unwrap();
        assert_eq!(nested.total_invoices, 3);

        assert_eq!(Statistics::from_envelope(&json!([])).unwrap(), Statistics::default());
    }
}
