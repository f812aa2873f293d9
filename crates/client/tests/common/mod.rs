//! In-memory `InvoiceGateway` used by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::Notify;

use billbook_client::{ClientError, ClientResult, InvoiceFilters, InvoiceGateway, InvoiceListing};
use billbook_core::{InvoiceId, Page, PageMeta};
use billbook_invoicing::{
    CreateInvoicePayload, FormData, InvoiceItem, InvoicePayload, InvoiceRecord, InvoiceStatus,
    InvoiceType, LedgerAccount, Party, PartyKind, Product, Statistics,
};

pub const POSTED_REJECTION: &str = "Posted invoices cannot be modified.";

#[derive(Default)]
pub struct FakeGateway {
    pub invoices: Mutex<BTreeMap<InvoiceId, InvoiceRecord>>,
    pub calls: Mutex<Vec<String>>,
    pub list_requests: Mutex<Vec<InvoiceFilters>>,
    pub parties: Vec<Party>,
    pub products: Vec<Product>,
    pub ledger_accounts: Vec<LedgerAccount>,
    /// Error returned by the next call, whatever it is.
    pub fail_next: Mutex<Option<ClientError>>,
    /// When set, post/unpost answer without a body and the controller must re-fetch.
    pub bodyless_status_changes: AtomicBool,
    /// When set, post waits for this before answering.
    pub hold_post: Option<Arc<Notify>>,
    next_id: AtomicI64,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        }
    }

    pub fn with_invoices(records: impl IntoIterator<Item = InvoiceRecord>) -> Self {
        let gateway = Self::new();
        {
            let mut invoices = gateway.invoices.lock().unwrap();
            for record in records {
                invoices.insert(record.id, record);
            }
        }
        gateway
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_next(&self, err: ClientError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    pub fn stored(&self, id: InvoiceId) -> Option<InvoiceRecord> {
        self.invoices.lock().unwrap().get(&id).cloned()
    }

    pub fn set_status(&self, id: InvoiceId, status: InvoiceStatus) {
        if let Some(record) = self.invoices.lock().unwrap().get_mut(&id) {
            record.status = status;
        }
    }

    fn record_call(&self, call: String) -> ClientResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn rejected() -> ClientError {
        ClientError::Api {
            status: 422,
            message: Some(POSTED_REJECTION.to_string()),
        }
    }

    fn apply(record: &mut InvoiceRecord, payload: &InvoicePayload) {
        record.voucher_type_id = Some(payload.voucher_type_id);
        record.voucher_date = Some(payload.voucher_date);
        record.party_id = Some(payload.party_id);
        record.narration = payload.narration.clone();
        record.items = payload
            .items
            .iter()
            .map(|i| InvoiceItem {
                product_id: Some(i.product_id),
                quantity: i.quantity,
                rate: i.rate,
                discount_percent: i.discount_percent,
                vat_percent: i.vat_percent,
                amount: i.amount,
            })
            .collect();
        record.additional_charges = payload
            .additional_charges
            .iter()
            .map(|c| billbook_invoicing::AdditionalCharge {
                ledger_account_id: Some(c.ledger_account_id),
                amount: c.amount,
                description: c.description.clone(),
            })
            .collect();
        record.total_amount = record.items.iter().map(|i| i.amount).sum::<Decimal>()
            + record.additional_charges.iter().map(|c| c.amount).sum::<Decimal>();
    }

    fn change_status(&self, id: InvoiceId, from: InvoiceStatus, to: InvoiceStatus) -> ClientResult<Option<InvoiceRecord>> {
        let mut invoices = self.invoices.lock().unwrap();
        let record = invoices.get_mut(&id).ok_or(ClientError::Api {
            status: 404,
            message: Some("Invoice not found.".into()),
        })?;
        if record.status != from {
            return Err(ClientError::Api {
                status: 422,
                message: Some(format!("Invoice is not {from}.")),
            });
        }
        record.status = to;
        record.posted_by = (to == InvoiceStatus::Posted).then(|| "Tester".to_string());
        if self.bodyless_status_changes.load(Ordering::Acquire) {
            Ok(None)
        } else {
            Ok(Some(record.clone()))
        }
    }
}

pub fn record(id: i64, status: InvoiceStatus, party: &str, total: i64) -> InvoiceRecord {
    InvoiceRecord {
        id: InvoiceId::new(id),
        number: Some(format!("SI-{id:04}")),
        invoice_type: Some(InvoiceType::Sales),
        status,
        voucher_type_id: None,
        voucher_type_name: None,
        voucher_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        party_id: None,
        party_name: Some(party.to_string()),
        narration: None,
        items: Vec::new(),
        additional_charges: Vec::new(),
        entries: Vec::new(),
        total_amount: Decimal::from(total),
        posted_at: None,
        posted_by: None,
    }
}

#[async_trait]
impl InvoiceGateway for FakeGateway {
    async fn form_data(&self, invoice_type: InvoiceType) -> ClientResult<FormData> {
        self.record_call(format!("form_data {invoice_type}"))?;
        Ok(FormData {
            voucher_types: Vec::new(),
            parties: self.parties.clone(),
            products: self.products.clone(),
            ledger_accounts: self.ledger_accounts.clone(),
        })
    }

    async fn list(&self, filters: &InvoiceFilters) -> ClientResult<InvoiceListing> {
        self.record_call(format!("list page={}", filters.page()))?;
        self.list_requests.lock().unwrap().push(filters.clone());

        let needle = filters.search().map(str::to_lowercase);
        let matching: Vec<InvoiceRecord> = self
            .invoices
            .lock()
            .unwrap()
            .values()
            .filter(|r| filters.status().is_none_or(|s| r.status == s))
            .filter(|r| match &needle {
                Some(n) => r
                    .party_name
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains(n)),
                None => true,
            })
            .cloned()
            .collect();

        let statistics = Statistics {
            total_invoices: matching.len() as u64,
            draft_invoices: matching.iter().filter(|r| r.is_draft()).count() as u64,
            posted_invoices: matching.iter().filter(|r| r.is_posted()).count() as u64,
            total_sales_amount: matching.iter().map(|r| r.total_amount).sum(),
            total_purchase_amount: Decimal::ZERO,
        };

        let per_page = filters.per_page() as usize;
        let total = matching.len() as u64;
        let start = (filters.page() as usize - 1) * per_page;
        let items: Vec<InvoiceRecord> = matching.into_iter().skip(start).take(per_page).collect();
        let last_page = total.div_ceil(per_page as u64).max(1) as u32;
        let meta = PageMeta {
            current_page: filters.page(),
            last_page,
            per_page: per_page as u32,
            total,
            from: (!items.is_empty()).then_some(start as u64 + 1),
            to: (!items.is_empty()).then_some((start + items.len()) as u64),
        };

        Ok(InvoiceListing {
            page: Page { items, meta },
            statistics,
        })
    }

    async fn show(&self, id: InvoiceId, _invoice_type: InvoiceType) -> ClientResult<InvoiceRecord> {
        self.record_call(format!("show {id}"))?;
        self.stored(id).ok_or(ClientError::Api {
            status: 404,
            message: Some("Invoice not found.".into()),
        })
    }

    async fn create(&self, payload: &CreateInvoicePayload) -> ClientResult<InvoiceRecord> {
        self.record_call(format!("create {}", payload.status))?;
        let id = InvoiceId::new(self.next_id.fetch_add(1, Ordering::AcqRel));
        let mut created = record(id.get(), payload.status, "", 0);
        created.party_name = None;
        created.invoice_type = Some(payload.invoice_type());
        Self::apply(&mut created, &payload.invoice);
        self.invoices.lock().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: InvoiceId, payload: &InvoicePayload) -> ClientResult<InvoiceRecord> {
        self.record_call(format!("update {id}"))?;
        let mut invoices = self.invoices.lock().unwrap();
        let record = invoices.get_mut(&id).ok_or(ClientError::Api { status: 404, message: None })?;
        if record.is_posted() {
            return Err(Self::rejected());
        }
        Self::apply(record, payload);
        Ok(record.clone())
    }

    async fn delete(&self, id: InvoiceId, _invoice_type: InvoiceType) -> ClientResult<()> {
        self.record_call(format!("delete {id}"))?;
        let mut invoices = self.invoices.lock().unwrap();
        match invoices.get(&id) {
            Some(r) if r.is_posted() => Err(Self::rejected()),
            Some(_) => {
                invoices.remove(&id);
                Ok(())
            }
            None => Err(ClientError::Api { status: 404, message: None }),
        }
    }

    async fn post(&self, id: InvoiceId, _invoice_type: InvoiceType) -> ClientResult<Option<InvoiceRecord>> {
        self.record_call(format!("post {id}"))?;
        if let Some(hold) = &self.hold_post {
            hold.notified().await;
        }
        self.change_status(id, InvoiceStatus::Draft, InvoiceStatus::Posted)
    }

    async fn unpost(&self, id: InvoiceId, _invoice_type: InvoiceType) -> ClientResult<Option<InvoiceRecord>> {
        self.record_call(format!("unpost {id}"))?;
        self.change_status(id, InvoiceStatus::Posted, InvoiceStatus::Draft)
    }

    async fn search_parties(&self, query: &str, kind: PartyKind) -> ClientResult<Vec<Party>> {
        self.record_call(format!("search_parties {query} {}", kind.as_str()))?;
        let needle = query.to_lowercase();
        Ok(self
            .parties
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_products(&self, query: &str, invoice_type: InvoiceType) -> ClientResult<Vec<Product>> {
        self.record_call(format!("search_products {query} {invoice_type}"))?;
        let needle = query.to_lowercase();
        Ok(self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_ledger_accounts(&self, query: &str) -> ClientResult<Vec<LedgerAccount>> {
        self.record_call(format!("search_ledger_accounts {query}"))?;
        let needle = query.to_lowercase();
        Ok(self
            .ledger_accounts
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
