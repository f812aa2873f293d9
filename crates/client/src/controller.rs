//! Lifecycle controller.
//!
//! Drives create/update/delete/post/unpost against the gateway. Every call
//! checks the local state gate first, then (for post, unpost and delete) asks
//! for confirmation, then issues exactly one request. Only one lifecycle
//! request may be outstanding; a second one is refused with
//! [`ClientError::Busy`]. The caller's record is replaced only after the
//! server accepted the change.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use billbook_core::InvoiceId;
use billbook_invoicing::{
    FormData, InvoiceDraft, InvoiceRecord, InvoiceStatus, InvoiceType, LifecycleAction, transition,
};

use crate::error::{ClientError, ClientResult};
use crate::gateway::InvoiceGateway;

/// User confirmation for post, unpost and delete.
pub trait Confirm {
    fn confirm(&self, action: LifecycleAction, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(LifecycleAction, &str) -> bool,
{
    fn confirm(&self, action: LifecycleAction, prompt: &str) -> bool {
        self(action, prompt)
    }
}

/// Result of a confirmable action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    /// The user declined; nothing was sent.
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

/// Marks a lifecycle request as outstanding until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, action: LifecycleAction) -> ClientResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                tracing::warn!(%action, "refused: another lifecycle request is in flight");
                ClientError::Busy
            })?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct InvoiceController {
    gateway: Arc<dyn InvoiceGateway>,
    invoice_type: InvoiceType,
    in_flight: AtomicBool,
}

impl InvoiceController {
    pub fn new(gateway: Arc<dyn InvoiceGateway>, invoice_type: InvoiceType) -> Self {
        Self {
            gateway,
            invoice_type,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn invoice_type(&self) -> InvoiceType {
        self.invoice_type
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Empty draft dated today.
    pub fn new_draft(&self) -> InvoiceDraft {
        InvoiceDraft::new(self.invoice_type, Utc::now().date_naive())
    }

    pub async fn form_data(&self) -> ClientResult<FormData> {
        self.gateway.form_data(self.invoice_type).await
    }

    pub async fn open(&self, id: InvoiceId) -> ClientResult<InvoiceRecord> {
        self.gateway.show(id, self.invoice_type).await
    }

    /// Seed a draft for editing `record`. Posted invoices cannot be edited.
    pub fn edit(&self, record: &InvoiceRecord) -> ClientResult<InvoiceDraft> {
        self.gate(Some(record.status), LifecycleAction::Update)?;
        Ok(InvoiceDraft::from_record(record, self.invoice_type))
    }

    /// Persist a new invoice as draft or directly posted.
    pub async fn create(&self, draft: &InvoiceDraft, status: InvoiceStatus) -> ClientResult<InvoiceRecord> {
        let action = LifecycleAction::Create(status);
        let payload = draft.to_create_payload(status)?;
        self.gate(None, action)?;

        let _guard = InFlight::acquire(&self.in_flight, action)?;
        tracing::info!(invoice_type = %self.invoice_type, %status, "creating invoice");
        let record = self.gateway.create(&payload).await.inspect_err(|err| {
            tracing::warn!(error = %err, "create failed");
        })?;
        tracing::info!(invoice_id = %record.id, "invoice created");
        Ok(record)
    }

    /// Replace the fields of a draft invoice.
    pub async fn update(&self, record: &mut InvoiceRecord, draft: &InvoiceDraft) -> ClientResult<()> {
        let action = LifecycleAction::Update;
        self.gate(Some(record.status), action)?;
        let payload = draft.to_payload()?;

        let _guard = InFlight::acquire(&self.in_flight, action)?;
        tracing::info!(invoice_id = %record.id, "updating invoice");
        let updated = self.gateway.update(record.id, &payload).await.inspect_err(|err| {
            tracing::warn!(invoice_id = %record.id, error = %err, "update failed");
        })?;
        *record = updated;
        Ok(())
    }

    pub async fn post(&self, record: &mut InvoiceRecord, confirm: &impl Confirm) -> ClientResult<Outcome<()>> {
        self.change_status(record, LifecycleAction::Post, confirm).await
    }

    pub async fn unpost(&self, record: &mut InvoiceRecord, confirm: &impl Confirm) -> ClientResult<Outcome<()>> {
        self.change_status(record, LifecycleAction::Unpost, confirm).await
    }

    /// Delete a draft invoice. On success the caller should drop `record`.
    pub async fn delete(&self, record: &InvoiceRecord, confirm: &impl Confirm) -> ClientResult<Outcome<()>> {
        let action = LifecycleAction::Delete;
        self.gate(Some(record.status), action)?;

        let _guard = InFlight::acquire(&self.in_flight, action)?;
        if !self.confirmed(action, confirm) {
            return Ok(Outcome::Cancelled);
        }

        tracing::info!(invoice_id = %record.id, "deleting invoice");
        self.gateway
            .delete(record.id, self.invoice_type)
            .await
            .inspect_err(|err| {
                tracing::warn!(invoice_id = %record.id, error = %err, "delete failed");
            })?;
        Ok(Outcome::Done(()))
    }

    async fn change_status(
        &self,
        record: &mut InvoiceRecord,
        action: LifecycleAction,
        confirm: &impl Confirm,
    ) -> ClientResult<Outcome<()>> {
        let next = self.gate(Some(record.status), action)?;

        let _guard = InFlight::acquire(&self.in_flight, action)?;
        if !self.confirmed(action, confirm) {
            return Ok(Outcome::Cancelled);
        }

        tracing::info!(invoice_id = %record.id, %action, "changing invoice status");
        let sent = match action {
            LifecycleAction::Unpost => self.gateway.unpost(record.id, self.invoice_type).await,
            _ => self.gateway.post(record.id, self.invoice_type).await,
        };
        let returned = sent.inspect_err(|err| {
            tracing::warn!(invoice_id = %record.id, %action, error = %err, "status change failed");
        })?;

        let refreshed = match returned {
            Some(updated) => Some(updated),
            None => match self.gateway.show(record.id, self.invoice_type).await {
                Ok(fresh) => Some(fresh),
                Err(err) => {
                    tracing::warn!(invoice_id = %record.id, error = %err, "could not reload invoice after {action}");
                    None
                }
            },
        };

        match refreshed {
            Some(updated) => *record = updated,
            None => {
                if let Some(status) = next {
                    record.status = status;
                }
            }
        }
        Ok(Outcome::Done(()))
    }

    fn gate(&self, current: Option<InvoiceStatus>, action: LifecycleAction) -> ClientResult<Option<InvoiceStatus>> {
        transition(current, action).map_err(|err| {
            tracing::warn!(%action, error = %err, "lifecycle action refused locally");
            ClientError::Lifecycle(err)
        })
    }

    fn confirmed(&self, action: LifecycleAction, confirm: &impl Confirm) -> bool {
        let prompt = action.confirmation_prompt().unwrap_or_default();
        let accepted = confirm.confirm(action, prompt);
        if !accepted {
            tracing::debug!(%action, "cancelled by user");
        }
        accepted
    }
}
