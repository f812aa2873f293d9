//! Typeahead lookups against the party, product and ledger-account
//! directories.

use std::sync::Arc;

use tokio::sync::watch;

use billbook_core::DomainResult;
use billbook_invoicing::{InvoiceDraft, InvoiceType, LedgerAccount, Party, Product};

use crate::config::ClientConfig;
use crate::debounce::DebouncedQuery;
use crate::gateway::InvoiceGateway;

/// Candidate lists for one invoice screen.
///
/// The discriminator follows the invoice type: sales screens search
/// customers, purchase screens search vendors.
pub struct DirectoryLookup {
    gateway: Arc<dyn InvoiceGateway>,
    invoice_type: InvoiceType,
    parties: DebouncedQuery<Party>,
    products: DebouncedQuery<Product>,
    ledger_accounts: DebouncedQuery<LedgerAccount>,
}

impl DirectoryLookup {
    pub fn new(gateway: Arc<dyn InvoiceGateway>, invoice_type: InvoiceType, config: &ClientConfig) -> Self {
        let (delay, min_chars) = (config.search_debounce, config.search_min_chars);
        Self {
            gateway,
            invoice_type,
            parties: DebouncedQuery::new(delay, min_chars),
            products: DebouncedQuery::new(delay, min_chars),
            ledger_accounts: DebouncedQuery::new(delay, min_chars),
        }
    }

    pub fn invoice_type(&self) -> InvoiceType {
        self.invoice_type
    }

    pub fn search_parties(&mut self, text: &str) {
        let gateway = self.gateway.clone();
        let kind = self.invoice_type.party_kind();
        self.parties
            .submit(text, move |q| async move { gateway.search_parties(&q, kind).await });
    }

    pub fn search_products(&mut self, text: &str) {
        let gateway = self.gateway.clone();
        let invoice_type = self.invoice_type;
        self.products
            .submit(text, move |q| async move { gateway.search_products(&q, invoice_type).await });
    }

    pub fn search_ledger_accounts(&mut self, text: &str) {
        let gateway = self.gateway.clone();
        self.ledger_accounts
            .submit(text, move |q| async move { gateway.search_ledger_accounts(&q).await });
    }

    pub fn parties(&self) -> Vec<Party> {
        self.parties.results()
    }

    pub fn products(&self) -> Vec<Product> {
        self.products.results()
    }

    pub fn ledger_accounts(&self) -> Vec<LedgerAccount> {
        self.ledger_accounts.results()
    }

    pub fn watch_parties(&self) -> watch::Receiver<Vec<Party>> {
        self.parties.subscribe()
    }

    pub fn watch_products(&self) -> watch::Receiver<Vec<Product>> {
        self.products.subscribe()
    }

    pub fn watch_ledger_accounts(&self) -> watch::Receiver<Vec<LedgerAccount>> {
        self.ledger_accounts.subscribe()
    }

    pub fn select_party(&mut self, party: &Party, draft: &mut InvoiceDraft) {
        draft.select_party(party);
        self.parties.clear();
    }

    pub fn select_product(
        &mut self,
        item_index: usize,
        product: &Product,
        draft: &mut InvoiceDraft,
    ) -> DomainResult<()> {
        draft.select_item_product(item_index, product)?;
        self.products.clear();
        Ok(())
    }

    pub fn select_ledger_account(
        &mut self,
        charge_index: usize,
        account: &LedgerAccount,
        draft: &mut InvoiceDraft,
    ) -> DomainResult<()> {
        draft.select_charge_account(charge_index, account)?;
        self.ledger_accounts.clear();
        Ok(())
    }

    /// Cancel every pending lookup (screen teardown).
    pub fn cancel_all(&mut self) {
        self.parties.cancel();
        self.products.cancel();
        self.ledger_accounts.cancel();
    }
}
