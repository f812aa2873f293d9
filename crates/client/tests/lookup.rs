mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use billbook_client::{ClientConfig, ClientError, DirectoryLookup, InvoiceGateway};
use billbook_core::{LedgerAccountId, PartyId, ProductId};
use billbook_invoicing::{InvoiceDraft, InvoiceType};

use common::FakeGateway;

fn gateway() -> Arc<FakeGateway> {
    let mut fake = FakeGateway::new();
    fake.parties = serde_json::from_value(json!([
        {"id": 1, "name": "ACME Trading", "outstanding_balance": "120.00"},
        {"id": 2, "name": "Acme Supplies"},
        {"id": 3, "name": "Globex"}
    ]))
    .unwrap();
    fake.products = serde_json::from_value(json!([
        {"id": 10, "name": "Steel bolt", "sales_price": 2.5},
        {"id": 11, "name": "Steel nut", "sales_price": "1.10"}
    ]))
    .unwrap();
    fake.ledger_accounts = serde_json::from_value(json!([
        {"id": 40, "name": "Freight Inward"},
        {"id": 41, "name": "Insurance"}
    ]))
    .unwrap();
    Arc::new(fake)
}

fn lookup(gateway: &Arc<FakeGateway>, invoice_type: InvoiceType) -> DirectoryLookup {
    let dyn_gateway: Arc<dyn InvoiceGateway> = gateway.clone();
    DirectoryLookup::new(dyn_gateway, invoice_type, &ClientConfig::default())
}

fn draft(invoice_type: InvoiceType) -> InvoiceDraft {
    InvoiceDraft::new(invoice_type, chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(600)).await;
}

#[tokio::test(start_paused = true)]
async fn typing_is_debounced_into_one_request() {
    let gateway = gateway();
    let mut lookup = lookup(&gateway, InvoiceType::Sales);

    for text in ["a", "ac", "acm", "acme"] {
        lookup.search_parties(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    settle().await;

    assert_eq!(gateway.calls(), vec!["search_parties acme customer"]);
    let names: Vec<String> = lookup.parties().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["ACME Trading", "Acme Supplies"]);
}

#[tokio::test(start_paused = true)]
async fn purchase_screens_search_vendors_and_purchase_products() {
    let gateway = gateway();
    let mut lookup = lookup(&gateway, InvoiceType::Purchase);

    lookup.search_parties("glo");
    lookup.search_products("steel");
    settle().await;

    let mut calls = gateway.calls();
    calls.sort();
    assert_eq!(calls, vec!["search_parties glo vendor", "search_products steel purchase"]);
    assert_eq!(lookup.products().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn short_input_never_calls_the_network_and_clears() {
    let gateway = gateway();
    let mut lookup = lookup(&gateway, InvoiceType::Sales);

    lookup.search_ledger_accounts("fre");
    settle().await;
    assert_eq!(lookup.ledger_accounts().len(), 1);

    lookup.search_ledger_accounts("f");
    assert!(lookup.ledger_accounts().is_empty());
    lookup.search_ledger_accounts("  ");
    settle().await;

    assert_eq!(gateway.calls(), vec!["search_ledger_accounts fre"]);
}

#[tokio::test(start_paused = true)]
async fn failed_lookup_clears_candidates() {
    let gateway = gateway();
    let mut lookup = lookup(&gateway, InvoiceType::Sales);

    lookup.search_products("steel");
    settle().await;
    assert_eq!(lookup.products().len(), 2);

    gateway.fail_next(ClientError::Network("offline".into()));
    lookup.search_products("steel n");
    settle().await;
    assert!(lookup.products().is_empty());
}

#[tokio::test(start_paused = true)]
async fn selecting_a_candidate_binds_it_and_clears_the_list() {
    let gateway = gateway();
    let mut lookup = lookup(&gateway, InvoiceType::Sales);
    let mut draft = draft(InvoiceType::Sales);
    let item = draft.add_item();
    let charge = draft.add_charge();

    lookup.search_parties("acme");
    lookup.search_products("bolt");
    lookup.search_ledger_accounts("freight");
    settle().await;

    let party = lookup.parties()[0].clone();
    lookup.select_party(&party, &mut draft);
    assert_eq!(draft.party_id(), Some(PartyId::new(1)));
    assert!(lookup.parties().is_empty());

    let product = lookup.products()[0].clone();
    lookup.select_product(item, &product, &mut draft).unwrap();
    assert_eq!(draft.items()[item].product_id, Some(ProductId::new(10)));
    assert!(lookup.products().is_empty());

    let account = lookup.ledger_accounts()[0].clone();
    lookup.select_ledger_account(charge, &account, &mut draft).unwrap();
    assert_eq!(draft.charges()[charge].ledger_account_id, Some(LedgerAccountId::new(40)));
    assert!(lookup.ledger_accounts().is_empty());

    assert!(lookup.select_product(9, &product, &mut draft).is_err());
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_pending_lookups() {
    let gateway = gateway();
    let mut lookup = lookup(&gateway, InvoiceType::Sales);
    let mut watch = lookup.watch_parties();

    lookup.search_parties("acme");
    lookup.cancel_all();
    settle().await;
    assert!(gateway.calls().is_empty());
    assert!(!watch.has_changed().unwrap());

    lookup.search_parties("acme");
    drop(lookup);
    settle().await;
    assert!(gateway.calls().is_empty());
}
