//! `billbook-invoices`: print one page of invoices and the list statistics.
//!
//! ```text
//! billbook-invoices [sales|purchase] [--status draft|posted] [--search TEXT] [--page N]
//! ```

use std::sync::Arc;

use anyhow::{Context, bail};
use rust_decimal::{Decimal, RoundingStrategy};

use billbook_client::{ClientConfig, HttpInvoiceGateway, InvoiceFilters, InvoiceList};
use billbook_invoicing::{InvoiceStatus, InvoiceType};

#[derive(Debug)]
struct Args {
    invoice_type: InvoiceType,
    status: Option<InvoiceStatus>,
    search: Option<String>,
    page: u32,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args {
        invoice_type: InvoiceType::Sales,
        status: None,
        search: None,
        page: 1,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--status" => {
                let value = args.next().context("--status needs a value")?;
                parsed.status = Some(match value.as_str() {
                    "draft" => InvoiceStatus::Draft,
                    "posted" => InvoiceStatus::Posted,
                    other => bail!("unknown status: {other}"),
                });
            }
            "--search" => parsed.search = Some(args.next().context("--search needs a value")?),
            "--page" => {
                let value = args.next().context("--page needs a value")?;
                parsed.page = value.parse().with_context(|| format!("invalid page: {value}"))?;
            }
            other => parsed.invoice_type = other.parse()?,
        }
    }
    Ok(parsed)
}

fn money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Install the subscriber before reading config so its warnings are kept.
fn bootstrap() -> ClientConfig {
    billbook_observability::init();
    ClientConfig::load()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = bootstrap();

    let args = parse_args(std::env::args().skip(1))?;
    let gateway = Arc::new(HttpInvoiceGateway::new(&config).context("failed to build HTTP client")?);
    let mut filters = InvoiceFilters::new(args.invoice_type, config.per_page);
    filters.set_status(args.status);
    if let Some(search) = &args.search {
        filters.set_search(search);
    }
    let mut list = InvoiceList::with_filters(gateway, filters);

    let loaded = if args.page > 1 {
        list.go_to_page(args.page).await
    } else {
        list.refresh().await
    };
    loaded.map_err(|err| anyhow::anyhow!(err.user_message()))?;

    let stats = list.statistics();
    println!(
        "{} invoices: {} total ({} draft, {} posted), amount {}",
        args.invoice_type,
        stats.total_invoices,
        stats.draft_invoices,
        stats.posted_invoices,
        money(stats.amount_for(args.invoice_type)),
    );

    let meta = list.meta();
    println!("page {}/{}", meta.current_page, meta.last_page);
    for row in list.rows() {
        println!(
            "{:>8}  {:<16}  {:<10}  {:<24}  {:>12}",
            row.id,
            row.number.as_deref().unwrap_or("-"),
            row.voucher_date.map(|d| d.to_string()).unwrap_or_default(),
            row.party_name.as_deref().unwrap_or("-"),
            money(row.total_amount),
        );
    }
    if list.has_more() {
        println!("more pages available (--page {})", meta.current_page + 1);
    }
    Ok(())
}
