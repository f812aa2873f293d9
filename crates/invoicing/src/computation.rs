//! Line-item computation engine.
//!
//! Pure and deterministic. Discount is applied to the subtotal first and VAT
//! is charged on the discounted base:
//!
//! ```text
//! subtotal        = quantity * rate
//! discount_amount = discount_percent / 100 * subtotal
//! after_discount  = subtotal - discount_amount
//! vat_amount      = vat_percent / 100 * after_discount
//! amount          = after_discount + vat_amount
//! ```
//!
//! Additional charges never go through this formula. Arithmetic saturates
//! instead of panicking so the engine always yields a number.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billbook_core::lenient::parse_decimal;

/// Amount-bearing inputs of a line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    pub quantity: Decimal,
    pub rate: Decimal,
    pub discount_percent: Decimal,
    pub vat_percent: Decimal,
}

impl LineInput {
    pub fn new(quantity: Decimal, rate: Decimal, discount_percent: Decimal, vat_percent: Decimal) -> Self {
        Self {
            quantity,
            rate,
            discount_percent,
            vat_percent,
        }
    }

    /// Build from raw form text; blank or non-numeric fields count as zero.
    pub fn parse(quantity: &str, rate: &str, discount_percent: &str, vat_percent: &str) -> Self {
        Self::new(
            parse_decimal(quantity),
            parse_decimal(rate),
            parse_decimal(discount_percent),
            parse_decimal(vat_percent),
        )
    }
}

/// Every intermediate of the formula, for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreakdown {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub after_discount: Decimal,
    pub vat_amount: Decimal,
    pub amount: Decimal,
}

fn percent_of(percent: Decimal, base: Decimal) -> Decimal {
    (percent / Decimal::ONE_HUNDRED).saturating_mul(base)
}

pub fn compute_line(input: &LineInput) -> LineBreakdown {
    let subtotal = input.quantity.saturating_mul(input.rate);
    let discount_amount = percent_of(input.discount_percent, subtotal);
    let after_discount = subtotal.saturating_sub(discount_amount);
    let vat_amount = percent_of(input.vat_percent, after_discount);
    let amount = after_discount.saturating_add(vat_amount);

    LineBreakdown {
        subtotal,
        discount_amount,
        after_discount,
        vat_amount,
        amount,
    }
}

/// Invoice-level totals, always derived from the current lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub items_total: Decimal,
    pub charges_total: Decimal,
    pub grand_total: Decimal,
}

impl InvoiceTotals {
    pub fn from_amounts<I, C>(item_amounts: I, charge_amounts: C) -> Self
    where
        I: IntoIterator<Item = Decimal>,
        C: IntoIterator<Item = Decimal>,
    {
        let items_total = item_amounts
            .into_iter()
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let charges_total = charge_amounts
            .into_iter()
            .fold(Decimal::ZERO, Decimal::saturating_add);

        Self {
            items_total,
            charges_total,
            grand_total: items_total.saturating_add(charges_total),
        }
    }

    /// Totals rounded half-away-from-zero to 2 decimal places. Display only.
    pub fn rounded(&self) -> Self {
        let round = |d: Decimal| {
            d.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        };
        Self {
            items_total: round(self.items_total),
            charges_total: round(self.charges_total),
            grand_total: round(self.grand_total),
        }
    }
}
