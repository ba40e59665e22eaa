//! Lot valuation arithmetic.
//!
//! Given a per-share price, derives current value, profit/loss, holding
//! period, tax bracket and estimated tax for a lot. Losses never produce
//! a negative tax amount.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::constants::{LONG_TERM_HOLDING_DAYS, LONG_TERM_TAX_RATE, SHORT_TERM_TAX_RATE};

use super::portfolio_model::{Lot, LotValuation, TaxBracket};

/// Apply a freshly fetched price to a lot, replacing its valuation.
pub fn revalue_lot(lot: &mut Lot, price: Decimal, fetched_at: DateTime<Utc>, now: DateTime<Utc>) {
    lot.valuation = Some(compute(lot, price, fetched_at, now));
}

/// Recompute the derived fields from the price a lot already carries.
///
/// Holding period and tax bracket depend on `now`, so a cached price can
/// still yield updated figures. Lots that were never priced are left
/// untouched.
pub fn refresh_valuation(lot: &mut Lot, now: DateTime<Utc>) {
    if let Some(existing) = &lot.valuation {
        let (price, fetched_at) = (existing.price, existing.fetched_at);
        lot.valuation = Some(compute(lot, price, fetched_at, now));
    }
}

fn compute(lot: &Lot, price: Decimal, fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> LotValuation {
    let current_value = price * lot.quantity;
    let profit_loss = current_value - lot.purchase_amount;
    let days_held = (now - lot.purchase_date).num_days();

    let tax_bracket = if days_held >= LONG_TERM_HOLDING_DAYS {
        TaxBracket::LongTerm
    } else {
        TaxBracket::ShortTerm
    };
    let rate = match tax_bracket {
        TaxBracket::LongTerm => LONG_TERM_TAX_RATE,
        TaxBracket::ShortTerm => SHORT_TERM_TAX_RATE,
    };
    let tax_amount = profit_loss.max(Decimal::ZERO) * rate;

    LotValuation {
        price,
        fetched_at,
        valued_at: now,
        current_value,
        profit_loss,
        days_held,
        tax_bracket,
        tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::portfolio_model::NewLot;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn lot_purchased_days_ago(days: i64, now: DateTime<Utc>) -> Lot {
        Lot::new(NewLot {
            symbol: "TCS".to_string(),
            short_name: "TCS".to_string(),
            full_name: "Tata Consultancy Services".to_string(),
            isin: "INE467B01029".to_string(),
            purchase_date: now - Duration::days(days),
            quantity: dec!(10),
            purchase_amount: dec!(10000),
        })
    }

    #[test]
    fn test_long_term_gain() {
        let now = Utc::now();
        let mut lot = lot_purchased_days_ago(400, now);
        revalue_lot(&mut lot, dec!(1200), now, now);

        let v = lot.valuation.unwrap();
        assert_eq!(v.current_value, dec!(12000));
        assert_eq!(v.profit_loss, dec!(2000));
        assert_eq!(v.days_held, 400);
        assert_eq!(v.tax_bracket, TaxBracket::LongTerm);
        assert_eq!(v.tax_amount, dec!(250.000));
    }

    #[test]
    fn test_short_term_loss_owes_no_tax() {
        let now = Utc::now();
        let mut lot = lot_purchased_days_ago(100, now);
        revalue_lot(&mut lot, dec!(900), now, now);

        let v = lot.valuation.unwrap();
        assert_eq!(v.current_value, dec!(9000));
        assert_eq!(v.profit_loss, dec!(-1000));
        assert_eq!(v.tax_bracket, TaxBracket::ShortTerm);
        assert_eq!(v.tax_amount, Decimal::ZERO);
    }

    #[test]
    fn test_bracket_boundary_at_366_days() {
        let now = Utc::now();

        let mut at_boundary = lot_purchased_days_ago(366, now);
        revalue_lot(&mut at_boundary, dec!(1000), now, now);
        assert_eq!(
            at_boundary.valuation.unwrap().tax_bracket,
            TaxBracket::LongTerm
        );

        let mut below = lot_purchased_days_ago(365, now);
        revalue_lot(&mut below, dec!(1000), now, now);
        assert_eq!(below.valuation.unwrap().tax_bracket, TaxBracket::ShortTerm);
    }

    #[test]
    fn test_refresh_is_idempotent_for_fixed_now() {
        let now = Utc::now();
        let fetched = now - Duration::hours(2);
        let mut lot = lot_purchased_days_ago(50, now);
        revalue_lot(&mut lot, dec!(1050), fetched, now);
        let first = lot.valuation.clone().unwrap();

        refresh_valuation(&mut lot, now);
        let second = lot.valuation.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.fetched_at, fetched);
    }

    #[test]
    fn test_refresh_skips_unpriced_lot() {
        let now = Utc::now();
        let mut lot = lot_purchased_days_ago(10, now);
        refresh_valuation(&mut lot, now);
        assert!(lot.valuation.is_none());
    }
}
