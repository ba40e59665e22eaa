//! Portfolio and lot records.
//!
//! A lot's derived valuation fields travel together: either the lot has
//! never been priced and [`Lot::valuation`] is `None`, or a refresh has
//! populated every derived field at once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capital-gains bracket, decided purely by holding period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxBracket {
    #[serde(rename = "Long Term")]
    LongTerm,
    #[serde(rename = "Short Term")]
    ShortTerm,
}

/// Derived pricing fields for a lot, recomputed on every refresh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotValuation {
    /// Latest known per-share price.
    pub price: Decimal,
    /// When the price was obtained from a provider.
    pub fetched_at: DateTime<Utc>,
    /// When the derived fields below were last recomputed.
    pub valued_at: DateTime<Utc>,
    pub current_value: Decimal,
    pub profit_loss: Decimal,
    pub days_held: i64,
    pub tax_bracket: TaxBracket,
    pub tax_amount: Decimal,
}

/// A single purchase of one stock.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub symbol: String,
    pub short_name: String,
    pub full_name: String,
    pub isin: String,
    pub purchase_date: DateTime<Utc>,
    pub quantity: Decimal,
    /// Total amount paid for the lot, not per share.
    pub purchase_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation: Option<LotValuation>,
}

impl Lot {
    pub fn new(input: NewLot) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            symbol: input.symbol.trim().to_uppercase(),
            short_name: input.short_name.trim().to_string(),
            full_name: input.full_name.trim().to_string(),
            isin: input.isin.trim().to_uppercase(),
            purchase_date: input.purchase_date,
            quantity: input.quantity,
            purchase_amount: input.purchase_amount,
            valuation: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLot {
    pub symbol: String,
    #[serde(default)]
    pub short_name: String,
    pub full_name: String,
    pub isin: String,
    pub purchase_date: DateTime<Utc>,
    pub quantity: Decimal,
    pub purchase_amount: Decimal,
}

/// Partial lot edit. Any identity field change invalidates the cached
/// valuation, so the service clears it unconditionally.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotUpdate {
    pub symbol: Option<String>,
    pub short_name: Option<String>,
    pub full_name: Option<String>,
    pub isin: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub quantity: Option<Decimal>,
    pub purchase_amount: Option<Decimal>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lots: Vec<Lot>,
    /// Start instant of the most recent completed price refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price_update: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(owner_id: &str, input: NewPortfolio, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            lots: Vec::new(),
            last_price_update: None,
            created_at: now,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_lot_normalizes_identity_fields() {
        let lot = Lot::new(NewLot {
            symbol: " reliance ".to_string(),
            short_name: "Reliance".to_string(),
            full_name: " Reliance Industries Ltd ".to_string(),
            isin: "ine002a01018".to_string(),
            purchase_date: Utc::now(),
            quantity: dec!(10),
            purchase_amount: dec!(25000),
        });

        assert_eq!(lot.symbol, "RELIANCE");
        assert_eq!(lot.full_name, "Reliance Industries Ltd");
        assert_eq!(lot.isin, "INE002A01018");
        assert!(lot.valuation.is_none());
    }

    #[test]
    fn test_tax_bracket_serializes_with_spaces() {
        let long = serde_json::to_string(&TaxBracket::LongTerm).unwrap();
        let short = serde_json::to_string(&TaxBracket::ShortTerm).unwrap();
        assert_eq!(long, "\"Long Term\"");
        assert_eq!(short, "\"Short Term\"");
    }

    #[test]
    fn test_lot_without_valuation_omits_derived_fields() {
        let lot = Lot::new(NewLot {
            symbol: "TCS".to_string(),
            short_name: "TCS".to_string(),
            full_name: "Tata Consultancy Services".to_string(),
            isin: "INE467B01029".to_string(),
            purchase_date: Utc::now(),
            quantity: dec!(5),
            purchase_amount: dec!(17500),
        });

        let json = serde_json::to_value(&lot).unwrap();
        assert!(json.get("valuation").is_none());
        assert_eq!(json["symbol"], "TCS");
    }
}
