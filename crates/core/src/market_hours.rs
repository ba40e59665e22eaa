//! Exchange-hours policy.
//!
//! The exchange trades 09:00–16:00 IST on weekdays, close boundary
//! inclusive. Every function takes `now` explicitly so callers decide
//! the clock, which keeps the branch table testable.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::constants::{EXCHANGE_TZ, MARKET_CLOSE_MINUTES, MARKET_OPEN_MINUTES};
use crate::portfolio::Lot;

/// Outcome of the refresh decision for one lot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshCheck {
    pub needs_update: bool,
    pub reason: &'static str,
}

fn check(needs_update: bool, reason: &'static str) -> RefreshCheck {
    RefreshCheck {
        needs_update,
        reason,
    }
}

fn minutes_since_midnight(instant: DateTime<Utc>) -> u32 {
    let local = instant.with_timezone(&EXCHANGE_TZ);
    local.hour() * 60 + local.minute()
}

fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.with_timezone(&EXCHANGE_TZ).date_naive() == b.with_timezone(&EXCHANGE_TZ).date_naive()
}

/// Whether the exchange is trading at `now`.
pub fn is_market_open(now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&EXCHANGE_TZ);
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let current = local.hour() * 60 + local.minute();
    (MARKET_OPEN_MINUTES..=MARKET_CLOSE_MINUTES).contains(&current)
}

/// True only when `fetched_at` falls on the same local day as `now` and
/// strictly after the close.
pub fn fetched_after_close_today(fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    same_local_day(fetched_at, now) && minutes_since_midnight(fetched_at) > MARKET_CLOSE_MINUTES
}

/// Decide whether a lot's price must be re-fetched.
///
/// The rules are ordered by priority; the first match wins. A price
/// captured after today's close is final for the day, an open market
/// always refreshes, and a price carried over from a previous day is
/// acceptable only until the next session starts.
pub fn needs_refresh(lot: &Lot, now: DateTime<Utc>) -> RefreshCheck {
    let Some(valuation) = &lot.valuation else {
        return check(true, "No price data available");
    };
    let fetched_at = valuation.fetched_at;
    let same_day = same_local_day(fetched_at, now);

    if same_day && fetched_after_close_today(fetched_at, now) {
        return check(false, "Price already updated after market close today");
    }

    if is_market_open(now) {
        return check(true, "Market is open");
    }

    if minutes_since_midnight(now) > MARKET_CLOSE_MINUTES {
        if same_day {
            if minutes_since_midnight(fetched_at) <= MARKET_CLOSE_MINUTES {
                return check(true, "Market closed, need post-close update");
            }
        } else {
            return check(true, "Price data is from previous day");
        }
    }

    if !same_day {
        return check(false, "Have previous day closing price, market not open yet");
    }

    check(false, "Already have latest price")
}
