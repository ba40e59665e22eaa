//! Domain constants shared across portfolio and refresh logic.

use std::time::Duration;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Exchange timezone. All market-hours decisions are made in IST.
pub const EXCHANGE_TZ: Tz = chrono_tz::Asia::Kolkata;

/// Market opens at 09:00 local time, expressed as minutes since midnight.
pub const MARKET_OPEN_MINUTES: u32 = 9 * 60;

/// Market closes at 16:00 local time, inclusive.
pub const MARKET_CLOSE_MINUTES: u32 = 16 * 60;

/// Holdings kept for at least this many days fall in the long-term bracket.
pub const LONG_TERM_HOLDING_DAYS: i64 = 366;

/// Tax rate applied to long-term gains.
pub const LONG_TERM_TAX_RATE: Decimal = dec!(0.125);

/// Tax rate applied to short-term gains.
pub const SHORT_TERM_TAX_RATE: Decimal = dec!(0.20);

/// Pause between successive external price calls, to stay under free-tier
/// rate limits.
pub const DELAY_BETWEEN_CALLS: Duration = Duration::from_millis(1200);

/// How long a finished progress snapshot stays readable before eviction.
pub const PROGRESS_RETENTION: Duration = Duration::from_secs(60);
