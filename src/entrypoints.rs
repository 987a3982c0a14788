use serde::Serialize;

/// One externally callable, individually priced operation.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entrypoint {
    pub key: &'static str,
    pub description: &'static str,
    /// Price in the smallest currency unit
    pub price: u64,
}

pub const OVERVIEW: &str = "overview";
pub const CURRENT_TIME: &str = "current-time";
pub const CONVERT: &str = "convert";
pub const HOLIDAYS: &str = "holidays";
pub const MULTI_ZONE: &str = "multi-zone";
pub const FULL_REPORT: &str = "full-report";
pub const ANALYTICS: &str = "analytics";
pub const ANALYTICS_TRANSACTIONS: &str = "analytics-transactions";
pub const ANALYTICS_CSV: &str = "analytics-csv";

pub static ENTRYPOINTS: [Entrypoint; 9] = [
    Entrypoint {
        key: OVERVIEW,
        description: "Free overview: timezone and country counts, sample zones and endpoint list",
        price: 0,
    },
    Entrypoint {
        key: CURRENT_TIME,
        description: "Current time in any IANA timezone",
        price: 1000,
    },
    Entrypoint {
        key: CONVERT,
        description: "Convert a date and time between two timezones",
        price: 2000,
    },
    Entrypoint {
        key: HOLIDAYS,
        description: "Public holidays for a country and year",
        price: 2000,
    },
    Entrypoint {
        key: MULTI_ZONE,
        description: "Current time in 2 to 10 timezones at once",
        price: 3000,
    },
    Entrypoint {
        key: FULL_REPORT,
        description: "Current time plus the next upcoming public holidays for a country",
        price: 5000,
    },
    Entrypoint {
        key: ANALYTICS,
        description: "Payment totals over an optional time window",
        price: 0,
    },
    Entrypoint {
        key: ANALYTICS_TRANSACTIONS,
        description: "Recent payment transactions",
        price: 0,
    },
    Entrypoint {
        key: ANALYTICS_CSV,
        description: "Payment history as CSV",
        price: 0,
    },
];

pub fn find(key: &str) -> Option<&'static Entrypoint> {
    ENTRYPOINTS.iter().find(|entrypoint| entrypoint.key == key)
}

/// Formats a price in the smallest currency unit (six decimals) as dollars, e.g. 1000 -> "$0.001".
pub fn format_price(price: u64) -> String {
    if price == 0 {
        return "free".to_string();
    }
    let whole = price / 1_000_000;
    let fraction = format!("{:06}", price % 1_000_000);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("${}", whole)
    } else {
        format!("${}.{}", whole, fraction)
    }
}
