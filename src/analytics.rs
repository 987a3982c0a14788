//! In-process record of paid calls and the three zero-price reports built on it.
//!
//! All-time totals are kept as running sums per entrypoint. Individual payments
//! are kept only for the most recent `capacity` calls, so windowed reports,
//! transactions and CSV cover at most that many payments.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;

const DEFAULT_TRANSACTION_LIMIT: usize = 50;
const DEFAULT_LOG_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub entrypoint: &'static str,
    /// Amount in the smallest currency unit
    pub amount: u128,
    pub at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct PaymentTracker {
    capacity: usize,
    ledger: Mutex<Ledger>,
}

#[derive(Debug, Default)]
struct Ledger {
    recent: VecDeque<Payment>,
    /// Entrypoint -> (count, revenue) since startup
    totals: BTreeMap<&'static str, (usize, u128)>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsInput {
    /// Only payments within this many milliseconds of now; all time when absent
    #[serde(default)]
    pub window_ms: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsInput {
    #[serde(default)]
    pub window_ms: Option<i64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_revenue: String,
    pub transaction_count: usize,
    pub by_entrypoint: BTreeMap<String, EntrypointTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_ms: Option<i64>,
    pub generated_at: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EntrypointTotals {
    pub count: usize,
    pub revenue: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransactionsOutput {
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub entrypoint: String,
    pub amount: String,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CsvOutput {
    pub csv: String,
}

impl AnalyticsInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_window(self.window_ms)
    }
}

impl TransactionsInput {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_window(self.window_ms)
    }
}

fn validate_window(window_ms: Option<i64>) -> Result<(), AppError> {
    match window_ms {
        Some(ms) if ms < 0 => Err(AppError::InvalidInput(format!(
            "windowMs must not be negative, got {}",
            ms
        ))),
        _ => Ok(()),
    }
}

impl Default for PaymentTracker {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl PaymentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker that keeps at most `capacity` individual payments.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn record(&self, entrypoint: &'static str, amount: u128) {
        self.record_at(entrypoint, amount, Utc::now());
    }

    pub fn record_at(&self, entrypoint: &'static str, amount: u128, at: DateTime<Utc>) {
        debug!("Recording payment of {} for {}", amount, entrypoint);
        let mut ledger = self.lock();
        let totals = ledger.totals.entry(entrypoint).or_default();
        totals.0 += 1;
        totals.1 += amount;
        ledger.recent.push_back(Payment {
            entrypoint,
            amount,
            at,
        });
        while ledger.recent.len() > self.capacity {
            ledger.recent.pop_front();
        }
    }

    pub fn summary(&self, input: AnalyticsInput) -> Result<AnalyticsSummary, AppError> {
        input.validate()?;
        Ok(self.summary_at(input, Utc::now()))
    }

    pub fn transactions(&self, input: TransactionsInput) -> Result<TransactionsOutput, AppError> {
        input.validate()?;
        Ok(self.transactions_at(input, Utc::now()))
    }

    pub fn csv(&self, input: AnalyticsInput) -> Result<CsvOutput, AppError> {
        input.validate()?;
        Ok(self.csv_at(input, Utc::now()))
    }

    fn summary_at(&self, input: AnalyticsInput, now: DateTime<Utc>) -> AnalyticsSummary {
        let by_entrypoint: BTreeMap<&str, (usize, u128)> = match input.window_ms {
            None => self.lock().totals.clone(),
            Some(window_ms) => {
                let mut totals: BTreeMap<&str, (usize, u128)> = BTreeMap::new();
                for payment in self.window(Some(window_ms), now) {
                    let entry = totals.entry(payment.entrypoint).or_default();
                    entry.0 += 1;
                    entry.1 += payment.amount;
                }
                totals
            }
        };

        AnalyticsSummary {
            total_revenue: by_entrypoint
                .values()
                .map(|(_, revenue)| revenue)
                .sum::<u128>()
                .to_string(),
            transaction_count: by_entrypoint.values().map(|(count, _)| count).sum(),
            by_entrypoint: by_entrypoint
                .into_iter()
                .map(|(key, (count, revenue))| {
                    (
                        key.to_string(),
                        EntrypointTotals {
                            count,
                            revenue: revenue.to_string(),
                        },
                    )
                })
                .collect(),
            window_ms: input.window_ms,
            generated_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    fn transactions_at(&self, input: TransactionsInput, now: DateTime<Utc>) -> TransactionsOutput {
        let limit = input.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT);
        let transactions = self
            .window(input.window_ms, now)
            .into_iter()
            .rev()
            .take(limit)
            .map(|payment| TransactionRecord {
                entrypoint: payment.entrypoint.to_string(),
                amount: payment.amount.to_string(),
                timestamp: payment.at.to_rfc3339_opts(SecondsFormat::Millis, true),
            })
            .collect();
        TransactionsOutput { transactions }
    }

    fn csv_at(&self, input: AnalyticsInput, now: DateTime<Utc>) -> CsvOutput {
        let mut csv = String::from("timestamp,entrypoint,amount\n");
        for payment in self.window(input.window_ms, now) {
            csv.push_str(&format!(
                "{},{},{}\n",
                payment.at.to_rfc3339_opts(SecondsFormat::Millis, true),
                payment.entrypoint,
                payment.amount
            ));
        }
        CsvOutput { csv }
    }

    /// Payments recorded within `window_ms` of `now`, oldest first.
    fn window(&self, window_ms: Option<i64>, now: DateTime<Utc>) -> Vec<Payment> {
        // A window reaching past the representable range means "all time".
        let cutoff = window_ms
            .and_then(Duration::try_milliseconds)
            .and_then(|window| now.checked_sub_signed(window));
        self.lock()
            .recent
            .iter()
            .filter(|payment| cutoff.is_none_or(|cutoff| payment.at >= cutoff))
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
