//! Result router: the single consumer of worker outcomes.
//!
//! Outcomes are routed in arrival order, which need not match input order.
//! Priced outcomes become idempotent SQL statements in the success sink;
//! failures become one diagnostic line each in the failure sink. The router
//! stops when the outcome channel closes, i.e. after every worker has
//! dropped its sender.

use std::fmt;
use std::str::FromStr;

use log::{error, info};
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::errors::{FailureReason, PipelineError};
use crate::extractor::round_to_cents;
use crate::models::LookupOutcome;
use crate::sink::RecordSink;

/// Default target table for price statements.
pub const DEFAULT_TABLE: &str = "`sana_db`.`item`";

/// SQL shape for success records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatementStyle {
    /// `UPDATE … WHERE UPC = …`; touches existing rows only.
    Update,
    /// `INSERT … ON DUPLICATE KEY UPDATE`; creates missing rows.
    #[default]
    Upsert,
}

impl FromStr for StatementStyle {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "update" => Ok(Self::Update),
            "upsert" => Ok(Self::Upsert),
            other => Err(PipelineError::Config(format!(
                "unknown statement style '{}'",
                other
            ))),
        }
    }
}

/// Renders success records. Re-applying a rendered statement leaves the
/// price unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceStatement {
    pub table: String,
    pub style: StatementStyle,
}

impl PriceStatement {
    pub fn new(table: impl Into<String>, style: StatementStyle) -> Self {
        Self {
            table: table.into(),
            style,
        }
    }

    pub fn render(&self, identifier: &str, price: Decimal) -> String {
        let upc = sql_literal(identifier);
        let price = format_price(price);
        match self.style {
            StatementStyle::Update => format!(
                "UPDATE {} SET `price` = '{}' WHERE (`UPC` = '{}');",
                self.table, price, upc
            ),
            StatementStyle::Upsert => format!(
                "INSERT INTO {} (`UPC`, `price`) VALUES ('{}', '{}') ON DUPLICATE KEY UPDATE `price` = VALUES(`price`);",
                self.table, upc, price
            ),
        }
    }
}

impl Default for PriceStatement {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE, StatementStyle::default())
    }
}

impl fmt::Display for StatementStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => f.write_str("update"),
            Self::Upsert => f.write_str("upsert"),
        }
    }
}

/// Two decimal places, always.
fn format_price(price: Decimal) -> String {
    round_to_cents(price).to_string()
}

fn sql_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

/// One failure-sink line: `identifier - REASON -> diagnostic`.
pub fn failure_record(identifier: &str, reason: FailureReason, diagnostic: &str) -> String {
    let diagnostic = diagnostic
        .split(['\r', '\n'])
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{} - {} -> {}", identifier, reason, diagnostic)
}

/// Counts produced by a router run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouterTotals {
    pub priced: usize,
    pub failed: usize,
    pub write_errors: usize,
}

/// Single writer for both sinks.
pub struct ResultRouter {
    success: Box<dyn RecordSink>,
    failure: Box<dyn RecordSink>,
    statement: PriceStatement,
}

impl ResultRouter {
    pub fn new(
        success: Box<dyn RecordSink>,
        failure: Box<dyn RecordSink>,
        statement: PriceStatement,
    ) -> Self {
        Self {
            success,
            failure,
            statement,
        }
    }

    /// Drains `outcomes` until every sender is dropped, then flushes.
    ///
    /// Write failures are logged and counted; routing continues.
    pub async fn run(mut self, mut outcomes: mpsc::Receiver<LookupOutcome>) -> RouterTotals {
        let mut totals = RouterTotals::default();

        while let Some(outcome) = outcomes.recv().await {
            self.route(outcome, &mut totals).await;
        }

        if let Err(e) = self.success.flush().await {
            error!("Failed to flush price records: {}", e);
            totals.write_errors += 1;
        }
        if let Err(e) = self.failure.flush().await {
            error!("Failed to flush failure records: {}", e);
            totals.write_errors += 1;
        }

        totals
    }

    async fn route(&mut self, outcome: LookupOutcome, totals: &mut RouterTotals) {
        match outcome {
            LookupOutcome::Priced { identifier, price } => {
                totals.priced += 1;
                info!("Writing price {} update for {}", format_price(price), identifier);
                let record = self.statement.render(&identifier, price);
                if let Err(e) = self.success.append(&record).await {
                    error!("Error writing record for {}: {}", identifier, e);
                    totals.write_errors += 1;
                }
            }
            LookupOutcome::Failed {
                identifier,
                reason,
                diagnostic,
            } => {
                totals.failed += 1;
                let record = failure_record(&identifier, reason, &diagnostic);
                if let Err(e) = self.failure.append(&record).await {
                    error!("Error writing failure record for {}: {}", identifier, e);
                    totals.write_errors += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct BrokenSink;

    #[async_trait]
    impl RecordSink for BrokenSink {
        async fn append(&mut self, _record: &str) -> Result<(), PipelineError> {
            Err(PipelineError::Sink("disk full".to_string()))
        }
    }

    #[test]
    fn test_update_statement() {
        let statement = PriceStatement::new(DEFAULT_TABLE, StatementStyle::Update);
        assert_eq!(
            statement.render("111", dec!(4.5)),
            "UPDATE `sana_db`.`item` SET `price` = '4.50' WHERE (`UPC` = '111');"
        );
    }

    #[test]
    fn test_upsert_statement() {
        let statement = PriceStatement::default();
        assert_eq!(
            statement.render("111", dec!(4.5)),
            "INSERT INTO `sana_db`.`item` (`UPC`, `price`) VALUES ('111', '4.50') \
             ON DUPLICATE KEY UPDATE `price` = VALUES(`price`);"
        );
    }

    #[test]
    fn test_statement_is_deterministic() {
        let statement = PriceStatement::default();
        assert_eq!(
            statement.render("111", dec!(4.5)),
            statement.render("111", dec!(4.50))
        );
    }

    #[test]
    fn test_price_rounding() {
        assert_eq!(format_price(dec!(9.999)), "10.00");
        assert_eq!(format_price(dec!(3)), "3.00");
        assert_eq!(format_price(dec!(0.125)), "0.12");
    }

    #[test]
    fn test_identifier_is_escaped() {
        let statement = PriceStatement::new("`item`", StatementStyle::Update);
        assert_eq!(
            statement.render("1'; DROP", dec!(1)),
            "UPDATE `item` SET `price` = '1.00' WHERE (`UPC` = '1''; DROP');"
        );
    }

    #[test]
    fn test_failure_record_is_one_line() {
        assert_eq!(
            failure_record("222", FailureReason::ProviderError, "NOT_FOUND"),
            "222 - PROVIDER_ERROR -> NOT_FOUND"
        );
        assert_eq!(
            failure_record("9", FailureReason::Transport, "connect\r\nrefused"),
            "9 - TRANSPORT -> connect refused"
        );
    }

    #[test]
    fn test_parse_statement_style() {
        assert_eq!("UPDATE".parse::<StatementStyle>().unwrap(), StatementStyle::Update);
        assert_eq!("upsert".parse::<StatementStyle>().unwrap(), StatementStyle::Upsert);
        assert!("merge".parse::<StatementStyle>().is_err());
    }

    #[tokio::test]
    async fn test_routes_each_outcome_once() {
        let success = MemorySink::new();
        let failure = MemorySink::new();
        let router = ResultRouter::new(
            Box::new(success.clone()),
            Box::new(failure.clone()),
            PriceStatement::new(DEFAULT_TABLE, StatementStyle::Update),
        );

        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(router.run(rx));

        tx.send(LookupOutcome::Failed {
            identifier: "222".to_string(),
            reason: FailureReason::ProviderError,
            diagnostic: "NOT_FOUND".to_string(),
        })
        .await
        .unwrap();
        tx.send(LookupOutcome::Priced {
            identifier: "111".to_string(),
            price: dec!(4.50),
        })
        .await
        .unwrap();
        drop(tx);

        let totals = handle.await.unwrap();
        assert_eq!(
            totals,
            RouterTotals {
                priced: 1,
                failed: 1,
                write_errors: 0,
            }
        );
        assert_eq!(
            success.records(),
            vec!["UPDATE `sana_db`.`item` SET `price` = '4.50' WHERE (`UPC` = '111');"]
        );
        assert_eq!(failure.records(), vec!["222 - PROVIDER_ERROR -> NOT_FOUND"]);
    }

    #[tokio::test]
    async fn test_write_errors_do_not_stop_routing() {
        let failure = MemorySink::new();
        let router = ResultRouter::new(
            Box::new(BrokenSink),
            Box::new(failure.clone()),
            PriceStatement::default(),
        );

        let (tx, rx) = mpsc::channel(4);
        tx.send(LookupOutcome::Priced {
            identifier: "1".to_string(),
            price: dec!(1),
        })
        .await
        .unwrap();
        tx.send(LookupOutcome::Failed {
            identifier: "2".to_string(),
            reason: FailureReason::NoApprovedOffer,
            diagnostic: "no approved offer among 0 offers".to_string(),
        })
        .await
        .unwrap();
        drop(tx);

        let totals = router.run(rx).await;
        assert_eq!(totals.priced, 1);
        assert_eq!(totals.failed, 1);
        assert_eq!(totals.write_errors, 1);
        assert_eq!(failure.records().len(), 1);
    }
}
