//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Drives an OrderBookWorker from a JSON-lines command script.
//
// | Name           | Description                                              | Key Methods   |
// |----------------|----------------------------------------------------------|---------------|
// | ReplayDriver   | Parses script lines and applies them through a client    | parse_line    |
// |                |                                                          | apply         |
// |                |                                                          | replay        |
// |                |                                                          | replay_file   |
//--------------------------------------------------------------------------------------------------

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::dtos::{BookCommand, CommandOutcome, CommandRequest, ReplayRecord};
use super::error::InboundError;
use crate::domain::models::ids::{OrderFactory, OrderIdGenerator};
use crate::domain::services::orderbook::OrderbookError;
use crate::domain::services::orderbook::orderbook_worker::OrderBookClient;

/// Applies script commands to a worker, one at a time and in script order.
pub struct ReplayDriver<G: OrderIdGenerator> {
    client: OrderBookClient,
    factory: OrderFactory<G>,
}

impl<G: OrderIdGenerator> ReplayDriver<G> {
    /// # Arguments
    /// * `client` - Connection to the worker owning the book
    /// * `generator` - Source of ids for commands that omit one, and of arrival sequences
    pub fn new(client: OrderBookClient, generator: G) -> Self {
        Self {
            client,
            factory: OrderFactory::new(generator),
        }
    }

    /// Parses one script line. Blank lines and `#` comments yield `None`.
    ///
    /// # Arguments
    /// * `line_no` - 1-based line number, reported on parse failure
    pub fn parse_line(line_no: usize, line: &str) -> Result<Option<CommandRequest>, InboundError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|source| InboundError::Parse {
                line: line_no,
                source,
            })
    }

    /// Applies a single command.
    ///
    /// # Returns
    /// * `Ok(CommandOutcome)` - Including `Rejected` when the book refused the command
    /// * `Err(InboundError::Book)` - If the worker is gone
    pub async fn apply(&mut self, request: CommandRequest) -> Result<CommandOutcome, InboundError> {
        let result = match request.into_command(&mut self.factory) {
            BookCommand::Limit { price, order } => {
                let rested = CommandOutcome::rested(price, &order);
                self.client
                    .place_limit_order(price, order)
                    .await
                    .map(|()| rested)
            }
            BookCommand::Market { order } => self
                .client
                .place_market_order(order)
                .await
                .map(CommandOutcome::from),
            BookCommand::Cancel { order_id } => self
                .client
                .cancel_order(order_id)
                .await
                .map(|order| CommandOutcome::cancelled(&order)),
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err(err @ OrderbookError::WorkerUnavailable(_)) => Err(err.into()),
            Err(err) => {
                warn!(error = %err, "command rejected");
                Ok(CommandOutcome::Rejected {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Applies every command read from `reader`, handing each record to `on_record`.
    ///
    /// Stops at the first malformed line.
    ///
    /// # Returns
    /// The number of commands applied
    pub async fn replay<R>(
        &mut self,
        reader: R,
        mut on_record: impl FnMut(&ReplayRecord),
    ) -> Result<usize, InboundError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut line_no = 0usize;
        let mut applied = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let Some(request) = Self::parse_line(line_no, &line)? else {
                continue;
            };

            let outcome = self.apply(request).await?;
            let top = self.client.top_of_book().await?;
            on_record(&ReplayRecord {
                line: line_no,
                outcome,
                top,
            });
            applied += 1;
        }

        info!(lines = line_no, applied, "replay finished");
        Ok(applied)
    }

    /// Opens `path` and replays it.
    pub async fn replay_file(
        &mut self,
        path: impl AsRef<Path>,
        on_record: impl FnMut(&ReplayRecord),
    ) -> Result<usize, InboundError> {
        let path = path.as_ref();
        info!(path = %path.display(), "replaying command script");
        let file = File::open(path).await?;
        self.replay(BufReader::new(file), on_record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ids::SequentialIdGenerator;
    use crate::domain::services::orderbook::orderbook_worker::OrderBookWorker;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_line_skips_blank_and_comments() {
        type Driver = ReplayDriver<SequentialIdGenerator>;
        assert!(Driver::parse_line(1, "").unwrap().is_none());
        assert!(Driver::parse_line(2, "   # warm up").unwrap().is_none());
        assert!(Driver::parse_line(3, r#"{"type":"cancel","id":"00000000-0000-0000-0000-000000000001"}"#)
            .unwrap()
            .is_some());

        let err = Driver::parse_line(9, "{not json").unwrap_err();
        assert!(matches!(err, InboundError::Parse { line: 9, .. }));
    }

    #[tokio::test]
    async fn test_replay_from_memory() {
        let (client, _handle) = OrderBookWorker::new().start();
        let mut driver = ReplayDriver::new(client.clone(), SequentialIdGenerator::new());
        let script = concat!(
            "# two asks then a taker\n",
            "{\"type\":\"limit\",\"side\":\"ask\",\"price\":\"101\",\"size\":\"2\"}\n",
            "{\"type\":\"limit\",\"side\":\"ask\",\"price\":\"100\",\"size\":\"3\"}\n",
            "\n",
            "{\"type\":\"market\",\"side\":\"bid\",\"size\":\"4\"}\n",
            "{\"type\":\"market\",\"side\":\"bid\",\"size\":\"4\"}\n",
        );

        let mut records = Vec::new();
        let applied = driver
            .replay(script.as_bytes(), |record| records.push(record.clone()))
            .await
            .unwrap();

        assert_eq!(applied, 4);
        let lines: Vec<usize> = records.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 5, 6]);

        let CommandOutcome::Matched { filled, matches, .. } = &records[2].outcome else {
            panic!("expected a match, got {:?}", records[2].outcome);
        };
        assert_eq!(*filled, dec!(4));
        let prices: Vec<_> = matches.iter().map(|m| m.price).collect();
        assert_eq!(prices, vec![dec!(100), dec!(101)]);
        assert_eq!(records[2].top.ask_volume, dec!(1));

        assert!(records[3].outcome.is_rejected());
        assert_eq!(records[3].top.best_ask, Some(dec!(101)));

        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_replay_stops_on_malformed_line() {
        let (client, _handle) = OrderBookWorker::new().start();
        let mut driver = ReplayDriver::new(client.clone(), SequentialIdGenerator::new());
        let script = "{\"type\":\"limit\",\"side\":\"bid\",\"price\":\"1\",\"size\":\"1\"}\n{\"type\":\"limit\"}\n";

        let mut seen = 0;
        let err = driver
            .replay(script.as_bytes(), |_| seen += 1)
            .await
            .unwrap_err();

        assert!(matches!(err, InboundError::Parse { line: 2, .. }));
        assert_eq!(seen, 1);
        client.shutdown().await.unwrap();
    }
}
