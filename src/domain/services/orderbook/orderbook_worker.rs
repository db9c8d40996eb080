//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements a thread worker for processing order book operations asynchronously.
// It uses message passing so the OrderBook is only ever touched by one thread, while any
// number of tasks submit commands through cloned clients.
//
// | Component           | Description                                                 |
// |---------------------|-------------------------------------------------------------|
// | OrderBookWorker     | Worker thread owning an OrderBook                           |
// | OrderBookClient     | Client interface to interact with the worker                |
// | OrderBookCommand    | Commands sent to the worker                                 |
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name               | Description                                       | Key Methods         |
// |--------------------|---------------------------------------------------|---------------------|
// | OrderBookWorker    | Worker thread managing OrderBook                  | start               |
// |                    |                                                   | handle_command      |
// |--------------------|---------------------------------------------------|---------------------|
// | OrderBookClient    | Client interface to worker                        | place_limit_order   |
// |                    |                                                   | place_market_order  |
// |                    |                                                   | cancel_order        |
// |                    |                                                   | top_of_book         |
// |                    |                                                   | depth               |
//
//--------------------------------------------------------------------------------------------------
// ENUMS
//--------------------------------------------------------------------------------------------------
// | Name               | Description                                       | Variants            |
// |--------------------|---------------------------------------------------|---------------------|
// | OrderBookCommand   | Commands sent to worker                           | PlaceLimit          |
// |                    |                                                   | PlaceMarket         |
// |                    |                                                   | Cancel              |
// |                    |                                                   | TopOfBook           |
// |                    |                                                   | Depth               |
// |                    |                                                   | Shutdown            |
//--------------------------------------------------------------------------------------------------

use std::thread::{self, JoinHandle};

use rust_decimal::Decimal;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::domain::models::orderbook::{MarketOrderOutcome, TopOfBook};
use crate::domain::models::types::{Order, OrderId};
use crate::domain::services::orderbook::depth::DepthSnapshot;
use crate::domain::services::orderbook::orderbook::OrderBook;
use crate::domain::services::orderbook::{OrderbookError, OrderbookResult};

/// Default bound of the command channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Commands that can be sent to the OrderBookWorker
#[derive(Debug)]
enum OrderBookCommand {
    /// Rest a limit order
    PlaceLimit {
        price: Decimal,
        order: Order,
        response_tx: oneshot::Sender<OrderbookResult<()>>,
    },

    /// Execute a market order
    PlaceMarket {
        order: Order,
        response_tx: oneshot::Sender<OrderbookResult<MarketOrderOutcome>>,
    },

    /// Cancel a resting order
    Cancel {
        order_id: OrderId,
        response_tx: oneshot::Sender<OrderbookResult<Order>>,
    },

    /// Get best prices and side volumes
    TopOfBook {
        response_tx: oneshot::Sender<TopOfBook>,
    },

    /// Get the current market depth
    Depth {
        levels: usize,
        response_tx: oneshot::Sender<DepthSnapshot>,
    },

    /// Shut down the worker thread
    Shutdown,
}

/// Worker thread that processes order book operations
pub struct OrderBookWorker {
    /// The order book being managed by this worker
    order_book: OrderBook,

    /// Bound of the command channel
    channel_capacity: usize,
}

impl Default for OrderBookWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBookWorker {
    /// Creates a worker around an empty book.
    pub fn new() -> Self {
        Self::with_book(OrderBook::new())
    }

    /// Creates a worker that takes ownership of an existing book.
    ///
    /// # Arguments
    /// * `order_book` - The book this worker will own
    pub fn with_book(order_book: OrderBook) -> Self {
        Self {
            order_book,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Sets the bound of the command channel. Zero is raised to one.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Starts the worker thread and returns a client to interact with it.
    ///
    /// # Returns
    /// A client that can be used to send commands to this worker, and the
    /// thread handle, which yields the final book once the worker stops
    pub fn start(self) -> (OrderBookClient, JoinHandle<OrderBook>) {
        let (command_tx, command_rx) = mpsc::channel(self.channel_capacity);
        let client = OrderBookClient::new(command_tx);

        let handle = thread::spawn(move || {
            let mut worker = self;
            match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(worker.run(command_rx)),
                Err(e) => error!("Failed to create tokio runtime for OrderBookWorker: {}", e),
            }
            worker.order_book
        });

        (client, handle)
    }

    /// Main worker loop that processes commands
    async fn run(&mut self, mut rx: Receiver<OrderBookCommand>) {
        info!("OrderBookWorker started");
        while let Some(cmd) = rx.recv().await {
            match cmd {
                OrderBookCommand::Shutdown => break,
                _ => self.handle_command(cmd),
            }
        }
        info!(orders = self.order_book.order_count(), "OrderBookWorker stopped");
    }

    /// Processes a single command
    fn handle_command(&mut self, cmd: OrderBookCommand) {
        match cmd {
            OrderBookCommand::PlaceLimit {
                price,
                order,
                response_tx,
            } => {
                let result = self.order_book.place_limit_order(price, order);
                let _ = response_tx.send(result);
            }

            OrderBookCommand::PlaceMarket {
                mut order,
                response_tx,
            } => {
                let result = self
                    .order_book
                    .place_market_order(&mut order)
                    .map(|matches| MarketOrderOutcome { order, matches });
                let _ = response_tx.send(result);
            }

            OrderBookCommand::Cancel {
                order_id,
                response_tx,
            } => {
                let result = self.order_book.cancel_order(order_id);
                let _ = response_tx.send(result);
            }

            OrderBookCommand::TopOfBook { response_tx } => {
                let _ = response_tx.send(self.order_book.top_of_book());
            }

            OrderBookCommand::Depth {
                levels,
                response_tx,
            } => {
                let _ = response_tx.send(self.order_book.depth(levels));
            }

            OrderBookCommand::Shutdown => {
                // Handled in the run loop
            }
        }
    }
}

/// Client interface to interact with the OrderBookWorker
#[derive(Clone)]
pub struct OrderBookClient {
    command_tx: Sender<OrderBookCommand>,
}

impl OrderBookClient {
    /// Creates a new client connected to the worker.
    ///
    /// # Arguments
    /// * `command_tx` - Sender for commands to the worker
    fn new(command_tx: Sender<OrderBookCommand>) -> Self {
        Self { command_tx }
    }

    /// Sends a command and waits for the worker's reply.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> OrderBookCommand,
    ) -> OrderbookResult<T> {
        let (response_tx, response_rx) = oneshot::channel();

        self.command_tx.send(build(response_tx)).await.map_err(|_| {
            OrderbookError::WorkerUnavailable("OrderBookWorker channel closed".to_string())
        })?;

        response_rx.await.map_err(|_| {
            OrderbookError::WorkerUnavailable(
                "Failed to receive response from OrderBookWorker".to_string(),
            )
        })
    }

    /// Rests a limit order in the book.
    ///
    /// # Arguments
    /// * `price` - Limit price
    /// * `order` - The order to rest
    ///
    /// # Returns
    /// A result indicating success or the error that occurred
    pub async fn place_limit_order(&self, price: Decimal, order: Order) -> OrderbookResult<()> {
        debug!(order_id = %order.id(), %price, "submitting limit order");
        self.request(|response_tx| OrderBookCommand::PlaceLimit {
            price,
            order,
            response_tx,
        })
        .await?
    }

    /// Executes a market order.
    ///
    /// # Returns
    /// The filled taker plus its matches, or the rejection
    pub async fn place_market_order(&self, order: Order) -> OrderbookResult<MarketOrderOutcome> {
        debug!(order_id = %order.id(), "submitting market order");
        self.request(|response_tx| OrderBookCommand::PlaceMarket { order, response_tx })
            .await?
    }

    /// Cancels a resting order.
    ///
    /// # Arguments
    /// * `order_id` - The ID of the order to cancel
    ///
    /// # Returns
    /// The removed order if successful, or an error
    pub async fn cancel_order(&self, order_id: OrderId) -> OrderbookResult<Order> {
        self.request(|response_tx| OrderBookCommand::Cancel {
            order_id,
            response_tx,
        })
        .await?
    }

    pub async fn top_of_book(&self) -> OrderbookResult<TopOfBook> {
        self.request(|response_tx| OrderBookCommand::TopOfBook { response_tx })
            .await
    }

    /// Gets the current market depth.
    ///
    /// # Arguments
    /// * `levels` - Maximum number of price levels to include per side
    pub async fn depth(&self, levels: usize) -> OrderbookResult<DepthSnapshot> {
        self.request(|response_tx| OrderBookCommand::Depth {
            levels,
            response_tx,
        })
        .await
    }

    /// Shuts down the worker thread.
    ///
    /// Commands queued before this one are still processed.
    pub async fn shutdown(&self) -> OrderbookResult<()> {
        self.command_tx
            .send(OrderBookCommand::Shutdown)
            .await
            .map_err(|_| {
                OrderbookError::WorkerUnavailable("OrderBookWorker channel closed".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ids::{OrderFactory, SequentialIdGenerator};
    use crate::domain::models::types::OrderStatus;
    use rust_decimal_macros::dec;

    fn factory() -> OrderFactory<SequentialIdGenerator> {
        OrderFactory::new(SequentialIdGenerator::new())
    }

    #[tokio::test]
    async fn test_place_and_get_top_of_book() {
        let mut f = factory();
        let (client, _handle) = OrderBookWorker::new().start();

        client
            .place_limit_order(dec!(100), f.bid(dec!(5)))
            .await
            .expect("Failed to add bid order");
        client
            .place_limit_order(dec!(101), f.ask(dec!(3)))
            .await
            .expect("Failed to add ask order");

        let top = client.top_of_book().await.expect("Failed to get top of book");
        assert_eq!(top.best_bid, Some(dec!(100)));
        assert_eq!(top.best_ask, Some(dec!(101)));
        assert_eq!(top.bid_volume, dec!(5));
        assert_eq!(top.spread(), Some(dec!(1)));

        let depth = client.depth(10).await.expect("Failed to get depth");
        assert_eq!(depth.bids.len(), 1);
        assert_eq!(depth.asks.len(), 1);

        client.shutdown().await.expect("Failed to shut down worker");
    }

    #[tokio::test]
    async fn test_market_order_through_worker() {
        let mut f = factory();
        let (client, _handle) = OrderBookWorker::new().start();
        let maker = f.ask(dec!(4));
        let maker_id = maker.id();
        client.place_limit_order(dec!(50), maker).await.unwrap();

        let outcome = client.place_market_order(f.bid(dec!(3))).await.unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].maker_order_id, maker_id);
        assert_eq!(outcome.filled_size(), dec!(3));
        assert_eq!(outcome.order.status(), OrderStatus::Filled);

        let err = client.place_market_order(f.bid(dec!(2))).await.unwrap_err();
        assert_eq!(
            err,
            OrderbookError::InsufficientLiquidity {
                requested: dec!(2),
                available: dec!(1),
            }
        );

        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_order() {
        let mut f = factory();
        let (client, _handle) = OrderBookWorker::new().start();
        let order = f.bid(dec!(5));
        let order_id = order.id();
        client.place_limit_order(dec!(100), order).await.unwrap();

        let removed = client.cancel_order(order_id).await.expect("Failed to remove order");
        assert_eq!(removed.id(), order_id);
        assert_eq!(removed.status(), OrderStatus::Cancelled);

        let top = client.top_of_book().await.unwrap();
        assert_eq!(top.best_bid, None);

        assert_eq!(
            client.cancel_order(order_id).await,
            Err(OrderbookError::UnknownOrder(order_id))
        );

        client.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_clients_are_serialized() {
        let (client, handle) = OrderBookWorker::new().with_channel_capacity(8).start();

        let mut tasks = Vec::new();
        for start in 0..4u64 {
            let client = client.clone();
            tasks.push(tokio::spawn(async move {
                let mut f = OrderFactory::new(SequentialIdGenerator::starting_at(start * 100));
                for _ in 0..25 {
                    client.place_limit_order(dec!(10), f.ask(dec!(1))).await.unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        client.shutdown().await.unwrap();
        let book = tokio::task::spawn_blocking(move || handle.join().unwrap())
            .await
            .unwrap();
        assert_eq!(book.order_count(), 100);
        assert_eq!(book.ask_total_volume(), dec!(100));
    }

    #[tokio::test]
    async fn test_client_after_shutdown() {
        let (client, handle) = OrderBookWorker::new().start();
        client.shutdown().await.unwrap();
        tokio::task::spawn_blocking(move || handle.join().unwrap())
            .await
            .unwrap();

        let err = client.top_of_book().await.unwrap_err();
        assert!(matches!(err, OrderbookError::WorkerUnavailable(_)));
    }
}
