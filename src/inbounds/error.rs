use thiserror::Error;

use crate::domain::services::orderbook::OrderbookError;

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Enums:                                                   |
/// |   - InboundError                                         |
/// +----------------------------------------------------------+

/// Represents errors that stop a replay.
///
/// Book-level rejections of individual commands are not errors here; they are
/// reported as `rejected` outcomes and the replay continues.
#[derive(Debug, Error)]
pub enum InboundError {
    /// A script line is not a valid command.
    #[error("Parse error on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The script could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The book could not be reached.
    #[error(transparent)]
    Book(#[from] OrderbookError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_error_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let parse = InboundError::Parse { line: 4, source };
        assert!(format!("{}", parse).starts_with("Parse error on line 4:"));

        let book = InboundError::from(OrderbookError::WorkerUnavailable("gone".to_string()));
        assert_eq!(format!("{}", book), "Order book worker unavailable: gone");
    }
}
