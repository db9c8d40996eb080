/// +----------------------------------------------------------+
/// | MODULES                                                  |
/// +----------+-------+-------+------------------------------+
/// | Exports:                                                 |
/// |   - dtos                                                 |
/// |   - error                                                |
/// |   - replay                                               |
/// +----------------------------------------------------------+

/// Command and outcome shapes for scripted input.
pub mod dtos;

/// Error types for the inbound layer.
pub mod error;

/// JSON-lines script driver.
pub mod replay;
