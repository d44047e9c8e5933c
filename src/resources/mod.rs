//! Typed wrappers over the transaction endpoints.
//!
//! Each wrapper checks its arguments locally, then issues exactly one call
//! through the shared transport core. `list_all` methods return lazy streams
//! that fetch one page per round trip.

mod incoming;
mod outgoing;
mod transactions;

pub use incoming::{IncomingTransactions, ListIncomingOptions};
pub use outgoing::OutgoingTransactions;
pub use transactions::{AllTransactions, ListTransactionsOptions};
