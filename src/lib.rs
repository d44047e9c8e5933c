//! `procuros-http` is an async HTTP client for the Procuros transactional
//! document API (orders, invoices, shipping notices, ...).
//!
//! Every call goes through one transport core that applies a per-attempt
//! timeout, optional caller cancellation, retries with jittered exponential
//! backoff, `Retry-After` handling for 429 responses, and maps failures to
//! [`ProcurosError`]:
//! - [`ProcurosClient::incoming`]
//! - [`ProcurosClient::outgoing`]
//! - [`ProcurosClient::transactions`]
//! - [`ProcurosClient::ping`]

mod client;
mod decode;
mod error;
mod http;
mod options;
mod pagination;
mod resources;
mod retry;
mod signal;
pub mod transport;
mod types;
mod validate;
mod wire;

pub use client::{ClientBuilder, ProcurosClient};
pub use error::{ApiError, ProcurosError, RateLimitError, ResponseBody, ValidationError};
pub use http::ApiRequest;
pub use options::{ClientOptions, Environment, RequestOptions};
pub use resources::{
    AllTransactions, IncomingTransactions, ListIncomingOptions, ListTransactionsOptions,
    OutgoingTransactions,
};
pub use transport::Method;
pub use types::{
    ErrorType, ReceivedTransaction, Transaction, TransactionFlow, TransactionStatus,
    TransactionType,
};
pub use wire::{
    BulkMarkProcessedItem, BulkMarkProcessedResponse, BulkMarkProcessedResult,
    MarkProcessedRequest, MarkProcessedResponse, Page, ProcessedMessage, ReportErrorRequest,
    ReportErrorResponse, SendTransactionResponse, SentTransaction,
};

/// Re-exported so callers need no direct `tokio-util` dependency.
pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, ProcurosError>;
