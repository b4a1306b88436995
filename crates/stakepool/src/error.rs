use alloy::{providers::PendingTransactionError, rpc::types::TransactionReceipt};

/// Failure to resolve a named contract from the registry.
///
/// Stringly typed so resolutions can be shared between concurrent callers
/// (the underlying future requires a cloneable output).
#[derive(Clone, Debug, thiserror::Error)]
#[error("could not resolve contract {name}: {message}")]
pub struct ResolveError {
    pub name: String,
    pub message: String,
}

impl ResolveError {
    pub fn new(name: impl Into<String>, message: impl ToString) -> Self {
        Self {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Everything that can go wrong in the contract wrapper. None of these are
/// retried; callers annotate them with the attempted operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("method '{0}' does not exist on contract")]
    UnknownMethod(String),
    #[error("event '{0}' does not exist on contract")]
    UnknownEvent(String),
    #[error("could not encode input data: {0}")]
    Encode(#[source] alloy::dyn_abi::Error),
    #[error("could not estimate gas needed: {0}")]
    GasEstimation(#[source] alloy::transports::TransportError),
    #[error(transparent)]
    Network(#[from] alloy::transports::TransportError),
    #[error("could not await transaction receipt: {0}")]
    Confirmation(#[source] PendingTransactionError),
    /// The transaction was mined but reverted. The receipt is kept around
    /// so the caller can still inspect its logs.
    #[error("transaction failed with status 0")]
    TransactionFailed { receipt: Box<TransactionReceipt> },
    #[error("could not decode data: {0}")]
    Decode(#[source] alloy::dyn_abi::Error),
    #[error("unexpected output value: {0}")]
    Value(String),
}
