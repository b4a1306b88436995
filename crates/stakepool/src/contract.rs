//! The bound-contract wrapper: read calls, state-changing transactions with
//! gas-limit estimation and receipt confirmation, and event extraction from
//! mined transactions.

use {
    crate::{
        error::Error,
        values::FromValues,
    },
    alloy::{
        dyn_abi::{DecodedEvent, DynSolValue, EventExt, FunctionExt, JsonAbiExt},
        eips::BlockId,
        json_abi::{Event, Function, JsonAbi},
        primitives::{Address, Bytes, U256},
        providers::Provider,
        rpc::types::{TransactionReceipt, TransactionRequest},
    },
    ethrpc::AlloyProvider,
};

/// Gas-limit padding and cap applied on top of the node's estimate. The
/// padding protects against chain-state-dependent underestimation, the cap
/// against runaway estimates consuming an entire block's gas budget.
#[derive(Clone, Debug)]
pub struct GasConfig {
    pub padding: u64,
    pub cap: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            padding: 100_000,
            cap: 12_000_000,
        }
    }
}

impl GasConfig {
    /// The gas limit used for a transaction whose simulation returned
    /// `estimate`: `min(estimate + padding, cap)`.
    pub fn limit(&self, estimate: u64) -> u64 {
        estimate.saturating_add(self.padding).min(self.cap)
    }
}

/// Context for a read call. `Default` reads the latest state.
#[derive(Clone, Debug, Default)]
pub struct CallOpts {
    pub from: Option<Address>,
    pub block: Option<BlockId>,
}

impl CallOpts {
    pub fn at_block(block: impl Into<BlockId>) -> Self {
        Self {
            block: Some(block.into()),
            ..Default::default()
        }
    }
}

/// Context for a state-changing transaction. Leaving `gas_limit` unset (or
/// zero) makes the wrapper estimate it.
#[derive(Clone, Debug)]
pub struct TransactOpts {
    pub from: Address,
    pub gas_price: Option<u128>,
    pub value: U256,
    pub gas_limit: Option<u64>,
}

impl TransactOpts {
    pub fn new(from: Address) -> Self {
        Self {
            from,
            gas_price: None,
            value: U256::ZERO,
            gas_limit: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// A deployed contract bound to its interface descriptor and a provider.
/// Immutable once constructed; shared by all callers.
pub struct Contract {
    address: Address,
    abi: JsonAbi,
    provider: AlloyProvider,
    gas: GasConfig,
}

impl Contract {
    pub fn new(address: Address, abi: JsonAbi, provider: AlloyProvider, gas: GasConfig) -> Self {
        Self {
            address,
            abi,
            provider,
            gas,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    fn function(&self, method: &str) -> Result<&Function, Error> {
        self.abi
            .functions
            .get(method)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))
    }

    fn event(&self, name: &str) -> Result<&Event, Error> {
        self.abi
            .events
            .get(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| Error::UnknownEvent(name.to_string()))
    }

    /// Invokes a side-effect-free method and decodes the result into the
    /// requested typed slot.
    pub async fn call<T: FromValues>(
        &self,
        opts: &CallOpts,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<T, Error> {
        let function = self.function(method)?;
        let input = function.abi_encode_input(args).map_err(Error::Encode)?;

        let mut tx = TransactionRequest::default()
            .to(self.address)
            .input(input.into());
        if let Some(from) = opts.from {
            tx = tx.from(from);
        }
        let mut call = self.provider.call(tx);
        if let Some(block) = opts.block {
            call = call.block(block);
        }
        let output = call.await?;

        let values = function.abi_decode_output(&output).map_err(Error::Decode)?;
        T::from_values(values)
    }

    /// Invokes a state-changing method, waits for it to be mined and
    /// confirms it did not revert.
    pub async fn transact(
        &self,
        opts: &TransactOpts,
        method: &str,
        args: &[DynSolValue],
    ) -> Result<TransactionReceipt, Error> {
        let function = self.function(method)?;
        let input = function.abi_encode_input(args).map_err(Error::Encode)?;
        let tx = self.prepare(opts, input.into()).await?;
        self.submit(tx).await
    }

    /// Transfers plain value to the contract: the same flow as
    /// [`Self::transact`] over empty input data.
    pub async fn transfer(&self, opts: &TransactOpts) -> Result<TransactionReceipt, Error> {
        let tx = self.prepare(opts, Bytes::new()).await?;
        self.submit(tx).await
    }

    /// Builds the transaction request, estimating the gas limit if the
    /// caller did not pre-set one.
    async fn prepare(&self, opts: &TransactOpts, input: Bytes) -> Result<TransactionRequest, Error> {
        let mut tx = TransactionRequest::default()
            .from(opts.from)
            .to(self.address)
            .value(opts.value)
            .input(input.into());
        tx.gas_price = opts.gas_price;

        let gas_limit = match opts.gas_limit {
            Some(limit) if limit > 0 => limit,
            _ => self.estimate_gas_limit(tx.clone()).await?,
        };
        Ok(tx.gas_limit(gas_limit))
    }

    /// Simulates the transaction to estimate its gas use, then pads and
    /// caps the estimate per [`GasConfig`].
    pub async fn estimate_gas_limit(&self, tx: TransactionRequest) -> Result<u64, Error> {
        let estimate = self
            .provider
            .estimate_gas(tx)
            .await
            .map_err(Error::GasEstimation)?;
        Ok(self.gas.limit(estimate))
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<TransactionReceipt, Error> {
        let pending = self.provider.send_transaction(tx).await?;
        tracing::debug!(hash = %pending.tx_hash(), to = %self.address, "waiting for transaction");
        let receipt = pending.get_receipt().await.map_err(Error::Confirmation)?;
        check_receipt(receipt)
    }

    /// Extracts this contract's events named `name` from a mined
    /// transaction's receipt: a log survives iff it was emitted by this
    /// contract's address and its first topic is the event's signature
    /// hash. Survivors are decoded in log order; zero matches is fine.
    pub fn events(
        &self,
        receipt: &TransactionReceipt,
        name: &str,
    ) -> Result<Vec<DecodedEvent>, Error> {
        let event = self.event(name)?;
        let selector = event.selector();
        receipt
            .inner
            .logs()
            .iter()
            .filter(|log| {
                log.inner.address == self.address
                    && log.inner.data.topics().first() == Some(&selector)
            })
            .map(|log| {
                event
                    .decode_log_parts(log.inner.data.topics().iter().copied(), &log.inner.data.data)
                    .map_err(Error::Decode)
            })
            .collect()
    }

    /// Like [`Self::events`], but converting each record with a decoder
    /// supplied at the call site.
    pub fn events_as<T>(
        &self,
        receipt: &TransactionReceipt,
        name: &str,
        decode: impl Fn(DecodedEvent) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        self.events(receipt, name)?.into_iter().map(decode).collect()
    }
}

impl std::fmt::Debug for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// A receipt with status 0 is a failed transaction even though the network
/// mined it.
fn check_receipt(receipt: TransactionReceipt) -> Result<TransactionReceipt, Error> {
    if !receipt.status() {
        return Err(Error::TransactionFailed {
            receipt: Box::new(receipt),
        });
    }
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            consensus::{Eip658Value, Receipt, ReceiptEnvelope, ReceiptWithBloom},
            primitives::{B256, Bloom, Log as PrimitiveLog, LogData},
            providers::{Provider, ProviderBuilder, mock::Asserter},
            rpc::types::Log,
            sol_types::SolValue,
        },
    };

    const ABI: &str = r#"[
        {
            "type": "function",
            "name": "getBalance",
            "inputs": [],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "assignDeposits",
            "inputs": [],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "event",
            "name": "DepositReceived",
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "amount", "type": "uint256", "indexed": false},
                {"name": "time", "type": "uint256", "indexed": false}
            ],
            "anonymous": false
        }
    ]"#;

    fn contract_at(address: Address, provider: AlloyProvider) -> Contract {
        let abi = serde_json::from_str(ABI).unwrap();
        Contract::new(address, abi, provider, GasConfig::default())
    }

    fn mocked() -> (Asserter, AlloyProvider) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .connect_mocked_client(asserter.clone())
            .erased();
        (asserter, provider)
    }

    /// Like [`mocked`], but without the builder's recommended fillers. The
    /// fillers issue their own RPC requests (nonce, chain id, fees) which
    /// would race the wrapper's requests for the asserter's response queue.
    fn mocked_without_fillers() -> (Asserter, AlloyProvider) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone())
            .erased();
        (asserter, provider)
    }

    /// Queues the receipt for a pending submission. The pending-transaction
    /// watcher polls the chain head over the same response queue, so spare
    /// copies keep the receipt fetch itself from running dry.
    fn push_receipt(asserter: &Asserter, receipt: &TransactionReceipt) {
        for _ in 0..3 {
            asserter.push_success(receipt);
        }
    }

    fn receipt_with(status: bool, logs: Vec<Log>) -> TransactionReceipt {
        TransactionReceipt {
            inner: ReceiptEnvelope::Eip1559(ReceiptWithBloom {
                receipt: Receipt {
                    status: Eip658Value::Eip658(status),
                    cumulative_gas_used: 21_000,
                    logs,
                },
                logs_bloom: Bloom::ZERO,
            }),
            transaction_hash: B256::ZERO,
            transaction_index: Some(0),
            block_hash: Some(B256::ZERO),
            block_number: Some(1),
            gas_used: 21_000,
            effective_gas_price: 0,
            blob_gas_used: None,
            blob_gas_price: None,
            from: Address::ZERO,
            to: Some(Address::repeat_byte(0x11)),
            contract_address: None,
        }
    }

    fn log(address: Address, topics: Vec<B256>, data: Vec<u8>) -> Log {
        Log {
            inner: PrimitiveLog {
                address,
                data: LogData::new_unchecked(topics, data.into()),
            },
            ..Default::default()
        }
    }

    fn deposit_received_log(contract: Address, from: Address, amount: u64, time: u64) -> Log {
        let abi: JsonAbi = serde_json::from_str(ABI).unwrap();
        let selector = abi.events["DepositReceived"][0].selector();
        let mut data = U256::from(amount).to_be_bytes::<32>().to_vec();
        data.extend_from_slice(&U256::from(time).to_be_bytes::<32>());
        log(contract, vec![selector, from.into_word()], data)
    }

    #[test]
    fn gas_limit_is_padded_and_capped() {
        let gas = GasConfig::default();
        assert_eq!(gas.limit(50_000), 150_000);
        assert_eq!(gas.limit(11_900_000), 12_000_000);
        assert_eq!(gas.limit(11_900_001), 12_000_000);
        assert_eq!(gas.limit(u64::MAX), 12_000_000);

        let gas = GasConfig {
            padding: 10,
            cap: 100,
        };
        assert_eq!(gas.limit(80), 90);
        assert_eq!(gas.limit(90), 100);
        assert_eq!(gas.limit(95), 100);
    }

    #[test]
    fn status_zero_receipt_is_a_failure() {
        assert!(check_receipt(receipt_with(true, vec![])).is_ok());
        match check_receipt(receipt_with(false, vec![])) {
            Err(Error::TransactionFailed { receipt }) => {
                // The receipt stays available for log inspection.
                assert!(!receipt.status());
            }
            other => panic!("expected transaction failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn call_decodes_into_typed_slot() {
        let (asserter, provider) = mocked();
        let contract = contract_at(Address::repeat_byte(0x11), provider);

        asserter.push_success(&U256::from(1337).abi_encode());
        let balance: U256 = contract
            .call(&CallOpts::default(), "getBalance", &[])
            .await
            .unwrap();
        assert_eq!(balance, U256::from(1337));
    }

    #[tokio::test]
    async fn call_rejects_unknown_method() {
        let (_asserter, provider) = mocked();
        let contract = contract_at(Address::repeat_byte(0x11), provider);

        let result: Result<U256, _> = contract
            .call(&CallOpts::default(), "noSuchMethod", &[])
            .await;
        assert!(matches!(result, Err(Error::UnknownMethod(_))));
    }

    #[tokio::test]
    async fn preparing_with_preset_gas_limit_skips_estimation() {
        // The asserter holds no responses, so any estimation attempt would
        // error out.
        let (_asserter, provider) = mocked();
        let contract = contract_at(Address::repeat_byte(0x11), provider);

        let opts = TransactOpts::new(Address::repeat_byte(0x22)).with_gas_limit(1_000_000);
        let tx = contract.prepare(&opts, Bytes::new()).await.unwrap();
        assert_eq!(tx.gas, Some(1_000_000));
    }

    #[tokio::test]
    async fn preparing_without_gas_limit_estimates_pads_and_caps() {
        let (asserter, provider) = mocked();
        let contract = contract_at(Address::repeat_byte(0x11), provider);

        asserter.push_success(&U256::from(50_000));
        let opts = TransactOpts::new(Address::repeat_byte(0x22));
        let tx = contract.prepare(&opts, Bytes::new()).await.unwrap();
        assert_eq!(tx.gas, Some(150_000));

        asserter.push_success(&U256::from(11_999_999));
        let tx = contract.prepare(&opts, Bytes::new()).await.unwrap();
        assert_eq!(tx.gas, Some(12_000_000));
    }

    #[tokio::test]
    async fn transact_returns_the_mined_receipt() {
        let (asserter, provider) = mocked_without_fillers();
        let contract = contract_at(Address::repeat_byte(0x11), provider);

        asserter.push_success(&B256::repeat_byte(0x42));
        push_receipt(&asserter, &receipt_with(true, vec![]));

        let opts = TransactOpts::new(Address::repeat_byte(0x22)).with_gas_limit(1_000_000);
        let receipt = contract
            .transact(&opts, "assignDeposits", &[])
            .await
            .unwrap();
        assert!(receipt.status());
    }

    #[tokio::test]
    async fn transact_surfaces_reverted_transactions_with_their_receipt() {
        let (asserter, provider) = mocked_without_fillers();
        let contract = contract_at(Address::repeat_byte(0x11), provider);

        asserter.push_success(&B256::repeat_byte(0x42));
        push_receipt(&asserter, &receipt_with(false, vec![]));

        let opts = TransactOpts::new(Address::repeat_byte(0x22)).with_gas_limit(1_000_000);
        match contract.transact(&opts, "assignDeposits", &[]).await {
            Err(Error::TransactionFailed { receipt }) => assert!(!receipt.status()),
            other => panic!("expected transaction failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unavailable_receipt_is_a_confirmation_error() {
        let (asserter, provider) = mocked_without_fillers();
        let contract = contract_at(Address::repeat_byte(0x11), provider);

        // Only the submission response is queued; fetching the receipt hits
        // a dead transport.
        asserter.push_success(&B256::repeat_byte(0x42));

        let opts = TransactOpts::new(Address::repeat_byte(0x22)).with_gas_limit(1_000_000);
        match contract.transact(&opts, "assignDeposits", &[]).await {
            Err(Error::Confirmation(_)) => (),
            other => panic!("expected a confirmation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transfer_confirms_like_a_method_transaction() {
        let (asserter, provider) = mocked_without_fillers();
        let contract = contract_at(Address::repeat_byte(0x11), provider);

        asserter.push_success(&B256::repeat_byte(0x42));
        push_receipt(&asserter, &receipt_with(true, vec![]));

        let opts = TransactOpts::new(Address::repeat_byte(0x22))
            .with_value(U256::from(1_000_000_000u64))
            .with_gas_limit(21_000);
        let receipt = contract.transfer(&opts).await.unwrap();
        assert!(receipt.status());
    }

    #[test]
    fn extracts_matching_events_in_log_order() {
        let address = Address::repeat_byte(0x11);
        let contract = contract_at(address, ethrpc::dummy_provider());
        let sender = Address::repeat_byte(0xaa);

        let receipt = receipt_with(
            true,
            vec![
                deposit_received_log(address, sender, 100, 1),
                // Same event, different emitting contract: filtered out.
                deposit_received_log(Address::repeat_byte(0x99), sender, 200, 2),
                // Emitted by us but a different event signature.
                log(address, vec![B256::repeat_byte(0xff)], vec![]),
                deposit_received_log(address, sender, 300, 3),
            ],
        );

        let events = contract.events(&receipt, "DepositReceived").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].indexed, vec![DynSolValue::Address(sender)]);
        assert_eq!(
            events[0].body,
            vec![
                DynSolValue::Uint(U256::from(100), 256),
                DynSolValue::Uint(U256::from(1), 256),
            ]
        );
        assert_eq!(events[1].body[0], DynSolValue::Uint(U256::from(300), 256));
    }

    #[test]
    fn zero_matching_logs_is_not_an_error() {
        let contract = contract_at(Address::repeat_byte(0x11), ethrpc::dummy_provider());
        let events = contract
            .events(&receipt_with(true, vec![]), "DepositReceived")
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn unknown_event_name_is_an_error() {
        let contract = contract_at(Address::repeat_byte(0x11), ethrpc::dummy_provider());
        assert!(matches!(
            contract.events(&receipt_with(true, vec![]), "NoSuchEvent"),
            Err(Error::UnknownEvent(_))
        ));
    }

    #[test]
    fn malformed_matched_log_fails_the_extraction() {
        let address = Address::repeat_byte(0x11);
        let contract = contract_at(address, ethrpc::dummy_provider());
        let abi: JsonAbi = serde_json::from_str(ABI).unwrap();
        let selector = abi.events["DepositReceived"][0].selector();

        // Matching address and topic, but the data is truncated.
        let receipt = receipt_with(
            true,
            vec![log(
                address,
                vec![selector, Address::repeat_byte(0xaa).into_word()],
                vec![0u8; 7],
            )],
        );
        assert!(matches!(
            contract.events(&receipt, "DepositReceived"),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn typed_event_decoding_is_parameterized_at_the_call_site() {
        let address = Address::repeat_byte(0x11);
        let contract = contract_at(address, ethrpc::dummy_provider());
        let sender = Address::repeat_byte(0xaa);
        let receipt = receipt_with(true, vec![deposit_received_log(address, sender, 100, 1)]);

        struct DepositReceived {
            from: Address,
            amount: U256,
        }
        let deposits = contract
            .events_as(&receipt, "DepositReceived", |event| {
                Ok(DepositReceived {
                    from: crate::values::FromValue::from_value(event.indexed[0].clone())?,
                    amount: crate::values::FromValue::from_value(event.body[0].clone())?,
                })
            })
            .unwrap();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].from, sender);
        assert_eq!(deposits[0].amount, U256::from(100));
    }
}
