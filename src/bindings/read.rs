//! Contract reads with a query cache.
//!
//! A [`ReadBinding`] wraps one typed view call. Results are cached by
//! [`QueryClient`] under chain + contract + calldata, so identical reads share
//! a result until it goes stale or the contract is invalidated.

use std::{collections::HashMap, time::Duration};

use alloy::{
    primitives::{Address, Bytes},
    sol_types::SolCall,
};
use serde::Serialize;
use tokio::{sync::RwLock, time::Instant};

use crate::{error::Result, ethereum::ChainGateway};

/// Cache key for a read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Chain the read was executed on.
    pub chain_id: u64,
    /// Contract address.
    pub contract: Address,
    /// ABI-encoded selector and arguments.
    pub calldata: Bytes,
}

#[derive(Debug, Clone)]
struct CachedRead {
    raw: Bytes,
    fetched_at: Instant,
}

/// Shared cache of raw read results.
///
/// An entry is served while it is younger than the stale time. With a zero
/// stale time every read goes to the chain.
#[derive(Debug, Default)]
pub struct QueryClient {
    cache: RwLock<HashMap<QueryKey, CachedRead>>,
    stale_time: Duration,
}

impl QueryClient {
    /// Create a query client that always re-reads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a query client serving entries younger than `stale_time`.
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self { cache: RwLock::default(), stale_time }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Execute (or serve from cache) a typed view call.
    pub async fn read<C>(
        &self,
        gateway: &dyn ChainGateway,
        contract: Address,
        call: &C,
    ) -> Result<C::Return>
    where
        C: SolCall,
    {
        let key = QueryKey {
            chain_id: gateway.chain_id().await,
            contract,
            calldata: Bytes::from(call.abi_encode()),
        };

        let fresh = self
            .cache
            .read()
            .await
            .get(&key)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| entry.raw.clone());
        let raw = match fresh {
            Some(raw) => raw,
            None => {
                tracing::debug!(contract = %contract, function = C::SIGNATURE, "Reading contract");
                let raw = gateway.call(contract, key.calldata.clone()).await?;
                let entry = CachedRead { raw: raw.clone(), fetched_at: Instant::now() };
                self.cache.write().await.insert(key, entry);
                raw
            }
        };

        Ok(C::abi_decode_returns(&raw)?)
    }

    /// Drop every cached read against `contract`.
    pub async fn invalidate(&self, contract: Address) {
        let mut cache = self.cache.write().await;
        let before = cache.len();
        cache.retain(|key, _| key.contract != contract);
        tracing::debug!(contract = %contract, dropped = before - cache.len(), "Invalidated reads");
    }

    /// Drop the whole cache.
    pub async fn invalidate_all(&self) {
        self.cache.write().await.clear();
    }
}

/// Observable state of one read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadState<T> {
    /// Latest successful value.
    pub value: Option<T>,
    /// Whether a read is in flight.
    pub is_loading: bool,
    /// Message of the last failed read, cleared by the next success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Default for ReadState<T> {
    fn default() -> Self {
        Self { value: None, is_loading: false, error: None }
    }
}

impl<T> ReadState<T> {
    /// Mark a read as started.
    pub fn begin(&mut self) {
        self.is_loading = true;
    }

    /// Record the result of a read. Failures keep the last good value.
    pub fn finish(&mut self, result: Result<T>) {
        self.is_loading = false;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Read failed");
                self.error = Some(e.to_string());
            }
        }
    }

    /// Forget everything (used when the read becomes disabled).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Map the value for rendering.
    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> ReadState<U> {
        ReadState {
            value: self.value.as_ref().map(f),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }
}

/// One typed view call bound to a contract.
///
/// The call is `None` while the binding is disabled (e.g. no connected
/// account); a disabled binding holds no value and issues no reads.
pub struct ReadBinding<C: SolCall> {
    contract: Address,
    call: Option<C>,
    state: ReadState<C::Return>,
}

impl<C> ReadBinding<C>
where
    C: SolCall,
{
    /// Create an enabled binding.
    pub fn new(contract: Address, call: C) -> Self {
        Self { contract, call: Some(call), state: ReadState::default() }
    }

    /// Create a disabled binding.
    pub fn disabled(contract: Address) -> Self {
        Self { contract, call: None, state: ReadState::default() }
    }

    /// Replace the call arguments (or disable with `None`).
    ///
    /// Changing the arguments drops the previous value, since it answered a
    /// different question.
    pub fn set_call(&mut self, call: Option<C>) {
        let changed = match (&self.call, &call) {
            (Some(old), Some(new)) => old.abi_encode() != new.abi_encode(),
            (None, None) => false,
            _ => true,
        };
        if changed {
            self.state.clear();
        }
        self.call = call;
    }

    /// Whether the binding will read on refresh.
    pub fn is_enabled(&self) -> bool {
        self.call.is_some()
    }

    /// Contract the binding reads from.
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Current state.
    pub fn state(&self) -> &ReadState<C::Return> {
        &self.state
    }

    /// Latest successful value.
    pub fn value(&self) -> Option<&C::Return> {
        self.state.value.as_ref()
    }

    /// Run the read if enabled.
    pub async fn refresh(&mut self, queries: &QueryClient, gateway: &dyn ChainGateway) {
        let Some(call) = &self.call else {
            return;
        };
        self.state.begin();
        let result = queries.read(gateway, self.contract, call).await;
        self.state.finish(result);
    }
}
