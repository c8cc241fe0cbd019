//! The call aggregator batches independent contract reads into a single aggregate call and
//! decodes each result against the ABI of the function it came from.

use std::sync::Arc;

use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::{Function, JsonAbi},
    primitives::Address,
    rpc::types::BlockId,
};
use tracing::debug;

use crate::{
    chain::{ChainClient, RawCall},
    constants::OWNER_FN,
    errors::AggregateError,
};

mod result;

pub use result::{AggregatedResult, Decoded};

/// An address coupled with an ABI able to encode calls to it and decode their results
#[derive(Clone, Debug)]
pub struct ContractHandle {
    /// The address of the contract
    address: Address,
    /// The contract's ABI, shared between handles to contracts of the same kind
    abi: Arc<JsonAbi>,
}

impl ContractHandle {
    /// Create a handle from an address and an ABI
    pub fn new(address: Address, abi: Arc<JsonAbi>) -> Self {
        Self { address, abi }
    }

    /// Create a handle from human-readable function signatures,
    /// e.g. `function owner() external view returns (address)`
    pub fn from_human_readable(
        address: Address,
        signatures: &[&str],
    ) -> Result<Self, AggregateError> {
        let abi = JsonAbi::parse(signatures.iter().copied())
            .map_err(|e| AggregateError::Encode(e.to_string()))?;
        Ok(Self::new(address, Arc::new(abi)))
    }

    /// The address of the contract
    pub fn address(&self) -> Address {
        self.address
    }

    /// Resolve the overload of `name` taking `arity` parameters
    pub fn function(&self, name: &str, arity: usize) -> Result<&Function, AggregateError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
            .ok_or_else(|| AggregateError::UnknownFunction {
                function: name.to_string(),
                arity,
            })
    }
}

/// One unit of read work
#[derive(Clone, Debug)]
pub struct CallSpec {
    /// The contract to read from
    pub target: ContractHandle,
    /// The name of the function to call
    pub function_name: String,
    /// The parameters of the call
    pub params: Vec<DynSolValue>,
}

impl CallSpec {
    /// Create a new call
    pub fn new(target: ContractHandle, function_name: &str, params: Vec<DynSolValue>) -> Self {
        Self {
            target,
            function_name: function_name.to_string(),
            params,
        }
    }

    /// Encode the call against its target's ABI, returning the resolved function alongside
    /// the raw call
    fn encode(&self) -> Result<(&Function, RawCall), AggregateError> {
        let function = self
            .target
            .function(&self.function_name, self.params.len())?;
        let call_data = function
            .abi_encode_input(&self.params)
            .map_err(|e| AggregateError::Encode(format!("{}: {}", self.function_name, e)))?;

        Ok((
            function,
            RawCall {
                target: self.target.address(),
                call_data: call_data.into(),
            },
        ))
    }
}

/// Batches reads through a [`ChainClient`]
pub struct CallAggregator<'a, C> {
    /// The client the aggregate call is issued through
    client: &'a C,
}

impl<'a, C: ChainClient> CallAggregator<'a, C> {
    /// Create an aggregator over the given client
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Execute `calls` in a single round trip, optionally pinned to `at_block` so that every
    /// call observes the same chain state.
    ///
    /// Results are returned in call order. A function returning exactly one value decodes to
    /// [`Decoded::Scalar`], any other arity to [`Decoded::Tuple`]. If any call reverts the
    /// whole batch fails.
    pub async fn aggregate(
        &self,
        calls: &[CallSpec],
        at_block: Option<BlockId>,
    ) -> Result<AggregatedResult, AggregateError> {
        if calls.is_empty() {
            return Err(AggregateError::EmptyBatch);
        }

        let (functions, raw_calls): (Vec<&Function>, Vec<RawCall>) = calls
            .iter()
            .map(CallSpec::encode)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .unzip();

        debug!("aggregating {} calls", raw_calls.len());
        let results = self
            .client
            .aggregate(raw_calls, at_block)
            .await
            .map_err(AggregateError::Aggregation)?;

        if results.len() != calls.len() {
            return Err(AggregateError::LengthMismatch {
                expected: calls.len(),
                actual: results.len(),
            });
        }

        functions
            .iter()
            .zip(results.iter())
            .enumerate()
            .map(|(index, (function, data))| {
                function
                    .abi_decode_output(data)
                    .map(Decoded::from_values)
                    .map_err(|e| AggregateError::Decode {
                        index,
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AggregatedResult::new)
    }

    /// Read the `owner()` of every target in one round trip
    pub async fn owners(
        &self,
        targets: &[Address],
        at_block: Option<BlockId>,
    ) -> Result<Vec<Address>, AggregateError> {
        let abi = Arc::new(
            JsonAbi::parse([OWNER_FN]).map_err(|e| AggregateError::Encode(e.to_string()))?,
        );
        let calls = targets
            .iter()
            .map(|target| CallSpec::new(ContractHandle::new(*target, abi.clone()), "owner", vec![]))
            .collect::<Vec<_>>();

        self.aggregate(&calls, at_block)
            .await?
            .iter()
            .enumerate()
            .map(|(index, decoded)| {
                decoded.as_address().ok_or(AggregateError::Decode {
                    index,
                    reason: "owner() did not return an address".to_string(),
                })
            })
            .collect()
    }
}
