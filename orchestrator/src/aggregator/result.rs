//! Decoded results of an aggregate call

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};

/// The decoded return value of a single call
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    /// The function returned exactly one value
    Scalar(DynSolValue),
    /// The function returned zero or several values, in declaration order
    Tuple(Vec<DynSolValue>),
}

impl Decoded {
    /// Wrap decoded output values, unwrapping a single value to a scalar.
    ///
    /// A function returning a single array or struct is also unwrapped, so callers see the
    /// array itself rather than a one-element tuple around it.
    pub fn from_values(mut values: Vec<DynSolValue>) -> Self {
        if values.len() == 1 {
            Decoded::Scalar(values.remove(0))
        } else {
            Decoded::Tuple(values)
        }
    }

    /// The scalar value, if the function returned exactly one value
    pub fn as_scalar(&self) -> Option<&DynSolValue> {
        match self {
            Decoded::Scalar(value) => Some(value),
            Decoded::Tuple(_) => None,
        }
    }

    /// The values, if the function returned zero or several values
    pub fn as_tuple(&self) -> Option<&[DynSolValue]> {
        match self {
            Decoded::Scalar(_) => None,
            Decoded::Tuple(values) => Some(values),
        }
    }

    /// The scalar as an address
    pub fn as_address(&self) -> Option<Address> {
        self.as_scalar().and_then(DynSolValue::as_address)
    }

    /// The scalar as an unsigned integer
    pub fn as_uint(&self) -> Option<U256> {
        self.as_scalar()
            .and_then(DynSolValue::as_uint)
            .map(|(value, _)| value)
    }
}

/// The decoded results of an aggregate call, one per call and in call order
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedResult(Vec<Decoded>);

impl AggregatedResult {
    /// Wrap decoded results
    pub(crate) fn new(results: Vec<Decoded>) -> Self {
        Self(results)
    }

    /// The number of results
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no results
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The result of the call at `index`
    pub fn get(&self, index: usize) -> Option<&Decoded> {
        self.0.get(index)
    }

    /// The scalar result of the call at `index`
    pub fn scalar(&self, index: usize) -> Option<&DynSolValue> {
        self.get(index).and_then(Decoded::as_scalar)
    }

    /// The tuple result of the call at `index`
    pub fn tuple(&self, index: usize) -> Option<&[DynSolValue]> {
        self.get(index).and_then(Decoded::as_tuple)
    }

    /// Iterate over the results in call order
    pub fn iter(&self) -> impl Iterator<Item = &Decoded> {
        self.0.iter()
    }

    /// Take the underlying results
    pub fn into_inner(self) -> Vec<Decoded> {
        self.0
    }
}

impl IntoIterator for AggregatedResult {
    type Item = Decoded;
    type IntoIter = std::vec::IntoIter<Decoded>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
