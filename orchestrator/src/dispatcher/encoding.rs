//! Encoding of state-changing calls from a function signature and typed parameters

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    primitives::{hex, keccak256, Bytes, Selector},
};
use itertools::Itertools;
use serde_json::Value;

use crate::errors::DispatchError;

/// A call encoded from its signature, validated against its declared parameter types
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedCall {
    /// The canonical signature, e.g. `setConfigs(address[],(bool,uint64)[])`
    pub signature: String,
    /// The function selector derived from the signature
    pub selector: Selector,
    /// The ABI-encoded parameters, without the selector
    pub params: Bytes,
}

impl EncodedCall {
    /// The full call data: selector followed by the encoded parameters
    pub fn calldata(&self) -> Bytes {
        [self.selector.as_slice(), self.params.as_ref()].concat().into()
    }
}

/// Encode a call, failing before anything is sent if the signature, the declared types, and
/// the values disagree
pub fn encode_call(
    signature: &str,
    param_types: &[String],
    param_values: &[DynSolValue],
) -> Result<EncodedCall, DispatchError> {
    let signature: String = signature.chars().filter(|c| !c.is_whitespace()).collect();
    let (name, signature_types) = signature_param_types(&signature)?;

    if signature_types.len() != param_types.len() {
        return Err(DispatchError::Params(format!(
            "`{}` takes {} parameter(s), {} type(s) given",
            signature,
            signature_types.len(),
            param_types.len()
        )));
    }
    if param_values.len() != param_types.len() {
        return Err(DispatchError::Params(format!(
            "{} type(s) declared, {} value(s) given",
            param_types.len(),
            param_values.len()
        )));
    }

    let mut canonical_types = Vec::with_capacity(param_types.len());
    for (i, ((declared, expected), value)) in param_types
        .iter()
        .zip(signature_types.iter())
        .zip(param_values.iter())
        .enumerate()
    {
        let declared_ty = parse_type(declared)?;
        let expected_ty = DynSolType::parse(expected)
            .map_err(|e| DispatchError::Signature(format!("{}: {}", signature, e)))?;

        if declared_ty != expected_ty {
            return Err(DispatchError::Params(format!(
                "parameter {} is declared `{}` but the signature has `{}`",
                i, declared, expected
            )));
        }
        if !declared_ty.matches(value) {
            return Err(DispatchError::Params(format!(
                "parameter {} is not a valid `{}`",
                i, declared
            )));
        }
        canonical_types.push(declared_ty.sol_type_name());
    }

    // Selector is over the canonical spelling: `uint` -> `uint256`, `tuple(..)` -> `(..)`
    let canonical = format!("{}({})", name, canonical_types.iter().join(","));
    let params = DynSolValue::Tuple(param_values.to_vec()).abi_encode_params();
    let selector = Selector::from_slice(&keccak256(canonical.as_bytes())[..4]);

    Ok(EncodedCall {
        signature: canonical,
        selector,
        params: params.into(),
    })
}

/// Parse a textual value, e.g. from the command line, into a value of the given ABI type
pub fn coerce_param(ty: &str, value: &str) -> Result<DynSolValue, DispatchError> {
    parse_type(ty)?
        .coerce_str(value)
        .map_err(|e| DispatchError::Params(format!("`{}` is not a valid `{}`: {}", value, ty, e)))
}

/// Render a value for the pending transactions file.
///
/// Addresses are checksummed hex, integers decimal strings, byte strings hex, and arrays and
/// tuples JSON arrays.
pub fn value_to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Uint(u, _) => Value::String(u.to_string()),
        DynSolValue::FixedBytes(word, size) => Value::String(hex::encode_prefixed(&word[..*size])),
        DynSolValue::Address(address) => Value::String(address.to_checksum(None)),
        DynSolValue::Function(function) => Value::String(hex::encode_prefixed(function)),
        DynSolValue::Bytes(bytes) => Value::String(hex::encode_prefixed(bytes)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) | DynSolValue::Tuple(values) => {
            Value::Array(values.iter().map(value_to_json).collect())
        }
        #[allow(unreachable_patterns)]
        other => Value::String(format!("{:?}", other)),
    }
}

/// Parse a declared parameter type
fn parse_type(ty: &str) -> Result<DynSolType, DispatchError> {
    DynSolType::parse(ty).map_err(|e| DispatchError::Params(format!("`{}`: {}", ty, e)))
}

/// Split a normalized signature `name(t1,t2,...)` into its name and top-level parameter types
fn signature_param_types(signature: &str) -> Result<(&str, Vec<&str>), DispatchError> {
    let malformed = || DispatchError::Signature(signature.to_string());

    let open = signature.find('(').ok_or_else(malformed)?;
    let name = &signature[..open];
    if name.is_empty()
        || name.starts_with(|c: char| c.is_ascii_digit())
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err(malformed());
    }

    let inner = signature[open..]
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(malformed)?;
    if inner.is_empty() {
        return Ok((name, vec![]));
    }

    let mut types = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                types.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        if depth < 0 {
            return Err(malformed());
        }
    }
    if depth != 0 {
        return Err(malformed());
    }
    types.push(&inner[start..]);

    if types.iter().any(|ty| ty.is_empty()) {
        return Err(malformed());
    }
    Ok((name, types))
}

/// Derive a file-name-safe slug from a human-readable title
pub(crate) fn slugify(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .join("-");

    if slug.is_empty() {
        "pending".to_string()
    } else {
        slug
    }
}
