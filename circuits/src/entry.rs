//! Byte-level entry points.
//!
//! Every input is a positionally encoded record (see [`crate::serialize`]);
//! hashes come back as 32-byte big-endian field encodings. The rollup entry
//! points run natively with the process-wide diagnostics settings and return
//! the encoded public inputs together with every recorded soft failure.

use ark_bn254::Fr;
use serde::Serialize;

use crate::abis::{
    BaseRollupInputs, CallStackItem, FunctionData, FunctionLeafPreimage, MergeRollupInputs,
    NewContractData, RootRollupInputs, SignedTxRequest, TxRequest, VerificationKeyData,
    compute_constructor_hash,
};
use crate::aggregation::DigestAggregator;
use crate::composer::{ConstraintFailure, NativeComposer};
use crate::constants::FUNCTION_SELECTOR_NUM_BYTES;
use crate::error::Result;
use crate::field::{FIELD_BYTES, fr_to_bytes};
use crate::serialize::{Encode, from_bytes};
use crate::{abis, hash, rollup};

type FieldBytes = [u8; FIELD_BYTES];

/// Output of a rollup entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationOutput {
    #[serde(with = "hex::serde")]
    pub public_inputs: Vec<u8>,
    pub failures: Vec<ConstraintFailure>,
}

impl SimulationOutput {
    fn new(public_inputs: &impl Encode, composer: NativeComposer) -> Self {
        Self {
            public_inputs: public_inputs.to_bytes(),
            failures: composer.into_diagnostics().into_failures(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// Hashing
// ============================================================================

pub fn hash_tx_request(tx_request: &[u8]) -> Result<FieldBytes> {
    Ok(fr_to_bytes(&from_bytes::<TxRequest>(tx_request)?.hash()))
}

pub fn compute_function_selector(signature: &str) -> [u8; FUNCTION_SELECTOR_NUM_BYTES] {
    abis::compute_function_selector(signature)
}

pub fn hash_vk(vk: &[u8]) -> Result<FieldBytes> {
    Ok(fr_to_bytes(&from_bytes::<VerificationKeyData>(vk)?.hash()))
}

pub fn compute_function_leaf(preimage: &[u8]) -> Result<FieldBytes> {
    Ok(fr_to_bytes(&from_bytes::<FunctionLeafPreimage>(preimage)?.hash()))
}

/// `leaves` is a length-prefixed field sequence.
pub fn compute_function_tree_root(leaves: &[u8]) -> Result<FieldBytes> {
    let leaves = from_bytes::<Vec<Fr>>(leaves)?;
    Ok(fr_to_bytes(&abis::compute_function_tree_root(&leaves)?))
}

/// Every node, leaves first, as a length-prefixed field sequence.
pub fn compute_function_tree(leaves: &[u8]) -> Result<Vec<u8>> {
    let leaves = from_bytes::<Vec<Fr>>(leaves)?;
    Ok(abis::compute_function_tree(&leaves)?.to_bytes())
}

/// `input` is `FunctionData ‖ args_hash ‖ constructor_vk_hash`.
pub fn hash_constructor(input: &[u8]) -> Result<FieldBytes> {
    let (function_data, args_hash, vk_hash) = from_bytes::<(FunctionData, Fr, Fr)>(input)?;
    Ok(fr_to_bytes(&compute_constructor_hash(
        &function_data,
        args_hash,
        vk_hash,
    )))
}

/// `input` is `deployer ‖ salt ‖ function_tree_root ‖ constructor_hash`.
pub fn compute_contract_address(input: &[u8]) -> Result<FieldBytes> {
    let (deployer, salt, function_tree_root, constructor_hash) =
        from_bytes::<(Fr, Fr, Fr, Fr)>(input)?;
    Ok(fr_to_bytes(&hash::compute_contract_address(
        deployer,
        salt,
        function_tree_root,
        constructor_hash,
    )))
}

pub fn compute_var_args_hash(args: &[u8]) -> Result<FieldBytes> {
    let args = from_bytes::<Vec<Fr>>(args)?;
    Ok(fr_to_bytes(&hash::compute_var_args_hash(&args)))
}

pub fn compute_contract_leaf(contract: &[u8]) -> Result<FieldBytes> {
    Ok(fr_to_bytes(&from_bytes::<NewContractData>(contract)?.hash()))
}

/// `input` is `contract_address ‖ commitment`.
pub fn silo_commitment(input: &[u8]) -> Result<FieldBytes> {
    let (contract_address, commitment) = from_bytes::<(Fr, Fr)>(input)?;
    Ok(fr_to_bytes(&hash::silo_commitment(contract_address, commitment)))
}

pub fn compute_transaction_hash(signed_tx_request: &[u8]) -> Result<FieldBytes> {
    Ok(fr_to_bytes(
        &from_bytes::<SignedTxRequest>(signed_tx_request)?.hash(),
    ))
}

pub fn compute_call_stack_item_hash(item: &[u8]) -> Result<FieldBytes> {
    Ok(fr_to_bytes(&from_bytes::<CallStackItem>(item)?.hash()))
}

pub fn compute_message_secret_hash(secret: &[u8]) -> Result<FieldBytes> {
    let secret = from_bytes::<Fr>(secret)?;
    Ok(fr_to_bytes(&hash::compute_message_secret_hash(secret)))
}

// ============================================================================
// Rollups
// ============================================================================

pub fn base_rollup_sim(inputs: &[u8]) -> Result<SimulationOutput> {
    let inputs = from_bytes::<BaseRollupInputs>(inputs)?;
    let mut composer = NativeComposer::configured();
    let public_inputs = rollup::base_rollup_circuit(&mut composer, &DigestAggregator, &inputs)?;
    Ok(SimulationOutput::new(&public_inputs, composer))
}

pub fn merge_rollup_sim(inputs: &[u8]) -> Result<SimulationOutput> {
    let inputs = from_bytes::<MergeRollupInputs>(inputs)?;
    let mut composer = NativeComposer::configured();
    let public_inputs = rollup::merge_rollup_circuit(&mut composer, &DigestAggregator, &inputs);
    Ok(SimulationOutput::new(&public_inputs, composer))
}

pub fn root_rollup_sim(inputs: &[u8]) -> Result<SimulationOutput> {
    let inputs = from_bytes::<RootRollupInputs>(inputs)?;
    let mut composer = NativeComposer::configured();
    let public_inputs = rollup::root_rollup_circuit(&mut composer, &DigestAggregator, &inputs)?;
    Ok(SimulationOutput::new(&public_inputs, composer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CircuitError;

    #[test]
    fn test_selector_vector() {
        assert_eq!(
            compute_function_selector("transfer(address,uint256)"),
            [0xa9, 0x05, 0x9c, 0xbb]
        );
    }

    #[test]
    fn test_tx_hashes_differ_by_signature() {
        let signed = SignedTxRequest::default();
        let bare = hash_tx_request(&signed.tx_request.to_bytes()).unwrap();
        let full = compute_transaction_hash(&signed.to_bytes()).unwrap();
        assert_ne!(bare, full);
    }

    #[test]
    fn test_tree_root_is_last_node() {
        let leaves = vec![Fr::from(1u64), Fr::from(2u64)].to_bytes();
        let nodes = from_bytes::<Vec<Fr>>(&compute_function_tree(&leaves).unwrap()).unwrap();
        assert_eq!(
            fr_to_bytes(nodes.last().unwrap()),
            compute_function_tree_root(&leaves).unwrap()
        );
    }

    #[test]
    fn test_silo_commitment_matches_library() {
        let input = (Fr::from(3u64), Fr::from(4u64)).to_bytes();
        assert_eq!(
            silo_commitment(&input).unwrap(),
            fr_to_bytes(&hash::silo_commitment(Fr::from(3u64), Fr::from(4u64)))
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut input = Fr::from(1u64).to_bytes();
        input.push(0);
        assert!(matches!(
            compute_message_secret_hash(&input),
            Err(CircuitError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_truncated_input_is_io_error() {
        assert!(matches!(
            compute_contract_address(&[0u8; 40]),
            Err(CircuitError::Io(_))
        ));
    }
}
