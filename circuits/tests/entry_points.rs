mod common;

use ark_bn254::Fr;
use common::{BlockFixture, messages};
use tessera_circuits::abis::{
    BaseOrMergeRollupPublicInputs, FunctionData, MergeRollupInputs, RootRollupPublicInputs,
};
use tessera_circuits::entry;
use tessera_circuits::field::{fr_to_bytes, join_digest};
use tessera_circuits::serialize::{Encode, from_bytes};
use tessera_circuits::{CircuitError, DigestAggregator, NativeComposer, root_rollup_circuit};

#[test]
fn test_base_and_merge_entry_points() {
    let mut fixture = BlockFixture::new();
    let kernels = [fixture.kernel_with_commitments(&[1]), fixture.dummy_kernel()];
    let inputs = fixture
        .state
        .build_base_rollup_inputs(kernels, fixture.constants)
        .unwrap();

    let output = entry::base_rollup_sim(&inputs.to_bytes()).unwrap();
    assert!(output.is_valid(), "{:?}", output.failures);
    let public_inputs = from_bytes::<BaseOrMergeRollupPublicInputs>(&output.public_inputs).unwrap();
    assert_eq!(
        public_inputs.end_private_data_tree_snapshot,
        fixture.state.private_data.snapshot()
    );

    let left = fixture.base([fixture.dummy_kernel(), fixture.dummy_kernel()]);
    let right = fixture.base([fixture.dummy_kernel(), fixture.dummy_kernel()]);
    let merge = MergeRollupInputs {
        previous_rollup_data: [right, left],
    };
    let output = entry::merge_rollup_sim(&merge.to_bytes()).unwrap();
    // Dummy bases leave every tree alone, so the swap is still contiguous.
    assert!(output.is_valid(), "{:?}", output.failures);
}

#[test]
fn test_root_entry_point_matches_native() {
    let mut fixture = BlockFixture::new();
    let left = fixture.base([fixture.dummy_kernel(), fixture.dummy_kernel()]);
    let right = fixture.base([fixture.dummy_kernel(), fixture.dummy_kernel()]);
    let inputs = fixture.root_inputs(left, right, messages(40));

    let output = entry::root_rollup_sim(&inputs.to_bytes()).unwrap();
    let mut composer = NativeComposer::default();
    let native = root_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();

    assert!(output.is_valid(), "{:?}", output.failures);
    let decoded = from_bytes::<RootRollupPublicInputs>(&output.public_inputs).unwrap();
    assert_eq!(decoded, native);

    let mut batch = Vec::new();
    for message in &inputs.l1_to_l2_messages {
        batch.extend_from_slice(&fr_to_bytes(message));
    }
    use sha2::{Digest, Sha256};
    let digest: [u8; 32] = Sha256::digest(&batch).into();
    assert_eq!(join_digest(&decoded.l1_to_l2_messages_hash).unwrap(), digest);
}

#[test]
fn test_soft_failures_are_returned() {
    let mut fixture = BlockFixture::new();
    let kernels = [fixture.kernel_with_commitments(&[1]), fixture.dummy_kernel()];
    let mut inputs = fixture
        .state
        .build_base_rollup_inputs(kernels, fixture.constants)
        .unwrap();
    inputs.start_nullifier_tree_snapshot.root = Fr::from(8u64);
    inputs.kernel_data[0]
        .public_inputs
        .end
        .new_nullifiers
        .push(Fr::from(2u64), "new nullifiers")
        .unwrap();

    let output = entry::base_rollup_sim(&inputs.to_bytes()).unwrap();
    assert!(!output.is_valid());
    let json = serde_json::to_value(&output).unwrap();
    assert!(json["public_inputs"].is_string());
    assert!(json["failures"][0]["message"].is_string());
}

#[test]
fn test_malformed_rollup_input_is_fatal() {
    assert!(matches!(
        entry::root_rollup_sim(&[1, 2, 3]),
        Err(CircuitError::Io(_))
    ));
}

#[test]
fn test_constructor_hash_entry_point() {
    let function_data = FunctionData::from_signature("constructor(field)", true, true);
    let input = (function_data, Fr::from(1u64), Fr::from(2u64)).to_bytes();
    assert_eq!(
        entry::hash_constructor(&input).unwrap(),
        fr_to_bytes(&tessera_circuits::abis::compute_constructor_hash(
            &function_data,
            Fr::from(1u64),
            Fr::from(2u64)
        ))
    );
}

#[test]
fn test_function_tree_padding_invariance() {
    let leaves = vec![Fr::from(11u64), Fr::from(12u64)];
    let mut padded = leaves.clone();
    padded.extend(std::iter::repeat_n(
        tessera_circuits::abis::FunctionLeafPreimage::zero_leaf(),
        3,
    ));
    assert_eq!(
        entry::compute_function_tree_root(&leaves.to_bytes()).unwrap(),
        entry::compute_function_tree_root(&padded.to_bytes()).unwrap()
    );
}
