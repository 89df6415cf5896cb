mod common;

use ark_bn254::Fr;
use ark_relations::r1cs::ConstraintSystem;
use common::{BlockFixture, messages};
use tessera_circuits::{
    DigestAggregator, FailureMode, NativeComposer, R1csComposer, base_rollup_circuit,
    root_rollup_circuit,
};

#[test]
fn test_base_rollup_constraints_agree_with_native() {
    let mut fixture = BlockFixture::new();
    let kernels = [
        fixture.kernel_with_commitments(&[1, 2, 3]),
        fixture.kernel_with_commitments(&[4]),
    ];
    let inputs = fixture
        .state
        .build_base_rollup_inputs(kernels, fixture.constants)
        .unwrap();

    let mut native = NativeComposer::default();
    let expected = base_rollup_circuit(&mut native, &DigestAggregator, &inputs).unwrap();

    let cs = ConstraintSystem::<Fr>::new_ref();
    let mut composer = R1csComposer::new(cs, FailureMode::FirstOnly);
    let actual = base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();

    assert_eq!(expected, actual);
    assert!(composer.num_constraints() > 0);
    assert!(composer.is_satisfied().unwrap());
    assert!(!composer.finish().unwrap().has_failed());
}

#[test]
fn test_soft_failure_leaves_constraints_unsatisfied() {
    let mut fixture = BlockFixture::new();
    let left = fixture.base([fixture.dummy_kernel(), fixture.dummy_kernel()]);
    let right = fixture.base([fixture.dummy_kernel(), fixture.dummy_kernel()]);
    let mut inputs = fixture.root_inputs(left, right, messages(3));
    inputs.l1_to_l2_messages[0] = Fr::from(0xdeadu64);
    inputs.start_l1_to_l2_message_tree_snapshot.root = Fr::from(1u64);

    let cs = ConstraintSystem::<Fr>::new_ref();
    let mut composer = R1csComposer::new(cs, FailureMode::FirstOnly);
    root_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();

    assert!(!composer.is_satisfied().unwrap());
    let diagnostics = composer.finish().unwrap();
    assert_eq!(
        diagnostics.first_failure().unwrap().message,
        "l1 to l2 message tree insertion"
    );
}
