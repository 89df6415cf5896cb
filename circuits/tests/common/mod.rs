#![allow(dead_code)]

use ark_bn254::Fr;
use ark_std::Zero;
use tessera_circuits::abis::{
    BaseOrMergeRollupPublicInputs, ConstantRollupData, HistoricTreeRoots, MergeRollupInputs,
    PreviousKernelData, PreviousRollupData, RootRollupInputs, VerificationKeyData,
};
use tessera_circuits::constants::{NUMBER_OF_L1_L2_MESSAGES_PER_ROLLUP, VK_TREE_HEIGHT};
use tessera_circuits::merkle::root_from_path;
use tessera_circuits::serialize::Encode;
use tessera_circuits::{
    Composer, DigestAggregator, NativeComposer, ProofAggregator, RollupVkRoots, WorldState,
    base_rollup_circuit, merge_rollup_circuit,
};

pub const MESSAGES: usize = NUMBER_OF_L1_L2_MESSAGES_PER_ROLLUP;

/// One block in progress: the live trees plus the constants every rollup
/// of the block shares.
pub struct BlockFixture {
    pub state: WorldState,
    pub roots: HistoricTreeRoots,
    pub constants: ConstantRollupData,
    pub base_vk: VerificationKeyData,
    pub merge_vk: VerificationKeyData,
}

impl BlockFixture {
    pub fn new() -> Self {
        Self::from_state(WorldState::new().unwrap())
    }

    /// Starts a block on top of an existing state.
    pub fn from_state(state: WorldState) -> Self {
        let base_vk = VerificationKeyData {
            circuit_type: 1,
            ..Default::default()
        };
        let merge_vk = VerificationKeyData {
            circuit_type: 2,
            ..Default::default()
        };
        let vks = RollupVkRoots {
            private_kernel_vk_tree_root: kernel_vk_tree_root(),
            public_kernel_vk_tree_root: kernel_vk_tree_root(),
            base_rollup_vk_hash: base_vk.hash(),
            merge_rollup_vk_hash: merge_vk.hash(),
        };
        Self {
            roots: state.historic_tree_roots(),
            constants: state.rollup_constants(&vks),
            state,
            base_vk,
            merge_vk,
        }
    }

    pub fn dummy_kernel(&self) -> PreviousKernelData {
        PreviousKernelData::empty_with_roots(self.roots)
    }

    pub fn kernel_with_commitments(&self, commitments: &[u64]) -> PreviousKernelData {
        let mut kernel = self.dummy_kernel();
        for c in commitments {
            kernel
                .public_inputs
                .end
                .new_commitments
                .push(Fr::from(*c), "new commitments")
                .unwrap();
        }
        kernel.proof = DigestAggregator.prove(&kernel.public_inputs.to_bytes());
        kernel
    }

    /// Runs a base rollup that must satisfy every constraint.
    pub fn base(&mut self, kernels: [PreviousKernelData; 2]) -> PreviousRollupData {
        let inputs = self
            .state
            .build_base_rollup_inputs(kernels, self.constants)
            .unwrap();
        let mut composer = NativeComposer::default();
        let public_inputs = base_rollup_circuit(&mut composer, &DigestAggregator, &inputs).unwrap();
        assert!(!composer.has_failed(), "{:?}", composer.diagnostics().failures());
        self.wrap(public_inputs, self.base_vk.clone())
    }

    pub fn merge(&self, left: PreviousRollupData, right: PreviousRollupData) -> PreviousRollupData {
        let inputs = MergeRollupInputs {
            previous_rollup_data: [left, right],
        };
        let mut composer = NativeComposer::default();
        let public_inputs = merge_rollup_circuit(&mut composer, &DigestAggregator, &inputs);
        assert!(!composer.has_failed(), "{:?}", composer.diagnostics().failures());
        self.wrap(public_inputs, self.merge_vk.clone())
    }

    pub fn root_inputs(
        &mut self,
        left: PreviousRollupData,
        right: PreviousRollupData,
        messages: [Fr; MESSAGES],
    ) -> RootRollupInputs {
        self.state
            .build_root_rollup_inputs([left, right], messages)
            .unwrap()
    }

    fn wrap(
        &self,
        public_inputs: BaseOrMergeRollupPublicInputs,
        vk: VerificationKeyData,
    ) -> PreviousRollupData {
        PreviousRollupData {
            proof: DigestAggregator.prove(&public_inputs.to_bytes()),
            base_or_merge_rollup_public_inputs: public_inputs,
            vk,
        }
    }
}

/// Vk tree holding the default kernel vk at index 0 with an all-zero path.
pub fn kernel_vk_tree_root() -> Fr {
    root_from_path(
        VerificationKeyData::default().hash(),
        0,
        &[Fr::zero(); VK_TREE_HEIGHT],
    )
}

pub fn messages(seed: u64) -> [Fr; MESSAGES] {
    std::array::from_fn(|i| Fr::from(seed + i as u64))
}
