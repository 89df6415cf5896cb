use ark_bn254::Fr;
use ark_std::Zero;

use crate::abis::function_data::FunctionData;
use crate::bounded_vec::Empty;
use crate::constants::GeneratorIndex;
use crate::hash::compress;
use crate::serialize::impl_codec;

/// Contract tree leaf preimage, produced by a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewContractData {
    pub contract_address: Fr,
    pub portal_contract_address: Fr,
    pub function_tree_root: Fr,
}

impl_codec!(NewContractData {
    contract_address,
    portal_contract_address,
    function_tree_root,
});

impl NewContractData {
    /// Contract tree leaf. A zero address is an unused slot and hashes to zero.
    pub fn hash(&self) -> Fr {
        if self.contract_address.is_zero() {
            return Fr::zero();
        }
        compress(
            &[
                self.contract_address,
                self.portal_contract_address,
                self.function_tree_root,
            ],
            GeneratorIndex::ContractLeaf,
        )
    }
}

impl Empty for NewContractData {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.contract_address.is_zero()
    }
}

pub fn compute_constructor_hash(
    function_data: &FunctionData,
    args_hash: Fr,
    constructor_vk_hash: Fr,
) -> Fr {
    compress(
        &[function_data.hash(), args_hash, constructor_vk_hash],
        GeneratorIndex::Constructor,
    )
}
