//! One call frame's public inputs and the hash that links it into a
//! caller's call stack.

use ark_bn254::Fr;
use ark_std::Zero;

use crate::abis::function_data::FunctionData;
use crate::bounded_vec::{BoundedVec, Empty};
use crate::constants::{
    CONTRACT_STORAGE_UPDATE_REQUESTS_LENGTH, GeneratorIndex, NEW_COMMITMENTS_LENGTH,
    NEW_L2_TO_L1_MSGS_LENGTH, NEW_NULLIFIERS_LENGTH, PRIVATE_CALL_STACK_LENGTH,
    PUBLIC_CALL_STACK_LENGTH, RETURN_VALUES_LENGTH,
};
use crate::hash::compress;
use crate::serialize::impl_codec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    pub msg_sender: Fr,
    pub storage_contract_address: Fr,
    pub portal_contract_address: Fr,
    pub is_delegate_call: bool,
    pub is_static_call: bool,
    pub is_contract_deployment: bool,
}

impl_codec!(CallContext {
    msg_sender,
    storage_contract_address,
    portal_contract_address,
    is_delegate_call,
    is_static_call,
    is_contract_deployment,
});

impl CallContext {
    pub fn hash(&self) -> Fr {
        compress(
            &[
                self.msg_sender,
                self.storage_contract_address,
                self.portal_contract_address,
                Fr::from(self.is_delegate_call),
                Fr::from(self.is_static_call),
                Fr::from(self.is_contract_deployment),
            ],
            GeneratorIndex::CallContext,
        )
    }
}

/// A public call's write to one of its own storage slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractStorageUpdateRequest {
    pub storage_slot: Fr,
    pub old_value: Fr,
    pub new_value: Fr,
}

impl_codec!(ContractStorageUpdateRequest {
    storage_slot,
    old_value,
    new_value,
});

impl ContractStorageUpdateRequest {
    pub fn hash(&self) -> Fr {
        compress(
            &[self.storage_slot, self.old_value, self.new_value],
            GeneratorIndex::PublicDataUpdateRequest,
        )
    }
}

impl Empty for ContractStorageUpdateRequest {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.storage_slot.is_zero() && self.old_value.is_zero() && self.new_value.is_zero()
    }
}

/// A storage write after siloing: keyed by its public data tree leaf index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublicDataUpdateRequest {
    pub leaf_index: Fr,
    pub old_value: Fr,
    pub new_value: Fr,
}

impl_codec!(PublicDataUpdateRequest {
    leaf_index,
    old_value,
    new_value,
});

impl Empty for PublicDataUpdateRequest {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.leaf_index.is_zero() && self.old_value.is_zero() && self.new_value.is_zero()
    }
}

/// Public inputs of one private or public function circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallPublicInputs {
    pub call_context: CallContext,
    pub args_hash: Fr,
    pub return_values: [Fr; RETURN_VALUES_LENGTH],
    pub new_commitments: BoundedVec<Fr, NEW_COMMITMENTS_LENGTH>,
    pub new_nullifiers: BoundedVec<Fr, NEW_NULLIFIERS_LENGTH>,
    pub new_l2_to_l1_msgs: BoundedVec<Fr, NEW_L2_TO_L1_MSGS_LENGTH>,
    pub private_call_stack: BoundedVec<Fr, PRIVATE_CALL_STACK_LENGTH>,
    pub public_call_stack: BoundedVec<Fr, PUBLIC_CALL_STACK_LENGTH>,
    pub contract_storage_update_requests:
        BoundedVec<ContractStorageUpdateRequest, CONTRACT_STORAGE_UPDATE_REQUESTS_LENGTH>,
    pub historic_private_data_tree_root: Fr,
    pub historic_contract_tree_root: Fr,
}

impl_codec!(CallPublicInputs {
    call_context,
    args_hash,
    return_values,
    new_commitments,
    new_nullifiers,
    new_l2_to_l1_msgs,
    private_call_stack,
    public_call_stack,
    contract_storage_update_requests,
    historic_private_data_tree_root,
    historic_contract_tree_root,
});

impl CallPublicInputs {
    /// Hash under the private or public circuit domain.
    pub fn hash(&self, is_private: bool) -> Fr {
        let mut inputs = vec![self.call_context.hash(), self.args_hash];
        inputs.extend_from_slice(&self.return_values);
        inputs.extend(self.new_commitments.padded());
        inputs.extend(self.new_nullifiers.padded());
        inputs.extend(self.new_l2_to_l1_msgs.padded());
        inputs.extend(self.private_call_stack.padded());
        inputs.extend(self.public_call_stack.padded());
        inputs.extend(self.contract_storage_update_requests.padded().map(|r| r.hash()));
        inputs.push(self.historic_private_data_tree_root);
        inputs.push(self.historic_contract_tree_root);

        let index = if is_private {
            GeneratorIndex::PrivateCircuitPublicInputs
        } else {
            GeneratorIndex::PublicCircuitPublicInputs
        };
        compress(&inputs, index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStackItem {
    pub contract_address: Fr,
    pub function_data: FunctionData,
    pub public_inputs: CallPublicInputs,
}

impl_codec!(CallStackItem {
    contract_address,
    function_data,
    public_inputs,
});

impl CallStackItem {
    /// The value a caller pushes onto its call stack for this frame.
    pub fn hash(&self) -> Fr {
        compress(
            &[
                self.contract_address,
                self.function_data.hash(),
                self.public_inputs.hash(self.function_data.is_private),
            ],
            GeneratorIndex::CallStackItem,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{Encode, from_bytes};

    fn item(is_private: bool) -> CallStackItem {
        let mut public_inputs = CallPublicInputs::default();
        public_inputs.args_hash = Fr::from(11u64);
        public_inputs
            .new_commitments
            .push(Fr::from(5u64), "new commitments")
            .unwrap();
        CallStackItem {
            contract_address: Fr::from(77u64),
            function_data: FunctionData {
                function_selector: 0xdead_beef,
                is_private,
                is_constructor: false,
            },
            public_inputs,
        }
    }

    #[test]
    fn test_private_and_public_domains_differ() {
        let inputs = item(true).public_inputs;
        assert_ne!(inputs.hash(true), inputs.hash(false));
        assert_ne!(item(true).hash(), item(false).hash());
    }

    #[test]
    fn test_hash_binds_contract() {
        let a = item(true);
        let mut b = a.clone();
        b.contract_address = Fr::from(78u64);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_codec_is_fixed_width() {
        let a = item(true);
        let mut b = a.clone();
        b.public_inputs
            .new_commitments
            .push(Fr::from(6u64), "new commitments")
            .unwrap();
        assert_eq!(a.to_bytes().len(), b.to_bytes().len());
        assert_eq!(from_bytes::<CallStackItem>(&b.to_bytes()).unwrap(), b);
    }
}
