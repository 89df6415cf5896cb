use ark_bn254::Fr;

use crate::abis::function_data::FunctionData;
use crate::constants::GeneratorIndex;
use crate::field::fr_from_bytes_reduced;
use crate::hash::compress;
use crate::serialize::impl_codec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractDeploymentData {
    pub constructor_vk_hash: Fr,
    pub function_tree_root: Fr,
    pub contract_address_salt: Fr,
    pub portal_contract_address: Fr,
}

impl_codec!(ContractDeploymentData {
    constructor_vk_hash,
    function_tree_root,
    contract_address_salt,
    portal_contract_address,
});

impl ContractDeploymentData {
    pub fn hash(&self) -> Fr {
        compress(
            &[
                self.constructor_vk_hash,
                self.function_tree_root,
                self.contract_address_salt,
                self.portal_contract_address,
            ],
            GeneratorIndex::ContractDeploymentData,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxContext {
    pub is_fee_payment_tx: bool,
    pub is_rebate_payment_tx: bool,
    pub is_contract_deployment_tx: bool,
    pub contract_deployment_data: ContractDeploymentData,
}

impl_codec!(TxContext {
    is_fee_payment_tx,
    is_rebate_payment_tx,
    is_contract_deployment_tx,
    contract_deployment_data,
});

impl TxContext {
    pub fn hash(&self) -> Fr {
        compress(
            &[
                Fr::from(self.is_fee_payment_tx),
                Fr::from(self.is_rebate_payment_tx),
                Fr::from(self.is_contract_deployment_tx),
                self.contract_deployment_data.hash(),
            ],
            GeneratorIndex::TxContext,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Fr,
    pub to: Fr,
    pub function_data: FunctionData,
    pub args_hash: Fr,
    pub nonce: Fr,
    pub tx_context: TxContext,
    pub chain_id: Fr,
}

impl_codec!(TxRequest {
    from,
    to,
    function_data,
    args_hash,
    nonce,
    tx_context,
    chain_id,
});

impl TxRequest {
    pub fn hash(&self) -> Fr {
        compress(
            &[
                self.from,
                self.to,
                self.function_data.hash(),
                self.args_hash,
                self.nonce,
                self.tx_context.hash(),
                self.chain_id,
            ],
            GeneratorIndex::TxRequest,
        )
    }
}

/// Secp256k1 ECDSA signature; `r` and `s` are raw big-endian scalars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl_codec!(EcdsaSignature { r, s, v });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignedTxRequest {
    pub tx_request: TxRequest,
    pub signature: EcdsaSignature,
}

impl_codec!(SignedTxRequest {
    tx_request,
    signature,
});

impl SignedTxRequest {
    /// Transaction hash: binds the request and every signature component.
    pub fn hash(&self) -> Fr {
        compress(
            &[
                self.tx_request.hash(),
                fr_from_bytes_reduced(&self.signature.r),
                fr_from_bytes_reduced(&self.signature.s),
                Fr::from(self.signature.v),
            ],
            GeneratorIndex::SignedTxRequest,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TxRequest {
        TxRequest {
            from: Fr::from(1u64),
            to: Fr::from(2u64),
            function_data: FunctionData::from_signature("transfer(address,uint256)", true, false),
            args_hash: Fr::from(3u64),
            nonce: Fr::from(4u64),
            tx_context: TxContext::default(),
            chain_id: Fr::from(31337u64),
        }
    }

    #[test]
    fn test_signature_binds_hash() {
        let unsigned = SignedTxRequest {
            tx_request: request(),
            signature: EcdsaSignature::default(),
        };
        let mut signed = unsigned;
        signed.signature.v = 27;
        assert_ne!(unsigned.hash(), signed.hash());
        assert_ne!(unsigned.hash(), request().hash());
    }

    #[test]
    fn test_deployment_data_in_context_hash() {
        let mut ctx = TxContext::default();
        let before = ctx.hash();
        ctx.contract_deployment_data.contract_address_salt = Fr::from(5u64);
        assert_ne!(before, ctx.hash());
    }
}
