//! Domain-separated Poseidon compression over BN254.
//!
//! ```text
//!   compress(inputs, tag) = Poseidon(tag || len || inputs)
//!   hash_pair(l, r)       = Poseidon(0 || l || r)
//! ```
//!
//! Binding the length keeps `[a]` and `[a, 0]` apart under the same tag.
//! Every record hash and every free-standing helper below routes through
//! [`compress`] with its own [`GeneratorIndex`].

use std::sync::LazyLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    CryptographicSponge,
    poseidon::{PoseidonConfig, PoseidonSponge, find_poseidon_ark_and_mds},
};
use ark_std::Zero;

use crate::constants::GeneratorIndex;

static POSEIDON: LazyLock<PoseidonConfig<Fr>> = LazyLock::new(poseidon_config);

/// Poseidon configuration
///
/// Field: BN254 Fr (254 bits)
/// Rate: 2
/// Capacity: 1
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    let prime_bits: u64 = 254;
    let rate: usize = 2;
    let capacity: usize = 1;

    let full_rounds: u64 = 8;
    let partial_rounds: u64 = 56;
    let alpha: u64 = 5;

    let (ark, mds) =
        find_poseidon_ark_and_mds::<Fr>(prime_bits, rate, full_rounds, partial_rounds, 0);

    PoseidonConfig::new(
        full_rounds as usize,
        partial_rounds as usize,
        alpha,
        mds,
        ark,
        rate,
        capacity,
    )
}

fn squeeze_one(sponge: &mut PoseidonSponge<Fr>) -> Fr {
    let out: Vec<Fr> = sponge.squeeze_field_elements(1);
    out[0]
}

pub fn compress(inputs: &[Fr], index: GeneratorIndex) -> Fr {
    let mut sponge = PoseidonSponge::new(&*POSEIDON);
    sponge.absorb(&index.as_field());
    sponge.absorb(&Fr::from(inputs.len() as u64));
    for input in inputs {
        sponge.absorb(input);
    }
    squeeze_one(&mut sponge)
}

/// Merkle node combination.
pub fn hash_pair(left: &Fr, right: &Fr) -> Fr {
    let mut sponge = PoseidonSponge::new(&*POSEIDON);
    sponge.absorb(&Fr::zero());
    sponge.absorb(left);
    sponge.absorb(right);
    squeeze_one(&mut sponge)
}

// ============================================================================
// Free-standing hashes
// ============================================================================

/// Binds an argument list of any length; the empty list binds to zero.
pub fn compute_var_args_hash(args: &[Fr]) -> Fr {
    if args.is_empty() {
        return Fr::zero();
    }
    compress(args, GeneratorIndex::FunctionArgs)
}

pub fn compute_contract_address(
    deployer_address: Fr,
    contract_address_salt: Fr,
    function_tree_root: Fr,
    constructor_hash: Fr,
) -> Fr {
    compress(
        &[
            deployer_address,
            contract_address_salt,
            function_tree_root,
            constructor_hash,
        ],
        GeneratorIndex::ContractAddress,
    )
}

pub fn silo_commitment(contract_address: Fr, commitment: Fr) -> Fr {
    compress(
        &[contract_address, commitment],
        GeneratorIndex::OuterCommitment,
    )
}

pub fn silo_nullifier(contract_address: Fr, nullifier: Fr) -> Fr {
    compress(&[contract_address, nullifier], GeneratorIndex::OuterNullifier)
}

/// Public data tree key for a contract's storage slot.
pub fn compute_public_data_leaf_index(contract_address: Fr, storage_slot: Fr) -> Fr {
    compress(
        &[contract_address, storage_slot],
        GeneratorIndex::PublicLeafIndex,
    )
}

pub fn compute_message_secret_hash(secret: Fr) -> Fr {
    compress(&[secret], GeneratorIndex::L1ToL2MessageSecret)
}
