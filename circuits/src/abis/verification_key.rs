use ark_bn254::Fr;

use crate::constants::GeneratorIndex;
use crate::hash::compress;
use crate::serialize::impl_codec;

/// Verification key as seen by the circuits: only its hash matters here,
/// the commitments themselves are opaque field values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationKeyData {
    pub circuit_type: u32,
    pub circuit_size: u32,
    pub num_public_inputs: u32,
    pub commitments: Vec<Fr>,
    pub contains_recursive_proof: bool,
    pub recursive_proof_public_input_indices: Vec<u32>,
}

impl_codec!(VerificationKeyData {
    circuit_type,
    circuit_size,
    num_public_inputs,
    commitments,
    contains_recursive_proof,
    recursive_proof_public_input_indices,
});

impl VerificationKeyData {
    /// Each variable-length section is preceded by its length, so the
    /// boundary between commitments and indices is bound by the hash.
    pub fn hash(&self) -> Fr {
        let mut inputs = Vec::with_capacity(
            6 + self.commitments.len() + self.recursive_proof_public_input_indices.len(),
        );
        inputs.push(Fr::from(self.circuit_type));
        inputs.push(Fr::from(self.circuit_size));
        inputs.push(Fr::from(self.num_public_inputs));
        inputs.push(Fr::from(self.commitments.len() as u64));
        inputs.extend_from_slice(&self.commitments);
        inputs.push(Fr::from(self.contains_recursive_proof));
        inputs.push(Fr::from(
            self.recursive_proof_public_input_indices.len() as u64,
        ));
        inputs.extend(
            self.recursive_proof_public_input_indices
                .iter()
                .map(|i| Fr::from(*i)),
        );
        compress(&inputs, GeneratorIndex::Vk)
    }
}
