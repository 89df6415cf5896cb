//! Records exchanged between circuits, with their canonical hashes and
//! positional encodings.

pub mod call_stack_item;
pub mod contract;
pub mod function_data;
pub mod kernel;
pub mod rollup;
pub mod tx;
pub mod verification_key;

pub use call_stack_item::{
    CallContext, CallPublicInputs, CallStackItem, ContractStorageUpdateRequest,
    PublicDataUpdateRequest,
};
pub use contract::{NewContractData, compute_constructor_hash};
pub use function_data::{
    FunctionData, FunctionLeafPreimage, compute_function_selector, compute_function_tree,
    compute_function_tree_root,
};
pub use kernel::{
    CombinedAccumulatedData, CombinedConstantData, HistoricTreeRoots, KernelPublicInputs,
    PreviousKernelData,
};
pub use rollup::{
    AppendOnlyTreeSnapshot, BaseOrMergeRollupPublicInputs, BaseRollupInputs, ConstantRollupData,
    MembershipWitness, MergeRollupInputs, PreviousRollupData, RollupType, RootRollupInputs,
    RootRollupPublicInputs,
};
pub use tx::{ContractDeploymentData, EcdsaSignature, SignedTxRequest, TxContext, TxRequest};
pub use verification_key::VerificationKeyData;
