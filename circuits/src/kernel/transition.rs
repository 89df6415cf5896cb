use ark_bn254::Fr;
use ark_std::Zero;

use crate::abis::{
    CallStackItem, CombinedAccumulatedData, CombinedConstantData, FunctionLeafPreimage,
    KernelPublicInputs, NewContractData, PublicDataUpdateRequest, TxContext, TxRequest,
    compute_constructor_hash,
};
use crate::aggregation::ProofAggregator;
use crate::composer::Composer;
use crate::error::Result;
use crate::hash::{
    compute_contract_address, compute_public_data_leaf_index, silo_commitment, silo_nullifier,
};
use crate::kernel::{CallData, KernelState};
use crate::merkle::{check_membership, root_from_path};

/// The single kernel transition: `(state, call) -> KernelPublicInputs`.
pub fn kernel_circuit<C: Composer, A: ProofAggregator>(
    composer: &mut C,
    aggregator: &A,
    state: &KernelState,
    call: &CallData,
) -> Result<KernelPublicInputs> {
    let item = &call.call_stack_item;
    let is_private = item.function_data.is_private;

    let (mut end, constants, aggregation_object, deployer) = match state {
        KernelState::Seed {
            signed_tx_request,
            historic_tree_roots,
        } => {
            let tx_request = &signed_tx_request.tx_request;
            validate_against_tx_request(composer, tx_request, item);
            let constants = CombinedConstantData {
                historic_tree_roots: *historic_tree_roots,
                tx_context: tx_request.tx_context,
            };
            let deployer = tx_request
                .tx_context
                .is_contract_deployment_tx
                .then_some(tx_request.from);
            (
                CombinedAccumulatedData::default(),
                constants,
                call.proof,
                deployer,
            )
        }
        KernelState::Chained(previous) => {
            let mut end = previous.public_inputs.end.clone();
            pop_matching_call(composer, &mut end, item);
            let aggregation_object = aggregator.combine(
                &aggregator.combine(&end.aggregation_object, &previous.proof),
                &call.proof,
            );
            (
                end,
                previous.public_inputs.constants,
                aggregation_object,
                None,
            )
        }
    };

    validate_call_context(composer, &constants, item);

    let function_tree_root = function_tree_root_from_witness(call);
    match deployer {
        Some(deployer) => deploy_contract(
            composer,
            &mut end,
            deployer,
            &constants.tx_context,
            call,
            function_tree_root,
        )?,
        None => {
            let contract_leaf = NewContractData {
                contract_address: item.contract_address,
                portal_contract_address: item.public_inputs.call_context.portal_contract_address,
                function_tree_root,
            }
            .hash();
            check_membership(
                composer,
                contract_leaf,
                &call.contract_leaf_membership_witness,
                constants.historic_tree_roots.contract_tree_root,
                "called contract is not in the contract tree",
            );
        }
    }

    accumulate_side_effects(&mut end, item)?;
    end.aggregation_object = aggregation_object;

    log::debug!(
        "Kernel iteration (private={}): {} commitments, {} pending private calls, {} pending public calls",
        is_private,
        end.new_commitments.len(),
        end.private_call_stack.len(),
        end.public_call_stack.len()
    );

    Ok(KernelPublicInputs {
        end,
        constants,
        is_private,
    })
}

fn validate_against_tx_request<C: Composer>(
    composer: &mut C,
    tx_request: &TxRequest,
    item: &CallStackItem,
) {
    composer.assert_equal(
        item.contract_address,
        tx_request.to,
        "first call does not target the tx request's contract",
    );
    composer.assert_equal(
        item.function_data.hash(),
        tx_request.function_data.hash(),
        "first call does not match the tx request's function",
    );
    composer.assert_equal(
        item.public_inputs.args_hash,
        tx_request.args_hash,
        "first call does not match the tx request's arguments",
    );
    composer.assert_equal(
        item.public_inputs.call_context.msg_sender,
        tx_request.from,
        "first call's sender is not the tx origin",
    );
}

/// Pops the call stack this call belongs to and checks it was the top entry.
fn pop_matching_call<C: Composer>(
    composer: &mut C,
    end: &mut CombinedAccumulatedData,
    item: &CallStackItem,
) {
    let popped = if item.function_data.is_private {
        end.private_call_stack.pop()
    } else {
        composer.assert_true(
            end.private_call_stack.is_empty(),
            "public call executed while private calls are pending",
        );
        end.public_call_stack.pop()
    };

    match popped {
        Some(top) => composer.assert_equal(
            top,
            item.hash(),
            "call does not match the top of the call stack",
        ),
        None => composer.assert_true(false, "call stack is already empty"),
    }
}

fn validate_call_context<C: Composer>(
    composer: &mut C,
    constants: &CombinedConstantData,
    item: &CallStackItem,
) {
    let inputs = &item.public_inputs;
    let context = &inputs.call_context;

    if !context.is_delegate_call {
        composer.assert_equal(
            context.storage_contract_address,
            item.contract_address,
            "storage contract address differs from the called contract",
        );
    }

    if item.function_data.is_private {
        composer.assert_true(
            inputs.contract_storage_update_requests.is_empty(),
            "private calls cannot write public data",
        );
        let roots = &constants.historic_tree_roots;
        composer.assert_equal(
            inputs.historic_private_data_tree_root,
            roots.private_data_tree_root,
            "call used a different private data tree root",
        );
        composer.assert_equal(
            inputs.historic_contract_tree_root,
            roots.contract_tree_root,
            "call used a different contract tree root",
        );
    } else {
        composer.assert_true(
            inputs.private_call_stack.is_empty(),
            "public calls cannot call private functions",
        );
    }

    if context.is_static_call {
        composer.assert_true(
            inputs.new_commitments.is_empty()
                && inputs.new_nullifiers.is_empty()
                && inputs.contract_storage_update_requests.is_empty(),
            "static calls cannot modify state",
        );
    }
}

fn function_tree_root_from_witness(call: &CallData) -> Fr {
    let item = &call.call_stack_item;
    let leaf = FunctionLeafPreimage {
        function_selector: item.function_data.function_selector,
        is_private: item.function_data.is_private,
        vk_hash: call.vk.hash(),
        acir_hash: call.acir_hash,
    }
    .hash();
    let witness = &call.function_leaf_membership_witness;
    root_from_path(leaf, witness.leaf_index, &witness.sibling_path)
}

fn deploy_contract<C: Composer>(
    composer: &mut C,
    end: &mut CombinedAccumulatedData,
    deployer: Fr,
    tx_context: &TxContext,
    call: &CallData,
    function_tree_root: Fr,
) -> Result<()> {
    let item = &call.call_stack_item;
    let data = &tx_context.contract_deployment_data;

    composer.assert_true(
        item.function_data.is_constructor && item.public_inputs.call_context.is_contract_deployment,
        "contract deployment must start with a constructor call",
    );
    composer.assert_equal(
        call.vk.hash(),
        data.constructor_vk_hash,
        "constructor vk differs from the deployment data",
    );
    composer.assert_equal(
        function_tree_root,
        data.function_tree_root,
        "constructor is not in the deployed function tree",
    );

    let constructor_hash = compute_constructor_hash(
        &item.function_data,
        item.public_inputs.args_hash,
        data.constructor_vk_hash,
    );
    let contract_address = compute_contract_address(
        deployer,
        data.contract_address_salt,
        data.function_tree_root,
        constructor_hash,
    );
    composer.assert_equal(
        contract_address,
        item.contract_address,
        "deployed contract address mismatch",
    );

    end.new_contracts.push(
        NewContractData {
            contract_address,
            portal_contract_address: data.portal_contract_address,
            function_tree_root: data.function_tree_root,
        },
        "new contracts",
    )
}

/// Appends this call's effects after the ones already accumulated.
fn accumulate_side_effects(end: &mut CombinedAccumulatedData, item: &CallStackItem) -> Result<()> {
    let inputs = &item.public_inputs;
    let storage_contract = inputs.call_context.storage_contract_address;

    for commitment in inputs.new_commitments.iter().filter(|c| !c.is_zero()) {
        end.new_commitments
            .push(silo_commitment(storage_contract, *commitment), "new commitments")?;
    }
    for nullifier in inputs.new_nullifiers.iter().filter(|n| !n.is_zero()) {
        end.new_nullifiers
            .push(silo_nullifier(storage_contract, *nullifier), "new nullifiers")?;
    }
    for msg in inputs.new_l2_to_l1_msgs.iter().filter(|m| !m.is_zero()) {
        end.new_l2_to_l1_msgs.push(*msg, "new l2 to l1 messages")?;
    }
    for request in &inputs.contract_storage_update_requests {
        end.public_data_update_requests.push(
            PublicDataUpdateRequest {
                leaf_index: compute_public_data_leaf_index(storage_contract, request.storage_slot),
                old_value: request.old_value,
                new_value: request.new_value,
            },
            "public data update requests",
        )?;
    }

    // Reversed so the first declared callee ends up on top.
    for callee in inputs.private_call_stack.iter().rev() {
        end.private_call_stack.push(*callee, "private call stack")?;
    }
    for callee in inputs.public_call_stack.iter().rev() {
        end.public_call_stack.push(*callee, "public call stack")?;
    }
    Ok(())
}
