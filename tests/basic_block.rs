use iris::dialects::{arith, builtin, ctrlflow};
use iris::{BlockId, DataType, Region};

fn region() -> Region {
    Region::new("test").unwrap()
}

/// Gives the block a trailing return so op-list rules hold.
fn put_ret(region: &mut Region, bb: BlockId) {
    let c = region.insert_op_back(bb, arith::constant(1u64.into()));
    region.insert_op_back(bb, ctrlflow::ret(Some(c)));
}

#[test]
fn link_succ_updates_both_sides() {
    let mut region = region();
    let bb1 = region.add_basic_block();
    let bb2 = region.add_basic_block();

    assert!(region.link_succ(bb1, bb2, true));

    assert_eq!(region.block(bb1).succ(true), Some(bb2));
    assert_eq!(region.block(bb1).succ(false), None);
    assert!(region.block(bb1).has_succ(true));
    assert!(!region.block(bb1).has_succ(false));
    assert_eq!(region.block(bb2).preds(), &[bb1]);
}

#[test]
fn relinking_a_slot_unlinks_previous_target() {
    let mut region = region();
    let bb1 = region.add_basic_block();
    let bb2 = region.add_basic_block();
    let bb3 = region.add_basic_block();

    region.link_succ(bb1, bb2, true);
    region.link_succ(bb1, bb3, true);

    assert_eq!(region.block(bb1).succ(true), Some(bb3));
    assert_eq!(region.block(bb2).preds_num(), 0);
    assert_eq!(region.block(bb3).preds(), &[bb1]);
}

#[test]
fn unlink_removes_all_edges() {
    let mut region = region();
    let pred = region.add_basic_block();
    let bb = region.add_basic_block();
    let succ_t = region.add_basic_block();
    let succ_f = region.add_basic_block();

    region.link_succ(pred, bb, true);
    region.link_succ(bb, succ_t, true);
    region.link_succ(bb, succ_f, false);

    region.unlink(bb);

    assert!(!region.block(pred).has_succ(true));
    assert!(!region.block(bb).has_succ(true));
    assert!(!region.block(bb).has_succ(false));
    assert_eq!(region.block(bb).preds_num(), 0);
    assert_eq!(region.block(succ_t).preds_num(), 0);
    assert_eq!(region.block(succ_f).preds_num(), 0);
}

#[test]
fn replace_with_transfers_edges_and_roles() {
    let mut region = region();
    let pred = region.add_basic_block();
    let bb = region.add_basic_block();
    let succ_t = region.add_basic_block();
    let succ_f = region.add_basic_block();

    region.link_succ(pred, bb, true);
    region.link_succ(bb, succ_t, true);
    region.link_succ(bb, succ_f, false);
    region.set_start_basic_block(bb);

    let new_bb = region.add_basic_block();
    assert!(region.replace_basic_block_with(bb, new_bb));

    assert!(!region.is_basic_block_present(bb));
    assert_eq!(region.block(pred).succ(true), Some(new_bb));
    assert_eq!(region.block(new_bb).preds(), &[pred]);
    assert_eq!(region.block(new_bb).succ(true), Some(succ_t));
    assert_eq!(region.block(new_bb).succ(false), Some(succ_f));
    assert_eq!(region.block(succ_t).preds(), &[new_bb]);
    assert_eq!(region.block(succ_f).preds(), &[new_bb]);
    assert_eq!(region.start_basic_block(), Some(new_bb));
}

#[test]
fn op_insertion_positions() {
    let mut region = region();
    let bb = region.add_basic_block();

    let op1 = region.insert_op_back(bb, arith::constant(1u64.into()));
    let op2 = region.insert_op_back(bb, arith::constant(2u64.into()));
    assert_eq!(region.block(bb).reg_ops(), &[op1, op2]);

    let op3 = region.insert_op_front(bb, arith::constant(3u64.into()));
    assert_eq!(region.block(bb).reg_ops(), &[op3, op1, op2]);

    let op4 = region.insert_op_after(bb, op1, arith::constant(4u64.into()));
    assert_eq!(region.block(bb).reg_ops(), &[op3, op1, op4, op2]);

    let op5 = region.insert_op_before(bb, op3, arith::constant(5u64.into()));
    assert_eq!(region.block(bb).reg_ops(), &[op5, op3, op1, op4, op2]);
}

#[test]
fn erase_op_detaches_from_list() {
    let mut region = region();
    let bb = region.add_basic_block();
    let op1 = region.insert_op_back(bb, arith::constant(1u64.into()));
    let op2 = region.insert_op_back(bb, arith::constant(2u64.into()));
    let op3 = region.insert_op_back(bb, arith::constant(3u64.into()));

    region.erase_op(op2);

    assert_eq!(region.block(bb).reg_ops(), &[op1, op3]);
    assert!(!region.is_op_alive(op2));
}

#[test]
fn replace_op_preserves_id_and_users() {
    let mut region = region();
    let bb = region.add_basic_block();
    let a = region.insert_op_back(bb, builtin::param(DataType::UInt));
    let b = region.insert_op_back(bb, builtin::param(DataType::UInt));
    let add = region.insert_op_back(bb, arith::add(DataType::UInt, a, b));
    let ret = region.insert_op_back(bb, ctrlflow::ret(Some(add)));

    let replaced = region.replace_op_with(add, arith::constant(42u64.into()));

    assert_eq!(replaced, add);
    assert_eq!(region.op(add).attr().unwrap().as_uint(), Some(42));
    assert_eq!(region.op(ret).input(0).defining_op(), Some(add));
    assert_eq!(region.op(add).users_num(), 1);
    assert_eq!(region.op(add).users()[0].user_op(), ret);
    // The old op's operands lost their user.
    assert_eq!(region.op(a).users_num(), 0);
    assert_eq!(region.op(b).users_num(), 0);
    assert_eq!(region.block(bb).reg_ops(), &[a, b, add, ret]);
    region.verify_use_def().unwrap();
}

#[test]
fn phi_ops_live_in_their_own_list() {
    let mut region = region();
    let bb = region.add_basic_block();
    let c = region.insert_op_back(bb, arith::constant(1u64.into()));
    let phi = region.insert_phi_op_back(bb, ctrlflow::phi(DataType::UInt, vec![c]).unwrap());

    assert_eq!(region.block(bb).phi_ops(), &[phi]);
    assert_eq!(region.block(bb).reg_ops(), &[c]);
    assert!(region.op(phi).is_phi());
}

#[test]
#[should_panic(expected = "phi operation is in the regular operations list")]
fn phi_rejected_from_regular_list() {
    let mut region = region();
    let bb = region.add_basic_block();
    let c = region.insert_op_back(bb, arith::constant(1u64.into()));
    region.insert_op_back(bb, ctrlflow::phi(DataType::UInt, vec![c]).unwrap());
}

#[test]
#[should_panic(expected = "non-phi operation in the phi operations list")]
fn non_phi_rejected_from_phi_list() {
    let mut region = region();
    let bb = region.add_basic_block();
    region.insert_phi_op_back(bb, arith::constant(1u64.into()));
}

#[test]
#[should_panic(expected = "phi operation can only be replaced with a phi operation")]
fn replace_phi_with_non_phi_is_fatal() {
    let mut region = region();
    let bb = region.add_basic_block();
    let c = region.insert_op_back(bb, arith::constant(1u64.into()));
    let phi = region.insert_phi_op_back(bb, ctrlflow::phi(DataType::UInt, vec![c]).unwrap());
    region.replace_op_with(phi, arith::constant(2u64.into()));
}

//--- Verifier diagnostics ---

#[test]
fn verify_accepts_minimal_region() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    put_ret(&mut region, bb0);
    region.set_final_basic_block(bb0);
    region.verify().unwrap();
}

#[test]
fn verify_start_with_predecessor() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, true);
    region.link_succ(bb1, bb0, true);

    let err = region.verify().unwrap_err();
    assert!(err.message().contains("is starting bb, but has predecessor!"));
}

#[test]
fn verify_final_with_successor() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    let bb2 = region.add_basic_block();
    region.insert_op_back(bb0, ctrlflow::jump(bb1));
    put_ret(&mut region, bb1);
    put_ret(&mut region, bb2);
    region.link_succ(bb0, bb1, true);
    region.link_succ(bb1, bb2, true);

    let err = region.verify().unwrap_err();
    assert!(err.message().contains("is final bb, but has successors!"));
}

#[test]
fn verify_false_successor_without_true() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, false);
    put_ret(&mut region, bb1);

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("has false successor specified, but true successor is missing!"));
}

#[test]
fn verify_non_final_without_successors() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    put_ret(&mut region, bb0);
    put_ret(&mut region, bb1);

    let err = region.verify().unwrap_err();
    assert!(err.message().contains("is not final, but has no successors!"));
}

#[test]
fn verify_empty_block() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, true);
    put_ret(&mut region, bb1);

    let err = region.verify().unwrap_err();
    assert!(err.message().contains("is empty!"));
}

#[test]
fn verify_final_without_return() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    region.set_final_basic_block(bb0);
    region.insert_op_back(bb0, arith::constant(1u64.into()));

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("is final, but its last operation is not an 'ctrlflow.return'!"));
}

#[test]
fn verify_two_identical_successors() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, true);
    region.link_succ(bb0, bb1, false);
    let cond = region.insert_op_back(bb0, arith::constant(true.into()));
    region.insert_op_back(bb0, ctrlflow::jumpc(bb1, cond));
    put_ret(&mut region, bb1);

    let err = region.verify().unwrap_err();
    assert!(err.message().contains("has two identical successors!"));
}

#[test]
fn verify_two_successors_without_cond_jump() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_basic_block();
    let bb2 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, true);
    region.link_succ(bb0, bb2, false);
    region.insert_op_back(bb0, ctrlflow::jump(bb1));
    region.insert_op_back(bb1, ctrlflow::jump(bb2));
    region.link_succ(bb1, bb2, true);
    put_ret(&mut region, bb2);

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("has two successors, but conditional jump at the end is missing!"));
}

#[test]
fn verify_single_successor_with_cond_jump() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, true);
    let cond = region.insert_op_back(bb0, arith::constant(true.into()));
    region.insert_op_back(bb0, ctrlflow::jumpc(bb1, cond));
    put_ret(&mut region, bb1);

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("has single successor, but has conditional jump at the end!"));
}

#[test]
fn verify_interior_terminator() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, true);
    region.insert_op_back(bb0, ctrlflow::jump(bb1));
    region.insert_op_back(bb0, arith::constant(1u64.into()));
    put_ret(&mut region, bb1);

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("terminator operation is not the last one in the block!"));
}

#[test]
fn verify_empty_input_slot() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    region.set_final_basic_block(bb0);
    let a = region.insert_op_back(bb0, builtin::param(DataType::UInt));
    let add = region.insert_op_back(bb0, arith::add(DataType::UInt, a, a));
    region.insert_op_back(bb0, ctrlflow::ret(Some(add)));
    region.set_input(add, 0, None);

    let err = region.verify().unwrap_err();
    assert!(err.message().contains("arith.add's input #0 is empty!"));
}

#[test]
fn verify_operand_type_mismatch() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    region.set_final_basic_block(bb0);
    let a = region.insert_op_back(bb0, builtin::param(DataType::SInt));
    let b = region.insert_op_back(bb0, builtin::param(DataType::SInt));
    let add = region.insert_op_back(bb0, arith::add(DataType::UInt, a, b));
    region.insert_op_back(bb0, ctrlflow::ret(Some(add)));

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("Operation add: input #0 has incompatible data type."));
}

#[test]
fn verify_jumpc_condition_type() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_basic_block();
    let bb2 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, true);
    region.link_succ(bb0, bb2, false);
    let cond = region.insert_op_back(bb0, arith::constant(1u64.into()));
    region.insert_op_back(bb0, ctrlflow::jumpc(bb1, cond));
    region.insert_op_back(bb1, ctrlflow::jump(bb2));
    region.link_succ(bb1, bb2, true);
    put_ret(&mut region, bb2);

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("Operation jumpc: condition data type is not bool."));
}

#[test]
fn verify_jump_target_resolution() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    let bb1 = region.add_final_basic_block().unwrap();
    region.link_succ(bb0, bb1, true);
    region.insert_op_back(bb0, ctrlflow::jump(BlockId::new(99)));
    put_ret(&mut region, bb1);

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("Operation jump: target basic block is not in the region!"));
}

#[test]
fn verify_phi_input_types() {
    let mut region = region();
    let bb0 = region.add_start_basic_block().unwrap();
    region.set_final_basic_block(bb0);
    let a = region.insert_op_back(bb0, builtin::param(DataType::SInt));
    let phi = region.insert_phi_op_back(bb0, ctrlflow::phi(DataType::UInt, vec![a]).unwrap());
    region.insert_op_back(bb0, ctrlflow::ret(Some(phi)));

    let err = region.verify().unwrap_err();
    assert!(err
        .message()
        .contains("Operation phi: inputs have different data types."));
}
