//! Builds the recursive-factorial region, verifies it and prints the IR
//! together with its dominator and loop information.

use iris::dialects::{arith, builtin, ctrlflow};
use iris::{BlockId, CmpPredicate, DataType, IRBuilder};

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let mut builder = IRBuilder::new();
    builder.start_new_region("factorial")?;

    // bb0: parameter & constants
    builder.start_new_basic_block()?;
    let a0 = builder.create_and_add_op(builtin::param(DataType::UInt))?;
    let c1 = builder.create_and_add_op(arith::constant(1u64.into()))?;
    let c2 = builder.create_and_add_op(arith::constant(2u64.into()))?;
    let bb0 = builder.finalize_cur_basic_block()?;

    // bb1: decide whether recursion is needed
    builder.start_new_basic_block()?;
    let v3 = builder.create_and_add_op(arith::compare(CmpPredicate::B, a0, c2))?;
    let done = builder.obtain_id_for_basic_block()?;
    builder.create_and_add_op(ctrlflow::jumpc(done, v3))?;
    let bb1 = builder.finalize_cur_basic_block()?;

    // bb3: recursive step
    builder.start_new_basic_block()?;
    let v5 = builder.create_and_add_op(arith::sub(DataType::UInt, a0, c1))?;
    let v6 =
        builder.create_and_add_op(ctrlflow::call("factorial", DataType::UInt, vec![v5])?)?;
    let v7 = builder.create_and_add_op(arith::mul(DataType::UInt, a0, v6))?;
    let bb3 = builder.finalize_cur_basic_block()?;

    // bb2: join & return
    builder.start_new_basic_block_with_id(done)?;
    let v8 = builder.create_and_add_op(ctrlflow::phi(DataType::UInt, vec![c1, v7])?)?;
    builder.create_and_add_op(ctrlflow::ret(Some(v8)))?;
    let bb2 = builder.finalize_cur_basic_block()?;

    let mut region = builder.obtain_region().unwrap();
    region.link_succ(bb0, bb1, true);
    region.link_succ(bb1, bb2, true);
    region.link_succ(bb1, bb3, false);
    region.link_succ(bb3, bb2, true);
    region.set_start_basic_block(bb0);
    region.set_final_basic_block(bb2);

    region.verify()?;
    region.dump(&mut std::io::stdout())?;

    region.collect_dom_info()?;
    let ids: Vec<BlockId> = region.blocks().iter().map(|bb| bb.id()).collect();
    println!();
    for bb in ids {
        if let Some(idom) = region.get_idom(bb) {
            println!("idom({}) = {}", bb, idom);
        }
    }

    region.collect_loop_info()?;
    println!();
    print!("{}", region.loop_info());

    Ok(())
}
