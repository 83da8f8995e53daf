//! Builds a single-block region mixing constant and non-constant
//! subexpressions, then runs constant folding followed by DCE and prints
//! the region before and after.

use iris::dialects::{arith, builtin, ctrlflow};
use iris::opt::arith::ArithConstFoldPass;
use iris::opt::common::DCEPass;
use iris::opt::PassManager;
use iris::{CmpPredicate, DataType, IRBuilder};

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let mut builder = IRBuilder::new();
    builder.start_new_region("constfold")?;
    builder.start_new_basic_block()?;

    // Parameters keep part of the graph non-constant.
    let a0 = builder.create_and_add_op(builtin::param(DataType::SInt))?;
    let a1 = builder.create_and_add_op(builtin::param(DataType::UInt))?;

    let c_si10 = builder.create_and_add_op(arith::constant(10i64.into()))?;
    let c_si3 = builder.create_and_add_op(arith::constant(3i64.into()))?;
    let c_ui7 = builder.create_and_add_op(arith::constant(7u64.into()))?;
    let c_ui2 = builder.create_and_add_op(arith::constant(2u64.into()))?;
    let c_f1_5 = builder.create_and_add_op(arith::constant(1.5f64.into()))?;
    let c_f0_5 = builder.create_and_add_op(arith::constant(0.5f64.into()))?;
    let c_true = builder.create_and_add_op(arith::constant(true.into()))?;
    let c_false = builder.create_and_add_op(arith::constant(false.into()))?;

    // (10 + 3) * 3 folds down to a single signed constant.
    let add_si = builder.create_and_add_op(arith::add(DataType::SInt, c_si10, c_si3))?;
    let mul_si = builder.create_and_add_op(arith::mul(DataType::SInt, add_si, c_si3))?;

    // (7 & 2) ^ 7 folds to an unsigned constant.
    let and_ui = builder.create_and_add_op(arith::and(DataType::UInt, c_ui7, c_ui2))?;
    let xor_ui = builder.create_and_add_op(arith::xor(DataType::UInt, and_ui, c_ui7))?;

    // (1.5 + 0.5) / 0.5 folds into a single float constant.
    let add_f = builder.create_and_add_op(arith::add(DataType::Float, c_f1_5, c_f0_5))?;
    let div_f = builder.create_and_add_op(arith::div(DataType::Float, add_f, c_f0_5))?;

    // Shifts and a boolean comparison on constants.
    let shl_ui = builder.create_and_add_op(arith::shl(DataType::UInt, c_ui7, c_ui2))?;
    let sar_si = builder.create_and_add_op(arith::sar(DataType::SInt, c_si10, c_si3))?;
    let cmp_bool =
        builder.create_and_add_op(arith::compare(CmpPredicate::Eq, c_true, c_false))?;

    // A mixed expression that cannot be fully folded.
    let add_mixed = builder.create_and_add_op(arith::add(DataType::SInt, a0, c_si3))?;
    let sum_all = builder.create_and_add_op(arith::add(DataType::SInt, mul_si, add_mixed))?;
    let ui_result = builder.create_and_add_op(arith::and(DataType::UInt, xor_ui, a1))?;

    // Keep the folded float, bool and shift results alive through casts.
    let cast_bool = builder.create_and_add_op(arith::cast(DataType::SInt, cmp_bool))?;
    let cast_float = builder.create_and_add_op(arith::cast(DataType::SInt, div_f))?;
    let cast_shl = builder.create_and_add_op(arith::cast(DataType::SInt, shl_ui))?;
    let cast_ui = builder.create_and_add_op(arith::cast(DataType::SInt, ui_result))?;

    let t0 = builder.create_and_add_op(arith::add(DataType::SInt, sum_all, cast_bool))?;
    let t1 = builder.create_and_add_op(arith::add(DataType::SInt, t0, cast_float))?;
    let t2 = builder.create_and_add_op(arith::add(DataType::SInt, t1, sar_si))?;
    let t3 = builder.create_and_add_op(arith::add(DataType::SInt, t2, cast_shl))?;
    let t4 = builder.create_and_add_op(arith::add(DataType::SInt, t3, cast_ui))?;
    builder.create_and_add_op(ctrlflow::ret(Some(t4)))?;

    let bb0 = builder.finalize_cur_basic_block()?;
    let mut region = builder.obtain_region().unwrap();
    region.set_start_basic_block(bb0);
    region.set_final_basic_block(bb0);

    region.verify()?;
    println!("==============================");
    println!("Region before ArithConstFold:");
    region.dump(&mut std::io::stdout())?;

    let mut pm = PassManager::new();
    pm.add_pass(Box::new(ArithConstFoldPass::new()));
    pm.add_pass(Box::new(DCEPass::new()));
    pm.run(&mut region);

    region.verify()?;
    println!("==============================");
    println!("Region after ArithConstFold + DCE:");
    region.dump(&mut std::io::stdout())?;

    Ok(())
}
