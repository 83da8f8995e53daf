/*!

  The use-def core of the IR.

  Every operation owns a fixed-arity vector of input slots and keeps a
  reverse index of its users: `(user op, input index)` pairs recording every
  slot elsewhere that references its result. Operations live in a slab owned
  by their region and reference each other through [`OpId`] handles; the
  handle doubles as the operation identifier and is never reused.

  All mutation of the graph funnels through the region primitives
  (`set_input`, `replace_all_uses_with`, `clear_all_uses`, `disconnect`),
  which keep both sides of the use-def relation consistent. Hand-mutation of
  a user list or a foreign input slot is not expressible through the public
  API.

*/

use crate::core::attributes::ConstAttribute;
use crate::core::types::DataType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Handle to an operation inside its region's slab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpId(usize);

impl OpId {
    pub fn new(id: usize) -> OpId {
        OpId(id)
    }

    pub fn get_id(&self) -> usize {
        self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Handle to a basic block, unique within its region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(u32);

impl BlockId {
    pub fn new(id: u32) -> BlockId {
        BlockId(id)
    }

    pub fn get_id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Closed opcode enumeration covering all dialects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
    Not,
    Sal,
    Sar,
    Shl,
    Shr,
    Cmp,
    Cast,
    Const,
    Param,
    Copy,
    Return,
    Jump,
    Jumpc,
    Call,
    Phi,
}

/// Static, per-opcode properties consulted by printing, verification and
/// the bundled passes.
pub struct OpSpec {
    pub dialect: &'static str,
    pub mnemonic: &'static str,
    pub terminator: bool,
    pub side_effects: bool,
}

impl OpSpec {
    const fn new(
        dialect: &'static str,
        mnemonic: &'static str,
        terminator: bool,
        side_effects: bool,
    ) -> OpSpec {
        OpSpec {
            dialect,
            mnemonic,
            terminator,
            side_effects,
        }
    }
}

lazy_static! {
    static ref OPCODE_SPECS: HashMap<Opcode, OpSpec> = {
        let mut m = HashMap::new();
        m.insert(Opcode::Add, OpSpec::new("arith", "add", false, false));
        m.insert(Opcode::Sub, OpSpec::new("arith", "sub", false, false));
        m.insert(Opcode::Mul, OpSpec::new("arith", "mul", false, false));
        m.insert(Opcode::Div, OpSpec::new("arith", "div", false, false));
        m.insert(Opcode::And, OpSpec::new("arith", "and", false, false));
        m.insert(Opcode::Or, OpSpec::new("arith", "or", false, false));
        m.insert(Opcode::Xor, OpSpec::new("arith", "xor", false, false));
        m.insert(Opcode::Not, OpSpec::new("arith", "not", false, false));
        m.insert(Opcode::Sal, OpSpec::new("arith", "sal", false, false));
        m.insert(Opcode::Sar, OpSpec::new("arith", "sar", false, false));
        m.insert(Opcode::Shl, OpSpec::new("arith", "shl", false, false));
        m.insert(Opcode::Shr, OpSpec::new("arith", "shr", false, false));
        m.insert(Opcode::Cmp, OpSpec::new("arith", "cmp", false, false));
        m.insert(Opcode::Cast, OpSpec::new("arith", "cast", false, false));
        m.insert(Opcode::Const, OpSpec::new("arith", "const", false, false));
        m.insert(Opcode::Param, OpSpec::new("builtin", "param", false, false));
        m.insert(Opcode::Copy, OpSpec::new("builtin", "copy", false, false));
        m.insert(
            Opcode::Return,
            OpSpec::new("ctrlflow", "return", true, true),
        );
        m.insert(Opcode::Jump, OpSpec::new("ctrlflow", "jump", true, true));
        m.insert(Opcode::Jumpc, OpSpec::new("ctrlflow", "jumpc", true, true));
        // Calls pin their block position through the side-effect flag, but
        // they do not end straight-line flow.
        m.insert(Opcode::Call, OpSpec::new("ctrlflow", "call", false, true));
        m.insert(Opcode::Phi, OpSpec::new("ctrlflow", "phi", false, false));
        m
    };
}

impl Opcode {
    pub fn spec(self) -> &'static OpSpec {
        &OPCODE_SPECS[&self]
    }

    pub fn dialect_name(self) -> &'static str {
        self.spec().dialect
    }

    pub fn mnemonic(self) -> &'static str {
        self.spec().mnemonic
    }

    pub fn is_terminator(self) -> bool {
        self.spec().terminator
    }

    pub fn has_side_effects(self) -> bool {
        self.spec().side_effects
    }
}

/// Predicates of the `arith.cmp` operation. `A`/`B` read "above"/"below"
/// for unsigned operands and "greater"/"less" for signed, floating and
/// boolean ones (`false < true`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpPredicate {
    Eq,
    Neq,
    A,
    B,
    Ae,
    Be,
}

impl fmt::Display for CmpPredicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CmpPredicate::Eq => "EQ",
            CmpPredicate::Neq => "NEQ",
            CmpPredicate::A => "A",
            CmpPredicate::B => "B",
            CmpPredicate::Ae => "AE",
            CmpPredicate::Be => "BE",
        };
        write!(f, "{}", s)
    }
}

/// Dialect-specific immutable payload of an operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    None,
    Attr(ConstAttribute),
    Pred(CmpPredicate),
    Target(BlockId),
    Callee(String),
}

/// One positional operand slot: a nullable reference to the defining
/// operation. Empty inputs are legal transiently but rejected by the
/// verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Input(Option<OpId>);

impl Input {
    pub fn empty() -> Input {
        Input(None)
    }

    pub fn to(op: OpId) -> Input {
        Input(Some(op))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn defining_op(&self) -> Option<OpId> {
        self.0
    }

    pub(crate) fn clear(&mut self) {
        self.0 = None;
    }

    pub(crate) fn set(&mut self, op: OpId) {
        self.0 = Some(op);
    }
}

/// One entry of an operation's user list: which operation consumes the
/// result, and in which of its input slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct User {
    op: OpId,
    input_index: usize,
}

impl User {
    pub fn new(op: OpId, input_index: usize) -> User {
        User { op, input_index }
    }

    pub fn user_op(&self) -> OpId {
        self.op
    }

    pub fn input_index(&self) -> usize {
        self.input_index
    }
}

#[derive(Debug)]
pub struct Operation {
    opcode: Opcode,
    data_type: DataType,
    id: Option<OpId>,
    inputs: Vec<Input>,
    users: Vec<User>,
    parent: Option<BlockId>,
    payload: Payload,
}

impl Operation {
    pub(crate) fn new(
        opcode: Opcode,
        data_type: DataType,
        inputs: Vec<Input>,
        payload: Payload,
    ) -> Operation {
        Operation {
            opcode,
            data_type,
            id: None,
            inputs,
            users: Vec::new(),
            parent: None,
            payload,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn isa(&self, opcode: Opcode) -> bool {
        self.opcode == opcode
    }

    pub fn is_phi(&self) -> bool {
        self.isa(Opcode::Phi)
    }

    pub fn dialect_name(&self) -> &'static str {
        self.opcode.dialect_name()
    }

    pub fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic()
    }

    pub fn is_terminator(&self) -> bool {
        self.opcode.is_terminator()
    }

    pub fn has_side_effects(&self) -> bool {
        self.opcode.has_side_effects()
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn has_result(&self) -> bool {
        self.data_type != DataType::None
    }

    /// Identifier within the owning region; `None` while detached.
    pub fn id(&self) -> Option<OpId> {
        self.id
    }

    pub fn parent_basic_block(&self) -> Option<BlockId> {
        self.parent
    }

    pub fn has_parent_basic_block(&self) -> bool {
        self.parent.is_some()
    }

    pub fn inputs_num(&self) -> usize {
        self.inputs.len()
    }

    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> &Input {
        &self.inputs[index]
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn users_num(&self) -> usize {
        self.users.len()
    }

    pub fn has_users(&self) -> bool {
        !self.users.is_empty()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Constant payload of an `arith.const` operation.
    pub fn attr(&self) -> Option<&ConstAttribute> {
        match &self.payload {
            Payload::Attr(attr) => Some(attr),
            _ => None,
        }
    }

    /// Predicate of an `arith.cmp` operation.
    pub fn predicate(&self) -> Option<CmpPredicate> {
        match &self.payload {
            Payload::Pred(pred) => Some(*pred),
            _ => None,
        }
    }

    /// Target block of a `ctrlflow.jump` / `ctrlflow.jumpc` operation.
    pub fn target_basic_block(&self) -> Option<BlockId> {
        match &self.payload {
            Payload::Target(bb) => Some(*bb),
            _ => None,
        }
    }

    /// Callee name of a `ctrlflow.call` operation.
    pub fn callee(&self) -> Option<&str> {
        match &self.payload {
            Payload::Callee(name) => Some(name),
            _ => None,
        }
    }

    pub(crate) fn set_id(&mut self, id: OpId) {
        self.id = Some(id);
    }

    pub(crate) fn set_parent(&mut self, parent: Option<BlockId>) {
        self.parent = parent;
    }

    pub(crate) fn input_mut(&mut self, index: usize) -> &mut Input {
        &mut self.inputs[index]
    }

    /// Registers a user entry, rejecting exact duplicates. A duplicate
    /// indicates a double-registration bug in the caller.
    pub(crate) fn add_user(&mut self, user: User) -> bool {
        if self.users.contains(&user) {
            return false;
        }
        self.users.push(user);
        true
    }

    /// Removes the exact user entry; the entry must be present.
    pub(crate) fn remove_user(&mut self, user: User) {
        let pos = self
            .users
            .iter()
            .position(|u| *u == user)
            .expect("user entry is not in the users list");
        self.users.remove(pos);
    }

    pub(crate) fn take_users(&mut self) -> Vec<User> {
        std::mem::take(&mut self.users)
    }

    pub(crate) fn append_users(&mut self, users: Vec<User>) {
        for user in users {
            if !self.add_user(user) {
                panic!("operation is already in the users list");
            }
        }
    }
}
