//! The typed expression tree.

use std::fmt;

/// Value types the generated code uses.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValType {
    I32,
    F64,
}

impl ValType {
    /// Byte width in linear memory.
    pub const fn size(self) -> u32 {
        match self {
            ValType::I32 => 4,
            ValType::F64 => 8,
        }
    }

    /// The zero constant of this type.
    pub fn zero(self) -> Expr {
        match self {
            ValType::I32 => Expr::I32Const(0),
            ValType::F64 => Expr::F64Const(0.0),
        }
    }
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValType::I32 => f.write_str("i32"),
            ValType::F64 => f.write_str("f64"),
        }
    }
}

/// A branch target. Unique within a function.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$L{}", self.0)
    }
}

/// Binary instructions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinOp {
    I32Add,
    I32Sub,
    I32Mul,
    /// Traps on division by zero and on `i32::MIN / -1`.
    I32DivS,
    /// Traps on division by zero.
    I32RemS,
    I32Eq,
    I32Ne,
    I32LtS,
    I32LeS,
    I32GtS,
    I32GeS,
    F64Add,
    F64Sub,
    F64Mul,
    F64Div,
    F64Eq,
    F64Ne,
    F64Lt,
    F64Le,
    F64Gt,
    F64Ge,
}

impl BinOp {
    pub const fn operand_type(self) -> ValType {
        match self {
            BinOp::I32Add
            | BinOp::I32Sub
            | BinOp::I32Mul
            | BinOp::I32DivS
            | BinOp::I32RemS
            | BinOp::I32Eq
            | BinOp::I32Ne
            | BinOp::I32LtS
            | BinOp::I32LeS
            | BinOp::I32GtS
            | BinOp::I32GeS => ValType::I32,
            _ => ValType::F64,
        }
    }

    pub const fn result_type(self) -> ValType {
        match self {
            BinOp::F64Add | BinOp::F64Sub | BinOp::F64Mul | BinOp::F64Div => ValType::F64,
            _ => ValType::I32,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BinOp::I32Add => "i32.add",
            BinOp::I32Sub => "i32.sub",
            BinOp::I32Mul => "i32.mul",
            BinOp::I32DivS => "i32.div_s",
            BinOp::I32RemS => "i32.rem_s",
            BinOp::I32Eq => "i32.eq",
            BinOp::I32Ne => "i32.ne",
            BinOp::I32LtS => "i32.lt_s",
            BinOp::I32LeS => "i32.le_s",
            BinOp::I32GtS => "i32.gt_s",
            BinOp::I32GeS => "i32.ge_s",
            BinOp::F64Add => "f64.add",
            BinOp::F64Sub => "f64.sub",
            BinOp::F64Mul => "f64.mul",
            BinOp::F64Div => "f64.div",
            BinOp::F64Eq => "f64.eq",
            BinOp::F64Ne => "f64.ne",
            BinOp::F64Lt => "f64.lt",
            BinOp::F64Le => "f64.le",
            BinOp::F64Gt => "f64.gt",
            BinOp::F64Ge => "f64.ge",
        }
    }
}

/// Unary instructions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnOp {
    I32Eqz,
    F64ConvertI32S,
}

impl UnOp {
    pub const fn name(self) -> &'static str {
        match self {
            UnOp::I32Eqz => "i32.eqz",
            UnOp::F64ConvertI32S => "f64.convert_i32_s",
        }
    }
}

/// An expression-tree node. Structured control flow nests; everything
/// else is a value producer or a side effect.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    I32Const(i32),
    F64Const(f64),
    LocalGet(u32),
    LocalSet {
        index: u32,
        value: Box<Expr>,
    },
    /// Set and also produce the value.
    LocalTee {
        index: u32,
        value: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    /// Load a value of `ty` from byte address `address + offset`.
    Load {
        ty: ValType,
        offset: u32,
        address: Box<Expr>,
    },
    Store {
        ty: ValType,
        offset: u32,
        address: Box<Expr>,
        value: Box<Expr>,
    },
    /// A sequence; produces the value of its last element when `ty` is set.
    Block {
        label: Option<Label>,
        body: Vec<Expr>,
        ty: Option<ValType>,
    },
    If {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
        ty: Option<ValType>,
    },
    /// A branch to `label` restarts the body.
    Loop {
        label: Label,
        body: Box<Expr>,
    },
    /// `br`, or `br_if` with a condition.
    Break {
        label: Label,
        condition: Option<Box<Expr>>,
    },
    Call {
        target: String,
        args: Vec<Expr>,
    },
    Return(Option<Box<Expr>>),
    Drop(Box<Expr>),
    Nop,
}

// Constructors, in the shape of an opcode interface.
impl Expr {
    pub fn local_get(index: u32) -> Expr {
        Expr::LocalGet(index)
    }

    pub fn local_set(index: u32, value: Expr) -> Expr {
        Expr::LocalSet {
            index,
            value: Box::new(value),
        }
    }

    pub fn local_tee(index: u32, value: Expr) -> Expr {
        Expr::LocalTee {
            index,
            value: Box::new(value),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn load(ty: ValType, address: Expr) -> Expr {
        Expr::Load {
            ty,
            offset: 0,
            address: Box::new(address),
        }
    }

    pub fn store(ty: ValType, address: Expr, value: Expr) -> Expr {
        Expr::Store {
            ty,
            offset: 0,
            address: Box::new(address),
            value: Box::new(value),
        }
    }

    pub fn block(label: Option<Label>, body: Vec<Expr>, ty: Option<ValType>) -> Expr {
        Expr::Block { label, body, ty }
    }

    pub fn if_(condition: Expr, then: Expr, otherwise: Option<Expr>, ty: Option<ValType>) -> Expr {
        Expr::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: otherwise.map(Box::new),
            ty,
        }
    }

    pub fn loop_(label: Label, body: Expr) -> Expr {
        Expr::Loop {
            label,
            body: Box::new(body),
        }
    }

    pub fn br(label: Label) -> Expr {
        Expr::Break {
            label,
            condition: None,
        }
    }

    pub fn br_if(label: Label, condition: Expr) -> Expr {
        Expr::Break {
            label,
            condition: Some(Box::new(condition)),
        }
    }

    pub fn call(target: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            target: target.into(),
            args,
        }
    }

    pub fn ret(value: Option<Expr>) -> Expr {
        Expr::Return(value.map(Box::new))
    }

    pub fn drop_value(value: Expr) -> Expr {
        Expr::Drop(Box::new(value))
    }

    /// Whether this is a compile-time constant.
    pub fn is_const(&self) -> bool {
        matches!(self, Expr::I32Const(_) | Expr::F64Const(_))
    }
}

/// A function ready to be registered with a module.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<ValType>,
    pub result: Option<ValType>,
    /// Types of the non-parameter locals, indexed after the parameters.
    pub locals: Vec<ValType>,
    pub body: Expr,
}
