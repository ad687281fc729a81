//! Syntax tree for build and extension files.
//!
//! Statements and expressions are plain boxed trees. Function bodies are held
//! behind `Arc<FunctionDef>` so evaluated function values can share their
//! definition with the parsed file without copying it.

use std::fmt;
use std::sync::Arc;

use crate::Span;

/// Expression node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ExprKind {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Ident(String),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Attr {
        object: Box<Expr>,
        name: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Arg>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `then_expr if cond else else_expr`
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
}

/// One argument at a call site.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Arg {
    pub kind: ArgKind,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ArgKind {
    Positional,
    Named(String),
    /// `*args`
    Star,
    /// `**kwargs`
    StarStar,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::In => "in",
            BinaryOp::NotIn => "not in",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// Statement node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum StmtKind {
    Load(LoadStmt),
    Assign {
        target: String,
        value: Expr,
    },
    /// `target += value` / `target -= value`
    AugAssign {
        target: String,
        op: BinaryOp,
        value: Expr,
    },
    Expr(Expr),
    Def(Arc<FunctionDef>),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Pass,
}

/// `load("<module>", "sym", local = "sym")`
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct LoadStmt {
    /// The raw import string, exactly as written.
    pub module: String,
    pub module_span: Span,
    pub symbols: Vec<LoadedSymbol>,
}

/// One symbol bound by a `load`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct LoadedSymbol {
    /// Name bound in the loading file.
    pub local: String,
    /// Name looked up in the loaded extension.
    pub remote: String,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ParamKind {
    Normal,
    /// `**kwargs`
    Kwargs,
}
