//! Tree visualization for statement and expression trees.
//!
//! Used for debug logging between passes.

use std::borrow::Cow;
use std::io;
use std::sync::Arc;

use ptree::{Style, TreeItem};

use crate::expr::{Expr, ExprOp};
use crate::stmt::Stmt;

/// Either kind of IR node, for rendering mixed trees.
#[derive(Clone)]
pub enum IrNode {
    Expr(Arc<Expr>),
    Stmt(Arc<Stmt>),
}

impl TreeItem for IrNode {
    type Child = IrNode;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        match self {
            Self::Expr(expr) => write!(f, "{}", format_expr(expr)),
            Self::Stmt(stmt) => write!(f, "{}", format_stmt(stmt)),
        }
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        let children: Vec<_> = match self {
            Self::Expr(expr) => expr.children().into_iter().cloned().map(IrNode::Expr).collect(),
            Self::Stmt(stmt) => stmt
                .exprs()
                .into_iter()
                .cloned()
                .map(IrNode::Expr)
                .chain(stmt.stmts().into_iter().cloned().map(IrNode::Stmt))
                .collect(),
        };
        Cow::Owned(children)
    }
}

/// Output format: `OP_NAME : dtype`
fn format_expr(expr: &Expr) -> String {
    let op_str = match expr.op() {
        ExprOp::Var(var) => format!("VAR('{var}')"),
        ExprOp::IntImm(v) => format!("INT({v})"),
        ExprOp::UIntImm(v) => format!("UINT({v})"),
        ExprOp::FloatImm(v) => format!("FLOAT({v:?})"),
        ExprOp::Cast { .. } => "CAST".to_string(),
        ExprOp::Binary(op, ..) => op.as_ref().to_uppercase(),
        ExprOp::Select { .. } => "SELECT".to_string(),
        ExprOp::Load { buffer, .. } => format!("LOAD('{buffer}')"),
        ExprOp::Broadcast { .. } => "BROADCAST".to_string(),
        ExprOp::Call { name, .. } => format!("CALL('{name}')"),
    };
    format!("{} : {}", op_str, expr.dtype())
}

fn format_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::LetStmt { var, .. } => format!("LET('{var}')"),
        Stmt::Allocate { buffer, dtype, free_function, .. } => match free_function {
            Some(free) => format!("ALLOCATE('{buffer}', free='{free}') : {dtype}"),
            None => format!("ALLOCATE('{buffer}') : {dtype}"),
        },
        Stmt::Store { buffer, .. } => format!("STORE('{buffer}')"),
        Stmt::For { var, .. } => format!("FOR('{var}')"),
        Stmt::IfThenElse { .. } => "IF".to_string(),
        Stmt::Seq(stmts) => format!("SEQ(len={})", stmts.len()),
        Stmt::Evaluate(_) => "EVALUATE".to_string(),
    }
}

fn render(node: IrNode) -> String {
    let mut buf = Vec::new();
    ptree::write_tree(&node, &mut buf).expect("tree rendering failed");
    String::from_utf8(buf).expect("invalid utf8 in tree")
}

impl Expr {
    /// One-line description of this node, without operands.
    pub fn label(&self) -> String {
        format_expr(self)
    }

    /// Render this expression and its operands as an ASCII tree.
    pub fn tree(self: &Arc<Self>) -> String {
        render(IrNode::Expr(self.clone()))
    }
}

impl Stmt {
    /// One-line description of this statement, without children.
    pub fn label(&self) -> String {
        format_stmt(self)
    }

    /// Render this statement and everything it owns as an ASCII tree.
    pub fn tree(self: &Arc<Self>) -> String {
        render(IrNode::Stmt(self.clone()))
    }
}
