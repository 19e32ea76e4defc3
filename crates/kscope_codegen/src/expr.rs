use inkwell::FloatPredicate;
use inkwell::builder::Builder;
use inkwell::types::FloatType;
use inkwell::values::FloatValue;
use kscope_frontend::Expr;

use crate::call::CallCodegen;
use crate::context::CodegenContext;
use crate::error::{CodegenError, CodegenResult};

/// Binary operator kinds supported by the codegen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Lt,
}

impl BinOp {
    /// Map an operator symbol to its kind; `None` for unsupported symbols.
    pub fn from_symbol(op: char) -> Option<Self> {
        match op {
            '+' => Some(BinOp::Add),
            '-' => Some(BinOp::Sub),
            '*' => Some(BinOp::Mul),
            '<' => Some(BinOp::Lt),
            _ => None,
        }
    }
}

/// Lower an expression to a scalar value at the builder's insertion point.
///
/// Fails fast: once a child fails, no sibling is generated and the error is
/// returned unchanged.
pub fn codegen_expr<'ctx>(
    cx: &mut CodegenContext<'ctx>,
    expr: &Expr,
) -> CodegenResult<FloatValue<'ctx>> {
    match expr {
        Expr::Number(value) => Ok(ExprCodegen::const_scalar(cx.scalar_type(), *value)),
        Expr::Variable(name) => cx
            .env
            .lookup(name)
            .ok_or_else(|| CodegenError::UnknownVariable { name: name.clone() }),
        Expr::Binary { op, lhs, rhs } => {
            let l = codegen_expr(cx, lhs)?;
            let r = codegen_expr(cx, rhs)?;
            let op = BinOp::from_symbol(*op).ok_or(CodegenError::InvalidOperator { op: *op })?;
            ExprCodegen::build_binary(&cx.builder, cx.scalar_type(), op, l, r)
        }
        Expr::Call { callee, args } => CallCodegen::build_call(cx, callee, args),
    }
}

/// Instruction-level helpers. The caller supplies the builder and types.
pub struct ExprCodegen;

impl ExprCodegen {
    pub fn const_scalar(ty: FloatType<'_>, value: f64) -> FloatValue<'_> {
        ty.const_float(value)
    }

    /// Emit one arithmetic or comparison instruction.
    ///
    /// `<` is an unordered-or-less-than compare whose `i1` result is widened
    /// back to the scalar type, so comparisons stay expression-valued.
    pub fn build_binary<'ctx>(
        builder: &Builder<'ctx>,
        ty: FloatType<'ctx>,
        op: BinOp,
        lhs: FloatValue<'ctx>,
        rhs: FloatValue<'ctx>,
    ) -> CodegenResult<FloatValue<'ctx>> {
        let value = match op {
            BinOp::Add => builder.build_float_add(lhs, rhs, "addtmp")?,
            BinOp::Sub => builder.build_float_sub(lhs, rhs, "subtmp")?,
            BinOp::Mul => builder.build_float_mul(lhs, rhs, "multmp")?,
            BinOp::Lt => {
                let cmp = builder.build_float_compare(FloatPredicate::ULT, lhs, rhs, "cmptmp")?;
                builder.build_unsigned_int_to_float(cmp, ty, "booltmp")?
            }
        };
        Ok(value)
    }
}
