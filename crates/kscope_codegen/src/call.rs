use inkwell::values::{BasicMetadataValueEnum, FloatValue};
use kscope_frontend::Expr;

use crate::context::CodegenContext;
use crate::error::{CodegenError, CodegenResult};
use crate::expr::codegen_expr;

/// Function call code generation.
///
/// Calls are resolved by name against the module, so both `extern`
/// declarations and earlier definitions are visible.
pub struct CallCodegen;

impl CallCodegen {
    /// Emit a direct call to `callee`.
    ///
    /// Arity is checked before any argument is generated, so a mismatched
    /// call emits nothing. Arguments are generated left to right and the first
    /// failure aborts the rest.
    pub fn build_call<'ctx>(
        cx: &mut CodegenContext<'ctx>,
        callee: &str,
        args: &[Expr],
    ) -> CodegenResult<FloatValue<'ctx>> {
        let function = cx
            .module
            .get_function(callee)
            .ok_or_else(|| CodegenError::UnknownFunction {
                name: callee.to_string(),
            })?;

        let expected = function.count_params() as usize;
        if expected != args.len() {
            return Err(CodegenError::ArityMismatch {
                callee: callee.to_string(),
                expected,
                found: args.len(),
            });
        }

        let mut arg_vals: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(args.len());
        for arg in args {
            arg_vals.push(codegen_expr(cx, arg)?.into());
        }

        let call = cx.builder.build_call(function, &arg_vals, "calltmp")?;
        call.try_as_basic_value()
            .basic()
            .map(|v| v.into_float_value())
            .ok_or_else(|| CodegenError::VoidCall {
                callee: callee.to_string(),
            })
    }
}
