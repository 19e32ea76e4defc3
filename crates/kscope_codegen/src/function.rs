use std::collections::HashSet;

use inkwell::module::Linkage;
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::{BasicValue, FunctionValue};
use kscope_frontend::{Expr, FunctionDef, Prototype};

use crate::context::CodegenContext;
use crate::error::{CodegenError, CodegenResult};
use crate::expr::codegen_expr;

/// Declaration and definition of functions.
///
/// A definition moves through: find or declare → enter body → generate body →
/// return + verify → committed. Any failure after the body is entered erases
/// the function from the module. The one exception is a reused `extern` that
/// other committed functions already call: it is stripped back to a
/// declaration so those calls stay valid.
pub struct FunctionCodegen;

impl FunctionCodegen {
    /// Declare `double name(double, ...)` with external linkage.
    ///
    /// A second prototype for an already-known name returns the existing
    /// function when the parameter counts agree.
    pub fn build_prototype<'ctx>(
        cx: &mut CodegenContext<'ctx>,
        proto: &Prototype,
    ) -> CodegenResult<FunctionValue<'ctx>> {
        check_unique_params(proto)?;

        if let Some(existing) = cx.module.get_function(&proto.name) {
            check_arity(existing, proto)?;
            log::debug!("prototype '{}' reuses existing declaration", proto.name);
            return Ok(existing);
        }

        let scalar = cx.scalar_type();
        let param_types: Vec<BasicMetadataTypeEnum<'ctx>> = vec![scalar.into(); proto.params.len()];
        let fn_type = scalar.fn_type(&param_types, false);
        let function = cx
            .module
            .add_function(&proto.name, fn_type, Some(Linkage::External));
        name_params(function, &proto.params);

        log::debug!("declared '{}' with {} parameter(s)", proto.name, proto.params.len());
        Ok(function)
    }

    /// Generate a full function definition.
    pub fn build_function<'ctx>(
        cx: &mut CodegenContext<'ctx>,
        def: &FunctionDef,
    ) -> CodegenResult<FunctionValue<'ctx>> {
        Self::emit_function(cx, &def.proto, &def.body)
    }

    /// Wrap a top-level expression in a fresh nullary function.
    pub fn build_anonymous<'ctx>(
        cx: &mut CodegenContext<'ctx>,
        body: &Expr,
    ) -> CodegenResult<FunctionValue<'ctx>> {
        let proto = Prototype {
            name: cx.next_anon_name(),
            params: Vec::new(),
        };
        Self::emit_function(cx, &proto, body)
    }

    fn emit_function<'ctx>(
        cx: &mut CodegenContext<'ctx>,
        proto: &Prototype,
        body: &Expr,
    ) -> CodegenResult<FunctionValue<'ctx>> {
        check_unique_params(proto)?;

        let (function, reused) = match cx.module.get_function(&proto.name) {
            Some(existing) => {
                if existing.count_basic_blocks() > 0 {
                    return Err(CodegenError::Redefinition {
                        name: proto.name.clone(),
                    });
                }
                check_arity(existing, proto)?;
                (existing, true)
            }
            None => (Self::build_prototype(cx, proto)?, false),
        };

        let entry = cx.llvm.append_basic_block(function, "entry");
        cx.builder.position_at_end(entry);

        // Bind by position: a reused declaration may spell its parameters
        // differently from this definition.
        cx.env.reset();
        for (name, param) in proto.params.iter().zip(function.get_param_iter()) {
            cx.env.bind(name.as_str(), param.into_float_value());
        }

        let result = Self::emit_body(cx, function, body);
        cx.env.reset();

        Self::settle(cx, function, proto, reused, result)
    }

    /// Commit a generated body, or roll the module back if it failed.
    fn settle<'ctx>(
        cx: &CodegenContext<'ctx>,
        function: FunctionValue<'ctx>,
        proto: &Prototype,
        reused: bool,
        result: CodegenResult<()>,
    ) -> CodegenResult<FunctionValue<'ctx>> {
        match result {
            Ok(()) => {
                if reused {
                    name_params(function, &proto.params);
                }
                log::debug!("committed '{}'", proto.name);
                Ok(function)
            }
            Err(err) => {
                Self::discard(cx, function);
                log::debug!("discarded '{}': {err}", proto.name);
                Err(err)
            }
        }
    }

    fn emit_body<'ctx>(
        cx: &mut CodegenContext<'ctx>,
        function: FunctionValue<'ctx>,
        body: &Expr,
    ) -> CodegenResult<()> {
        let ret = codegen_expr(cx, body)?;
        cx.builder.build_return(Some(&ret))?;
        verify_function(function)
    }

    /// Roll back a failed definition.
    fn discard<'ctx>(cx: &CodegenContext<'ctx>, function: FunctionValue<'ctx>) {
        cx.builder.clear_insertion_position();
        for block in function.get_basic_blocks() {
            // SAFETY: the blocks were appended by this definition and
            // nothing outside the function refers to them.
            if unsafe { block.delete() }.is_err() {
                log::warn!(
                    "could not delete a block of '{}'",
                    function.get_name().to_string_lossy()
                );
            }
        }

        // With the body gone, any remaining use is a call from a committed
        // function, which only a reused declaration can have.
        if function.as_global_value().get_first_use().is_some() {
            log::debug!(
                "'{}' is still called elsewhere; keeping the declaration",
                function.get_name().to_string_lossy()
            );
            return;
        }

        // SAFETY: the function has no uses left.
        unsafe { function.delete() };
    }
}

fn verify_function(function: FunctionValue<'_>) -> CodegenResult<()> {
    if function.verify(false) {
        return Ok(());
    }
    Err(CodegenError::VerificationFailure {
        name: function.get_name().to_string_lossy().into_owned(),
    })
}

fn check_unique_params(proto: &Prototype) -> CodegenResult<()> {
    let mut seen = HashSet::new();
    for param in &proto.params {
        if !seen.insert(param.as_str()) {
            return Err(CodegenError::DuplicateParameter {
                function: proto.name.clone(),
                param: param.clone(),
            });
        }
    }
    Ok(())
}

fn check_arity(existing: FunctionValue<'_>, proto: &Prototype) -> CodegenResult<()> {
    let expected = existing.count_params() as usize;
    if expected != proto.params.len() {
        return Err(CodegenError::ArityMismatch {
            callee: proto.name.clone(),
            expected,
            found: proto.params.len(),
        });
    }
    Ok(())
}

fn name_params(function: FunctionValue<'_>, params: &[String]) {
    for (param, name) in function.get_param_iter().zip(params) {
        param.set_name(name);
    }
}
