use std::collections::HashMap;

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::FloatType;
use inkwell::values::FloatValue;

/// Name of the nullary wrapper generated for a bare top-level expression.
pub const ANON_EXPR_NAME: &str = "__anon_expr";

/// Parameter bindings of the function currently being generated.
///
/// Flat and non-nested: no closures, no globals, no block scopes. Cleared at
/// the start of every function body.
#[derive(Debug, Default)]
pub struct Environment<'ctx> {
    bindings: HashMap<String, FloatValue<'ctx>>,
}

impl<'ctx> Environment<'ctx> {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Drop every binding left over from a previous function.
    pub fn reset(&mut self) {
        self.bindings.clear();
    }

    pub fn bind(&mut self, name: impl Into<String>, value: FloatValue<'ctx>) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<FloatValue<'ctx>> {
        self.bindings.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// All mutable state threaded through codegen for one compilation run:
/// the accumulating module, the insertion cursor, and the environment.
///
/// Created once per run by the caller. Nothing here is global, so separate
/// contexts are fully independent.
pub struct CodegenContext<'ctx> {
    pub(crate) llvm: &'ctx Context,
    pub(crate) module: Module<'ctx>,
    pub(crate) builder: Builder<'ctx>,
    pub(crate) env: Environment<'ctx>,
    /// Number of anonymous expression wrappers emitted so far.
    anon_count: usize,
}

impl<'ctx> CodegenContext<'ctx> {
    pub fn new(llvm: &'ctx Context, module_name: &str) -> Self {
        Self {
            llvm,
            module: llvm.create_module(module_name),
            builder: llvm.create_builder(),
            env: Environment::new(),
            anon_count: 0,
        }
    }

    /// The single scalar type of the language.
    pub fn scalar_type(&self) -> FloatType<'ctx> {
        self.llvm.f64_type()
    }

    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    pub fn into_module(self) -> Module<'ctx> {
        self.module
    }

    pub fn env(&self) -> &Environment<'ctx> {
        &self.env
    }

    /// Reserve a unique name for the next anonymous expression wrapper:
    /// `__anon_expr`, then `__anon_expr.1`, `__anon_expr.2`, ...
    pub(crate) fn next_anon_name(&mut self) -> String {
        let name = match self.anon_count {
            0 => ANON_EXPR_NAME.to_string(),
            n => format!("{ANON_EXPR_NAME}.{n}"),
        };
        self.anon_count += 1;
        name
    }
}
