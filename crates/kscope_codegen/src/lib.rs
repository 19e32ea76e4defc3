pub mod call;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod function;

use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::{AnyValue, FunctionValue};
use kscope_frontend::{Program, TopLevel};

pub use crate::context::{ANON_EXPR_NAME, CodegenContext, Environment};
pub use crate::diagnostics::{CollectingSink, DiagnosticSink, StderrSink};
pub use crate::error::{CodegenError, CodegenResult};

use crate::function::FunctionCodegen;

/// Outcome of lowering a whole program.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CodegenReport {
    /// Names of functions declared or committed, in statement order.
    pub generated: Vec<String>,
    /// Number of top-level statements that failed.
    pub failed: usize,
}

/// The code generator: one [`CodegenContext`] plus the diagnostics sink that
/// receives every statement-level failure.
///
/// Usage:
/// ```ignore
/// let context = Context::create();
/// let mut codegen = CodeGenerator::new(&context, "main", StderrSink);
/// codegen.compile(&program);
/// let module = codegen.into_module();
/// ```
pub struct CodeGenerator<'ctx, D: DiagnosticSink = StderrSink> {
    cx: CodegenContext<'ctx>,
    diagnostics: D,
}

impl<'ctx, D: DiagnosticSink> CodeGenerator<'ctx, D> {
    /// Create a code generator with an empty module.
    pub fn new(context: &'ctx Context, module_name: &str, diagnostics: D) -> Self {
        Self {
            cx: CodegenContext::new(context, module_name),
            diagnostics,
        }
    }

    /// Lower every top-level statement in source order.
    ///
    /// A failing statement is reported to the sink and skipped; it never stops
    /// the statements after it.
    pub fn compile(&mut self, program: &Program) -> CodegenReport {
        let mut report = CodegenReport::default();

        for stmt in &program.statements {
            match self.codegen_top_level(stmt) {
                Ok(function) => {
                    log::debug!(
                        "read function definition:\n{}",
                        function.print_to_string().to_string().trim_end()
                    );
                    report
                        .generated
                        .push(function.get_name().to_string_lossy().into_owned());
                }
                Err(err) => {
                    self.diagnostics.report(&err);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Lower a single top-level statement. Errors are returned, not reported.
    pub fn codegen_top_level(&mut self, stmt: &TopLevel) -> CodegenResult<FunctionValue<'ctx>> {
        match stmt {
            TopLevel::Extern(proto) => FunctionCodegen::build_prototype(&mut self.cx, proto),
            TopLevel::Function(def) => FunctionCodegen::build_function(&mut self.cx, def),
            TopLevel::Expr(expr) => FunctionCodegen::build_anonymous(&mut self.cx, expr),
        }
    }

    pub fn context(&self) -> &CodegenContext<'ctx> {
        &self.cx
    }

    /// Return a reference to the module (e.g. for verification).
    pub fn module(&self) -> &Module<'ctx> {
        self.cx.module()
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Consume the code generator and return the LLVM module.
    pub fn into_module(self) -> Module<'ctx> {
        self.cx.into_module()
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use kscope_frontend::{Expr, FunctionDef, Prototype, parse_program};

    use super::*;

    fn compile<'c>(context: &'c Context, source: &str) -> (CodeGenerator<'c, CollectingSink>, CodegenReport) {
        let program = parse_program(source).unwrap();
        let mut codegen = CodeGenerator::new(context, "test", CollectingSink::new());
        let report = codegen.compile(&program);
        (codegen, report)
    }

    fn function_ir(codegen: &CodeGenerator<'_, CollectingSink>, name: &str) -> String {
        codegen
            .module()
            .get_function(name)
            .unwrap_or_else(|| panic!("function {name} missing"))
            .print_to_string()
            .to_string()
    }

    #[test]
    fn test_empty_program() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "");
        assert_eq!(report, CodegenReport::default());
        assert!(codegen.module().verify().is_ok());
        assert!(codegen.module().get_first_function().is_none());
    }

    #[test]
    fn test_function_with_folded_constant() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "def f(x) { x + 2.0 * 3.0 }");

        assert_eq!(report.generated, vec!["f".to_string()]);
        expect![[r#"
            define double @f(double %x) {
            entry:
              %addtmp = fadd double %x, 6.000000e+00
              ret double %addtmp
            }
        "#]]
        .assert_eq(function_ir(&codegen, "f").trim_start());
    }

    #[test]
    fn test_mul_then_add_order() {
        let context = Context::create();
        let (codegen, _) = compile(&context, "def g(x y) x + y * x");

        let ir = function_ir(&codegen, "g");
        let mul = ir.find("%multmp = fmul double %y, %x").expect("fmul emitted");
        let add = ir.find("%addtmp = fadd double %x, %multmp").expect("fadd emitted");
        assert!(mul < add);
        assert!(ir.contains("ret double %addtmp"));
    }

    #[test]
    fn test_comparison_widens_to_double() {
        let context = Context::create();
        let (codegen, _) = compile(&context, "def lt(a b) a < b");

        let ir = function_ir(&codegen, "lt");
        assert!(ir.contains("%cmptmp = fcmp ult double %a, %b"), "{ir}");
        assert!(ir.contains("%booltmp = uitofp i1 %cmptmp to double"), "{ir}");
        assert!(ir.contains("ret double %booltmp"), "{ir}");
    }

    #[test]
    fn test_extern_then_call() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "extern sin(x)\nsin(5.0)");

        assert_eq!(report.generated, vec!["sin".to_string(), ANON_EXPR_NAME.to_string()]);
        assert_eq!(report.failed, 0);
        let ir = function_ir(&codegen, ANON_EXPR_NAME);
        assert!(ir.contains("%calltmp = call double @sin(double 5.000000e+00)"), "{ir}");
        assert!(codegen.module().verify().is_ok());
    }

    #[test]
    fn test_unknown_function_does_not_stop_run() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "cos(3.0)\ndef one() 1.0");

        assert_eq!(report.failed, 1);
        assert_eq!(report.generated, vec!["one".to_string()]);
        assert_eq!(
            codegen.diagnostics().messages(),
            &["unknown function referenced: 'cos'".to_string()]
        );
        // The failed wrapper left nothing behind.
        assert!(codegen.module().get_function(ANON_EXPR_NAME).is_none());
        assert_eq!(codegen.module().get_functions().count(), 1);
    }

    #[test]
    fn test_extern_then_def_is_one_function() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "extern foo(a, b)\ndef foo(a, b) a + b");

        assert_eq!(report.failed, 0);
        assert_eq!(codegen.module().get_functions().count(), 1);
        let foo = codegen.module().get_function("foo").unwrap();
        assert_eq!(foo.count_basic_blocks(), 1);
    }

    #[test]
    fn test_failed_definition_leaves_no_function() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "def bad(x) x + y");

        assert_eq!(report.failed, 1);
        assert!(codegen.module().get_function("bad").is_none());
        assert_eq!(
            codegen.diagnostics().messages(),
            &["unknown variable name 'y'".to_string()]
        );
    }

    #[test]
    fn test_failed_definition_of_extern_leaves_no_function() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "extern foo(a)\ndef foo(a) a + b");

        assert_eq!(report.generated, vec!["foo".to_string()]);
        assert_eq!(report.failed, 1);
        assert!(codegen.module().get_function("foo").is_none());
        assert!(!codegen.module().print_to_string().to_string().contains("@foo"));
    }

    #[test]
    fn test_arity_mismatch_emits_no_arguments() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "def two(a b) a\ndef caller(x) two(x * x)");

        assert_eq!(report.failed, 1);
        assert_eq!(
            codegen.diagnostics().messages(),
            &["incorrect number of arguments for 'two': expected 2, found 1".to_string()]
        );
        assert!(codegen.module().get_function("caller").is_none());
        assert!(!codegen.module().print_to_string().to_string().contains("fmul"));
    }

    #[test]
    fn test_one_diagnostic_per_failure() {
        let context = Context::create();
        let (codegen, report) = compile(&context, "def f(x) g(y + z)\nq\n");

        // `g` is unknown, so `y` and `z` are never looked at.
        assert_eq!(report.failed, 2);
        assert_eq!(
            codegen.diagnostics().messages(),
            &[
                "unknown function referenced: 'g'".to_string(),
                "unknown variable name 'q'".to_string(),
            ]
        );
    }

    #[test]
    fn test_invalid_operator_from_constructed_ast() {
        let context = Context::create();
        let mut codegen = CodeGenerator::new(&context, "test", CollectingSink::new());
        let program = Program {
            statements: vec![TopLevel::Function(FunctionDef {
                proto: Prototype::new("div", &["a", "b"]),
                body: Expr::binary('/', Expr::var("a"), Expr::var("b")),
            })],
        };

        let report = codegen.compile(&program);
        assert_eq!(report.failed, 1);
        assert_eq!(
            codegen.diagnostics().messages(),
            &["invalid binary operator '/'".to_string()]
        );
        assert!(codegen.module().get_function("div").is_none());
    }

    #[test]
    fn test_calls_between_definitions() {
        let context = Context::create();
        let source = "\
            extern sin(x)\n\
            def sq(x) x * x\n\
            def f(a b) sq(a) + sin(b)\n\
            f(1, 2)\n\
            f(3, 4)\n";
        let (codegen, report) = compile(&context, source);

        assert_eq!(report.failed, 0);
        assert_eq!(
            report.generated,
            vec!["sin", "sq", "f", "__anon_expr", "__anon_expr.1"]
        );
        assert!(codegen.module().verify().is_ok());

        let ir = function_ir(&codegen, "f");
        assert!(ir.contains("call double @sq(double %a)"), "{ir}");
        assert!(ir.contains("call double @sin(double %b)"), "{ir}");
    }

    #[test]
    fn test_top_level_literal() {
        let context = Context::create();
        let (codegen, _) = compile(&context, "5.2");

        expect![[r#"
            define double @__anon_expr() {
            entry:
              ret double 5.200000e+00
            }
        "#]]
        .assert_eq(function_ir(&codegen, ANON_EXPR_NAME).trim_start());
    }

    #[test]
    fn test_separate_generators_do_not_share_state() {
        let context = Context::create();
        let (first, _) = compile(&context, "extern sin(x)");
        let (second, report) = compile(&context, "sin(1.0)");

        assert!(first.module().get_function("sin").is_some());
        assert_eq!(report.failed, 1);
        assert!(second.module().get_function("sin").is_none());
    }
}
