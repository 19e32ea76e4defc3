/// Top-level program: the full compilation unit handed to codegen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<TopLevel>,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    /// `extern name(args)`: a declaration without a body.
    Extern(Prototype),
    /// `def name(args) body`
    Function(FunctionDef),
    /// A bare expression, evaluated in an anonymous nullary function.
    Expr(Expr),
}

/// Expression AST. Every node exclusively owns its children.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal like `1.0`.
    Number(f64),
    /// Reference to a function parameter.
    Variable(String),
    /// Binary operation. `op` is the operator symbol as written.
    Binary {
        op: char,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Direct call by name. Arity is checked at codegen time.
    Call { callee: String, args: Vec<Expr> },
}

/// A function's name and ordered parameter names.
///
/// Covers both `extern` declarations and the signature half of a `def`.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
}

/// A function definition: prototype plus body expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub proto: Prototype,
    pub body: Expr,
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Number(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn binary(op: char, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: callee.into(),
            args,
        }
    }
}

impl Prototype {
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Debug traversal
// ---------------------------------------------------------------------------

impl Program {
    /// Render the tree pre-order, one node per line, indented with one tab
    /// per level.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        line(&mut out, 0, "Program");
        for stmt in &self.statements {
            match stmt {
                TopLevel::Extern(proto) => visit_prototype(&mut out, proto, 1),
                TopLevel::Function(func) => visit_function(&mut out, func, 1),
                TopLevel::Expr(expr) => visit_expr(&mut out, expr, 1),
            }
        }
        out
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push('\t');
    }
    out.push_str(text);
    out.push('\n');
}

fn visit_function(out: &mut String, func: &FunctionDef, depth: usize) {
    line(out, depth, "Function");
    visit_prototype(out, &func.proto, depth + 1);
    visit_expr(out, &func.body, depth + 1);
}

fn visit_prototype(out: &mut String, proto: &Prototype, depth: usize) {
    let text = format!("Prototype {}({})", proto.name, proto.params.join(", "));
    line(out, depth, &text);
}

fn visit_expr(out: &mut String, expr: &Expr, depth: usize) {
    match expr {
        Expr::Number(value) => line(out, depth, &format!("Number {value}")),
        Expr::Variable(name) => line(out, depth, &format!("Variable {name}")),
        Expr::Binary { op, lhs, rhs } => {
            line(out, depth, "Binary");
            visit_expr(out, lhs, depth + 1);
            line(out, depth + 1, &op.to_string());
            visit_expr(out, rhs, depth + 1);
        }
        Expr::Call { callee, args } => {
            line(out, depth, &format!("Call {callee}"));
            for arg in args {
                visit_expr(out, arg, depth + 1);
            }
        }
    }
}
