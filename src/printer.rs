use crate::ast::{
    Assign, Binary, Block, Call, Class, Expr, ExprVisitor, Expression, Function, Get, Grouping,
    If, LiteralExpr, Logical, Print, Return, Set, Stmt, StmtVisitor, Super, This, Unary, Var,
    Variable, While,
};
use crate::token::Literal;

/// Digits past `f64::MAX`; the lexer decodes this back to infinity.
const INFINITE_DIGITS: usize = 309;

fn literal_text(value: &Literal) -> String {
    match value {
        Literal::Number(n) if n.is_infinite() => format!("1{}", "0".repeat(INFINITE_DIGITS)),
        Literal::Number(n) => n.to_string(),
        Literal::Str(s) => format!("\"{}\"", s),
        Literal::Bool(b) => b.to_string(),
        Literal::Nil => "nil".to_string(),
    }
}

/// Lisp-style dump of the tree, e.g. `(* (- 123) (group 45.67))`.
#[derive(Debug, Default)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_expr(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }

    pub fn print_program(&mut self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut out = format!("({}", name);
        for expr in exprs {
            out.push(' ');
            out.push_str(&expr.accept(self));
        }
        out.push(')');
        out
    }

    fn parenthesize_parts(name: &str, parts: &[String]) -> String {
        if parts.is_empty() {
            format!("({})", name)
        } else {
            format!("({} {})", name, parts.join(" "))
        }
    }

    fn body(&mut self, statements: &[Stmt]) -> Vec<String> {
        statements.iter().map(|stmt| stmt.accept(self)).collect()
    }
}

impl ExprVisitor for AstPrinter {
    type Output = String;

    fn visit_assign(&mut self, expr: &Assign) -> String {
        let name = expr.name.lexeme.clone();
        let value = expr.value.accept(self);
        Self::parenthesize_parts("=", &[name, value])
    }

    fn visit_binary(&mut self, expr: &Binary) -> String {
        self.parenthesize(&expr.operator.lexeme, &[&*expr.left, &*expr.right])
    }

    fn visit_call(&mut self, expr: &Call) -> String {
        let mut exprs: Vec<&Expr> = vec![&*expr.callee];
        exprs.extend(expr.arguments.iter());
        self.parenthesize("call", &exprs)
    }

    fn visit_get(&mut self, expr: &Get) -> String {
        let object = expr.object.accept(self);
        Self::parenthesize_parts(".", &[object, expr.name.lexeme.clone()])
    }

    fn visit_grouping(&mut self, expr: &Grouping) -> String {
        self.parenthesize("group", &[&*expr.expression])
    }

    fn visit_literal(&mut self, expr: &LiteralExpr) -> String {
        literal_text(&expr.value)
    }

    fn visit_logical(&mut self, expr: &Logical) -> String {
        self.parenthesize(&expr.operator.lexeme, &[&*expr.left, &*expr.right])
    }

    fn visit_set(&mut self, expr: &Set) -> String {
        let object = expr.object.accept(self);
        let target = Self::parenthesize_parts(".", &[object, expr.name.lexeme.clone()]);
        let value = expr.value.accept(self);
        Self::parenthesize_parts("=", &[target, value])
    }

    fn visit_super(&mut self, expr: &Super) -> String {
        Self::parenthesize_parts("super", &[expr.method.lexeme.clone()])
    }

    fn visit_this(&mut self, _expr: &This) -> String {
        "this".to_string()
    }

    fn visit_unary(&mut self, expr: &Unary) -> String {
        self.parenthesize(&expr.operator.lexeme, &[&*expr.right])
    }

    fn visit_variable(&mut self, expr: &Variable) -> String {
        expr.name.lexeme.clone()
    }
}

impl StmtVisitor for AstPrinter {
    type Output = String;

    fn visit_block(&mut self, stmt: &Block) -> String {
        let parts = self.body(&stmt.statements);
        Self::parenthesize_parts("block", &parts)
    }

    fn visit_class(&mut self, stmt: &Class) -> String {
        let mut parts = vec![stmt.name.lexeme.clone()];
        if let Some(superclass) = &stmt.superclass {
            parts.push("<".to_string());
            parts.push(superclass.name.lexeme.clone());
        }
        for method in &stmt.methods {
            parts.push(self.visit_function(method));
        }
        Self::parenthesize_parts("class", &parts)
    }

    fn visit_expression(&mut self, stmt: &Expression) -> String {
        self.parenthesize(";", &[&stmt.expression])
    }

    fn visit_function(&mut self, stmt: &Function) -> String {
        let params: Vec<String> = stmt.params.iter().map(|p| p.lexeme.clone()).collect();
        let mut parts = vec![
            stmt.name.lexeme.clone(),
            format!("({})", params.join(" ")),
        ];
        parts.extend(self.body(&stmt.body));
        Self::parenthesize_parts("fun", &parts)
    }

    fn visit_if(&mut self, stmt: &If) -> String {
        let mut parts = vec![stmt.condition.accept(self), stmt.then_branch.accept(self)];
        if let Some(else_branch) = &stmt.else_branch {
            parts.push(else_branch.accept(self));
        }
        Self::parenthesize_parts("if", &parts)
    }

    fn visit_print(&mut self, stmt: &Print) -> String {
        self.parenthesize("print", &[&stmt.expression])
    }

    fn visit_return(&mut self, stmt: &Return) -> String {
        match &stmt.value {
            Some(value) => self.parenthesize("return", &[value]),
            None => "(return)".to_string(),
        }
    }

    fn visit_var(&mut self, stmt: &Var) -> String {
        let mut parts = vec![stmt.name.lexeme.clone()];
        if let Some(initializer) = &stmt.initializer {
            parts.push(initializer.accept(self));
        }
        Self::parenthesize_parts("var", &parts)
    }

    fn visit_while(&mut self, stmt: &While) -> String {
        let parts = vec![stmt.condition.accept(self), stmt.body.accept(self)];
        Self::parenthesize_parts("while", &parts)
    }
}

/// Prints the tree back as source that scans and parses again.
///
/// Every compound expression is fully parenthesized and `Grouping` nodes print
/// only their contents, so printing a re-parsed tree yields the same text.
#[derive(Debug, Default)]
pub struct SourcePrinter;

impl SourcePrinter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_expr(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_program(&mut self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| stmt.accept(self))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn braced(&mut self, statements: &[Stmt]) -> String {
        if statements.is_empty() {
            return "{ }".to_string();
        }
        let inner: Vec<String> = statements.iter().map(|stmt| stmt.accept(self)).collect();
        format!("{{ {} }}", inner.join(" "))
    }

    fn signature(&mut self, function: &Function) -> String {
        let params: Vec<&str> = function.params.iter().map(|p| p.lexeme.as_str()).collect();
        format!(
            "{}({}) {}",
            function.name.lexeme,
            params.join(", "),
            self.braced(&function.body)
        )
    }
}

impl ExprVisitor for SourcePrinter {
    type Output = String;

    fn visit_assign(&mut self, expr: &Assign) -> String {
        format!("({} = {})", expr.name.lexeme, expr.value.accept(self))
    }

    fn visit_binary(&mut self, expr: &Binary) -> String {
        format!(
            "({} {} {})",
            expr.left.accept(self),
            expr.operator.lexeme,
            expr.right.accept(self)
        )
    }

    fn visit_call(&mut self, expr: &Call) -> String {
        let callee = expr.callee.accept(self);
        let arguments: Vec<String> = expr.arguments.iter().map(|a| a.accept(self)).collect();
        format!("{}({})", callee, arguments.join(", "))
    }

    fn visit_get(&mut self, expr: &Get) -> String {
        format!("{}.{}", expr.object.accept(self), expr.name.lexeme)
    }

    fn visit_grouping(&mut self, expr: &Grouping) -> String {
        expr.expression.accept(self)
    }

    fn visit_literal(&mut self, expr: &LiteralExpr) -> String {
        literal_text(&expr.value)
    }

    fn visit_logical(&mut self, expr: &Logical) -> String {
        format!(
            "({} {} {})",
            expr.left.accept(self),
            expr.operator.lexeme,
            expr.right.accept(self)
        )
    }

    fn visit_set(&mut self, expr: &Set) -> String {
        format!(
            "({}.{} = {})",
            expr.object.accept(self),
            expr.name.lexeme,
            expr.value.accept(self)
        )
    }

    fn visit_super(&mut self, expr: &Super) -> String {
        format!("super.{}", expr.method.lexeme)
    }

    fn visit_this(&mut self, _expr: &This) -> String {
        "this".to_string()
    }

    fn visit_unary(&mut self, expr: &Unary) -> String {
        format!("({}{})", expr.operator.lexeme, expr.right.accept(self))
    }

    fn visit_variable(&mut self, expr: &Variable) -> String {
        expr.name.lexeme.clone()
    }
}

impl StmtVisitor for SourcePrinter {
    type Output = String;

    fn visit_block(&mut self, stmt: &Block) -> String {
        self.braced(&stmt.statements)
    }

    fn visit_class(&mut self, stmt: &Class) -> String {
        let mut out = format!("class {}", stmt.name.lexeme);
        if let Some(superclass) = &stmt.superclass {
            out.push_str(&format!(" < {}", superclass.name.lexeme));
        }
        let methods: Vec<String> = stmt.methods.iter().map(|m| self.signature(m)).collect();
        if methods.is_empty() {
            out.push_str(" { }");
        } else {
            out.push_str(&format!(" {{ {} }}", methods.join(" ")));
        }
        out
    }

    fn visit_expression(&mut self, stmt: &Expression) -> String {
        format!("{};", stmt.expression.accept(self))
    }

    fn visit_function(&mut self, stmt: &Function) -> String {
        format!("fun {}", self.signature(stmt))
    }

    fn visit_if(&mut self, stmt: &If) -> String {
        let mut out = format!(
            "if ({}) {}",
            stmt.condition.accept(self),
            stmt.then_branch.accept(self)
        );
        if let Some(else_branch) = &stmt.else_branch {
            out.push_str(&format!(" else {}", else_branch.accept(self)));
        }
        out
    }

    fn visit_print(&mut self, stmt: &Print) -> String {
        format!("print {};", stmt.expression.accept(self))
    }

    fn visit_return(&mut self, stmt: &Return) -> String {
        match &stmt.value {
            Some(value) => format!("return {};", value.accept(self)),
            None => "return;".to_string(),
        }
    }

    fn visit_var(&mut self, stmt: &Var) -> String {
        match &stmt.initializer {
            Some(initializer) => format!("var {} = {};", stmt.name.lexeme, initializer.accept(self)),
            None => format!("var {};", stmt.name.lexeme),
        }
    }

    fn visit_while(&mut self, stmt: &While) -> String {
        format!(
            "while ({}) {}",
            stmt.condition.accept(self),
            stmt.body.accept(self)
        )
    }
}
