use crate::token::{Literal, Token};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Assign(Assign),
    Binary(Binary),
    Call(Call),
    Get(Get),
    Grouping(Grouping),
    Literal(LiteralExpr),
    Logical(Logical),
    Set(Set),
    Super(Super),
    This(This),
    Unary(Unary),
    Variable(Variable),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assign {
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binary {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    pub callee: Box<Expr>,
    /// Closing parenthesis, kept for runtime error locations.
    pub paren: Token,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Get {
    pub object: Box<Expr>,
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouping {
    pub expression: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralExpr {
    pub value: Literal,
}

/// `and` / `or`; separate from `Binary` because both short-circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Logical {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Set {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Super {
    pub keyword: Token,
    pub method: Token,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct This {
    pub keyword: Token,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unary {
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: Token,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Block(Block),
    Class(Class),
    Expression(Expression),
    Function(Function),
    If(If),
    Print(Print),
    Return(Return),
    Var(Var),
    While(While),
}

/// Owns a new lexical scope once evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    pub name: Token,
    pub superclass: Option<Variable>,
    pub methods: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub expression: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct If {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Print {
    pub expression: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Return {
    pub keyword: Token,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Var {
    pub name: Token,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct While {
    pub condition: Expr,
    pub body: Box<Stmt>,
}

pub trait ExprVisitor {
    type Output;

    fn visit_assign(&mut self, expr: &Assign) -> Self::Output;
    fn visit_binary(&mut self, expr: &Binary) -> Self::Output;
    fn visit_call(&mut self, expr: &Call) -> Self::Output;
    fn visit_get(&mut self, expr: &Get) -> Self::Output;
    fn visit_grouping(&mut self, expr: &Grouping) -> Self::Output;
    fn visit_literal(&mut self, expr: &LiteralExpr) -> Self::Output;
    fn visit_logical(&mut self, expr: &Logical) -> Self::Output;
    fn visit_set(&mut self, expr: &Set) -> Self::Output;
    fn visit_super(&mut self, expr: &Super) -> Self::Output;
    fn visit_this(&mut self, expr: &This) -> Self::Output;
    fn visit_unary(&mut self, expr: &Unary) -> Self::Output;
    fn visit_variable(&mut self, expr: &Variable) -> Self::Output;
}

pub trait StmtVisitor {
    type Output;

    fn visit_block(&mut self, stmt: &Block) -> Self::Output;
    fn visit_class(&mut self, stmt: &Class) -> Self::Output;
    fn visit_expression(&mut self, stmt: &Expression) -> Self::Output;
    fn visit_function(&mut self, stmt: &Function) -> Self::Output;
    fn visit_if(&mut self, stmt: &If) -> Self::Output;
    fn visit_print(&mut self, stmt: &Print) -> Self::Output;
    fn visit_return(&mut self, stmt: &Return) -> Self::Output;
    fn visit_var(&mut self, stmt: &Var) -> Self::Output;
    fn visit_while(&mut self, stmt: &While) -> Self::Output;
}

impl Expr {
    pub fn accept<V: ExprVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Assign(expr) => visitor.visit_assign(expr),
            Expr::Binary(expr) => visitor.visit_binary(expr),
            Expr::Call(expr) => visitor.visit_call(expr),
            Expr::Get(expr) => visitor.visit_get(expr),
            Expr::Grouping(expr) => visitor.visit_grouping(expr),
            Expr::Literal(expr) => visitor.visit_literal(expr),
            Expr::Logical(expr) => visitor.visit_logical(expr),
            Expr::Set(expr) => visitor.visit_set(expr),
            Expr::Super(expr) => visitor.visit_super(expr),
            Expr::This(expr) => visitor.visit_this(expr),
            Expr::Unary(expr) => visitor.visit_unary(expr),
            Expr::Variable(expr) => visitor.visit_variable(expr),
        }
    }

    pub fn literal(value: Literal) -> Self {
        Expr::Literal(LiteralExpr { value })
    }
}

impl Stmt {
    pub fn accept<V: StmtVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Stmt::Block(stmt) => visitor.visit_block(stmt),
            Stmt::Class(stmt) => visitor.visit_class(stmt),
            Stmt::Expression(stmt) => visitor.visit_expression(stmt),
            Stmt::Function(stmt) => visitor.visit_function(stmt),
            Stmt::If(stmt) => visitor.visit_if(stmt),
            Stmt::Print(stmt) => visitor.visit_print(stmt),
            Stmt::Return(stmt) => visitor.visit_return(stmt),
            Stmt::Var(stmt) => visitor.visit_var(stmt),
            Stmt::While(stmt) => visitor.visit_while(stmt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Kind;

    /// Counts nodes of each family to check that dispatch reaches every child.
    struct NodeCounter {
        exprs: usize,
        stmts: usize,
    }

    impl ExprVisitor for NodeCounter {
        type Output = ();

        fn visit_assign(&mut self, expr: &Assign) {
            self.exprs += 1;
            expr.value.accept(self);
        }

        fn visit_binary(&mut self, expr: &Binary) {
            self.exprs += 1;
            expr.left.accept(self);
            expr.right.accept(self);
        }

        fn visit_call(&mut self, expr: &Call) {
            self.exprs += 1;
            expr.callee.accept(self);
            for argument in &expr.arguments {
                argument.accept(self);
            }
        }

        fn visit_get(&mut self, expr: &Get) {
            self.exprs += 1;
            expr.object.accept(self);
        }

        fn visit_grouping(&mut self, expr: &Grouping) {
            self.exprs += 1;
            expr.expression.accept(self);
        }

        fn visit_literal(&mut self, _expr: &LiteralExpr) {
            self.exprs += 1;
        }

        fn visit_logical(&mut self, expr: &Logical) {
            self.exprs += 1;
            expr.left.accept(self);
            expr.right.accept(self);
        }

        fn visit_set(&mut self, expr: &Set) {
            self.exprs += 1;
            expr.object.accept(self);
            expr.value.accept(self);
        }

        fn visit_super(&mut self, _expr: &Super) {
            self.exprs += 1;
        }

        fn visit_this(&mut self, _expr: &This) {
            self.exprs += 1;
        }

        fn visit_unary(&mut self, expr: &Unary) {
            self.exprs += 1;
            expr.right.accept(self);
        }

        fn visit_variable(&mut self, _expr: &Variable) {
            self.exprs += 1;
        }
    }

    impl StmtVisitor for NodeCounter {
        type Output = ();

        fn visit_block(&mut self, stmt: &Block) {
            self.stmts += 1;
            for s in &stmt.statements {
                s.accept(self);
            }
        }

        fn visit_class(&mut self, stmt: &Class) {
            self.stmts += 1;
            for method in &stmt.methods {
                self.visit_function(method);
            }
        }

        fn visit_expression(&mut self, stmt: &Expression) {
            self.stmts += 1;
            stmt.expression.accept(self);
        }

        fn visit_function(&mut self, stmt: &Function) {
            self.stmts += 1;
            for s in &stmt.body {
                s.accept(self);
            }
        }

        fn visit_if(&mut self, stmt: &If) {
            self.stmts += 1;
            stmt.condition.accept(self);
            stmt.then_branch.accept(self);
            if let Some(else_branch) = &stmt.else_branch {
                else_branch.accept(self);
            }
        }

        fn visit_print(&mut self, stmt: &Print) {
            self.stmts += 1;
            stmt.expression.accept(self);
        }

        fn visit_return(&mut self, stmt: &Return) {
            self.stmts += 1;
            if let Some(value) = &stmt.value {
                value.accept(self);
            }
        }

        fn visit_var(&mut self, stmt: &Var) {
            self.stmts += 1;
            if let Some(initializer) = &stmt.initializer {
                initializer.accept(self);
            }
        }

        fn visit_while(&mut self, stmt: &While) {
            self.stmts += 1;
            stmt.condition.accept(self);
            stmt.body.accept(self);
        }
    }

    fn ident(name: &str) -> Token {
        Token::new(Kind::Identifier, name, None, 1)
    }

    #[test]
    fn accept_dispatches_to_matching_variant() {
        // if (a) { print -1; } else b = 2;
        let tree = Stmt::If(If {
            condition: Expr::Variable(Variable { name: ident("a") }),
            then_branch: Box::new(Stmt::Block(Block {
                statements: vec![Stmt::Print(Print {
                    expression: Expr::Unary(Unary {
                        operator: Token::new(Kind::Minus, "-", None, 1),
                        right: Box::new(Expr::literal(Literal::Number(1.0))),
                    }),
                })],
            })),
            else_branch: Some(Box::new(Stmt::Expression(Expression {
                expression: Expr::Assign(Assign {
                    name: ident("b"),
                    value: Box::new(Expr::literal(Literal::Number(2.0))),
                }),
            }))),
        });

        let mut counter = NodeCounter { exprs: 0, stmts: 0 };
        tree.accept(&mut counter);

        assert_eq!(counter.stmts, 4);
        assert_eq!(counter.exprs, 5);
    }
}
