use crate::ast::{
    Assign, Binary, Block, Call, Class, Expr, Expression, Function, Get, Grouping, If, Logical,
    Print, Return, Set, Stmt, Super, This, Unary, Var, Variable, While,
};
use crate::error::SyntaxError;
use crate::token::{Kind, Literal, Token};
use log::{debug, info};

/// Calling-convention limit shared with the evaluator. Exceeding it is reported but not fatal.
pub const MAX_ARGUMENTS: usize = 255;

/// Deepest allowed nesting of statements and expressions. Deeper input is reported
/// as "Too much nesting." instead of exhausting the stack.
pub const MAX_NESTING: usize = 100;

/// Unwinds a production up to the enclosing `declaration`, which resynchronizes.
/// The error itself has already been reported by the time this is returned.
#[derive(Debug)]
struct ParseFailure;

type ParseResult<T> = Result<T, ParseFailure>;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    on_error: &'a mut dyn FnMut(SyntaxError),
}

impl<'a> Parser<'a> {
    /// `tokens` must end with an `Eof` token, as produced by the lexer.
    pub fn new(mut tokens: Vec<Token>, on_error: &'a mut dyn FnMut(SyntaxError)) -> Self {
        if tokens.last().map(|t| t.kind) != Some(Kind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(Kind::Eof, "", None, line));
        }

        Self {
            tokens,
            current: 0,
            depth: 0,
            on_error,
        }
    }

    pub fn parse(mut self) -> Vec<Stmt> {
        info!("parsing {} tokens", self.tokens.len());
        let mut statements = Vec::new();

        while !self.is_eof() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        info!("parsed {} top-level statements", statements.len());
        statements
    }

    fn at(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_eof(&self) -> bool {
        self.at().kind == Kind::Eof
    }

    fn check(&self, kind: Kind) -> bool {
        !self.is_eof() && self.at().kind == kind
    }

    fn next_token(&mut self) -> Token {
        if !self.is_eof() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn matches(&mut self, kinds: &[Kind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.next_token();
            return true;
        }
        false
    }

    fn eat(&mut self, expecting: Kind, message: &str) -> ParseResult<Token> {
        if self.check(expecting) {
            return Ok(self.next_token());
        }

        let token = self.at().clone();
        Err(self.error(&token, message))
    }

    fn error(&mut self, token: &Token, message: &str) -> ParseFailure {
        (self.on_error)(SyntaxError::from_token(token, message));
        ParseFailure
    }

    /// Runs one nested production, failing once `MAX_NESTING` levels are open.
    fn nested<T>(&mut self, production: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            let token = self.at().clone();
            return Err(self.error(&token, "Too much nesting."));
        }

        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn synchronize(&mut self) {
        let from = self.current;
        self.next_token();

        while !self.is_eof() {
            if self.previous().kind == Kind::Semicolon {
                break;
            }

            match self.at().kind {
                Kind::Class
                | Kind::Fun
                | Kind::Var
                | Kind::For
                | Kind::If
                | Kind::While
                | Kind::Print
                | Kind::Return => break,
                _ => {
                    self.next_token();
                }
            }
        }

        debug!(
            "synchronized: skipped tokens {}..{} (resuming at line {})",
            from,
            self.current,
            self.at().line
        );
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(&[Kind::Class]) {
            self.class_declaration()
        } else if self.matches(&[Kind::Fun]) {
            self.function("function").map(Stmt::Function)
        } else if self.matches(&[Kind::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseFailure) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.eat(Kind::Identifier, "Expect class name.")?;

        let superclass = if self.matches(&[Kind::Less]) {
            let name = self.eat(Kind::Identifier, "Expect superclass name.")?;
            Some(Variable { name })
        } else {
            None
        };

        self.eat(Kind::LeftBrace, "Expect '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(Kind::RightBrace) && !self.is_eof() {
            methods.push(self.function("method")?);
        }

        self.eat(Kind::RightBrace, "Expect '}' after class body.")?;
        debug!("class {} with {} methods", name.lexeme, methods.len());

        Ok(Stmt::Class(Class {
            name,
            superclass,
            methods,
        }))
    }

    fn function(&mut self, kind: &str) -> ParseResult<Function> {
        let name = self.eat(Kind::Identifier, &format!("Expect {} name.", kind))?;
        self.eat(Kind::LeftParen, &format!("Expect '(' after {} name.", kind))?;

        let mut params = Vec::new();
        if !self.check(Kind::RightParen) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let token = self.at().clone();
                    self.error(&token, "Can't have more than 255 parameters.");
                }
                params.push(self.eat(Kind::Identifier, "Expect parameter name.")?);

                if !self.matches(&[Kind::Comma]) {
                    break;
                }
            }
        }

        self.eat(Kind::RightParen, "Expect ')' after parameters.")?;
        self.eat(Kind::LeftBrace, &format!("Expect '{{' before {} body.", kind))?;
        let body = self.block()?;

        Ok(Function { name, params, body })
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.eat(Kind::Identifier, "Expect variable name.")?;

        let initializer = if self.matches(&[Kind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.eat(Kind::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(Var { name, initializer }))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::statement_body)
    }

    fn statement_body(&mut self) -> ParseResult<Stmt> {
        match self.at().kind {
            Kind::For => {
                self.next_token();
                self.for_statement()
            }
            Kind::If => {
                self.next_token();
                self.if_statement()
            }
            Kind::Print => {
                self.next_token();
                let expression = self.expression()?;
                self.eat(Kind::Semicolon, "Expect ';' after value.")?;
                Ok(Stmt::Print(Print { expression }))
            }
            Kind::Return => {
                let keyword = self.next_token();
                let value = if self.check(Kind::Semicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.eat(Kind::Semicolon, "Expect ';' after return value.")?;
                Ok(Stmt::Return(Return { keyword, value }))
            }
            Kind::While => {
                self.next_token();
                self.eat(Kind::LeftParen, "Expect '(' after 'while'.")?;
                let condition = self.expression()?;
                self.eat(Kind::RightParen, "Expect ')' after condition.")?;
                let body = Box::new(self.statement()?);
                Ok(Stmt::While(While { condition, body }))
            }
            Kind::LeftBrace => {
                self.next_token();
                Ok(Stmt::Block(Block {
                    statements: self.block()?,
                }))
            }
            _ => {
                let expression = self.expression()?;
                self.eat(Kind::Semicolon, "Expect ';' after expression.")?;
                Ok(Stmt::Expression(Expression { expression }))
            }
        }
    }

    /// Desugars `for (init; cond; incr) body` into
    /// `{ init; while (cond) { body; incr; } }`.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.eat(Kind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[Kind::Semicolon]) {
            None
        } else if self.matches(&[Kind::Var]) {
            Some(self.var_declaration()?)
        } else {
            let expression = self.expression()?;
            self.eat(Kind::Semicolon, "Expect ';' after expression.")?;
            Some(Stmt::Expression(Expression { expression }))
        };

        let condition = if self.check(Kind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.eat(Kind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(Kind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.eat(Kind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(Block {
                statements: vec![body, Stmt::Expression(Expression { expression: increment })],
            });
        }

        body = Stmt::While(While {
            condition: condition.unwrap_or_else(|| Expr::literal(Literal::Bool(true))),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Stmt::Block(Block {
                statements: vec![initializer, body],
            });
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.eat(Kind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.eat(Kind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[Kind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(If {
            condition,
            then_branch,
            else_branch,
        }))
    }

    /// Parses declarations up to the closing brace; the opening brace is already consumed.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.nested(Self::block_body)
    }

    fn block_body(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Kind::RightBrace) && !self.is_eof() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.eat(Kind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[Kind::Equal]) {
            let equals = self.previous().clone();
            let value = Box::new(self.nested(Self::assignment)?);

            return match expr {
                Expr::Variable(Variable { name }) => Ok(Expr::Assign(Assign { name, value })),
                Expr::Get(Get { object, name }) => Ok(Expr::Set(Set {
                    object,
                    name,
                    value,
                })),
                expr => {
                    // Reported, not unwound: the left side stands in for the assignment.
                    self.error(&equals, "Invalid assignment target.");
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.matches(&[Kind::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.matches(&[Kind::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[Kind::BangEqual, Kind::EqualEqual], Self::comparison)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[Kind::Greater, Kind::GreaterEqual, Kind::Less, Kind::LessEqual],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[Kind::Minus, Kind::Plus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[Kind::Slash, Kind::Star], Self::unary)
    }

    /// One left-associative precedence level: `operand (op operand)*`.
    fn binary_level(
        &mut self,
        operators: &[Kind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut left = operand(self)?;

        while self.matches(operators) {
            let operator = self.previous().clone();
            let right = operand(self)?;
            left = Expr::Binary(Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Kind::Bang, Kind::Minus]) {
            let operator = self.previous().clone();
            let right = self.nested(Self::unary)?;
            return Ok(Expr::Unary(Unary {
                operator,
                right: Box::new(right),
            }));
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[Kind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[Kind::Dot]) {
                let name = self.eat(Kind::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get(Get {
                    object: Box::new(expr),
                    name,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(Kind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    let token = self.at().clone();
                    self.error(&token, "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);

                if !self.matches(&[Kind::Comma]) {
                    break;
                }
            }
        }

        let paren = self.eat(Kind::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::Call(Call {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.at().kind {
            Kind::False => {
                self.next_token();
                Ok(Expr::literal(Literal::Bool(false)))
            }
            Kind::True => {
                self.next_token();
                Ok(Expr::literal(Literal::Bool(true)))
            }
            Kind::Nil => {
                self.next_token();
                Ok(Expr::literal(Literal::Nil))
            }
            Kind::Number | Kind::String => {
                let token = self.next_token();
                Ok(Expr::literal(token.literal.unwrap_or(Literal::Nil)))
            }
            Kind::This => Ok(Expr::This(This {
                keyword: self.next_token(),
            })),
            Kind::Identifier => Ok(Expr::Variable(Variable {
                name: self.next_token(),
            })),
            Kind::Super => {
                let keyword = self.next_token();
                self.eat(Kind::Dot, "Expect '.' after 'super'.")?;
                let method = self.eat(Kind::Identifier, "Expect superclass method name.")?;
                Ok(Expr::Super(Super { keyword, method }))
            }
            Kind::LeftParen => {
                self.next_token();
                let expression = self.expression()?;
                self.eat(Kind::RightParen, "Expect ')' after expression.")?;
                Ok(Expr::Grouping(Grouping {
                    expression: Box::new(expression),
                }))
            }
            _ => {
                let token = self.at().clone();
                Err(self.error(&token, "Expect expression."))
            }
        }
    }
}

pub fn parse(tokens: Vec<Token>, mut on_error: impl FnMut(SyntaxError)) -> Vec<Stmt> {
    Parser::new(tokens, &mut on_error).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::scan;

    /// Parses on a thread with the main thread's default stack, so nesting tests
    /// do not depend on the smaller test-harness stack.
    fn parse_on_main_sized_stack(src: String) -> (Vec<Stmt>, Vec<SyntaxError>) {
        std::thread::Builder::new()
            .stack_size(8 * 1024 * 1024)
            .spawn(move || parse_source(&src))
            .unwrap()
            .join()
            .unwrap()
    }

    fn parse_source(src: &str) -> (Vec<Stmt>, Vec<SyntaxError>) {
        let tokens = scan(src, |e| panic!("unexpected lexing error: {}", e));
        let mut errors = Vec::new();
        let statements = parse(tokens, |e| errors.push(e));
        (statements, errors)
    }

    fn parse_ok(src: &str) -> Vec<Stmt> {
        let (statements, errors) = parse_source(src);
        assert!(errors.is_empty(), "unexpected syntax errors: {:?}", errors);
        statements
    }

    fn single_expression(src: &str) -> Expr {
        match parse_ok(src).remove(0) {
            Stmt::Expression(Expression { expression }) => expression,
            other => panic!("expected an expression statement, got {:?}", other),
        }
    }

    fn number(expr: &Expr) -> f64 {
        match expr {
            Expr::Literal(literal) => match literal.value {
                Literal::Number(n) => n,
                ref other => panic!("expected a number, got {:?}", other),
            },
            other => panic!("expected a literal, got {:?}", other),
        }
    }

    fn binary(expr: &Expr) -> &Binary {
        match expr {
            Expr::Binary(binary) => binary,
            other => panic!("expected a binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence_and_associativity() {
        let expr = single_expression("1 + 2 * 3;");
        let add = binary(&expr);
        assert_eq!(add.operator.kind, Kind::Plus);
        assert_eq!(number(&add.left), 1.0);
        let mul = binary(&add.right);
        assert_eq!(mul.operator.kind, Kind::Star);
        assert_eq!(number(&mul.left), 2.0);
        assert_eq!(number(&mul.right), 3.0);

        let expr = single_expression("1 - 2 - 3;");
        let outer = binary(&expr);
        assert_eq!(number(&outer.right), 3.0);
        let inner = binary(&outer.left);
        assert_eq!(number(&inner.left), 1.0);
        assert_eq!(number(&inner.right), 2.0);
    }

    #[test]
    fn test_comparison_binds_tighter_than_equality() {
        let expr = single_expression("1 < 2 == 3 >= 4;");
        let eq = binary(&expr);
        assert_eq!(eq.operator.kind, Kind::EqualEqual);
        assert_eq!(binary(&eq.left).operator.kind, Kind::Less);
        assert_eq!(binary(&eq.right).operator.kind, Kind::GreaterEqual);
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let expr = single_expression("a = b = 3;");
        let Expr::Assign(outer) = expr else {
            panic!("expected assignment");
        };
        assert_eq!(outer.name.lexeme, "a");
        let Expr::Assign(inner) = *outer.value else {
            panic!("expected nested assignment");
        };
        assert_eq!(inner.name.lexeme, "b");
        assert_eq!(number(&inner.value), 3.0);
    }

    #[test]
    fn test_property_assignment_becomes_set() {
        let expr = single_expression("a.b.c = 1;");
        let Expr::Set(set) = expr else {
            panic!("expected set");
        };
        assert_eq!(set.name.lexeme, "c");
        assert!(matches!(*set.object, Expr::Get(ref get) if get.name.lexeme == "b"));
    }

    #[test]
    fn test_invalid_assignment_target_recovers() {
        let (statements, errors) = parse_source("1 = 2; print 3;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid assignment target.");
        assert_eq!(errors[0].lexeme, "=");
        assert_eq!(statements.len(), 2);
        assert!(matches!(
            &statements[0],
            Stmt::Expression(Expression { expression }) if number(expression) == 1.0
        ));
        assert!(matches!(statements[1], Stmt::Print(_)));
    }

    #[test]
    fn test_logical_operators() {
        let expr = single_expression("a or b and c;");
        let Expr::Logical(or) = expr else {
            panic!("expected logical");
        };
        assert_eq!(or.operator.kind, Kind::Or);
        assert!(matches!(*or.right, Expr::Logical(ref and) if and.operator.kind == Kind::And));
    }

    #[test]
    fn test_unary_nests() {
        let expr = single_expression("!-x;");
        let Expr::Unary(bang) = expr else {
            panic!("expected unary");
        };
        assert_eq!(bang.operator.kind, Kind::Bang);
        assert!(matches!(*bang.right, Expr::Unary(ref neg) if neg.operator.kind == Kind::Minus));
    }

    #[test]
    fn test_calls_and_property_chains() {
        let expr = single_expression("a.b(1, 2)(3).c;");
        let Expr::Get(get) = expr else {
            panic!("expected get");
        };
        assert_eq!(get.name.lexeme, "c");
        let Expr::Call(outer) = *get.object else {
            panic!("expected call");
        };
        assert_eq!(outer.arguments.len(), 1);
        assert_eq!(outer.paren.kind, Kind::RightParen);
        let Expr::Call(inner) = *outer.callee else {
            panic!("expected inner call");
        };
        assert_eq!(inner.arguments.len(), 2);
        assert!(matches!(*inner.callee, Expr::Get(_)));
    }

    #[test]
    fn test_super_and_this() {
        let expr = single_expression("super.init(this);");
        let Expr::Call(call) = expr else {
            panic!("expected call");
        };
        assert!(matches!(*call.callee, Expr::Super(ref s) if s.method.lexeme == "init"));
        assert!(matches!(call.arguments[0], Expr::This(_)));
    }

    #[test]
    fn test_grouping_and_literals() {
        let expr = single_expression("(\"hi\");");
        let Expr::Grouping(group) = expr else {
            panic!("expected grouping");
        };
        assert_eq!(
            *group.expression,
            Expr::literal(Literal::Str("hi".to_string()))
        );

        assert_eq!(single_expression("nil;"), Expr::literal(Literal::Nil));
        assert_eq!(single_expression("true;"), Expr::literal(Literal::Bool(true)));
        assert_eq!(single_expression("false;"), Expr::literal(Literal::Bool(false)));
    }

    #[test]
    fn test_var_declarations() {
        let statements = parse_ok("var a; var b = 1;");
        assert!(matches!(&statements[0], Stmt::Var(v) if v.name.lexeme == "a" && v.initializer.is_none()));
        assert!(matches!(&statements[1], Stmt::Var(v) if v.initializer.is_some()));
    }

    #[test]
    fn test_function_declaration() {
        let statements = parse_ok("fun add(a, b) { return a + b; }");
        let Stmt::Function(function) = &statements[0] else {
            panic!("expected function");
        };
        assert_eq!(function.name.lexeme, "add");
        let params: Vec<&str> = function.params.iter().map(|p| p.lexeme.as_str()).collect();
        assert_eq!(params, vec!["a", "b"]);
        assert!(matches!(&function.body[0], Stmt::Return(r) if r.value.is_some()));
    }

    #[test]
    fn test_bare_return() {
        let statements = parse_ok("fun f() { return; }");
        let Stmt::Function(function) = &statements[0] else {
            panic!("expected function");
        };
        assert!(matches!(&function.body[0], Stmt::Return(r) if r.value.is_none() && r.keyword.kind == Kind::Return));
    }

    #[test]
    fn test_class_declaration() {
        let statements = parse_ok("class B < A { init(x) { this.x = x; } get() { return this.x; } }");
        let Stmt::Class(class) = &statements[0] else {
            panic!("expected class");
        };
        assert_eq!(class.name.lexeme, "B");
        assert_eq!(class.superclass.as_ref().map(|s| s.name.lexeme.as_str()), Some("A"));
        let methods: Vec<&str> = class.methods.iter().map(|m| m.name.lexeme.as_str()).collect();
        assert_eq!(methods, vec!["init", "get"]);
    }

    #[test]
    fn test_if_else_binds_to_nearest_if() {
        let statements = parse_ok("if (a) if (b) print 1; else print 2;");
        let Stmt::If(outer) = &statements[0] else {
            panic!("expected if");
        };
        assert!(outer.else_branch.is_none());
        assert!(matches!(&*outer.then_branch, Stmt::If(inner) if inner.else_branch.is_some()));
    }

    #[test]
    fn test_for_desugars_to_while() {
        let statements = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");
        assert_eq!(statements.len(), 1);

        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected block");
        };
        assert_eq!(outer.statements.len(), 2);
        assert!(matches!(outer.statements[0], Stmt::Var(_)));

        let Stmt::While(while_stmt) = &outer.statements[1] else {
            panic!("expected while");
        };
        assert!(matches!(while_stmt.condition, Expr::Binary(_)));

        let Stmt::Block(body) = &*while_stmt.body else {
            panic!("expected body block");
        };
        assert!(matches!(body.statements[0], Stmt::Print(_)));
        assert!(matches!(
            &body.statements[1],
            Stmt::Expression(Expression { expression: Expr::Assign(_) })
        ));
    }

    #[test]
    fn test_empty_for_clauses() {
        let statements = parse_ok("for (;;) print 1;");
        let Stmt::While(while_stmt) = &statements[0] else {
            panic!("expected a bare while, got {:?}", statements[0]);
        };
        assert_eq!(while_stmt.condition, Expr::literal(Literal::Bool(true)));
        assert!(matches!(*while_stmt.body, Stmt::Print(_)));
    }

    #[test]
    fn test_missing_semicolon_reports_at_token() {
        let (_, errors) = parse_source("print 1\nprint 2;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 2] Error at 'print': Expect ';' after value.");
    }

    #[test]
    fn test_error_at_end() {
        let (statements, errors) = parse_source("print");
        assert!(statements.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "[line 1] Error at end: Expect expression.");
    }

    #[test]
    fn test_synchronize_after_if_else() {
        let (statements, errors) = parse_source("if (x) print 1; else print 2;\nvar = 3;\nprint 4;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Expect variable name.");
        assert_eq!(statements.len(), 2);
        assert!(matches!(statements[0], Stmt::If(_)));
        assert!(matches!(statements[1], Stmt::Print(_)));
    }

    #[test]
    fn test_all_errors_are_collected() {
        let (statements, errors) = parse_source("var 1; print ; fun (){} print 5;");
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Expect variable name.", "Expect expression.", "Expect function name."]
        );
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_error_inside_block_keeps_block() {
        let (statements, errors) = parse_source("{ print ; print 1; }");
        assert_eq!(errors.len(), 1);
        let Stmt::Block(block) = &statements[0] else {
            panic!("expected block");
        };
        assert_eq!(block.statements.len(), 1);
    }

    #[test]
    fn test_too_many_arguments_is_not_fatal() {
        let args = vec!["1"; 256].join(", ");
        let (statements, errors) = parse_source(&format!("f({});", args));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't have more than 255 arguments.");
        let Stmt::Expression(Expression { expression: Expr::Call(call) }) = &statements[0] else {
            panic!("expected call statement");
        };
        assert_eq!(call.arguments.len(), 256);
    }

    #[test]
    fn test_too_many_parameters_is_not_fatal() {
        let params: Vec<String> = (0..256).map(|i| format!("p{}", i)).collect();
        let (statements, errors) = parse_source(&format!("fun f({}) {{}}", params.join(", ")));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Can't have more than 255 parameters.");
        assert!(matches!(&statements[0], Stmt::Function(f) if f.params.len() == 256));
    }

    #[test]
    fn test_exactly_255_arguments_is_allowed() {
        let args = vec!["x"; 255].join(", ");
        parse_ok(&format!("f({});", args));
    }

    #[test]
    fn test_deep_parentheses_report_once() {
        let src = format!("{}1{};", "(".repeat(3000), ")".repeat(3000));
        let (statements, errors) = parse_on_main_sized_stack(src);
        assert!(statements.is_empty());
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert_eq!(errors[0].message, "Too much nesting.");
        assert_eq!(errors[0].lexeme, "(");
    }

    #[test]
    fn test_deep_nesting_resumes_at_next_declaration() {
        let src = format!("print {}x;\nprint 2;", "!".repeat(3000));
        let (statements, errors) = parse_on_main_sized_stack(src);
        assert_eq!(errors.len(), 1, "{:?}", errors);
        assert_eq!(errors[0].message, "Too much nesting.");
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Print(_)));
    }

    #[test]
    fn test_deep_blocks_are_reported() {
        let src = format!("{}{}", "{".repeat(3000), "}".repeat(3000));
        let (_, errors) = parse_on_main_sized_stack(src);
        assert_eq!(errors[0].message, "Too much nesting.");
    }

    #[test]
    fn test_nesting_below_limit_is_accepted() {
        let depth = MAX_NESTING / 2;
        let src = format!("{}1{};", "(".repeat(depth), ")".repeat(depth));
        let (statements, errors) = parse_on_main_sized_stack(src);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_missing_eof_is_tolerated() {
        let tokens = vec![
            Token::new(Kind::Print, "print", None, 1),
            Token::new(Kind::Number, "1", Some(Literal::Number(1.0)), 1),
            Token::new(Kind::Semicolon, ";", None, 1),
        ];
        let statements = parse(tokens, |e| panic!("unexpected error {}", e));
        assert_eq!(statements.len(), 1);
    }
}
