//! pebble-par - Recursive-Descent Parser
//!
//! ============================================================================
//! PARSER OVERVIEW
//! ============================================================================
//!
//! The parser turns the lexer's token stream into a [`ast::Program`],
//! using classic recursive descent: one function per grammar
//! non-terminal, one token of lookahead buffered in [`Parser::current`].
//! There is no backtracking anywhere in the grammar, so that single
//! buffered token is always enough to decide which production applies.
//!
//! ```text
//! program     ::= decl*
//! decl        ::= type ( array_decl | ident ( fn_decl | var_tail ) )
//! fn_decl     ::= '(' params? ')' block
//! var_tail    ::= ( '=' expr )? ';'
//! stmt        ::= var_stmt | block | if | while | for | return | expr_or_assign
//! ```
//!
//! # Disambiguating assignment from expression statements
//!
//! `x = 1;` and `x + 1;` both start with an identifier, and `x[i]` is
//! valid on both sides of `=`. Rather than special-case the grammar, the
//! parser always parses a *complete expression* first; if the next token
//! is `=` **and** the expression it just built is a bare [`ast::Expr::Var`]
//! or [`ast::Expr::ArrayAccess`], it reinterprets that expression as an
//! assignment target. Anything else followed by `=` is a syntax error
//! ("invalid assignment target") — see [`Parser::assign_or_expr_stmt`].
//!
//! # Precedence
//!
//! Binary operators are parsed by a cascade of functions, one per
//! precedence level, from loosest (`||`) to tightest (`* / %`), each
//! calling the next-tighter level for its operands — the standard
//! left-recursion-as-iteration transform. Unary `+ - !` sit one level
//! tighter than `* / %` and recurse into themselves (right-associative);
//! everything below that is `primary`: literals, parens, identifiers,
//! indexing, and calls.

pub mod ast;

use pebble_lex::{Lexer, Token, TokenKind, TokenValue};
use pebble_util::{ParseError, PebbleError, PebbleResult, Span, Symbol};

use ast::*;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> PebbleResult<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parses an entire source file into a [`Program`].
    pub fn parse_program(&mut self) -> PebbleResult<Program> {
        let mut declarations = Vec::new();
        while self.current.kind != TokenKind::Eof {
            declarations.push(self.decl()?);
        }
        Ok(Program { declarations })
    }

    fn bump(&mut self) -> PebbleResult<Token> {
        let tok = self.current;
        self.current = self.lexer.next_token()?;
        Ok(tok)
    }

    fn expect(&mut self, kind: TokenKind) -> PebbleResult<Token> {
        if self.current.kind == kind {
            self.bump()
        } else {
            Err(ParseError::new(format!(
                "expected {:?}, found {:?} at {}",
                kind, self.current.kind, self.current.span
            ))
            .into())
        }
    }

    fn text_of(&self, tok: Token) -> Symbol {
        match tok.value {
            TokenValue::Text(sym) => sym,
            _ => unreachable!("identifier/string token without text payload"),
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn type_spec(&mut self) -> PebbleResult<Type> {
        let ty = match self.current.kind {
            TokenKind::Int => Type::Int,
            TokenKind::StringKw => Type::String,
            TokenKind::Bool => Type::Bool,
            TokenKind::Void => Type::Void,
            _ => {
                return Err(ParseError::new(format!(
                    "expected a type, found {:?} at {}",
                    self.current.kind, self.current.span
                ))
                .into())
            }
        };
        self.bump()?;
        Ok(ty)
    }

    /// `void` is only meaningful as a function's return type — the parser
    /// rejects it anywhere else (variables, arrays, parameters) rather
    /// than leaving a value-less binding for the evaluator to trip over.
    fn require_non_void(&self, ty: Type, span: Span) -> PebbleResult<()> {
        if ty == Type::Void {
            Err(ParseError::new(format!("'void' is not a valid variable type at {span}")).into())
        } else {
            Ok(())
        }
    }

    fn decl(&mut self) -> PebbleResult<TopDecl> {
        let span = self.current.span;
        let ty = self.type_spec()?;
        if self.current.kind == TokenKind::LBracket {
            self.require_non_void(ty, span)?;
            return Ok(TopDecl::Array(self.array_decl(ty)?));
        }
        let name_tok = self.expect(TokenKind::Identifier)?;
        let name = self.text_of(name_tok);
        if self.current.kind == TokenKind::LParen {
            Ok(TopDecl::Function(self.function_decl(ty, name, name_tok.span)?))
        } else {
            self.require_non_void(ty, span)?;
            Ok(TopDecl::Var(self.var_tail(ty, name, name_tok.span)?))
        }
    }

    fn array_decl(&mut self, ty: Type) -> PebbleResult<ArrayDecl> {
        let span = self.current.span;
        self.expect(TokenKind::LBracket)?;

        if self.current.kind == TokenKind::RBracket {
            self.bump()?;
            let name_tok = self.expect(TokenKind::Identifier)?;
            let name = self.text_of(name_tok);
            self.expect(TokenKind::Assign)?;
            self.expect(TokenKind::LBrace)?;
            let mut initializers = Vec::new();
            if self.current.kind != TokenKind::RBrace {
                initializers.push(self.expr()?);
                while self.current.kind == TokenKind::Comma {
                    self.bump()?;
                    initializers.push(self.expr()?);
                }
            }
            self.expect(TokenKind::RBrace)?;
            self.expect(TokenKind::Semi)?;
            Ok(ArrayDecl::Initialized {
                ty,
                name,
                initializers,
                span,
            })
        } else if self.current.kind == TokenKind::IntegerLit {
            let size = match self.current.value {
                TokenValue::Int(n) => n,
                _ => unreachable!(),
            };
            self.bump()?;
            self.expect(TokenKind::RBracket)?;
            let name_tok = self.expect(TokenKind::Identifier)?;
            let name = self.text_of(name_tok);
            self.expect(TokenKind::Semi)?;
            Ok(ArrayDecl::Sized {
                ty,
                name,
                size,
                span,
            })
        } else {
            Err(ParseError::new(format!(
                "malformed array declaration at {}",
                self.current.span
            ))
            .into())
        }
    }

    fn function_decl(&mut self, return_type: Type, name: Symbol, span: Span) -> PebbleResult<FunctionDecl> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.current.kind != TokenKind::RParen {
            params.push(self.param()?);
            while self.current.kind == TokenKind::Comma {
                self.bump()?;
                params.push(self.param()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.block()?;
        Ok(FunctionDecl {
            return_type,
            name,
            params,
            body,
            span,
        })
    }

    fn param(&mut self) -> PebbleResult<Param> {
        let span = self.current.span;
        let ty = self.type_spec()?;
        self.require_non_void(ty, span)?;
        let name_tok = self.expect(TokenKind::Identifier)?;
        let name = self.text_of(name_tok);
        let mut is_array = false;
        if self.current.kind == TokenKind::LBracket {
            self.bump()?;
            self.expect(TokenKind::RBracket)?;
            is_array = true;
        }
        Ok(Param { ty, name, is_array })
    }

    fn var_tail(&mut self, ty: Type, name: Symbol, span: Span) -> PebbleResult<VarDecl> {
        let init = if self.current.kind == TokenKind::Assign {
            self.bump()?;
            Some(self.expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;
        Ok(VarDecl {
            ty,
            name,
            init,
            span,
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> PebbleResult<Block> {
        self.expect(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while self.current.kind != TokenKind::RBrace && self.current.kind != TokenKind::Eof {
            statements.push(self.statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block { statements })
    }

    fn is_type_start(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Int | TokenKind::StringKw | TokenKind::Bool | TokenKind::Void
        )
    }

    fn statement(&mut self) -> PebbleResult<Stmt> {
        if self.is_type_start() {
            let span = self.current.span;
            let ty = self.type_spec()?;
            self.require_non_void(ty, span)?;
            if self.current.kind == TokenKind::LBracket {
                Ok(Stmt::ArrayDecl(self.array_decl(ty)?))
            } else {
                let name_tok = self.expect(TokenKind::Identifier)?;
                let name = self.text_of(name_tok);
                Ok(Stmt::VarDecl(self.var_tail(ty, name, span)?))
            }
        } else {
            match self.current.kind {
                TokenKind::LBrace => Ok(Stmt::Block(self.block()?)),
                TokenKind::If => self.if_stmt(),
                TokenKind::While => self.while_stmt(),
                TokenKind::For => self.for_stmt(),
                TokenKind::Return => self.return_stmt(),
                _ => self.assign_or_expr_stmt(true),
            }
        }
    }

    /// Parses a full expression; if followed by `=`, reinterprets it as
    /// an assignment target. `consume_semi` is `false` only for a `for`
    /// loop's update clause, which has no trailing `;` (the `)` closes
    /// the header instead).
    fn assign_or_expr_stmt(&mut self, consume_semi: bool) -> PebbleResult<Stmt> {
        let expr_node = self.expr()?;
        let span = expr_node.span();

        if self.current.kind == TokenKind::Assign {
            self.bump()?;
            let value = self.expr()?;
            if consume_semi {
                self.expect(TokenKind::Semi)?;
            }
            let assign = match expr_node {
                Expr::Var { name, .. } => Assign {
                    target_name: name,
                    index: None,
                    value,
                    span,
                },
                Expr::ArrayAccess { name, index, .. } => Assign {
                    target_name: name,
                    index: Some(*index),
                    value,
                    span,
                },
                _ => return Err(ParseError::new("invalid assignment target").into()),
            };
            Ok(Stmt::Assign(assign))
        } else {
            if consume_semi {
                self.expect(TokenKind::Semi)?;
            }
            Ok(Stmt::ExprStmt(expr_node))
        }
    }

    fn if_stmt(&mut self) -> PebbleResult<Stmt> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.expr()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.current.kind == TokenKind::Else {
            self.bump()?;
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

    fn while_stmt(&mut self) -> PebbleResult<Stmt> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.expr()?;
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(While { condition, body }))
    }

    fn for_stmt(&mut self) -> PebbleResult<Stmt> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;

        let init: Option<Box<Stmt>> = if self.current.kind == TokenKind::Semi {
            self.bump()?;
            None
        } else if matches!(
            self.current.kind,
            TokenKind::Int | TokenKind::StringKw | TokenKind::Bool | TokenKind::Void
        ) {
            let span = self.current.span;
            let ty = self.type_spec()?;
            self.require_non_void(ty, span)?;
            let name_tok = self.expect(TokenKind::Identifier)?;
            let name = self.text_of(name_tok);
            Some(Box::new(Stmt::VarDecl(self.var_tail(ty, name, span)?)))
        } else {
            Some(Box::new(self.assign_or_expr_stmt(true)?))
        };

        let condition = if self.current.kind != TokenKind::Semi {
            Some(self.expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;

        let update: Option<Box<Stmt>> = if self.current.kind != TokenKind::RParen {
            Some(Box::new(self.assign_or_expr_stmt(false)?))
        } else {
            None
        };
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::For(For {
            init,
            condition,
            update,
            body,
        }))
    }

    fn return_stmt(&mut self) -> PebbleResult<Stmt> {
        let span = self.current.span;
        self.expect(TokenKind::Return)?;
        let value = if self.current.kind != TokenKind::Semi {
            Some(self.expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::Return(Return { value, span }))
    }

    // ------------------------------------------------------------------
    // Expressions, loosest to tightest
    // ------------------------------------------------------------------

    fn expr(&mut self) -> PebbleResult<Expr> {
        self.logic_or()
    }

    fn logic_or(&mut self) -> PebbleResult<Expr> {
        let mut node = self.logic_and()?;
        while self.current.kind == TokenKind::Or {
            let span = self.current.span;
            self.bump()?;
            let right = self.logic_and()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op: BinOpKind::Or,
                right: Box::new(right),
                span,
            };
        }
        Ok(node)
    }

    fn logic_and(&mut self) -> PebbleResult<Expr> {
        let mut node = self.equality()?;
        while self.current.kind == TokenKind::And {
            let span = self.current.span;
            self.bump()?;
            let right = self.equality()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op: BinOpKind::And,
                right: Box::new(right),
                span,
            };
        }
        Ok(node)
    }

    fn equality(&mut self) -> PebbleResult<Expr> {
        let mut node = self.relational()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Eq => BinOpKind::Eq,
                TokenKind::Neq => BinOpKind::Neq,
                _ => break,
            };
            let span = self.current.span;
            self.bump()?;
            let right = self.relational()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(node)
    }

    fn relational(&mut self) -> PebbleResult<Expr> {
        let mut node = self.additive()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinOpKind::Lt,
                TokenKind::Lte => BinOpKind::Lte,
                TokenKind::Gt => BinOpKind::Gt,
                TokenKind::Gte => BinOpKind::Gte,
                _ => break,
            };
            let span = self.current.span;
            self.bump()?;
            let right = self.additive()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(node)
    }

    fn additive(&mut self) -> PebbleResult<Expr> {
        let mut node = self.term()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinOpKind::Add,
                TokenKind::Minus => BinOpKind::Sub,
                _ => break,
            };
            let span = self.current.span;
            self.bump()?;
            let right = self.term()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(node)
    }

    fn term(&mut self) -> PebbleResult<Expr> {
        let mut node = self.unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Mul => BinOpKind::Mul,
                TokenKind::Div => BinOpKind::Div,
                TokenKind::Mod => BinOpKind::Mod,
                _ => break,
            };
            let span = self.current.span;
            self.bump()?;
            let right = self.unary()?;
            node = Expr::BinOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(node)
    }

    fn unary(&mut self) -> PebbleResult<Expr> {
        let op = match self.current.kind {
            TokenKind::Plus => UnaryOpKind::Pos,
            TokenKind::Minus => UnaryOpKind::Neg,
            TokenKind::Not => UnaryOpKind::Not,
            _ => return self.primary(),
        };
        let span = self.current.span;
        self.bump()?;
        let operand = self.unary()?;
        Ok(Expr::UnaryOp {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    fn primary(&mut self) -> PebbleResult<Expr> {
        let span = self.current.span;
        match self.current.kind {
            TokenKind::IntegerLit => {
                let value = match self.current.value {
                    TokenValue::Int(n) => n,
                    _ => unreachable!(),
                };
                self.bump()?;
                Ok(Expr::Literal {
                    value: LiteralValue::Int(value),
                    span,
                })
            }
            TokenKind::StringLit => {
                let sym = self.text_of(self.current);
                self.bump()?;
                Ok(Expr::Literal {
                    value: LiteralValue::Str(sym),
                    span,
                })
            }
            TokenKind::True => {
                self.bump()?;
                Ok(Expr::Literal {
                    value: LiteralValue::Bool(true),
                    span,
                })
            }
            TokenKind::False => {
                self.bump()?;
                Ok(Expr::Literal {
                    value: LiteralValue::Bool(false),
                    span,
                })
            }
            TokenKind::LParen => {
                self.bump()?;
                let node = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(node)
            }
            TokenKind::Identifier => self.variable(),
            _ => Err(ParseError::new(format!(
                "unexpected token {:?} at {}",
                self.current.kind, self.current.span
            ))
            .into()),
        }
    }

    fn variable(&mut self) -> PebbleResult<Expr> {
        let span = self.current.span;
        let name_tok = self.expect(TokenKind::Identifier)?;
        let name = self.text_of(name_tok);

        if self.current.kind == TokenKind::LBracket {
            self.bump()?;
            let index = self.expr()?;
            self.expect(TokenKind::RBracket)?;
            Ok(Expr::ArrayAccess {
                name,
                index: Box::new(index),
                span,
            })
        } else if self.current.kind == TokenKind::LParen {
            self.bump()?;
            let mut args = Vec::new();
            if self.current.kind != TokenKind::RParen {
                args.push(self.expr()?);
                while self.current.kind == TokenKind::Comma {
                    self.bump()?;
                    args.push(self.expr()?);
                }
            }
            self.expect(TokenKind::RParen)?;
            Ok(Expr::Call { name, args, span })
        } else {
            Ok(Expr::Var { name, span })
        }
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use pebble_lex::Lexer;
    use pebble_util::Interner;
    use proptest::prelude::*;

    fn parse_debug(src: &str) -> String {
        let mut interner = Interner::new();
        let lexer = Lexer::new(src, &mut interner);
        let program = Parser::new(lexer)
            .and_then(|mut p| p.parse_program())
            .expect("fixture source must parse");
        format!("{program:?}")
    }

    proptest! {
        /// Parser determinism (spec.md §8): the same token stream always
        /// yields a structurally identical tree, regardless of which
        /// literal values happen to appear in it.
        #[test]
        fn same_source_parses_to_the_same_tree_twice(a in 0i64..1000, b in 0i64..1000, c in 0i64..1000) {
            let src = format!("int main() {{ print({a} + {b} * {c}); }}");
            prop_assert_eq!(parse_debug(&src), parse_debug(&src));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pebble_lex::Lexer;
    use pebble_util::Interner;

    fn parse(src: &str) -> PebbleResult<Program> {
        let mut interner = Interner::new();
        let lexer = Lexer::new(src, &mut interner);
        Parser::new(lexer)?.parse_program()
    }

    fn assert_binop_shape(expr: &Expr, expect_outer: BinOpKind) {
        match expr {
            Expr::BinOp { op, .. } => assert_eq!(*op, expect_outer),
            other => panic!("expected BinOp, got {other:?}"),
        }
    }

    #[test]
    fn precedence_mul_binds_tighter_than_add() {
        // a + b * c  =>  BinOp(Add, a, BinOp(Mul, b, c))
        let program = parse("void main() { print(1 + 2 * 3); }").unwrap();
        let TopDecl::Function(f) = &program.declarations[0] else {
            panic!()
        };
        let Stmt::ExprStmt(Expr::Call { args, .. }) = &f.body.statements[0] else {
            panic!()
        };
        assert_binop_shape(&args[0], BinOpKind::Add);
        if let Expr::BinOp { right, .. } = &args[0] {
            assert_binop_shape(right, BinOpKind::Mul);
        }
    }

    #[test]
    fn dangling_else_binds_to_nearest_if() {
        let program = parse(
            "void main() { if (true) if (false) print(1); else print(2); }",
        )
        .unwrap();
        let TopDecl::Function(f) = &program.declarations[0] else {
            panic!()
        };
        let Stmt::If(outer) = &f.body.statements[0] else {
            panic!()
        };
        let Stmt::If(inner) = outer.then_branch.as_ref() else {
            panic!("else should attach to the inner if, leaving the outer if without one")
        };
        assert!(inner.else_branch.is_some());
        assert!(outer.else_branch.is_none());
    }

    #[test]
    fn assignment_to_non_lvalue_is_a_parse_error() {
        let err = parse("void main() { 1 + 1 = 2; }").unwrap_err();
        assert!(matches!(err, PebbleError::Parse(_)));
    }

    #[test]
    fn array_decl_requires_size_or_initializers() {
        let err = parse("void main() { int[] a; }").unwrap_err();
        assert!(matches!(err, PebbleError::Parse(_)));
    }

    #[test]
    fn for_loop_update_has_no_trailing_semicolon() {
        let program = parse("void main() { for (int i = 0; i < 3; i = i + 1) print(i); }").unwrap();
        let TopDecl::Function(f) = &program.declarations[0] else {
            panic!()
        };
        assert!(matches!(&f.body.statements[0], Stmt::For(_)));
    }

    #[test]
    fn void_variable_declaration_is_a_parse_error() {
        let err = parse("void main() { void x; }").unwrap_err();
        assert!(matches!(err, PebbleError::Parse(_)));
    }

    #[test]
    fn missing_function_body_is_a_parse_error() {
        let err = parse("void main()").unwrap_err();
        assert!(matches!(err, PebbleError::Parse(_)));
    }
}
