//! Recursive-descent parser
//!
//! One public function per grammar entry point. All of them consume the
//! token stream produced by [`crate::lexer::tokenize`].

use crate::ast::{
    BinOp, CmpOp, Expr, FunctionDef, LogicOp, Params, Program, Span, Spanned, Stmt, Target, UnOp,
};
use crate::error::{Error, Result};
use crate::lexer::Token;
use std::rc::Rc;


/// Parse a statement block (module or interactive input)
pub fn parse_program(source: &str, tokens: Vec<(Token, Span)>) -> Result<Program> {
    let mut parser = Parser::new(source, tokens);
    let mut stmts = Vec::new();
    parser.skip_separators();
    while !parser.at_end() {
        stmts.push(parser.statement()?);
        if !parser.at_end() && !parser.separator() {
            return Err(parser.unexpected("end of statement"));
        }
        parser.skip_separators();
    }
    Ok(Program { stmts })
}

/// Parse a single expression list, allowing surrounding newlines
pub fn parse_expression(source: &str, tokens: Vec<(Token, Span)>) -> Result<Spanned<Expr>> {
    let mut parser = Parser::new(source, tokens);
    parser.skip_separators();
    let expr = parser.expr_list()?;
    parser.finish()?;
    Ok(expr)
}

/// Parse lambda text of the form `params: expr`
pub fn parse_lambda(source: &str, tokens: Vec<(Token, Span)>) -> Result<FunctionDef> {
    let mut parser = Parser::new(source, tokens);
    parser.skip_separators();
    let params = parser.params(&Token::Colon)?;
    parser.expect(&Token::Colon)?;
    let body = parser.expr_list()?;
    parser.finish()?;
    Ok(FunctionDef {
        name: "<lambda>".to_string(),
        params,
        body,
    })
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    eof: Span,
}

impl Parser {
    fn new(source: &str, tokens: Vec<(Token, Span)>) -> Self {
        Parser {
            tokens,
            pos: 0,
            eof: Span::new(source.len(), source.len()),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn span(&self) -> Span {
        self.tokens.get(self.pos).map(|(_, s)| *s).unwrap_or(self.eof)
    }

    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(_, s)| *s)
            .unwrap_or(self.eof)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn expect(&mut self, token: &Token) -> Result<Span> {
        if self.check(token) {
            let span = self.span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(&format!("'{token}'")))
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.peek() {
            Some(found) => Error::syntax(
                format!("expected {expected}, found '{found}'"),
                self.span(),
            ),
            None => Error::syntax(format!("expected {expected}, found end of input"), self.eof),
        }
    }

    fn separator(&mut self) -> bool {
        self.eat(&Token::Newline) || self.eat(&Token::Semi)
    }

    fn skip_separators(&mut self) {
        while self.separator() {}
    }

    fn finish(&mut self) -> Result<()> {
        self.skip_separators();
        if self.at_end() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    // ---- statements ----

    fn statement(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.span();
        if self.eat(&Token::Def) {
            let def = self.def_body()?;
            let span = start.to(def.body.span);
            return Ok(Spanned::new(Stmt::Def(Rc::new(def)), span));
        }

        let lhs = self.expr_list()?;
        if !self.eat(&Token::Eq) {
            let span = lhs.span;
            return Ok(Spanned::new(Stmt::Expr(lhs), span));
        }
        let target = Self::target(lhs)?;
        let value = self.expr_list()?;
        let span = start.to(value.span);
        Ok(Spanned::new(Stmt::Assign { target, value }, span))
    }

    fn def_body(&mut self) -> Result<FunctionDef> {
        let name = self.ident()?;
        self.expect(&Token::LParen)?;
        let params = self.params(&Token::RParen)?;
        self.expect(&Token::RParen)?;
        self.expect(&Token::Colon)?;
        self.eat(&Token::Return);
        let body = self.expr_list()?;
        Ok(FunctionDef { name, params, body })
    }

    fn target(expr: Spanned<Expr>) -> Result<Target> {
        match expr.node {
            Expr::Name(name) => Ok(Target::Name(name)),
            Expr::Index { target, index } => Ok(Target::Item {
                target: *target,
                index: *index,
            }),
            Expr::Slice { target, lo, hi } => Ok(Target::Slice {
                target: *target,
                lo: lo.map(|e| *e),
                hi: hi.map(|e| *e),
            }),
            _ => Err(Error::syntax("can't assign to expression", expr.span)),
        }
    }

    /// `a, b, *rest` up to (not including) `end`
    fn params(&mut self, end: &Token) -> Result<Params> {
        let mut params = Params::default();
        while !self.check(end) {
            if self.eat(&Token::Star) {
                params.rest = Some(self.ident()?);
                break;
            }
            let name = self.ident()?;
            if params.names.contains(&name) {
                return Err(Error::syntax(
                    format!("duplicate argument '{name}'"),
                    self.prev_span(),
                ));
            }
            params.names.push(name);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(params)
    }

    // ---- expressions ----

    /// `expr (, expr)* [,]`, producing a tuple when a comma is present
    fn expr_list(&mut self) -> Result<Spanned<Expr>> {
        let first = self.expr()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.ends_expr_list() {
                break;
            }
            items.push(self.expr()?);
        }
        let span = start.to(self.prev_span());
        Ok(Spanned::new(Expr::Tuple(items), span))
    }

    fn ends_expr_list(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(Token::Newline)
                | Some(Token::Semi)
                | Some(Token::Eq)
                | Some(Token::RParen)
                | Some(Token::RBracket)
                | Some(Token::RBrace)
        )
    }

    fn expr(&mut self) -> Result<Spanned<Expr>> {
        if self.check(&Token::Lambda) {
            return self.lambda();
        }
        let value = self.or_expr()?;
        if !self.eat(&Token::If) {
            return Ok(value);
        }
        let cond = self.or_expr()?;
        self.expect(&Token::Else)?;
        let else_branch = self.expr()?;
        let span = value.span.to(else_branch.span);
        Ok(Spanned::new(
            Expr::Conditional {
                cond: Box::new(cond),
                then_branch: Box::new(value),
                else_branch: Box::new(else_branch),
            },
            span,
        ))
    }

    fn lambda(&mut self) -> Result<Spanned<Expr>> {
        let start = self.expect(&Token::Lambda)?;
        let params = self.params(&Token::Colon)?;
        self.expect(&Token::Colon)?;
        let body = self.expr()?;
        let span = start.to(body.span);
        let def = FunctionDef {
            name: "<lambda>".to_string(),
            params,
            body,
        };
        Ok(Spanned::new(Expr::Lambda(Rc::new(def)), span))
    }

    fn or_expr(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            left = Self::logical(left, LogicOp::Or, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            left = Self::logical(left, LogicOp::And, right);
        }
        Ok(left)
    }

    fn logical(left: Spanned<Expr>, op: LogicOp, right: Spanned<Expr>) -> Spanned<Expr> {
        let span = left.span.to(right.span);
        Spanned::new(
            Expr::Logical {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    fn not_expr(&mut self) -> Result<Spanned<Expr>> {
        if self.check(&Token::Not) {
            let start = self.span();
            self.pos += 1;
            let expr = self.not_expr()?;
            let span = start.to(expr.span);
            return Ok(Spanned::new(
                Expr::Unary {
                    op: UnOp::Not,
                    expr: Box::new(expr),
                },
                span,
            ));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.arith()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => CmpOp::Eq,
                Some(Token::NotEq) => CmpOp::Ne,
                Some(Token::Lt) => CmpOp::Lt,
                Some(Token::LtEq) => CmpOp::Le,
                Some(Token::Gt) => CmpOp::Gt,
                Some(Token::GtEq) => CmpOp::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.arith()?;
            let span = left.span.to(right.span);
            left = Spanned::new(
                Expr::Compare {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
    }

    fn arith(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.term()?;
            left = Self::binary(left, op, right);
        }
    }

    fn term(&mut self) -> Result<Spanned<Expr>> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.factor()?;
            left = Self::binary(left, op, right);
        }
    }

    fn binary(left: Spanned<Expr>, op: BinOp, right: Spanned<Expr>) -> Spanned<Expr> {
        let span = left.span.to(right.span);
        Spanned::new(
            Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    fn factor(&mut self) -> Result<Spanned<Expr>> {
        if self.check(&Token::Minus) {
            let start = self.span();
            self.pos += 1;
            let operand = self.factor()?;
            let span = start.to(operand.span);
            let node = match operand.node {
                Expr::Int(n) => Expr::Int(-n),
                Expr::Float(x) => Expr::Float(-x),
                other => Expr::Unary {
                    op: UnOp::Neg,
                    expr: Box::new(Spanned::new(other, operand.span)),
                },
            };
            return Ok(Spanned::new(node, span));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Spanned<Expr>> {
        let base = self.postfix()?;
        if !self.eat(&Token::StarStar) {
            return Ok(base);
        }
        let exponent = self.factor()?;
        Ok(Self::binary(base, BinOp::Pow, exponent))
    }

    fn postfix(&mut self) -> Result<Spanned<Expr>> {
        let mut expr = self.atom()?;
        loop {
            if self.eat(&Token::LParen) {
                let args = self.sequence_items(&Token::RParen)?;
                let end = self.expect(&Token::RParen)?;
                let span = expr.span.to(end);
                expr = Spanned::new(
                    Expr::Call {
                        func: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.eat(&Token::LBracket) {
                expr = self.subscript(expr)?;
            } else {
                return Ok(expr);
            }
        }
    }

    fn subscript(&mut self, target: Spanned<Expr>) -> Result<Spanned<Expr>> {
        let lo = if self.check(&Token::Colon) {
            None
        } else {
            Some(self.expr()?)
        };
        if !self.eat(&Token::Colon) {
            let end = self.expect(&Token::RBracket)?;
            let span = target.span.to(end);
            let index = lo.ok_or_else(|| self.unexpected("index"))?;
            return Ok(Spanned::new(
                Expr::Index {
                    target: Box::new(target),
                    index: Box::new(index),
                },
                span,
            ));
        }
        let hi = if self.check(&Token::RBracket) {
            None
        } else {
            Some(self.expr()?)
        };
        let end = self.expect(&Token::RBracket)?;
        let span = target.span.to(end);
        Ok(Spanned::new(
            Expr::Slice {
                target: Box::new(target),
                lo: lo.map(Box::new),
                hi: hi.map(Box::new),
            },
            span,
        ))
    }

    /// Comma-separated expressions up to `end`, trailing comma allowed
    fn sequence_items(&mut self, end: &Token) -> Result<Vec<Spanned<Expr>>> {
        let mut items = Vec::new();
        while !self.check(end) {
            items.push(self.expr()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn atom(&mut self) -> Result<Spanned<Expr>> {
        let Some((token, span)) = self.advance() else {
            return Err(self.unexpected("expression"));
        };
        let node = match token {
            Token::IntLit(n) => Expr::Int(n),
            Token::FloatLit(x) => Expr::Float(x),
            Token::StringLit(mut s) => {
                // Adjacent literals concatenate
                while let Some(Token::StringLit(next)) = self.peek() {
                    s.push_str(next);
                    self.pos += 1;
                }
                Expr::Str(s)
            }
            Token::Ident(name) => Expr::Name(name),
            Token::LParen => return self.parenthesized(span),
            Token::LBracket => {
                let items = self.sequence_items(&Token::RBracket)?;
                let end = self.expect(&Token::RBracket)?;
                return Ok(Spanned::new(Expr::List(items), span.to(end)));
            }
            Token::LBrace => {
                let mut entries = Vec::new();
                while !self.check(&Token::RBrace) {
                    let key = self.expr()?;
                    self.expect(&Token::Colon)?;
                    let value = self.expr()?;
                    entries.push((key, value));
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                let end = self.expect(&Token::RBrace)?;
                return Ok(Spanned::new(Expr::Dict(entries), span.to(end)));
            }
            _ => {
                self.pos -= 1;
                return Err(self.unexpected("expression"));
            }
        };
        Ok(Spanned::new(node, self.prev_span().to(span)))
    }

    fn parenthesized(&mut self, start: Span) -> Result<Spanned<Expr>> {
        if self.check(&Token::RParen) {
            let end = self.expect(&Token::RParen)?;
            return Ok(Spanned::new(Expr::Tuple(Vec::new()), start.to(end)));
        }
        let first = self.expr()?;
        if self.check(&Token::RParen) {
            self.pos += 1;
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.check(&Token::RParen) {
                break;
            }
            items.push(self.expr()?);
        }
        let end = self.expect(&Token::RParen)?;
        Ok(Spanned::new(Expr::Tuple(items), start.to(end)))
    }
}
