//! Statement and expression evaluation

use super::{Interpreter, Scope};
use crate::ast::{Expr, LogicOp, Program, Spanned, Stmt, Target, UnOp};
use crate::error::{Error, Result};
use crate::object::{Dict, Function, Object, ObjRef};
use crate::ops;
use std::rc::Rc;

impl Interpreter {
    /// Execute statements in order; returns the value of a trailing
    /// expression statement
    pub(super) fn exec_program(&mut self, program: &Program, scope: &Scope) -> Result<Option<ObjRef>> {
        let mut last = None;
        for stmt in &program.stmts {
            last = self.exec_stmt(&stmt.node, scope)?;
        }
        Ok(last)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &Scope) -> Result<Option<ObjRef>> {
        match stmt {
            Stmt::Expr(expr) => self.eval_expr(expr, scope).map(Some),
            Stmt::Assign { target, value } => {
                let value = self.eval_expr(value, scope)?;
                self.assign(target, value, scope)?;
                Ok(None)
            }
            Stmt::Def(def) => {
                let function = ObjRef::new(Object::Function(Function {
                    def: Rc::clone(def),
                    globals: scope.globals.clone(),
                }));
                scope.assign(&def.name, function)?;
                Ok(None)
            }
        }
    }

    fn assign(&mut self, target: &Target, value: ObjRef, scope: &Scope) -> Result<()> {
        match target {
            Target::Name(name) => scope.assign(name, value),
            Target::Item { target, index } => {
                let container = self.eval_expr(target, scope)?;
                let key = self.eval_expr(index, scope)?;
                ops::set_item(&container, &key, value)
            }
            Target::Slice { target, lo, hi } => {
                let container = self.eval_expr(target, scope)?;
                let lo = self.slice_bound(lo.as_ref(), scope)?;
                let hi = self.slice_bound(hi.as_ref(), scope)?;
                ops::set_slice(&container, lo, hi, Some(&value))
            }
        }
    }

    fn slice_bound(&mut self, bound: Option<&Spanned<Expr>>, scope: &Scope) -> Result<Option<i64>> {
        let Some(expr) = bound else {
            return Ok(None);
        };
        let value = self.eval_expr(expr, scope)?;
        if value.is_none() {
            return Ok(None);
        }
        value
            .as_int()
            .map(Some)
            .ok_or_else(|| Error::type_mismatch("slice indices must be integers"))
    }

    /// Evaluate an expression, growing the native stack when needed
    pub(super) fn eval_expr(&mut self, expr: &Spanned<Expr>, scope: &Scope) -> Result<ObjRef> {
        let (red_zone, grow) = (self.config.stack_red_zone, self.config.stack_grow_size);
        stacker::maybe_grow(red_zone, grow, || self.eval_inner(expr, scope))
    }

    fn eval_inner(&mut self, expr: &Spanned<Expr>, scope: &Scope) -> Result<ObjRef> {
        match &expr.node {
            Expr::Int(n) => Ok(ObjRef::int(*n)),
            Expr::Float(x) => Ok(ObjRef::float(*x)),
            Expr::Str(s) => Ok(ObjRef::str(s.as_str())),
            Expr::Name(name) => scope.lookup(name, &self.builtins),

            Expr::Tuple(items) => Ok(ObjRef::tuple(self.eval_all(items, scope)?)),
            Expr::List(items) => Ok(ObjRef::list(self.eval_all(items, scope)?)),
            Expr::Dict(entries) => {
                let mut dict = Dict::new();
                for (key, value) in entries {
                    let key = self.eval_expr(key, scope)?;
                    let value = self.eval_expr(value, scope)?;
                    dict.insert(key, value)?;
                }
                Ok(ObjRef::dict(dict))
            }

            Expr::Call { func, args } => {
                let func = self.eval_expr(func, scope)?;
                let args = self.eval_all(args, scope)?;
                self.call_object(&func, ObjRef::tuple(args))
            }
            Expr::Index { target, index } => {
                let container = self.eval_expr(target, scope)?;
                let key = self.eval_expr(index, scope)?;
                ops::get_item(&container, &key)
            }
            Expr::Slice { target, lo, hi } => {
                let container = self.eval_expr(target, scope)?;
                let lo = self.slice_bound(lo.as_deref(), scope)?;
                let hi = self.slice_bound(hi.as_deref(), scope)?;
                ops::get_slice(&container, lo, hi)
            }

            Expr::Unary { op, expr } => {
                let value = self.eval_expr(expr, scope)?;
                match op {
                    UnOp::Neg => ops::negative(&value),
                    UnOp::Not => Ok(ObjRef::bool(!value.is_true())),
                }
            }
            Expr::Binary { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                ops::binary(*op, &left, &right)
            }
            Expr::Compare { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                ops::rich(*op, &left, &right).map(ObjRef::bool)
            }
            Expr::Logical { left, op, right } => {
                let left = self.eval_expr(left, scope)?;
                let short_circuit = match op {
                    LogicOp::And => !left.is_true(),
                    LogicOp::Or => left.is_true(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval_expr(right, scope)
                }
            }
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond, scope)?.is_true() {
                    self.eval_expr(then_branch, scope)
                } else {
                    self.eval_expr(else_branch, scope)
                }
            }

            Expr::Lambda(def) => Ok(ObjRef::new(Object::Function(Function {
                def: Rc::clone(def),
                globals: scope.globals.clone(),
            }))),
        }
    }

    fn eval_all(&mut self, exprs: &[Spanned<Expr>], scope: &Scope) -> Result<Vec<ObjRef>> {
        let mut values = Vec::new();
        values.try_reserve_exact(exprs.len())?;
        for expr in exprs {
            values.push(self.eval_expr(expr, scope)?);
        }
        Ok(values)
    }
}
