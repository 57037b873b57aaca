use rustc_hash::FxHashMap;

use super::scope::{DeclRecord, ScopeStack};
use super::ty::Ty;
use crate::diagnostics::Reporter;
use crate::lexer::{Token, TokenKind};
use crate::parser::ast::{Decl, Expr, Node, Stmt};

/// Run name resolution and type checking over the parsed tree.
///
/// The tree structure is never changed; the only mutation is the final
/// back-patch of inferred type names onto `let` declarations that carried
/// no annotation. Violations are reported through the reporter and the
/// traversal continues, propagating `void` as a sentinel type. Returns
/// true when at least one error was reported.
pub fn analyze(nodes: &mut [Node], reporter: &mut Reporter) -> bool {
    let mut analyzer = Analyzer::new(reporter);

    analyzer.scopes.begin();
    for ty in [Ty::Undef, Ty::Void, Ty::Int, Ty::Float, Ty::Bool] {
        analyzer.scopes.declare(ty.name(), DeclRecord::Type { ty });
    }

    for node in nodes.iter() {
        analyzer.check_node(node);
    }

    analyzer.scopes.end();

    let had_error = analyzer.had_error;
    let inferred = analyzer.inferred;
    patch_nodes(nodes, &inferred);

    had_error
}

#[derive(Debug, Clone)]
struct FnContext {
    return_ty: Ty,
    token: Token,
}

struct Analyzer<'r, 'src> {
    reporter: &'r mut Reporter<'src>,
    scopes: ScopeStack,
    /// Inferred types for unannotated `let` declarations, keyed by the
    /// declaring token's character offset
    inferred: FxHashMap<usize, Ty>,
    current_fn: Option<FnContext>,
    loop_depth: usize,
    had_error: bool,
}

impl<'r, 'src> Analyzer<'r, 'src> {
    fn new(reporter: &'r mut Reporter<'src>) -> Self {
        Self {
            reporter,
            scopes: ScopeStack::new(),
            inferred: FxHashMap::default(),
            current_fn: None,
            loop_depth: 0,
            had_error: false,
        }
    }

    fn error(&mut self, message: &str, token: &Token) {
        self.had_error = true;
        self.reporter.error_at(message, token);
    }

    /// An error plus a marker pointing at the related prior declaration.
    /// Pre-seeded records have no declaring token; the related message is
    /// then printed as a bare hint.
    fn comparative_error(
        &mut self,
        message: &str,
        token: &Token,
        related_message: &str,
        related_token: Option<&Token>,
    ) {
        self.had_error = true;
        self.reporter.error_at(message, token);
        match related_token {
            Some(related) => self.reporter.related_at(related_message, related),
            None => self.reporter.hint(related_message),
        }
    }

    /// Declare into the current scope; redeclaration within the same scope
    /// is an error, shadowing an outer scope is not
    fn declare(&mut self, name: &str, record: DeclRecord, at: &Token) {
        let previous = self
            .scopes
            .declared_in_top(name)
            .map(|prev| prev.declared_at().cloned());

        if let Some(previous) = previous {
            self.comparative_error("Already declared", at, "Declared here", previous.as_ref());
            return;
        }

        self.scopes.declare(name, record);
    }

    /// Resolve a type annotation to a canonical type. A missing annotation
    /// resolves to the `undef_type` sentinel.
    fn resolve_type_name(&mut self, annotation: Option<&str>, at: &Token) -> Option<Ty> {
        let Some(type_name) = annotation else {
            return Some(Ty::Undef);
        };

        enum Lookup {
            Missing,
            Found(Ty),
            NotAType(Option<Token>),
        }

        let lookup = match self.scopes.lookup(type_name) {
            None => Lookup::Missing,
            Some(DeclRecord::Type { ty }) => Lookup::Found(*ty),
            Some(other) => Lookup::NotAType(other.declared_at().cloned()),
        };

        match lookup {
            Lookup::Found(ty) => Some(ty),
            Lookup::Missing => {
                self.error(&format!("Undeclared type {}", type_name), at);
                None
            }
            Lookup::NotAType(previous) => {
                self.comparative_error("Invalid type", at, "This is not a type", previous.as_ref());
                None
            }
        }
    }

    fn check_node(&mut self, node: &Node) {
        match node {
            Node::Expr(expr) => {
                self.check_expr(expr);
            }
            Node::Stmt(stmt) => self.check_stmt(stmt),
            Node::Decl(decl) => self.check_decl(decl),
            Node::Err(err) => {
                self.error(&format!("Error node detected. {}", err.message), &err.token);
            }
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr { expr } | Stmt::Debug { expr, .. } => {
                self.check_expr(expr);
            }
            Stmt::Block { nodes, .. } => {
                for node in nodes {
                    self.check_node(node);
                }
            }
            Stmt::Closure { nodes, .. } => {
                self.scopes.begin();
                for node in nodes {
                    self.check_node(node);
                }
                self.scopes.end();
            }
            Stmt::Conditional {
                token,
                condition,
                then_branch,
                else_branch,
            } => {
                let condition_ty = self.check_expr(condition);
                if condition_ty != Ty::Bool && condition_ty != Ty::Void {
                    self.comparative_error(
                        "Unexpected condition type",
                        condition.token(),
                        "Expected bool",
                        Some(token),
                    );
                }

                self.check_node(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_node(else_branch);
                }
            }
            Stmt::While {
                token,
                condition,
                body,
            } => {
                let condition_ty = self.check_expr(condition);
                if condition_ty != Ty::Bool && condition_ty != Ty::Void {
                    self.comparative_error(
                        "Unexpected condition type",
                        condition.token(),
                        "Expected bool type",
                        Some(token),
                    );
                }

                self.loop_depth += 1;
                self.check_node(body);
                self.loop_depth -= 1;
            }
            Stmt::Return { token, expr } => {
                let Some(function) = self.current_fn.clone() else {
                    self.error("Cannot return outside of function", token);
                    return;
                };

                let return_ty = match expr {
                    Some(expr) => self.check_expr(expr),
                    None => Ty::Void,
                };

                if return_ty != function.return_ty {
                    self.comparative_error(
                        &format!("Invalid return type {}", return_ty),
                        token,
                        &format!("Function expects return type of {}", function.return_ty),
                        Some(&function.token),
                    );
                }
            }
            Stmt::Continue { token } => {
                if self.loop_depth == 0 {
                    self.error("Cannot continue outside of loop", token);
                }
            }
            Stmt::Break { token } => {
                if self.loop_depth == 0 {
                    self.error("Cannot break outside of loop", token);
                }
            }
        }
    }

    fn check_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Let {
                token,
                name,
                ty_name,
            } => {
                let Some(ty) = self.resolve_type_name(ty_name.as_deref(), name) else {
                    return;
                };

                let record = DeclRecord::Var {
                    ty,
                    initialized: false,
                    declared_at: name.clone(),
                    let_index: Some(token.position.index),
                };
                self.declare(&name.lexeme, record, name);
            }
            Decl::Function {
                name,
                params,
                return_ty,
                body,
                ..
            } => {
                let return_ty = match return_ty {
                    None => Ty::Void,
                    Some(type_name) => match self.resolve_type_name(Some(type_name), name) {
                        Some(ty) => ty,
                        None => return,
                    },
                };

                let mut param_tys = Vec::new();
                for param in params {
                    match self.resolve_type_name(Some(&param.ty_name), name) {
                        Some(ty) => param_tys.push(ty),
                        None => return,
                    }
                }

                let record = DeclRecord::Fn {
                    return_ty,
                    param_tys: param_tys.clone(),
                    declared_at: name.clone(),
                };
                self.declare(&name.lexeme, record, name);

                // Parameters live in the function scope; the body closure
                // does not open another scope for them
                self.scopes.begin();
                let previous_fn = self.current_fn.replace(FnContext {
                    return_ty,
                    token: name.clone(),
                });
                let previous_loop_depth = std::mem::replace(&mut self.loop_depth, 0);

                for (param, ty) in params.iter().zip(param_tys) {
                    let record = DeclRecord::Var {
                        ty,
                        initialized: true,
                        declared_at: name.clone(),
                        let_index: None,
                    };
                    self.declare(&param.name, record, name);
                }

                if let Stmt::Closure { nodes, .. } = body.as_ref() {
                    for node in nodes {
                        self.check_node(node);
                    }
                }

                self.loop_depth = previous_loop_depth;
                self.current_fn = previous_fn;
                self.scopes.end();
            }
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Ty {
        match expr {
            Expr::IntegerLit { .. } => Ty::Int,
            Expr::FloatingLit { .. } => Ty::Float,
            Expr::BooleanLit { .. } => Ty::Bool,
            Expr::IdentifierLit { token } => self.check_identifier(token),
            Expr::Unary { op, expr } => {
                let ty = self.check_expr(expr);
                if ty == Ty::Void {
                    return Ty::Void;
                }

                match op.kind {
                    TokenKind::Bang => {
                        if ty != Ty::Bool {
                            self.error("Unary operation only possible on type bool", op);
                        }
                    }
                    TokenKind::Plus | TokenKind::Minus => {
                        if !ty.is_numeric() {
                            self.error("Unary operation only possible on types int and float", op);
                        }
                    }
                    _ => {}
                }

                ty
            }
            Expr::Binary { left, op, right } => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);

                // A void operand is the sentinel of an already reported
                // error; stay quiet instead of cascading
                if left_ty == Ty::Void || right_ty == Ty::Void {
                    return Ty::Void;
                }

                if left_ty != right_ty {
                    self.error("Type mismatch in binary expression", op);
                    self.reporter
                        .hint(&format!("type {} != type {}", left_ty, right_ty));
                    return Ty::Void;
                }

                match op.kind {
                    TokenKind::Less
                    | TokenKind::Greater
                    | TokenKind::LessEqual
                    | TokenKind::GreaterEqual
                    | TokenKind::EqualEqual
                    | TokenKind::NotEqual => Ty::Bool,
                    TokenKind::AndAnd | TokenKind::OrOr => {
                        if left_ty != Ty::Bool {
                            self.error("Logical operation requires bool operands", op);
                            return Ty::Void;
                        }
                        Ty::Bool
                    }
                    _ => left_ty,
                }
            }
            Expr::Assign { name, op, value } => self.check_assign(name, op, value),
            Expr::Call {
                paren,
                callee,
                arguments,
            } => self.check_call(paren, callee, arguments),
        }
    }

    fn check_identifier(&mut self, token: &Token) -> Ty {
        enum Found {
            Missing,
            Uninitialized,
            Value(Ty),
            NotAValue,
        }

        let found = match self.scopes.lookup(&token.lexeme) {
            None => Found::Missing,
            Some(DeclRecord::Var {
                initialized: false, ..
            }) => Found::Uninitialized,
            Some(DeclRecord::Var { ty, .. }) => Found::Value(*ty),
            Some(_) => Found::NotAValue,
        };

        match found {
            Found::Value(ty) => ty,
            Found::Missing => {
                self.error("Undeclared identifier", token);
                Ty::Void
            }
            Found::Uninitialized => {
                self.error("Undefined variable", token);
                Ty::Void
            }
            Found::NotAValue => Ty::Void,
        }
    }

    /// The definition half of a desugared `let`, and every later
    /// reassignment. Marks the variable initialized, and infers its type
    /// from the value when the declaration carried no annotation.
    fn check_assign(&mut self, name: &Token, op: &Token, value: &Expr) -> Ty {
        let value_ty = self.check_expr(value);

        enum Target {
            Missing,
            NotAVariable,
            Variable {
                ty: Ty,
                initialized: bool,
                let_index: Option<usize>,
            },
        }

        let target = match self.scopes.lookup(&name.lexeme) {
            None => Target::Missing,
            Some(DeclRecord::Var {
                ty,
                initialized,
                let_index,
                ..
            }) => Target::Variable {
                ty: *ty,
                initialized: *initialized,
                let_index: *let_index,
            },
            Some(_) => Target::NotAVariable,
        };

        let (declared_ty, initialized, let_index) = match target {
            Target::Missing => {
                self.error("Cannot define undeclared identifier", name);
                return Ty::Void;
            }
            Target::NotAVariable => {
                self.error("Assign target is not a variable", name);
                return Ty::Void;
            }
            Target::Variable {
                ty,
                initialized,
                let_index,
            } => (ty, initialized, let_index),
        };

        // Compound assignment reads the variable before writing it
        if op.kind != TokenKind::Equal && !initialized {
            self.error("Undefined variable", name);
        }

        let mut new_ty = declared_ty;
        let mut result = value_ty;

        if declared_ty == Ty::Undef {
            if value_ty != Ty::Void {
                new_ty = value_ty;
                if let Some(index) = let_index {
                    self.inferred.insert(index, value_ty);
                }
            }
        } else if value_ty != Ty::Void && declared_ty != value_ty {
            self.error("Unexpected type", value.token());
            self.reporter
                .hint(&format!("Expected value of type {}", declared_ty));
            result = Ty::Void;
        }

        if let Some(DeclRecord::Var {
            ty, initialized, ..
        }) = self.scopes.lookup_mut(&name.lexeme)
        {
            *ty = new_ty;
            *initialized = true;
        }

        result
    }

    fn check_call(&mut self, paren: &Token, callee: &Expr, arguments: &[Expr]) -> Ty {
        let Expr::IdentifierLit { token } = callee else {
            self.check_expr(callee);
            self.error("Expected function", callee.token());
            return Ty::Void;
        };

        enum Target {
            Missing,
            NotAFunction,
            Function {
                return_ty: Ty,
                param_tys: Vec<Ty>,
                declared_at: Token,
            },
        }

        let target = match self.scopes.lookup(&token.lexeme) {
            None => Target::Missing,
            Some(DeclRecord::Fn {
                return_ty,
                param_tys,
                declared_at,
            }) => Target::Function {
                return_ty: *return_ty,
                param_tys: param_tys.clone(),
                declared_at: declared_at.clone(),
            },
            Some(_) => Target::NotAFunction,
        };

        let (return_ty, param_tys, declared_at) = match target {
            Target::Missing => {
                self.error("Undeclared identifier", token);
                return Ty::Void;
            }
            Target::NotAFunction => {
                self.error("Expected function", token);
                return Ty::Void;
            }
            Target::Function {
                return_ty,
                param_tys,
                declared_at,
            } => (return_ty, param_tys, declared_at),
        };

        if arguments.len() != param_tys.len() {
            self.comparative_error(
                "Argument count mismatch",
                paren,
                &format!("Function has {} parameters", param_tys.len()),
                Some(&declared_at),
            );
            return Ty::Void;
        }

        for (position, (argument, expected)) in arguments.iter().zip(&param_tys).enumerate() {
            let argument_ty = self.check_expr(argument);
            if argument_ty != Ty::Void && argument_ty != *expected {
                self.comparative_error(
                    "Invalid argument type",
                    argument.token(),
                    &format!("Function expects {} at position {}", expected, position),
                    Some(&declared_at),
                );
                return Ty::Void;
            }
        }

        return_ty
    }
}

fn patch_nodes(nodes: &mut [Node], inferred: &FxHashMap<usize, Ty>) {
    for node in nodes {
        patch_node(node, inferred);
    }
}

fn patch_node(node: &mut Node, inferred: &FxHashMap<usize, Ty>) {
    match node {
        Node::Decl(Decl::Let { token, ty_name, .. }) => {
            if ty_name.is_none() {
                if let Some(ty) = inferred.get(&token.position.index) {
                    *ty_name = Some(ty.name().to_string());
                }
            }
        }
        Node::Decl(Decl::Function { body, .. }) => patch_stmt(body, inferred),
        Node::Stmt(stmt) => patch_stmt(stmt, inferred),
        Node::Expr(_) | Node::Err(_) => {}
    }
}

fn patch_stmt(stmt: &mut Stmt, inferred: &FxHashMap<usize, Ty>) {
    match stmt {
        Stmt::Block { nodes, .. } | Stmt::Closure { nodes, .. } => patch_nodes(nodes, inferred),
        Stmt::Conditional {
            then_branch,
            else_branch,
            ..
        } => {
            patch_node(then_branch, inferred);
            if let Some(else_branch) = else_branch {
                patch_node(else_branch, inferred);
            }
        }
        Stmt::While { body, .. } => patch_node(body, inferred),
        _ => {}
    }
}
