//! Lowering of the analyzed tree into a C translation unit.
//!
//! The mapping is an identity wherever possible: primitive type names pass
//! through unchanged, operators transliterate one-to-one, and every
//! expression is parenthesized so the output carries no operator-precedence
//! ambiguity. Function definitions are hoisted into the unit header;
//! remaining top-level statements form the body of `main`.

use crate::lexer::TokenKind;
use crate::parser::ast::{Decl, Expr, Node, Stmt};

/// Lower a fully analyzed tree to C source, shaped as `{header}\n{body}`.
///
/// The input must be free of error nodes; encountering one here is a
/// compiler bug and panics.
pub fn emit(nodes: &[Node]) -> String {
    let mut emitter = Emitter::new();
    let mut body = String::new();

    for node in nodes {
        emitter.node(node, &mut body);
    }

    format!(
        "{}\nint main(void)\n{{\n{}return 0;\n}}\n",
        emitter.header, body
    )
}

struct Emitter {
    header: String,
}

fn type_name(name: Option<&str>) -> &str {
    name.unwrap_or("void")
}

impl Emitter {
    fn new() -> Self {
        Self {
            header: "#include <stdbool.h>\n".to_string(),
        }
    }

    fn node(&mut self, node: &Node, out: &mut String) {
        match node {
            Node::Decl(decl) => self.decl(decl, out),
            Node::Stmt(stmt) => self.stmt(stmt, out),
            Node::Expr(expr) => {
                expr_text(expr, out);
                out.push_str(";\n");
            }
            Node::Err(err) => panic!("error node reached the emitter: {}", err.message),
        }
    }

    fn decl(&mut self, decl: &Decl, out: &mut String) {
        match decl {
            Decl::Let { name, ty_name, .. } => {
                out.push_str(type_name(ty_name.as_deref()));
                out.push(' ');
                out.push_str(&name.lexeme);
                out.push_str(";\n");
            }
            Decl::Function {
                name,
                params,
                return_ty,
                body,
                ..
            } => {
                let mut function = String::new();
                function.push_str(type_name(return_ty.as_deref()));
                function.push(' ');
                function.push_str(&name.lexeme);
                function.push('(');
                for (index, param) in params.iter().enumerate() {
                    function.push_str(&param.ty_name);
                    function.push(' ');
                    function.push_str(&param.name);
                    if index != params.len() - 1 {
                        function.push_str(", ");
                    }
                }
                function.push_str(")\n");

                self.stmt(body, &mut function);

                self.header.push_str(&function);
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt, out: &mut String) {
        match stmt {
            Stmt::Expr { expr } | Stmt::Debug { expr, .. } => {
                expr_text(expr, out);
                out.push_str(";\n");
            }
            Stmt::Block { nodes, .. } => {
                for node in nodes {
                    self.node(node, out);
                }
            }
            Stmt::Closure { nodes, .. } => {
                out.push_str("{\n");
                for node in nodes {
                    self.node(node, out);
                }
                out.push_str("}\n");
            }
            Stmt::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                out.push_str("if (");
                expr_text(condition, out);
                out.push_str(")\n");
                self.node(then_branch, out);
                if let Some(else_branch) = else_branch {
                    out.push_str("else\n");
                    self.node(else_branch, out);
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                out.push_str("while (");
                expr_text(condition, out);
                out.push_str(")\n");
                self.node(body, out);
            }
            Stmt::Return { expr, .. } => {
                out.push_str("return");
                if let Some(expr) = expr {
                    out.push(' ');
                    expr_text(expr, out);
                }
                out.push_str(";\n");
            }
            Stmt::Continue { .. } => out.push_str("continue;\n"),
            Stmt::Break { .. } => out.push_str("break;\n"),
        }
    }
}

fn expr_text(expr: &Expr, out: &mut String) {
    match expr {
        Expr::IntegerLit { token }
        | Expr::FloatingLit { token }
        | Expr::BooleanLit { token }
        | Expr::IdentifierLit { token } => out.push_str(&token.lexeme),
        Expr::Unary { op, expr } => {
            out.push('(');
            out.push_str(unary_operator(op.kind));
            expr_text(expr, out);
            out.push(')');
        }
        Expr::Binary { left, op, right } => {
            out.push('(');
            expr_text(left, out);
            out.push_str(binary_operator(op.kind));
            expr_text(right, out);
            out.push(')');
        }
        Expr::Assign { name, op, value } => {
            out.push('(');
            out.push_str(&name.lexeme);
            out.push(' ');
            out.push_str(assign_operator(op.kind));
            out.push(' ');
            expr_text(value, out);
            out.push(')');
        }
        Expr::Call {
            callee, arguments, ..
        } => {
            expr_text(callee, out);
            out.push('(');
            for (index, argument) in arguments.iter().enumerate() {
                expr_text(argument, out);
                if index != arguments.len() - 1 {
                    out.push_str(", ");
                }
            }
            out.push(')');
        }
    }
}

fn binary_operator(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Less => "<",
        TokenKind::Greater => ">",
        TokenKind::LessEqual => "<=",
        TokenKind::GreaterEqual => ">=",
        TokenKind::EqualEqual => "==",
        TokenKind::NotEqual => "!=",
        TokenKind::AndAnd => "&&",
        TokenKind::OrOr => "||",
        _ => panic!("missing binary operator translation for C: {:?}", kind),
    }
}

fn unary_operator(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Minus => "-",
        TokenKind::Plus => "+",
        TokenKind::Bang => "!",
        _ => panic!("missing unary operator translation for C: {:?}", kind),
    }
}

fn assign_operator(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Equal => "=",
        TokenKind::PlusEqual => "+=",
        TokenKind::MinusEqual => "-=",
        TokenKind::StarEqual => "*=",
        TokenKind::SlashEqual => "/=",
        _ => panic!("missing assignment operator translation for C: {:?}", kind),
    }
}
