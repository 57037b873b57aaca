use std::fmt;

use crate::lexer::token::Token;

/// A top-level node: one of the four node categories
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expr(Expr),
    Stmt(Stmt),
    Decl(Decl),
    Err(ErrNode),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntegerLit {
        token: Token,
    },
    FloatingLit {
        token: Token,
    },
    BooleanLit {
        token: Token,
    },
    IdentifierLit {
        token: Token,
    },
    Unary {
        op: Token,
        expr: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    Assign {
        name: Token,
        op: Token,
        value: Box<Expr>,
    },
    Call {
        paren: Token,
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr {
        expr: Expr,
    },
    /// A plain sequence of nodes; does not introduce a scope.
    /// This is also the desugared form of an initialized `let`.
    Block {
        token: Token,
        nodes: Vec<Node>,
    },
    /// A braced block that introduces a scope
    Closure {
        token: Token,
        nodes: Vec<Node>,
    },
    Conditional {
        token: Token,
        condition: Expr,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    While {
        token: Token,
        condition: Expr,
        body: Box<Node>,
    },
    Debug {
        token: Token,
        expr: Expr,
    },
    Return {
        token: Token,
        expr: Option<Expr>,
    },
    Continue {
        token: Token,
    },
    Break {
        token: Token,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// `ty_name` is the annotated type, if any; the analyzer back-patches
    /// it with the inferred type name when the annotation was omitted.
    Let {
        token: Token,
        name: Token,
        ty_name: Option<String>,
    },
    /// The body is always a `Stmt::Closure`
    Function {
        token: Token,
        name: Token,
        params: Vec<Param>,
        return_ty: Option<String>,
        body: Box<Stmt>,
    },
}

/// A syntax error produced by the parser in place of a subtree
#[derive(Debug, Clone, PartialEq)]
pub struct ErrNode {
    pub token: Token,
    pub message: String,
    pub hint: String,
}

impl ErrNode {
    pub fn new(token: Token, message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            token,
            message: message.into(),
            hint: hint.into(),
        }
    }
}

impl Expr {
    /// The token identifying this expression's source location
    pub fn token(&self) -> &Token {
        match self {
            Expr::IntegerLit { token }
            | Expr::FloatingLit { token }
            | Expr::BooleanLit { token }
            | Expr::IdentifierLit { token } => token,
            Expr::Unary { op, .. } => op,
            Expr::Binary { op, .. } => op,
            Expr::Assign { name, .. } => name,
            Expr::Call { paren, .. } => paren,
        }
    }
}

impl Stmt {
    pub fn token(&self) -> &Token {
        match self {
            Stmt::Expr { expr } => expr.token(),
            Stmt::Block { token, .. }
            | Stmt::Closure { token, .. }
            | Stmt::Conditional { token, .. }
            | Stmt::While { token, .. }
            | Stmt::Debug { token, .. }
            | Stmt::Return { token, .. }
            | Stmt::Continue { token }
            | Stmt::Break { token } => token,
        }
    }
}

impl Decl {
    pub fn token(&self) -> &Token {
        match self {
            Decl::Let { token, .. } | Decl::Function { token, .. } => token,
        }
    }
}

impl Node {
    pub fn token(&self) -> &Token {
        match self {
            Node::Expr(expr) => expr.token(),
            Node::Stmt(stmt) => stmt.token(),
            Node::Decl(decl) => decl.token(),
            Node::Err(err) => &err.token,
        }
    }

    /// True when an `ErrNode` appears anywhere in this subtree
    pub fn contains_err(&self) -> bool {
        match self {
            Node::Err(_) => true,
            Node::Expr(_) => false,
            Node::Decl(Decl::Let { .. }) => false,
            Node::Decl(Decl::Function { body, .. }) => stmt_contains_err(body),
            Node::Stmt(stmt) => stmt_contains_err(stmt),
        }
    }
}

fn stmt_contains_err(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Block { nodes, .. } | Stmt::Closure { nodes, .. } => {
            nodes.iter().any(Node::contains_err)
        }
        Stmt::Conditional {
            then_branch,
            else_branch,
            ..
        } => {
            then_branch.contains_err()
                || else_branch.as_ref().is_some_and(|node| node.contains_err())
        }
        Stmt::While { body, .. } => body.contains_err(),
        _ => false,
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Expr(expr) => expr.fmt(f),
            Node::Stmt(stmt) => stmt.fmt(f),
            Node::Decl(decl) => decl.fmt(f),
            Node::Err(err) => write!(f, "(Err {})", err.message),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntegerLit { token } => write!(f, "(IntegerLit {})", token.lexeme),
            Expr::FloatingLit { token } => write!(f, "(FloatingLit {})", token.lexeme),
            Expr::BooleanLit { token } => write!(f, "(BooleanLit {})", token.lexeme),
            Expr::IdentifierLit { token } => write!(f, "(Identifier {})", token.lexeme),
            Expr::Unary { op, expr } => write!(f, "(Unary {} {})", op.lexeme, expr),
            Expr::Binary { left, op, right } => {
                write!(f, "(Binary {} {} {})", op.lexeme, left, right)
            }
            Expr::Assign { name, op, value } => {
                write!(f, "(Assign {} {} {})", op.lexeme, name.lexeme, value)
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                write!(f, "(Call {}", callee)?;
                for argument in arguments {
                    write!(f, " {}", argument)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expr { expr } => write!(f, "(ExprStmt {})", expr),
            Stmt::Block { nodes, .. } => write_nodes(f, "Block", nodes),
            Stmt::Closure { nodes, .. } => write_nodes(f, "Closure", nodes),
            Stmt::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                write!(f, "(Conditional {} {}", condition, then_branch)?;
                if let Some(else_branch) = else_branch {
                    write!(f, " else {}", else_branch)?;
                }
                write!(f, ")")
            }
            Stmt::While { condition, body, .. } => write!(f, "(While {} {})", condition, body),
            Stmt::Debug { expr, .. } => write!(f, "(Debug {})", expr),
            Stmt::Return { expr, .. } => match expr {
                Some(expr) => write!(f, "(Return {})", expr),
                None => write!(f, "(Return)"),
            },
            Stmt::Continue { .. } => write!(f, "(Continue)"),
            Stmt::Break { .. } => write!(f, "(Break)"),
        }
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Let { name, ty_name, .. } => match ty_name {
                Some(ty_name) => write!(f, "(LetDecl {} {})", name.lexeme, ty_name),
                None => write!(f, "(LetDecl {})", name.lexeme),
            },
            Decl::Function {
                name,
                params,
                return_ty,
                body,
                ..
            } => {
                write!(f, "(FunctionDecl {}", name.lexeme)?;
                for param in params {
                    write!(f, " ({} {})", param.ty_name, param.name)?;
                }
                write!(
                    f,
                    " {} {})",
                    return_ty.as_deref().unwrap_or("void"),
                    body
                )
            }
        }
    }
}

fn write_nodes(f: &mut fmt::Formatter<'_>, label: &str, nodes: &[Node]) -> fmt::Result {
    write!(f, "({}", label)?;
    for node in nodes {
        write!(f, " {}", node)?;
    }
    write!(f, ")")
}
