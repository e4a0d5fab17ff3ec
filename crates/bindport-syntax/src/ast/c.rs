//! C translation-unit AST, as dumped by pycparser's `c_json` module.
//!
//! Every node is a JSON object tagged with `_nodetype`; attributes and
//! children are keyed by their pycparser names. `coord` and any other
//! bookkeeping fields are ignored. Empty child lists are dumped as `null`,
//! so list children accept both.

use serde::{Deserialize, Deserializer};

fn nullable<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A C AST node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "_nodetype")]
pub enum Node {
    #[serde(rename = "FileAST")]
    FileAst {
        #[serde(default, deserialize_with = "nullable")]
        ext: Vec<Node>,
    },
    FuncDef {
        decl: Box<Node>,
        #[serde(default, deserialize_with = "nullable")]
        param_decls: Vec<Node>,
        body: Box<Node>,
    },

    // Declarations and types
    Decl {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "nullable")]
        quals: Vec<String>,
        #[serde(default, deserialize_with = "nullable")]
        storage: Vec<String>,
        #[serde(rename = "type")]
        ty: Box<Node>,
        #[serde(default)]
        init: Option<Box<Node>>,
        #[serde(default)]
        bitsize: Option<Box<Node>>,
    },
    DeclList {
        #[serde(default, deserialize_with = "nullable")]
        decls: Vec<Node>,
    },
    TypeDecl {
        #[serde(default)]
        declname: Option<String>,
        #[serde(rename = "type")]
        ty: Box<Node>,
    },
    IdentifierType {
        #[serde(default, deserialize_with = "nullable")]
        names: Vec<String>,
    },
    PtrDecl {
        #[serde(rename = "type")]
        ty: Box<Node>,
    },
    ArrayDecl {
        #[serde(rename = "type")]
        ty: Box<Node>,
        #[serde(default)]
        dim: Option<Box<Node>>,
    },
    FuncDecl {
        #[serde(default)]
        args: Option<Box<Node>>,
        #[serde(rename = "type")]
        ty: Box<Node>,
    },
    ParamList {
        #[serde(default, deserialize_with = "nullable")]
        params: Vec<Node>,
    },
    EllipsisParam {},
    Typedef {
        name: String,
        #[serde(rename = "type")]
        ty: Box<Node>,
    },
    Typename {
        #[serde(default)]
        name: Option<String>,
        #[serde(rename = "type")]
        ty: Box<Node>,
    },
    Struct {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        decls: Option<Vec<Node>>,
    },
    Union {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        decls: Option<Vec<Node>>,
    },
    Enum {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        values: Option<Box<Node>>,
    },
    EnumeratorList {
        #[serde(default, deserialize_with = "nullable")]
        enumerators: Vec<Node>,
    },
    Enumerator {
        name: String,
        #[serde(default)]
        value: Option<Box<Node>>,
    },

    // Expressions
    Constant {
        #[serde(rename = "type")]
        ty: String,
        value: String,
    },
    #[serde(rename = "ID")]
    Id { name: String },
    BinaryOp {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    UnaryOp { op: String, expr: Box<Node> },
    Assignment {
        op: String,
        lvalue: Box<Node>,
        rvalue: Box<Node>,
    },
    TernaryOp {
        cond: Box<Node>,
        iftrue: Box<Node>,
        iffalse: Box<Node>,
    },
    FuncCall {
        name: Box<Node>,
        #[serde(default)]
        args: Option<Box<Node>>,
    },
    ArrayRef {
        name: Box<Node>,
        subscript: Box<Node>,
    },
    StructRef {
        name: Box<Node>,
        #[serde(rename = "type")]
        ty: String,
        field: Box<Node>,
    },
    Cast { to_type: Box<Node>, expr: Box<Node> },
    ExprList {
        #[serde(default, deserialize_with = "nullable")]
        exprs: Vec<Node>,
    },
    InitList {
        #[serde(default, deserialize_with = "nullable")]
        exprs: Vec<Node>,
    },
    NamedInitializer {
        #[serde(default, deserialize_with = "nullable")]
        name: Vec<Node>,
        expr: Box<Node>,
    },
    CompoundLiteral {
        #[serde(rename = "type")]
        ty: Box<Node>,
        init: Box<Node>,
    },

    // Statements
    Compound {
        #[serde(default, deserialize_with = "nullable")]
        block_items: Vec<Node>,
    },
    If {
        cond: Box<Node>,
        iftrue: Box<Node>,
        #[serde(default)]
        iffalse: Option<Box<Node>>,
    },
    For {
        #[serde(default)]
        init: Option<Box<Node>>,
        #[serde(default)]
        cond: Option<Box<Node>>,
        #[serde(default)]
        next: Option<Box<Node>>,
        stmt: Box<Node>,
    },
    While { cond: Box<Node>, stmt: Box<Node> },
    DoWhile { cond: Box<Node>, stmt: Box<Node> },
    Switch { cond: Box<Node>, stmt: Box<Node> },
    Case {
        expr: Box<Node>,
        #[serde(default, deserialize_with = "nullable")]
        stmts: Vec<Node>,
    },
    Default {
        #[serde(default, deserialize_with = "nullable")]
        stmts: Vec<Node>,
    },
    Break {},
    Continue {},
    Return {
        #[serde(default)]
        expr: Option<Box<Node>>,
    },
    Goto { name: String },
    Label { name: String, stmt: Box<Node> },
    EmptyStatement {},
    Pragma {
        #[serde(default)]
        string: Option<String>,
    },
    StaticAssert {
        cond: Box<Node>,
        #[serde(default)]
        message: Option<Box<Node>>,
    },
}

impl Node {
    /// pycparser class name of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::FileAst { .. } => "FileAST",
            Node::FuncDef { .. } => "FuncDef",
            Node::Decl { .. } => "Decl",
            Node::DeclList { .. } => "DeclList",
            Node::TypeDecl { .. } => "TypeDecl",
            Node::IdentifierType { .. } => "IdentifierType",
            Node::PtrDecl { .. } => "PtrDecl",
            Node::ArrayDecl { .. } => "ArrayDecl",
            Node::FuncDecl { .. } => "FuncDecl",
            Node::ParamList { .. } => "ParamList",
            Node::EllipsisParam {} => "EllipsisParam",
            Node::Typedef { .. } => "Typedef",
            Node::Typename { .. } => "Typename",
            Node::Struct { .. } => "Struct",
            Node::Union { .. } => "Union",
            Node::Enum { .. } => "Enum",
            Node::EnumeratorList { .. } => "EnumeratorList",
            Node::Enumerator { .. } => "Enumerator",
            Node::Constant { .. } => "Constant",
            Node::Id { .. } => "ID",
            Node::BinaryOp { .. } => "BinaryOp",
            Node::UnaryOp { .. } => "UnaryOp",
            Node::Assignment { .. } => "Assignment",
            Node::TernaryOp { .. } => "TernaryOp",
            Node::FuncCall { .. } => "FuncCall",
            Node::ArrayRef { .. } => "ArrayRef",
            Node::StructRef { .. } => "StructRef",
            Node::Cast { .. } => "Cast",
            Node::ExprList { .. } => "ExprList",
            Node::InitList { .. } => "InitList",
            Node::NamedInitializer { .. } => "NamedInitializer",
            Node::CompoundLiteral { .. } => "CompoundLiteral",
            Node::Compound { .. } => "Compound",
            Node::If { .. } => "If",
            Node::For { .. } => "For",
            Node::While { .. } => "While",
            Node::DoWhile { .. } => "DoWhile",
            Node::Switch { .. } => "Switch",
            Node::Case { .. } => "Case",
            Node::Default { .. } => "Default",
            Node::Break {} => "Break",
            Node::Continue {} => "Continue",
            Node::Return { .. } => "Return",
            Node::Goto { .. } => "Goto",
            Node::Label { .. } => "Label",
            Node::EmptyStatement {} => "EmptyStatement",
            Node::Pragma { .. } => "Pragma",
            Node::StaticAssert { .. } => "StaticAssert",
        }
    }

    /// Whether this is a pre/post increment or decrement.
    pub fn is_step(&self) -> bool {
        matches!(self, Node::UnaryOp { op, .. } if is_step_op(op))
    }

    /// Whether evaluating this subtree may change state. Calls count, since
    /// nothing is known about the callee.
    pub fn has_effects(&self) -> bool {
        match self {
            Node::UnaryOp { op, expr } => is_step_op(op) || expr.has_effects(),
            Node::Assignment { .. } => true,
            Node::BinaryOp { left, right, .. } => left.has_effects() || right.has_effects(),
            Node::TernaryOp {
                cond,
                iftrue,
                iffalse,
            } => cond.has_effects() || iftrue.has_effects() || iffalse.has_effects(),
            Node::FuncCall { .. } => true,
            Node::ArrayRef { name, subscript } => name.has_effects() || subscript.has_effects(),
            Node::StructRef { name, .. } => name.has_effects(),
            Node::Cast { expr, .. } => expr.has_effects(),
            Node::ExprList { exprs } | Node::InitList { exprs } => {
                exprs.iter().any(Node::has_effects)
            }
            _ => false,
        }
    }

    /// Whether this subtree contains an increment or decrement.
    pub fn has_steps(&self) -> bool {
        match self {
            Node::UnaryOp { op, expr } => is_step_op(op) || expr.has_steps(),
            Node::Assignment { lvalue, rvalue, .. } => lvalue.has_steps() || rvalue.has_steps(),
            Node::BinaryOp { left, right, .. } => left.has_steps() || right.has_steps(),
            Node::TernaryOp {
                cond,
                iftrue,
                iffalse,
            } => cond.has_steps() || iftrue.has_steps() || iffalse.has_steps(),
            Node::FuncCall { name, args } => {
                name.has_steps() || args.as_ref().is_some_and(|a| a.has_steps())
            }
            Node::ArrayRef { name, subscript } => name.has_steps() || subscript.has_steps(),
            Node::StructRef { name, .. } => name.has_steps(),
            Node::Cast { expr, .. } => expr.has_steps(),
            Node::ExprList { exprs } | Node::InitList { exprs } => exprs.iter().any(Node::has_steps),
            _ => false,
        }
    }

    /// Integer value of a decimal/hex/octal literal, after suffix stripping.
    pub fn int_value(&self) -> Option<i64> {
        let Node::Constant { ty, value } = self else {
            return None;
        };
        if !ty.contains("int") {
            return None;
        }
        let digits = value.trim_end_matches(['u', 'U', 'l', 'L', 'z', 'Z']);
        if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            i64::from_str_radix(hex, 16).ok()
        } else if digits.len() > 1 && digits.starts_with('0') {
            i64::from_str_radix(&digits[1..], 8).ok()
        } else {
            digits.parse().ok()
        }
    }

    // Builders, used for synthetic nodes and in tests.

    pub fn id(name: impl Into<String>) -> Self {
        Node::Id { name: name.into() }
    }

    pub fn int(value: i64) -> Self {
        Node::Constant {
            ty: "int".into(),
            value: value.to_string(),
        }
    }

    pub fn binary(left: Node, op: &str, right: Node) -> Self {
        Node::BinaryOp {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: &str, expr: Node) -> Self {
        Node::UnaryOp {
            op: op.into(),
            expr: Box::new(expr),
        }
    }

    pub fn assign(lvalue: Node, op: &str, rvalue: Node) -> Self {
        Node::Assignment {
            op: op.into(),
            lvalue: Box::new(lvalue),
            rvalue: Box::new(rvalue),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::FuncCall {
            name: Box::new(Node::id(name)),
            args: Some(Box::new(Node::ExprList { exprs: args })),
        }
    }

    pub fn compound(block_items: Vec<Node>) -> Self {
        Node::Compound { block_items }
    }
}

/// `++`, `--` and their postfix spellings.
pub fn is_step_op(op: &str) -> bool {
    matches!(op, "++" | "--" | "p++" | "p--")
}
