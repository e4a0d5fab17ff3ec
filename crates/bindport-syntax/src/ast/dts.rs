//! TypeScript declaration AST.
//!
//! Built by [`crate::input::dts`] from the JSON dump of a TypeScript compiler
//! source file. Only the declaration grammar is modelled; anything else is
//! kept as [`Node::Unsupported`] so generation can skip it visibly.

/// Declared name of a class member or declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Name {
    /// A plain identifier (or a string-literal name that is one).
    Ident(String),
    /// Private, computed or otherwise non-identifier name, by node kind.
    Other { kind: String, text: String },
}

impl Name {
    pub fn ident(name: impl Into<String>) -> Self {
        Name::Ident(name.into())
    }
}

/// Primitive keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Void,
    Any,
    Unknown,
    Boolean,
    Number,
    BigInt,
    String,
    Symbol,
    Object,
    Never,
    Null,
    Undefined,
    True,
    False,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Name,
    pub ty: Option<Box<Node>>,
    pub optional: bool,
    pub rest: bool,
}

/// Class or interface declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLike {
    pub name: Name,
    pub heritage: Vec<Node>,
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: Name,
    pub ty: Option<Box<Node>>,
    pub optional: bool,
    pub readonly: bool,
    pub is_static: bool,
}

/// Method, method signature or function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Callable {
    pub name: Name,
    pub parameters: Vec<Parameter>,
    pub ty: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: Name,
    pub value: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: Name,
    pub ty: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    SourceFile(Vec<Node>),

    // Declarations
    Class(ClassLike),
    Interface(ClassLike),
    /// `extends` / `implements` clause.
    Heritage(Vec<Node>),
    /// A heritage entry, e.g. `Base<T>`.
    ExpressionWithTypeArguments {
        name: String,
        type_arguments: Vec<Node>,
    },
    Constructor(Vec<Parameter>),
    Property(Property),
    Method(Callable),
    Function(Callable),
    TypeAlias {
        name: Name,
        ty: Box<Node>,
    },
    Enum {
        name: Name,
        members: Vec<EnumMember>,
    },
    Variables(Vec<Variable>),
    Module,

    // Types
    Keyword(Keyword),
    Parenthesized(Box<Node>),
    FunctionType {
        parameters: Vec<Parameter>,
        ty: Option<Box<Node>>,
    },
    Union(Vec<Node>),
    Intersection(Vec<Node>),
    Array(Box<Node>),
    Tuple(Vec<Node>),
    Literal(Box<Node>),
    StringLiteral(String),
    NumericLiteral(String),
    TypeQuery(String),
    TypeLiteral(Vec<Node>),
    TypeReference {
        name: String,
        type_arguments: Vec<Node>,
    },
    /// `keyof T`, `readonly T[]`, `unique symbol`.
    TypeOperator {
        operator: String,
        ty: Box<Node>,
    },
    IndexedAccess,

    /// Any kind this grammar does not model.
    Unsupported {
        kind: String,
    },
}

impl Node {
    pub fn kind(&self) -> &str {
        match self {
            Node::SourceFile(_) => "SourceFile",
            Node::Class(_) => "ClassDeclaration",
            Node::Interface(_) => "InterfaceDeclaration",
            Node::Heritage(_) => "HeritageClause",
            Node::ExpressionWithTypeArguments { .. } => "ExpressionWithTypeArguments",
            Node::Constructor(_) => "Constructor",
            Node::Property(_) => "PropertyDeclaration",
            Node::Method(_) => "MethodDeclaration",
            Node::Function(_) => "FunctionDeclaration",
            Node::TypeAlias { .. } => "TypeAliasDeclaration",
            Node::Enum { .. } => "EnumDeclaration",
            Node::Variables(_) => "VariableStatement",
            Node::Module => "ModuleDeclaration",
            Node::Keyword(_) => "Keyword",
            Node::Parenthesized(_) => "ParenthesizedType",
            Node::FunctionType { .. } => "FunctionType",
            Node::Union(_) => "UnionType",
            Node::Intersection(_) => "IntersectionType",
            Node::Array(_) => "ArrayType",
            Node::Tuple(_) => "TupleType",
            Node::Literal(_) => "LiteralType",
            Node::StringLiteral(_) => "StringLiteral",
            Node::NumericLiteral(_) => "NumericLiteral",
            Node::TypeQuery(_) => "TypeQuery",
            Node::TypeLiteral(_) => "TypeLiteral",
            Node::TypeReference { .. } => "TypeReference",
            Node::TypeOperator { .. } => "TypeOperator",
            Node::IndexedAccess => "IndexedAccessType",
            Node::Unsupported { kind } => kind,
        }
    }

    /// `Promise<...>` at the top level of a type.
    pub fn is_promise(&self) -> bool {
        matches!(self, Node::TypeReference { name, .. } if name == "Promise")
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Node::TypeReference {
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }
}
