//! TypeScript compiler JSON reader.
//!
//! Lowers the compiler's node dump (objects with a string `kind`) into
//! [`crate::ast::dts::Node`]. Kinds outside the declaration grammar become
//! [`Node::Unsupported`] so the generator can report them instead of failing.

use crate::ast::dts::*;
use crate::traits::ReadError;
use serde_json::Value;

/// Load a `SourceFile` dump.
pub fn read_dts(root: &Value) -> Result<Node, ReadError> {
    let kind = kind_of(root)?;
    if kind != "SourceFile" {
        return Err(ReadError::UnexpectedNode {
            expected: "SourceFile".into(),
            got: kind.into(),
        });
    }
    Ok(Node::SourceFile(read_list(root, "statements", read_stmt)?))
}

fn kind_of(node: &Value) -> Result<&str, ReadError> {
    node.get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| ReadError::Missing {
            kind: "node".into(),
            field: "kind",
        })
}

fn field<'a>(node: &'a Value, name: &'static str) -> Result<&'a Value, ReadError> {
    node.get(name)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ReadError::Missing {
            kind: kind_of(node).unwrap_or("node").into(),
            field: name,
        })
}

fn read_list<T>(
    node: &Value,
    name: &str,
    read: impl Fn(&Value) -> Result<T, ReadError>,
) -> Result<Vec<T>, ReadError> {
    match node.get(name).and_then(Value::as_array) {
        Some(items) => items.iter().map(read).collect(),
        None => Ok(Vec::new()),
    }
}

fn read_optional_type(node: &Value) -> Result<Option<Box<Node>>, ReadError> {
    match node.get("type").filter(|v| !v.is_null()) {
        Some(ty) => Ok(Some(Box::new(read_type(ty)?))),
        None => Ok(None),
    }
}

fn has_modifier(node: &Value, modifier: &str) -> bool {
    node.get("modifiers")
        .and_then(Value::as_array)
        .is_some_and(|mods| {
            mods.iter()
                .any(|m| m.get("kind").and_then(Value::as_str) == Some(modifier))
        })
}

fn has_token(node: &Value, token: &str) -> bool {
    node.get(token).is_some_and(|t| !t.is_null())
}

fn text_of(node: &Value) -> Option<&str> {
    node.get("escapedText")
        .or_else(|| node.get("text"))
        .and_then(Value::as_str)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn read_name(node: &Value) -> Result<Name, ReadError> {
    // `export default class {}` has no name node at all.
    let Some(name) = node.get("name").filter(|n| !n.is_null()) else {
        return Ok(Name::Other {
            kind: kind_of(node)?.into(),
            text: "(anonymous)".into(),
        });
    };
    let kind = kind_of(name)?;
    let text = text_of(name).unwrap_or_default();
    Ok(match kind {
        "Identifier" => Name::ident(text),
        "StringLiteral" if is_identifier(text) => Name::ident(text),
        _ => Name::Other {
            kind: kind.into(),
            text: text.into(),
        },
    })
}

/// `a.b.C` from an `Identifier`, `QualifiedName` or property access.
fn entity_name(node: &Value) -> Result<String, ReadError> {
    match kind_of(node)? {
        "QualifiedName" => Ok(format!(
            "{}.{}",
            entity_name(field(node, "left")?)?,
            entity_name(field(node, "right")?)?
        )),
        "PropertyAccessExpression" => Ok(format!(
            "{}.{}",
            entity_name(field(node, "expression")?)?,
            entity_name(field(node, "name")?)?
        )),
        _ => text_of(node).map(String::from).ok_or_else(|| ReadError::Missing {
            kind: kind_of(node).unwrap_or("node").into(),
            field: "escapedText",
        }),
    }
}

fn read_stmt(node: &Value) -> Result<Node, ReadError> {
    let kind = kind_of(node)?;
    Ok(match kind {
        "ClassDeclaration" => Node::Class(read_class_like(node)?),
        "InterfaceDeclaration" => Node::Interface(read_class_like(node)?),
        "FunctionDeclaration" => Node::Function(read_callable(node)?),
        "TypeAliasDeclaration" => Node::TypeAlias {
            name: read_name(node)?,
            ty: Box::new(read_type(field(node, "type")?)?),
        },
        "EnumDeclaration" => Node::Enum {
            name: read_name(node)?,
            members: read_list(node, "members", |m| {
                Ok(EnumMember {
                    name: read_name(m)?,
                    value: match m.get("initializer").filter(|v| !v.is_null()) {
                        Some(init) => Some(Box::new(read_literal(init)?)),
                        None => None,
                    },
                })
            })?,
        },
        // `FirstStatement` is the compiler's marker alias for VariableStatement.
        "VariableStatement" | "FirstStatement" => {
            let list = field(node, "declarationList")?;
            Node::Variables(read_list(list, "declarations", |decl| {
                Ok(Variable {
                    name: read_name(decl)?,
                    ty: read_optional_type(decl)?,
                })
            })?)
        }
        "ModuleDeclaration" => Node::Module,
        _ => Node::Unsupported { kind: kind.into() },
    })
}

fn read_class_like(node: &Value) -> Result<ClassLike, ReadError> {
    Ok(ClassLike {
        name: read_name(node)?,
        heritage: read_list(node, "heritageClauses", |clause| {
            Ok(Node::Heritage(read_list(clause, "types", |ty| {
                Ok(Node::ExpressionWithTypeArguments {
                    name: entity_name(field(ty, "expression")?)?,
                    type_arguments: read_list(ty, "typeArguments", read_type)?,
                })
            })?))
        })?,
        members: read_list(node, "members", read_member)?,
    })
}

fn read_member(node: &Value) -> Result<Node, ReadError> {
    let kind = kind_of(node)?;
    Ok(match kind {
        "PropertyDeclaration" | "PropertySignature" => Node::Property(Property {
            name: read_name(node)?,
            ty: read_optional_type(node)?,
            optional: has_token(node, "questionToken"),
            readonly: has_modifier(node, "ReadonlyKeyword"),
            is_static: has_modifier(node, "StaticKeyword"),
        }),
        "MethodDeclaration" | "MethodSignature" => Node::Method(read_callable(node)?),
        "Constructor" | "ConstructSignature" => {
            Node::Constructor(read_list(node, "parameters", read_parameter)?)
        }
        _ => Node::Unsupported { kind: kind.into() },
    })
}

fn read_callable(node: &Value) -> Result<Callable, ReadError> {
    Ok(Callable {
        name: read_name(node)?,
        parameters: read_list(node, "parameters", read_parameter)?,
        ty: read_optional_type(node)?,
    })
}

fn read_parameter(node: &Value) -> Result<Parameter, ReadError> {
    Ok(Parameter {
        name: read_name(node)?,
        ty: read_optional_type(node)?,
        optional: has_token(node, "questionToken"),
        rest: has_token(node, "dotDotDotToken"),
    })
}

fn read_literal(node: &Value) -> Result<Node, ReadError> {
    let kind = kind_of(node)?;
    let text = || text_of(node).unwrap_or_default().to_string();
    Ok(match kind {
        "StringLiteral" | "NoSubstitutionTemplateLiteral" => Node::StringLiteral(text()),
        "NumericLiteral" | "FirstLiteralToken" | "BigIntLiteral" => Node::NumericLiteral(text()),
        // Only `-` may prefix a literal type.
        "PrefixUnaryExpression" => match read_literal(field(node, "operand")?)? {
            Node::NumericLiteral(n) => Node::NumericLiteral(format!("-{n}")),
            other => other,
        },
        "TrueKeyword" => Node::Keyword(Keyword::True),
        "FalseKeyword" => Node::Keyword(Keyword::False),
        "NullKeyword" => Node::Keyword(Keyword::Null),
        _ => Node::Unsupported { kind: kind.into() },
    })
}

fn keyword(kind: &str) -> Option<Keyword> {
    Some(match kind {
        "VoidKeyword" => Keyword::Void,
        "AnyKeyword" => Keyword::Any,
        "UnknownKeyword" => Keyword::Unknown,
        "BooleanKeyword" => Keyword::Boolean,
        "NumberKeyword" => Keyword::Number,
        "BigIntKeyword" => Keyword::BigInt,
        "StringKeyword" => Keyword::String,
        "SymbolKeyword" => Keyword::Symbol,
        "ObjectKeyword" => Keyword::Object,
        "NeverKeyword" => Keyword::Never,
        "NullKeyword" => Keyword::Null,
        "UndefinedKeyword" => Keyword::Undefined,
        "TrueKeyword" => Keyword::True,
        "FalseKeyword" => Keyword::False,
        _ => return None,
    })
}

fn read_type(node: &Value) -> Result<Node, ReadError> {
    let kind = kind_of(node)?;
    if let Some(keyword) = keyword(kind) {
        return Ok(Node::Keyword(keyword));
    }
    Ok(match kind {
        "ParenthesizedType" => Node::Parenthesized(Box::new(read_type(field(node, "type")?)?)),
        "FunctionType" | "ConstructorType" => Node::FunctionType {
            parameters: read_list(node, "parameters", read_parameter)?,
            ty: read_optional_type(node)?,
        },
        "UnionType" => Node::Union(read_list(node, "types", read_type)?),
        "IntersectionType" => Node::Intersection(read_list(node, "types", read_type)?),
        "ArrayType" => Node::Array(Box::new(read_type(field(node, "elementType")?)?)),
        "TupleType" => Node::Tuple(read_list(node, "elements", read_type)?),
        "NamedTupleMember" | "OptionalType" | "RestType" => read_type(field(node, "type")?)?,
        "LiteralType" => Node::Literal(Box::new(read_literal(field(node, "literal")?)?)),
        "TypeQuery" => Node::TypeQuery(entity_name(field(node, "exprName")?)?),
        "TypeLiteral" => Node::TypeLiteral(read_list(node, "members", read_member)?),
        "TypeReference" => Node::TypeReference {
            name: entity_name(field(node, "typeName")?)?,
            type_arguments: read_list(node, "typeArguments", read_type)?,
        },
        "ExpressionWithTypeArguments" => Node::TypeReference {
            name: entity_name(field(node, "expression")?)?,
            type_arguments: read_list(node, "typeArguments", read_type)?,
        },
        "ThisType" => Node::reference("this"),
        "TypeOperator" => Node::TypeOperator {
            operator: type_operator(node),
            ty: Box::new(read_type(field(node, "type")?)?),
        },
        "IndexedAccessType" => Node::IndexedAccess,
        _ => Node::Unsupported { kind: kind.into() },
    })
}

/// Operator keyword of a `TypeOperator` (`keyof`, `unique`, `readonly`).
///
/// Dumps that serialize the operator as a `SyntaxKind` number keep the number.
fn type_operator(node: &Value) -> String {
    match node.get("operator") {
        Some(Value::String(op)) => op.trim_end_matches("Keyword").to_lowercase(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ident(name: &str) -> Value {
        json!({ "kind": "Identifier", "escapedText": name })
    }

    #[test]
    fn reads_interface_members() {
        let root = json!({
            "kind": "SourceFile",
            "statements": [{
                "kind": "InterfaceDeclaration",
                "name": ident("Body"),
                "members": [
                    {
                        "kind": "PropertySignature",
                        "name": ident("bodyUsed"),
                        "modifiers": [{ "kind": "ReadonlyKeyword" }],
                        "type": { "kind": "BooleanKeyword" }
                    },
                    {
                        "kind": "MethodSignature",
                        "name": ident("text"),
                        "parameters": [{
                            "kind": "Parameter",
                            "name": ident("rest"),
                            "dotDotDotToken": { "kind": "DotDotDotToken" },
                            "type": { "kind": "ArrayType", "elementType": { "kind": "StringKeyword" } }
                        }],
                        "type": {
                            "kind": "TypeReference",
                            "typeName": ident("Promise"),
                            "typeArguments": [{ "kind": "StringKeyword" }]
                        }
                    },
                    { "kind": "IndexSignature" }
                ]
            }]
        });
        let Node::SourceFile(statements) = read_dts(&root).unwrap() else {
            panic!("expected SourceFile");
        };
        let Node::Interface(body) = &statements[0] else {
            panic!("expected interface");
        };
        assert_eq!(body.name, Name::ident("Body"));
        let Node::Property(prop) = &body.members[0] else {
            panic!("expected property");
        };
        assert!(prop.readonly && !prop.is_static && !prop.optional);
        let Node::Method(method) = &body.members[1] else {
            panic!("expected method");
        };
        assert!(method.parameters[0].rest);
        assert!(method.ty.as_deref().is_some_and(Node::is_promise));
        assert_eq!(body.members[2].kind(), "IndexSignature");
    }

    #[test]
    fn variable_statement_aliases() {
        let root = json!({
            "kind": "SourceFile",
            "statements": [{
                "kind": "FirstStatement",
                "declarationList": {
                    "declarations": [{ "kind": "VariableDeclaration", "name": ident("caches") }]
                }
            }]
        });
        assert_eq!(
            read_dts(&root).unwrap(),
            Node::SourceFile(vec![Node::Variables(vec![Variable {
                name: Name::ident("caches"),
                ty: None,
            }])])
        );
    }

    #[test]
    fn qualified_names_and_literals() {
        let ty = json!({
            "kind": "TypeReference",
            "typeName": { "kind": "QualifiedName", "left": ident("ns"), "right": ident("Id") }
        });
        assert_eq!(read_type(&ty).unwrap(), Node::reference("ns.Id"));

        let lit = json!({ "kind": "LiteralType", "literal": { "kind": "FirstLiteralToken", "text": "3" } });
        assert_eq!(
            read_type(&lit).unwrap(),
            Node::Literal(Box::new(Node::NumericLiteral("3".into())))
        );
    }

    #[test]
    fn non_identifier_names_are_kept_aside() {
        let member = json!({
            "kind": "PropertySignature",
            "name": { "kind": "PrivateIdentifier", "escapedText": "#state" },
            "type": { "kind": "AnyKeyword" }
        });
        let Node::Property(prop) = read_member(&member).unwrap() else {
            panic!("expected property");
        };
        assert_eq!(
            prop.name,
            Name::Other {
                kind: "PrivateIdentifier".into(),
                text: "#state".into()
            }
        );
    }

    #[test]
    fn missing_kind_is_an_error() {
        assert!(matches!(
            read_dts(&json!({ "statements": [] })),
            Err(ReadError::Missing { field: "kind", .. })
        ));
    }
}
