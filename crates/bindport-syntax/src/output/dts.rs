//! TypeScript declarations to Python stubs.
//!
//! Classes and interfaces become `@external` classes whose members are stubs;
//! anonymous object types are synthesized as named `Protocol`s rendered ahead
//! of the body. Nothing here is fatal: unsupported nodes are skipped with a
//! warning and a [`Diagnostic`].

use crate::ast::dts::*;
use crate::casing::{Recased, escape_keyword, to_pascal_case};
use crate::emit::{Anchor, Document, Emitter, Imports};
use crate::input::read_dts;
use crate::options::{DtsOptions, Options};
use crate::traits::{Diagnostic, TranslateError, Translation, Translator};
use crate::types::{HostType, ts_keyword, ts_reference};
use indexmap::IndexMap;

/// Static instance of the declaration translator for registry.
pub static DTS_TRANSLATOR: DtsTranslator = DtsTranslator;

/// Translator for TypeScript compiler JSON dumps.
pub struct DtsTranslator;

impl Translator for DtsTranslator {
    fn grammar(&self) -> &'static str {
        "dts"
    }

    fn accepts(&self, root: &serde_json::Value) -> bool {
        root.get("kind").is_some()
    }

    fn translate(
        &self,
        root: &serde_json::Value,
        options: &Options,
    ) -> Result<Translation, TranslateError> {
        let ast = read_dts(root)?;
        Ok(DtsGenerator::new(&options.dts).generate(&ast))
    }
}

/// Overloaded names in one scope, with the anchor of each declaration.
type OverloadScope = IndexMap<String, Vec<Anchor>>;

/// Emits a declaration file as a Python stub module.
pub struct DtsGenerator<'a> {
    options: &'a DtsOptions,
    out: Emitter,
    imports: Imports,
    synthesized: Vec<Vec<String>>,
    counter: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> DtsGenerator<'a> {
    pub fn new(options: &'a DtsOptions) -> Self {
        Self {
            options,
            out: Emitter::new(),
            imports: Imports::default(),
            synthesized: Vec::new(),
            counter: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn generate(mut self, root: &Node) -> Translation {
        let statements = match root {
            Node::SourceFile(statements) => statements.as_slice(),
            other => std::slice::from_ref(other),
        };
        let mut functions = OverloadScope::new();
        for stmt in statements {
            self.write_stmt(stmt, &mut functions);
        }
        self.finish_overloads(functions, "singledispatch");

        let mut blocks = self.synthesized;
        blocks.push(self.out.finish());
        let document = Document {
            header: self.options.header.clone(),
            imports: self.imports,
            blocks,
        };
        Translation {
            text: document.render(),
            diagnostics: self.diagnostics,
        }
    }

    fn diagnose(&mut self, kind: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind, "{message}");
        self.diagnostics.push(Diagnostic {
            kind: kind.to_string(),
            message,
        });
    }

    fn runtime(&mut self, symbol: &str) {
        self.imports.add(&self.options.runtime_module, symbol);
    }

    fn typing(&mut self, symbol: &'static str) -> &'static str {
        self.imports.add("typing", symbol);
        symbol
    }

    fn host(&mut self, host: HostType) -> String {
        if let Some((module, symbol)) = host.import {
            self.imports.add(module, symbol);
        }
        host.name.to_string()
    }

    /// `@alias('original')` when casing changed the name.
    fn write_alias(&mut self, recased: &Recased) {
        if let Some(original) = &recased.original {
            self.runtime("alias");
            self.out.line(format!("@alias('{original}')"));
        }
    }

    /// `T`, or `Annotated[T, alias('original')]` for bindings that cannot
    /// carry a decorator.
    fn annotated(&mut self, recased: &Recased, ty: String) -> String {
        match &recased.original {
            Some(original) => {
                self.runtime("alias");
                format!("{}[{ty}, alias('{original}')]", self.typing("Annotated"))
            }
            None => ty,
        }
    }

    fn unsupported_name(&mut self, kind: &str, text: &str) {
        self.diagnose(kind, format!("unsupported member name `{text}`"));
        self.out.line(format!("# unsupported {kind}: {text}"));
    }

    fn write_stmt(&mut self, node: &Node, functions: &mut OverloadScope) {
        match node {
            Node::Class(class) => self.write_class(class, false),
            Node::Interface(class) => self.write_class(class, true),
            Node::Function(function) => {
                let Name::Ident(name) = &function.name else {
                    return self.diagnose(node.kind(), "function without an identifier name");
                };
                self.out.blank(2);
                let recased = Recased::snake(name);
                let anchor = self.out.anchor();
                functions.entry(recased.name.clone()).or_default().push(anchor);
                self.write_alias(&recased);
                let signature = self.signature(&recased.name, None, function);
                self.out.line(signature);
            }
            Node::TypeAlias { name, ty } => {
                let Name::Ident(name) = name else {
                    return self.diagnose(node.kind(), "type alias without an identifier name");
                };
                self.out.blank(2);
                let target = self.type_text(ty);
                self.out
                    .line(format!("{} = {target}", Recased::pascal(name).name));
            }
            Node::Enum { name, members } => self.write_enum(name, members),
            Node::Variables(variables) => {
                for variable in variables {
                    let Name::Ident(name) = &variable.name else {
                        self.diagnose(node.kind(), "destructured variable declaration");
                        continue;
                    };
                    self.out.blank(2);
                    let recased = Recased::snake(name);
                    let ty = self.optional_type_text(variable.ty.as_deref());
                    let ty = self.annotated(&recased, ty);
                    self.out.line(format!("{}: {ty}", recased.name));
                }
            }
            Node::Module => tracing::debug!("skipped module declaration"),
            other => self.diagnose(other.kind(), "unsupported statement"),
        }
    }

    fn write_class(&mut self, class: &ClassLike, is_interface: bool) {
        let name = match &class.name {
            Name::Ident(name) => Recased::pascal(name),
            Name::Other { kind, text } => {
                return self.diagnose(kind, format!("class without an identifier name `{text}`"));
            }
        };
        self.write_class_body(&name, &class.heritage, &class.members, is_interface);
    }

    fn write_class_body(
        &mut self,
        name: &Recased,
        heritage: &[Node],
        members: &[Node],
        is_interface: bool,
    ) {
        self.out.blank(2);
        self.runtime("external");
        self.out.line("@external");
        self.write_alias(name);

        let mut bases = Vec::new();
        for clause in heritage {
            let Node::Heritage(types) = clause else {
                continue;
            };
            for base in types {
                bases.push(self.heritage_text(base));
            }
        }
        let header = if !bases.is_empty() {
            format!("class {}({}):", name.name, bases.join(", "))
        } else if is_interface {
            format!("class {}({}):", name.name, self.typing("Protocol"))
        } else {
            format!("class {}:", name.name)
        };
        self.out.line(header);

        self.out.indent();
        let mut methods = OverloadScope::new();
        let mut emitted = false;
        for member in members {
            emitted |= self.write_member(member, &mut methods, emitted);
        }
        if !emitted {
            self.out.line("...");
        }
        self.finish_overloads(methods, "singledispatchmethod");
        self.out.dedent();
    }

    fn heritage_text(&mut self, base: &Node) -> String {
        match base {
            Node::ExpressionWithTypeArguments {
                name,
                type_arguments,
            } => {
                let mut text = reference_name(name);
                self.push_type_arguments(&mut text, type_arguments);
                text
            }
            other => self.type_text(other),
        }
    }

    /// Emit one class member. Returns whether a statement was emitted.
    fn write_member(&mut self, member: &Node, methods: &mut OverloadScope, separate: bool) -> bool {
        match member {
            Node::Property(property) => {
                let Name::Ident(name) = &property.name else {
                    self.unsupported_member(&property.name);
                    return false;
                };
                if separate {
                    self.out.blank(1);
                }
                self.write_property(&Recased::snake(name), property);
                true
            }
            Node::Method(method) => {
                let Name::Ident(name) = &method.name else {
                    self.unsupported_member(&method.name);
                    return false;
                };
                if separate {
                    self.out.blank(1);
                }
                let recased = Recased::snake(name);
                let anchor = self.out.anchor();
                methods.entry(recased.name.clone()).or_default().push(anchor);
                self.write_alias(&recased);
                let signature = self.signature(&recased.name, Some("self"), method);
                self.out.line(signature);
                true
            }
            Node::Constructor(parameters) => {
                if separate {
                    self.out.blank(1);
                }
                let anchor = self.out.anchor();
                methods.entry("__init__".into()).or_default().push(anchor);
                let mut params = vec!["self".to_string()];
                params.extend(self.parameters(parameters));
                self.out
                    .line(format!("def __init__({}): ...", params.join(", ")));
                true
            }
            other => {
                self.diagnose(other.kind(), "unsupported class member");
                false
            }
        }
    }

    fn unsupported_member(&mut self, name: &Name) {
        match name {
            Name::Other { kind, text } => self.unsupported_name(kind, text),
            Name::Ident(text) => self.unsupported_name("Identifier", text),
        }
    }

    fn write_property(&mut self, name: &Recased, property: &Property) {
        let mut ty = self.optional_type_text(property.ty.as_deref());
        if property.optional {
            ty = format!("{}[{ty}]", self.typing("Optional"));
        }
        if property.is_static {
            let ty = self.annotated(name, ty);
            self.out.line(format!("{}: {ty}", name.name));
            return;
        }
        self.out.line("@property");
        self.write_alias(name);
        self.out.line(format!("def {}(self) -> {ty}:", name.name));
        self.out.indent();
        self.out.line("raise NotImplementedError");
        self.out.dedent();
        if property.readonly {
            return;
        }
        self.out.blank(1);
        self.out.line(format!("@{}.setter", name.name));
        self.write_alias(name);
        self.out
            .line(format!("def {}(self, value: {ty}) -> None: ...", name.name));
    }

    /// `[async ]def name([self, ]params) -> T: ...`
    fn signature(&mut self, name: &str, receiver: Option<&str>, callable: &Callable) -> String {
        let mut params: Vec<String> = receiver.map(String::from).into_iter().collect();
        params.extend(self.parameters(&callable.parameters));
        let (prefix, ret) = match callable.ty.as_deref() {
            // An async def already returns an awaitable; annotate the result.
            Some(ty @ Node::TypeReference { type_arguments, .. }) if ty.is_promise() => {
                let ret = match type_arguments.first() {
                    Some(inner) => self.type_text(inner),
                    None => self.typing("Any").into(),
                };
                ("async def", ret)
            }
            other => ("def", self.optional_type_text(other)),
        };
        format!("{prefix} {name}({}) -> {ret}: ...", params.join(", "))
    }

    fn parameters(&mut self, parameters: &[Parameter]) -> Vec<String> {
        let mut out = Vec::new();
        for (idx, param) in parameters.iter().enumerate() {
            let name = match &param.name {
                Name::Ident(name) if name == "this" => continue,
                Name::Ident(name) => Recased::snake(name).name,
                Name::Other { .. } => format!("arg{idx}"),
            };
            let ty = param.ty.as_deref();
            out.push(if param.rest {
                let element = match ty {
                    Some(Node::Array(element)) => self.type_text(element),
                    other => self.optional_type_text(other),
                };
                format!("*{name}: {element}")
            } else if param.optional {
                let ty = self.optional_type_text(ty);
                format!("{name}: {}[{ty}] = None", self.typing("Optional"))
            } else {
                match ty {
                    Some(ty) => format!("{name}: {}", self.type_text(ty)),
                    None => name,
                }
            });
        }
        out
    }

    fn write_enum(&mut self, name: &Name, members: &[EnumMember]) {
        let Name::Ident(name) = name else {
            return self.diagnose("EnumDeclaration", "enum without an identifier name");
        };
        self.out.blank(2);
        self.imports.add("enum", "Enum");
        self.out
            .line(format!("class {}(Enum):", Recased::pascal(name).name));
        self.out.indent();
        let mut emitted = false;
        for member in members {
            let Name::Ident(member_name) = &member.name else {
                self.unsupported_member(&member.name);
                continue;
            };
            let value = match member.value.as_deref() {
                Some(Node::StringLiteral(text)) => format!("'{text}'"),
                Some(Node::NumericLiteral(text)) => text.clone(),
                _ => {
                    self.imports.add("enum", "auto");
                    "auto()".into()
                }
            };
            let member_name = escape_keyword(member_name);
            self.out.line(format!("{member_name} = {value}"));
            emitted = true;
        }
        if !emitted {
            self.out.line("...");
        }
        self.out.dedent();
    }

    fn finish_overloads(&mut self, scope: OverloadScope, decorator: &'static str) {
        for (name, anchors) in scope {
            if anchors.len() < 2 {
                continue;
            }
            self.imports.add("functools", decorator);
            for (idx, anchor) in anchors.into_iter().enumerate() {
                let text = if idx == 0 {
                    format!("@{decorator}")
                } else {
                    format!("@{name}.register")
                };
                self.out.insert_before(anchor, text);
            }
        }
    }

    // Types

    fn optional_type_text(&mut self, ty: Option<&Node>) -> String {
        match ty {
            Some(ty) => self.type_text(ty),
            None => self.typing("Any").into(),
        }
    }

    fn push_type_arguments(&mut self, text: &mut String, arguments: &[Node]) {
        if arguments.is_empty() {
            return;
        }
        let arguments: Vec<String> = arguments.iter().map(|a| self.type_text(a)).collect();
        text.push('[');
        text.push_str(&arguments.join(", "));
        text.push(']');
    }

    /// Python annotation for a type node.
    fn type_text(&mut self, node: &Node) -> String {
        match node {
            Node::Keyword(keyword) => self.host(ts_keyword(*keyword)),
            Node::Parenthesized(inner) => self.type_text(inner),
            Node::FunctionType { parameters, ty } => {
                let ret = self.optional_type_text(ty.as_deref());
                let callable = self.typing("Callable");
                if parameters.iter().any(|p| p.rest) {
                    return format!("{callable}[..., {ret}]");
                }
                let params: Vec<String> = parameters
                    .iter()
                    .map(|p| {
                        let ty = self.optional_type_text(p.ty.as_deref());
                        if p.optional {
                            format!("{}[{ty}]", self.typing("Optional"))
                        } else {
                            ty
                        }
                    })
                    .collect();
                format!("{callable}[[{}], {ret}]", params.join(", "))
            }
            Node::Union(items) => {
                let items: Vec<String> = items.iter().map(|t| self.type_text(t)).collect();
                items.join(" | ")
            }
            Node::Intersection(items) => match items.first() {
                Some(first) => {
                    tracing::warn!(members = items.len(), "intersection keeps its first member");
                    self.type_text(first)
                }
                None => self.typing("Any").into(),
            },
            Node::Array(element) => {
                let element = self.type_text(element);
                format!("{}[{element}]", self.typing("List"))
            }
            Node::Tuple(items) => {
                let tuple = self.typing("Tuple");
                if items.is_empty() {
                    return format!("{tuple}[()]");
                }
                let items: Vec<String> = items.iter().map(|t| self.type_text(t)).collect();
                format!("{tuple}[{}]", items.join(", "))
            }
            Node::Literal(literal) => match &**literal {
                Node::Keyword(Keyword::Null | Keyword::Undefined) => "None".into(),
                Node::Unsupported { kind } => {
                    let kind = kind.clone();
                    self.diagnose(&kind, "unsupported literal type");
                    self.typing("Any").into()
                }
                other => {
                    let value = self.type_text(other);
                    format!("{}[{value}]", self.typing("Literal"))
                }
            },
            Node::StringLiteral(text) => format!("'{text}'"),
            Node::NumericLiteral(text) => text.clone(),
            Node::TypeQuery(name) => format!("{}[{name}]", self.typing("Type")),
            Node::TypeLiteral(members) => self.synthesize(members),
            Node::TypeReference {
                name,
                type_arguments,
            } => {
                let mut text = match ts_reference(name) {
                    Some(host) => self.host(host),
                    None => reference_name(name),
                };
                self.push_type_arguments(&mut text, type_arguments);
                text
            }
            Node::TypeOperator { operator, ty } => match operator.as_str() {
                "keyof" => "str".into(),
                _ => self.type_text(ty),
            },
            Node::IndexedAccess => {
                self.diagnose(node.kind(), "indexed access type mapped to Any");
                self.typing("Any").into()
            }
            other => {
                let kind = other.kind().to_string();
                self.diagnose(&kind, "unsupported type mapped to Any");
                self.typing("Any").into()
            }
        }
    }

    /// Render an anonymous object type as a named protocol and return the name.
    fn synthesize(&mut self, members: &[Node]) -> String {
        self.counter += 1;
        let name = format!("{}{}", self.options.synthesized_prefix, self.counter);
        let outer = std::mem::replace(&mut self.out, Emitter::new());
        let recased = Recased {
            name: name.clone(),
            original: None,
        };
        self.write_class_body(&recased, &[], members, true);
        let block = std::mem::replace(&mut self.out, outer).finish();
        self.synthesized.push(block);
        name
    }
}

/// Declared type names are PascalCased, so references follow.
fn reference_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((namespace, last)) => format!("{namespace}.{}", to_pascal_case(last)),
        None => to_pascal_case(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(statements: Vec<Node>) -> Translation {
        DtsGenerator::new(&DtsOptions::default()).generate(&Node::SourceFile(statements))
    }

    fn method(name: &str, parameters: Vec<Parameter>, ty: Node) -> Node {
        Node::Method(Callable {
            name: Name::ident(name),
            parameters,
            ty: Some(Box::new(ty)),
        })
    }

    fn param(name: &str, ty: Node) -> Parameter {
        Parameter {
            name: Name::ident(name),
            ty: Some(Box::new(ty)),
            optional: false,
            rest: false,
        }
    }

    fn interface(name: &str, members: Vec<Node>) -> Node {
        Node::Interface(ClassLike {
            name: Name::ident(name),
            heritage: Vec::new(),
            members,
        })
    }

    #[test]
    fn test_type_mapping() {
        let options = DtsOptions::default();
        let mut generator = DtsGenerator::new(&options);
        let promise = Node::TypeReference {
            name: "Promise".into(),
            type_arguments: vec![Node::Array(Box::new(Node::Keyword(Keyword::Number)))],
        };
        assert_eq!(generator.type_text(&promise), "Awaitable[List[int]]");
        let union = Node::Union(vec![
            Node::Keyword(Keyword::String),
            Node::Keyword(Keyword::Null),
        ]);
        assert_eq!(generator.type_text(&union), "str | None");
        let literal = Node::Literal(Box::new(Node::StringLiteral("GET".into())));
        assert_eq!(generator.type_text(&literal), "Literal['GET']");
        assert_eq!(
            generator.type_text(&Node::reference("request_init")),
            "RequestInit"
        );
        assert_eq!(
            generator.imports.lines(),
            vec!["from typing import Awaitable, List, Literal"]
        );
    }

    #[test]
    fn test_async_method_unwraps_promise() {
        let text = generate(vec![interface(
            "Body",
            vec![method(
                "arrayBuffer",
                vec![],
                Node::TypeReference {
                    name: "Promise".into(),
                    type_arguments: vec![Node::reference("ArrayBuffer")],
                },
            )],
        )])
        .text;
        assert!(text.contains("    @alias('arrayBuffer')\n    async def array_buffer(self) -> ArrayBuffer: ...\n"));
        assert!(text.contains("class Body(Protocol):"));
    }

    #[test]
    fn test_overloads_in_declaration_order() {
        let overloads = (0..3)
            .map(|n| {
                let params = (0..n)
                    .map(|i| param(&format!("a{i}"), Node::Keyword(Keyword::String)))
                    .collect();
                method("F", params, Node::Keyword(Keyword::Void))
            })
            .collect();
        let text = generate(vec![interface("Api", overloads)]).text;
        let body: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("class Api"))
            .skip(1)
            .filter(|l| !l.trim().is_empty())
            .collect();
        assert_eq!(
            body,
            vec![
                "    @singledispatchmethod",
                "    def F(self) -> None: ...",
                "    @F.register",
                "    def F(self, a0: str) -> None: ...",
                "    @F.register",
                "    def F(self, a0: str, a1: str) -> None: ...",
            ]
        );
        assert!(text.contains("from functools import singledispatchmethod\n"));
    }

    #[test]
    fn test_synthesized_types_precede_body() {
        let options = Node::TypeLiteral(vec![Node::Property(Property {
            name: Name::ident("cacheTtl"),
            ty: Some(Box::new(Node::Keyword(Keyword::Number))),
            optional: true,
            readonly: true,
            is_static: false,
        })]);
        let text = generate(vec![Node::Function(Callable {
            name: Name::ident("fetch"),
            parameters: vec![param("init", options)],
            ty: Some(Box::new(Node::Keyword(Keyword::Void))),
        })])
        .text;
        let synthesized = text.find("class Type1(Protocol):").unwrap();
        let body = text.find("def fetch(init: Type1) -> None: ...").unwrap();
        assert!(synthesized < body);
        assert!(text.contains("def cache_ttl(self) -> Optional[int]:"));
        assert!(!text.contains("cache_ttl.setter"));
    }

    #[test]
    fn test_unsupported_nodes_are_reported() {
        let translation = generate(vec![
            Node::Unsupported {
                kind: "ImportDeclaration".into(),
            },
            interface(
                "Empty",
                vec![Node::Property(Property {
                    name: Name::Other {
                        kind: "PrivateIdentifier".into(),
                        text: "#state".into(),
                    },
                    ty: None,
                    optional: false,
                    readonly: false,
                    is_static: false,
                })],
            ),
        ]);
        assert_eq!(translation.diagnostics.len(), 2);
        assert_eq!(translation.diagnostics[0].kind, "ImportDeclaration");
        assert!(translation
            .text
            .contains("    # unsupported PrivateIdentifier: #state\n    ...\n"));
    }
}
