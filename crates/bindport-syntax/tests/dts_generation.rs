//! End-to-end tests for the declaration engine, driven by TypeScript
//! compiler-shaped JSON.

use bindport_syntax::{DtsOptions, Options, detect_translator};
use serde_json::{Value, json};

// ============================================================================
// Fixture builders
// ============================================================================

fn ident(name: &str) -> Value {
    json!({ "kind": "Identifier", "escapedText": name })
}

fn keyword(kind: &str) -> Value {
    json!({ "kind": kind })
}

fn reference(name: &str, args: Vec<Value>) -> Value {
    json!({ "kind": "TypeReference", "typeName": ident(name), "typeArguments": args })
}

fn union(types: Vec<Value>) -> Value {
    json!({ "kind": "UnionType", "types": types })
}

fn param(name: &str, ty: Value) -> Value {
    json!({ "kind": "Parameter", "name": ident(name), "type": ty })
}

fn optional_param(name: &str, ty: Value) -> Value {
    json!({
        "kind": "Parameter",
        "name": ident(name),
        "questionToken": { "kind": "QuestionToken" },
        "type": ty
    })
}

fn method(kind: &str, name: &str, params: Vec<Value>, ty: Value) -> Value {
    json!({ "kind": kind, "name": ident(name), "parameters": params, "type": ty })
}

fn property(name: &str, ty: Value, modifiers: &[&str]) -> Value {
    let modifiers: Vec<Value> = modifiers.iter().map(|m| json!({ "kind": m })).collect();
    json!({ "kind": "PropertyDeclaration", "name": ident(name), "modifiers": modifiers, "type": ty })
}

fn source(statements: Vec<Value>) -> Value {
    json!({ "kind": "SourceFile", "statements": statements })
}

fn translate_with(options: &Options, root: &Value) -> bindport_syntax::Translation {
    detect_translator(root)
        .expect("declaration dump detected")
        .translate(root, options)
        .expect("translation failed")
}

fn translate(root: &Value) -> bindport_syntax::Translation {
    translate_with(&Options::default(), root)
}

// ============================================================================
// Classes and interfaces
// ============================================================================

#[test]
fn classes_and_interfaces() {
    let body = json!({
        "kind": "InterfaceDeclaration",
        "name": ident("Body"),
        "members": [
            {
                "kind": "PropertySignature",
                "name": ident("bodyUsed"),
                "modifiers": [{ "kind": "ReadonlyKeyword" }],
                "type": keyword("BooleanKeyword")
            },
            method(
                "MethodSignature",
                "arrayBuffer",
                vec![],
                reference("Promise", vec![reference("ArrayBuffer", vec![])]),
            ),
            method(
                "MethodSignature",
                "text",
                vec![],
                reference("Promise", vec![keyword("StringKeyword")]),
            ),
        ]
    });
    let socket = json!({
        "kind": "ClassDeclaration",
        "name": ident("webSocket"),
        "heritageClauses": [{
            "kind": "HeritageClause",
            "types": [{ "kind": "ExpressionWithTypeArguments", "expression": ident("EventTarget") }]
        }],
        "members": [
            {
                "kind": "Constructor",
                "parameters": [
                    param("url", keyword("StringKeyword")),
                    optional_param(
                        "protocols",
                        union(vec![
                            keyword("StringKeyword"),
                            json!({ "kind": "ArrayType", "elementType": keyword("StringKeyword") }),
                        ]),
                    ),
                ]
            },
            method(
                "MethodDeclaration",
                "send",
                vec![param(
                    "message",
                    union(vec![keyword("StringKeyword"), reference("ArrayBuffer", vec![])]),
                )],
                keyword("VoidKeyword"),
            ),
            property("READY_STATE_OPEN", keyword("NumberKeyword"), &["StaticKeyword"]),
            property(
                "onmessage",
                union(vec![
                    json!({
                        "kind": "ParenthesizedType",
                        "type": {
                            "kind": "FunctionType",
                            "parameters": [param("event", reference("MessageEvent", vec![]))],
                            "type": keyword("VoidKeyword")
                        }
                    }),
                    json!({ "kind": "LiteralType", "literal": { "kind": "NullKeyword" } }),
                ]),
                &[],
            ),
        ]
    });

    let translation = translate(&source(vec![body, socket]));
    assert!(translation.diagnostics.is_empty());
    insta::assert_snapshot!(translation.text, @r"
    from bindport.runtime import external, alias
    from typing import Protocol, List, Optional, Callable


    @external
    class Body(Protocol):
        @property
        @alias('bodyUsed')
        def body_used(self) -> bool:
            raise NotImplementedError

        @alias('arrayBuffer')
        async def array_buffer(self) -> ArrayBuffer: ...

        async def text(self) -> str: ...


    @external
    @alias('webSocket')
    class WebSocket(EventTarget):
        def __init__(self, url: str, protocols: Optional[str | List[str]] = None): ...

        def send(self, message: str | ArrayBuffer) -> None: ...

        READY_STATE_OPEN: int

        @property
        def onmessage(self) -> Callable[[MessageEvent], None] | None:
            raise NotImplementedError

        @onmessage.setter
        def onmessage(self, value: Callable[[MessageEvent], None] | None) -> None: ...
    ");
}

// ============================================================================
// Module-level declarations
// ============================================================================

#[test]
fn module_declarations() {
    let connect = |params: Vec<Value>| {
        method("FunctionDeclaration", "connect", params, reference("Socket", vec![]))
    };
    let root = source(vec![
        method(
            "FunctionDeclaration",
            "fetch",
            vec![
                param("input", keyword("StringKeyword")),
                optional_param("init", reference("RequestInit", vec![])),
            ],
            reference("Promise", vec![reference("Response", vec![])]),
        ),
        connect(vec![param("host", keyword("StringKeyword"))]),
        connect(vec![
            param("host", keyword("StringKeyword")),
            param("port", keyword("NumberKeyword")),
        ]),
        json!({
            "kind": "EnumDeclaration",
            "name": ident("ReadyState"),
            "members": [
                { "kind": "EnumMember", "name": ident("CONNECTING"),
                  "initializer": { "kind": "FirstLiteralToken", "text": "0" } },
                { "kind": "EnumMember", "name": ident("OPEN") },
                { "kind": "EnumMember", "name": ident("closing"),
                  "initializer": { "kind": "StringLiteral", "text": "closing" } }
            ]
        }),
        json!({
            "kind": "TypeAliasDeclaration",
            "name": ident("bodyInit"),
            "type": union(vec![
                keyword("StringKeyword"),
                reference("ArrayBuffer", vec![]),
                keyword("NullKeyword"),
            ])
        }),
        json!({
            "kind": "VariableStatement",
            "declarationList": {
                "kind": "VariableDeclarationList",
                "declarations": [{
                    "kind": "VariableDeclaration",
                    "name": ident("navigatorAgent"),
                    "type": keyword("StringKeyword")
                }]
            }
        }),
        json!({ "kind": "ModuleDeclaration", "name": ident("internal") }),
    ]);

    let translation = translate(&root);
    assert!(translation.diagnostics.is_empty());
    insta::assert_snapshot!(translation.text, @r"
    from typing import Optional, Annotated
    from enum import Enum, auto
    from bindport.runtime import alias
    from functools import singledispatch


    async def fetch(input: str, init: Optional[RequestInit] = None) -> Response: ...


    @singledispatch
    def connect(host: str) -> Socket: ...


    @connect.register
    def connect(host: str, port: int) -> Socket: ...


    class ReadyState(Enum):
        CONNECTING = 0
        OPEN = auto()
        closing = 'closing'


    BodyInit = str | ArrayBuffer | None


    navigator_agent: Annotated[str, alias('navigatorAgent')]
    ");
}

#[test]
fn names_round_trip_through_aliases() {
    let root = source(vec![json!({
        "kind": "InterfaceDeclaration",
        "name": ident("fetchEvent"),
        "members": [method("MethodSignature", "respondWith", vec![], keyword("VoidKeyword"))]
    })]);
    let text = translate(&root).text;
    assert!(text.contains("@alias('fetchEvent')\nclass FetchEvent(Protocol):\n"));
    assert!(text.contains("    @alias('respondWith')\n    def respond_with(self) -> None: ...\n"));
}

// ============================================================================
// Synthesized types and diagnostics
// ============================================================================

#[test]
fn anonymous_object_types_are_synthesized() {
    let options_type = json!({
        "kind": "TypeLiteral",
        "members": [
            { "kind": "PropertySignature", "name": ident("port"), "type": keyword("NumberKeyword") },
            {
                "kind": "PropertySignature",
                "name": ident("hostname"),
                "questionToken": { "kind": "QuestionToken" },
                "type": keyword("StringKeyword")
            }
        ]
    });
    let root = source(vec![
        method(
            "FunctionDeclaration",
            "serve",
            vec![param("options", options_type.clone())],
            keyword("VoidKeyword"),
        ),
        method(
            "FunctionDeclaration",
            "listen",
            vec![param("options", options_type)],
            keyword("VoidKeyword"),
        ),
    ]);
    let text = translate(&root).text;

    let first = text.find("class Type1(Protocol):").expect("first synthesized type");
    let second = text.find("class Type2(Protocol):").expect("second synthesized type");
    let serve = text.find("def serve(options: Type1) -> None: ...").expect("serve");
    let listen = text.find("def listen(options: Type2) -> None: ...").expect("listen");
    assert!(first < second && second < serve && serve < listen);
    assert!(text.contains("    def hostname(self) -> Optional[str]:\n"));
    assert!(text.contains("    @port.setter\n"));
}

#[test]
fn synthesized_prefix_and_runtime_module_are_configurable() {
    let options = Options {
        dts: DtsOptions {
            runtime_module: "workers.ffi".into(),
            synthesized_prefix: "Anon".into(),
            header: vec!["# generated".into()],
        },
        ..Default::default()
    };
    let root = source(vec![json!({
        "kind": "TypeAliasDeclaration",
        "name": ident("Init"),
        "type": { "kind": "TypeLiteral", "members": [] }
    })]);
    let text = translate_with(&options, &root).text;
    assert!(text.starts_with("# generated\nfrom workers.ffi import external\n"));
    assert!(text.contains("@external\nclass Anon1(Protocol):\n    ...\n"));
    assert!(text.ends_with("Init = Anon1\n"));
}

#[test]
fn unsupported_nodes_degrade_to_diagnostics() {
    let root = source(vec![
        json!({ "kind": "ImportDeclaration" }),
        json!({
            "kind": "VariableStatement",
            "declarationList": {
                "declarations": [{
                    "kind": "VariableDeclaration",
                    "name": ident("mode"),
                    "type": {
                        "kind": "IndexedAccessType",
                        "objectType": reference("Config", vec![]),
                        "indexType": { "kind": "LiteralType",
                                       "literal": { "kind": "StringLiteral", "text": "mode" } }
                    }
                }]
            }
        }),
        json!({
            "kind": "InterfaceDeclaration",
            "name": ident("Headers"),
            "members": [
                { "kind": "IndexSignature" },
                {
                    "kind": "PropertySignature",
                    "name": { "kind": "ComputedPropertyName", "text": "[Symbol.iterator]" },
                    "type": keyword("AnyKeyword")
                }
            ]
        }),
    ]);
    let translation = translate(&root);
    let kinds: Vec<&str> = translation
        .diagnostics
        .iter()
        .map(|d| d.kind.as_str())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "ImportDeclaration",
            "IndexedAccessType",
            "IndexSignature",
            "ComputedPropertyName"
        ]
    );
    assert!(translation.text.contains("mode: Any\n"));
    assert!(translation.text.contains(
        "class Headers(Protocol):\n    # unsupported ComputedPropertyName: [Symbol.iterator]\n    ...\n"
    ));
}

#[test]
fn anonymous_declarations_are_skipped() {
    let export_default = json!([{ "kind": "ExportKeyword" }, { "kind": "DefaultKeyword" }]);
    let root = source(vec![
        json!({ "kind": "ClassDeclaration", "modifiers": export_default, "members": [] }),
        json!({
            "kind": "FunctionDeclaration",
            "modifiers": export_default,
            "parameters": [],
            "type": keyword("VoidKeyword")
        }),
        json!({
            "kind": "InterfaceDeclaration",
            "name": ident("Later"),
            "members": [{
                "kind": "PropertySignature",
                "name": ident("ready"),
                "type": keyword("BooleanKeyword")
            }]
        }),
    ]);
    let translation = translate(&root);
    let kinds: Vec<&str> = translation
        .diagnostics
        .iter()
        .map(|d| d.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["ClassDeclaration", "FunctionDeclaration"]);
    assert!(translation.text.contains("class Later(Protocol):\n"));
    assert!(translation.text.contains("def ready(self) -> bool:"));
}

#[test]
fn unknown_grammar_is_not_detected() {
    assert!(detect_translator(&json!({ "type": "Program", "body": [] })).is_none());
}
