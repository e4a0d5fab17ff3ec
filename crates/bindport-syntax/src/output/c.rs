//! C to Python generator.
//!
//! Walks a pycparser translation unit and emits Python statements. Control
//! flow that Python lacks (counting `for`, `switch`, `do`/`while`, `++`/`--`)
//! is canonicalized into equivalent Python shapes; anything that cannot be
//! mapped faithfully is a [`GenerateError`] and the pass produces nothing.

use crate::ast::c::{Node, is_step_op};
use crate::casing::escape_keyword;
use crate::context::{Context, Kinds, Role};
use crate::emit::{Document, Emitter, Imports};
use crate::input::read_c;
use crate::options::{COptions, Options};
use crate::postprocess::LineFilter;
use crate::traits::{GenerateError, TranslateError, Translation, Translator};
use crate::types::{HostType, c_pointer, c_scalar};
use regex::Regex;
use std::sync::LazyLock;

/// Static instance of the C translator for registry.
pub static C_TRANSLATOR: CTranslator = CTranslator;

/// Translator for pycparser JSON dumps.
pub struct CTranslator;

impl Translator for CTranslator {
    fn grammar(&self) -> &'static str {
        "c"
    }

    fn accepts(&self, root: &serde_json::Value) -> bool {
        root.get("_nodetype").is_some()
    }

    fn translate(
        &self,
        root: &serde_json::Value,
        options: &Options,
    ) -> Result<Translation, TranslateError> {
        let ast = read_c(root)?;
        Ok(Translation {
            text: generate_c(&ast, &options.c)?,
            diagnostics: Vec::new(),
        })
    }
}

/// Render a translation unit, then run the configured post-pass.
pub fn generate_c(root: &Node, options: &COptions) -> Result<String, TranslateError> {
    let filter = LineFilter::new(&options.postprocess)?;
    let mut document = CGenerator::new(options).generate(root)?;
    if !filter.is_identity() {
        document.blocks = document
            .blocks
            .into_iter()
            .map(|block| filter.apply(block))
            .collect();
    }
    Ok(document.render())
}

// Binding strength of host operators, loosest first.
const TERNARY: u8 = 0;
const OR: u8 = 2;
const AND: u8 = 4;
const NOT: u8 = 6;
const COMPARE: u8 = 8;
const BIT_OR: u8 = 10;
const BIT_XOR: u8 = 12;
const BIT_AND: u8 = 14;
const SHIFT: u8 = 16;
const ADD: u8 = 18;
const MUL: u8 = 20;
const UNARY: u8 = 22;
/// Names, literals, calls, subscripts and anything already bracketed.
const ATOM: u8 = u8::MAX;

fn binary_level(op: &str) -> Option<u8> {
    Some(match op {
        "||" => OR,
        "&&" => AND,
        "<" | ">" | "<=" | ">=" | "==" | "!=" => COMPARE,
        "|" => BIT_OR,
        "^" => BIT_XOR,
        "&" => BIT_AND,
        "<<" | ">>" => SHIFT,
        "+" | "-" => ADD,
        "*" | "/" | "%" => MUL,
        _ => return None,
    })
}

/// How tightly the rendered form of `node` binds.
///
/// Casts, `&` and `*` are dropped on output, so they bind like their operand.
fn binding(node: &Node) -> u8 {
    match node {
        Node::BinaryOp { op, .. } => binary_level(op).unwrap_or(ATOM),
        Node::UnaryOp { op, expr } => match op.as_str() {
            "!" => NOT,
            "-" | "+" | "~" => UNARY,
            "&" | "*" => binding(expr),
            _ => ATOM,
        },
        Node::Cast { expr, .. } => binding(expr),
        Node::TernaryOp { .. } => TERNARY,
        Node::ExprList { exprs } if exprs.len() == 1 => binding(&exprs[0]),
        _ => ATOM,
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

static INT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9a-f.x]+?)(ull|llu|ll|ul|lu|l|uz|zu|u|z)$").expect("valid regex")
});

/// Strip C literal suffixes and rewrite octal.
fn normalize_literal(ty: &str, value: &str) -> String {
    let mut value = match INT_SUFFIX.captures(value) {
        Some(caps) => caps[1].to_string(),
        None => value.to_string(),
    };
    let is_hex = value.starts_with("0x") || value.starts_with("0X");
    if !is_hex
        && (value.contains('.') || matches!(ty, "float" | "double"))
        && value.ends_with(['f', 'F'])
    {
        value.pop();
    }
    if value.len() > 1 && value.starts_with('0') && value.bytes().all(|b| b.is_ascii_digit()) {
        value = format!("0o{}", &value[1..]);
    }
    value
}

/// Whether `node` contains one of the `kinds` of jump, bound to the loop or
/// switch directly around it.
fn contains_jump(node: &Node, kinds: Kinds) -> bool {
    match node {
        Node::Break {} => kinds.contains(Kinds::BREAK),
        Node::Continue {} => kinds.contains(Kinds::CONTINUE),
        Node::For { .. } | Node::While { .. } | Node::DoWhile { .. } => false,
        // `break` inside a switch belongs to the switch.
        Node::Switch { stmt, .. } => contains_jump(stmt, kinds - Kinds::BREAK),
        Node::Compound { block_items } => block_items.iter().any(|n| contains_jump(n, kinds)),
        Node::If {
            iftrue, iffalse, ..
        } => {
            contains_jump(iftrue, kinds)
                || iffalse.as_deref().is_some_and(|n| contains_jump(n, kinds))
        }
        Node::Label { stmt, .. } => contains_jump(stmt, kinds),
        Node::Case { stmts, .. } | Node::Default { stmts } => {
            stmts.iter().any(|n| contains_jump(n, kinds))
        }
        _ => false,
    }
}

/// Statements of a case body with nested compounds flattened.
fn flatten(stmts: &[Node]) -> Vec<&Node> {
    let mut out = Vec::new();
    for stmt in stmts {
        match stmt {
            Node::Compound { block_items } => out.extend(flatten(block_items)),
            other => out.push(other),
        }
    }
    out
}

/// Step direction of `v++`, `--v`, `v += 1` on the induction variable `var`.
fn step_of(next: &Node, var: &str) -> Option<i64> {
    match next {
        Node::UnaryOp { op, expr } if matches!(&**expr, Node::Id { name } if name == var) => {
            match op.as_str() {
                "++" | "p++" => Some(1),
                "--" | "p--" => Some(-1),
                _ => None,
            }
        }
        Node::Assignment { op, lvalue, rvalue }
            if matches!(&**lvalue, Node::Id { name } if name == var)
                && rvalue.int_value() == Some(1) =>
        {
            match op.as_str() {
                "+=" => Some(1),
                "-=" => Some(-1),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Induction variable and start value of a `for` initializer.
fn induction(init: &Node) -> Option<(&str, &Node)> {
    match init {
        Node::Assignment { op, lvalue, rvalue } if op == "=" => match &**lvalue {
            Node::Id { name } => Some((name.as_str(), &**rvalue)),
            _ => None,
        },
        Node::DeclList { decls } if decls.len() == 1 => match &decls[0] {
            Node::Decl {
                name: Some(name),
                init: Some(init),
                ..
            } => Some((name.as_str(), &**init)),
            _ => None,
        },
        _ => None,
    }
}

/// A condition split into effects to run around a pure test.
#[derive(Debug)]
struct Extracted {
    pre: Vec<Node>,
    cond: Node,
    post: Vec<Node>,
}

impl Extracted {
    fn pure(cond: &Node) -> Self {
        Self {
            pre: Vec::new(),
            cond: cond.clone(),
            post: Vec::new(),
        }
    }
}

/// Split increments/decrements out of a loop test, one level deep.
fn extract_effects(cond: &Node) -> Result<Extracted, GenerateError> {
    if !cond.has_steps() {
        return Ok(Extracted::pure(cond));
    }
    match cond {
        _ if cond.is_step() => extract_operand(cond),
        Node::BinaryOp { op, left, right } => {
            if matches!(op.as_str(), "&&" | "||") && right.has_steps() {
                return Err(GenerateError::UnsupportedEffect(format!(
                    "right operand of `{op}`"
                )));
            }
            let left = extract_operand(left)?;
            let right = extract_operand(right)?;
            Ok(Extracted {
                pre: left.pre.into_iter().chain(right.pre).collect(),
                cond: Node::binary(left.cond, op, right.cond),
                post: left.post.into_iter().chain(right.post).collect(),
            })
        }
        other => Err(GenerateError::UnsupportedEffect(other.kind().into())),
    }
}

fn extract_operand(node: &Node) -> Result<Extracted, GenerateError> {
    match node {
        _ if !node.has_steps() => Ok(Extracted::pure(node)),
        Node::UnaryOp { op, expr } if is_step_op(op) && !expr.has_steps() => {
            let prefix = !op.starts_with('p');
            Ok(Extracted {
                pre: if prefix { vec![node.clone()] } else { Vec::new() },
                cond: (**expr).clone(),
                post: vec![node.clone()],
            })
        }
        other => Err(GenerateError::UnsupportedEffect(format!(
            "nested effect in {}",
            other.kind()
        ))),
    }
}

/// Case labels of one switch arm.
#[derive(Debug, Clone, Copy)]
enum CaseLabel<'n> {
    Case(&'n Node),
    Default,
}

/// Consecutive labels plus the statements that follow them.
#[derive(Debug)]
struct Arm<'n> {
    labels: Vec<CaseLabel<'n>>,
    body: Vec<&'n Node>,
    /// Control never reaches the next arm.
    terminal: bool,
}

impl Arm<'_> {
    fn has_default(&self) -> bool {
        self.labels.iter().any(|l| matches!(l, CaseLabel::Default))
    }
}

/// Emits a C translation unit as Python source lines.
pub struct CGenerator<'a> {
    options: &'a COptions,
    out: Emitter,
    imports: Imports,
}

impl<'a> CGenerator<'a> {
    pub fn new(options: &'a COptions) -> Self {
        Self {
            options,
            out: Emitter::new(),
            imports: Imports::default(),
        }
    }

    /// Render a `FileAST` into a document of header, imports and body.
    pub fn generate(mut self, root: &Node) -> Result<Document, GenerateError> {
        let Node::FileAst { ext } = root else {
            return Err(unexpected(root, "translation unit root"));
        };
        let ctx = Context::default();
        for node in ext {
            self.write_external(node, ctx)?;
        }
        Ok(Document {
            header: self.options.header.clone(),
            imports: self.imports,
            blocks: vec![self.out.finish()],
        })
    }

    fn write_external(&mut self, node: &Node, ctx: Context) -> Result<(), GenerateError> {
        match node {
            Node::FuncDef {
                decl,
                param_decls,
                body,
            } => {
                if !param_decls.is_empty() {
                    tracing::debug!("ignoring K&R parameter declarations");
                }
                self.write_signature(decl, ctx)?;
                self.write_block(body, ctx.with_role(Role::Body))
            }
            Node::Decl { .. } => self.write_decl(node, ctx),
            Node::Typedef { .. } => self.write_typedef(node, ctx),
            Node::Pragma { .. } | Node::StaticAssert { .. } => self.write_stmt(node, ctx),
            other => Err(unexpected(other, "translation unit")),
        }
    }

    // Types

    fn host(&mut self, host: HostType) -> String {
        if let Some((module, symbol)) = host.import {
            self.imports.add(module, symbol);
        }
        host.name.to_string()
    }

    fn typing(&mut self, symbol: &'static str) -> &'static str {
        self.imports.add("typing", symbol);
        symbol
    }

    /// Raw C spelling of a scalar type, if `ty` is one.
    fn spelling(ty: &Node) -> Option<String> {
        match ty {
            Node::TypeDecl { ty, .. } | Node::Typename { ty, .. } => Self::spelling(ty),
            Node::IdentifierType { names } => Some(names.join(" ")),
            _ => None,
        }
    }

    /// Python annotation for a C type.
    fn type_hint(&mut self, ty: &Node) -> String {
        match ty {
            Node::TypeDecl { ty, .. } | Node::Typename { ty, .. } | Node::Decl { ty, .. } => {
                self.type_hint(ty)
            }
            Node::IdentifierType { names } => {
                let spelling = names.join(" ");
                match c_scalar(&spelling) {
                    Some(host) => self.host(host),
                    None if names.len() > 1 => "int".into(),
                    None => spelling,
                }
            }
            Node::Struct { name, .. } | Node::Union { name, .. } => match name {
                Some(name) => name.clone(),
                None => self.typing("Any").into(),
            },
            Node::Enum { name, .. } => name.clone().unwrap_or_else(|| "int".into()),
            Node::PtrDecl { ty } | Node::ArrayDecl { ty, .. } => {
                if matches!(**ty, Node::FuncDecl { .. }) {
                    return self.type_hint(ty);
                }
                match Self::spelling(ty).and_then(|s| c_pointer(&s)) {
                    Some(host) => self.host(host),
                    None => {
                        let element = self.type_hint(ty);
                        format!("{}[{element}]", self.typing("List"))
                    }
                }
            }
            Node::FuncDecl { args, ty } => {
                let ret = self.type_hint(ty);
                let callable = self.typing("Callable");
                let params: Vec<&Node> = match args.as_deref() {
                    Some(Node::ParamList { params }) if !is_void_params(params) => {
                        params.iter().collect()
                    }
                    _ => Vec::new(),
                };
                if params.iter().any(|p| matches!(p, Node::EllipsisParam {})) {
                    return format!("{callable}[..., {ret}]");
                }
                let params: Vec<String> = params.iter().map(|p| self.type_hint(p)).collect();
                format!("{callable}[[{}], {ret}]", params.join(", "))
            }
            _ => self.typing("Any").into(),
        }
    }

    // Declarations

    /// `def name(params):`, after any enum or aggregate defined inside the
    /// signature.
    fn write_signature(&mut self, decl: &Node, ctx: Context) -> Result<(), GenerateError> {
        let Node::Decl {
            name: Some(name),
            ty,
            ..
        } = decl
        else {
            return Err(unexpected(decl, "function definition"));
        };
        let Node::FuncDecl { args, ty: ret } = &**ty else {
            return Err(unexpected(ty, "function signature"));
        };
        self.write_inner_definitions(ret, ctx.with_role(Role::Signature))?;
        if let Some(Node::ParamList { params: list }) = args.as_deref() {
            for param in list {
                if let Node::Decl { ty, .. } = param {
                    self.write_inner_definitions(ty, ctx.with_role(Role::Params))?;
                }
            }
        }
        self.out.blank(2);

        let hints = self.options.use_type_hints;
        let mut params = Vec::new();
        if let Some(Node::ParamList { params: list }) = args.as_deref() {
            if !is_void_params(list) {
                for (idx, param) in list.iter().enumerate() {
                    params.push(match param {
                        Node::EllipsisParam {} => "*args".to_string(),
                        Node::Decl {
                            name: Some(pname),
                            ty,
                            ..
                        } => {
                            let pname = escape_keyword(pname);
                            if hints {
                                format!("{pname}: {}", self.type_hint(ty))
                            } else {
                                pname
                            }
                        }
                        other if hints => format!("arg{idx}: {}", self.type_hint(other)),
                        _ => format!("arg{idx}"),
                    });
                }
            }
        }
        let mut line = format!("def {}({})", escape_keyword(name), params.join(", "));
        if hints {
            line.push_str(" -> ");
            line.push_str(&self.type_hint(ret));
        }
        line.push(':');
        self.out.line(line);
        Ok(())
    }

    fn write_decl(&mut self, node: &Node, ctx: Context) -> Result<(), GenerateError> {
        let Node::Decl { name, ty, init, .. } = node else {
            return Err(unexpected(node, "declaration"));
        };
        match (name, &**ty) {
            (_, Node::FuncDecl { .. }) => {
                tracing::debug!(name = name.as_deref(), "suppressed prototype");
                return Ok(());
            }
            (
                None,
                Node::Enum {
                    name,
                    values: Some(values),
                },
            ) => return self.write_enum(name.as_deref(), values, ctx),
            (None, Node::Struct { name, decls } | Node::Union { name, decls }) => {
                return self.write_aggregate(name.as_deref(), decls.as_deref(), ctx);
            }
            (None, other) => {
                tracing::debug!(kind = other.kind(), "skipped anonymous declaration");
                return Ok(());
            }
            _ => {}
        }
        let Some(name) = name else {
            return Ok(());
        };
        self.write_inner_definitions(ty, ctx)?;

        let target = escape_keyword(name);
        let annotate = self.options.type_hint_declarations;
        let line = match init {
            Some(init) => {
                let value = self.render_expr(init)?;
                if annotate {
                    format!("{target}: {} = {value}", self.type_hint(ty))
                } else {
                    format!("{target} = {value}")
                }
            }
            None if ctx.role == Role::Body => {
                if !self.options.keep_empty_declarations {
                    tracing::debug!(name = %name, "elided uninitialized local");
                    return Ok(());
                }
                if annotate {
                    format!("{target}: {} | None = None", self.type_hint(ty))
                } else {
                    format!("{target} = None")
                }
            }
            None => format!("{target}: {}", self.type_hint(ty)),
        };
        self.out.line(line);
        Ok(())
    }

    /// Enum or struct bodies declared inline with a variable.
    fn write_inner_definitions(&mut self, ty: &Node, ctx: Context) -> Result<(), GenerateError> {
        match ty {
            Node::TypeDecl { ty, .. } | Node::PtrDecl { ty } | Node::ArrayDecl { ty, .. } => {
                self.write_inner_definitions(ty, ctx)
            }
            Node::Enum {
                name,
                values: Some(values),
            } => self.write_enum(name.as_deref(), values, ctx),
            Node::Struct {
                name,
                decls: Some(decls),
            }
            | Node::Union {
                name,
                decls: Some(decls),
            } => self.write_aggregate(name.as_deref(), Some(decls), ctx),
            _ => Ok(()),
        }
    }

    fn write_typedef(&mut self, node: &Node, ctx: Context) -> Result<(), GenerateError> {
        let Node::Typedef { name, ty } = node else {
            return Err(unexpected(node, "typedef"));
        };
        let target = match &**ty {
            Node::TypeDecl { ty, .. } => &**ty,
            other => other,
        };
        match target {
            Node::Enum {
                values: Some(values),
                ..
            } => self.write_enum(Some(name), values, ctx),
            Node::Struct {
                decls: Some(decls), ..
            }
            | Node::Union {
                decls: Some(decls), ..
            } => self.write_aggregate(Some(name), Some(decls), ctx),
            _ if self.options.emit_aggregates => {
                let hint = self.type_hint(ty);
                self.out.line(format!("{} = {hint}", escape_keyword(name)));
                Ok(())
            }
            _ => {
                tracing::debug!(name = %name, "suppressed typedef");
                Ok(())
            }
        }
    }

    /// `class Name:` with annotated fields.
    fn write_aggregate(
        &mut self,
        name: Option<&str>,
        decls: Option<&[Node]>,
        ctx: Context,
    ) -> Result<(), GenerateError> {
        let (Some(name), Some(decls)) = (name, decls) else {
            return Ok(());
        };
        if !self.options.emit_aggregates {
            tracing::debug!(name, "suppressed aggregate");
            return Ok(());
        }
        if ctx.role.is_module_scope() {
            self.out.blank(2);
        }
        self.out.line(format!("class {}:", escape_keyword(name)));
        self.out.indent();
        let before = self.out.len();
        for decl in decls {
            match decl {
                Node::Decl {
                    name: Some(field),
                    ty,
                    ..
                } => {
                    let hint = self.type_hint(ty);
                    self.out.line(format!("{}: {hint}", escape_keyword(field)));
                }
                other => tracing::debug!(kind = other.kind(), "skipped anonymous member"),
            }
        }
        if self.out.len() == before {
            self.out.line("pass");
        }
        self.out.dedent();
        Ok(())
    }

    /// `class Name(IntEnum):`, or module constants for an anonymous enum.
    fn write_enum(
        &mut self,
        name: Option<&str>,
        values: &Node,
        ctx: Context,
    ) -> Result<(), GenerateError> {
        let Node::EnumeratorList { enumerators } = values else {
            return Err(unexpected(values, "enum"));
        };
        if let Some(name) = name {
            if ctx.role.is_module_scope() {
                self.out.blank(2);
            }
            self.imports.add("enum", "IntEnum");
            self.out.line(format!("class {}(IntEnum):", escape_keyword(name)));
            self.out.indent();
        }
        let before = self.out.len();
        let mut previous: Option<(String, Option<i64>)> = None;
        for enumerator in enumerators {
            let Node::Enumerator { name: member, value } = enumerator else {
                return Err(unexpected(enumerator, "enumerator list"));
            };
            let member = escape_keyword(member);
            let (text, number) = match (value, &previous) {
                (Some(value), _) => (self.render_expr(value)?, value.int_value()),
                (None, None) => ("0".to_string(), Some(0)),
                (None, Some((prev, number))) => match number.and_then(|n| n.checked_add(1)) {
                    Some(n) => (n.to_string(), Some(n)),
                    None => (format!("{prev} + 1"), None),
                },
            };
            self.out.line(format!("{member} = {text}"));
            previous = Some((member, number));
        }
        if name.is_some() {
            if self.out.len() == before {
                self.out.line("pass");
            }
            self.out.dedent();
        }
        Ok(())
    }

    // Statements

    /// Indented body; `pass` when nothing was emitted.
    fn write_block(&mut self, node: &Node, ctx: Context) -> Result<(), GenerateError> {
        self.write_body(&[node], ctx)
    }

    fn write_body(&mut self, nodes: &[&Node], ctx: Context) -> Result<(), GenerateError> {
        self.out.indent();
        let before = self.out.len();
        for node in nodes {
            self.write_stmt(node, ctx)?;
        }
        if self.out.len() == before {
            self.out.line("pass");
        }
        self.out.dedent();
        Ok(())
    }

    fn write_stmt(&mut self, node: &Node, ctx: Context) -> Result<(), GenerateError> {
        if ctx.skips(node.kind()) {
            return Ok(());
        }
        match node {
            Node::Compound { block_items } => {
                for item in block_items {
                    self.write_stmt(item, ctx)?;
                }
            }
            Node::Decl { .. } => self.write_decl(node, ctx)?,
            Node::DeclList { decls } => {
                for decl in decls {
                    self.write_decl(decl, ctx)?;
                }
            }
            Node::Typedef { .. } => self.write_typedef(node, ctx)?,
            Node::ExprList { exprs } => {
                for expr in exprs {
                    self.write_stmt(expr, ctx)?;
                }
            }
            Node::UnaryOp { op, expr } if is_step_op(op) => {
                let target = self.render_expr(expr)?;
                let op = if op.ends_with('+') { "+=" } else { "-=" };
                self.out.line(format!("{target} {op} 1"));
            }
            Node::Assignment { .. } => {
                let line = self.render_assignment(node)?;
                self.out.line(line);
            }
            Node::Return { expr } => {
                let line = match expr {
                    Some(expr) => format!("return {}", self.render_expr(expr)?),
                    None => "return".to_string(),
                };
                self.out.line(line);
            }
            Node::If {
                cond,
                iftrue,
                iffalse,
            } => self.write_if(cond, iftrue, iffalse.as_deref(), false, ctx)?,
            Node::For {
                init,
                cond,
                next,
                stmt,
            } => self.write_for(
                init.as_deref(),
                cond.as_deref(),
                next.as_deref(),
                stmt,
                ctx,
            )?,
            Node::While { cond, stmt } => self.write_while(cond, stmt, ctx)?,
            Node::DoWhile { cond, stmt } => self.write_do_while(cond, stmt, ctx)?,
            Node::Switch { cond, stmt } => self.write_switch(cond, stmt, ctx)?,
            Node::Break {} => self.out.line("break"),
            Node::Continue {} => self.out.line("continue"),
            Node::Goto { name } => match &self.options.goto_call {
                Some(call) => self.out.line(format!("{call}('{name}')")),
                None => return Err(GenerateError::Goto(name.clone())),
            },
            Node::Label { name, stmt } => {
                self.out.line(format!("# label: {name}"));
                self.write_stmt(stmt, ctx)?;
            }
            Node::EmptyStatement {} => {}
            Node::Pragma { string } => {
                self.out
                    .line(format!("#pragma {}", string.as_deref().unwrap_or_default()));
            }
            Node::StaticAssert { cond, message } => {
                let mut line = format!("assert {}", self.render_expr(cond)?);
                if let Some(message) = message {
                    line.push_str(", ");
                    line.push_str(&self.render_expr(message)?);
                }
                self.out.line(line);
            }
            Node::Case { .. } | Node::Default { .. } => {
                return Err(unexpected(node, "statement outside switch"));
            }
            Node::FuncCall { .. }
            | Node::Id { .. }
            | Node::Constant { .. }
            | Node::BinaryOp { .. }
            | Node::UnaryOp { .. }
            | Node::TernaryOp { .. }
            | Node::ArrayRef { .. }
            | Node::StructRef { .. }
            | Node::Cast { .. } => {
                let line = self.render_expr(node)?;
                self.out.line(line);
            }
            other => return Err(unexpected(other, "statement")),
        }
        Ok(())
    }

    fn write_if(
        &mut self,
        cond: &Node,
        iftrue: &Node,
        iffalse: Option<&Node>,
        is_elif: bool,
        ctx: Context,
    ) -> Result<(), GenerateError> {
        if let Some(value) = cond.int_value() {
            tracing::debug!(value, "folded constant condition");
            return match (value != 0, is_elif) {
                (true, false) => self.write_stmt(iftrue, ctx),
                (true, true) => {
                    self.out.line("else:");
                    self.write_block(iftrue, ctx)
                }
                (false, _) => match iffalse {
                    Some(Node::If {
                        cond,
                        iftrue,
                        iffalse,
                    }) => self.write_if(cond, iftrue, iffalse.as_deref(), is_elif, ctx),
                    Some(other) if is_elif => {
                        self.out.line("else:");
                        self.write_block(other, ctx)
                    }
                    Some(other) => self.write_stmt(other, ctx),
                    None => Ok(()),
                },
            };
        }
        let keyword = if is_elif { "elif" } else { "if" };
        let test = self.render_expr(cond)?;
        self.out.line(format!("{keyword} {test}:"));
        self.write_block(iftrue, ctx)?;
        match iffalse {
            Some(Node::If {
                cond,
                iftrue,
                iffalse,
            }) => self.write_if(cond, iftrue, iffalse.as_deref(), true, ctx),
            Some(other) => {
                self.out.line("else:");
                self.write_block(other, ctx)
            }
            None => Ok(()),
        }
    }

    fn write_for(
        &mut self,
        init: Option<&Node>,
        cond: Option<&Node>,
        next: Option<&Node>,
        body: &Node,
        ctx: Context,
    ) -> Result<(), GenerateError> {
        if let (Some(init), Some(cond), Some(next)) = (init, cond, next) {
            if let Some(header) = self.range_header(init, cond, next)? {
                self.out.line(header);
                return self.write_block(body, ctx.enter_loop());
            }
        }

        if next.is_some() && contains_jump(body, Kinds::CONTINUE) {
            return Err(GenerateError::ContinueSkipsStep);
        }
        if let Some(init) = init {
            self.write_stmt(init, ctx)?;
        }
        // Without a step the test stays in the header, where `continue`
        // re-evaluates it.
        if let (Some(cond), None) = (cond, next) {
            return self.write_while(cond, body, ctx);
        }
        let test = cond.map(|c| self.render_expr(c)).transpose()?;
        if let Some(test) = &test {
            self.out.line(format!("if {test}:"));
            self.out.indent();
        }
        self.out.line("while True:");
        self.out.indent();
        let before = self.out.len();
        self.write_stmt(body, ctx.enter_loop())?;
        if let Some(next) = next {
            self.write_stmt(next, ctx)?;
        }
        if let Some(test) = &test {
            self.out.line(format!("if not ({test}): break"));
        }
        if self.out.len() == before {
            self.out.line("pass");
        }
        self.out.dedent();
        if test.is_some() {
            self.out.dedent();
        }
        Ok(())
    }

    /// `for v in range(...):` when the loop is a plain counting loop.
    fn range_header(
        &mut self,
        init: &Node,
        cond: &Node,
        next: &Node,
    ) -> Result<Option<String>, GenerateError> {
        let Some((var, start)) = induction(init) else {
            return Ok(None);
        };
        let Some(step) = step_of(next, var) else {
            return Ok(None);
        };
        let Node::BinaryOp { op, left, right } = cond else {
            return Ok(None);
        };
        if !matches!(&**left, Node::Id { name } if name == var) || right.has_effects() {
            return Ok(None);
        }
        let inclusive = match (step, op.as_str()) {
            (1, "<") | (-1, ">") => false,
            (1, "<=") | (-1, ">=") => true,
            _ => return Ok(None),
        };
        let bound = match right.int_value().and_then(|n| n.checked_add(step)) {
            _ if !inclusive => (**right).clone(),
            Some(n) => Node::int(n),
            None if step > 0 => Node::binary((**right).clone(), "+", Node::int(1)),
            None => Node::binary((**right).clone(), "-", Node::int(1)),
        };
        let start = self.render_expr(start)?;
        let bound = self.render_expr(&bound)?;
        let var = escape_keyword(var);
        Ok(Some(if step > 0 {
            format!("for {var} in range({start}, {bound}):")
        } else {
            format!("for {var} in range({start}, {bound}, -1):")
        }))
    }

    fn write_while(&mut self, cond: &Node, body: &Node, ctx: Context) -> Result<(), GenerateError> {
        let Extracted { pre, cond, post } = extract_effects(cond)?;
        if !post.is_empty() && contains_jump(body, Kinds::CONTINUE) {
            return Err(GenerateError::ContinueSkipsStep);
        }
        // C runs a postfix effect before the body, so `break` must not skip it.
        let postfix = post
            .iter()
            .any(|e| matches!(e, Node::UnaryOp { op, .. } if op.starts_with('p')));
        if postfix && contains_jump(body, Kinds::BREAK) {
            return Err(GenerateError::BreakSkipsEffect);
        }
        for effect in &pre {
            self.write_stmt(effect, ctx)?;
        }
        let test = self.render_expr(&cond)?;
        self.out.line(format!("while {test}:"));
        self.out.indent();
        let before = self.out.len();
        self.write_stmt(body, ctx.enter_loop())?;
        for effect in &post {
            self.write_stmt(effect, ctx)?;
        }
        if self.out.len() == before {
            self.out.line("pass");
        }
        self.out.dedent();
        Ok(())
    }

    fn write_do_while(
        &mut self,
        cond: &Node,
        body: &Node,
        ctx: Context,
    ) -> Result<(), GenerateError> {
        let jumps = contains_jump(body, Kinds::BREAK | Kinds::CONTINUE);
        if cond.int_value() == Some(0) && !jumps {
            return self.write_stmt(body, ctx);
        }
        // `continue` would bypass the trailing test.
        if contains_jump(body, Kinds::CONTINUE) {
            return Err(GenerateError::ContinueSkipsStep);
        }
        let test = self.render_expr(cond)?;
        self.out.line("while True:");
        self.out.indent();
        self.write_stmt(body, ctx.enter_loop())?;
        self.out.line(format!("if not ({test}): break"));
        self.out.dedent();
        Ok(())
    }

    fn write_switch(&mut self, cond: &Node, body: &Node, ctx: Context) -> Result<(), GenerateError> {
        let arms = self.switch_arms(body)?;
        if arms.is_empty() {
            tracing::debug!("empty switch");
            return Ok(());
        }
        let falls_through = arms[..arms.len() - 1].iter().any(|arm| !arm.terminal);
        let ctx = ctx.enter_loop().with_skip(Kinds::BREAK);
        if falls_through {
            self.write_switch_chain(cond, &arms, ctx)
        } else {
            self.write_match(cond, &arms, ctx)
        }
    }

    /// Group the switch body into arms and validate each one.
    fn switch_arms<'n>(&mut self, body: &'n Node) -> Result<Vec<Arm<'n>>, GenerateError> {
        let items: Vec<&Node> = match body {
            Node::Compound { block_items } => block_items.iter().collect(),
            other => vec![other],
        };
        let mut arms = Vec::new();
        let mut labels = Vec::new();
        for item in items {
            let stmts = match item {
                Node::Case { expr, stmts } => {
                    labels.push(CaseLabel::Case(expr));
                    stmts
                }
                Node::Default { stmts } => {
                    labels.push(CaseLabel::Default);
                    stmts
                }
                other => return Err(GenerateError::UnsupportedSwitchItem(other.kind().into())),
            };
            let body = flatten(stmts);
            if body.is_empty() {
                continue;
            }
            let label = self.label_text(labels.last().copied());
            let last = body.len() - 1;
            for (idx, stmt) in body.iter().enumerate() {
                if matches!(stmt, Node::Break {}) {
                    if idx != last {
                        return Err(GenerateError::CodeAfterBreak(label));
                    }
                } else if contains_jump(stmt, Kinds::BREAK) {
                    return Err(GenerateError::ConditionalBreak(label));
                }
            }
            let terminal = matches!(
                body[last],
                Node::Break {} | Node::Return { .. } | Node::Continue {} | Node::Goto { .. }
            );
            arms.push(Arm {
                labels: std::mem::take(&mut labels),
                body,
                terminal,
            });
        }
        if !labels.is_empty() {
            arms.push(Arm {
                labels,
                body: Vec::new(),
                terminal: false,
            });
        }
        Ok(arms)
    }

    fn label_text(&mut self, label: Option<CaseLabel<'_>>) -> String {
        match label {
            Some(CaseLabel::Case(expr)) => self
                .render_expr(expr)
                .unwrap_or_else(|_| expr.kind().to_string()),
            _ => "default".into(),
        }
    }

    /// Match pattern for a label, if it can be written as one.
    fn pattern(&mut self, label: &Node) -> Result<Option<String>, GenerateError> {
        let is_value_pattern = |node: &Node| {
            let mut node = node;
            loop {
                match node {
                    Node::StructRef { name, .. } => node = &**name,
                    Node::Id { .. } => return true,
                    _ => return false,
                }
            }
        };
        Ok(match label {
            Node::Constant { .. } => Some(self.render_expr(label)?),
            Node::UnaryOp { op, expr } if op == "-" && matches!(**expr, Node::Constant { .. }) => {
                Some(self.render_expr(label)?)
            }
            Node::StructRef { .. } if is_value_pattern(label) => Some(self.render_expr(label)?),
            _ => None,
        })
    }

    fn write_match(&mut self, cond: &Node, arms: &[Arm<'_>], ctx: Context) -> Result<(), GenerateError> {
        let subject = self.render_expr(cond)?;
        self.out.line(format!("match {subject}:"));
        self.out.indent();
        let (defaults, cases): (Vec<&Arm<'_>>, Vec<&Arm<'_>>) =
            arms.iter().partition(|arm| arm.has_default());
        for arm in cases.into_iter().chain(defaults) {
            let header = if arm.has_default() {
                "case _:".to_string()
            } else {
                self.case_header(cond, arm)?
            };
            self.out.line(header);
            self.write_body(&arm.body, ctx)?;
        }
        self.out.dedent();
        Ok(())
    }

    fn case_header(&mut self, cond: &Node, arm: &Arm<'_>) -> Result<String, GenerateError> {
        let labels: Vec<&Node> = arm
            .labels
            .iter()
            .filter_map(|l| match l {
                CaseLabel::Case(expr) => Some(*expr),
                CaseLabel::Default => None,
            })
            .collect();
        let mut patterns = Vec::new();
        for label in &labels {
            match self.pattern(label)? {
                Some(pattern) => patterns.push(pattern),
                None => {
                    patterns.clear();
                    break;
                }
            }
        }
        if patterns.len() == labels.len() {
            return Ok(format!("case {}:", patterns.join(" | ")));
        }
        if cond.has_effects() {
            return Err(GenerateError::UnsupportedDiscriminant(
                "discriminant with side effects".into(),
            ));
        }
        let guard = labels
            .iter()
            .map(|label| Node::binary(cond.clone(), "==", (*label).clone()))
            .reduce(|acc, test| Node::binary(acc, "||", test))
            .ok_or_else(|| unexpected(cond, "empty switch arm"))?;
        Ok(format!("case _ if {}:", self.render_expr(&guard)?))
    }

    /// `if`/`elif` chain for switches with fallthrough.
    fn write_switch_chain(
        &mut self,
        cond: &Node,
        arms: &[Arm<'_>],
        ctx: Context,
    ) -> Result<(), GenerateError> {
        if !matches!(cond, Node::Id { .. } | Node::Constant { .. }) {
            return Err(GenerateError::UnsupportedDiscriminant(cond.kind().into()));
        }
        let labels: Vec<CaseLabel<'_>> = arms.iter().flat_map(|a| a.labels.iter().copied()).collect();
        if let Some(idx) = labels.iter().position(|l| matches!(l, CaseLabel::Default)) {
            if idx != labels.len() - 1 {
                return Err(GenerateError::DefaultNotLast);
            }
        }

        let mut first = true;
        let mut region: Vec<&Arm<'_>> = Vec::new();
        for (idx, arm) in arms.iter().enumerate() {
            region.push(arm);
            if !arm.terminal && idx != arms.len() - 1 {
                continue;
            }
            let mut shared: Vec<&Node> = Vec::new();
            let mut offsets = Vec::new();
            for arm in region.drain(..) {
                for label in &arm.labels {
                    offsets.push((*label, shared.len()));
                }
                shared.extend(arm.body.iter().copied());
            }
            for (label, offset) in offsets {
                match label {
                    CaseLabel::Case(expr) => {
                        let test = self.render_expr(&Node::binary(cond.clone(), "==", expr.clone()))?;
                        let keyword = if first { "if" } else { "elif" };
                        self.out.line(format!("{keyword} {test}:"));
                    }
                    // Only label of the switch: runs unconditionally.
                    CaseLabel::Default if first => {
                        for stmt in &shared[offset..] {
                            self.write_stmt(stmt, ctx)?;
                        }
                        continue;
                    }
                    CaseLabel::Default => self.out.line("else:"),
                }
                first = false;
                self.write_body(&shared[offset..], ctx)?;
            }
        }
        Ok(())
    }

    // Expressions

    /// Statement-level assignment, keeping `a = b = c` chains.
    fn render_assignment(&mut self, node: &Node) -> Result<String, GenerateError> {
        let Node::Assignment { op, lvalue, rvalue } = node else {
            return self.render_expr(node);
        };
        let target = self.render_expr(lvalue)?;
        let value = match &**rvalue {
            Node::Assignment { op: inner, .. } if op == "=" && inner == "=" => {
                self.render_assignment(rvalue)?
            }
            other => self.render_expr(other)?,
        };
        Ok(format!("{target} {op} {value}"))
    }

    fn render_operand(
        &mut self,
        node: &Node,
        parent: u8,
        side: Side,
    ) -> Result<String, GenerateError> {
        let text = self.render_expr(node)?;
        let child = binding(node);
        let wrap = if child == ATOM {
            false
        } else if !self.options.reduce_parentheses || (parent == COMPARE && child == COMPARE) {
            true
        } else {
            match side {
                Side::Left => child < parent,
                Side::Right => child <= parent,
            }
        };
        Ok(if wrap { format!("({text})") } else { text })
    }

    /// Render an expression in value position.
    pub fn render_expr(&mut self, node: &Node) -> Result<String, GenerateError> {
        Ok(match node {
            Node::Constant { ty, value } => normalize_literal(ty, value),
            Node::Id { name } => escape_keyword(name),
            Node::BinaryOp { op, left, right } => {
                let level = binary_level(op)
                    .ok_or_else(|| GenerateError::UnsupportedExpression(format!("operator {op}")))?;
                let left = self.render_operand(left, level, Side::Left)?;
                let right = self.render_operand(right, level, Side::Right)?;
                let op = match op.as_str() {
                    "&&" => "and",
                    "||" => "or",
                    other => other,
                };
                format!("{left} {op} {right}")
            }
            Node::UnaryOp { op, expr } => match op.as_str() {
                "!" => format!("not {}", self.render_operand(expr, NOT, Side::Left)?),
                "-" | "+" | "~" => format!("{op}{}", self.render_operand(expr, UNARY, Side::Left)?),
                "&" | "*" => self.render_expr(expr)?,
                step if is_step_op(step) => {
                    return Err(GenerateError::StepAsValue(self.render_expr(expr)?));
                }
                _ => {
                    let inner = match &**expr {
                        Node::Typename { .. } => self.type_hint(expr),
                        other => self.render_expr(other)?,
                    };
                    format!("{op}({inner})")
                }
            },
            Node::Assignment { op, lvalue, rvalue } => {
                let Node::Id { name } = &**lvalue else {
                    return Err(GenerateError::UnsupportedExpression(format!(
                        "assignment to {} used as a value",
                        lvalue.kind()
                    )));
                };
                let value = if op == "=" {
                    self.render_expr(rvalue)?
                } else {
                    let op = op.trim_end_matches('=');
                    self.render_expr(&Node::binary((**lvalue).clone(), op, (**rvalue).clone()))?
                };
                format!("({} := {value})", escape_keyword(name))
            }
            Node::TernaryOp {
                cond,
                iftrue,
                iffalse,
            } => {
                let iftrue = self.render_operand(iftrue, TERNARY, Side::Right)?;
                let cond = self.render_operand(cond, TERNARY, Side::Right)?;
                let iffalse = self.render_operand(iffalse, TERNARY, Side::Right)?;
                format!("{iftrue} if {cond} else {iffalse}")
            }
            Node::FuncCall { name, args } => {
                let callee = self.render_operand(name, ATOM, Side::Left)?;
                let args = match args.as_deref() {
                    Some(Node::ExprList { exprs }) => exprs
                        .iter()
                        .map(|e| self.render_expr(e))
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(other) => vec![self.render_expr(other)?],
                    None => Vec::new(),
                };
                format!("{callee}({})", args.join(", "))
            }
            Node::ArrayRef { name, subscript } => {
                let base = self.render_operand(name, ATOM, Side::Left)?;
                format!("{base}[{}]", self.render_expr(subscript)?)
            }
            Node::StructRef { name, field, .. } => {
                let base = self.render_operand(name, ATOM, Side::Left)?;
                format!("{base}.{}", self.render_expr(field)?)
            }
            Node::Cast { expr, .. } => self.render_expr(expr)?,
            Node::ExprList { exprs } => match exprs.as_slice() {
                [single] => self.render_expr(single)?,
                _ => {
                    return Err(GenerateError::UnsupportedExpression(
                        "comma expression used as a value".into(),
                    ));
                }
            },
            Node::InitList { exprs } => self.render_init_list(exprs)?,
            Node::CompoundLiteral { init, .. } => self.render_expr(init)?,
            Node::Typename { .. } => self.type_hint(node),
            other => return Err(unexpected(other, "expression")),
        })
    }

    /// `[a, b]`, or a dict display when designators are present.
    fn render_init_list(&mut self, exprs: &[Node]) -> Result<String, GenerateError> {
        if !exprs.iter().any(|e| matches!(e, Node::NamedInitializer { .. })) {
            let items = exprs
                .iter()
                .map(|e| self.render_expr(e))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(format!("[{}]", items.join(", ")));
        }
        let mut entries = Vec::new();
        for (idx, expr) in exprs.iter().enumerate() {
            let entry = match expr {
                Node::NamedInitializer { name, expr } => {
                    let key = match name.first() {
                        Some(Node::Id { name }) => format!("'{name}'"),
                        Some(other) => self.render_expr(other)?,
                        None => idx.to_string(),
                    };
                    format!("{key}: {}", self.render_expr(expr)?)
                }
                other => format!("{idx}: {}", self.render_expr(other)?),
            };
            entries.push(entry);
        }
        Ok(format!("{{{}}}", entries.join(", ")))
    }
}

fn unexpected(node: &Node, context: &'static str) -> GenerateError {
    GenerateError::Unexpected {
        got: node.kind().into(),
        context,
    }
}

/// `(void)` parameter list.
fn is_void_params(params: &[Node]) -> bool {
    match params {
        [param @ Node::Typename { .. }] => {
            CGenerator::spelling(param).is_some_and(|spelling| spelling == "void")
        }
        _ => false,
    }
}
