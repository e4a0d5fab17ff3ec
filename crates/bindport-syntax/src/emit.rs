//! Output assembly shared by both engines.
//!
//! Traversal writes into an [`Emitter`]: terminated lines plus one open
//! fragment, at the current indentation depth. Lines that can only be decided
//! after a scope is fully visited (overload decorators) are attached to an
//! [`Anchor`] and materialized by [`Emitter::finish`], so nothing is ever
//! inserted into the middle of the line list while traversal is running.

use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeMap;

/// One indentation level.
pub const INDENT: &str = "    ";

/// Stable position of an emitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Anchor(usize);

/// Buffered line writer with indentation tracking.
#[derive(Debug, Default)]
pub struct Emitter {
    lines: Vec<String>,
    fragment: Option<String>,
    depth: usize,
    inserts: BTreeMap<Anchor, Vec<String>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.depth > 0, "dedent below zero");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Emit a complete line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.flush();
        let mut line = INDENT.repeat(self.depth);
        line.push_str(text.as_ref());
        self.lines.push(line);
    }

    /// Append to the open fragment, opening it at the current depth.
    pub fn push(&mut self, text: impl AsRef<str>) {
        let depth = self.depth;
        self.fragment
            .get_or_insert_with(|| INDENT.repeat(depth))
            .push_str(text.as_ref());
    }

    pub fn blank(&mut self, count: usize) {
        self.flush();
        self.lines
            .extend(std::iter::repeat_with(String::new).take(count));
    }

    /// Terminate the open fragment.
    pub fn flush(&mut self) {
        if let Some(fragment) = self.fragment.take() {
            self.lines.push(fragment);
        }
    }

    /// Number of lines emitted so far, counting an open fragment.
    pub fn len(&self) -> usize {
        self.lines.len() + usize::from(self.fragment.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Anchor for the next line to be emitted.
    pub fn anchor(&mut self) -> Anchor {
        self.flush();
        Anchor(self.lines.len())
    }

    /// Schedule a line, at the current depth, to precede the anchored line.
    pub fn insert_before(&mut self, anchor: Anchor, text: impl AsRef<str>) {
        let mut line = INDENT.repeat(self.depth);
        line.push_str(text.as_ref());
        self.inserts.entry(anchor).or_default().push(line);
    }

    /// Materialize scheduled insertions and return the final lines.
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        if self.inserts.is_empty() {
            return self.lines;
        }
        let mut out = Vec::with_capacity(self.lines.len() + self.inserts.len());
        let mut inserts = std::mem::take(&mut self.inserts);
        for (idx, line) in self.lines.into_iter().enumerate() {
            if let Some(before) = inserts.remove(&Anchor(idx)) {
                out.extend(before);
            }
            out.push(line);
        }
        // Anchors taken at the very end precede nothing; keep them last.
        out.extend(inserts.into_values().flatten());
        out
    }
}

/// Deferred `from module import symbol` table, in first-use order.
#[derive(Debug, Default, Clone)]
pub struct Imports {
    modules: IndexMap<String, IndexSet<String>>,
}

impl Imports {
    pub fn add(&mut self, module: &str, symbol: &str) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.modules
            .iter()
            .map(|(module, symbols)| {
                let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
                format!("from {module} import {}", symbols.join(", "))
            })
            .collect()
    }
}

/// Final module layout: header and imports, then blocks separated by two
/// blank lines.
#[derive(Debug, Default)]
pub struct Document {
    pub header: Vec<String>,
    pub imports: Imports,
    pub blocks: Vec<Vec<String>>,
}

impl Document {
    pub fn render(self) -> String {
        let mut head = self.header;
        head.extend(self.imports.lines());

        let mut sections: Vec<Vec<String>> = Vec::new();
        if !head.is_empty() {
            sections.push(head);
        }
        sections.extend(self.blocks.into_iter().map(trim_blank).filter(|b| !b.is_empty()));

        let mut out = String::new();
        for (idx, section) in sections.iter().enumerate() {
            if idx > 0 {
                out.push_str("\n\n");
            }
            for line in section {
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
        out
    }
}

fn trim_blank(mut lines: Vec<String>) -> Vec<String> {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    lines.split_off(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indentation_and_fragments() {
        let mut out = Emitter::new();
        out.line("class A:");
        out.indent();
        out.push("def f(self");
        out.push("): ...");
        out.dedent();
        out.line("x = 1");
        assert_eq!(out.depth(), 0);
        assert_eq!(out.finish(), vec!["class A:", "    def f(self): ...", "x = 1"]);
    }

    #[test]
    fn anchored_inserts_do_not_shift_each_other() {
        let mut out = Emitter::new();
        out.indent();
        let first = out.anchor();
        out.line("def f(self): ...");
        let second = out.anchor();
        out.line("def f(self, x): ...");
        out.insert_before(second, "@f.register");
        out.insert_before(first, "@singledispatchmethod");
        assert_eq!(
            out.finish(),
            vec![
                "    @singledispatchmethod",
                "    def f(self): ...",
                "    @f.register",
                "    def f(self, x): ...",
            ]
        );
    }

    #[test]
    fn imports_keep_first_use_order() {
        let mut imports = Imports::default();
        imports.add("typing", "Optional");
        imports.add("functools", "singledispatchmethod");
        imports.add("typing", "List");
        imports.add("typing", "Optional");
        assert_eq!(
            imports.lines(),
            vec![
                "from typing import Optional, List",
                "from functools import singledispatchmethod",
            ]
        );
    }

    #[test]
    fn document_separates_blocks() {
        let mut imports = Imports::default();
        imports.add("enum", "IntEnum");
        let doc = Document {
            header: vec!["import env".into()],
            imports,
            blocks: vec![vec!["".into(), "x = 1".into(), "".into()], vec!["y = 2".into()]],
        };
        assert_eq!(
            doc.render(),
            "import env\nfrom enum import IntEnum\n\n\nx = 1\n\n\ny = 2\n"
        );
    }
}
