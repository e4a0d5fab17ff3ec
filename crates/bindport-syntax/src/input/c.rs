//! pycparser JSON reader.

use crate::ast::c::Node;
use crate::traits::ReadError;
use serde::Deserialize;

/// Load a pycparser `FileAST` dump.
///
/// Unknown `_nodetype`s are rejected: the engine has no way to render them.
pub fn read_c(root: &serde_json::Value) -> Result<Node, ReadError> {
    let node = Node::deserialize(root)?;
    match node {
        Node::FileAst { .. } => Ok(node),
        other => Err(ReadError::UnexpectedNode {
            expected: "FileAST".into(),
            got: other.kind().into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_file_ast() {
        let root = json!({ "_nodetype": "FileAST", "ext": [] });
        assert_eq!(read_c(&root).unwrap(), Node::FileAst { ext: vec![] });
    }

    #[test]
    fn rejects_non_root() {
        let root = json!({ "_nodetype": "ID", "name": "x" });
        let err = read_c(&root).unwrap_err();
        assert!(matches!(err, ReadError::UnexpectedNode { ref got, .. } if got == "ID"));
    }

    #[test]
    fn rejects_unknown_kind() {
        let root = json!({ "_nodetype": "FileAST", "ext": [{ "_nodetype": "Alignas" }] });
        assert!(matches!(read_c(&root), Err(ReadError::Json(_))));
    }
}
