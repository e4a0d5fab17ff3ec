//! Registry for translators.

use crate::traits::Translator;
use std::sync::{OnceLock, RwLock};

/// Global translator registry.
static TRANSLATORS: RwLock<Vec<&'static dyn Translator>> = RwLock::new(Vec::new());
static TRANSLATORS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom translator.
///
/// Later registrations do not shadow earlier ones with the same grammar.
pub fn register_translator(translator: &'static dyn Translator) {
    TRANSLATORS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .push(translator);
}

fn init_translators() {
    TRANSLATORS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "c")]
        {
            register_translator(&crate::output::c::C_TRANSLATOR);
        }
        #[cfg(feature = "dts")]
        {
            register_translator(&crate::output::dts::DTS_TRANSLATOR);
        }
    });
}

/// Get a translator by grammar name.
pub fn translator_for_grammar(grammar: &str) -> Option<&'static dyn Translator> {
    translators().into_iter().find(|t| t.grammar() == grammar)
}

/// Get the first translator whose grammar the JSON document looks like.
pub fn detect_translator(root: &serde_json::Value) -> Option<&'static dyn Translator> {
    translators().into_iter().find(|t| t.accepts(root))
}

/// Get all registered translators.
pub fn translators() -> Vec<&'static dyn Translator> {
    init_translators();
    TRANSLATORS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    #[cfg(feature = "c")]
    fn test_c_lookup() {
        let translator = translator_for_grammar("c").expect("c translator");
        assert_eq!(translator.grammar(), "c");

        let detected = detect_translator(&json!({ "_nodetype": "FileAST", "ext": [] }))
            .expect("detected");
        assert_eq!(detected.grammar(), "c");
    }

    #[test]
    #[cfg(feature = "dts")]
    fn test_dts_lookup() {
        let translator = translator_for_grammar("dts").expect("dts translator");
        assert_eq!(translator.grammar(), "dts");

        let detected =
            detect_translator(&json!({ "kind": "SourceFile", "statements": [] })).expect("detected");
        assert_eq!(detected.grammar(), "dts");
    }

    #[test]
    fn test_unknown_grammar() {
        assert!(translator_for_grammar("lua").is_none());
        assert!(detect_translator(&json!({ "type": "Program" })).is_none());
    }

    #[test]
    #[cfg(all(feature = "c", feature = "dts"))]
    fn test_translate_via_registry() {
        let options = crate::Options::default();
        let root = json!({ "kind": "SourceFile", "statements": [] });
        let translation = detect_translator(&root)
            .unwrap()
            .translate(&root, &options)
            .unwrap();
        assert_eq!(translation.text, "");
        assert!(translation.diagnostics.is_empty());
    }
}
