//! Foreign-to-host type spelling tables.
//!
//! A mapping is a host spelling plus the import it needs, if any.

/// Host type spelling and the `(module, symbol)` it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostType {
    pub name: &'static str,
    pub import: Option<(&'static str, &'static str)>,
}

const fn builtin(name: &'static str) -> HostType {
    HostType { name, import: None }
}

const fn typing(name: &'static str) -> HostType {
    HostType {
        name,
        import: Some(("typing", name)),
    }
}

/// Map a C scalar spelling (`unsigned long`, `uint32_t`, ...).
///
/// Unknown spellings (typedef names) pass through unchanged.
pub fn c_scalar(spelling: &str) -> Option<HostType> {
    let host = match spelling {
        "void" => builtin("None"),
        "_Bool" | "bool" => builtin("bool"),
        "char" | "signed char" => builtin("str"),
        "float" | "double" | "long double" => builtin("float"),
        "int" | "signed" | "signed int" | "unsigned" | "unsigned int" | "short" | "short int"
        | "unsigned short" | "unsigned short int" | "long" | "long int" | "unsigned long"
        | "unsigned long int" | "long long" | "long long int" | "unsigned long long"
        | "unsigned long long int" | "unsigned char" | "int8_t" | "int16_t" | "int32_t"
        | "int64_t" | "uint8_t" | "uint16_t" | "uint32_t" | "uint64_t" | "size_t"
        | "ssize_t" | "Py_ssize_t" | "intptr_t" | "uintptr_t" | "ptrdiff_t" => builtin("int"),
        _ => return None,
    };
    Some(host)
}

/// Map a pointer or array whose element has this raw C spelling.
///
/// Returns `None` when the generic `List[T]` shape applies.
pub fn c_pointer(element: &str) -> Option<HostType> {
    let host = match element {
        "char" | "signed char" => builtin("str"),
        "uint8_t" | "unsigned char" => builtin("bytes"),
        "void" => typing("Any"),
        _ => return None,
    };
    Some(host)
}

/// TypeScript keyword types.
#[cfg(feature = "dts")]
pub fn ts_keyword(keyword: crate::ast::dts::Keyword) -> HostType {
    use crate::ast::dts::Keyword;
    match keyword {
        Keyword::Void | Keyword::Null | Keyword::Undefined => builtin("None"),
        Keyword::Any | Keyword::Unknown => typing("Any"),
        Keyword::Boolean => builtin("bool"),
        Keyword::Number | Keyword::BigInt => builtin("int"),
        Keyword::String => builtin("str"),
        Keyword::Symbol | Keyword::Object => builtin("object"),
        Keyword::Never => typing("NoReturn"),
        Keyword::True => builtin("True"),
        Keyword::False => builtin("False"),
    }
}

/// Well-known TypeScript generic references.
pub fn ts_reference(name: &str) -> Option<HostType> {
    let host = match name {
        "Promise" | "PromiseLike" => typing("Awaitable"),
        "Map" | "Record" | "WeakMap" => typing("Dict"),
        "ReadonlyMap" => typing("Mapping"),
        "Set" | "WeakSet" => typing("Set"),
        "Array" => typing("List"),
        "ReadonlyArray" => typing("Sequence"),
        "Iterable" | "IterableIterator" | "AsyncIterable" => typing("Iterable"),
        "Iterator" => typing("Iterator"),
        "This" | "this" => typing("Self"),
        "Function" => typing("Callable"),
        "Object" => builtin("object"),
        _ => return None,
    };
    Some(host)
}
