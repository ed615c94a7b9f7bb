//! Per-language tree-sitter grammars and node tables.

use crate::models::SymbolKind;
use tree_sitter::Node;

/// Languages the tree-sitter provider understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
}

/// How a syntax node participates in the symbol tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeRole {
    /// Measurable function-like construct.
    Callable(SymbolKind),
    /// Class-like scope that only groups other symbols.
    Container,
}

impl Language {
    /// Resolve a language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "rs" => Some(Language::Rust),
            "py" | "pyi" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "c++" | "hpp" | "hh" | "hxx" | "h++" => Some(Language::Cpp),
            "cs" => Some(Language::CSharp),
            _ => None,
        }
    }

    /// All supported file extensions
    pub fn supported_extensions() -> &'static [&'static str] {
        &[
            "rs", // Rust
            "py", "pyi", // Python
            "js", "jsx", "mjs", "cjs", // JavaScript
            "ts", "mts", "cts", "tsx", // TypeScript
            "go",   // Go
            "java", // Java
            "c", "h", // C
            "cpp", "cc", "cxx", "c++", "hpp", "hh", "hxx", "h++", // C++
            "cs", // C#
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::Go => "Go",
            Language::Java => "Java",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
        }
    }

    pub(crate) fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::C => tree_sitter_c::LANGUAGE.into(),
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }

    fn is_js_family(self) -> bool {
        matches!(
            self,
            Language::JavaScript | Language::TypeScript | Language::Tsx
        )
    }

    /// Classify a node, ignoring where it sits in the tree.
    pub(crate) fn node_role(self, node: &Node) -> Option<NodeRole> {
        use NodeRole::{Callable, Container};
        use SymbolKind::{Constructor, Function, Method};

        let kind = node.kind();
        match self {
            Language::Rust => match kind {
                "function_item" | "function_signature_item" => Some(Callable(Function)),
                "impl_item" | "trait_item" | "mod_item" => Some(Container),
                _ => None,
            },
            Language::Python => match kind {
                "function_definition" => Some(Callable(Function)),
                "class_definition" => Some(Container),
                _ => None,
            },
            lang if lang.is_js_family() => match kind {
                "function_declaration" | "generator_function_declaration" => {
                    Some(Callable(Function))
                }
                "method_definition" | "method_signature" | "abstract_method_signature" => {
                    Some(Callable(Method))
                }
                "variable_declarator" if is_function_value(node) => Some(Callable(Function)),
                // `handle = () => {}` class fields and `{ run: function () {} }`
                "field_definition" | "public_field_definition" | "pair"
                    if is_function_value(node) =>
                {
                    Some(Callable(Method))
                }
                "class_declaration"
                | "class"
                | "abstract_class_declaration"
                | "interface_declaration"
                | "internal_module"
                | "module" => Some(Container),
                _ => None,
            },
            Language::Go => match kind {
                "function_declaration" => Some(Callable(Function)),
                "method_declaration" => Some(Callable(Method)),
                _ => None,
            },
            Language::Java => match kind {
                "method_declaration" => Some(Callable(Method)),
                "constructor_declaration" | "compact_constructor_declaration" => {
                    Some(Callable(Constructor))
                }
                "class_declaration"
                | "interface_declaration"
                | "enum_declaration"
                | "record_declaration" => Some(Container),
                _ => None,
            },
            Language::C => match kind {
                "function_definition" => Some(Callable(Function)),
                _ => None,
            },
            Language::Cpp => match kind {
                "function_definition" => Some(Callable(Function)),
                "class_specifier" | "struct_specifier"
                    if node.child_by_field_name("body").is_some() =>
                {
                    Some(Container)
                }
                "namespace_definition" => Some(Container),
                _ => None,
            },
            Language::CSharp => match kind {
                "method_declaration" | "operator_declaration" | "destructor_declaration" => {
                    Some(Callable(Method))
                }
                "constructor_declaration" => Some(Callable(Constructor)),
                "local_function_statement" => Some(Callable(Function)),
                "class_declaration"
                | "struct_declaration"
                | "interface_declaration"
                | "record_declaration"
                | "namespace_declaration"
                | "file_scoped_namespace_declaration" => Some(Container),
                _ => None,
            },
            _ => None,
        }
    }

    /// Refine a callable's kind using its name and enclosing symbol.
    ///
    /// Grammars without a dedicated method node report methods as plain
    /// functions; being directly inside a container makes them methods.
    pub(crate) fn refine_kind(
        self,
        base: SymbolKind,
        name: &str,
        enclosing: Option<(NodeRole, &str)>,
    ) -> SymbolKind {
        let in_container = matches!(enclosing, Some((NodeRole::Container, _)));
        match self {
            Language::Python if in_container && name == "__init__" => SymbolKind::Constructor,
            Language::Rust | Language::Python if in_container => SymbolKind::Method,
            lang if lang.is_js_family() && base == SymbolKind::Method && name == "constructor" => {
                SymbolKind::Constructor
            }
            Language::Cpp => {
                let class_name = enclosing
                    .filter(|_| in_container)
                    .map(|(_, n)| n);
                if is_cpp_constructor(name, class_name) {
                    SymbolKind::Constructor
                } else if in_container {
                    SymbolKind::Method
                } else {
                    base
                }
            }
            _ => base,
        }
    }

    /// Node carrying the symbol's name.
    pub(crate) fn name_node<'t>(self, node: &Node<'t>) -> Option<Node<'t>> {
        match (self, node.kind()) {
            (Language::Rust, "impl_item") => node.child_by_field_name("type"),
            (Language::C | Language::Cpp, "function_definition") => {
                innermost_declarator(node.child_by_field_name("declarator")?)
            }
            (lang, "field_definition") if lang.is_js_family() => {
                node.child_by_field_name("property")
            }
            (lang, "pair") if lang.is_js_family() => node.child_by_field_name("key"),
            _ => node.child_by_field_name("name"),
        }
    }

    /// Node holding the body; everything before it is signature.
    pub(crate) fn body_node<'t>(self, node: &Node<'t>) -> Option<Node<'t>> {
        if self.is_js_family()
            && matches!(
                node.kind(),
                "variable_declarator" | "field_definition" | "public_field_definition" | "pair"
            )
        {
            return node
                .child_by_field_name("value")?
                .child_by_field_name("body");
        }
        node.child_by_field_name("body")
    }
}

/// `const f = () => {}`, `let g = function () {}` and the same shapes as
/// class fields or object properties
fn is_function_value(node: &Node) -> bool {
    node.child_by_field_name("value").is_some_and(|value| {
        matches!(
            value.kind(),
            "arrow_function" | "function_expression" | "function" | "generator_function"
        )
    })
}

/// Follow nested declarators (`*f`, `f(...)`, `&f`) down to the name.
fn innermost_declarator(node: Node) -> Option<Node> {
    let mut current = node;
    loop {
        if let Some(inner) = current.child_by_field_name("declarator") {
            current = inner;
            continue;
        }
        // reference_declarator has no field name for its inner declarator
        if current.kind().ends_with("_declarator") {
            let mut cursor = current.walk();
            let last = current.named_children(&mut cursor).last()?;
            current = last;
            continue;
        }
        return Some(current);
    }
}

/// `Foo` inside `class Foo`, or an out-of-line `Foo::Foo`.
fn is_cpp_constructor(name: &str, class_name: Option<&str>) -> bool {
    if let Some(class_name) = class_name {
        return name == class_name;
    }
    let mut segments = name.rsplit("::");
    match (segments.next(), segments.next()) {
        (Some(last), Some(owner)) => last == owner,
        _ => false,
    }
}
