//! Single-pass structural extraction for PHP source files.
//!
//! Each line runs through a set of small, independent classifiers; an
//! accumulator folds their facts into a [`SymbolTable`]. The accumulator owns
//! the ordering policy (first namespace wins, first class-like header wins,
//! `use` after a header is a trait). No tokenizing: multi-line declarations,
//! comments and strings can produce false positives or misses.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const NAMESPACE_SEPARATOR: char = '\\';

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*namespace\s+([A-Za-z_\\][\w\\]*)\s*[;{]").expect("namespace regex")
});
// Stops at the first `;` or `{`, except a `\{...}` group import list.
static USE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*use\s+([^;{]+?(?:\\\{[^}]*\})?)\s*[;{]").expect("use regex")
});
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:abstract|final|readonly)\s+)*(class|interface|trait|enum)\s+([A-Za-z_]\w*)")
        .expect("class regex")
});
static EXTENDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bextends\s+(\\?[A-Za-z_][\w\\]*)").expect("extends regex"));
static IMPLEMENTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bimplements\s+([\w\\][\w\\\s,]*?)\s*(?:\{|$)").expect("implements regex")
});
static CONST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:final\s+)?(?:(public|protected|private)\s+)?(?:final\s+)?const\s+(?:[?\w\\|]+\s+)?([A-Za-z_]\w*)\s*=",
    )
    .expect("const regex")
});
static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*((?:(?:static|readonly|final)\s+)*)(public|protected|private)\s+((?:(?:static|readonly)\s+)*)(?:([?\\\w|&()]+)\s+)?\$([A-Za-z_]\w*)",
    )
    .expect("property regex")
});
static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*((?:(?:abstract|final|static)\s+)*)(public|protected|private)\s+((?:(?:abstract|final|static)\s+)*)function\s+&?([A-Za-z_]\w*)\s*\(([^)]*)",
    )
    .expect("method regex")
});
static RETURN_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\)\s*:\s*(\??[\w\\|&]+)").expect("return type regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "class" => Some(Self::Class),
            "interface" => Some(Self::Interface),
            "trait" => Some(Self::Trait),
            "enum" => Some(Self::Enum),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    fn parse(s: &str) -> Self {
        match s {
            "protected" => Self::Protected,
            "private" => Self::Private,
            _ => Self::Public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub statement: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    pub visibility: Visibility,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    #[serde(rename = "type")]
    pub declared_type: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub params: Option<String>,
    pub return_type: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader {
    pub kind: ClassKind,
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
}

/// Everything the analyzer extracts from one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolTable {
    pub namespace: Option<String>,
    pub class_name: Option<String>,
    pub class_kind: Option<ClassKind>,
    pub full_class_name: Option<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub traits: Vec<String>,
    pub imports: Vec<Import>,
    pub constants: Vec<Constant>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
}

// ── Classifiers: line in, optional fact out ─────────────────────────────────

pub fn classify_namespace(line: &str) -> Option<String> {
    NAMESPACE_RE
        .captures(line)
        .map(|c| c[1].trim_end_matches(NAMESPACE_SEPARATOR).to_string())
}

pub fn classify_use(line: &str) -> Option<String> {
    USE_RE.captures(line).map(|c| c[1].trim().to_string())
}

pub fn classify_class_header(line: &str) -> Option<ClassHeader> {
    let caps = CLASS_RE.captures(line)?;
    let kind = ClassKind::parse(&caps[1])?;
    let extends = EXTENDS_RE.captures(line).map(|c| c[1].to_string());
    let implements = IMPLEMENTS_RE
        .captures(line)
        .map(|c| split_list(&c[1]))
        .unwrap_or_default();

    Some(ClassHeader {
        kind,
        name: caps[2].to_string(),
        extends,
        implements,
    })
}

pub fn classify_constant(line: &str, line_no: usize) -> Option<Constant> {
    let caps = CONST_RE.captures(line)?;
    Some(Constant {
        name: caps[2].to_string(),
        visibility: caps
            .get(1)
            .map(|m| Visibility::parse(m.as_str()))
            .unwrap_or(Visibility::Public),
        line: line_no,
    })
}

pub fn classify_property(line: &str, line_no: usize) -> Option<Property> {
    let caps = PROPERTY_RE.captures(line)?;
    let is_static = [caps.get(1), caps.get(3)]
        .iter()
        .flatten()
        .any(|m| m.as_str().split_whitespace().any(|w| w == "static"));
    Some(Property {
        name: caps[5].to_string(),
        visibility: Visibility::parse(&caps[2]),
        is_static,
        declared_type: caps.get(4).map(|m| m.as_str().to_string()),
        line: line_no,
    })
}

pub fn classify_method(line: &str, line_no: usize) -> Option<Method> {
    let caps = METHOD_RE.captures(line)?;
    let is_static = [caps.get(1), caps.get(3)]
        .iter()
        .flatten()
        .any(|m| m.as_str().split_whitespace().any(|w| w == "static"));
    let params = caps[5].trim();
    let return_type = RETURN_TYPE_RE.captures(line).map(|c| c[1].to_string());

    Some(Method {
        name: caps[4].to_string(),
        visibility: Visibility::parse(&caps[2]),
        is_static,
        params: (!params.is_empty()).then(|| params.to_string()),
        return_type,
        line: line_no,
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

// ── Accumulator ──────────────────────────────────────────────────────────────

impl SymbolTable {
    fn has_class(&self) -> bool {
        self.class_name.is_some()
    }

    /// Apply every classifier to one line.
    fn absorb(mut self, line_no: usize, line: &str) -> Self {
        if self.namespace.is_none() {
            self.namespace = classify_namespace(line);
        }

        if let Some(statement) = classify_use(line) {
            if self.has_class() && !statement.contains(NAMESPACE_SEPARATOR) {
                self.traits.extend(split_list(&statement));
            } else {
                self.imports.push(Import {
                    statement,
                    line: line_no,
                });
            }
        }

        if !self.has_class() {
            if let Some(header) = classify_class_header(line) {
                self.class_name = Some(header.name);
                self.class_kind = Some(header.kind);
                self.extends = header.extends;
                self.implements = header.implements;
            }
        }

        if let Some(constant) = classify_constant(line, line_no) {
            self.constants.push(constant);
        }
        if let Some(property) = classify_property(line, line_no) {
            self.properties.push(property);
        }
        if let Some(method) = classify_method(line, line_no) {
            self.methods.push(method);
        }

        self
    }

    fn finish(mut self) -> Self {
        if let (Some(ns), Some(name)) = (&self.namespace, &self.class_name) {
            self.full_class_name = Some(format!("{ns}{NAMESPACE_SEPARATOR}{name}"));
        }
        self
    }
}

/// Extract the symbol table of one file's text.
pub fn analyze(text: &str) -> SymbolTable {
    text.lines()
        .enumerate()
        .fold(SymbolTable::default(), |table, (idx, line)| {
            table.absorb(idx + 1, line)
        })
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_MODEL: &str = r#"<?php

namespace App\Models;

use Illuminate\Database\Eloquent\Model;
use Illuminate\Contracts\Auth\Authenticatable;
use Illuminate\Notifications\Notifiable;

class User extends Model implements Authenticatable
{
    use HasFactory, Notifiable;

    const STATUS_ACTIVE = 'active';
    private const TABLE = 'users';

    protected $fillable = ['name', 'email'];
    public static ?int $count = 0;
    private readonly string|int $token;

    public function __construct(array $attributes = [])
    {
        parent::__construct($attributes);
    }

    public static function findByEmail(string $email): ?self
    {
        return static::where('email', $email)->first();
    }

    protected function casts(): array
    {
        return [];
    }
}
"#;

    #[test]
    fn test_namespace_and_class_header() {
        let table = analyze("<?php\nnamespace App\\Models;\n\nclass User extends Model implements Authenticatable\n{\n}\n");
        assert_eq!(table.namespace.as_deref(), Some("App\\Models"));
        assert_eq!(table.class_name.as_deref(), Some("User"));
        assert_eq!(table.class_kind, Some(ClassKind::Class));
        assert_eq!(table.extends.as_deref(), Some("Model"));
        assert_eq!(table.implements, vec!["Authenticatable".to_string()]);
        assert_eq!(table.full_class_name.as_deref(), Some("App\\Models\\User"));
    }

    #[test]
    fn test_full_model() {
        let table = analyze(USER_MODEL);

        let imports: Vec<_> = table.imports.iter().map(|i| i.statement.as_str()).collect();
        assert_eq!(
            imports,
            vec![
                "Illuminate\\Database\\Eloquent\\Model",
                "Illuminate\\Contracts\\Auth\\Authenticatable",
                "Illuminate\\Notifications\\Notifiable",
            ]
        );
        assert_eq!(table.imports[0].line, 5);
        assert_eq!(table.traits, vec!["HasFactory".to_string(), "Notifiable".to_string()]);

        assert_eq!(table.constants.len(), 2);
        assert_eq!(table.constants[0].name, "STATUS_ACTIVE");
        assert_eq!(table.constants[0].visibility, Visibility::Public);
        assert_eq!(table.constants[1].visibility, Visibility::Private);

        let props: Vec<_> = table.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, vec!["fillable", "count", "token"]);
        assert_eq!(table.properties[0].declared_type, None);
        assert!(table.properties[1].is_static);
        assert_eq!(table.properties[1].declared_type.as_deref(), Some("?int"));
        assert_eq!(table.properties[2].declared_type.as_deref(), Some("string|int"));
        assert!(!table.properties[2].is_static);

        let methods: Vec<_> = table.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["__construct", "findByEmail", "casts"]);
        let find = &table.methods[1];
        assert!(find.is_static);
        assert_eq!(find.params.as_deref(), Some("string $email"));
        assert_eq!(find.return_type.as_deref(), Some("?self"));
        assert_eq!(table.methods[2].params, None);
        assert_eq!(table.methods[2].visibility, Visibility::Protected);
        assert_eq!(table.methods[0].return_type, None);
    }

    #[test]
    fn test_first_declaration_wins() {
        let text = "<?php\nnamespace A;\nnamespace B;\ninterface First extends Base\n{\n}\nclass Second extends Other\n{\n}\n";
        let table = analyze(text);
        assert_eq!(table.namespace.as_deref(), Some("A"));
        assert_eq!(table.class_name.as_deref(), Some("First"));
        assert_eq!(table.class_kind, Some(ClassKind::Interface));
        assert_eq!(table.extends.as_deref(), Some("Base"));
        assert_eq!(table.full_class_name.as_deref(), Some("A\\First"));
    }

    #[test]
    fn test_use_with_separator_after_class_is_import() {
        let text = "<?php\ntrait Loggable\n{\n    use \\App\\Concerns\\Timestamps;\n    use Macroable;\n}\n";
        let table = analyze(text);
        assert_eq!(table.class_kind, Some(ClassKind::Trait));
        assert_eq!(table.traits, vec!["Macroable".to_string()]);
        assert_eq!(table.imports.len(), 1);
        assert_eq!(table.imports[0].line, 4);
    }

    #[test]
    fn test_inline_conflict_block_keeps_trait_name() {
        let table = analyze("class A\n{\n    use Loggable { log as protected; }\n}");
        assert_eq!(table.traits, vec!["Loggable".to_string()]);
        assert!(table.imports.is_empty());
    }

    #[test]
    fn test_group_import_is_one_statement() {
        assert_eq!(
            classify_use("use App\\Models\\{User, Post};").as_deref(),
            Some("App\\Models\\{User, Post}")
        );
        assert_eq!(classify_use("    use HasEvents {").as_deref(), Some("HasEvents"));
    }

    #[test]
    fn test_use_before_class_without_separator_is_import() {
        let table = analyze("<?php\nuse Exception;\nclass Foo {}\n");
        assert_eq!(table.imports.len(), 1);
        assert!(table.traits.is_empty());
    }

    #[test]
    fn test_no_class_means_no_full_name() {
        let table = analyze("<?php\nnamespace App;\n\nfunction helper() {}\n");
        assert_eq!(table.namespace.as_deref(), Some("App"));
        assert!(table.class_name.is_none());
        assert!(table.full_class_name.is_none());
    }

    #[test]
    fn test_class_header_modifiers_and_enum() {
        let header = classify_class_header("final readonly class Money implements JsonSerializable, Stringable {").unwrap();
        assert_eq!(header.name, "Money");
        assert_eq!(header.implements, vec!["JsonSerializable".to_string(), "Stringable".to_string()]);

        let header = classify_class_header("abstract class Base").unwrap();
        assert_eq!(header.extends, None);
        assert!(header.implements.is_empty());

        let header = classify_class_header("enum Status: string implements HasLabel").unwrap();
        assert_eq!(header.kind, ClassKind::Enum);
        assert_eq!(header.implements, vec!["HasLabel".to_string()]);

        assert!(classify_class_header("$class = new Foo();").is_none());
    }

    #[test]
    fn test_method_classifier_variants() {
        let m = classify_method("    abstract protected function handle(Request $request, Closure $next): Response;", 3).unwrap();
        assert_eq!(m.name, "handle");
        assert_eq!(m.visibility, Visibility::Protected);
        assert!(!m.is_static);
        assert_eq!(m.params.as_deref(), Some("Request $request, Closure $next"));
        assert_eq!(m.return_type.as_deref(), Some("Response"));
        assert_eq!(m.line, 3);

        let m = classify_method("    final public static function &instance(", 9).unwrap();
        assert!(m.is_static);
        assert_eq!(m.params, None);

        assert!(classify_method("    function legacy() {}", 1).is_none());
    }

    #[test]
    fn test_property_classifier_ignores_methods() {
        assert!(classify_property("    public function name(): string", 1).is_none());
        let p = classify_property("    protected static array $booted = [];", 2).unwrap();
        assert!(p.is_static);
        assert_eq!(p.declared_type.as_deref(), Some("array"));
        assert_eq!(p.visibility, Visibility::Protected);
    }

    #[test]
    fn test_static_before_visibility() {
        let table = analyze(
            "class Cache\n{\n    static public $cache;\n    static public function make()\n    {\n    }\n}",
        );
        assert_eq!(table.properties.len(), 1);
        assert_eq!(table.properties[0].name, "cache");
        assert!(table.properties[0].is_static);
        assert_eq!(table.properties[0].visibility, Visibility::Public);
        assert_eq!(table.methods[0].name, "make");
    }

    #[test]
    fn test_typed_constant() {
        let c = classify_constant("    protected const string PREFIX = 'x';", 4).unwrap();
        assert_eq!(c.name, "PREFIX");
        assert_eq!(c.visibility, Visibility::Protected);
    }
}
