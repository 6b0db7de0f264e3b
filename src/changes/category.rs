//! Path-based file categorization.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Semantic category of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Source code.
    Code,
    /// Configuration and build files.
    Config,
    /// Documentation and prose.
    Docs,
    /// Test sources, detected by name or directory.
    Tests,
    /// Stylesheets.
    Styles,
    /// Markup and view templates.
    Templates,
    /// Data files.
    Data,
    /// Raster and vector images.
    Images,
    /// Anything not matched by a rule.
    Other,
}

impl Category {
    /// Every category, in the order used for summary tables.
    pub const ALL: [Category; 9] = [
        Category::Code,
        Category::Config,
        Category::Docs,
        Category::Tests,
        Category::Styles,
        Category::Templates,
        Category::Data,
        Category::Images,
        Category::Other,
    ];

    /// Display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Code => "Code",
            Category::Config => "Config",
            Category::Docs => "Docs",
            Category::Tests => "Tests",
            Category::Styles => "Styles",
            Category::Templates => "Templates",
            Category::Data => "Data",
            Category::Images => "Images",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Extensions and exact file names that map to one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category assigned when this rule matches.
    pub category: Category,
    /// Lowercase extensions without the leading dot.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Exact file names, compared case-insensitively.
    #[serde(default)]
    pub file_names: Vec<String>,
}

/// Ordered classification tables.
///
/// Test patterns are checked first, then `rules` in order. The first rule
/// that matches wins, so overlapping extensions resolve to the earlier rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTables {
    /// Substrings of the file name that mark a test file (e.g. `.test.`).
    pub test_infixes: Vec<String>,
    /// Path segments that mark everything beneath them as tests.
    pub test_segments: Vec<String>,
    /// Extension rules, checked in order.
    pub rules: Vec<CategoryRule>,
}

fn rule(category: Category, extensions: &[&str], file_names: &[&str]) -> CategoryRule {
    CategoryRule {
        category,
        extensions: extensions.iter().map(ToString::to_string).collect(),
        file_names: file_names.iter().map(ToString::to_string).collect(),
    }
}

impl Default for CategoryTables {
    fn default() -> Self {
        Self {
            test_infixes: vec![".test.".to_string(), ".spec.".to_string()],
            test_segments: ["test", "tests", "spec", "specs", "__tests__"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            rules: vec![
                rule(
                    Category::Code,
                    &[
                        "rs", "js", "jsx", "mjs", "cjs", "ts", "tsx", "py", "rb", "java", "kt",
                        "kts", "scala", "go", "c", "h", "cc", "cpp", "hpp", "cs", "fs", "php",
                        "swift", "m", "mm", "dart", "lua", "pl", "r", "sh", "bash", "zsh", "ps1",
                        "psm1", "groovy", "clj", "ex", "exs", "erl", "hs", "ml", "zig",
                    ],
                    &[],
                ),
                rule(
                    Category::Config,
                    &[
                        "json", "yaml", "yml", "toml", "ini", "cfg", "conf", "env", "xml",
                        "properties", "gradle", "csproj", "sln", "lock", "editorconfig",
                    ],
                    &[
                        "Dockerfile",
                        "Makefile",
                        "Jenkinsfile",
                        ".gitignore",
                        ".gitattributes",
                        ".dockerignore",
                        ".env",
                        ".npmrc",
                    ],
                ),
                rule(Category::Docs, &["md", "markdown", "rst", "txt", "adoc", "org"], &[
                    "LICENSE", "README", "CHANGELOG", "AUTHORS",
                ]),
                rule(Category::Styles, &["css", "scss", "sass", "less", "styl"], &[]),
                rule(
                    Category::Templates,
                    &[
                        "html", "htm", "hbs", "handlebars", "ejs", "pug", "jinja", "j2", "twig",
                        "erb", "mustache", "liquid", "vue", "svelte", "cshtml", "razor",
                    ],
                    &[],
                ),
                rule(
                    Category::Data,
                    &["json", "jsonl", "ndjson", "csv", "tsv", "xml", "sql", "parquet", "avro"],
                    &[],
                ),
                rule(
                    Category::Images,
                    &["png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "bmp", "tif", "tiff"],
                    &[],
                ),
            ],
        }
    }
}

impl CategoryTables {
    /// Classifies a root-relative path. Pure function of `path` and `self`.
    #[must_use]
    pub fn categorize(&self, path: &str) -> Category {
        let normalized = path.replace('\\', "/");
        let file_name = normalized.rsplit('/').next().unwrap_or(&normalized);
        let lower_name = file_name.to_ascii_lowercase();

        if self.is_test_path(&normalized, &lower_name) {
            return Category::Tests;
        }

        let extension = Path::new(&lower_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string);

        for rule in &self.rules {
            let by_extension = extension
                .as_deref()
                .is_some_and(|ext| rule.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
            let by_name = rule.file_names.iter().any(|n| n.eq_ignore_ascii_case(file_name));
            if by_extension || by_name {
                return rule.category;
            }
        }

        Category::Other
    }

    fn is_test_path(&self, normalized: &str, lower_name: &str) -> bool {
        if self.test_infixes.iter().any(|infix| lower_name.contains(&infix.to_ascii_lowercase()))
        {
            return true;
        }
        normalized
            .split('/')
            .any(|segment| self.test_segments.iter().any(|s| s.eq_ignore_ascii_case(segment)))
    }
}

/// Classifies `path` using the built-in tables.
#[must_use]
pub fn categorize(path: &str) -> Category {
    static DEFAULT: OnceLock<CategoryTables> = OnceLock::new();
    DEFAULT.get_or_init(CategoryTables::default).categorize(path)
}
