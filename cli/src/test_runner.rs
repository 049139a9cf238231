use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use slate::Document;
use slate::html::{self, ClassificationOverrides, ClassificationTables};
use slate::plain::{self, SerializeOptions};

const HTML_SUFFIX: &str = ".test.html";
const TEXT_SUFFIX: &str = ".test.txt";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureConfig {
    /// Human-readable fixture description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected deserialized document, as a JSON string.
    #[serde(default)]
    pub expect_document: Option<String>,

    /// Expected result of serializing the deserialized document (trimmed comparison).
    #[serde(default)]
    pub expect_serialized: Option<String>,

    /// Expected serialization error: the error's Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Delimiter for plain text serialization. Defaults to "\n".
    #[serde(default)]
    pub delimiter: Option<String>,

    /// Classification table overrides for HTML fixtures.
    #[serde(default)]
    pub tables: Option<ClassificationOverrides>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixtureKind {
    Html,
    Text,
}

impl FixtureKind {
    fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(HTML_SUFFIX) {
            Some(FixtureKind::Html)
        } else if name.ends_with(TEXT_SUFFIX) {
            Some(FixtureKind::Text)
        } else {
            None
        }
    }
}

/// Split a fixture into its TOML frontmatter and the input that follows it.
fn split_frontmatter(content: &str) -> Result<(FixtureConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let body = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);

    let (toml_src, rest) = match body.strip_prefix("---") {
        Some(rest) => ("", rest),
        None => {
            let close = body
                .find("\n---")
                .ok_or("missing closing --- frontmatter delimiter")?;
            (body[..close].trim_end_matches('\r'), &body[close + 4..])
        }
    };
    let input = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: FixtureConfig =
        toml::from_str(toml_src).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, input))
}

pub enum Outcome {
    Pass,
    Fail(String),
}

pub struct FixtureResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: Outcome,
}

impl FixtureResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
        })
    }
}

fn run_fixture(path: &Path) -> FixtureResult {
    let (description, outcome) = match check_fixture(path) {
        Ok(description) => (description, Outcome::Pass),
        Err((description, reason)) => (description, Outcome::Fail(reason)),
    };
    FixtureResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Returns the fixture description, or the description and a failure reason.
fn check_fixture(path: &Path) -> Result<Option<String>, (Option<String>, String)> {
    let kind = FixtureKind::from_path(path)
        .ok_or_else(|| (None, format!("not a {} or {} file", HTML_SUFFIX, TEXT_SUFFIX)))?;

    let content = std::fs::read_to_string(path)
        .map_err(|e| (None, format!("cannot read file: {}", e)))?;

    let (config, input) =
        split_frontmatter(&content).map_err(|e| (None, format!("frontmatter error: {}", e)))?;
    let description = config.description.clone();
    let fail = |reason: String| (description.clone(), reason);

    // 1. Deserialize
    let document = match kind {
        FixtureKind::Html => {
            let tables = config
                .tables
                .clone()
                .map(ClassificationTables::from)
                .unwrap_or_default();
            html::deserialize_with(input, &tables)
        }
        FixtureKind::Text => {
            if config.tables.is_some() {
                return Err(fail("[tables] only applies to html fixtures".into()));
            }
            plain::deserialize(input)
        }
    };

    // 2. Compare the document
    if let Some(expected) = &config.expect_document {
        check_document(&document, expected).map_err(fail)?;
    }

    // 3. Serialize and compare
    let serialized = match kind {
        FixtureKind::Html => html::serialize(&document).map_err(|e| e.to_string()),
        FixtureKind::Text => {
            let options = config
                .delimiter
                .clone()
                .map(SerializeOptions::with_delimiter)
                .unwrap_or_default();
            Ok(plain::serialize(&document, &options))
        }
    };

    match (&config.expect_error, &config.expect_serialized, serialized) {
        (Some(expected), _, Err(actual)) if actual.contains(expected.as_str()) => Ok(description),
        (Some(expected), _, Err(actual)) => Err(fail(format!(
            "expected error containing \"{}\", got: {}",
            expected, actual
        ))),
        (Some(expected), _, Ok(_)) => Err(fail(format!(
            "expected error containing \"{}\", but serialization succeeded",
            expected
        ))),
        (None, _, Err(actual)) => Err(fail(format!("unexpected serialization error: {}", actual))),
        (None, Some(expected), Ok(actual)) if actual.trim() != expected.trim() => {
            Err(fail(format!(
                "serialized output mismatch\n  expected: {}\n  actual:   {}",
                expected.trim(),
                actual.trim()
            )))
        }
        (None, _, Ok(_)) => Ok(description),
    }
}

fn check_document(document: &Document, expected: &str) -> Result<(), String> {
    let expected: serde_json::Value = serde_json::from_str(expected)
        .map_err(|e| format!("expect_document is not valid JSON: {}", e))?;
    let actual = serde_json::to_value(document)
        .map_err(|e| format!("cannot encode document: {}", e))?;

    if actual == expected {
        return Ok(());
    }
    Err(format!(
        "document mismatch\n  expected: {}\n  actual:   {}",
        expected, actual
    ))
}

/// Discover fixtures grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_fixtures(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_fixtures(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_fixtures(&path, root, out);
        } else if FixtureKind::from_path(&path).is_some() {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given fixture path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no fixture files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} fixtures)", category_label(category), files.len());
    }
}

/// Keep the categories matching `requested` (a category or any of its subfolders).
fn filter_categories(
    all: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all;
    }

    let mut filtered = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let prefix = format!("{}/", request);
        let matching: Vec<&String> = all
            .keys()
            .filter(|category| *category == request || category.starts_with(&prefix))
            .collect();
        if matching.is_empty() {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                request,
                all.keys()
                    .map(|k| category_label(k))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        for category in matching {
            filtered.insert(category.clone(), all[category].clone());
        }
    }
    filtered
}

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

/// Run all fixtures under `path` (or a single file).
/// If `categories` is non-empty, only run fixtures in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let selected = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no fixture files found in {}", path.display());
            return 1;
        }
        filter_categories(all, categories)
    };

    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let show_headers = !path.is_file();
    let mut passed = 0usize;
    let mut failures: Vec<FixtureResult> = Vec::new();

    for (category, files) in &selected {
        if show_headers {
            eprintln!();
            eprintln!("{}", paint(category_label(category), "1", no_color));
        }

        for file in files {
            let result = run_fixture(file);
            match result.outcome {
                Outcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), result.label());
                }
                Outcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let Outcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", paint("ok", "32", no_color), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn assert_pass(path: &Path) {
        match run_fixture(path).outcome {
            Outcome::Pass => {}
            Outcome::Fail(reason) => panic!("{} failed: {}", path.display(), reason),
        }
    }

    fn failure_reason(path: &Path) -> String {
        match run_fixture(path).outcome {
            Outcome::Pass => panic!("{} unexpectedly passed", path.display()),
            Outcome::Fail(reason) => reason,
        }
    }

    #[test]
    fn frontmatter_is_split_from_input() {
        let (config, input) =
            split_frontmatter("---\ndescription = \"d\"\n---\n<p>x</p>\n").unwrap();
        assert_eq!(config.description.as_deref(), Some("d"));
        assert_eq!(input, "<p>x</p>\n");

        assert!(split_frontmatter("<p>x</p>").is_err());
        assert!(split_frontmatter("---\ndescription = \"d\"\n").is_err());
        assert!(split_frontmatter("---\nunknown = 1\n---\n").is_err());
    }

    #[test]
    fn html_fixture_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "marks.test.html",
            "---\n\
             expect_document = '''[{\"type\": \"paragraph\", \"children\": [{\"text\": \"a\", \"strong\": true}]}]'''\n\
             expect_serialized = \"<p>a</p>\"\n\
             ---\n\
             <p><strong>a</strong></p>\n",
        );
        assert_pass(&path);
    }

    #[test]
    fn html_fixture_with_tables_and_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "quote.test.html",
            "---\n\
             expect_error = \"no tag mapping for node type `quote`\"\n\
             [tables]\n\
             block_elements = [\"p\"]\n\
             [tables.elements]\n\
             blockquote = \"quote\"\n\
             ---\n\
             <blockquote>x</blockquote>\n",
        );
        assert_pass(&path);
    }

    #[test]
    fn text_fixture_with_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "paragraphs.test.txt",
            "---\n\
             delimiter = \"\\n\\n\"\n\
             expect_serialized = \"one\\n\\ntwo\"\n\
             ---\n\
             one\n\n\ntwo\n",
        );
        assert_pass(&path);
    }

    #[test]
    fn mismatches_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "wrong.test.html",
            "---\nexpect_serialized = \"<p>b</p>\"\n---\n<p>a</p>\n",
        );
        assert!(failure_reason(&path).contains("serialized output mismatch"));

        let path = write_fixture(
            dir.path(),
            "tables.test.txt",
            "---\n[tables]\ninline_elements = []\n---\ntext\n",
        );
        assert!(failure_reason(&path).contains("only applies to html"));
    }

    #[test]
    fn categories_follow_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = "---\n---\n<p>a</p>\n";
        write_fixture(dir.path(), "root.test.html", fixture);
        write_fixture(dir.path(), "lists/ul.test.html", fixture);
        write_fixture(dir.path(), "lists/nested/ol.test.html", fixture);
        write_fixture(dir.path(), "notes.md", "ignored");

        let all = discover_categorized(dir.path());
        let names: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["", "lists", "lists/nested"]);

        let filtered = filter_categories(all, &["lists".to_string()]);
        assert_eq!(filtered.len(), 2);

        assert_eq!(run_tests(dir.path(), true, &[]), 0);
    }
}
