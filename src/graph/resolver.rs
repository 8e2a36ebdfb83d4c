// src/graph/resolver.rs
//! Resolves one raw import string to a known project file.
//!
//! Strategies run in a fixed order: language-specific conventions first
//! (dotted Python relatives, Go module paths), then generic relatives, the
//! alias map, workspace packages, and the legacy `@/` fallback. Anything
//! unmatched is an external dependency and produces no edge.
//!
//! Resolution is a pure function over the supplied context — "probing" a
//! candidate path means membership in the known-path set, never a disk read.

use std::collections::HashSet;

use super::project_config::AliasConfig;
use crate::paths;

/// Extension/index suffixes probed for a candidate path, in order.
const EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".py", ".go"];
const INDEX_FILES: &[&str] =
    &["index.ts", "index.tsx", "index.js", "index.jsx", "index.py", "index.go"];

/// The set of all file paths known to this run, in input order.
#[derive(Debug, Default)]
pub struct KnownFiles {
    order: Vec<String>,
    set: HashSet<String>,
}

impl KnownFiles {
    pub fn new(paths: impl IntoIterator<Item = String>) -> Self {
        let mut known = Self::default();
        for path in paths {
            if known.set.insert(path.clone()) {
                known.order.push(path);
            }
        }
        known
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.set.contains(path)
    }

    /// Paths in first-seen order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.order.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }
}

/// Everything a resolution needs, assembled once per graph build.
#[derive(Debug)]
pub struct ResolverContext<'a> {
    pub known: &'a KnownFiles,
    pub aliases: Option<&'a AliasConfig>,
    /// `(package name, package directory)` pairs from the workspace map.
    pub packages: &'a [(String, String)],
    pub go_prefix: Option<&'a str>,
}

/// Maps `import` (as written in `source`) to a known file path, or `None`
/// for an external dependency.
#[must_use]
pub fn resolve(
    ctx: &ResolverContext,
    source: &str,
    language: Option<&str>,
    import: &str,
) -> Option<String> {
    let lang = language_of(source, language);

    if is_python_relative(import) {
        return resolve_python_relative(ctx, source, import);
    }
    if lang == "go" && import.contains('/') && !import.starts_with('.') {
        if let Some(found) = resolve_go(ctx, import) {
            return Some(found);
        }
    }
    if is_generic_relative(import) {
        return resolve_relative(ctx, source, import);
    }
    if let Some(aliases) = ctx.aliases {
        if let Some(found) = resolve_alias(ctx, aliases, import) {
            return Some(found);
        }
    }
    if let Some(found) = resolve_package(ctx, import) {
        return Some(found);
    }
    if ctx.aliases.is_none() {
        if let Some(rest) = import.strip_prefix("@/") {
            return probe(ctx.known, &paths::join("src", rest));
        }
    }

    None
}

fn language_of<'a>(source: &str, language: Option<&'a str>) -> String {
    if let Some(lang) = language {
        return lang.to_ascii_lowercase();
    }
    match paths::extension(source).as_str() {
        "go" => "go".to_string(),
        "py" => "python".to_string(),
        ext => ext.to_string(),
    }
}

/// Dotted relatives (`.utils`, `..models.user`) are the Python convention;
/// anything with a slash is a generic relative instead.
fn is_python_relative(import: &str) -> bool {
    import.starts_with('.') && !import.contains('/')
}

fn is_generic_relative(import: &str) -> bool {
    import.starts_with("./") || import.starts_with("../") || import.starts_with('/')
}

fn resolve_python_relative(ctx: &ResolverContext, source: &str, import: &str) -> Option<String> {
    let dots = import.chars().take_while(|c| *c == '.').count();
    let rest = &import[dots..];

    // One dot is the current package; each extra dot walks up one directory.
    let mut dir = paths::dirname(source).to_string();
    for _ in 1..dots {
        dir = paths::dirname(&dir).to_string();
    }

    if rest.is_empty() {
        return probe_python(ctx.known, &dir);
    }
    let module_path = rest.replace('.', "/");
    probe_python(ctx.known, &paths::join(&dir, &module_path))
}

fn probe_python(known: &KnownFiles, base: &str) -> Option<String> {
    let file = format!("{base}.py");
    if known.contains(&file) {
        return Some(file);
    }
    let init = paths::join(base, "__init__.py");
    if known.contains(&init) {
        return Some(init);
    }
    None
}

fn resolve_go(ctx: &ResolverContext, import: &str) -> Option<String> {
    if let Some(prefix) = ctx.go_prefix {
        let suffix = if import == prefix {
            ""
        } else {
            import.strip_prefix(prefix)?.strip_prefix('/')?
        };
        return first_go_file_in_dir(ctx.known, suffix);
    }
    // No module declaration: match the import's path suffix against any
    // known go file's directory suffix.
    ctx.known
        .iter()
        .find(|path| {
            paths::extension(path) == "go" && dir_suffix_matches(paths::dirname(path), import)
        })
        .cloned()
}

fn first_go_file_in_dir(known: &KnownFiles, dir: &str) -> Option<String> {
    known
        .iter()
        .find(|path| paths::extension(path) == "go" && paths::dirname(path) == dir)
        .or_else(|| {
            known.iter().find(|path| {
                paths::extension(path) == "go"
                    && paths::dirname(path).ends_with(&format!("/{dir}"))
            })
        })
        .cloned()
}

fn dir_suffix_matches(dir: &str, import: &str) -> bool {
    dir == import
        || import.ends_with(&format!("/{dir}"))
        || (!dir.is_empty() && dir.ends_with(&format!("/{import}")))
}

fn resolve_relative(ctx: &ResolverContext, source: &str, import: &str) -> Option<String> {
    let base = if let Some(rooted) = import.strip_prefix('/') {
        paths::normalize(rooted)
    } else {
        paths::join(paths::dirname(source), import)
    };
    probe(ctx.known, &base)
}

fn resolve_alias(ctx: &ResolverContext, aliases: &AliasConfig, import: &str) -> Option<String> {
    for (pattern, targets) in &aliases.paths {
        let Some(matched) = match_alias_pattern(pattern, import) else {
            continue;
        };
        for target in targets {
            let expanded = expand_alias_target(target, matched);
            let candidate = match &aliases.base_url {
                Some(base) => paths::join(base, &expanded),
                None => paths::normalize(&expanded),
            };
            if let Some(found) = probe(ctx.known, &candidate) {
                return Some(found);
            }
        }
    }

    // baseUrl alone also resolves bare imports directly under it.
    let base = aliases.base_url.as_ref()?;
    probe(ctx.known, &paths::join(base, import))
}

/// `@app/*` prefix-matches and yields the remainder; exact patterns must
/// equal the import and yield `""`.
fn match_alias_pattern<'a>(pattern: &str, import: &'a str) -> Option<&'a str> {
    match pattern.strip_suffix('*') {
        Some(prefix) => import.strip_prefix(prefix),
        None if pattern == import => Some(""),
        None => None,
    }
}

fn expand_alias_target(target: &str, matched: &str) -> String {
    if target.contains('*') {
        target.replacen('*', matched, 1)
    } else {
        target.to_string()
    }
}

fn resolve_package(ctx: &ResolverContext, import: &str) -> Option<String> {
    for (name, dir) in ctx.packages {
        let Some(rest) = package_subpath(name, import) else {
            continue;
        };
        let candidates = if rest.is_empty() {
            [paths::join(dir, "src"), dir.clone()]
        } else {
            [
                paths::join(dir, &format!("src/{rest}")),
                paths::join(dir, rest),
            ]
        };
        for candidate in &candidates {
            if let Some(found) = probe(ctx.known, candidate) {
                return Some(found);
            }
        }
    }
    None
}

/// Matches `import` against a package `name`, tolerating an npm scope
/// (`@acme/ui` matches package `ui`). Returns the sub-path, `""` for the
/// package root, or `None` when the import is for a different package.
fn package_subpath<'a>(name: &str, import: &'a str) -> Option<&'a str> {
    let unscoped = if import.starts_with('@') {
        import.splitn(2, '/').nth(1)?
    } else {
        import
    };

    if unscoped == name {
        return Some("");
    }
    unscoped.strip_prefix(&format!("{name}/"))
}

/// Probes `base` against the known set: raw path, each extension, then each
/// `index.*` variant.
fn probe(known: &KnownFiles, base: &str) -> Option<String> {
    if known.contains(base) {
        return Some(base.to_string());
    }
    for ext in EXTENSIONS {
        let candidate = format!("{base}{ext}");
        if known.contains(&candidate) {
            return Some(candidate);
        }
    }
    for index in INDEX_FILES {
        let candidate = paths::join(base, index);
        if known.contains(&candidate) {
            return Some(candidate);
        }
    }
    None
}
