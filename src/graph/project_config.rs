// src/graph/project_config.rs
//! Loaders for the three optional project configuration files.
//!
//! Each loader is independent and failure-tolerant: a missing or malformed
//! file returns `None`, which disables that one resolution strategy and
//! nothing else. These are the only filesystem reads in the engine, performed
//! once at graph-build start.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::paths;

/// Path alias configuration from `tsconfig.json` / `jsconfig.json`.
///
/// Patterns may end in `*`; targets are kept project-relative. A `BTreeMap`
/// keeps alias iteration deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct AliasConfig {
    pub base_url: Option<String>,
    pub paths: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct RawTsConfig {
    #[serde(rename = "compilerOptions")]
    compiler_options: Option<CompilerOptions>,
}

#[derive(Deserialize)]
struct CompilerOptions {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    paths: Option<BTreeMap<String, Vec<String>>>,
}

impl AliasConfig {
    /// Attempts tsconfig.json then jsconfig.json under `root`.
    #[must_use]
    pub fn load(root: &Path) -> Option<Self> {
        ["tsconfig.json", "jsconfig.json"]
            .iter()
            .find_map(|name| Self::parse_file(&root.join(name)))
    }

    fn parse_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let parsed = Self::parse(&content);
        if parsed.is_none() {
            debug!(path = %path.display(), "alias config unreadable; alias resolution disabled");
        }
        parsed
    }

    /// Parses comment-tolerant tsconfig JSON.
    #[must_use]
    pub fn parse(content: &str) -> Option<Self> {
        let clean = strip_json_comments(content);
        let raw: RawTsConfig = serde_json::from_str(&clean).ok()?;
        let opts = raw.compiler_options?;

        let base_url = opts.base_url.map(|b| paths::normalize(&b));
        let aliases = opts.paths.unwrap_or_default();
        let paths = aliases
            .into_iter()
            .map(|(pattern, targets)| {
                let targets = targets.iter().map(|t| paths::normalize(t)).collect();
                (pattern, targets)
            })
            .collect();

        Some(Self { base_url, paths })
    }
}

/// Workspace package map: package name to project-relative directory.
///
/// Parsed minimally from `pnpm-workspace.yaml` glob lines or the
/// `package.json` `workspaces` array — deliberately not full YAML support.
/// Globs expand against the known-path set at build time.
#[derive(Debug, Clone, Default)]
pub struct WorkspacePackages {
    pub globs: Vec<String>,
}

impl WorkspacePackages {
    #[must_use]
    pub fn load(root: &Path) -> Option<Self> {
        Self::load_pnpm(root).or_else(|| Self::load_package_json(root))
    }

    fn load_pnpm(root: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(root.join("pnpm-workspace.yaml")).ok()?;
        let parsed = Self::parse_pnpm(&content);
        if parsed.is_none() {
            debug!("pnpm-workspace.yaml has no usable package globs");
        }
        parsed
    }

    /// Accepts only the common list shape:
    /// `packages:` followed by `- "packages/*"` entries.
    #[must_use]
    pub fn parse_pnpm(content: &str) -> Option<Self> {
        let mut globs = Vec::new();
        let mut in_packages = false;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with('#') || trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with("packages:") {
                in_packages = true;
                continue;
            }
            if in_packages {
                if let Some(item) = trimmed.strip_prefix('-') {
                    let glob = item.trim().trim_matches(|c| c == '"' || c == '\'');
                    if !glob.is_empty() && !glob.starts_with('!') {
                        globs.push(paths::normalize(glob));
                    }
                } else if !trimmed.starts_with('-') {
                    // A new top-level key ends the list.
                    in_packages = false;
                }
            }
        }

        if globs.is_empty() {
            None
        } else {
            Some(Self { globs })
        }
    }

    fn load_package_json(root: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(root.join("package.json")).ok()?;
        Self::parse_package_json(&content)
    }

    #[must_use]
    pub fn parse_package_json(content: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct RawPackageJson {
            workspaces: Option<Vec<String>>,
        }
        let raw: RawPackageJson = serde_json::from_str(content).ok()?;
        let globs: Vec<String> = raw
            .workspaces?
            .iter()
            .map(|g| paths::normalize(g))
            .filter(|g| !g.is_empty())
            .collect();
        if globs.is_empty() {
            None
        } else {
            Some(Self { globs })
        }
    }

    /// Expands the globs against the known file set, yielding
    /// `(package name, package directory)` pairs in first-seen order.
    /// Package name defaults to the directory basename.
    #[must_use]
    pub fn expand(&self, known_paths: &[String]) -> Vec<(String, String)> {
        let mut packages: Vec<(String, String)> = Vec::new();

        for glob in &self.globs {
            let prefix = match glob.strip_suffix("/*") {
                Some(p) => p,
                None => glob.as_str(),
            };
            let wildcard = glob.ends_with("/*");

            for path in known_paths {
                let dir = match_package_dir(path, prefix, wildcard);
                let Some(dir) = dir else { continue };
                let name = paths::basename(&dir).to_string();
                if !packages.iter().any(|(_, d)| d == &dir) {
                    packages.push((name, dir));
                }
            }
        }

        packages
    }
}

fn match_package_dir(path: &str, prefix: &str, wildcard: bool) -> Option<String> {
    if wildcard {
        let rest = path.strip_prefix(prefix)?.strip_prefix('/')?;
        let first = rest.split('/').next()?;
        // Direct children of the prefix only; a bare file is not a package.
        if rest.contains('/') {
            return Some(format!("{prefix}/{first}"));
        }
        None
    } else if paths::is_under(path, prefix) {
        Some(prefix.to_string())
    } else {
        None
    }
}

/// Go module prefix from the first `module` directive of `go.mod`.
#[derive(Debug, Clone)]
pub struct GoModule {
    pub prefix: String,
}

impl GoModule {
    #[must_use]
    pub fn load(root: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(root.join("go.mod")).ok()?;
        Self::parse(&content)
    }

    #[must_use]
    pub fn parse(content: &str) -> Option<Self> {
        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("module") {
                let prefix = rest.trim().trim_matches('"');
                if !prefix.is_empty() && rest.starts_with(char::is_whitespace) {
                    return Some(Self { prefix: prefix.to_string() });
                }
            }
        }
        None
    }
}

/// Drops `//` and `/* */` comments so tsconfig-flavored JSON parses.
/// String literals are copied through untouched, escapes included.
fn strip_json_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push(c);
                while let Some(sc) = chars.next() {
                    out.push(sc);
                    match sc {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '/' => match chars.peek() {
                Some('/') => {
                    // Line comment runs to the newline; keep the newline.
                    while chars.peek().is_some_and(|&lc| lc != '\n') {
                        chars.next();
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut star = false;
                    for bc in chars.by_ref() {
                        if star && bc == '/' {
                            break;
                        }
                        star = bc == '*';
                    }
                }
                _ => out.push('/'),
            },
            _ => out.push(c),
        }
    }
    out
}
