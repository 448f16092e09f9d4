//! `@import` resolution and section/key text parsing.
//!
//! A skin file may pull in other files with `@import=<path>` lines, which can
//! appear anywhere in the file, one per line. Targets are taken as-is when
//! absolute, otherwise relative to the importing file's directory. Each
//! resolution tree tracks two sets of canonical paths: the active import
//! chain and every path seen so far. A target already on the chain is a
//! fatal [`CompileError::CircularImport`]; a target merely seen before
//! (two siblings importing the same shared file) is skipped, so a file is
//! read and merged at most once per tree.
//!
//! Merge order: imported sections land first, in declaration order, merged
//! per key; the importing file's own sections then override per key, never
//! wholesale.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use miette::NamedSource;

use crate::errors::CompileError;
use crate::log::debug;

/// Raw key/value pairs of one section, author casing intact.
pub type RawSection = IndexMap<String, String>;

/// Merged section map before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDocument {
    pub sections: IndexMap<String, RawSection>,
    pub base_dir: PathBuf,
}

/// Resolve a skin file and its whole import tree into one raw document.
pub fn merge_file(path: &Path) -> Result<RawDocument, CompileError> {
    let abs = canonical(path)?;
    let text = read(&abs)?;
    let base_dir = parent_dir(&abs);
    let mut chain = HashSet::new();
    chain.insert(abs.clone());
    let mut seen = chain.clone();
    let sections = resolve_text(
        &abs.display().to_string(),
        &text,
        &base_dir,
        &mut chain,
        &mut seen,
    )?;
    Ok(RawDocument { sections, base_dir })
}

/// Resolve in-memory skin text; imports are resolved relative to `base_dir`.
pub fn merge_source(text: &str, base_dir: &Path) -> Result<RawDocument, CompileError> {
    let mut chain = HashSet::new();
    let mut seen = HashSet::new();
    let sections = resolve_text("<source>", text, base_dir, &mut chain, &mut seen)?;
    Ok(RawDocument {
        sections,
        base_dir: base_dir.to_path_buf(),
    })
}

fn resolve_text(
    name: &str,
    text: &str,
    dir: &Path,
    chain: &mut HashSet<PathBuf>,
    seen: &mut HashSet<PathBuf>,
) -> Result<IndexMap<String, RawSection>, CompileError> {
    let mut merged: IndexMap<String, RawSection> = IndexMap::new();
    let mut stripped = String::with_capacity(text.len());
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if let Some(target) = import_target(content) {
            let target_path = if Path::new(target).is_absolute() {
                PathBuf::from(target)
            } else {
                dir.join(target)
            };
            let abs = canonical(&target_path)?;
            if chain.contains(&abs) {
                return Err(CompileError::CircularImport {
                    path: abs.display().to_string(),
                    src: NamedSource::new(name, text.to_string()),
                    span: (offset, content.len()).into(),
                });
            }
            if seen.insert(abs.clone()) {
                debug!("importing {}", abs.display());
                let child_text = read(&abs)?;
                let child_dir = parent_dir(&abs);
                chain.insert(abs.clone());
                let child = resolve_text(
                    &abs.display().to_string(),
                    &child_text,
                    &child_dir,
                    chain,
                    seen,
                )?;
                chain.remove(&abs);
                merge_into(&mut merged, child);
            } else {
                debug!("skipping re-import of {}", abs.display());
            }
            // The @import line itself is stripped from the section text.
        } else {
            stripped.push_str(line);
        }
        offset += line.len();
    }

    let own = parse_sections(&quote_bracket_values(&stripped));
    merge_into(&mut merged, own);
    Ok(merged)
}

/// Extract the target of an `@import=<path>` line, if this is one.
fn import_target(line: &str) -> Option<&str> {
    let t = line.trim_start();
    let head = t.get(..7)?;
    if !head.eq_ignore_ascii_case("@import") {
        return None;
    }
    let rest = t[7..].trim_start().strip_prefix('=')?;
    let value = rest.trim();
    if value.is_empty() { None } else { Some(value) }
}

/// Rewrite `key=[!...` lines so literal action-syntax values are not later
/// mistaken for section headers. The quoting is intentionally unvalidated:
/// a malformed value is wrapped as-is, silently.
fn quote_bracket_values(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        let eol = &line[content.len()..];
        match content.split_once('=') {
            Some((key, value)) if value.trim_start().starts_with("[!") => {
                out.push_str(key);
                out.push('=');
                out.push('"');
                out.push_str(value.trim());
                out.push('"');
                out.push_str(eol);
            }
            _ => out.push_str(line),
        }
    }
    out
}

/// Parse `[Section]` headers and `key=value` lines. `;` and `#` start
/// full-line comments; blank lines and keyless lines outside a section are
/// ignored. Values quoted with `"` are unquoted on read.
fn parse_sections(text: &str) -> IndexMap<String, RawSection> {
    let mut sections: IndexMap<String, RawSection> = IndexMap::new();
    let mut current: Option<String> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let Some(section) = current.as_ref() else {
            continue;
        };
        let key = key.trim().to_string();
        if key.is_empty() {
            continue;
        }
        let value = unquote(value.trim()).to_string();
        sections
            .entry(section.clone())
            .or_default()
            .insert(key, value);
    }
    sections
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Per-key merge: `src` overrides `dst` key by key; sections new to `dst`
/// are appended, preserving declaration order.
fn merge_into(dst: &mut IndexMap<String, RawSection>, src: IndexMap<String, RawSection>) {
    for (name, section) in src {
        match dst.get_mut(&name) {
            Some(existing) => {
                for (key, value) in section {
                    existing.insert(key, value);
                }
            }
            None => {
                dst.insert(name, section);
            }
        }
    }
}

fn canonical(path: &Path) -> Result<PathBuf, CompileError> {
    path.canonicalize().map_err(|source| CompileError::FileRead {
        path: path.display().to_string(),
        source,
    })
}

fn read(path: &Path) -> Result<String, CompileError> {
    fs::read_to_string(path).map_err(|source| CompileError::FileRead {
        path: path.display().to_string(),
        source,
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_keys_and_comments() {
        let text = "\
; comment
[Widget]
x=10
Y = 20
# another comment
[Second]
w=5
";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["Widget"]["x"], "10");
        assert_eq!(sections["Widget"]["Y"], "20");
        assert_eq!(sections["Second"]["w"], "5");
    }

    #[test]
    fn keyless_lines_outside_sections_are_ignored() {
        let text = "stray=1\n[A]\nx=2\n";
        let sections = parse_sections(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections["A"]["x"], "2");
    }

    #[test]
    fn duplicate_keys_last_wins_first_position_kept() {
        let text = "[A]\nx=1\ny=2\nx=3\n";
        let sections = parse_sections(text);
        let keys: Vec<_> = sections["A"].keys().cloned().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(sections["A"]["x"], "3");
    }

    #[test]
    fn import_target_matches_directive_lines() {
        assert_eq!(import_target("@import=common.ini"), Some("common.ini"));
        assert_eq!(import_target("  @Import = a/b.ini  "), Some("a/b.ini"));
        assert_eq!(import_target("@import="), None);
        assert_eq!(import_target("x=1"), None);
        assert_eq!(import_target("@importx=1"), None);
    }

    #[test]
    fn bracket_values_are_quoted_and_unquoted_round_trip() {
        let text = "[A]\nLeftMouseUpAction=[!Refresh]\n";
        let quoted = quote_bracket_values(text);
        assert!(quoted.contains("LeftMouseUpAction=\"[!Refresh]\""));
        let sections = parse_sections(&quoted);
        assert_eq!(sections["A"]["LeftMouseUpAction"], "[!Refresh]");
    }

    #[test]
    fn bracket_quoting_is_silent_on_malformed_values() {
        // No closing bracket; the value is wrapped as-is, no validation.
        let text = "[A]\naction=[!Broken\n";
        let quoted = quote_bracket_values(text);
        assert!(quoted.contains("action=\"[!Broken\""));
    }

    #[test]
    fn merge_prefers_later_source_per_key() {
        let mut dst = parse_sections("[A]\nx=1\ny=2\n");
        let src = parse_sections("[A]\nx=9\n[B]\nz=3\n");
        merge_into(&mut dst, src);
        assert_eq!(dst["A"]["x"], "9");
        assert_eq!(dst["A"]["y"], "2");
        assert_eq!(dst["B"]["z"], "3");
        let names: Vec<_> = dst.keys().cloned().collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
