//! `Extend` clause splicing.
//!
//! A shape definition may contain `Extend Ref1,Ref2` clauses; each reference
//! names another property on the owning section whose own `|`-delimited
//! clauses are spliced in at that position. Resolution is exactly one level
//! deep: an `Extend` clause inside spliced-in text is passed through as a
//! literal clause, not resolved again. That matches the behavior existing
//! skins depend on, so it is preserved rather than deepened.

use crate::diag::{Diagnostics, Warning};
use crate::document::Section;

/// Splice `Extend` clauses in `def` from properties of `owner`.
///
/// Missing references warn and are skipped; the remaining clauses still
/// produce a usable definition.
pub fn resolve(
    def: &str,
    owner: &Section,
    owner_name: &str,
    diags: &mut Diagnostics,
) -> String {
    let mut clauses: Vec<String> = Vec::new();
    for clause in def.split('|') {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        match extend_references(clause) {
            Some(refs) => {
                for reference in refs {
                    match owner.get_ci(reference) {
                        Some(value) => {
                            clauses.extend(
                                value
                                    .split('|')
                                    .map(str::trim)
                                    .filter(|c| !c.is_empty())
                                    .map(str::to_string),
                            );
                        }
                        None => diags.warn(Warning::MissingExtendReference {
                            section: owner_name.to_string(),
                            reference: reference.to_string(),
                        }),
                    }
                }
            }
            None => clauses.push(clause.to_string()),
        }
    }
    clauses.join(" | ")
}

/// Enumerate the owner-section keys referenced by any `shapeN` property, as
/// actually stored (resolved case). These are deleted from the element's own
/// property set after compilation so they are not re-emitted as ordinary
/// properties; they are never deleted from the document globally.
pub fn collect_extend_references(owner: &Section) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for (key, value) in owner.iter() {
        if !is_shape_key(key) {
            continue;
        }
        for clause in value.split('|') {
            let Some(refs) = extend_references(clause.trim()) else {
                continue;
            };
            for reference in refs {
                if let Some(stored) = owner.resolve_key_ci(reference) {
                    if !keys.iter().any(|k| k == stored) {
                        keys.push(stored.to_string());
                    }
                }
            }
        }
    }
    keys
}

/// Keys matching `shape`, `shape0`, `shape1`, ...
pub fn is_shape_key(key: &str) -> bool {
    let Some(suffix) = key.strip_prefix("shape") else {
        return false;
    };
    suffix.is_empty() || suffix.bytes().all(|b| b.is_ascii_digit())
}

/// If `clause` is an `Extend` clause (case-insensitive keyword), return its
/// comma-separated references.
fn extend_references(clause: &str) -> Option<Vec<&str>> {
    let head = clause.get(..6)?;
    if !head.eq_ignore_ascii_case("extend") {
        return None;
    }
    let rest = &clause[6..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(
        rest.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(pairs: &[(&str, &str)]) -> Section {
        let mut s = Section::new();
        for (k, v) in pairs {
            s.set(*k, *v);
        }
        s
    }

    #[test]
    fn splices_referenced_clauses_in_place() {
        let owner = owner(&[("MyStyle", "fill 255,0,0 | strokewidth 2")]);
        let mut diags = Diagnostics::new();
        let out = resolve(
            "rectangle 0,0,10,10 | Extend MyStyle | stroke 0,0,0",
            &owner,
            "A",
            &mut diags,
        );
        assert_eq!(
            out,
            "rectangle 0,0,10,10 | fill 255,0,0 | strokewidth 2 | stroke 0,0,0"
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn multiple_references_splice_in_order() {
        let owner = owner(&[("A", "fill 1,2,3"), ("B", "strokewidth 4")]);
        let mut diags = Diagnostics::new();
        let out = resolve("rectangle 0,0,1,1 | Extend A,B", &owner, "S", &mut diags);
        assert_eq!(out, "rectangle 0,0,1,1 | fill 1,2,3 | strokewidth 4");
    }

    #[test]
    fn missing_reference_warns_and_continues() {
        let owner = owner(&[]);
        let mut diags = Diagnostics::new();
        let out = resolve("rectangle 0,0,1,1 | Extend Nope", &owner, "S", &mut diags);
        assert_eq!(out, "rectangle 0,0,1,1");
        assert_eq!(
            diags.warnings(),
            &[Warning::MissingExtendReference {
                section: "S".into(),
                reference: "Nope".into(),
            }]
        );
    }

    #[test]
    fn resolution_is_single_level() {
        // The nested Extend clause inside Outer's value stays literal.
        let owner = owner(&[
            ("Outer", "fill 255,0,0 | Extend Inner"),
            ("Inner", "strokewidth 9"),
        ]);
        let mut diags = Diagnostics::new();
        let out = resolve("rectangle 0,0,1,1 | Extend Outer", &owner, "S", &mut diags);
        assert_eq!(out, "rectangle 0,0,1,1 | fill 255,0,0 | Extend Inner");
    }

    #[test]
    fn lookup_priority_is_exact_then_lower_then_scan() {
        let owner = owner(&[("STYLE", "fill 0,0,0")]);
        let mut diags = Diagnostics::new();
        let out = resolve("rectangle 0,0,1,1 | Extend Style", &owner, "S", &mut diags);
        assert_eq!(out, "rectangle 0,0,1,1 | fill 0,0,0");
    }

    #[test]
    fn extend_keyword_is_case_insensitive() {
        let owner = owner(&[("s", "fill 1,1,1")]);
        let mut diags = Diagnostics::new();
        let out = resolve("rectangle 0,0,1,1 | EXTEND s", &owner, "S", &mut diags);
        assert_eq!(out, "rectangle 0,0,1,1 | fill 1,1,1");
    }

    #[test]
    fn collects_referenced_owner_keys_for_deletion() {
        let owner = owner(&[
            ("shape", "rectangle 0,0,1,1 | Extend Border"),
            ("shape1", "rectangle 2,2,1,1 | Extend Border,Fill"),
            ("Border", "strokewidth 2"),
            ("Fill", "fill 1,2,3"),
            ("Unrelated", "fill 9,9,9"),
        ]);
        let refs = collect_extend_references(&owner);
        assert_eq!(refs, vec!["Border".to_string(), "Fill".to_string()]);
    }

    #[test]
    fn shape_key_pattern() {
        assert!(is_shape_key("shape"));
        assert!(is_shape_key("shape0"));
        assert!(is_shape_key("shape12"));
        assert!(!is_shape_key("shapes"));
        assert!(!is_shape_key("shapex"));
        assert!(!is_shape_key("x"));
    }
}
