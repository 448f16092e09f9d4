//! Key canonicalization and style inheritance.
//!
//! Every key is lowercased, a fixed canonical table folds alternate
//! spellings (`width` to `w`, `height` to `h`), and the legacy uppercase
//! aliases for `x,y,w,h,style` are mirrored wherever only the lowercase is
//! present, so consumers can keep using either spelling. A section may then
//! inherit geometry from one other section via `style=<Name>`; donor
//! sections are deleted from the document afterwards.
//!
//! Normalization is idempotent: running it twice leaves the document as the
//! first run left it.

use crate::diag::{Diagnostics, Warning};
use crate::document::{ConfigDocument, Section};
use crate::log::debug;

/// Alternate spellings folded into one canonical key.
const CANONICAL_KEYS: &[(&str, &str)] = &[("width", "w"), ("height", "h")];

/// Lowercase keys mirrored into a legacy uppercase alias.
const MIRRORED_KEYS: &[(&str, &str)] = &[
    ("x", "X"),
    ("y", "Y"),
    ("w", "W"),
    ("h", "H"),
    ("style", "Style"),
];

/// Geometry keys a style donor contributes to its consumers.
const STYLE_KEYS: &[&str] = &["x", "y", "w", "h", "width", "height"];

/// Normalize every section in place: canonical keys, case mirrors, style
/// inheritance, donor deletion.
pub fn normalize(doc: &mut ConfigDocument, diags: &mut Diagnostics) {
    for (_, section) in doc.sections.iter_mut() {
        normalize_section(section);
    }
    inherit_styles(doc, diags);
}

fn normalize_section(section: &mut Section) {
    let entries: Vec<(String, String)> = section
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let mut rebuilt = Section::new();
    rebuilt.shapes = section.shapes.take();
    for (key, value) in entries {
        let lower = key.to_lowercase();
        let canon = canonical_key(&lower);
        // Action keys keep their lowercase original spelling alongside the
        // canonical one, for later action-attribute emission.
        if canon != lower && lower.contains("action") {
            rebuilt.set(lower.clone(), value.clone());
        }
        rebuilt.set(canon, value);
    }

    for (lower, upper) in MIRRORED_KEYS {
        if rebuilt.contains(lower) && !rebuilt.contains(upper) {
            let value = rebuilt.get(lower).unwrap_or_default().to_string();
            rebuilt.set(*upper, value);
        }
    }

    *section = rebuilt;
}

fn canonical_key(lower: &str) -> String {
    CANONICAL_KEYS
        .iter()
        .find(|(alt, _)| *alt == lower)
        .map(|(_, canon)| canon.to_string())
        .unwrap_or_else(|| lower.to_string())
}

fn inherit_styles(doc: &mut ConfigDocument, diags: &mut Diagnostics) {
    let names: Vec<String> = doc.sections.keys().cloned().collect();
    let mut donors: Vec<String> = Vec::new();

    for name in &names {
        let Some(reference) = doc
            .section(name)
            .and_then(|s| s.get("style"))
            .map(str::to_string)
        else {
            continue;
        };
        let Some(donor_name) = doc.resolve_section_name(&reference) else {
            diags.warn(Warning::MissingStyleReference {
                section: name.clone(),
                reference,
            });
            continue;
        };
        if donor_name == *name {
            continue;
        }

        // Snapshot the donor's geometry before mutating the consumer.
        let donor = doc.section(&donor_name).expect("donor resolved above");
        let inherited: Vec<(String, String)> = STYLE_KEYS
            .iter()
            .filter_map(|key| donor.get_ci(key).map(|v| (key.to_string(), v.to_string())))
            .collect();

        let consumer = doc
            .sections
            .get_mut(name)
            .expect("consumer name from snapshot");
        for (key, value) in inherited {
            let canon = canonical_key(&key);
            if consumer.contains_ci(&canon) {
                continue;
            }
            debug!("[{name}] inherits {canon}={value} from {donor_name}");
            consumer.set(canon.clone(), value.clone());
            if let Some((_, upper)) = MIRRORED_KEYS.iter().find(|(l, _)| *l == canon) {
                consumer.set(*upper, value);
            }
        }

        if !donors.contains(&donor_name) {
            donors.push(donor_name);
        }
    }

    for donor in donors {
        doc.remove_section(&donor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Section;

    fn doc_from(sections: &[(&str, &[(&str, &str)])]) -> ConfigDocument {
        let mut doc = ConfigDocument::default();
        for (name, pairs) in sections {
            let mut s = Section::new();
            for (k, v) in *pairs {
                s.set(*k, *v);
            }
            doc.sections.insert(name.to_string(), s);
        }
        doc
    }

    #[test]
    fn keys_are_lowercased_and_canonicalized() {
        let mut doc = doc_from(&[("A", &[("Width", "30"), ("HEIGHT", "40"), ("Fill", "red")])]);
        let mut diags = Diagnostics::new();
        normalize(&mut doc, &mut diags);

        let a = doc.section("A").unwrap();
        assert_eq!(a.get("w"), Some("30"));
        assert_eq!(a.get("h"), Some("40"));
        assert_eq!(a.get("fill"), Some("red"));
        assert_eq!(a.get("Width"), None);
    }

    #[test]
    fn uppercase_mirrors_are_added() {
        let mut doc = doc_from(&[("A", &[("x", "1"), ("y", "2"), ("width", "3")])]);
        let mut diags = Diagnostics::new();
        normalize(&mut doc, &mut diags);

        let a = doc.section("A").unwrap();
        assert_eq!(a.get("X"), Some("1"));
        assert_eq!(a.get("Y"), Some("2"));
        assert_eq!(a.get("W"), Some("3"));
        assert_eq!(a.get("H"), None);
    }

    #[test]
    fn style_inheritance_fills_only_missing_geometry() {
        let mut doc = doc_from(&[
            ("Base", &[("x", "100"), ("y", "200"), ("w", "50"), ("h", "60")]),
            ("Clock", &[("style", "Base"), ("x", "5")]),
        ]);
        let mut diags = Diagnostics::new();
        normalize(&mut doc, &mut diags);

        let clock = doc.section("Clock").unwrap();
        assert_eq!(clock.get("x"), Some("5"));
        assert_eq!(clock.get("y"), Some("200"));
        assert_eq!(clock.get("w"), Some("50"));
        assert_eq!(clock.get("h"), Some("60"));
        assert_eq!(clock.get("Y"), Some("200"));
        assert!(diags.is_empty());
    }

    #[test]
    fn style_donors_are_deleted() {
        let mut doc = doc_from(&[
            ("Base", &[("x", "1")]),
            ("A", &[("style", "Base")]),
            ("B", &[("style", "Base")]),
        ]);
        let mut diags = Diagnostics::new();
        normalize(&mut doc, &mut diags);

        assert!(doc.section("Base").is_none());
        assert_eq!(doc.section("A").unwrap().get("x"), Some("1"));
        assert_eq!(doc.section("B").unwrap().get("x"), Some("1"));
    }

    #[test]
    fn missing_style_reference_warns_and_skips() {
        let mut doc = doc_from(&[("A", &[("style", "Nope"), ("x", "7")])]);
        let mut diags = Diagnostics::new();
        normalize(&mut doc, &mut diags);

        assert_eq!(doc.section("A").unwrap().get("x"), Some("7"));
        assert_eq!(
            diags.warnings(),
            &[Warning::MissingStyleReference {
                section: "A".into(),
                reference: "Nope".into(),
            }]
        );
    }

    #[test]
    fn style_lookup_is_case_insensitive() {
        let mut doc = doc_from(&[("BASE", &[("w", "9")]), ("A", &[("style", "base")])]);
        let mut diags = Diagnostics::new();
        normalize(&mut doc, &mut diags);

        assert_eq!(doc.section("A").unwrap().get("w"), Some("9"));
        assert!(doc.section("BASE").is_none());
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut doc = doc_from(&[
            ("Base", &[("X", "1"), ("Height", "2")]),
            ("A", &[("Style", "Base"), ("Width", "3")]),
        ]);
        let mut diags = Diagnostics::new();
        normalize(&mut doc, &mut diags);
        let once = doc.clone();
        normalize(&mut doc, &mut diags);
        assert_eq!(doc, once);
    }

    #[test]
    fn action_keys_survive_under_lowercase() {
        let mut doc = doc_from(&[("A", &[("LeftMouseUpAction", "[!Refresh]")])]);
        let mut diags = Diagnostics::new();
        normalize(&mut doc, &mut diags);
        assert_eq!(
            doc.section("A").unwrap().get("leftmouseupaction"),
            Some("[!Refresh]")
        );
    }
}
