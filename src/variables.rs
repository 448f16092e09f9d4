//! `#Name#` placeholder substitution.
//!
//! The `Variables` section (case-insensitive name) supplies values for
//! `#Name#` placeholders in every other string value. Unresolved names
//! substitute to the empty string, never the literal token. The section is
//! consumed: it is removed from the document and never rendered.

use std::collections::HashMap;

use crate::document::ConfigDocument;

/// Substitute placeholders across the document and drop the `Variables`
/// section.
pub fn substitute(doc: &mut ConfigDocument) {
    let vars: HashMap<String, String> = doc
        .take_section_ci("Variables")
        .map(|section| {
            section
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();

    for (_, section) in doc.sections.iter_mut() {
        for (_, value) in section.iter_mut() {
            if value.contains('#') {
                *value = expand(value, &vars);
            }
        }
    }
}

/// Expand `#Name#` tokens in one value. A `#` without a closing mate is kept
/// literal; a matched but unknown name becomes the empty string.
fn expand(input: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('#') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('#') {
            Some(close) => {
                let name = &after[..close];
                if let Some(value) = vars.get(&name.to_lowercase()) {
                    out.push_str(value);
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push('#');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
