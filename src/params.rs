//! Numeric parameter-list tokenizing.
//!
//! Transform clauses and dash arrays both carry comma-separated numbers, but
//! with different failure modes: transform parameters are positional (a bad
//! entry reads as absent), while dash arrays are lossy (bad entries are
//! dropped).

/// Parse positional parameters; empty or unparseable entries become `None`.
pub fn numbers(args: &[String]) -> Vec<Option<f64>> {
    args.iter()
        .map(|a| a.trim().parse::<f64>().ok())
        .collect()
}

/// Parse a float list, dropping empty and unparseable entries.
pub fn float_list(args: &[String]) -> Vec<f64> {
    args.iter()
        .filter_map(|a| a.trim().parse::<f64>().ok())
        .collect()
}

/// Positional accessor over a parsed parameter list.
pub fn nth(parsed: &[Option<f64>], index: usize) -> Option<f64> {
    parsed.get(index).copied().flatten()
}
