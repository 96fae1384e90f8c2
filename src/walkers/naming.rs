//! Deterministic unique-name generation for synthesized access members.

use std::collections::HashSet;

/// Derive a field-style access member name from `class_name`, unique with
/// respect to `existing`.
///
/// `"TargetClass"` becomes `_targetClass`; collisions append increasing
/// integer suffixes starting at 1. Terminates because `existing` is finite,
/// and the returned name is guaranteed absent from it.
pub fn generate_access_member_name(existing: &HashSet<String>, class_name: &str) -> String {
    let base = format!("_{}", lower_first(class_name));
    if !existing.contains(&base) {
        return base;
    }
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{base}{suffix}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
