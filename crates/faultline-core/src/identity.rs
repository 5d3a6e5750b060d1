//! Identity resolution: caller-supplied name or a generated placeholder.
//!
//! Generated names are two capitalised words glued together ("Glassotter"),
//! alphabetic only, so they never look like a number or base64 payload.

use rand::Rng;

const FIRST: &[&str] = &[
    "amber", "brisk", "cobalt", "dusty", "ember", "fancy", "glass", "hollow", "ivory",
    "jolly", "knotty", "lunar", "misty", "nimble", "olive", "plucky", "quiet", "rusty",
    "silver", "tidy", "umber", "velvet", "wobbly", "zesty", "crimson", "frosty", "gusty",
    "mellow", "spry", "witty",
];

const SECOND: &[&str] = &[
    "badger", "crane", "dingo", "egret", "ferret", "gecko", "heron", "ibis", "jackal",
    "koala", "lemur", "marmot", "newt", "otter", "panda", "quail", "raven", "stoat",
    "tapir", "urchin", "vole", "walrus", "yak", "zebra", "bison", "finch", "moose",
    "puffin", "shrew", "wombat",
];

/// Resolve the display name for a request.
///
/// Returns `name` when it is non-empty, otherwise a freshly generated one.
pub fn resolve_name(name: Option<&str>) -> String {
    resolve_name_with(name, &mut rand::rng())
}

/// Same as [`resolve_name`] with an explicit RNG.
pub fn resolve_name_with<R: Rng>(name: Option<&str>, rng: &mut R) -> String {
    match name {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => silly_name(rng),
    }
}

fn silly_name<R: Rng>(rng: &mut R) -> String {
    let first = FIRST[rng.random_range(0..FIRST.len())];
    let second = SECOND[rng.random_range(0..SECOND.len())];

    let mut out = String::with_capacity(first.len() + second.len());
    let mut chars = first.chars();
    if let Some(c) = chars.next() {
        out.extend(c.to_uppercase());
    }
    out.push_str(chars.as_str());
    out.push_str(second);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn explicit_name_is_kept() {
        assert_eq!(resolve_name(Some("alice")), "alice");
    }

    #[test]
    fn empty_or_missing_name_is_generated() {
        for input in [None, Some("")] {
            let name = resolve_name(input);
            assert!(!name.is_empty());
            assert!(name.chars().all(|c| c.is_ascii_alphabetic()));
            assert!(name.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn generated_names_vary() {
        let mut rng = StdRng::seed_from_u64(7);
        let names: HashSet<String> = (0..50).map(|_| resolve_name_with(None, &mut rng)).collect();
        assert!(names.len() > 1);
    }
}
