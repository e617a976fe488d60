use regex::Regex;
use std::sync::OnceLock;

/// URL-safe slug from an artist or venue name.
///
/// Lowercases, collapses runs of non-alphanumerics into single dashes and
/// trims leading/trailing dashes: "Arctic Monkeys" -> "arctic-monkeys".
pub fn slugify(name: &str) -> String {
    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    let re = NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap());

    let lowered = name.to_lowercase();
    re.replace_all(&lowered, "-").trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_names() {
        assert_eq!(slugify("Arctic Monkeys"), "arctic-monkeys");
        assert_eq!(slugify("AC/DC"), "ac-dc");
        assert_eq!(slugify("  The  National  "), "the-national");
    }

    #[test]
    fn strips_punctuation_runs() {
        assert_eq!(slugify("Sigur Rós!?"), "sigur-r-s");
        assert_eq!(slugify("---"), "");
    }
}
