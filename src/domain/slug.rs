//! URL-safe identifiers derived from human-readable names.
//!
//! Slugs are used both as file names and as link targets between generated
//! pages, so the output must be stable for a given input.

use std::sync::LazyLock;

use regex::Regex;

static NOT_ALPHANUMERIC_OR_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("static regex is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// Convert a name into a slug.
///
/// The transformation is applied in this order:
///
/// 1. transliterate non-ASCII characters to their closest ASCII equivalent
/// 2. lowercase
/// 3. replace `&` with `and`
/// 4. remove everything that is not an ASCII letter, digit or whitespace
/// 5. replace each run of whitespace with a single hyphen
///
/// Degenerate input (empty, or only symbols) yields an empty string.
///
/// ```
/// assert_eq!(sammgen::slug("Governance & Strategy"), "governance-and-strategy");
/// ```
#[must_use]
pub fn slug(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let lower = ascii.to_lowercase().replace('&', "and");
    let stripped = NOT_ALPHANUMERIC_OR_SPACE.replace_all(&lower, "");
    WHITESPACE_RUN.replace_all(&stripped, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::slug;

    #[test_case("Governance & Strategy", "governance-and-strategy"; "ampersand")]
    #[test_case("Strategy and Metrics", "strategy-and-metrics"; "plain words")]
    #[test_case("Policy & Compliance", "policy-and-compliance"; "second ampersand")]
    #[test_case("Threat  Assessment", "threat-assessment"; "doubled space")]
    #[test_case("Secure Build (CI/CD)", "secure-build-cicd"; "punctuation removed")]
    #[test_case("Défense en profondeur", "defense-en-profondeur"; "accents transliterated")]
    #[test_case("Straße", "strasse"; "sharp s")]
    #[test_case("Level 2\tcontrols", "level-2-controls"; "tab")]
    #[test_case("", ""; "empty")]
    #[test_case("&", "and"; "lone ampersand")]
    #[test_case("!?*", ""; "only symbols")]
    fn slugs(input: &str, expected: &str) {
        assert_eq!(slug(input), expected);
    }

    #[test]
    fn slug_is_deterministic() {
        let name = "Education & Guidance";
        assert_eq!(slug(name), slug(name));
    }

    #[test]
    fn well_formed_names_have_no_stray_hyphens() {
        for name in [
            "Governance",
            "Design",
            "Implementation",
            "Verification",
            "Operations",
            "Security Requirements",
            "Environment Management",
        ] {
            let s = slug(name);
            assert!(
                s.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "unexpected character in {s}"
            );
            assert!(!s.starts_with('-') && !s.ends_with('-'), "{s}");
            assert!(!s.contains("--"), "{s}");
        }
    }
}
