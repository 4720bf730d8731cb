//! Helpers for post-processing scan output.

use crate::types::CharsetPattern;
use std::collections::BTreeMap;

/// Everything before the first dot ("abca.li" -> "abca").
pub fn domain_body(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

/// Character-repetition shape of a domain body.
///
/// Each distinct character is replaced by the next capital letter in order
/// of first appearance, so "abca.li" becomes "ABCA" and "xyxy.de" "ABAB".
/// Comparison is case-insensitive.
pub fn domain_shape(domain: &str) -> String {
    let mut seen: Vec<char> = Vec::new();
    domain_body(domain)
        .to_lowercase()
        .chars()
        .map(|c| {
            let index = match seen.iter().position(|&s| s == c) {
                Some(index) => index,
                None => {
                    seen.push(c);
                    seen.len() - 1
                }
            };
            shape_symbol(index)
        })
        .collect()
}

// A-Z, then a-z for bodies with more than 26 distinct characters.
fn shape_symbol(index: usize) -> char {
    const SYMBOLS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    SYMBOLS.get(index).map(|&b| char::from(b)).unwrap_or('?')
}

/// Group domains by shape. Each group is sorted.
pub fn group_by_shape<I, S>(domains: I) -> BTreeMap<String, Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for domain in domains {
        let domain = domain.as_ref();
        groups
            .entry(domain_shape(domain))
            .or_default()
            .push(domain.to_string());
    }
    for group in groups.values_mut() {
        group.sort();
    }
    groups
}

/// Expand `{pattern}`, `{length}` and `{suffix}` in an output file name.
///
/// The suffix is inserted without its leading dot, so
/// `available_domains_{pattern}_{length}_{suffix}.txt` becomes
/// `available_domains_D_3_li.txt`.
pub fn render_file_template(
    template: &str,
    pattern: CharsetPattern,
    length: usize,
    suffix: &str,
) -> String {
    template
        .replace("{pattern}", pattern.selector())
        .replace("{length}", &length.to_string())
        .replace("{suffix}", suffix.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_shape() {
        assert_eq!(domain_shape("abca.li"), "ABCA");
        assert_eq!(domain_shape("aaaa.de"), "AAAA");
        assert_eq!(domain_shape("xyxy"), "ABAB");
        assert_eq!(domain_shape("A1a1.ai"), "ABAB");
        assert_eq!(domain_shape(""), "");
    }

    #[test]
    fn test_group_by_shape() {
        let groups = group_by_shape(["zz.li", "ab.li", "aa.li", "cd.li"]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["AA"], vec!["aa.li", "zz.li"]);
        assert_eq!(groups["AB"], vec!["ab.li", "cd.li"]);
    }

    #[test]
    fn test_render_file_template() {
        let name = render_file_template(
            "available_domains_{pattern}_{length}_{suffix}.txt",
            CharsetPattern::Letters,
            3,
            ".li",
        );
        assert_eq!(name, "available_domains_D_3_li.txt");

        let name = render_file_template("plain.txt", CharsetPattern::Digits, 5, ".de");
        assert_eq!(name, "plain.txt");
    }
}
