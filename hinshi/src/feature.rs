//! Per-token features.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Value of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureValue<'a> {
    Bool(bool),
    Str(&'a str),
}

/// Features of a token in its sentence context.
///
/// The schema is fixed: every token yields the same features, listed in [`FeatureMap::NAMES`].
/// String features borrow from the sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureMap<'a> {
    pub token: &'a str,
    pub is_first: bool,
    pub is_last: bool,
    pub is_capitalized: bool,
    pub is_all_capitalized: bool,
    pub is_capitals_inside: bool,
    pub is_numeric: bool,
    pub prefix_1: &'a str,
    pub prefix_2: &'a str,
    pub suffix_1: &'a str,
    pub suffix_2: &'a str,
    pub prev_token: &'a str,
    pub prev_token_2: &'a str,
    pub next_token: &'a str,
    pub next_token_2: &'a str,
}

impl<'a> FeatureMap<'a> {
    /// Feature names in iteration order.
    pub const NAMES: [&'static str; 15] = [
        "token",
        "is_first",
        "is_last",
        "is_capitalized",
        "is_all_capitalized",
        "is_capitals_inside",
        "is_numeric",
        "prefix-1",
        "prefix-2",
        "suffix-1",
        "suffix-2",
        "prev-token",
        "2-prev-token",
        "next-token",
        "2-next-token",
    ];

    /// Iterates over `(name, value)` pairs in the order of [`FeatureMap::NAMES`].
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, FeatureValue<'a>)> {
        use FeatureValue::{Bool, Str};
        let values = [
            Str(self.token),
            Bool(self.is_first),
            Bool(self.is_last),
            Bool(self.is_capitalized),
            Bool(self.is_all_capitalized),
            Bool(self.is_capitals_inside),
            Bool(self.is_numeric),
            Str(self.prefix_1),
            Str(self.prefix_2),
            Str(self.suffix_1),
            Str(self.suffix_2),
            Str(self.prev_token),
            Str(self.prev_token_2),
            Str(self.next_token),
            Str(self.next_token_2),
        ];
        Self::NAMES.into_iter().zip(values)
    }

    /// Gets a feature by name.
    pub fn get(&self, name: &str) -> Option<FeatureValue<'a>> {
        self.iter().find(|&(n, _)| n == name).map(|(_, v)| v)
    }
}

// Characters with Numeric_Type=Digit: superscripts, subscripts, circled and parenthesized
// digits and a few scripts' digits that are not in the Nd category.
const DIGIT_RANGES: [(u32, u32); 20] = [
    (0x00B2, 0x00B3),
    (0x00B9, 0x00B9),
    (0x1369, 0x1371),
    (0x19DA, 0x19DA),
    (0x2070, 0x2070),
    (0x2074, 0x2079),
    (0x2080, 0x2089),
    (0x2460, 0x2468),
    (0x2474, 0x247C),
    (0x2488, 0x2490),
    (0x24EA, 0x24EA),
    (0x24F5, 0x24FD),
    (0x24FF, 0x24FF),
    (0x2776, 0x277E),
    (0x2780, 0x2788),
    (0x278A, 0x2792),
    (0x10A40, 0x10A43),
    (0x10E60, 0x10E68),
    (0x11052, 0x1105A),
    (0x1F100, 0x1F10A),
];

/// Returns `true` for decimal digits of any script and for other digit characters.
fn is_digit(c: char) -> bool {
    if get_general_category(c) == GeneralCategory::DecimalNumber {
        return true;
    }
    let c = u32::from(c);
    DIGIT_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&c))
}

fn first_char(s: &str) -> &str {
    s.chars().next().map_or("", |c| &s[..c.len_utf8()])
}

fn last_chars(s: &str, n: usize) -> &str {
    s.char_indices().rev().nth(n - 1).map_or("", |(i, _)| &s[i..])
}

fn context_token<S>(sentence: &[S], index: Option<usize>) -> &str
where
    S: AsRef<str>,
{
    index
        .and_then(|i| sentence.get(i))
        .map_or("", |t| t.as_ref())
}

/// Extracts the features of `token` at `index` in `sentence`.
///
/// `token` is the surface at `sentence[index]`. Context positions outside the sentence give empty
/// strings.
///
/// # Examples
///
/// ```
/// use hinshi::{extract_features, FeatureValue};
///
/// let sent = ["Run", "fast", "now"];
/// let features = extract_features("Run", 0, &sent);
/// assert_eq!(Some(FeatureValue::Str("fast")), features.get("next-token"));
/// ```
pub fn extract_features<'a, S>(token: &'a str, index: usize, sentence: &'a [S]) -> FeatureMap<'a>
where
    S: AsRef<str>,
{
    let prefix_1 = first_char(token);
    let rest = &token[prefix_1.len()..];
    let has_two_chars = !rest.is_empty();
    FeatureMap {
        token,
        is_first: index == 0,
        is_last: index + 1 == sentence.len(),
        is_capitalized: prefix_1.to_uppercase() == prefix_1,
        is_all_capitalized: token.to_uppercase() == token,
        is_capitals_inside: rest.to_lowercase() != rest,
        is_numeric: !token.is_empty() && token.chars().all(is_digit),
        prefix_1,
        // Repeats the first character; kept as is for compatibility with existing models.
        prefix_2: if has_two_chars { prefix_1 } else { "" },
        suffix_1: last_chars(token, 1),
        suffix_2: if has_two_chars { last_chars(token, 2) } else { "" },
        prev_token: context_token(sentence, index.checked_sub(1)),
        prev_token_2: context_token(sentence, index.checked_sub(2)),
        next_token: context_token(sentence, index.checked_add(1)),
        next_token_2: context_token(sentence, index.checked_add(2)),
    }
}

/// Extracts the features of every token in `sentence`.
pub fn extract_sentence_features<S>(sentence: &[S]) -> impl Iterator<Item = FeatureMap<'_>>
where
    S: AsRef<str>,
{
    sentence
        .iter()
        .enumerate()
        .map(move |(i, token)| extract_features(token.as_ref(), i, sentence))
}

#[cfg(test)]
mod tests {
    use super::*;

    use FeatureValue::*;

    #[test]
    fn test_extract_first() {
        let sent = ["Run", "fast", "now"];
        let features = extract_features("Run", 0, &sent);

        let expected = FeatureMap {
            token: "Run",
            is_first: true,
            is_last: false,
            is_capitalized: true,
            is_all_capitalized: false,
            is_capitals_inside: false,
            is_numeric: false,
            prefix_1: "R",
            prefix_2: "R",
            suffix_1: "n",
            suffix_2: "un",
            prev_token: "",
            prev_token_2: "",
            next_token: "fast",
            next_token_2: "now",
        };
        assert_eq!(expected, features);
    }

    #[test]
    fn test_extract_last() {
        let sent = ["Run", "fast", "now"];
        let features = extract_features("now", 2, &sent);

        assert_eq!(Some(Bool(false)), features.get("is_first"));
        assert_eq!(Some(Bool(true)), features.get("is_last"));
        assert_eq!(Some(Str("fast")), features.get("prev-token"));
        assert_eq!(Some(Str("Run")), features.get("2-prev-token"));
        assert_eq!(Some(Str("")), features.get("next-token"));
        assert_eq!(Some(Str("")), features.get("2-next-token"));
    }

    #[test]
    fn test_extract_single_token_sentence() {
        let sent = ["Hello"];
        let features = extract_features("Hello", 0, &sent);

        assert!(features.is_first);
        assert!(features.is_last);
        assert_eq!("", features.prev_token);
        assert_eq!("", features.next_token);
    }

    #[test]
    fn test_extract_empty_token() {
        let sent = [""];
        let features = extract_features("", 0, &sent);

        assert_eq!(15, features.iter().count());
        assert_eq!("", features.prefix_1);
        assert_eq!("", features.prefix_2);
        assert_eq!("", features.suffix_1);
        assert_eq!("", features.suffix_2);
        assert!(features.is_capitalized);
        assert!(features.is_all_capitalized);
        assert!(!features.is_capitals_inside);
        assert!(!features.is_numeric);
    }

    #[test]
    fn test_extract_one_char_token() {
        let sent = ["a", "b"];
        let features = extract_features("a", 0, &sent);

        assert_eq!(15, features.iter().count());
        assert_eq!("a", features.prefix_1);
        assert_eq!("", features.prefix_2);
        assert_eq!("a", features.suffix_1);
        assert_eq!("", features.suffix_2);
        assert!(!features.is_capitalized);
    }

    #[test]
    fn test_prefix_2_repeats_prefix_1() {
        for token in ["ab", "Dogs", "n't", "東京都"] {
            let sent = [token];
            let features = extract_features(token, 0, &sent);
            assert_eq!(features.prefix_1, features.prefix_2);
        }
    }

    #[test]
    fn test_multibyte_affixes() {
        let sent = ["東京都"];
        let features = extract_features("東京都", 0, &sent);

        assert_eq!("東", features.prefix_1);
        assert_eq!("都", features.suffix_1);
        assert_eq!("京都", features.suffix_2);
    }

    #[test]
    fn test_is_numeric() {
        let sent = ["123", "12a", "", "１２"];

        assert!(extract_features("123", 0, &sent).is_numeric);
        assert!(!extract_features("12a", 1, &sent).is_numeric);
        assert!(!extract_features("", 2, &sent).is_numeric);
        assert!(extract_features("１２", 3, &sent).is_numeric);
    }

    #[test]
    fn test_is_numeric_other_scripts() {
        for token in ["٢٠٢٤", "१२३", "²", "x²", "①②", "½"] {
            let sent = [token];
            let expected = !matches!(token, "x²" | "½");
            assert_eq!(expected, extract_features(token, 0, &sent).is_numeric, "{token}");
        }
    }

    #[test]
    fn test_capitalization() {
        let sent = ["NASA", "iPhone", "McDonald", "42nd"];

        let f = extract_features("NASA", 0, &sent);
        assert!(f.is_capitalized);
        assert!(f.is_all_capitalized);
        assert!(f.is_capitals_inside);

        let f = extract_features("iPhone", 1, &sent);
        assert!(!f.is_capitalized);
        assert!(!f.is_all_capitalized);
        assert!(f.is_capitals_inside);

        let f = extract_features("McDonald", 2, &sent);
        assert!(f.is_capitalized);
        assert!(f.is_capitals_inside);

        let f = extract_features("42nd", 3, &sent);
        assert!(f.is_capitalized);
        assert!(!f.is_all_capitalized);
        assert!(!f.is_capitals_inside);
    }

    #[test]
    fn test_iter_names() {
        let sent = ["x"];
        let names: Vec<_> = extract_features("x", 0, &sent).iter().map(|(n, _)| n).collect();

        assert_eq!(FeatureMap::NAMES.to_vec(), names);
    }

    #[test]
    fn test_get_unknown_name() {
        let sent = ["x"];

        assert_eq!(None, extract_features("x", 0, &sent).get("pos"));
    }

    #[test]
    fn test_extract_sentence_features() {
        let sent = vec!["I".to_string(), "do".to_string(), "n't".to_string()];
        let features: Vec<_> = extract_sentence_features(&sent).collect();

        assert_eq!(3, features.len());
        assert_eq!("do", features[1].token);
        assert_eq!("I", features[1].prev_token);
        assert_eq!("n't", features[1].next_token);
    }
}
