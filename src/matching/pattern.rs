//! Title pattern compiler.
//!
//! Turns a free-text episode title into a tolerant, case-insensitive regex
//! used to pick the matching upload out of a channel or playlist. Each
//! rewrite is a separate pure step; [`compile_title_pattern`] runs them in a
//! fixed order because later steps rely on the output shape of earlier ones
//! (hyphens are only widened after en-dashes were normalized, spaces are only
//! relaxed after every other step inserted its groups).

use regex::{Regex, RegexBuilder};

/// Optional apostrophe group, accepting straight and typographic forms.
const OPTIONAL_APOSTROPHE: &str = "(['’]?)";

/// Hyphen replacement: optional hyphen or en-dash with optional surrounding whitespace.
const OPTIONAL_DASH: &str = r"\s*([-–]??)\s*";

/// Alternation that treats `AND` and `&` as interchangeable words.
const AND_ALTERNATION: &str = " (AND|&) ";

/// Whitespace replacement for literal spaces.
const FLEXIBLE_SPACE: &str = r"\s*";

/// Compiles an episode title into a catalog match pattern.
///
/// The result is meant to be matched case-insensitively as an unanchored
/// search (see [`TitleMatcher`]).
///
/// # Example
///
/// ```
/// use sonarr_ytdl_core::matching::{TitleMatcher, compile_title_pattern};
///
/// let pattern = compile_title_pattern("Doctor's Notes: Part 1-2");
/// let matcher = TitleMatcher::new(&pattern).unwrap();
/// assert!(matcher.is_match("Doctors Notes Part 1 - 2"));
/// ```
#[must_use]
pub fn compile_title_pattern(title: &str) -> String {
    let steps: [fn(&str) -> String; 8] = [
        uppercase,
        normalize_dashes,
        escape_literals,
        optional_punctuation,
        interchangeable_and,
        optional_hyphens,
        optional_possessive,
        flexible_spaces,
    ];
    steps
        .iter()
        .fold(title.to_string(), |pattern, step| step(&pattern))
}

/// Upper-cases the title; matching is case-insensitive anyway.
pub(crate) fn uppercase(input: &str) -> String {
    input.to_uppercase()
}

/// Replaces en-dashes with plain hyphens.
pub(crate) fn normalize_dashes(input: &str) -> String {
    input.replace('–', "-")
}

/// Escapes parentheses and the other regex metacharacters that no later
/// step rewrites into a group of its own.
pub(crate) fn escape_literals(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(
            ch,
            '\\' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '*' | '+'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Makes `: ' ’ , ! . ?` optional.
///
/// Done in one pass so the `?` quantifiers inserted here are never mistaken
/// for question marks from the title.
pub(crate) fn optional_punctuation(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for ch in input.chars() {
        match ch {
            ':' => out.push_str("([:]?)"),
            '\'' | '’' => out.push_str(OPTIONAL_APOSTROPHE),
            ',' => out.push_str("([,]?)"),
            '!' => out.push_str("([!]?)"),
            '.' => out.push_str("([.]?)"),
            '?' => out.push_str("([?]?)"),
            other => out.push(other),
        }
    }
    out
}

/// Lets `" AND "` and `" & "` stand in for each other.
pub(crate) fn interchangeable_and(input: &str) -> String {
    input
        .replace(" AND ", AND_ALTERNATION)
        .replace(" & ", AND_ALTERNATION)
}

/// Widens hyphens so "1-2", "1 - 2", "1–2" and "12" all match.
pub(crate) fn optional_hyphens(input: &str) -> String {
    input.replace('-', OPTIONAL_DASH)
}

/// Inserts an optional apostrophe before a trailing `S` so "DOCTORS" also
/// matches "DOCTOR'S".
///
/// Only an `S` followed by an escape, a space, a group opener or the end of
/// the pattern is touched. An `S` already preceded by an optional apostrophe
/// group is left as is.
pub(crate) fn optional_possessive(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    for (idx, &ch) in chars.iter().enumerate() {
        if ch == 'S' {
            let at_boundary = matches!(chars.get(idx + 1), None | Some('\\' | ' ' | '('));
            if at_boundary && !out.ends_with(OPTIONAL_APOSTROPHE) {
                out.push_str(OPTIONAL_APOSTROPHE);
            }
        }
        out.push(ch);
    }
    out
}

/// Replaces literal spaces with "zero or more whitespace".
pub(crate) fn flexible_spaces(input: &str) -> String {
    input.replace(' ', FLEXIBLE_SPACE)
}

/// Case-insensitive matcher for a compiled title pattern.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    regex: Regex,
}

impl TitleMatcher {
    /// Compiles `pattern` for case-insensitive searching.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] when the pattern is not a valid regex, which
    /// can only happen for patterns edited by a site rewrite rule.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    /// Returns true when the pattern is found anywhere in `title`.
    #[must_use]
    pub fn is_match(&self, title: &str) -> bool {
        self.regex.is_match(title)
    }
}
