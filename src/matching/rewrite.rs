//! Regex rewrite rules configured per series.
//!
//! Rules are written in config files with backslash group references
//! (`\1`, `\g<name>`); they are translated to the `regex` crate syntax once,
//! when the rule is compiled.

use std::fmt;

use regex::Regex;

/// A compiled `match` / `replace` pair applied with replace-all semantics.
#[derive(Clone)]
pub struct Rewrite {
    regex: Regex,
    replacement: String,
}

impl Rewrite {
    /// Compiles a rewrite rule.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] when `pattern` is not a valid regex.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            replacement: translate_replacement(replacement),
        })
    }

    /// Applies the rule to every match in `input`.
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        self.regex
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }

    /// The source pattern of the rule.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Debug for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rewrite")
            .field("pattern", &self.pattern())
            .field("replacement", &self.replacement)
            .finish()
    }
}

/// Converts a backslash-style replacement string into `regex` crate syntax.
///
/// `\N` and `\g<name>` become `${N}` / `${name}`; a literal `$` is doubled.
pub(crate) fn translate_replacement(replacement: &str) -> String {
    let chars: Vec<char> = replacement.chars().collect();
    let mut out = String::with_capacity(replacement.len());
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        match ch {
            '$' => {
                out.push_str("$$");
                idx += 1;
            }
            '\\' if chars.get(idx + 1).is_some_and(char::is_ascii_digit) => {
                let digits: String = chars[idx + 1..]
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                idx += 1 + digits.len();
                out.push_str("${");
                out.push_str(&digits);
                out.push('}');
            }
            '\\' if chars.get(idx + 1) == Some(&'g') && chars.get(idx + 2) == Some(&'<') => {
                let name: String = chars[idx + 3..].iter().take_while(|c| **c != '>').collect();
                let closed = chars.get(idx + 3 + name.len()) == Some(&'>');
                if closed {
                    idx += 4 + name.len();
                    out.push_str("${");
                    out.push_str(&name);
                    out.push('}');
                } else {
                    out.push(ch);
                    idx += 1;
                }
            }
            '\\' if chars.get(idx + 1) == Some(&'\\') => {
                out.push('\\');
                idx += 2;
            }
            _ => {
                out.push(ch);
                idx += 1;
            }
        }
    }
    out
}
