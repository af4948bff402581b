//! Episode title matching.
//!
//! - [`compile_title_pattern`] turns an episode title into a tolerant regex
//! - [`Rewrite`] is a configured regex substitution (title or pattern side)
//! - [`search_episode`] queries a [`crate::catalog::Catalog`] and resolves a
//!   single URL out of the result

mod pattern;
mod rewrite;
mod search;

pub use pattern::{TitleMatcher, compile_title_pattern};
pub use rewrite::Rewrite;
pub use search::{MatchResult, NotFoundReason, build_search_pattern, resolve_match, search_episode};
