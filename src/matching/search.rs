//! Catalog search and single-match resolution.
//!
//! A search asks the catalog to enumerate a channel or playlist with the
//! compiled title pattern as a filter, then narrows whatever comes back to at
//! most one URL. Every failure mode collapses into [`MatchResult::NotFound`]
//! so a bad episode never stops the pass.

use tracing::{debug, error, info, warn};

use super::pattern::{TitleMatcher, compile_title_pattern};
use super::rewrite::Rewrite;
use crate::catalog::{Catalog, CatalogHooks, CatalogQuery, CatalogResult};

/// Why a search produced no downloadable URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The catalog resolved back to the URL that was queried.
    SelfReferential,
    /// The catalog returned no URL at all.
    Unresolved,
    /// The catalog call itself failed.
    SearchFailed,
}

/// Outcome of matching one episode against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A single item URL to download.
    Found {
        /// Resolved item URL.
        url: String,
    },
    /// Nothing suitable.
    NotFound(NotFoundReason),
}

impl MatchResult {
    /// The resolved URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Found { url } => Some(url),
            Self::NotFound(_) => None,
        }
    }
}

/// Compiles `title` and applies the series' site rewrite to the result.
#[must_use]
pub fn build_search_pattern(title: &str, site_rewrite: Option<&Rewrite>) -> String {
    let pattern = compile_title_pattern(title);
    match site_rewrite {
        Some(rewrite) => rewrite.apply(&pattern),
        None => pattern,
    }
}

/// Picks the single URL to download out of a catalog result.
///
/// Candidates are the non-null entries whose title (when present) matches
/// `matcher`; the first candidate wins. Without candidates the result's own
/// URL is used, which only counts as a match when it differs from the
/// queried URL.
#[must_use]
pub fn resolve_match(
    query_url: &str,
    result: &CatalogResult,
    matcher: Option<&TitleMatcher>,
) -> MatchResult {
    let candidate = result
        .entries
        .iter()
        .flatten()
        .flatten()
        .find(|entry| match (matcher, entry.title.as_deref()) {
            (Some(matcher), Some(title)) => matcher.is_match(title),
            _ => true,
        });

    let resolved = match candidate {
        Some(entry) => entry.webpage_url.as_deref(),
        None => result.webpage_url.as_deref(),
    };

    match resolved {
        Some(url) if url == query_url => MatchResult::NotFound(NotFoundReason::SelfReferential),
        Some(url) => MatchResult::Found {
            url: url.to_string(),
        },
        None => MatchResult::NotFound(NotFoundReason::Unresolved),
    }
}

/// Runs a catalog search and resolves it to at most one URL.
///
/// Never fails: catalog errors are logged and reported as
/// [`NotFoundReason::SearchFailed`].
pub async fn search_episode(
    catalog: &dyn Catalog,
    query: &CatalogQuery,
    hooks: &CatalogHooks,
) -> MatchResult {
    debug!(
        backend = catalog.name(),
        url = %query.url,
        pattern = %query.title_pattern,
        "searching catalog"
    );

    let result = match catalog.search(query, hooks).await {
        Ok(result) => result,
        Err(err) => {
            error!(url = %query.url, error = %err, "catalog search failed");
            return MatchResult::NotFound(NotFoundReason::SearchFailed);
        }
    };

    let matcher = match TitleMatcher::new(&query.title_pattern) {
        Ok(matcher) => Some(matcher),
        Err(err) => {
            warn!(
                pattern = %query.title_pattern,
                error = %err,
                "title pattern is not a valid regex, trusting catalog filtering"
            );
            None
        }
    };

    let outcome = resolve_match(&query.url, &result, matcher.as_ref());
    match &outcome {
        MatchResult::Found { url } => info!(url = %url, "matched catalog item"),
        MatchResult::NotFound(NotFoundReason::SelfReferential) => {
            debug!(url = %query.url, "catalog returned the queried URL, no match");
        }
        MatchResult::NotFound(NotFoundReason::Unresolved) => {
            error!(url = %query.url, "catalog result carried no URL");
        }
        MatchResult::NotFound(NotFoundReason::SearchFailed) => {}
    }
    outcome
}
