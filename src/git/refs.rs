use regex_lite::Regex;

/// Local reference updated by a fetch, used as the checkout target whenever
/// the exact commit is not known in advance. Only one ref is ever fetched per
/// checkout, so this is unambiguous.
pub const FETCH_HEAD: &str = "FETCH_HEAD";

pub const FALLBACK_BRANCH: &str = "master";

/// What to fetch and what to check out for one user-supplied ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFetch {
    pub fetch_remote: String,
    /// `None` when nothing extra needs to be fetched (exact commit hash).
    pub fetch_ref: Option<String>,
    pub checkout_ref: String,
}

fn is_commit_hash(value: &str) -> bool {
    Regex::new("^[0-9a-fA-F]{40}$").unwrap().is_match(value)
}

/// Maps a ref specifier to a fetch-remote/fetch-ref/checkout-ref triple.
///
/// There are five kinds of refs we can be handed:
/// 0) absent or empty: fetch the default branch (or `master`);
/// 1) a 40-character SHA1 hash: fetch nothing extra, check out the hash;
/// 2) a fully-qualified arbitrary ref, e.g. `refs/foo/bar/baz`;
/// 3) a fully-qualified branch name, e.g. `refs/heads/main`: chop off
///    `refs/heads/` and it matches case 4;
/// 4) a branch name, e.g. `main`.
/// Cases 0, 2, 3 and 4 check out `FETCH_HEAD`.
pub fn resolve(
    git_ref: Option<&str>,
    default_branch: Option<&str>,
    remote_name: &str,
) -> ResolvedFetch {
    match git_ref {
        None | Some("") => ResolvedFetch {
            fetch_remote: remote_name.to_string(),
            fetch_ref: Some(
                default_branch
                    .filter(|b| !b.is_empty())
                    .unwrap_or(FALLBACK_BRANCH)
                    .to_string(),
            ),
            checkout_ref: FETCH_HEAD.to_string(),
        },
        Some(r) if is_commit_hash(r) => ResolvedFetch {
            fetch_remote: remote_name.to_string(),
            fetch_ref: None,
            checkout_ref: r.to_string(),
        },
        Some(r) => ResolvedFetch {
            fetch_remote: remote_name.to_string(),
            fetch_ref: Some(
                r.strip_prefix("refs/heads/")
                    .unwrap_or(r)
                    .to_string(),
            ),
            checkout_ref: FETCH_HEAD.to_string(),
        },
    }
}
