//! Permalink shortening
//!
//! Context links are stored inside notes in a compact token form:
//!
//! - `l,<post>` / `l,<post>,<comment>` for submission and comment pages
//! - `m,<message>` for legacy private-message pages
//!
//! Anything that doesn't match a known pattern is stored as-is, which means
//! `expand_permalink(squash_permalink(url)) == url` only holds for the
//! canonical forms produced by [`expand_permalink`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix of shortened submission/comment links
const LINK_PREFIX: &str = "l,";

/// Prefix of shortened legacy message links
const MESSAGE_PREFIX: &str = "m,";

/// Modmail conversations are already compact and are never shortened
const MODMAIL_PREFIX: &str = "https://mod.reddit.com";

const CANONICAL_COMMENTS_URL: &str = "https://www.reddit.com/comments/";
const CANONICAL_MESSAGE_URL: &str = "https://www.reddit.com/message/messages/";

/// Submission pages on any front-end host, plus the `redd.it` short host.
/// Group 1 is the post id, group 2 the optional comment id.
static SUBMISSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:/comments|^https?://redd\.it)/([a-z0-9]+)(?:/[^/]*(?:/([a-z0-9]+)?)?)?")
        .expect("submission permalink pattern is valid")
});

static MESSAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/messages/([A-Za-z0-9_]+)").expect("message permalink pattern is valid")
});

/// Shorten a permalink into the token format used on disk
///
/// Returns the input unchanged when it doesn't match a known link format.
pub fn squash_permalink(permalink: &str) -> String {
    if let Some(caps) = SUBMISSION_PATTERN.captures(permalink) {
        let mut squashed = format!("{}{}", LINK_PREFIX, &caps[1]);
        if let Some(comment) = caps.get(2) {
            squashed.push(',');
            squashed.push_str(comment.as_str());
        }
        return squashed;
    }

    if let Some(caps) = MESSAGE_PATTERN.captures(permalink) {
        return format!("{}{}", MESSAGE_PREFIX, &caps[1]);
    }

    if permalink.starts_with(MODMAIL_PREFIX) {
        return permalink.to_string();
    }

    permalink.to_string()
}

/// Expand a shortened token back into a full permalink
///
/// Comment tokens use `_` in place of the slug segment.
pub fn expand_permalink(token: &str) -> String {
    if let Some(ids) = token.strip_prefix(LINK_PREFIX) {
        let path = ids.split(',').collect::<Vec<_>>().join("/_/");
        return format!("{}{}", CANONICAL_COMMENTS_URL, path);
    }

    if let Some(id) = token.strip_prefix(MESSAGE_PREFIX) {
        return format!("{}{}", CANONICAL_MESSAGE_URL, id);
    }

    token.to_string()
}
