//! Route normalization
//!
//! Maps (method, path) onto the key of the rate-limit bucket the server
//! accounts the call against. The server shares accounting across sibling
//! leaf resources, so only the first id in a path identifies the bucket;
//! later ids are collapsed to a placeholder.

use regex::Regex;
use reqwest::Method;
use std::sync::OnceLock;

fn id_regex() -> &'static Regex {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    ID_REGEX.get_or_init(|| Regex::new("[0-9]+").expect("id regex is valid"))
}

/// Normalize a request path into its rate-limit bucket key.
///
/// Pure and deterministic:
/// - the query string never counts;
/// - zero or one numeric id: the path is already the key;
/// - two or more ids: only the second is replaced with `:id`;
/// - message deletes are accounted separately from other operations on
///   the same path, so `DELETE` keys get a method prefix;
/// - reactions share one account-wide bucket regardless of channel.
pub fn normalize_route(method: &Method, path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);

    let mut ids = id_regex().find_iter(path).skip(1);
    let Some(second) = ids.next() else {
        // zero or one id: bucket identity is the path itself
        return path.to_string();
    };

    let mut route = String::with_capacity(path.len());
    route.push_str(&path[..second.start()]);
    route.push_str(":id");
    route.push_str(&path[second.end()..]);

    if method == Method::DELETE && route.contains("messages") {
        return format!("{method} {route}");
    }

    if route.contains("/messages/:id/reactions") {
        // reactions are rate limited once across the whole account
        return "/channels/messages/:id/reactions".to_string();
    }

    route
}
