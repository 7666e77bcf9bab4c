/*
[INPUT]:  Base URL, API token, method path and query parameters
[OUTPUT]: Fully-qualified request target with the token injected
[POS]:    HTTP layer - endpoint construction
[UPDATE]: When changing how targets or auth parameters are composed
*/

use serde_json::{Map, Value};

use super::payload::encode_query;

/// Query parameter carrying the API token
pub const TOKEN_PARAM: &str = "api_token";

/// Build `base_url/path?query`, with `api_token` always set last.
///
/// A caller-supplied `api_token` is overwritten, so the token appears exactly once.
pub fn build_endpoint(base_url: &str, token: &str, path: &str, query: &Map<String, Value>) -> String {
    let mut params = query.clone();
    params.shift_remove(TOKEN_PARAM);
    params.insert(TOKEN_PARAM.to_string(), Value::String(token.to_string()));
    format!("{}/{}?{}", base_url, path, encode_query(&params))
}

/// Replace the token value in a built target so it can be logged.
pub fn redact_token(target: &str) -> String {
    let marker = format!("{TOKEN_PARAM}=");
    let Some(start) = target.find(&marker) else {
        return target.to_string();
    };
    let value_start = start + marker.len();
    let value_end = target[value_start..]
        .find('&')
        .map(|offset| value_start + offset)
        .unwrap_or(target.len());
    format!("{}***{}", &target[..value_start], &target[value_end..])
}
