//! The two server-rendered pages: the viewer shell and the CloudKit sign-in relay.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    response::Html,
};
use std::fmt::Write;

use crate::router::TxirimiriState;

const CK_WEB_AUTH_TOKEN: &str = "ckWebAuthToken";

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// GET / -> viewer shell; the client scripts read the CloudKit token from the meta tag.
/// The client reads `csrfmiddlewaretoken` before every write; requests are not CSRF-checked.
pub async fn index(State(state): State<TxirimiriState>) -> Html<String> {
    let token = escape_html(&state.cloudkit_token);
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="cloudkit-api-token" content="{token}">
<title>txirimiri</title>
</head>
<body>
<div id="app"></div>
<input type="hidden" name="csrfmiddlewaretoken" value="">
<script src="https://cdn.apple-cloudkit.com/ck/2/cloudkit.js"></script>
<script type="module" src="/static/txirimiri/index.js"></script>
</body>
</html>
"#
    ))
}

/// Query string pairs followed by urlencoded body pairs (POST only).
fn collect_params(method: &Method, uri: &Uri, body: &[u8]) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = uri
        .query()
        .map(|qs| url::form_urlencoded::parse(qs.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    if *method == Method::POST && !body.is_empty() {
        params.extend(url::form_urlencoded::parse(body).into_owned());
    }
    params
}

/// GET|POST /authentication -> echo the CloudKit redirect parameters back to the page,
/// where `authentication.js` hands the token to the opener window. No validation here.
pub async fn authentication(method: Method, uri: Uri, body: Bytes) -> Html<String> {
    let params = collect_params(&method, &uri, &body);
    // a POSTed token wins over one in the query string
    let token = params
        .iter()
        .rev()
        .find(|(k, _)| k == CK_WEB_AUTH_TOKEN)
        .map(|(_, v)| v.as_str())
        .unwrap_or_default();

    let mut raw_request = format!("{method} {uri}\n");
    for (k, v) in &params {
        let _ = writeln!(raw_request, "{k} = {v}");
    }

    let token = escape_html(token);
    let raw_request = escape_html(&raw_request);
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>txirimiri - authentication</title>
</head>
<body>
<main id="authentication" data-ck-web-auth-token="{token}">
<h1>Authentication</h1>
<p>{CK_WEB_AUTH_TOKEN}: <code id="ck-web-auth-token">{token}</code></p>
<pre id="raw-request">{raw_request}</pre>
</main>
<script type="module" src="/static/txirimiri/authentication.js"></script>
</body>
</html>
"#
    ))
}
