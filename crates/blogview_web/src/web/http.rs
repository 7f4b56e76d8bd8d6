use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// POST `fields` as `application/x-www-form-urlencoded` and return the body text.
///
/// An empty `url` posts to the current page.
pub(super) async fn post_form(url: &str, fields: &[(&str, &str)]) -> Result<String, String> {
    let window = web_sys::window().ok_or("no window".to_string())?;

    let params =
        web_sys::UrlSearchParams::new().map_err(|_| "form: UrlSearchParams::new failed")?;
    for (k, v) in fields {
        params.append(k, v);
    }

    let target = if url.is_empty() {
        window
            .location()
            .href()
            .map_err(|_| "location: href failed".to_string())?
    } else {
        url.to_string()
    };

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_body(&JsValue::from(params.to_string()));

    let request = web_sys::Request::new_with_str_and_init(&target, &init)
        .map_err(|_| format!("request: invalid URL {target}"))?;
    request
        .headers()
        .set("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")
        .map_err(|_| "request: set header failed".to_string())?;

    let resp = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| format!("POST {target}: network error"))?
        .dyn_into::<web_sys::Response>()
        .map_err(|_| "fetch: expected Response".to_string())?;

    if !resp.ok() {
        return Err(format!("POST {target}: HTTP {}", resp.status()));
    }

    let text = JsFuture::from(resp.text().map_err(|_| "response: text() threw".to_string())?)
        .await
        .map_err(|_| "response: body read failed".to_string())?;
    text.as_string()
        .ok_or_else(|| "response: body is not text".to_string())
}
