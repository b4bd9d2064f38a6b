use axum::response::Html;

const INDEX_HTML: &str = include_str!("../templates/index.html");

/// Render the upload page, with an optional error message under the form.
pub fn render_index(error: Option<&str>) -> Html<String> {
    let error_html = match error {
        Some(msg) => format!("<p class=\"error\">{}</p>", html_escape(msg)),
        None => String::new(),
    };
    Html(INDEX_HTML.replace("{{ error }}", &error_html))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
