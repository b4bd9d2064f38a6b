use axum::response::Html;

use crate::template;

pub async fn index() -> Html<String> {
    template::render_index(None)
}
