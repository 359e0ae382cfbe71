use axum::response::Html;

const DASHBOARD_PAGE: &str = include_str!("../../assets/dashboard.html");

pub async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}
