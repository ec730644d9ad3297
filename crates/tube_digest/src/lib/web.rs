//! Single page form for summarizing a video from the browser.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::{llm::tokenizer::TokenCounter, yt::TranscriptLoader, Summarizer, SummaryDispatcher};

pub const DEFAULT_PORT: u16 = 8501;

#[derive(Debug, Deserialize)]
pub struct SummaryForm {
    #[serde(default)]
    pub video_url: String,
}

enum Notice<'a> {
    Summary(&'a str),
    Advisory(&'a str),
}

pub fn create_router<L, S, C>(dispatcher: Arc<SummaryDispatcher<L, S, C>>) -> Router
where
    L: TranscriptLoader + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    C: TokenCounter + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(show_form).post(submit_form::<L, S, C>))
        .route("/health", get(health_check))
        .with_state(dispatcher)
}

/// Serves the form until `shutdown` is cancelled.
pub async fn run_server<L, S, C>(
    dispatcher: Arc<SummaryDispatcher<L, S, C>>,
    port: u16,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    L: TranscriptLoader + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    C: TokenCounter + Send + Sync + 'static,
{
    let app = create_router(dispatcher).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening for summary requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn show_form() -> Html<String> {
    Html(render_page("", None))
}

async fn submit_form<L, S, C>(
    State(dispatcher): State<Arc<SummaryDispatcher<L, S, C>>>,
    Form(form): Form<SummaryForm>,
) -> (StatusCode, Html<String>)
where
    L: TranscriptLoader + Send + Sync + 'static,
    S: Summarizer + Send + Sync + 'static,
    C: TokenCounter + Send + Sync + 'static,
{
    match dispatcher.summarize_input(&form.video_url).await {
        Ok(summary) => (
            StatusCode::OK,
            Html(render_page(
                &form.video_url,
                Some(Notice::Summary(&summary.text)),
            )),
        ),
        Err(e) => {
            let status = if e.is_configuration() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            (
                status,
                Html(render_page(
                    &form.video_url,
                    Some(Notice::Advisory(e.advisory())),
                )),
            )
        }
    }
}

fn render_page(video_url: &str, notice: Option<Notice<'_>>) -> String {
    let notice = match notice {
        Some(Notice::Summary(text)) => {
            format!(r#"<div class="summary">{}</div>"#, escape_html(text))
        }
        Some(Notice::Advisory(text)) => {
            format!(r#"<div class="advisory" role="alert">{}</div>"#, escape_html(text))
        }
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Summarize YouTube videos</title>
<style>
body {{ font-family: sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; }}
textarea {{ width: 100%; }}
.summary {{ background: #e8f1fb; padding: 1rem; white-space: pre-wrap; }}
.advisory {{ background: #fdf3e1; padding: 1rem; }}
</style>
</head>
<body>
<h1>&#9889; Summarize YouTube videos &#9889;</h1>
<h3>So you can save time for what matters.</h3>
<form method="post" action="/">
<label for="video_url">Paste the URL of the YouTube video you want summarized:</label>
<textarea id="video_url" name="video_url" rows="2">{video_url}</textarea>
<button type="submit">Get my summary</button>
</form>
{notice}
</body>
</html>
"#,
        video_url = escape_html(video_url),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
