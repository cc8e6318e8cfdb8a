use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;

use paperdigest_core::SummaryLength;
use paperdigest_ingest::DigestOptions;

use crate::pipeline::{self, PipelineError};
use crate::state::AppState;
use crate::template;

#[derive(Debug, Deserialize)]
pub struct DigestForm {
    #[serde(default)]
    pub topic: String,
    /// Empty when the field was left blank.
    #[serde(default)]
    pub length: Option<String>,
}

pub async fn digest(State(state): State<Arc<AppState>>, Form(form): Form<DigestForm>) -> Response {
    let topic = form.topic.trim().to_string();
    let default_length = state.settings.length;

    if topic.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            template::render_index("", Some("Please enter a topic."), default_length),
        )
            .into_response();
    }

    // A length from the form applies to both summaries.
    let options = match form.length.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => DigestOptions::from(&state.settings),
        Some(raw) => match raw.parse::<SummaryLength>() {
            Ok(length) => DigestOptions {
                length,
                aggregate_length: length,
                keep_files: false,
            },
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    template::render_index(&topic, Some(&e.to_string()), default_length),
                )
                    .into_response();
            }
        },
    };

    match pipeline::run(Arc::clone(&state), &topic, options).await {
        Ok(page) => template::render_result(&topic, &page).into_response(),
        Err(e) => {
            tracing::warn!(topic = %topic, error = %e, "digest failed");
            let status = match e {
                PipelineError::Portal(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                template::render_index(&topic, Some(&e.to_string()), default_length),
            )
                .into_response()
        }
    }
}
