//! Browser UI entry page with language negotiation

use std::path::{Path, PathBuf};

use axum::{
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use super::types::ApiError;

const INDEX_PAGE: &str = "index.html";
const CHINESE_INDEX_PAGE: &str = "index-zh.html";

/// Country codes served the Chinese page when nothing else decides
const CHINESE_REGIONS: [&str; 5] = ["CN", "HK", "MO", "TW", "SG"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Chinese,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexParams {
    pub lang: Option<String>,
}

/// Pick the page language.
///
/// The first non-empty source wins: `lang` query parameter, `lang` cookie,
/// then the visitor's country (`cf-ipcountry` or `x-country-code`), then
/// `Accept-Language`. Explicit choices other than `zh` mean English.
pub fn preferred_language(lang: Option<&str>, headers: &HeaderMap) -> Language {
    let explicit = lang
        .map(str::to_lowercase)
        .filter(|l| !l.is_empty())
        .or_else(|| cookie(headers, "lang").map(str::to_lowercase).filter(|l| !l.is_empty()));

    if let Some(lang) = explicit {
        return if lang == "zh" {
            Language::Chinese
        } else {
            Language::English
        };
    }

    let country = header_str(headers, "cf-ipcountry")
        .or_else(|| header_str(headers, "x-country-code"))
        .unwrap_or_default()
        .to_uppercase();
    if CHINESE_REGIONS.contains(&country.as_str()) {
        return Language::Chinese;
    }

    let accept = header_str(headers, header::ACCEPT_LANGUAGE.as_str())
        .unwrap_or_default()
        .to_lowercase();
    if accept.starts_with("zh") {
        Language::Chinese
    } else {
        Language::English
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Serve the localized index page, falling back to `index.html`
pub async fn index_page(static_dir: PathBuf, params: IndexParams, headers: HeaderMap) -> Response {
    let language = preferred_language(params.lang.as_deref(), &headers);

    let mut candidates = Vec::with_capacity(2);
    if language == Language::Chinese {
        candidates.push(CHINESE_INDEX_PAGE);
    }
    candidates.push(INDEX_PAGE);

    for page in candidates {
        if let Some(body) = read_page(&static_dir, page).await {
            debug!(page, ?language, "Serving index page");
            return Html(body).into_response();
        }
    }

    ApiError::not_found("Not found").into_response()
}

async fn read_page(dir: &Path, page: &str) -> Option<Vec<u8>> {
    tokio::fs::read(dir.join(page)).await.ok()
}
