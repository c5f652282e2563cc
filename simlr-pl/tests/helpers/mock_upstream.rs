//! In-process stand-in for the external services
//!
//! Serves Last.fm-style JSON on `/2.0/`, a search result page on `/results`,
//! and a batch playlist endpoint on `/watch_videos` that redirects to a
//! `/watch?...&list=<token>` location.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use simlr_common::config::TomlConfig;

pub const HINT: &str = ", video";

/// Behavior of the mock services
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Seed → similar artist names (seeds not listed get a Last.fm error document)
    pub similar: HashMap<String, Vec<String>>,
    /// Artist → top track titles (artists not listed get `default_tracks` titles)
    pub tracks: HashMap<String, Vec<String>>,
    pub default_tracks: usize,
    /// Artist → artificial latency for its lookups
    pub delays_ms: HashMap<String, u64>,
    /// Artists whose search page carries no watch link
    pub no_video: HashSet<String>,
    /// Search requests answered with HTTP 500
    pub search_error: bool,
    /// Playlist redirect without the `list=` marker
    pub omit_list_marker: bool,
}

/// Requests observed by the mock
#[derive(Debug, Default)]
pub struct Recorded {
    pub similar_limits: Vec<String>,
    pub api_keys: Vec<String>,
    pub search_queries: Vec<String>,
    pub batches: Vec<Vec<String>>,
}

struct MockState {
    behavior: MockBehavior,
    recorded: Mutex<Recorded>,
}

/// Running mock server
pub struct MockUpstream {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start(behavior: MockBehavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/2.0/", get(lastfm))
            .route("/results", get(search))
            .route("/watch_videos", get(watch_videos))
            .route("/watch", get(watch))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Configuration pointing every endpoint at this server
    pub fn config(&self) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.endpoints.lastfm_url = format!("{}/2.0/", self.base_url);
        config.endpoints.video_search_url = format!("{}/results", self.base_url);
        config.endpoints.video_origin = self.base_url.clone();
        config.endpoints.playlist_url = format!("{}/watch_videos", self.base_url);
        config.pipeline.request_timeout_secs = 5;
        config.pipeline.rng_seed = Some(42);
        config
    }

    pub fn recorded<T>(&self, read: impl FnOnce(&Recorded) -> T) -> T {
        let recorded = self.state.recorded.lock().unwrap();
        read(&*recorded)
    }
}

/// Video id the mock search returns for an artist
pub fn video_id_for(artist: &str) -> String {
    artist
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Playlist token the mock derives from a batch
pub fn token_for(ids: &[String]) -> String {
    format!("TL{}", ids.join("_"))
}

pub fn artist_names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{} {}", prefix, i)).collect()
}

async fn delay_for(state: &MockState, artist: &str) {
    if let Some(ms) = state.behavior.delays_ms.get(artist) {
        tokio::time::sleep(Duration::from_millis(*ms)).await;
    }
}

async fn lastfm(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let method = params.get("method").cloned().unwrap_or_default();
    let artist = params.get("artist").cloned().unwrap_or_default();
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(50);

    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.api_keys.push(params.get("api_key").cloned().unwrap_or_default());
        if method == "artist.getsimilar" {
            recorded.similar_limits.push(params.get("limit").cloned().unwrap_or_default());
        }
    }

    if params.get("format").map(String::as_str) != Some("json") {
        return (StatusCode::BAD_REQUEST, "format=json required").into_response();
    }

    match method.as_str() {
        "artist.getsimilar" => match state.behavior.similar.get(&artist) {
            Some(names) => {
                let entries: Vec<_> = names
                    .iter()
                    .take(limit)
                    .map(|name| json!({"name": name, "match": "0.5"}))
                    .collect();
                Json(json!({"similarartists": {"artist": entries, "@attr": {"artist": artist}}}))
                    .into_response()
            }
            None => Json(json!({
                "error": 6,
                "message": "The artist you supplied could not be found"
            }))
            .into_response(),
        },
        "artist.gettoptracks" => {
            delay_for(&state, &artist).await;
            let titles = state.behavior.tracks.get(&artist).cloned().unwrap_or_else(|| {
                (1..=state.behavior.default_tracks)
                    .map(|i| format!("{} song {}", artist, i))
                    .collect()
            });
            let entries: Vec<_> = titles
                .iter()
                .take(limit)
                .map(|title| json!({"name": title, "playcount": "100"}))
                .collect();
            Json(json!({"toptracks": {"track": entries, "@attr": {"artist": artist}}}))
                .into_response()
        }
        _ => (StatusCode::BAD_REQUEST, "unknown method").into_response(),
    }
}

async fn search(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = params.get("search_query").cloned().unwrap_or_default();
    state.recorded.lock().unwrap().search_queries.push(query.clone());

    if state.behavior.search_error {
        return (StatusCode::INTERNAL_SERVER_ERROR, "search unavailable").into_response();
    }

    // "<title> - <artist><hint>"
    let artist = query
        .rsplit_once(" - ")
        .map(|(_, rest)| rest.trim_end_matches(HINT).to_string())
        .unwrap_or_default();
    delay_for(&state, &artist).await;

    let results = if state.behavior.no_video.contains(&artist) {
        r#"<a href="/channel/UCnothing">Nothing here</a>"#.to_string()
    } else {
        format!(
            r#"<a href="/channel/UC{id}">Channel</a>
               <a class="yt-uix-tile-link" href="/watch?v={id}&amp;pp=1">{artist}</a>"#,
            id = video_id_for(&artist),
            artist = artist
        )
    };

    Html(format!("<html><body><div id=\"results\">{}</div></body></html>", results)).into_response()
}

async fn watch_videos(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let ids: Vec<String> = params
        .get("video_ids")
        .map(|joined| joined.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    state.recorded.lock().unwrap().batches.push(ids.clone());

    let first = ids.first().cloned().unwrap_or_default();
    let location = if state.behavior.omit_list_marker {
        format!("/watch?v={}", first)
    } else {
        format!("/watch?v={}&list={}", first, token_for(&ids))
    };

    Redirect::to(&location).into_response()
}

async fn watch() -> Html<&'static str> {
    Html("<html><body>player</body></html>")
}
