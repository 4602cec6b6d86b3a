use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, HeaderValue, StatusCode}, routing::{get, post}, Json, Router};
use llm::{suggest_titles_or_offline, TextGenerator};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storycore::corpus::{chat_context, insights, recommend, Insights, Recommendation};
use storycore::store::new_record;
use storycore::suggest::{extract_keywords, extract_tags, role_themes, suggest_incidents, DEFAULT_TAGS, ROLES};
use storycore::{SemanticIndex, StoryRecord, StoryStore};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;
const PERSONAL_THEMES: usize = 4;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 5 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub num_docs: usize,
    pub results: Vec<Recommendation>,
}

#[derive(Deserialize)]
pub struct NewStory {
    #[serde(default)]
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct TitlesResponse {
    pub titles: Vec<String>,
}

#[derive(Deserialize)]
pub struct IncidentsRequest {
    pub role: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Draft body; keywords are pulled from it when none are given.
    pub body: Option<String>,
}

#[derive(Serialize)]
pub struct IdeasResponse {
    pub ideas: Vec<String>,
}

#[derive(Deserialize)]
pub struct TagsRequest {
    #[serde(default)]
    pub text: String,
    pub candidates: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub recommendations: Vec<Recommendation>,
    pub answer: Option<String>,
}

#[derive(Deserialize)]
pub struct RoleParams {
    pub role: String,
}

#[derive(Serialize)]
pub struct PersonalizedResponse {
    pub role: String,
    pub themes: Vec<String>,
    pub ideas: Vec<String>,
    pub stories: Vec<Recommendation>,
}

#[derive(Serialize)]
pub struct RoleInfo {
    pub role: &'static str,
    pub themes: &'static [&'static str],
}

/// A fitted index together with the records it was fitted from.
#[derive(Default)]
pub struct Snapshot {
    pub index: SemanticIndex,
    pub records: Vec<StoryRecord>,
}

impl Snapshot {
    pub fn build(records: Vec<StoryRecord>) -> Self {
        let mut index = SemanticIndex::new();
        index.fit_records(&records);
        Self { index, records }
    }
}

/// Startup settings for the HTTP app.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub store_path: String,
    /// Token required in `X-ADMIN-TOKEN` for admin routes; admin routes are closed when unset.
    pub admin_token: Option<String>,
    /// Allowed CORS origins; any origin when empty.
    pub cors_origins: Vec<HeaderValue>,
}

impl AppConfig {
    /// Store path from the caller, `ADMIN_TOKEN` and comma-separated `CORS_ALLOW_ORIGIN` from the environment.
    pub fn from_env(store_path: impl Into<String>) -> Self {
        let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOW_ORIGIN")
            .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
            .unwrap_or_default();
        Self { store_path: store_path.into(), admin_token: std::env::var("ADMIN_TOKEN").ok(), cors_origins }
    }

    fn cors(&self) -> CorsLayer {
        let origin = if self.cors_origins.is_empty() { AllowOrigin::from(Any) } else { AllowOrigin::list(self.cors_origins.clone()) };
        CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: StoryStore,
    pub snapshot: Arc<RwLock<Arc<Snapshot>>>,
    /// Held across list, fit and swap so an older listing never replaces a newer snapshot.
    refit_guard: Arc<Mutex<()>>,
    pub generator: TextGenerator,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(store: StoryStore, generator: TextGenerator, admin_token: Option<String>) -> Self {
        Self {
            store,
            snapshot: Arc::new(RwLock::new(Arc::new(Snapshot::default()))),
            refit_guard: Arc::new(Mutex::new(())),
            generator,
            admin_token,
        }
    }

    pub fn current(&self) -> Arc<Snapshot> { self.snapshot.read().clone() }

    /// Rebuild the index from the store and swap it in; readers keep their old snapshot.
    pub fn refit(&self) -> Result<usize> {
        let _guard = self.refit_guard.lock();
        let snapshot = Snapshot::build(self.store.list()?);
        let n = snapshot.records.len();
        *self.snapshot.write() = Arc::new(snapshot);
        Ok(n)
    }
}

pub fn build_app(config: AppConfig, generator: TextGenerator) -> Result<Router> {
    let store = StoryStore::new(&config.store_path);
    store.ensure()?;
    let app_state = AppState::new(store, generator, config.admin_token.clone());
    let n = app_state.refit()?;
    tracing::info!(stories = n, store = %config.store_path, "loaded story store");

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/roles", get(roles_handler))
        .route("/search", get(search_handler))
        .route("/stories", get(list_stories).post(add_story))
        .route("/titles", post(titles_handler))
        .route("/incidents", post(incidents_handler))
        .route("/tags", post(tags_handler))
        .route("/chat", post(chat_handler))
        .route("/personalized", get(personalized_handler))
        .route("/insights", get(insights_handler))
        .route("/index/refresh", post(refresh_index))
        .with_state(app_state)
        .layer(config.cors())
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let snap = state.current();
    let k = params.k.min(MAX_K);
    let results = recommend(&snap.index, &snap.records, &params.q, k);
    Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), num_docs: snap.index.len(), results })
}

async fn roles_handler() -> Json<Vec<RoleInfo>> {
    Json(ROLES.iter().map(|r| RoleInfo { role: *r, themes: role_themes(r) }).collect())
}

async fn list_stories(State(state): State<AppState>) -> Json<Vec<StoryRecord>> {
    Json(state.current().records.clone())
}

async fn add_story(State(state): State<AppState>, Json(story): Json<NewStory>) -> Result<(StatusCode, Json<StoryRecord>), (StatusCode, String)> {
    let record = new_record(&story.title, &story.body, story.tags);
    state.store.append(&record).map_err(internal)?;
    state.refit().map_err(internal)?;
    tracing::info!(id = %record.id, "saved story");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn titles_handler(State(state): State<AppState>, Json(req): Json<TextRequest>) -> Json<TitlesResponse> {
    Json(TitlesResponse { titles: suggest_titles_or_offline(&state.generator, &req.text).await })
}

async fn incidents_handler(Json(req): Json<IncidentsRequest>) -> Json<IdeasResponse> {
    let keywords = match (&req.body, req.keywords.is_empty()) {
        (Some(body), true) => {
            // inline tips only make sense once something has been written
            if body.trim().is_empty() { return Json(IdeasResponse { ideas: vec![] }); }
            extract_keywords(body)
        }
        _ => req.keywords,
    };
    let ideas = suggest_incidents(&req.role, &keywords, &mut rand::thread_rng());
    Json(IdeasResponse { ideas })
}

async fn tags_handler(Json(req): Json<TagsRequest>) -> Json<TagsResponse> {
    let tags = match &req.candidates {
        Some(c) => extract_tags(&req.text, c),
        None => extract_tags(&req.text, DEFAULT_TAGS),
    };
    Json(TagsResponse { tags })
}

async fn chat_handler(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let snap = state.current();
    let recommendations = recommend(&snap.index, &snap.records, &req.query, req.k.min(MAX_K));
    let answer = state.generator.chat_answer(&req.query, &chat_context(&snap.records)).await;
    Json(ChatResponse { recommendations, answer: Some(answer).filter(|a| !a.is_empty()) })
}

async fn personalized_handler(State(state): State<AppState>, Query(params): Query<RoleParams>) -> Json<PersonalizedResponse> {
    let snap = state.current();
    let mut ideas = suggest_incidents(&params.role, &[], &mut rand::thread_rng());
    ideas.truncate(PERSONAL_THEMES);
    let stories = recommend(&snap.index, &snap.records, &params.role, default_k());
    let themes = role_themes(&params.role).iter().map(|t| t.to_string()).collect();
    Json(PersonalizedResponse { role: params.role, themes, ideas, stories })
}

async fn insights_handler(State(state): State<AppState>) -> Json<Insights> {
    Json(insights(&state.current().records))
}

async fn refresh_index(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let n = state.refit().map_err(internal)?;
    Ok(Json(serde_json::json!({ "num_docs": n })))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let Some(required) = state.admin_token.as_deref() else {
        return Err((StatusCode::UNAUTHORIZED, "admin routes are disabled".into()));
    };
    match headers.get("X-ADMIN-TOKEN").map(HeaderValue::as_bytes) {
        Some(provided) if provided == required.as_bytes() => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "invalid admin token".into())),
    }
}
