//! Single binary web server: JSON API over the roster, roster search, and brackets.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! ROSTER_CSV preloads a roster (dojo,team,member,rank); SEARCH_MIN_SCORE sets the match threshold.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use kendo_tournament_web::search::{
    highlight, search, suggest, MemoryStore, SearchHistory, DEFAULT_MAX_SUGGESTIONS,
    DEFAULT_MIN_SCORE,
};
use kendo_tournament_web::{
    generate, seed_order, summarize, Bracket, MatchId, Rank, Roster, Team, TeamId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Unique identifier for a stored bracket.
type BracketId = Uuid;

/// Per-bracket entry: bracket data + timestamps (last_activity drives auto-cleanup).
struct BracketEntry {
    bracket: Bracket,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_activity: Instant,
}

/// In-memory state: the roster, brackets by id, and recent searches.
struct ServerState {
    roster: Roster,
    brackets: HashMap<BracketId, BracketEntry>,
    history: SearchHistory<MemoryStore>,
    min_score: f64,
}

type AppState = Data<RwLock<ServerState>>;

/// Inactivity threshold: brackets not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Settings read from the environment at startup.
struct Config {
    host: String,
    port: u16,
    roster_csv: Option<String>,
    min_score: f64,
}

impl Config {
    fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            roster_csv: std::env::var("ROSTER_CSV").ok().filter(|p| !p.is_empty()),
            min_score: std::env::var("SEARCH_MIN_SCORE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MIN_SCORE),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct BracketResponse {
    id: BracketId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    summary: kendo_tournament_web::BracketSummary,
}

impl BracketResponse {
    fn new(id: BracketId, entry: &BracketEntry) -> Self {
        Self {
            id,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            summary: summarize(&entry.bracket),
        }
    }
}

#[derive(Deserialize)]
struct AddDojoBody {
    name: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    #[serde(default)]
    dojo_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct AddMemberBody {
    full_name: String,
    #[serde(default)]
    rank: Rank,
    #[serde(default)]
    team_id: Option<TeamId>,
}

#[derive(Deserialize)]
struct AssignTeamBody {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct SeedBody {
    seed_rank: Option<u32>,
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    min_score: Option<f64>,
}

#[derive(Deserialize)]
struct SuggestParams {
    #[serde(default)]
    q: String,
    max: Option<usize>,
}

#[derive(Deserialize)]
struct HighlightParams {
    text: String,
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
struct CreateBracketBody {
    /// Teams in seed order. When absent, every roster team is used, ordered by seed rank.
    #[serde(default)]
    team_ids: Option<Vec<TeamId>>,
}

#[derive(Deserialize)]
struct RecordResultBody {
    winner: TeamId,
}

/// Path segment: entity id (e.g. /api/members/{id}/team)
#[derive(Deserialize)]
struct IdPath {
    id: Uuid,
}

/// Path segments: bracket id and match id (e.g. /api/brackets/{id}/matches/{match_id}/winner)
#[derive(Deserialize)]
struct MatchPath {
    id: BracketId,
    match_id: MatchId,
}

fn bad_request(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn no_bracket() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No bracket" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "kendo-tournament-web",
    })
}

/// Full roster: dojos, teams, members.
#[get("/api/roster")]
async fn api_get_roster(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(&g.roster)
}

#[post("/api/dojos")]
async fn api_add_dojo(state: AppState, body: Json<AddDojoBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    match g.roster.add_dojo(&body.name, body.location) {
        Ok(_) => HttpResponse::Ok().json(&g.roster),
        Err(e) => bad_request(e),
    }
}

#[post("/api/teams")]
async fn api_add_team(state: AppState, body: Json<AddTeamBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.roster.add_team(&body.name, body.dojo_id) {
        Ok(_) => HttpResponse::Ok().json(&g.roster),
        Err(e) => bad_request(e),
    }
}

/// Add a member, optionally straight onto a team.
#[post("/api/members")]
async fn api_add_member(state: AppState, body: Json<AddMemberBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.roster.add_member_to_team(&body.full_name, body.rank, body.team_id) {
        Ok(_) => HttpResponse::Ok().json(&g.roster),
        Err(e) => bad_request(e),
    }
}

#[put("/api/members/{id}/team")]
async fn api_assign_member(
    state: AppState,
    path: Path<IdPath>,
    body: Json<AssignTeamBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.roster.assign_member(path.id, body.team_id) {
        Ok(()) => HttpResponse::Ok().json(&g.roster),
        Err(e) => bad_request(e),
    }
}

#[delete("/api/members/{id}/team")]
async fn api_unassign_member(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.roster.unassign_member(path.id) {
        Ok(()) => HttpResponse::Ok().json(&g.roster),
        Err(e) => bad_request(e),
    }
}

#[put("/api/teams/{id}/seed")]
async fn api_set_seed(state: AppState, path: Path<IdPath>, body: Json<SeedBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.roster.set_seed_rank(path.id, body.seed_rank) {
        Ok(()) => HttpResponse::Ok().json(&g.roster),
        Err(e) => bad_request(e),
    }
}

/// Ranked search over the roster. Non-empty queries are added to the history.
#[get("/api/search")]
async fn api_search(state: AppState, params: Query<SearchParams>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let min_score = params.min_score.unwrap_or(g.min_score);
    let r = &g.roster;
    let results = search(&r.dojos, &r.teams, &r.members, &params.q, min_score);
    g.history.record(&params.q);
    HttpResponse::Ok().json(results)
}

#[get("/api/search/suggest")]
async fn api_suggest(state: AppState, params: Query<SuggestParams>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let r = &g.roster;
    let max = params.max.unwrap_or(DEFAULT_MAX_SUGGESTIONS);
    HttpResponse::Ok().json(suggest(&r.dojos, &r.teams, &r.members, &params.q, max))
}

#[get("/api/search/highlight")]
async fn api_highlight(params: Query<HighlightParams>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "markup": highlight(&params.text, &params.q) }))
}

#[get("/api/search/history")]
async fn api_get_history(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.history.entries())
}

#[delete("/api/search/history")]
async fn api_clear_history(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    g.history.clear();
    HttpResponse::Ok().json(Vec::<String>::new())
}

/// Generate a bracket from the given teams (seed order), or from every roster team by seed rank.
#[post("/api/brackets")]
async fn api_create_bracket(state: AppState, body: Option<Json<CreateBracketBody>>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let team_ids = body.and_then(|b| b.into_inner().team_ids);
    let teams: Vec<Team> = match team_ids {
        Some(ids) => {
            let mut teams = Vec::with_capacity(ids.len());
            for id in ids {
                match g.roster.team(id) {
                    Some(t) => teams.push(t.clone()),
                    None => return bad_request("Team not found"),
                }
            }
            teams
        }
        None => seed_order(&g.roster.teams, &mut rand::thread_rng()),
    };
    let bracket = match generate(&teams) {
        Ok(b) => b,
        Err(e) => return bad_request(e),
    };
    let id = Uuid::new_v4();
    let now = Utc::now();
    let entry = BracketEntry {
        bracket,
        created_at: now,
        updated_at: now,
        last_activity: Instant::now(),
    };
    let response = BracketResponse::new(id, &entry);
    g.brackets.insert(id, entry);
    log::info!("Created bracket {} with {} team(s)", id, teams.len());
    HttpResponse::Ok().json(response)
}

/// Bracket summary (404 if not found). Touching it refreshes last_activity.
#[get("/api/brackets/{id}")]
async fn api_get_bracket(state: AppState, path: Path<IdPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.brackets.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(BracketResponse::new(path.id, entry))
        }
        None => no_bracket(),
    }
}

/// Put a ready match on court.
#[post("/api/brackets/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.brackets.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    match entry.bracket.start_match(path.match_id) {
        Ok(()) => {
            entry.updated_at = Utc::now();
            HttpResponse::Ok().json(BracketResponse::new(path.id, entry))
        }
        Err(e) => bad_request(e),
    }
}

/// Record a match winner. Resubmitting the same winner is accepted; a different one is rejected.
#[put("/api/brackets/{id}/matches/{match_id}/winner")]
async fn api_record_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<RecordResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let entry = match g.brackets.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    match entry.bracket.record_result(path.match_id, body.winner) {
        Ok(()) => {
            entry.updated_at = Utc::now();
            HttpResponse::Ok().json(BracketResponse::new(path.id, entry))
        }
        Err(e) => bad_request(e),
    }
}

fn load_roster(path: &str) -> std::io::Result<Roster> {
    let file = std::fs::File::open(path)?;
    Roster::from_csv(file)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let roster = match &config.roster_csv {
        Some(path) => {
            let roster = load_roster(path)?;
            log::info!(
                "Loaded roster from {}: {} dojo(s), {} team(s), {} member(s)",
                path,
                roster.dojos.len(),
                roster.teams.len(),
                roster.members.len()
            );
            roster
        }
        None => Roster::new(),
    };

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(ServerState {
        roster,
        brackets: HashMap::new(),
        history: SearchHistory::new(MemoryStore::default()),
        min_score: config.min_score,
    }));

    // Background task: every 30 minutes, remove brackets inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.brackets.len();
            g.brackets
                .retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.brackets.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive bracket(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_get_roster)
            .service(api_add_dojo)
            .service(api_add_team)
            .service(api_add_member)
            .service(api_assign_member)
            .service(api_unassign_member)
            .service(api_set_seed)
            .service(api_search)
            .service(api_suggest)
            .service(api_highlight)
            .service(api_get_history)
            .service(api_clear_history)
            .service(api_create_bracket)
            .service(api_get_bracket)
            .service(api_start_match)
            .service(api_record_result)
    })
    .bind(bind)?
    .run()
    .await
}
