//! Bracket controller: JSON API over the engine, one in-memory registry of brackets.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, BRACKET_TTL_HOURS (inactive brackets are dropped).

use actix_web::{
    get, post,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine::{
    build_bracket, compute_standings, forfeit, generate_next_round, report_result, reset_bracket,
    seed_participants, start_match, Bracket, BracketConfig, BracketError, BracketFormat, MatchId,
    Participant, Progress, SeedingMethod, Side,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

type BracketId = Uuid;

/// One stored bracket plus bookkeeping for the API and cleanup.
struct BracketEntry {
    id: BracketId,
    bracket: Bracket,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_activity: Instant,
}

impl BracketEntry {
    fn new(bracket: Bracket) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            bracket,
            created_at: now,
            updated_at: now,
            last_activity: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn modified(&mut self) {
        self.updated_at = Utc::now();
        self.touch();
    }
}

/// Registry of brackets. The map lock is only held for lookups; each bracket has its own
/// mutex, held for the whole of any operation on it.
type Registry = RwLock<HashMap<BracketId, Arc<Mutex<BracketEntry>>>>;
type AppState = Data<Registry>;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Bracket as returned by every endpoint that touches one.
#[derive(Serialize)]
struct BracketView<'a> {
    id: BracketId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    progress: Progress,
    complete: bool,
    bracket: &'a Bracket,
}

impl<'a> From<&'a BracketEntry> for BracketView<'a> {
    fn from(entry: &'a BracketEntry) -> Self {
        Self {
            id: entry.id,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            progress: entry.bracket.progress(),
            complete: entry.bracket.is_complete(),
            bracket: &entry.bracket,
        }
    }
}

#[derive(Deserialize)]
struct CreateBracketBody {
    format: String,
    participants: Vec<Participant>,
    /// Defaults to rating order.
    #[serde(default)]
    seeding: Option<String>,
    /// Makes random seeding reproducible.
    #[serde(default)]
    rng_seed: Option<u64>,
    #[serde(default)]
    config: Option<BracketConfig>,
}

#[derive(Deserialize)]
struct ReportResultBody {
    score_a: u32,
    score_b: u32,
    #[serde(default)]
    forfeit: bool,
}

#[derive(Deserialize)]
struct ForfeitBody {
    /// The side giving up the match.
    side: Side,
}

#[derive(Deserialize)]
struct BracketPath {
    id: BracketId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: BracketId,
    match_id: MatchId,
}

fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "kind": e.kind() });
    match e {
        BracketError::MatchNotFound(_) => HttpResponse::NotFound().json(body),
        BracketError::BracketInProgress { .. } | BracketError::MatchClosed(_) => {
            HttpResponse::Conflict().json(body)
        }
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn bracket_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No bracket", "kind": "bracket_not_found" }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Find a bracket without holding the registry lock any longer than the lookup.
fn lookup(state: &AppState, id: BracketId) -> Result<Arc<Mutex<BracketEntry>>, HttpResponse> {
    let g = state.read().map_err(|_| lock_error())?;
    g.get(&id).cloned().ok_or_else(bracket_not_found)
}

/// Run `op` on a bracket under its lock and answer with the updated bracket.
async fn mutate<F>(state: &AppState, id: BracketId, op: F) -> HttpResponse
where
    F: FnOnce(&mut Bracket) -> Result<(), BracketError>,
{
    let entry = match lookup(state, id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let mut entry = entry.lock().await;
    entry.touch();
    match op(&mut entry.bracket) {
        Ok(()) => {
            entry.modified();
            HttpResponse::Ok().json(BracketView::from(&*entry))
        }
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine",
    })
}

/// Seed the participants, build the bracket and store it under a new id.
#[post("/api/brackets")]
async fn api_create_bracket(state: AppState, body: Json<CreateBracketBody>) -> HttpResponse {
    let body = body.into_inner();
    let format: BracketFormat = match body.format.parse() {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };
    let method = match body
        .seeding
        .as_deref()
        .map(str::parse::<SeedingMethod>)
        .transpose()
    {
        Ok(m) => m.unwrap_or_default(),
        Err(e) => return error_response(&e),
    };
    let seeded = match body.rng_seed {
        Some(seed) => seed_participants(body.participants, method, &mut StdRng::seed_from_u64(seed)),
        None => seed_participants(body.participants, method, &mut rand::thread_rng()),
    };
    let bracket = match seeded.and_then(|p| build_bracket(format, p, body.config.unwrap_or_default())) {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };

    let entry = BracketEntry::new(bracket);
    let id = entry.id;
    let resp = HttpResponse::Ok().json(BracketView::from(&entry));
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    g.insert(id, Arc::new(Mutex::new(entry)));
    log::info!("created {} bracket {}", format, id);
    resp
}

#[get("/api/brackets/{id}")]
async fn api_get_bracket(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let entry = match lookup(&state, path.id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let mut entry = entry.lock().await;
    entry.touch();
    HttpResponse::Ok().json(BracketView::from(&*entry))
}

/// Matches with both participants known and no result yet.
#[get("/api/brackets/{id}/matches/ready")]
async fn api_ready_matches(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let entry = match lookup(&state, path.id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let mut entry = entry.lock().await;
    entry.touch();
    HttpResponse::Ok().json(entry.bracket.ready_matches())
}

#[post("/api/brackets/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let match_id = path.match_id;
    mutate(&state, path.id, |b| start_match(b, match_id)).await
}

#[post("/api/brackets/{id}/matches/{match_id}/result")]
async fn api_report_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    let match_id = path.match_id;
    mutate(&state, path.id, |b| {
        report_result(b, match_id, body.score_a, body.score_b, body.forfeit)
    })
    .await
}

#[post("/api/brackets/{id}/matches/{match_id}/forfeit")]
async fn api_forfeit(state: AppState, path: Path<MatchPath>, body: Json<ForfeitBody>) -> HttpResponse {
    let match_id = path.match_id;
    mutate(&state, path.id, |b| forfeit(b, match_id, body.side)).await
}

/// Rebuild from the initial seeding; refused once results exist past the threshold.
#[post("/api/brackets/{id}/reset")]
async fn api_reset_bracket(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    mutate(&state, path.id, reset_bracket).await
}

/// Swiss only. Responds with the pairing warnings next to the updated bracket.
#[post("/api/brackets/{id}/rounds/next")]
async fn api_next_round(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let entry = match lookup(&state, path.id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let mut entry = entry.lock().await;
    entry.touch();
    match generate_next_round(&mut entry.bracket) {
        Ok(warnings) => {
            entry.modified();
            HttpResponse::Ok().json(serde_json::json!({
                "warnings": warnings,
                "bracket": BracketView::from(&*entry),
            }))
        }
        Err(e) => error_response(&e),
    }
}

#[get("/api/brackets/{id}/standings")]
async fn api_standings(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let entry = match lookup(&state, path.id) {
        Ok(entry) => entry,
        Err(resp) => return resp,
    };
    let mut entry = entry.lock().await;
    entry.touch();
    HttpResponse::Ok().json(compute_standings(&entry.bracket))
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_bracket)
        .service(api_get_bracket)
        .service(api_ready_matches)
        .service(api_start_match)
        .service(api_report_result)
        .service(api_forfeit)
        .service(api_reset_bracket)
        .service(api_next_round)
        .service(api_standings);
}

/// Drop brackets nobody touched within `ttl`. Brackets currently locked are in use and kept.
fn sweep(state: &Registry, ttl: Duration) -> usize {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return 0,
    };
    let before = g.len();
    g.retain(|_, entry| match entry.try_lock() {
        Ok(entry) => entry.last_activity.elapsed() < ttl,
        Err(_) => true,
    });
    before - g.len()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ttl_hours() -> u64 {
    12
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let ttl_hours: u64 = std::env::var("BRACKET_TTL_HOURS")
        .ok()
        .and_then(|h| h.parse().ok())
        .unwrap_or_else(default_ttl_hours);
    let ttl = Duration::from_secs(ttl_hours * 3600);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(RwLock::new(HashMap::new()));

    // Background task: every 30 minutes, remove brackets inactive for the TTL
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sweep(&state_cleanup, ttl);
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive bracket(s) (no activity for {}h)",
                    removed,
                    ttl_hours
                );
            }
        }
    });

    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind(bind)?
        .run()
        .await
}
