//! Single binary web server: game clock sessions and the local ranking via REST, static UI from STATIC_DIR.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DATA_DIR (rankings file), STATIC_DIR (UI assets).

use actix_files::Files;
use actix_web::{
    delete, get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use game_clock_web::{
    adjust_bulk_time, adjust_individual_time, cancel_reset, clear_all, confirm_reset,
    discard_completed_game, export_csv, load_rankings, manual_end, pause, record_player_action,
    request_reset, resolve_timeout, resume, save_completed_game, save_rankings, standings, tick,
    undo, ClockError, ClockEvent, ClockRules, FileStore, GameRecord, GameSession, GameSettings,
    MatchGroup, RandomIds, SaveRequest, SessionId, Standing, SystemClock, TickOutcome,
    TimeoutDecision,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Per-session entry: the clock + last activity time (for auto-cleanup).
struct SessionEntry {
    session: GameSession,
    last_activity: Instant,
}

/// In-memory sessions by ID. Entries are removed after 12h inactivity.
type Sessions = Data<RwLock<HashMap<SessionId, SessionEntry>>>;

/// Ranking collection and the store it is persisted to.
struct Rankings {
    groups: RwLock<Vec<MatchGroup>>,
    store: FileStore,
}

type RankingState = Data<Rankings>;

/// Inactivity threshold: sessions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// The clock advances once per second.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct TimeoutBody {
    decision: TimeoutDecision,
}

#[derive(Deserialize)]
struct TimeDeltaBody {
    delta: i64,
}

#[derive(Deserialize)]
struct SaveBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    winner_id: Option<Uuid>,
}

#[derive(Serialize)]
struct SaveResponse<'a> {
    record: &'a GameRecord,
    /// False when the ranking file could not be written (the record is still kept in memory).
    persisted: bool,
}

#[derive(Serialize)]
struct GroupView<'a> {
    #[serde(flatten)]
    group: &'a MatchGroup,
    standings: Vec<Standing>,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

/// Path segments: session id and player id (e.g. /api/sessions/{id}/players/{player_id})
#[derive(Deserialize)]
struct SessionPlayerPath {
    id: SessionId,
    player_id: Uuid,
}

/// Hand cue events to the audio side. There is no speaker on the server, so they are logged.
fn play_cues(id: SessionId, events: Vec<ClockEvent>) {
    for event in events {
        match event {
            ClockEvent::WarningCue { player_id, volume } => {
                log::debug!("[{}] warning tick for {} at volume {:.2}", id, player_id, volume)
            }
            ClockEvent::WarningStopped => log::debug!("[{}] warning stopped", id),
            ClockEvent::TimeoutAlarm { player_id } => log::info!("[{}] alarm: {} timed out", id, player_id),
            ClockEvent::CompletionChime => log::info!("[{}] game complete", id),
        }
    }
}

fn clock_error(e: ClockError) -> HttpResponse {
    HttpResponse::Conflict().json(serde_json::json!({ "error": e.to_string() }))
}

fn no_session() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No session" }))
}

/// Look up a session, touch it, run `command` on it and answer with the resulting state.
/// A rejected command leaves the session unchanged and answers 409 with the reason.
fn apply<F>(sessions: &Sessions, id: SessionId, command: F) -> HttpResponse
where
    F: FnOnce(&mut GameSession) -> Result<(), ClockError>,
{
    let mut g = match sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    let s = &mut entry.session;
    let result = command(&mut *s);
    play_cues(id, s.drain_events());
    match result {
        Ok(()) => HttpResponse::Ok().json(&*s),
        Err(e) => {
            log::debug!("[{}] command ignored: {}", id, e);
            clock_error(e)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "game-clock-web",
    })
}

/// Default setup form (three players, 10 minutes, 5 second increment).
#[get("/api/settings/defaults")]
async fn api_default_settings() -> HttpResponse {
    HttpResponse::Ok().json(GameSettings::with_defaults(&RandomIds))
}

/// Validate settings and start a new session (returns it with id; client keeps the id).
#[post("/api/sessions")]
async fn api_create_session(sessions: Sessions, body: Json<GameSettings>) -> HttpResponse {
    let settings = body.into_inner();
    if let Err(e) = settings.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }));
    }
    let session = GameSession::start(&settings, ClockRules::default(), &RandomIds);
    let id = session.id;
    let mut g = match sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = g.entry(id).or_insert(SessionEntry {
        session,
        last_activity: Instant::now(),
    });
    HttpResponse::Ok().json(&entry.session)
}

/// Get a session by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/sessions/{id}")]
async fn api_get_session(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, |_| Ok(()))
}

/// Active player finished their move.
#[post("/api/sessions/{id}/action")]
async fn api_player_action(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, record_player_action)
}

#[post("/api/sessions/{id}/pause")]
async fn api_pause(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, pause)
}

#[post("/api/sessions/{id}/resume")]
async fn api_resume(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, resume)
}

/// Eliminate the timed-out player or grant extra time to everyone.
#[post("/api/sessions/{id}/timeout")]
async fn api_resolve_timeout(sessions: Sessions, path: Path<SessionPath>, body: Json<TimeoutBody>) -> HttpResponse {
    apply(&sessions, path.id, |s| resolve_timeout(s, body.decision))
}

/// Adjust every remaining player's clock by `delta` seconds.
#[post("/api/sessions/{id}/time")]
async fn api_adjust_bulk(sessions: Sessions, path: Path<SessionPath>, body: Json<TimeDeltaBody>) -> HttpResponse {
    apply(&sessions, path.id, |s| adjust_bulk_time(s, body.delta))
}

#[post("/api/sessions/{id}/time/add")]
async fn api_add_bulk(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, |s| {
        let step = i64::from(s.rules.bulk_adjustment);
        adjust_bulk_time(s, step)
    })
}

#[post("/api/sessions/{id}/time/remove")]
async fn api_remove_bulk(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, |s| {
        let step = i64::from(s.rules.bulk_adjustment);
        adjust_bulk_time(s, -step)
    })
}

/// Adjust one player's clock by `delta` seconds (paused only).
#[post("/api/sessions/{id}/players/{player_id}/time")]
async fn api_adjust_player(
    sessions: Sessions,
    path: Path<SessionPlayerPath>,
    body: Json<TimeDeltaBody>,
) -> HttpResponse {
    let player_id = path.player_id;
    apply(&sessions, path.id, |s| adjust_individual_time(s, player_id, body.delta))
}

#[post("/api/sessions/{id}/players/{player_id}/time/add")]
async fn api_add_player_time(sessions: Sessions, path: Path<SessionPlayerPath>) -> HttpResponse {
    let player_id = path.player_id;
    apply(&sessions, path.id, |s| {
        let step = i64::from(s.rules.individual_adjustment);
        adjust_individual_time(s, player_id, step)
    })
}

#[post("/api/sessions/{id}/players/{player_id}/time/remove")]
async fn api_remove_player_time(sessions: Sessions, path: Path<SessionPlayerPath>) -> HttpResponse {
    let player_id = path.player_id;
    apply(&sessions, path.id, |s| {
        let step = i64::from(s.rules.individual_adjustment);
        adjust_individual_time(s, player_id, -step)
    })
}

/// Step back to before the last completed turn (leaves the clock paused).
#[post("/api/sessions/{id}/undo")]
async fn api_undo(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, undo)
}

/// End the game by hand; the winner is picked on save.
#[post("/api/sessions/{id}/end")]
async fn api_manual_end(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, manual_end)
}

#[post("/api/sessions/{id}/reset/request")]
async fn api_request_reset(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, request_reset)
}

#[post("/api/sessions/{id}/reset/cancel")]
async fn api_cancel_reset(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, cancel_reset)
}

#[post("/api/sessions/{id}/reset/confirm")]
async fn api_confirm_reset(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, confirm_reset)
}

/// Save the concluded game into the ranking and persist it; the session goes back to setup.
#[post("/api/sessions/{id}/save")]
async fn api_save_game(
    sessions: Sessions,
    rankings: RankingState,
    path: Path<SessionPath>,
    body: Json<SaveBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let request = SaveRequest {
        name: body.name,
        note: body.note,
        winner_id: body.winner_id,
    };
    let mut g = match sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_session(),
    };
    entry.last_activity = Instant::now();
    let mut groups = match rankings.groups.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match save_completed_game(&mut entry.session, &mut groups, &request, &RandomIds, &SystemClock) {
        Ok(record) => {
            let persisted = save_rankings(&rankings.store, &groups);
            play_cues(path.id, entry.session.drain_events());
            HttpResponse::Ok().json(SaveResponse {
                record: &record,
                persisted,
            })
        }
        Err(e) => clock_error(e),
    }
}

/// Drop the concluded game; the session goes back to setup.
#[post("/api/sessions/{id}/discard")]
async fn api_discard_game(sessions: Sessions, path: Path<SessionPath>) -> HttpResponse {
    apply(&sessions, path.id, discard_completed_game)
}

/// All match groups with their win standings.
#[get("/api/rankings")]
async fn api_get_rankings(rankings: RankingState) -> HttpResponse {
    let groups = match rankings.groups.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let view: Vec<GroupView> = groups
        .iter()
        .map(|group| GroupView {
            group,
            standings: standings(group),
        })
        .collect();
    HttpResponse::Ok().json(view)
}

#[get("/api/rankings/export.csv")]
async fn api_export_rankings(rankings: RankingState) -> HttpResponse {
    let groups = match rankings.groups.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match export_csv(&groups) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(("Content-Disposition", "attachment; filename=\"rankings.csv\""))
            .body(csv),
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

/// Forget the whole ranking.
#[delete("/api/rankings")]
async fn api_clear_rankings(rankings: RankingState) -> HttpResponse {
    let mut groups = match rankings.groups.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    clear_all(&mut groups);
    let persisted = save_rankings(&rankings.store, &groups);
    log::info!("Rankings cleared");
    HttpResponse::Ok().json(serde_json::json!({ "ok": true, "persisted": persisted }))
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| default_data_dir());
    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| default_static_dir());
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let store = FileStore::new(&data_dir);
    let groups = load_rankings(&store);
    log::info!("Loaded {} match group(s) from {}", groups.len(), store.dir().display());
    let rankings = Data::new(Rankings {
        groups: RwLock::new(groups),
        store,
    });

    let sessions = Data::new(RwLock::new(HashMap::<SessionId, SessionEntry>::new()));

    // Tick driver: once per second, advance every running clock
    let sessions_ticker = sessions.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let mut g = match sessions_ticker.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            for (id, entry) in g.iter_mut() {
                if let TickOutcome::TimedOut { player_id } = tick(&mut entry.session) {
                    log::info!("[{}] player {} is out of time, waiting for a decision", id, player_id);
                }
                play_cues(*id, entry.session.drain_events());
            }
        }
    });

    // Background task: every 30 minutes, remove sessions inactive for 12+ hours
    let sessions_cleanup = sessions.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match sessions_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive session(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(sessions.clone())
            .app_data(rankings.clone())
            .service(api_health)
            .service(favicon)
            .service(api_default_settings)
            .service(api_create_session)
            .service(api_get_session)
            .service(api_player_action)
            .service(api_pause)
            .service(api_resume)
            .service(api_resolve_timeout)
            .service(api_adjust_bulk)
            .service(api_add_bulk)
            .service(api_remove_bulk)
            .service(api_adjust_player)
            .service(api_add_player_time)
            .service(api_remove_player_time)
            .service(api_undo)
            .service(api_manual_end)
            .service(api_request_reset)
            .service(api_cancel_reset)
            .service(api_confirm_reset)
            .service(api_save_game)
            .service(api_discard_game)
            .service(api_get_rankings)
            .service(api_export_rankings)
            .service(api_clear_rankings)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind(bind)?
    .run()
    .await
}
