//! Single binary web server: stores tournaments in memory and runs the scheduler on request.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_web::{
    get, post, put,
    web::{self, Bytes, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use court_scheduler::{
    schedule_tournament, GlobalSettings, SchedulableMatch, ScheduleOutcome, ScheduledMatch,
    Tournament, TournamentId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-tournament entry: tournament data + last activity time (for auto-cleanup).
struct TournamentEntry {
    tournament: Tournament,
    last_activity: Instant,
}

/// In-memory state: many tournaments by ID. Entries are removed after 12h inactivity.
type AppState = Data<RwLock<HashMap<TournamentId, TournamentEntry>>>;

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Result of a scheduling run as shown to the operator.
#[derive(Serialize)]
struct ScheduleResponse<'a> {
    complete: bool,
    outcome: &'a ScheduleOutcome,
    /// Every match with its time/court (unassigned ones have none).
    schedule: Vec<ScheduledMatch>,
}

impl<'a> ScheduleResponse<'a> {
    fn new(tournament: &Tournament, outcome: &'a ScheduleOutcome) -> Self {
        Self {
            complete: outcome.is_complete(),
            outcome,
            schedule: outcome.apply_to(&tournament.all_matches()),
        }
    }
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and category name.
#[derive(Deserialize)]
struct CategoryPath {
    id: TournamentId,
    category: String,
}

fn error_json(message: impl ToString) -> serde_json::Value {
    serde_json::json!({ "error": message.to_string() })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-scheduler",
    })
}

/// Create a new tournament (default settings unless a body is sent).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Bytes) -> HttpResponse {
    // empty body: default settings; anything else must be valid settings JSON
    let settings = if body.iter().all(u8::is_ascii_whitespace) {
        GlobalSettings::default()
    } else {
        match serde_json::from_slice::<GlobalSettings>(&body) {
            Ok(settings) => settings,
            Err(e) => return HttpResponse::BadRequest().json(error_json(e)),
        }
    };
    let tournament = Tournament::new(settings);
    let id = tournament.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created tournament {}", id);
    let response = HttpResponse::Ok().json(&tournament);
    g.insert(
        id,
        TournamentEntry {
            tournament,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a tournament by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.tournament)
        }
        None => HttpResponse::NotFound().json(error_json("No tournament")),
    }
}

/// Replace the global settings (courts, windows, duration, tournament window).
#[put("/api/tournaments/{id}/settings")]
async fn api_set_settings(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<GlobalSettings>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(error_json("No tournament")),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    t.set_settings(body.into_inner());
    HttpResponse::Ok().json(t)
}

/// Replace one category's match list (from the group/bracket generators).
#[put("/api/tournaments/{id}/categories/{category}/matches")]
async fn api_set_category_matches(
    state: AppState,
    path: Path<CategoryPath>,
    body: Json<Vec<SchedulableMatch>>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(error_json("No tournament")),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    match t.set_category_matches(&path.category, body.into_inner()) {
        Ok(()) => HttpResponse::Ok().json(t),
        Err(e) => HttpResponse::BadRequest().json(error_json(e)),
    }
}

/// Reschedule every category at once. Runs under the write lock, so runs for the same
/// tournament never interleave.
#[post("/api/tournaments/{id}/schedule")]
async fn api_run_schedule(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(error_json("No tournament")),
    };
    entry.last_activity = Instant::now();
    let t = &mut entry.tournament;
    if let Err(e) = schedule_tournament(t) {
        log::warn!("Tournament {}: configuration error: {}", path.id, e);
        return HttpResponse::BadRequest().json(error_json(e));
    }
    match &t.last_outcome {
        Some(outcome) => HttpResponse::Ok().json(ScheduleResponse::new(t, outcome)),
        None => HttpResponse::InternalServerError().json(error_json("No schedule produced")),
    }
}

/// Last scheduling result (404 if the tournament was never scheduled or changed since).
#[get("/api/tournaments/{id}/schedule")]
async fn api_get_schedule(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(error_json("No tournament")),
    };
    entry.last_activity = Instant::now();
    let t = &entry.tournament;
    match &t.last_outcome {
        Some(outcome) => HttpResponse::Ok().json(ScheduleResponse::new(t, outcome)),
        None => HttpResponse::NotFound().json(error_json("No schedule")),
    }
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_set_settings)
        .service(api_set_category_matches)
        .service(api_run_schedule)
        .service(api_get_schedule);
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, TournamentEntry>::new()));

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(bind)?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};

    fn new_state() -> AppState {
        Data::new(RwLock::new(HashMap::new()))
    }

    /// Creates a tournament with one court open 08:00-09:00 and evaluates to its id.
    macro_rules! create_tournament {
        ($app:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/tournaments")
                .set_json(serde_json::json!({
                    "startTime": "08:00",
                    "endTime": "09:00",
                    "courts": [{ "name": "Q1", "serviceWindows": [{ "startTime": "08:00", "endTime": "09:00" }] }]
                }))
                .to_request();
            let body: serde_json::Value = test::call_and_read_body_json($app, req).await;
            body["id"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn schedule_round_trip() {
        let app = test::init_service(App::new().app_data(new_state()).configure(configure)).await;
        let id = create_tournament!(&app);

        let matches = serde_json::json!([
            { "id": "G1", "category": "Open", "stage": "Grupo A", "isGroupMatch": true,
              "team1": { "name": "Ana", "players": ["Ana"] }, "team2": { "name": "Bia", "players": ["Bia"] } },
            { "id": "G2", "category": "Open", "stage": "Grupo A", "isGroupMatch": true,
              "team1": { "name": "Ana", "players": ["Ana"] }, "team2": { "name": "Caio", "players": ["Caio"] } }
        ]);
        let req = test::TestRequest::put()
            .uri(&format!("/api/tournaments/{}/categories/Open/matches", id))
            .set_json(matches)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{}/schedule", id))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["complete"], true);
        assert_eq!(body["schedule"][0]["time"], "08:00");
        assert_eq!(body["schedule"][1]["time"], "08:20");
        assert_eq!(body["schedule"][1]["court"], "Q1");

        let req = test::TestRequest::get()
            .uri(&format!("/api/tournaments/{}/schedule", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn malformed_create_body_is_bad_request() {
        let app = test::init_service(App::new().app_data(new_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/tournaments")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"startTime": "8 o'clock"}"#)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post().uri("/api/tournaments").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["settings"]["estimatedMatchDuration"], 20);
    }

    #[actix_web::test]
    async fn out_of_range_settings_rejected_and_server_keeps_answering() {
        let app = test::init_service(App::new().app_data(new_state()).configure(configure)).await;
        let id = create_tournament!(&app);

        let matches = serde_json::json!([
            { "id": "G1", "category": "Open", "stage": "Grupo A", "isGroupMatch": true,
              "team1": { "name": "Ana", "players": ["Ana"] }, "team2": { "name": "Bia", "players": ["Bia"] } },
            { "id": "F", "category": "Open", "stage": "Final",
              "team1": { "name": "Vencedor de G1" }, "team2": { "name": "Vencedor de G2" },
              "dependencies": ["G1"] }
        ]);
        let req = test::TestRequest::put()
            .uri(&format!("/api/tournaments/{}/categories/Open/matches", id))
            .set_json(matches)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        for settings in [
            serde_json::json!({ "startTime": "08:00", "estimatedMatchDuration": 4294967295u32 }),
            serde_json::json!({ "startTime": "08:00", "dependencyBuffer": 4294967295u32,
                "courts": [{ "name": "Q1", "serviceWindows": [{ "startTime": "08:00", "endTime": "24:00" }] }] }),
        ] {
            let req = test::TestRequest::put()
                .uri(&format!("/api/tournaments/{}/settings", id))
                .set_json(settings)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

            let req = test::TestRequest::post()
                .uri(&format!("/api/tournaments/{}/schedule", id))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = test::read_body_json(resp).await;
            assert!(body["error"].as_str().unwrap().contains("4294967295"));
        }

        // the lock is still healthy
        let req = test::TestRequest::get()
            .uri(&format!("/api/tournaments/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn configuration_error_is_bad_request() {
        let app = test::init_service(App::new().app_data(new_state()).configure(configure)).await;
        let id = create_tournament!(&app);

        let matches = serde_json::json!([
            { "id": "F", "category": "Open", "stage": "Final",
              "team1": { "name": "Vencedor de F" }, "team2": { "name": "Vencedor de X" },
              "dependencies": ["F"] }
        ]);
        let req = test::TestRequest::put()
            .uri(&format!("/api/tournaments/{}/categories/Open/matches", id))
            .set_json(matches)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{}/schedule", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Match F depends on itself");
    }

    #[actix_web::test]
    async fn category_mismatch_rejected() {
        let app = test::init_service(App::new().app_data(new_state()).configure(configure)).await;
        let id = create_tournament!(&app);
        let matches = serde_json::json!([
            { "id": "G1", "category": "Mista", "stage": "Grupo A", "isGroupMatch": true,
              "team1": { "name": "Ana", "players": ["Ana"] }, "team2": { "name": "Bia", "players": ["Bia"] } }
        ]);
        let req = test::TestRequest::put()
            .uri(&format!("/api/tournaments/{}/categories/Open/matches", id))
            .set_json(matches)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_tournament_is_not_found() {
        let app = test::init_service(App::new().app_data(new_state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri(&format!("/api/tournaments/{}/schedule", uuid::Uuid::new_v4()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
