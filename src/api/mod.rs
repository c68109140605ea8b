use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::db::{create_pool, init_database_with_pool, resolve_or_create_player};
use crate::error::{Result, ScoringError};
use crate::models::{
    ApiResponse, ChampionPickInput, Identity, LeaderboardEntry, MatchResultInput,
    MatchResultSummary, OperationResult, PredictionInput, ScoreBetInput, SubmissionReport,
};
use crate::services::{
    LeaderboardRanker, MatchAdmin, ResultEntryOrchestrator, ScoringPolicy, SubmissionGuard,
};
use crate::utils::validate_display_name;

const EMAIL_HEADER: &str = "x-player-email";
const NAME_HEADER: &str = "x-player-name";

#[derive(Clone)]
struct AppState {
    pool: SqlitePool,
    scoring_policy: ScoringPolicy,
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let pool = create_pool(&config.database_url).await?;
    init_database_with_pool(&pool).await?;

    let state = AppState {
        pool,
        scoring_policy: config.scoring_policy,
    };
    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(
        "Matchday API server listening on port {} ({:?} scoring)",
        config.port,
        config.scoring_policy
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/predictions", post(submit_predictions_handler))
        .route("/score-bets", post(submit_score_bet_handler))
        .route("/champion-picks", post(pick_champion_handler))
        .route("/leaderboard", get(get_leaderboard_handler))
        .route("/admin/matches/{id}/result", post(enter_result_handler))
        .route("/admin/matches/{id}/start", post(start_match_handler))
        .route("/admin/teams/{id}/eliminated", post(set_team_eliminated_handler))
        .route("/admin/tournaments/{id}/champion-lock", post(lock_champions_handler))
        .route("/admin/leaderboard/recalculate", post(recalculate_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Reads the caller identity forwarded by the auth proxy.
fn identity_from_headers(headers: &HeaderMap) -> Result<Identity> {
    let email = headers
        .get(EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|email| email.contains('@'))
        .ok_or(ScoringError::Unauthenticated)?;

    let display_name = headers
        .get(NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|name| validate_display_name(name))
        .map(|name| name.trim().to_string());

    Ok(Identity {
        email: email.to_string(),
        display_name,
    })
}

async fn current_player(pool: &SqlitePool, headers: &HeaderMap) -> Result<String> {
    let identity = identity_from_headers(headers)?;
    let mut conn = pool.acquire().await?;
    resolve_or_create_player(&mut conn, &identity).await
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Matchday API is running"))
}

// POST /predictions - Submit a batch of win/draw/lose picks
#[derive(Deserialize)]
struct SubmitPredictionsRequest {
    predictions: Vec<PredictionInput>,
}

async fn submit_predictions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitPredictionsRequest>,
) -> Result<Json<ApiResponse<SubmissionReport>>> {
    let player_id = current_player(&state.pool, &headers).await?;
    let report =
        SubmissionGuard::submit_predictions(&state.pool, &player_id, &request.predictions, Utc::now())
            .await?;
    Ok(Json(ApiResponse::success(report)))
}

// POST /score-bets - Place an exact-score bet
async fn submit_score_bet_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ScoreBetInput>,
) -> Result<Json<ApiResponse<OperationResult>>> {
    let player_id = current_player(&state.pool, &headers).await?;
    let result = SubmissionGuard::submit_score_bet(&state.pool, &player_id, &input, Utc::now()).await?;
    Ok(Json(ApiResponse::success(result)))
}

// POST /champion-picks - Pick or change the tournament champion
async fn pick_champion_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ChampionPickInput>,
) -> Result<Json<ApiResponse<OperationResult>>> {
    let player_id = current_player(&state.pool, &headers).await?;
    let result = SubmissionGuard::pick_champion(&state.pool, &player_id, &input, Utc::now()).await?;
    Ok(Json(ApiResponse::success(result)))
}

// GET /leaderboard - Global board, or one tournament's with ?tournament_id=
#[derive(Deserialize)]
struct LeaderboardQuery {
    tournament_id: Option<String>,
}

async fn get_leaderboard_handler(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let entries = LeaderboardRanker::leaderboard(&state.pool, params.tournament_id.as_deref()).await?;
    Ok(Json(ApiResponse::success(entries)))
}

// POST /admin/matches/{id}/result - Enter the final score and score the match
#[derive(Deserialize)]
struct EnterResultRequest {
    home_score: i32,
    away_score: i32,
}

async fn enter_result_handler(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Json(request): Json<EnterResultRequest>,
) -> Result<Json<ApiResponse<MatchResultSummary>>> {
    let input = MatchResultInput {
        match_id,
        home_score: request.home_score,
        away_score: request.away_score,
    };
    let summary = ResultEntryOrchestrator::new(state.scoring_policy)
        .enter_match_result(&state.pool, &input, Utc::now())
        .await?;
    Ok(Json(ApiResponse::success(summary)))
}

// POST /admin/matches/{id}/start
async fn start_match_handler(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<ApiResponse<OperationResult>>> {
    let result = MatchAdmin::start_match(&state.pool, &match_id, Utc::now()).await?;
    Ok(Json(ApiResponse::success(result)))
}

// POST /admin/teams/{id}/eliminated
#[derive(Deserialize)]
struct EliminatedRequest {
    eliminated: bool,
}

async fn set_team_eliminated_handler(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<EliminatedRequest>,
) -> Result<Json<ApiResponse<OperationResult>>> {
    let result = MatchAdmin::set_team_eliminated(&state.pool, &team_id, request.eliminated).await?;
    Ok(Json(ApiResponse::success(result)))
}

// POST /admin/tournaments/{id}/champion-lock
async fn lock_champions_handler(
    State(state): State<AppState>,
    Path(tournament_id): Path<String>,
) -> Result<Json<ApiResponse<OperationResult>>> {
    let result =
        MatchAdmin::lock_champion_predictions(&state.pool, &tournament_id, Utc::now()).await?;
    Ok(Json(ApiResponse::success(result)))
}

// POST /admin/leaderboard/recalculate - Rebuild stats and ranks
async fn recalculate_handler(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<OperationResult>>> {
    let result = LeaderboardRanker::recalculate(&state.pool, params.tournament_id.as_deref()).await?;
    Ok(Json(ApiResponse::success(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;

    #[test]
    fn test_identity_requires_email_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            identity_from_headers(&headers),
            Err(ScoringError::Unauthenticated)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(EMAIL_HEADER, HeaderValue::from_static("not-an-email"));
        assert!(identity_from_headers(&headers).is_err());
    }

    #[test]
    fn test_identity_reads_optional_name() {
        let mut headers = HeaderMap::new();
        headers.insert(EMAIL_HEADER, HeaderValue::from_static(" ana@example.com "));
        let identity = identity_from_headers(&headers).unwrap();
        assert_eq!(identity.email, "ana@example.com");
        assert_eq!(identity.display_name, None);

        headers.insert(NAME_HEADER, HeaderValue::from_static(" Ana "));
        let identity = identity_from_headers(&headers).unwrap();
        assert_eq!(identity.display_name.as_deref(), Some("Ana"));

        headers.insert(NAME_HEADER, HeaderValue::from_static("   "));
        let identity = identity_from_headers(&headers).unwrap();
        assert_eq!(identity.display_name, None);
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (ScoringError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ScoringError::Conflict("x".into()), StatusCode::CONFLICT),
            (ScoringError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (ScoringError::Disabled("x".into()), StatusCode::FORBIDDEN),
            (ScoringError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ScoringError::CorruptRecord("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_current_player_is_stable_per_email() {
        let pool = crate::db::test_pool().await;
        let mut headers = HeaderMap::new();
        headers.insert(EMAIL_HEADER, HeaderValue::from_static("Bo@Example.com"));

        let first = current_player(&pool, &headers).await.unwrap();
        headers.insert(EMAIL_HEADER, HeaderValue::from_static("bo@example.com"));
        let second = current_player(&pool, &headers).await.unwrap();
        assert_eq!(first, second);
    }
}
