//! HTTP route handlers.
//!
//! `POST /api/ask` runs one ask and writes its events as newline-delimited
//! JSON to a chunked response; the connection stays open until the last
//! event. Client disconnect drops the body stream, which cancels the
//! orchestrator and every in-flight generation stream.

use crate::wire::{self, WireQuestion};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hustings_application::{
    AskError, AskQuestionUseCase, GetQuestionUseCase, ListQuestionsUseCase, PartyRepository,
    SessionGateway, StoreError,
};
use hustings_domain::Session;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Cookie carrying the anonymous session token.
const SESSION_COOKIE: &str = "token";

/// Shared handler state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionGateway>,
    pub parties: Arc<dyn PartyRepository>,
    pub ask: Arc<AskQuestionUseCase>,
    pub list_questions: Arc<ListQuestionsUseCase>,
    pub get_question: Arc<GetQuestionUseCase>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ask", post(ask))
        .route("/api/questions", get(list_questions))
        .route("/api/questions/:slug", get(get_question))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: String,
}

async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AskRequest>,
) -> Response {
    let (session, fresh) = match resolve_session(&state, &headers).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    let mut slugs = match state.parties.all_slugs().await {
        Ok(slugs) => slugs,
        Err(err) => {
            error!("Failed to list party slugs: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    // Respondent ordering is decided exactly once, here at the boundary.
    slugs.shuffle(&mut rand::thread_rng());

    let stream = match state.ask.ask(&session.user.id, &body.question, slugs).await {
        Ok(stream) => stream,
        Err(err) => return ask_error_response(err),
    };
    info!("Streaming ask for user {}", session.user.id);

    let lines = futures::stream::unfold(stream, |mut stream| async move {
        let event = stream.next().await?;
        debug!("Emitting {} event", event.kind());
        Some((Ok::<_, Infallible>(wire::event_line(&event)), stream))
    });

    let response = (
        [
            (header::CONTENT_TYPE, "text/event-stream; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (header::CONTENT_ENCODING, "none"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(lines),
    )
        .into_response();
    with_session_cookie(response, &session, fresh)
}

async fn list_questions(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, fresh) = match resolve_session(&state, &headers).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    match state.list_questions.execute(&session.user.id).await {
        Ok(questions) => {
            let questions: Vec<WireQuestion> =
                questions.iter().map(WireQuestion::from).collect();
            let response =
                Json(serde_json::json!({ "questions": questions })).into_response();
            with_session_cookie(response, &session, fresh)
        }
        Err(err) => {
            error!("Failed to list questions: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Response {
    let (session, fresh) = match resolve_session(&state, &headers).await {
        Ok(resolved) => resolved,
        Err(response) => return response,
    };

    match state.get_question.execute(&session.user.id, &slug).await {
        Ok(question) => {
            let response = Json(WireQuestion::from(&question)).into_response();
            with_session_cookie(response, &session, fresh)
        }
        Err(StoreError::QuestionNotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to fetch question {}: {}", slug, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Extract the session token from the request's Cookie header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Session, bool), Response> {
    let token = session_token(headers);
    state
        .sessions
        .find_or_create(token.as_deref())
        .await
        .map_err(|err| {
            error!("Session resolution failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

/// Attach the session cookie to the response when it was newly minted.
fn with_session_cookie(mut response: Response, session: &Session, fresh: bool) -> Response {
    if fresh {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, session.token
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn ask_error_response(err: AskError) -> Response {
    match err {
        AskError::NoParties | AskError::NoDefaultAssistant(_) => {
            error!("Ask rejected: {}", err);
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response()
        }
        AskError::Store(StoreError::PartyNotFound(slug)) => {
            error!("Ask rejected: unknown party '{}'", slug);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Unknown party '{}'", slug),
            )
                .into_response()
        }
        AskError::Store(err) => {
            error!("Ask failed in the store: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_cookie_is_extracted() {
        let headers = headers_with_cookie("theme=dark; token=abc123; other=1");
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_cookie_yields_no_token() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn precondition_failures_map_to_unprocessable() {
        let response = ask_error_response(AskError::NoParties);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = ask_error_response(AskError::Store(StoreError::PartyNotFound(
            "snp".to_string(),
        )));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn store_failures_map_to_internal_error() {
        let response = ask_error_response(AskError::Store(StoreError::Backend(
            "disk full".to_string(),
        )));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn fresh_sessions_set_the_cookie() {
        let session = Session {
            token: "tok".to_string(),
            user: hustings_domain::User::anonymous("u1"),
        };
        let response =
            with_session_cookie(StatusCode::OK.into_response(), &session, true);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("token=tok"));

        let response =
            with_session_cookie(StatusCode::OK.into_response(), &session, false);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }
}
