use std::convert::Infallible;

use serde::Serialize;
use serde_json::{json, Value};
use warp::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    hyper::body::Bytes,
    reject::Rejection,
    reply::{self, Reply, Response},
    Filter,
};

use crate::{
    constants::{BODY_SIZE_LIMIT, TOKEN_KEYWORD},
    error::ApiError,
    form::FormData,
    state::{with_state, AppState},
};

pub mod admin;
pub mod recipes;
pub mod tags;
pub mod users;

/// Every endpoint, with JSON error bodies and request logging.
pub fn api(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    users::routes(state.clone())
        .or(recipes::routes(state.clone()))
        .or(tags::routes(state.clone()))
        .or(admin::routes(state.clone()))
        .or(health(state))
        .recover(handle_rejection)
        .with(warp::log("recipe_api::http"))
}

fn health(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "health")
        .and(warp::get())
        .and(with_state(state))
        .and_then(|state: AppState| async move {
            state.repo().ping().await.map_err(ApiError::from)?;
            Ok::<_, Rejection>(reply::json(&json!({ "status": "ok" })))
        })
}

/// Request body as form data. A request without a body, or with an empty one,
/// reads as `{}`.
pub(crate) fn form_body() -> impl Filter<Extract = (FormData,), Error = Rejection> + Clone {
    let without_body = warp::header::optional::<u64>("content-length").and_then(
        |length: Option<u64>| async move {
            match length {
                None => Ok(FormData::new()),
                Some(_) => Err(warp::reject::not_found()),
            }
        },
    );

    let with_body = warp::body::content_length_limit(BODY_SIZE_LIMIT)
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .and_then(|content_type: Option<String>, body: Bytes| async move {
            parse_form(content_type.as_deref(), &body).map_err(Rejection::from)
        });

    without_body.or(with_body).unify()
}

/// Decodes a JSON object or a urlencoded form. A missing content type reads
/// as JSON.
pub(crate) fn parse_form(content_type: Option<&str>, body: &[u8]) -> Result<FormData, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FormData::new());
    }

    let media_type = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());
    match media_type.as_deref() {
        None | Some("application/json") => parse_json(body),
        Some(media) if media.ends_with("+json") => parse_json(body),
        Some("application/x-www-form-urlencoded") => parse_urlencoded(body),
        Some(media) => Err(ApiError::UnsupportedMediaType(media.to_string())),
    }
}

fn parse_urlencoded(body: &[u8]) -> Result<FormData, ApiError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| ApiError::BadRequest(format!("Form parse error - {e}")))?;

    Ok(pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect())
}

fn parse_json(body: &[u8]) -> Result<FormData, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(_) => Err(ApiError::non_field(
            "Invalid data. Expected a dictionary.",
        )),
        Err(e) => Err(ApiError::BadRequest(format!("JSON parse error - {e}"))),
    }
}

/// `PATCH` reads as a partial update, `PUT` as a full one.
pub(crate) fn update_method() -> impl Filter<Extract = (bool,), Error = Rejection> + Clone {
    warp::patch()
        .map(|| true)
        .or(warp::put().map(|| false))
        .unify()
}

pub(crate) fn json_reply<T: Serialize>(value: &T, status: StatusCode) -> Response {
    reply::with_status(reply::json(value), status).into_response()
}

fn error_reply(status: StatusCode, body: Value) -> Response {
    let mut response = json_reply(&body, status);
    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static(TOKEN_KEYWORD));
    }
    response
}

/// A combined rejection carries one entry per route tried, so errors raised
/// by the route that matched path and method are looked for before the
/// method mismatches of its siblings.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if let Some(e) = err.find::<ApiError>() {
        match e {
            ApiError::Query(_) | ApiError::Internal(_) => log::error!("> {e}"),
            _ => log::debug!("> {e}"),
        }
        return Ok(error_reply(e.status(), e.body()));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            json!({ "detail": "Request body too large." }),
        ));
    }

    if let Some(e) = err.find::<warp::reject::InvalidHeader>() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            json!({ "detail": e.to_string() }),
        ));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "detail": "Method not allowed." }),
        ));
    }

    if err.is_not_found() {
        return Ok(error_reply(
            StatusCode::NOT_FOUND,
            json!({ "detail": "Not found." }),
        ));
    }

    log::error!("Unhandled rejection: {err:?}");
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "detail": "A server error occurred." }),
    ))
}
