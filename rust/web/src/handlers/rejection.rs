use crate::errors::ErrorResponse;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reject::{InvalidHeader, MethodNotAllowed, Reject};
use warp::reply::Response;
use warp::{Filter, Rejection};

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Request body that was not the JSON the endpoint expects.
#[derive(Debug)]
pub struct InvalidBody(pub String);

impl Reject for InvalidBody {}

/// Declared `Content-Length` above the body limit.
#[derive(Debug)]
pub struct BodyTooLarge;

impl Reject for BodyTooLarge {}

// Bodies are optional on some endpoints, so a missing length is allowed.
fn body_limit() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(|length: Option<u64>| async move {
            match length {
                Some(length) if length > MAX_BODY_BYTES => {
                    Err(warp::reject::custom(BodyTooLarge))
                }
                _ => Ok(()),
            }
        })
        .untuple_one()
}

/// Parses a JSON body of at most 16 KiB. An empty body is invalid.
pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Send,
{
    body_limit()
        .and(warp::body::bytes())
        .and_then(|body: Bytes| async move { parse_body(&body) })
}

/// Like [`json_body`], but an empty body yields `T::default()`.
pub fn json_or_default<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Default + Send,
{
    body_limit()
        .and(warp::body::bytes())
        .and_then(|body: Bytes| async move {
            if body.iter().all(u8::is_ascii_whitespace) {
                Ok(T::default())
            } else {
                parse_body(&body)
            }
        })
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Rejection> {
    serde_json::from_slice(body).map_err(|err| warp::reject::custom(InvalidBody(err.to_string())))
}

/// Renders any rejection as an [`ErrorResponse`].
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, body) = if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("not_found", "No such endpoint"),
        )
    } else if let Some(InvalidBody(message)) = err.find::<InvalidBody>() {
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("invalid_request", message.clone()),
        )
    } else if err.find::<BodyTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorResponse::new("payload_too_large", "Request body is too large"),
        )
    } else if let Some(e) = err.find::<InvalidHeader>() {
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("invalid_request", e.to_string()),
        )
    } else if err.find::<MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorResponse::new("method_not_allowed", "Method not allowed"),
        )
    } else {
        tracing::error!(rejection = ?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("internal_error", "Unhandled request error"),
        )
    };

    Ok(body.into_response(status))
}
