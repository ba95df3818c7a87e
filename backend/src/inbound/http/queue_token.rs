//! Queue token extraction for protected endpoints.
//!
//! Reservation handlers require the `X-Queue-Token` header issued by the
//! queue endpoints. The extractor only pulls the raw token; resolving it
//! to an admitted user goes through [`Admission::authorize`] so the check
//! always hits the live queue state.
//!
//! [`Admission::authorize`]: crate::domain::ports::Admission::authorize

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::{Error, QueueToken};

/// Name of the queue token header.
pub const QUEUE_TOKEN_HEADER: &str = "X-Queue-Token";

/// Raw queue token taken from the request headers.
#[derive(Debug, Clone)]
pub struct QueueTokenHeader(QueueToken);

impl QueueTokenHeader {
    /// The extracted token.
    pub fn into_token(self) -> QueueToken {
        self.0
    }
}

fn extract(req: &HttpRequest) -> Result<QueueTokenHeader, Error> {
    let raw = req
        .headers()
        .get(QUEUE_TOKEN_HEADER)
        .ok_or_else(|| Error::unauthorized("missing X-Queue-Token header"))?
        .to_str()
        .map_err(|_| Error::unauthorized("X-Queue-Token header is not valid UTF-8"))?
        .trim();

    if raw.is_empty() {
        return Err(Error::unauthorized("X-Queue-Token header is empty"));
    }

    Ok(QueueTokenHeader(QueueToken::from_raw(raw)))
}

impl FromRequest for QueueTokenHeader {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

/// Name of the payment idempotency header.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Optional idempotency key taken from the request headers.
#[derive(Debug, Clone, Default)]
pub struct IdempotencyKeyHeader(Option<String>);

impl IdempotencyKeyHeader {
    /// The extracted key, if the header was present and non-empty.
    pub fn into_key(self) -> Option<String> {
        self.0
    }
}

impl FromRequest for IdempotencyKeyHeader {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let key = req
            .headers()
            .get(IDEMPOTENCY_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        ready(Ok(Self(key)))
    }
}
