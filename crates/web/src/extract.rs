//! Decoding of request bodies by content type.
//!
//! `POST` and `PUT` bodies are decoded before the handler runs:
//!
//! - `application/x-www-form-urlencoded` fills the request's form map
//! - `application/json`, or no content type at all, fills the request's JSON value
//! - anything else is rejected with `415 Unsupported Media Type`
//!
//! Content types are compared by their essence, so `application/json; charset=utf-8`
//! is JSON.

use http::StatusCode;
use mime::Mime;
use sprig_http::codec::decode_form;
use sprig_http::protocol::Request;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("malformed json body: {source}")]
    MalformedJson {
        #[from]
        source: serde_json::Error,
    },

    #[error("unsupported content type: {content_type}")]
    UnsupportedMediaType { content_type: String },
}

impl BodyError {
    pub fn unsupported(content_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaType { content_type: content_type.into() }
    }

    /// The status the router answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedJson { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

/// Decodes the body of `request` in place according to its content type.
///
/// A missing content type is treated as `application/json` and recorded on the
/// request. An empty JSON body is malformed.
pub fn decode_body(request: &mut Request) -> Result<(), BodyError> {
    if request.content_type().trim().is_empty() {
        request.set_content_type(mime::APPLICATION_JSON.as_ref());
    }

    let Ok(content_type) = request.content_type().parse::<Mime>() else {
        return Err(BodyError::unsupported(request.content_type()));
    };

    match content_type.essence_str() {
        essence if essence == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
            let form = decode_form(&String::from_utf8_lossy(request.body()));
            debug!(fields = form.len(), "decoded form body");
            request.set_form(form);
            Ok(())
        }
        essence if essence == mime::APPLICATION_JSON.essence_str() => {
            let json = serde_json::from_slice(request.body())?;
            request.set_json(json);
            Ok(())
        }
        _ => Err(BodyError::unsupported(request.content_type())),
    }
}
