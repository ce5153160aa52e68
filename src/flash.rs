//! One-shot notifications carried across a redirect in a cookie.
//!
//! A write handler queues a [`Flash`] with [`redirect_with`]. The next page
//! that renders picks it up through the [`IncomingFlash`] extractor and clears
//! the cookie with [`IncomingFlash::consume`].

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};

const COOKIE_NAME: &str = "flash";
const CLEAR_COOKIE: &str = "flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
        }
    }

    fn parse(level: &str) -> Option<Self> {
        match level {
            "success" => Some(Level::Success),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    fn to_cookie(&self) -> String {
        format!(
            "{}={}:{}; Path=/; HttpOnly; SameSite=Lax",
            COOKIE_NAME,
            self.level.as_str(),
            urlencoding::encode(&self.message)
        )
    }

    fn from_cookie_value(value: &str) -> Option<Self> {
        let (level, message) = value.split_once(':')?;
        let level = Level::parse(level)?;
        let message = urlencoding::decode(message).ok()?.into_owned();

        Some(Self { level, message })
    }
}

/// redirects to `to` with `flash` queued for the next rendered page.
pub fn redirect_with(to: &str, flash: Flash) -> Response {
    ([(header::SET_COOKIE, flash.to_cookie())], Redirect::to(to)).into_response()
}

/// the flash queued by the previous request, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncomingFlash(pub Option<Flash>);

impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let flash = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().strip_prefix("flash="))
            .find_map(Flash::from_cookie_value);

        Ok(IncomingFlash(flash))
    }
}

impl IncomingFlash {
    pub fn message(&self) -> Option<&Flash> {
        self.0.as_ref()
    }

    /// turns `page` into a response, clearing the cookie if a flash was shown.
    pub fn consume(&self, page: impl IntoResponse) -> Response {
        let mut response = page.into_response();

        if self.0.is_some() {
            response
                .headers_mut()
                .insert(header::SET_COOKIE, HeaderValue::from_static(CLEAR_COOKIE));
        }

        response
    }
}
