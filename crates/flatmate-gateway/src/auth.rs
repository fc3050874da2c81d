//! Bot token authentication: `X-Token: sub.expire.signature` with an
//! HMAC-SHA256 signature over `sub.expire`.
//!
//! `expire` is a unix timestamp; `-1` means the token never expires. The bot
//! API only admits the `tgbot` subject.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use flatmate_protocol::ApiError;

use crate::app::AppState;
use crate::reject::Reject;

type HmacSha256 = Hmac<Sha256>;

/// Subject admitted to the `/bot` routes.
pub const BOT_SUBJECT: &str = "tgbot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    /// Unix seconds, or -1 for a non-expiring token.
    pub expire: i64,
}

/// Mint a signed token. Used by deployments to provision the bot and by the
/// test suite.
pub fn mint_token(secret: &str, sub: &str, expire: i64) -> String {
    let payload = format!("{sub}.{expire}");
    format!("{payload}.{}", sign(secret, &payload))
}

/// Verify shape, signature, and expiry. Returns the coded error the wire
/// contract prescribes for each failure mode.
pub fn verify_token(secret: &str, token: &str, now_ts: i64) -> Result<Claims, ApiError> {
    // rsplit keeps dots in `sub` intact; only the last two segments are ours
    let (rest, signature) = token.rsplit_once('.').ok_or(ApiError::InvalidToken)?;
    let (sub, expire) = rest.rsplit_once('.').ok_or(ApiError::InvalidToken)?;
    let expire: i64 = expire.parse().map_err(|_| ApiError::InvalidToken)?;

    let expected = hex::decode(signature).map_err(|_| ApiError::InvalidToken)?;
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| ApiError::InvalidToken)?;
    mac.update(rest.as_bytes());
    mac.verify_slice(&expected).map_err(|_| ApiError::InvalidToken)?;

    if expire != -1 && expire < now_ts {
        return Err(ApiError::TokenExpired);
    }
    Ok(Claims {
        sub: sub.to_string(),
        expire,
    })
}

fn sign(secret: &str, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Axum middleware guarding every `/bot/*` route.
pub async fn require_bot_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, Reject> {
    let token = request
        .headers()
        .get("x-token")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::NoToken)?;

    let claims = verify_token(&state.secret, token, chrono::Utc::now().timestamp())?;
    if claims.sub != BOT_SUBJECT {
        return Err(ApiError::BotAccess.into());
    }
    Ok(next.run(request).await)
}
