use std::ops::{Deref, DerefMut};

use anyhow::{anyhow, Context};
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request,
};
use brainrot_api::VoterId;
use std::net::SocketAddr;

use crate::{games::GameDirectory, Error};

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub db: PgPool,
    pub games: GameDirectory,
}

#[derive(Clone)]
pub struct PgPool(sqlx::PgPool);

impl PgPool {
    pub fn new(pool: sqlx::PgPool) -> PgPool {
        PgPool(pool)
    }

    pub async fn acquire(&self) -> Result<PgConn, Error> {
        Ok(PgConn(
            self.0.acquire().await.context("acquiring db connection")?,
        ))
    }
}

pub struct PgConn(sqlx::pool::PoolConnection<sqlx::Postgres>);

#[async_trait]
impl FromRequestParts<AppState> for PgConn {
    type Rejection = Error;

    async fn from_request_parts(
        _req: &mut request::Parts,
        state: &AppState,
    ) -> Result<PgConn, Error> {
        state.db.acquire().await
    }
}

impl Deref for PgConn {
    type Target = sqlx::PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PgConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Voter identity for the vote ledger: the first address in
/// `X-Forwarded-For` (the production deployment sits behind a reverse
/// proxy), falling back to the socket peer address. There is no account
/// system, so this address IS the whole identity model; see the `VoterId`
/// docs for the trust boundary this implies.
pub struct VoterIp(pub VoterId);

#[async_trait]
impl<S: Sync> FromRequestParts<S> for VoterIp {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<VoterIp, Error> {
        let forwarded = req
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(addr) = forwarded {
            return Ok(VoterIp(VoterId(addr.to_string())));
        }
        match req.extensions.get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => Ok(VoterIp(VoterId(addr.ip().to_string()))),
            None => Err(Error::Anyhow(anyhow!("no client address on request"))),
        }
    }
}
