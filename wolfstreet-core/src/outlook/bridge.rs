use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::protocol::{SyncReport, TokenReply};
use super::tokens::{OutlookTokens, TokenStore};
use crate::calendar_event::CalendarEvent;
use crate::error::{WolfStreetError, WolfStreetResult};

/// The server-side Outlook proxy, as seen by the client.
#[allow(async_fn_in_trait)]
pub trait OutlookProxy {
    /// URL of the Microsoft authorization page.
    async fn auth_url(&self) -> WolfStreetResult<String>;

    async fn exchange_token(&self, code: &str) -> WolfStreetResult<TokenReply>;

    async fn sync(&self, access_token: &str, events: &[CalendarEvent]) -> WolfStreetResult<SyncReport>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    AuthorizationPending,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::AuthorizationPending => "authorization pending",
            ConnectionState::Connected => "connected",
        }
    }
}

/// Client-held Outlook session: tokens plus the connect/sync state machine.
///
/// There is no silent refresh. An expired token is discarded before any
/// network call and the user has to authorize again.
pub struct OutlookBridge<P, S> {
    proxy: P,
    store: S,
    tokens: Option<OutlookTokens>,
    state: ConnectionState,
}

impl<P: OutlookProxy, S: TokenStore> OutlookBridge<P, S> {
    pub fn new(proxy: P, store: S) -> WolfStreetResult<Self> {
        Self::restore_at(proxy, store, Utc::now())
    }

    /// Restore a stored session. Expired tokens are removed.
    pub fn restore_at(proxy: P, store: S, now: DateTime<Utc>) -> WolfStreetResult<Self> {
        let tokens = match store.load()? {
            Some(tokens) if tokens.is_expired(now) => {
                info!("discarding expired Outlook tokens");
                store.clear()?;
                None
            }
            other => other,
        };

        let state = if tokens.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };

        Ok(OutlookBridge {
            proxy,
            store,
            tokens,
            state,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn tokens(&self) -> Option<&OutlookTokens> {
        self.tokens.as_ref()
    }

    /// Ask the proxy for the authorization URL the user has to visit.
    /// An unconfigured proxy yields `SetupRequired` and leaves the state alone.
    pub async fn connect(&mut self) -> WolfStreetResult<String> {
        let url = self.proxy.auth_url().await?;
        self.state = ConnectionState::AuthorizationPending;
        Ok(url)
    }

    pub async fn complete_authorization(&mut self, code: &str) -> WolfStreetResult<()> {
        self.complete_authorization_at(code, Utc::now()).await
    }

    /// Exchange the authorization code and persist the tokens.
    pub async fn complete_authorization_at(
        &mut self,
        code: &str,
        now: DateTime<Utc>,
    ) -> WolfStreetResult<()> {
        if self.state != ConnectionState::AuthorizationPending {
            return Err(WolfStreetError::Validation(
                "No Outlook authorization is in progress".into(),
            ));
        }

        let reply = match self.proxy.exchange_token(code).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Outlook code exchange failed");
                self.state = ConnectionState::Disconnected;
                return Err(e);
            }
        };

        let tokens = OutlookTokens::from_reply(reply, now);
        if let Err(e) = self.store.save(&tokens) {
            self.state = ConnectionState::Disconnected;
            return Err(e);
        }

        self.tokens = Some(tokens);
        self.state = ConnectionState::Connected;
        info!("Outlook connected");
        Ok(())
    }

    pub async fn sync_events(&mut self, events: &[CalendarEvent]) -> WolfStreetResult<SyncReport> {
        self.sync_events_at(events, Utc::now()).await
    }

    /// Push events to Outlook. Expiry is checked first; an expired session
    /// is torn down without contacting the proxy.
    pub async fn sync_events_at(
        &mut self,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
    ) -> WolfStreetResult<SyncReport> {
        let Some(tokens) = self.tokens.as_ref() else {
            return Err(WolfStreetError::NotConnected);
        };

        if tokens.is_expired(now) {
            warn!("Outlook session expired");
            self.disconnect()?;
            return Err(WolfStreetError::SessionExpired);
        }

        let report = self.proxy.sync(&tokens.access_token, events).await?;
        info!(synced = report.synced, failed = report.failed, "Outlook sync finished");
        Ok(report)
    }

    /// Forget the tokens locally. Nothing is revoked remotely.
    pub fn disconnect(&mut self) -> WolfStreetResult<()> {
        self.tokens = None;
        self.state = ConnectionState::Disconnected;
        self.store.clear()
    }
}
