//! Signed-in user state.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{WolfStreetError, WolfStreetResult};
use crate::outlook::{OutlookBridge, OutlookProxy, TokenStore};

/// Header the server reads the caller's user id from.
pub const USER_HEADER: &str = "x-user-id";

/// Access-control record of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_approved: bool,
    pub is_admin: bool,
}

impl Profile {
    pub fn require_approved(&self) -> WolfStreetResult<()> {
        if self.is_approved {
            Ok(())
        } else {
            Err(WolfStreetError::NotApproved)
        }
    }

    pub fn require_admin(&self) -> WolfStreetResult<()> {
        self.require_approved()?;
        if self.is_admin {
            Ok(())
        } else {
            Err(WolfStreetError::Forbidden("admin access required".into()))
        }
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

/// Everything a signed-in user holds: the approved profile and the Outlook
/// session. Created on sign-in, torn down by [`SessionContext::sign_out`].
pub struct SessionContext<P, S> {
    profile: Profile,
    outlook: OutlookBridge<P, S>,
}

impl<P: OutlookProxy, S: TokenStore> SessionContext<P, S> {
    /// Sign in. Unapproved profiles get no session.
    pub fn start(profile: Profile, outlook: OutlookBridge<P, S>) -> WolfStreetResult<Self> {
        profile.require_approved()?;
        info!(user_id = %profile.user_id, outlook = outlook.state().as_str(), "session started");
        Ok(SessionContext { profile, outlook })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn outlook(&mut self) -> &mut OutlookBridge<P, S> {
        &mut self.outlook
    }

    /// End the session, discarding the Outlook tokens.
    pub fn sign_out(mut self) -> WolfStreetResult<Profile> {
        self.outlook.disconnect()?;
        info!(user_id = %self.profile.user_id, "signed out");
        Ok(self.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar_event::CalendarEvent;
    use crate::outlook::protocol::{SyncReport, TokenReply};
    use crate::outlook::{ConnectionState, FileTokenStore, OutlookTokens};

    struct Offline;

    impl OutlookProxy for Offline {
        async fn auth_url(&self) -> WolfStreetResult<String> {
            Err(WolfStreetError::Remote("offline".into()))
        }

        async fn exchange_token(&self, _code: &str) -> WolfStreetResult<TokenReply> {
            Err(WolfStreetError::Remote("offline".into()))
        }

        async fn sync(&self, _token: &str, _events: &[CalendarEvent]) -> WolfStreetResult<SyncReport> {
            Err(WolfStreetError::Remote("offline".into()))
        }
    }

    fn profile(approved: bool, admin: bool) -> Profile {
        Profile {
            user_id: "u1".into(),
            email: "dana@example.com".into(),
            full_name: None,
            is_approved: approved,
            is_admin: admin,
        }
    }

    #[test]
    fn admin_requires_approval_too() {
        assert!(profile(true, true).require_admin().is_ok());
        assert!(matches!(profile(true, false).require_admin(), Err(WolfStreetError::Forbidden(_))));
        assert!(matches!(profile(false, true).require_admin(), Err(WolfStreetError::NotApproved)));
    }

    #[test]
    fn unapproved_profile_cannot_start_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = OutlookBridge::new(Offline, FileTokenStore::new(dir.path())).unwrap();

        let result = SessionContext::start(profile(false, false), bridge);
        assert!(matches!(result, Err(WolfStreetError::NotApproved)));
    }

    #[test]
    fn sign_out_discards_outlook_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = FileTokenStore::new(dir.path());
        tokens
            .save(&OutlookTokens {
                access_token: "a".into(),
                refresh_token: None,
                expires_at: i64::MAX,
            })
            .unwrap();

        let bridge = OutlookBridge::new(Offline, tokens.clone()).unwrap();
        let mut session = SessionContext::start(profile(true, false), bridge).unwrap();
        assert_eq!(session.outlook().state(), ConnectionState::Connected);

        let profile = session.sign_out().unwrap();
        assert_eq!(profile.user_id, "u1");
        assert_eq!(tokens.load().unwrap(), None);
    }
}
