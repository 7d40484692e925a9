//! Auth gate in front of every page handler
//!
//! Each request is reduced to a [`Verdict`] about its session cookie, and
//! [`dispatch`] turns the route's [`RequireLogin`] plus that verdict into a
//! [`Control`] transfer. `dispatch` does no I/O.

use hyper::header::COOKIE;
use hyper::HeaderMap;
use tollgate_core::{AuthError, Identity, Principal, SessionAuthenticator, AUTH_COOKIE};
use tracing::debug;

/// Whether a route only serves logged-in users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequireLogin {
    Yes,
    No,
}

/// What the session cookie amounts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No cookie, or one that does not parse
    NoToken,
    Valid(Identity),
    /// Forged, expired or revoked
    Invalid(AuthError),
    /// The key or revocation store failed
    Fault(AuthError),
}

impl Verdict {
    /// Evaluate a cookie value with `sessions`
    pub fn resolve(sessions: &SessionAuthenticator, cookie: Option<&str>) -> Self {
        let Some(value) = cookie else {
            return Verdict::NoToken;
        };

        match sessions.authenticate(value) {
            Ok(identity) => Verdict::Valid(identity),
            Err(AuthError::MalformedToken(reason)) => {
                debug!(%reason, "ignoring malformed session cookie");
                Verdict::NoToken
            }
            Err(err) if err.is_internal() => Verdict::Fault(err),
            Err(err) => {
                debug!(reason = %err, "session cookie rejected");
                Verdict::Invalid(err)
            }
        }
    }
}

/// Where control goes next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Invoke(Principal),
    /// 303 to the login page, which sends the user back to `location`'s
    /// `return` target afterwards
    RedirectToLogin { location: String },
    InternalError(AuthError),
}

/// Decide what happens to a request for `requested` (path plus query).
pub fn dispatch(require_login: RequireLogin, verdict: Verdict, requested: &str) -> Control {
    match (require_login, verdict) {
        (_, Verdict::Fault(err)) => Control::InternalError(err),
        (_, Verdict::Valid(identity)) => Control::Invoke(Principal::User(identity)),
        (RequireLogin::No, Verdict::NoToken | Verdict::Invalid(_)) => {
            Control::Invoke(Principal::Anonymous)
        }
        (RequireLogin::Yes, Verdict::NoToken | Verdict::Invalid(_)) => Control::RedirectToLogin {
            location: login_location(requested),
        },
    }
}

/// Login page URL that returns to `requested` afterwards
pub fn login_location(requested: &str) -> String {
    format!("/login?return={}", urlencoding::encode(requested))
}

/// Value of the `auth_token` cookie, if the request carries one
pub fn auth_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use std::sync::Arc;
    use tollgate_core::{ManualClock, MemoryKeyAuthority, MemoryRevocationStore};

    fn alice() -> Identity {
        Identity::new("alice")
    }

    #[test]
    fn test_required_route_admits_only_valid() {
        assert_eq!(
            dispatch(RequireLogin::Yes, Verdict::Valid(alice()), "/myaccount"),
            Control::Invoke(Principal::User(alice()))
        );

        for verdict in [
            Verdict::NoToken,
            Verdict::Invalid(AuthError::BadSignature),
            Verdict::Invalid(AuthError::Expired),
            Verdict::Invalid(AuthError::Revoked),
        ] {
            assert_eq!(
                dispatch(RequireLogin::Yes, verdict, "/myaccount"),
                Control::RedirectToLogin {
                    location: "/login?return=%2Fmyaccount".to_string()
                }
            );
        }
    }

    #[test]
    fn test_optional_route_downgrades_to_anonymous() {
        assert_eq!(
            dispatch(RequireLogin::No, Verdict::Valid(alice()), "/"),
            Control::Invoke(Principal::User(alice()))
        );

        for verdict in [
            Verdict::NoToken,
            Verdict::Invalid(AuthError::BadSignature),
            Verdict::Invalid(AuthError::Expired),
            Verdict::Invalid(AuthError::Revoked),
        ] {
            assert_eq!(
                dispatch(RequireLogin::No, verdict, "/"),
                Control::Invoke(Principal::Anonymous)
            );
        }
    }

    #[test]
    fn test_faults_are_never_anonymous() {
        let fault = AuthError::Internal("revocation store down".to_string());

        for require_login in [RequireLogin::Yes, RequireLogin::No] {
            assert_eq!(
                dispatch(require_login, Verdict::Fault(fault.clone()), "/"),
                Control::InternalError(fault.clone())
            );
        }
    }

    #[test]
    fn test_login_location_keeps_query() {
        assert_eq!(
            login_location("/myaccount?tab=billing&x=1"),
            "/login?return=%2Fmyaccount%3Ftab%3Dbilling%26x%3D1"
        );
    }

    #[test]
    fn test_auth_cookie_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(auth_cookie(&headers), None);

        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=abc%7B; other=1"),
        );
        assert_eq!(auth_cookie(&headers), Some("abc%7B"));

        let mut split = HeaderMap::new();
        split.append(COOKIE, HeaderValue::from_static("theme=dark"));
        split.append(COOKIE, HeaderValue::from_static("auth_token=xyz"));
        assert_eq!(auth_cookie(&split), Some("xyz"));

        let mut lookalike = HeaderMap::new();
        lookalike.insert(COOKIE, HeaderValue::from_static("xauth_token=nope"));
        assert_eq!(auth_cookie(&lookalike), None);
    }

    #[test]
    fn test_resolve_classifies_cookies() {
        let clock = Arc::new(ManualClock::new(0));
        let sessions = SessionAuthenticator::new(
            Arc::new(MemoryKeyAuthority::new(clock.clone())),
            Arc::new(MemoryRevocationStore::new()),
            clock.clone(),
        );
        let token = sessions.login("alice").unwrap();

        assert_eq!(Verdict::resolve(&sessions, None), Verdict::NoToken);
        assert_eq!(Verdict::resolve(&sessions, Some("null")), Verdict::NoToken);
        assert_eq!(
            Verdict::resolve(&sessions, Some(&token.encode())),
            Verdict::Valid(alice())
        );

        clock.set(4000);
        assert_eq!(
            Verdict::resolve(&sessions, Some(&token.encode())),
            Verdict::Invalid(AuthError::Expired)
        );
    }
}
