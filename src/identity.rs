use crate::config::Settings;
use crate::error::AppError;
use crate::flash::{self, Level};
use crate::models::User;
use crate::store::{CredentialStore, StoreError};
use actix_identity::config::LogoutBehaviour;
use actix_identity::{Identity, IdentityExt, IdentityMiddleware};
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::{SessionExt, SessionMiddleware};
use actix_web::cookie::{time::Duration, Key};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use log::warn;
use std::sync::Arc;

pub static SESSION_COOKIE: &str = "wbap-session";

pub static LOGIN_REQUIRED: &str = "Please log in to access this page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Authenticated(User),
}

/// Maps a session token (the identity id stored in the cookie) to a principal.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: Option<&str>) -> Result<Principal, StoreError>;
}

pub struct StoreResolver {
    store: Arc<dyn CredentialStore>,
}

impl StoreResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> StoreResolver {
        StoreResolver { store }
    }
}

impl IdentityResolver for StoreResolver {
    fn resolve(&self, token: Option<&str>) -> Result<Principal, StoreError> {
        let token = match token {
            Some(token) => token,
            None => return Ok(Principal::Anonymous),
        };
        let id = match token.parse::<i32>() {
            Ok(id) => id,
            Err(_) => {
                warn!("session carries a malformed user id {:?}", token);
                return Ok(Principal::Anonymous);
            }
        };

        match self.store.find_by_id(id)? {
            Some(user) => Ok(Principal::Authenticated(user)),
            None => {
                warn!("session refers to unknown user id {}", id);
                Ok(Principal::Anonymous)
            }
        }
    }
}

/// Extractor for routes that require a logged-in user.
pub struct CurrentUser {
    user: User,
    identity: Identity,
}

impl CurrentUser {
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Drop the identity from the session. Other session data (flashes) stays.
    pub fn logout(self) -> User {
        self.identity.logout();
        self.user
    }
}

async fn current_user(req: HttpRequest) -> Result<CurrentUser, AppError> {
    let resolver = req
        .app_data::<web::Data<dyn IdentityResolver>>()
        .ok_or(AppError::MissingAppData("IdentityResolver"))?
        .clone()
        .into_inner();

    let identity = req.get_identity().ok();
    let token = identity.as_ref().and_then(|identity| identity.id().ok());
    let principal = web::block(move || resolver.resolve(token.as_deref())).await??;

    match (principal, identity) {
        (Principal::Authenticated(user), Some(identity)) => Ok(CurrentUser { user, identity }),
        (_, identity) => {
            // a stale identity must not linger once it stops resolving
            if let Some(identity) = identity {
                identity.logout();
            }
            flash::push(&req.get_session(), Level::Message, LOGIN_REQUIRED)?;
            Err(AppError::Unauthenticated)
        }
    }
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { current_user(req).await.map_err(Into::into) })
    }
}

pub fn identity_middleware() -> IdentityMiddleware {
    IdentityMiddleware::builder()
        .logout_behaviour(LogoutBehaviour::DeleteIdentityKeys)
        .build()
}

pub fn session_middleware(settings: &Settings, key: Key) -> SessionMiddleware<CookieSessionStore> {
    let ttl = Duration::days(i64::from(settings.session_ttl_days.get()));

    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_string())
        .cookie_path("/".to_string())
        .cookie_domain(settings.cookie_domain.clone())
        .cookie_secure(settings.secure_cookie)
        .cookie_content_security(CookieContentSecurity::Signed)
        .session_lifecycle(PersistentSession::default().session_ttl(ttl))
        .build()
}
