mod accounts;
mod config;
mod error;
mod flash;
mod hash;
mod identity;
mod models;
mod resource;
mod schema;
mod secret;
mod store;
mod views;

use actix_web::{middleware, web, App, HttpServer};
use config::Settings;
use hash::PasswordHasher;
use identity::{IdentityResolver, StoreResolver};
use log::{error, info};
use std::sync::Arc;
use store::{CredentialStore, DieselStore};

/// Application data shared by every worker.
#[derive(Clone)]
pub struct Services {
    store: web::Data<dyn CredentialStore>,
    resolver: web::Data<dyn IdentityResolver>,
    hasher: web::Data<PasswordHasher>,
}

impl Services {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Services {
        let resolver: Arc<dyn IdentityResolver> = Arc::new(StoreResolver::new(Arc::clone(&store)));
        Services {
            store: web::Data::from(store),
            resolver: web::Data::from(resolver),
            hasher: web::Data::new(hasher),
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.resolver.clone())
            .app_data(self.hasher.clone())
            .configure(resource::configure);
    }
}

/// Routes
/// - /register
///     - GET: registration form
///     - POST { username, password }: create account, redirect to /login
/// - /login
///     - GET: login form
///     - POST { username, password }: start session, redirect to /home
/// - /home
///     - GET: greet the logged-in user
/// - /logout
///     - GET: end session, redirect to /login

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("wbap_auth=info,actix_web=info"),
    )
    .init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let key = match secret::cookie_key() {
        Ok(k) => k,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let store = match DieselStore::connect(&settings.database_url) {
        Ok(s) => s,
        Err(e) => {
            error!("{}: {}", settings.database_url, e);
            std::process::exit(1);
        }
    };

    let services = Services::new(
        Arc::new(store),
        PasswordHasher::new(settings.pbkdf2_iterations),
    );
    let bind_address = settings.bind_address.clone();

    info!("Starting HTTP server on {}", bind_address);
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .configure(move |cfg| services.configure(cfg))
            .wrap(identity::identity_middleware())
            .wrap(identity::session_middleware(&settings, key.clone()))
            .wrap(middleware::Logger::default())
    })
    .bind(bind_address)?
    .run()
    .await
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::num::NonZeroU32;
    use tempfile::TempDir;

    /// Services over a fresh database. Keep the `TempDir` alive for the test.
    pub fn services() -> (Services, TempDir) {
        let (store, dir) = store::test::temp_store();
        let hasher = PasswordHasher::new(NonZeroU32::new(1_000).unwrap());
        (Services::new(Arc::new(store), hasher), dir)
    }

    /// Build the full app, middleware included, as a test service.
    macro_rules! init_app {
        ($services:expr) => {{
            let services = $services.clone();
            let key = actix_web::cookie::Key::generate();
            actix_web::test::init_service(
                actix_web::App::new()
                    .configure(move |cfg| services.configure(cfg))
                    .wrap(crate::identity::identity_middleware())
                    .wrap(crate::identity::session_middleware(
                        &crate::config::Settings::default(),
                        key,
                    )),
            )
            .await
        }};
    }

    /// Send a request the way a browser would: attach the session cookie,
    /// store any updated one, and follow redirects. Evaluates to the final
    /// `(status, body)`.
    macro_rules! browse {
        ($app:expr, $jar:ident, $req:expr) => {{
            let mut req: actix_web::test::TestRequest = $req;
            loop {
                if let Some(cookie) = $jar.clone() {
                    req = req.cookie(cookie);
                }
                let resp = actix_web::test::call_service(&$app, req.to_request()).await;
                if let Some(cookie) = resp
                    .response()
                    .cookies()
                    .find(|c| c.name() == crate::identity::SESSION_COOKIE)
                {
                    $jar = if cookie.value().is_empty() {
                        None
                    } else {
                        Some(cookie.into_owned())
                    };
                }
                if !resp.status().is_redirection() {
                    let status = resp.status();
                    let body = actix_web::test::read_body(resp).await;
                    break (status, String::from_utf8_lossy(&body).into_owned());
                }
                let location = resp
                    .headers()
                    .get(actix_web::http::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("/")
                    .to_string();
                req = actix_web::test::TestRequest::get().uri(&location);
            }
        }};
    }

    pub(crate) use browse;
    pub(crate) use init_app;
}
