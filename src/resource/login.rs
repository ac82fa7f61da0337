use super::{page, redirect, Credentials};
use crate::accounts;
use crate::error::AppError;
use crate::flash::{self, Level};
use crate::store::CredentialStore;
use crate::views;
use actix_identity::Identity;
use actix_session::Session;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use log::info;

pub static LOGGED_IN: &str = "WBAP login successful!";
pub static LOGIN_FAILED: &str = "WBAP login failed. Check your username and password.";

pub async fn form(session: Session) -> HttpResponse {
    page(views::login_page(&flash::take(&session)))
}

pub async fn login(
    req: HttpRequest,
    params: web::Form<Credentials>,
    session: Session,
    store: web::Data<dyn CredentialStore>,
) -> Result<HttpResponse, AppError> {
    let Credentials { username, password } = params.into_inner();
    let store = store.into_inner();

    let user = web::block(move || accounts::authenticate(store.as_ref(), &username, &password))
        .await??;

    match user {
        Some(user) => {
            Identity::login(&req.extensions(), user.id.to_string())
                .map_err(|e| AppError::Session(e.to_string()))?;
            info!("User {:?} logged in", user.username);
            flash::push(&session, Level::Success, LOGGED_IN)?;
            Ok(redirect("/home"))
        }
        None => {
            info!("Failed login attempt");
            flash::push(&session, Level::Danger, LOGIN_FAILED)?;
            Ok(page(views::login_page(&flash::take(&session))))
        }
    }
}
