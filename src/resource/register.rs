use super::{page, redirect, Credentials};
use crate::accounts::{self, Registration};
use crate::error::AppError;
use crate::flash::{self, Level};
use crate::hash::PasswordHasher;
use crate::store::CredentialStore;
use crate::views;
use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::info;

pub static REGISTERED: &str = "WBAP registration successful! You can now log in.";
pub static USERNAME_TAKEN: &str = "Username already exists in WBAP. Try another one.";

pub async fn form(session: Session) -> HttpResponse {
    page(views::register_page(&flash::take(&session)))
}

pub async fn register(
    params: web::Form<Credentials>,
    session: Session,
    store: web::Data<dyn CredentialStore>,
    hasher: web::Data<PasswordHasher>,
) -> Result<HttpResponse, AppError> {
    let Credentials { username, password } = params.into_inner();
    let store = store.into_inner();

    let outcome = web::block(move || {
        accounts::register(store.as_ref(), hasher.get_ref(), &username, &password)
    })
    .await??;

    match outcome {
        Registration::Created(user) => {
            info!("Registered user {:?} (id {})", user.username, user.id);
            flash::push(&session, Level::Success, REGISTERED)?;
            Ok(redirect("/login"))
        }
        Registration::UsernameTaken => {
            info!("Registration rejected: username already taken");
            flash::push(&session, Level::Danger, USERNAME_TAKEN)?;
            Ok(redirect("/register"))
        }
    }
}
