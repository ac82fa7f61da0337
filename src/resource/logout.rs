use super::redirect;
use crate::error::AppError;
use crate::flash::{self, Level};
use crate::identity::CurrentUser;
use actix_session::Session;
use actix_web::HttpResponse;
use log::info;

pub static LOGGED_OUT: &str = "You have been logged out from WBAP.";

pub async fn logout(current: CurrentUser, session: Session) -> Result<HttpResponse, AppError> {
    let user = current.logout();
    info!("User {:?} logged out", user.username);
    flash::push(&session, Level::Info, LOGGED_OUT)?;
    Ok(redirect("/login"))
}
