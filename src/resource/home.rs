use super::page;
use crate::flash;
use crate::identity::CurrentUser;
use crate::views;
use actix_session::Session;
use actix_web::HttpResponse;

pub async fn home(current: CurrentUser, session: Session) -> HttpResponse {
    page(views::home_page(&current.user().username, &flash::take(&session)))
}
