pub mod home;
pub mod login;
pub mod logout;
pub mod register;

pub use home::home;
pub use login::login;
pub use logout::logout;
pub use register::register;

use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

/// Form body shared by registration and login. Missing fields read as empty
/// strings and simply fail the lookup or the password check.
#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn page(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

fn redirect(location: &'static str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().limit(4096))
        .service(
            web::resource("/register")
                .route(web::get().to(register::form))
                .route(web::post().to(register)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(login::form))
                .route(web::post().to(login)),
        )
        .service(web::resource("/home").route(web::get().to(home)))
        .service(web::resource("/logout").route(web::get().to(logout)));
}
