// web-server/src/api/mod.rs
pub mod auth;
pub mod sessions;
pub mod users;
pub mod wallets;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::scope("/api")
            .service(auth::api_index)
            .service(auth::verify_token)
            .service(auth::session_status)
            .service(wallets::create_wallet)
            .service(users::get_user)
            .service(sessions::revoke_session),
    );
}
