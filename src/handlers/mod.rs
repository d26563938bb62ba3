pub mod proxy_handlers;

pub use proxy_handlers::{
    client_signup_handler, freelancer_signup_handler, health_handler, login_handler,
    logout_handler, profile_handler,
};
