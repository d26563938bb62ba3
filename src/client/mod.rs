pub mod api;

pub use api::{bearer, ApiResult, AuthApi, Credentials, HttpAuthApi};
