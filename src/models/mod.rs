pub mod signup;
pub mod user;

pub use signup::{FieldErrors, Role, SignupPayload, FORM_ERROR_KEY};
pub use user::{AuthResponse, User, UserPatch, UserType, VerificationStatus};
