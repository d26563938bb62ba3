use crate::client::Credentials;
use crate::error::FlowError;
use crate::flow::{ensure_valid, flow_error_from_client, is_valid_email};
use crate::models::{FieldErrors, User};
use crate::session::SessionStore;

#[derive(Debug, Clone, Default)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
}

impl SigninForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.email.trim().is_empty() {
            errors.insert("email".into(), "Email is required".into());
        } else if !is_valid_email(&self.email) {
            errors.insert("email".into(), "Email is invalid".into());
        }

        if self.password.is_empty() {
            errors.insert("password".into(), "Password is required".into());
        }

        errors
    }
}

/// Validates locally, calls the login route and signs the user in.
/// Backend field errors come back as [`FlowError::Invalid`].
pub async fn submit_signin(session: &SessionStore, form: &SigninForm) -> Result<User, FlowError> {
    ensure_valid(form.validate())?;

    let credentials = Credentials {
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    };

    let response = session
        .api()
        .login(&credentials)
        .await
        .map_err(flow_error_from_client)?;

    Ok(session.sign_in(response).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::MockAuthApi;
    use crate::error::ClientError;
    use crate::models::{Role, SignupPayload};
    use crate::session::MemoryStorage;
    use serde_json::json;
    use std::sync::Arc;

    fn form() -> SigninForm {
        SigninForm {
            email: "ada@example.com".into(),
            password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn invalid_form_makes_no_call() {
        let mut mock = MockAuthApi::new();
        mock.expect_login().times(0);
        let session = SessionStore::new(Arc::new(mock), Arc::new(MemoryStorage::new()));

        let err = submit_signin(&session, &SigninForm::default()).await.unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors["email"], "Email is required");
        assert_eq!(errors["password"], "Password is required");
    }

    #[tokio::test]
    async fn rejected_credentials_map_to_form_error() {
        let mut mock = MockAuthApi::new();
        mock.expect_login().times(1).returning(|_| {
            Box::pin(async move {
                Err(ClientError::Rejected {
                    status: 400,
                    body: json!({ "non_field_errors": ["Invalid credentials"] }),
                })
            })
        });
        let session = SessionStore::new(Arc::new(mock), Arc::new(MemoryStorage::new()));

        let err = submit_signin(&session, &form()).await.unwrap_err();
        assert_eq!(err.field_errors().unwrap()["form"], "Invalid credentials");
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn success_signs_in_and_drops_pending_signup() {
        let mut mock = MockAuthApi::new();
        mock.expect_login()
            .withf(|credentials| credentials.email == "ada@example.com")
            .times(1)
            .returning(|_| {
                Box::pin(async move {
                    Ok(serde_json::from_value(json!({
                        "token": "tok",
                        "user": {
                            "id": 5,
                            "first_name": "Ada",
                            "last_name": "Obi",
                            "email": "ada@example.com",
                            "user_type": "client",
                            "is_verified": true
                        }
                    }))
                    .unwrap())
                })
            });
        let session = SessionStore::new(Arc::new(mock), Arc::new(MemoryStorage::new()));
        session
            .update_signup_payload(Some(SignupPayload::new().with_role(Role::Client)))
            .await
            .unwrap();

        let user = submit_signin(&session, &form()).await.unwrap();

        assert!(user.is_verified);
        assert!(session.is_authenticated().await);
        assert!(session.signup_payload().await.is_none());
    }
}
