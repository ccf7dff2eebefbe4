//! gRPC client for the SSO service.
//!
//! Calls go through one lazily connected `Channel`. Each call carries the
//! configured deadline; `Unavailable` responses are retried up to
//! `retries_count` extra times with a short linear backoff.

use std::time::Duration;

use async_trait::async_trait;
use tonic::codec::ProstCodec;
use http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};

use crate::config::SsoConfig;
use crate::domain::foundation::{AuthError, UserId};
use crate::ports::{IdentityProvider, TokenCheck};

use super::proto::{
    CheckTokenRequest, CheckTokenResponse, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, CHECK_TOKEN_PATH, LOGIN_PATH, REGISTER_PATH,
};

const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// `IdentityProvider` backed by the `auth.Auth` gRPC service.
#[derive(Debug, Clone)]
pub struct GrpcIdentityProvider {
    channel: Channel,
    app_id: i32,
    retries: u32,
}

impl GrpcIdentityProvider {
    /// Builds the client. The connection is established on first use.
    pub fn connect_lazy(config: &SsoConfig) -> Result<Self, AuthError> {
        let channel = Endpoint::from_shared(config.endpoint())
            .map_err(|e| AuthError::service_unavailable(format!("bad SSO endpoint: {}", e)))?
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .connect_lazy();

        Ok(Self {
            channel,
            app_id: config.app_id,
            retries: config.retries_count,
        })
    }

    async fn call<Req, Resp>(&self, method: &'static str, message: Req) -> Result<Resp, Status>
    where
        Req: prost::Message + Clone + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let path = PathAndQuery::from_static(method);
        let mut attempt = 0;
        loop {
            let mut grpc = tonic::client::Grpc::new(self.channel.clone());
            let result = match grpc.ready().await {
                Ok(()) => grpc
                    .unary(
                        Request::new(message.clone()),
                        path.clone(),
                        ProstCodec::<Req, Resp>::default(),
                    )
                    .await
                    .map(tonic::Response::into_inner),
                Err(e) => Err(Status::unavailable(e.to_string())),
            };

            match result {
                Err(status) if status.code() == Code::Unavailable && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        method,
                        attempt,
                        error = %status.message(),
                        "SSO service unavailable, retrying"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                other => return other,
            }
        }
    }
}

/// Transport-level failures common to every method.
fn transport_error(status: &Status) -> Option<AuthError> {
    match status.code() {
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled | Code::Unknown => Some(
            AuthError::service_unavailable(status.message().to_string()),
        ),
        _ => None,
    }
}

fn login_error(status: Status) -> AuthError {
    if let Some(err) = transport_error(&status) {
        return err;
    }
    match status.code() {
        Code::InvalidArgument | Code::Unauthenticated | Code::NotFound => {
            AuthError::InvalidCredentials
        }
        _ => AuthError::service_unavailable(status.message().to_string()),
    }
}

fn register_error(status: Status) -> AuthError {
    if let Some(err) = transport_error(&status) {
        return err;
    }
    match status.code() {
        Code::AlreadyExists => AuthError::UserExists,
        Code::InvalidArgument => AuthError::InvalidRequest(status.message().to_string()),
        _ => AuthError::service_unavailable(status.message().to_string()),
    }
}

/// The SSO service answers a rejected token with `Internal`, so everything
/// that is not a transport failure means the token is bad.
fn check_token_error(status: Status) -> AuthError {
    transport_error(&status).unwrap_or(AuthError::InvalidToken)
}

#[async_trait]
impl IdentityProvider for GrpcIdentityProvider {
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let response: LoginResponse = self
            .call(
                LOGIN_PATH,
                LoginRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                    app_id: self.app_id,
                },
            )
            .await
            .map_err(login_error)?;

        if response.token.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(response.token)
    }

    async fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        let response: RegisterResponse = self
            .call(
                REGISTER_PATH,
                RegisterRequest {
                    email: email.to_string(),
                    password: password.to_string(),
                },
            )
            .await
            .map_err(register_error)?;

        UserId::new(response.user_id).map_err(|e| {
            AuthError::service_unavailable(format!("SSO returned a bad user id: {}", e))
        })
    }

    async fn check_token(&self, token: &str) -> Result<TokenCheck, AuthError> {
        let response: CheckTokenResponse = self
            .call(
                CHECK_TOKEN_PATH,
                CheckTokenRequest {
                    token: token.to_string(),
                    app_id: self.app_id,
                },
            )
            .await
            .map_err(check_token_error)?;

        if !response.is_valid {
            return Err(AuthError::InvalidToken);
        }
        let user_id = UserId::new(response.user_id).map_err(|_| AuthError::InvalidToken)?;
        Ok(TokenCheck {
            user_id,
            email: response.email,
            roles: response.roles,
            valid: response.is_valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_unavailable() {
        for code in [Code::Unavailable, Code::DeadlineExceeded] {
            let err = check_token_error(Status::new(code, "down"));
            assert!(err.is_transient(), "{:?}", code);
        }
    }

    #[test]
    fn rejected_token_is_invalid() {
        let err = check_token_error(Status::internal("token is expired"));
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn login_and_register_errors() {
        assert_eq!(
            login_error(Status::invalid_argument("bad password")),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            register_error(Status::already_exists("taken")),
            AuthError::UserExists
        );
        assert!(matches!(
            register_error(Status::invalid_argument("email is required")),
            AuthError::InvalidRequest(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_service_reports_unavailable() {
        let config = SsoConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout_secs: 1,
            retries_count: 1,
            ..Default::default()
        };
        let provider = GrpcIdentityProvider::connect_lazy(&config).unwrap();
        let err = provider.check_token("token").await.unwrap_err();
        assert!(err.is_transient(), "{:?}", err);
    }
}
