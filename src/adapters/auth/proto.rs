//! Messages of the `auth.Auth` gRPC service (see `proto/sso.proto`).
//!
//! Kept in sync with the proto file by hand so the build needs no `protoc`.

/// Full method paths.
pub const LOGIN_PATH: &str = "/auth.Auth/Login";
pub const REGISTER_PATH: &str = "/auth.Auth/Register";
pub const CHECK_TOKEN_PATH: &str = "/auth.Auth/CheckToken";

#[derive(Clone, PartialEq, prost::Message)]
pub struct LoginRequest {
    #[prost(string, tag = "1")]
    pub email: String,
    #[prost(string, tag = "2")]
    pub password: String,
    #[prost(int32, tag = "3")]
    pub app_id: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LoginResponse {
    #[prost(string, tag = "1")]
    pub token: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RegisterRequest {
    #[prost(string, tag = "1")]
    pub email: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RegisterResponse {
    #[prost(int64, tag = "1")]
    pub user_id: i64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CheckTokenRequest {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(int32, tag = "2")]
    pub app_id: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CheckTokenResponse {
    #[prost(int64, tag = "1")]
    pub user_id: i64,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, repeated, tag = "3")]
    pub roles: Vec<String>,
    #[prost(bool, tag = "4")]
    pub is_valid: bool,
}
