use crate::application::access::{self, AccessDecision, Operation};
use crate::domain::{Identity, Role, UserId};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use std::convert::Infallible;
use uuid::Uuid;

use super::error::ApiError;

/// 上流の認証層が設定するユーザーIDヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";
/// 上流の認証層が設定する役割ヘッダー
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// 呼び出し元の識別情報を取り出すエクストラクタ
///
/// ヘッダーが無い・不正な場合は未認証（`None`）として扱い、
/// 拒否するかどうかはアクセス判定に任せる。
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    /// 操作を認可し、認証済みの呼び出し元を返す
    pub fn authorize(&self, operation: Operation) -> Result<Identity, ApiError> {
        match (access::authorize(self.0.as_ref(), operation), self.0) {
            (AccessDecision::Allowed, Some(identity)) => Ok(identity),
            (AccessDecision::Forbidden, Some(identity)) => {
                tracing::debug!(
                    user_id = %identity.user_id,
                    role = identity.role.as_str(),
                    ?operation,
                    "Operation forbidden"
                );
                Err(ApiError::Forbidden)
            }
            _ => Err(ApiError::Unauthenticated),
        }
    }

    /// 認証済みであることだけを確認する
    pub fn authenticated(&self) -> Result<Identity, ApiError> {
        self.0.ok_or(ApiError::Unauthenticated)
    }
}

pub fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let user_id = headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .parse::<Uuid>()
        .ok()?;
    let role = headers
        .get(USER_ROLE_HEADER)?
        .to_str()
        .ok()?
        .parse::<Role>()
        .ok()?;

    Some(Identity::new(UserId::from_uuid(user_id), role))
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_from_headers(&parts.headers);
        if identity.is_none() && parts.headers.contains_key(USER_ID_HEADER) {
            tracing::debug!("Ignoring malformed identity headers");
        }
        Ok(Caller(identity))
    }
}
