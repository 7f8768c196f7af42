use serde::{Deserialize, Serialize};

use super::{Role, UserId};

/// 認証済みの呼び出し元
///
/// 認証そのものは外部で行われ、ここではIDと役割だけを受け取る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn member(user_id: UserId) -> Self {
        Self::new(user_id, Role::Member)
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }
}
