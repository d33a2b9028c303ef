use async_trait::async_trait;

use crate::error::CommerceResult;
use crate::model::Session;

#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn resolve_session(&self, token: &str) -> CommerceResult<Option<Session>>;

    async fn save_session(&self, session: &Session) -> CommerceResult<()>;
}
