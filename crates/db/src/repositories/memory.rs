use std::collections::HashMap;

use tokio::sync::RwLock;

use roamly_core::coupons::{CouponDirectory, SessionStore};
use roamly_core::domain::coupon::Coupon;
use roamly_core::domain::session::{CheckoutSession, SessionId};
use roamly_core::errors::StoreError;

/// In-memory stand-ins for the SQLite stores, for tests and offline tooling.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, CheckoutSession>>,
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn find(&self, id: &SessionId) -> Result<Option<CheckoutSession>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&id.0).cloned())
    }

    async fn save(&self, session: &CheckoutSession) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.0.clone(), session.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for &InMemorySessionStore {
    async fn find(&self, id: &SessionId) -> Result<Option<CheckoutSession>, StoreError> {
        (**self).find(id).await
    }

    async fn save(&self, session: &CheckoutSession) -> Result<(), StoreError> {
        (**self).save(session).await
    }
}

#[derive(Default)]
pub struct InMemoryCouponDirectory {
    coupons: RwLock<HashMap<String, Coupon>>,
}

impl InMemoryCouponDirectory {
    pub async fn insert(&self, coupon: Coupon) {
        let mut coupons = self.coupons.write().await;
        coupons.insert(coupon.code.to_ascii_lowercase(), coupon);
    }
}

#[async_trait::async_trait]
impl CouponDirectory for InMemoryCouponDirectory {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let coupons = self.coupons.read().await;
        Ok(coupons.get(&code.to_ascii_lowercase()).cloned())
    }
}

#[async_trait::async_trait]
impl CouponDirectory for &InMemoryCouponDirectory {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        (**self).find_by_code(code).await
    }
}
