use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_by_subscription_id(
        &self,
        subscription_id: i64,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Upserts by internal id and returns the stored row.
    async fn save(&self, subscription_entity: SubscriptionEntity) -> Result<SubscriptionEntity>;

    /// Inserts unless a row with the same `subscription_id` exists, in which case `None`.
    async fn insert_if_absent(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>>;
}
