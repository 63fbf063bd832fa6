use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    repositories::subscriptions::SubscriptionRepository,
};

/// Process-local store keyed by the provider's subscription id.
#[derive(Default)]
pub struct SubscriptionInMemory {
    subscriptions: Mutex<HashMap<i64, SubscriptionEntity>>,
}

impl SubscriptionInMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: Vec<SubscriptionEntity>) -> Self {
        let subscriptions = subscriptions
            .into_iter()
            .map(|subscription| (subscription.subscription_id, subscription))
            .collect();
        Self {
            subscriptions: Mutex::new(subscriptions),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<i64, SubscriptionEntity>>> {
        self.subscriptions
            .lock()
            .map_err(|_| anyhow!("subscription store lock poisoned"))
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionInMemory {
    async fn find_by_subscription_id(
        &self,
        subscription_id: i64,
    ) -> Result<Option<SubscriptionEntity>> {
        Ok(self.lock()?.get(&subscription_id).cloned())
    }

    async fn save(&self, subscription_entity: SubscriptionEntity) -> Result<SubscriptionEntity> {
        let mut subscriptions = self.lock()?;

        if let Some(other) = subscriptions.values().find(|existing| {
            existing.subscription_id == subscription_entity.subscription_id
                && existing.id != subscription_entity.id
        }) {
            return Err(anyhow!(
                "subscription_id {} already belongs to {}",
                other.subscription_id,
                other.id
            ));
        }

        let mut saved = subscription_entity;
        saved.updated_at = Utc::now();
        subscriptions.insert(saved.subscription_id, saved.clone());

        Ok(saved)
    }

    async fn insert_if_absent(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut subscriptions = self.lock()?;

        if subscriptions.contains_key(&insert_subscription_entity.subscription_id) {
            return Ok(None);
        }

        let created = insert_subscription_entity.into_entity(Uuid::new_v4(), Utc::now());
        subscriptions.insert(created.subscription_id, created.clone());

        Ok(Some(created))
    }
}
