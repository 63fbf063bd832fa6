use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::subscriptions;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable, Insertable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub subscription_id: i64,
    pub plan_id: i64,
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub status: String,
    pub next_bill_date: Option<NaiveDate>,
    pub update_url: Option<String>,
    pub cancel_url: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub subscription_id: i64,
    pub plan_id: i64,
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub status: String,
    pub next_bill_date: Option<NaiveDate>,
    pub update_url: Option<String>,
    pub cancel_url: Option<String>,
}

impl InsertSubscriptionEntity {
    /// Materialises the row a store would hold after inserting this entity.
    pub fn into_entity(self, id: Uuid, now: DateTime<Utc>) -> SubscriptionEntity {
        SubscriptionEntity {
            id,
            subscription_id: self.subscription_id,
            plan_id: self.plan_id,
            user_id: self.user_id,
            email: self.email,
            status: self.status,
            next_bill_date: self.next_bill_date,
            update_url: self.update_url,
            cancel_url: self.cancel_url,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Columns the lifecycle operations are allowed to rewrite. `None` clears the column.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = subscriptions)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateSubscriptionEntity {
    pub plan_id: i64,
    pub status: String,
    pub next_bill_date: Option<NaiveDate>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<&SubscriptionEntity> for UpdateSubscriptionEntity {
    fn from(value: &SubscriptionEntity) -> Self {
        Self {
            plan_id: value.plan_id,
            status: value.status.clone(),
            next_bill_date: value.next_bill_date,
            cancelled_at: value.cancelled_at,
        }
    }
}
