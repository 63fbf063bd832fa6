use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{
    entities::subscriptions::SubscriptionEntity,
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        bill_dates::NextBillDate,
        enums::subscription_statuses::SubscriptionStatus,
        outcomes::{OutcomeKind, SubscriptionOperation, SubscriptionOutcome},
        subscriptions::{
            CancelSubscriptionModel, CreateSubscriptionModel, InputError, PaymentFailedModel,
            PaymentSucceededModel, SubscriptionAlert, SubscriptionModel, UpdateSubscriptionModel,
            decode_payload, parse_subscription_id,
        },
    },
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error(transparent)]
    Validation(#[from] InputError),
    #[error("subscription already exists")]
    AlreadyExists,
    #[error("subscription {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            SubscriptionError::Validation(_) => OutcomeKind::BadInput,
            SubscriptionError::AlreadyExists => OutcomeKind::Conflict,
            SubscriptionError::NotFound(_) => OutcomeKind::NotFound,
            SubscriptionError::Internal(_) => OutcomeKind::InternalFailure,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

impl SubscriptionOutcome {
    pub fn from_result<T>(operation: SubscriptionOperation, result: &UseCaseResult<T>) -> Self {
        match result {
            Ok(_) => SubscriptionOutcome::success(operation),
            Err(err) => SubscriptionOutcome::new(err.kind(), err.to_string()),
        }
    }
}

pub struct SubscriptionUseCase<T>
where
    T: SubscriptionRepository + Send + Sync,
{
    subscription_repository: Arc<T>,
}

impl<T> SubscriptionUseCase<T>
where
    T: SubscriptionRepository + Send + Sync,
{
    pub fn new(subscription_repository: Arc<T>) -> Self {
        Self {
            subscription_repository,
        }
    }

    pub async fn create_subscription(
        &self,
        create_subscription_model: CreateSubscriptionModel,
    ) -> UseCaseResult<SubscriptionModel> {
        // A duplicate id reports Conflict even when other fields are invalid.
        let subscription_id = parse_subscription_id(&create_subscription_model.subscription_id)
            .map_err(|err| self.rejected(SubscriptionOperation::Create, err))?;

        info!(subscription_id, "subscriptions: create requested");

        if self.find(subscription_id).await?.is_some() {
            let err = SubscriptionError::AlreadyExists;
            warn!(
                subscription_id,
                kind = %err.kind(),
                "subscriptions: subscription already exists"
            );
            return Err(err);
        }

        let command = create_subscription_model
            .parse()
            .map_err(|err| self.rejected(SubscriptionOperation::Create, err))?;

        let created = self
            .subscription_repository
            .insert_if_absent(command.to_entity())
            .await
            .map_err(|err| {
                error!(
                    subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to insert subscription"
                );
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = SubscriptionError::AlreadyExists;
                warn!(
                    subscription_id,
                    kind = %err.kind(),
                    "subscriptions: subscription created concurrently"
                );
                err
            })?;

        info!(
            subscription_id,
            id = %created.id,
            "subscriptions: subscription created"
        );

        Ok(SubscriptionModel::from(created))
    }

    pub async fn update_subscription(
        &self,
        update_subscription_model: UpdateSubscriptionModel,
    ) -> UseCaseResult<SubscriptionModel> {
        let command = update_subscription_model
            .parse()
            .map_err(|err| self.rejected(SubscriptionOperation::Update, err))?;

        info!(
            subscription_id = command.subscription_id,
            plan_id = command.plan_id,
            next_bill_date = %command.next_bill_date,
            status = %command.status,
            "subscriptions: update requested"
        );

        let mut subscription = self.find_existing(command.subscription_id).await?;
        subscription.plan_id = command.plan_id;
        subscription.next_bill_date = command.next_bill_date.into();
        subscription.status = command.status;

        self.persist(SubscriptionOperation::Update, subscription).await
    }

    pub async fn cancel_subscription(
        &self,
        cancel_subscription_model: CancelSubscriptionModel,
    ) -> UseCaseResult<SubscriptionModel> {
        let command = cancel_subscription_model
            .parse()
            .map_err(|err| self.rejected(SubscriptionOperation::Cancel, err))?;

        info!(
            subscription_id = command.subscription_id,
            status = %command.status,
            "subscriptions: cancel requested"
        );

        let mut subscription = self.find_existing(command.subscription_id).await?;
        subscription.next_bill_date = NextBillDate::unscheduled().into();
        subscription.status = command.status;
        subscription.cancelled_at = Some(Utc::now());

        self.persist(SubscriptionOperation::Cancel, subscription).await
    }

    pub async fn payment_succeeded(
        &self,
        payment_succeeded_model: PaymentSucceededModel,
    ) -> UseCaseResult<SubscriptionModel> {
        let command = payment_succeeded_model
            .parse()
            .map_err(|err| self.rejected(SubscriptionOperation::PaymentSucceeded, err))?;

        info!(
            subscription_id = command.subscription_id,
            next_bill_date = %command.next_bill_date,
            "subscriptions: payment succeeded notification"
        );

        // A successful payment leaves the status alone.
        let mut subscription = self.find_existing(command.subscription_id).await?;
        subscription.next_bill_date = command.next_bill_date.into();

        self.persist(SubscriptionOperation::PaymentSucceeded, subscription)
            .await
    }

    pub async fn payment_failed(
        &self,
        payment_failed_model: PaymentFailedModel,
    ) -> UseCaseResult<SubscriptionModel> {
        let command = payment_failed_model
            .parse()
            .map_err(|err| self.rejected(SubscriptionOperation::PaymentFailed, err))?;

        info!(
            subscription_id = command.subscription_id,
            "subscriptions: payment failed notification"
        );

        let mut subscription = self.find_existing(command.subscription_id).await?;
        subscription.next_bill_date = NextBillDate::unscheduled().into();
        subscription.status = SubscriptionStatus::PastDue.to_string();

        self.persist(SubscriptionOperation::PaymentFailed, subscription)
            .await
    }

    pub async fn get_subscription(&self, subscription_id: &str) -> UseCaseResult<SubscriptionModel> {
        let subscription_id = parse_subscription_id(subscription_id)?;
        let subscription = self.find_existing(subscription_id).await?;

        Ok(SubscriptionModel::from(subscription))
    }

    /// Decodes `payload` as the input of `operation` and runs it.
    pub async fn handle_payload(
        &self,
        operation: SubscriptionOperation,
        payload: &[u8],
    ) -> SubscriptionOutcome {
        let result = self.dispatch(operation, payload).await;

        SubscriptionOutcome::from_result(operation, &result)
    }

    /// Decodes a provider alert and dispatches on its `alert_name`.
    pub async fn handle_alert(&self, payload: &[u8]) -> SubscriptionOutcome {
        let alert = match decode_payload::<SubscriptionAlert>(payload) {
            Ok(alert) => alert,
            Err(err) => {
                warn!(error = %err, "subscriptions: undecodable alert");
                let err = SubscriptionError::from(err);
                return SubscriptionOutcome::new(err.kind(), err.to_string());
            }
        };

        let operation = alert.operation();
        info!(%operation, "subscriptions: alert received");

        let result = match alert {
            SubscriptionAlert::Created(model) => self.create_subscription(model).await,
            SubscriptionAlert::Updated(model) => self.update_subscription(model).await,
            SubscriptionAlert::Cancelled(model) => self.cancel_subscription(model).await,
            SubscriptionAlert::PaymentSucceeded(model) => self.payment_succeeded(model).await,
            SubscriptionAlert::PaymentFailed(model) => self.payment_failed(model).await,
        };

        SubscriptionOutcome::from_result(operation, &result)
    }

    async fn dispatch(
        &self,
        operation: SubscriptionOperation,
        payload: &[u8],
    ) -> UseCaseResult<SubscriptionModel> {
        match operation {
            SubscriptionOperation::Create => {
                self.create_subscription(self.decode(operation, payload)?)
                    .await
            }
            SubscriptionOperation::Update => {
                self.update_subscription(self.decode(operation, payload)?)
                    .await
            }
            SubscriptionOperation::Cancel => {
                self.cancel_subscription(self.decode(operation, payload)?)
                    .await
            }
            SubscriptionOperation::PaymentSucceeded => {
                self.payment_succeeded(self.decode(operation, payload)?)
                    .await
            }
            SubscriptionOperation::PaymentFailed => {
                self.payment_failed(self.decode(operation, payload)?).await
            }
        }
    }

    fn decode<M>(&self, operation: SubscriptionOperation, payload: &[u8]) -> UseCaseResult<M>
    where
        M: serde::de::DeserializeOwned,
    {
        decode_payload(payload).map_err(|err| self.rejected(operation, err))
    }

    fn rejected(&self, operation: SubscriptionOperation, err: InputError) -> SubscriptionError {
        let err = SubscriptionError::Validation(err);
        warn!(
            %operation,
            kind = %err.kind(),
            error = %err,
            "subscriptions: input rejected"
        );
        err
    }

    async fn find(&self, subscription_id: i64) -> UseCaseResult<Option<SubscriptionEntity>> {
        self.subscription_repository
            .find_by_subscription_id(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription"
                );
                SubscriptionError::Internal(err)
            })
    }

    async fn find_existing(&self, subscription_id: i64) -> UseCaseResult<SubscriptionEntity> {
        self.find(subscription_id).await?.ok_or_else(|| {
            let err = SubscriptionError::NotFound(subscription_id);
            warn!(
                subscription_id,
                kind = %err.kind(),
                "subscriptions: subscription not found"
            );
            err
        })
    }

    async fn persist(
        &self,
        operation: SubscriptionOperation,
        subscription: SubscriptionEntity,
    ) -> UseCaseResult<SubscriptionModel> {
        let subscription_id = subscription.subscription_id;

        let saved = self
            .subscription_repository
            .save(subscription)
            .await
            .map_err(|err| {
                error!(
                    %operation,
                    subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to save subscription"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            %operation,
            subscription_id,
            status = %saved.status,
            "subscriptions: subscription saved"
        );

        Ok(SubscriptionModel::from(saved))
    }
}
