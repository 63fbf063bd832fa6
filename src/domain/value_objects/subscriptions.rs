use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    value_objects::{
        bill_dates::NextBillDate, enums::subscription_statuses::SubscriptionStatus,
        outcomes::SubscriptionOperation,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("malformed payload: {0}")]
    Decode(String),
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl InputError {
    pub fn invalid(field: &'static str, reason: impl Display) -> Self {
        InputError::InvalidField {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Decodes a JSON object body into one of the typed inputs below.
pub fn decode_payload<T>(payload: &[u8]) -> Result<T, InputError>
where
    T: DeserializeOwned,
{
    // Derived struct deserializers also take sequences, so insist on an object first.
    let object = serde_json::from_slice::<Map<String, Value>>(payload)
        .map_err(|err| InputError::Decode(err.to_string()))?;

    serde_json::from_value(Value::Object(object))
        .map_err(|err| InputError::Decode(err.to_string()))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateSubscriptionModel {
    #[serde(default, deserialize_with = "string_or_number")]
    pub subscription_id: String,
    #[serde(default, alias = "plan_id", deserialize_with = "string_or_number")]
    pub subscription_plan_id: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub next_bill_date: Option<String>,
    #[serde(default)]
    pub update_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSubscription {
    pub subscription_id: i64,
    pub plan_id: i64,
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub status: String,
    pub next_bill_date: NextBillDate,
    pub update_url: Option<String>,
    pub cancel_url: Option<String>,
}

impl CreateSubscriptionModel {
    pub fn parse(&self) -> Result<CreateSubscription, InputError> {
        let subscription_id = parse_subscription_id(&self.subscription_id)?;
        let plan_id = parse_integer("subscription_plan_id", &self.subscription_plan_id)?;
        let user_id = non_blank(&self.user_id)
            .map(|raw| parse_integer("user_id", raw))
            .transpose()?;
        let next_bill_date = match non_blank(&self.next_bill_date) {
            Some(raw) => parse_bill_date("next_bill_date", raw)?,
            None => NextBillDate::unscheduled(),
        };
        let status = non_blank(&self.status)
            .map(|raw| raw.trim().to_string())
            .unwrap_or_else(|| SubscriptionStatus::Active.to_string());

        Ok(CreateSubscription {
            subscription_id,
            plan_id,
            user_id,
            email: non_blank(&self.email).map(str::to_string),
            status,
            next_bill_date,
            update_url: non_blank(&self.update_url).map(str::to_string),
            cancel_url: non_blank(&self.cancel_url).map(str::to_string),
        })
    }
}

impl CreateSubscription {
    pub fn to_entity(&self) -> InsertSubscriptionEntity {
        InsertSubscriptionEntity {
            subscription_id: self.subscription_id,
            plan_id: self.plan_id,
            user_id: self.user_id,
            email: self.email.clone(),
            status: self.status.clone(),
            next_bill_date: self.next_bill_date.into(),
            update_url: self.update_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateSubscriptionModel {
    #[serde(default, deserialize_with = "string_or_number")]
    pub subscription_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub subscription_plan_id: String,
    #[serde(default)]
    pub next_bill_date: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSubscription {
    pub subscription_id: i64,
    pub plan_id: i64,
    pub next_bill_date: NextBillDate,
    pub status: String,
}

impl UpdateSubscriptionModel {
    pub fn parse(&self) -> Result<UpdateSubscription, InputError> {
        Ok(UpdateSubscription {
            subscription_id: parse_subscription_id(&self.subscription_id)?,
            plan_id: parse_integer("subscription_plan_id", &self.subscription_plan_id)?,
            next_bill_date: parse_bill_date("next_bill_date", &self.next_bill_date)?,
            status: required_text("status", &self.status)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CancelSubscriptionModel {
    #[serde(default, deserialize_with = "string_or_number")]
    pub subscription_id: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancelSubscription {
    pub subscription_id: i64,
    pub status: String,
}

impl CancelSubscriptionModel {
    pub fn parse(&self) -> Result<CancelSubscription, InputError> {
        Ok(CancelSubscription {
            subscription_id: parse_subscription_id(&self.subscription_id)?,
            status: required_text("status", &self.status)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentSucceededModel {
    #[serde(default, deserialize_with = "string_or_number")]
    pub subscription_id: String,
    #[serde(default)]
    pub next_bill_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSucceeded {
    pub subscription_id: i64,
    pub next_bill_date: NextBillDate,
}

impl PaymentSucceededModel {
    pub fn parse(&self) -> Result<PaymentSucceeded, InputError> {
        Ok(PaymentSucceeded {
            subscription_id: parse_subscription_id(&self.subscription_id)?,
            next_bill_date: parse_bill_date("next_bill_date", &self.next_bill_date)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentFailedModel {
    #[serde(default, deserialize_with = "string_or_number")]
    pub subscription_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFailed {
    pub subscription_id: i64,
}

impl PaymentFailedModel {
    pub fn parse(&self) -> Result<PaymentFailed, InputError> {
        Ok(PaymentFailed {
            subscription_id: parse_subscription_id(&self.subscription_id)?,
        })
    }
}

/// A provider notification, discriminated by its `alert_name` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "alert_name")]
pub enum SubscriptionAlert {
    #[serde(rename = "subscription_created")]
    Created(CreateSubscriptionModel),
    #[serde(rename = "subscription_updated")]
    Updated(UpdateSubscriptionModel),
    #[serde(rename = "subscription_cancelled")]
    Cancelled(CancelSubscriptionModel),
    #[serde(rename = "subscription_payment_succeeded")]
    PaymentSucceeded(PaymentSucceededModel),
    #[serde(rename = "subscription_payment_failed")]
    PaymentFailed(PaymentFailedModel),
}

impl SubscriptionAlert {
    pub fn operation(&self) -> SubscriptionOperation {
        match self {
            SubscriptionAlert::Created(_) => SubscriptionOperation::Create,
            SubscriptionAlert::Updated(_) => SubscriptionOperation::Update,
            SubscriptionAlert::Cancelled(_) => SubscriptionOperation::Cancel,
            SubscriptionAlert::PaymentSucceeded(_) => SubscriptionOperation::PaymentSucceeded,
            SubscriptionAlert::PaymentFailed(_) => SubscriptionOperation::PaymentFailed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: Uuid,
    pub subscription_id: i64,
    pub plan_id: i64,
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub status: String,
    pub next_bill_date: NextBillDate,
    pub update_url: Option<String>,
    pub cancel_url: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionEntity> for SubscriptionModel {
    fn from(value: SubscriptionEntity) -> Self {
        Self {
            id: value.id,
            subscription_id: value.subscription_id,
            plan_id: value.plan_id,
            user_id: value.user_id,
            email: value.email,
            status: value.status,
            next_bill_date: NextBillDate::from(value.next_bill_date),
            update_url: value.update_url,
            cancel_url: value.cancel_url,
            cancelled_at: value.cancelled_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Provider ids are unsigned but stored in a BIGINT column.
pub fn parse_subscription_id(raw: &str) -> Result<i64, InputError> {
    let value = raw
        .parse::<u64>()
        .map_err(|err| InputError::invalid("subscription_id", err))?;

    i64::try_from(value).map_err(|err| InputError::invalid("subscription_id", err))
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64, InputError> {
    raw.parse::<i64>()
        .map_err(|err| InputError::invalid(field, err))
}

fn parse_bill_date(field: &'static str, raw: &str) -> Result<NextBillDate, InputError> {
    NextBillDate::parse(raw).map_err(|err| InputError::invalid(field, err))
}

fn required_text(field: &'static str, raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::invalid(field, "value is required"));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Signed(number) => number.to_string(),
            StringOrNumber::Unsigned(number) => number.to_string(),
        }
    }
}

// Integer fields may arrive as JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn create_accepts_numeric_fields_and_plan_id_alias() {
        let model: CreateSubscriptionModel =
            decode_payload(br#"{"subscription_id": "42", "plan_id": 3}"#).unwrap();

        let command = model.parse().unwrap();
        assert_eq!(command.subscription_id, 42);
        assert_eq!(command.plan_id, 3);
        assert_eq!(command.status, "active");
        assert_eq!(command.next_bill_date, NextBillDate::unscheduled());
        assert_eq!(command.user_id, None);
    }

    #[test]
    fn create_carries_optional_provider_fields() {
        let model: CreateSubscriptionModel = decode_payload(
            br#"{
                "subscription_id": "7001",
                "subscription_plan_id": "12",
                "user_id": "55",
                "email": "jane@example.com",
                "status": "trialing",
                "next_bill_date": "2024-05-01",
                "update_url": "https://billing.example.com/update",
                "cancel_url": "",
                "checkout_id": "ignored"
            }"#,
        )
        .unwrap();

        let entity = model.parse().unwrap().to_entity();
        assert_eq!(entity.subscription_id, 7001);
        assert_eq!(entity.plan_id, 12);
        assert_eq!(entity.user_id, Some(55));
        assert_eq!(entity.email.as_deref(), Some("jane@example.com"));
        assert_eq!(entity.status, "trialing");
        assert_eq!(entity.next_bill_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(
            entity.update_url.as_deref(),
            Some("https://billing.example.com/update")
        );
        assert_eq!(entity.cancel_url, None);
    }

    #[test]
    fn create_rejects_malformed_identifier() {
        let model = CreateSubscriptionModel {
            subscription_id: "abc".to_string(),
            subscription_plan_id: "1".to_string(),
            ..Default::default()
        };

        let err = model.parse().unwrap_err();
        assert!(matches!(
            err,
            InputError::InvalidField {
                field: "subscription_id",
                ..
            }
        ));
    }

    #[test]
    fn decode_failure_is_reported_as_decode_error() {
        let result = decode_payload::<CreateSubscriptionModel>(b"{not json");
        assert!(matches!(result, Err(InputError::Decode(_))));

        let result = decode_payload::<CreateSubscriptionModel>(br#"{"email": 5}"#);
        assert!(matches!(result, Err(InputError::Decode(_))));
    }

    #[test]
    fn array_bodies_are_decode_errors() {
        let result = decode_payload::<CreateSubscriptionModel>(b"[1, 2, 3]");
        assert!(matches!(result, Err(InputError::Decode(_))));

        let result =
            decode_payload::<UpdateSubscriptionModel>(br#"["1", "9", "2025-01-01", "active"]"#);
        assert!(matches!(result, Err(InputError::Decode(_))));
    }

    #[test]
    fn identifiers_with_surrounding_whitespace_are_rejected() {
        assert!(parse_subscription_id(" 42 ").is_err());
        assert!(parse_subscription_id("42\n").is_err());
        assert!(parse_integer("subscription_plan_id", " 7").is_err());
    }

    #[test]
    fn subscription_id_must_be_unsigned_and_fit_storage() {
        assert_eq!(parse_subscription_id("42").unwrap(), 42);
        assert!(parse_subscription_id("-1").is_err());
        assert!(parse_subscription_id("").is_err());
        assert!(parse_subscription_id("18446744073709551615").is_err());
    }

    #[test]
    fn update_missing_fields_fail_instead_of_keeping_old_values() {
        let model: UpdateSubscriptionModel =
            decode_payload(br#"{"subscription_id": "42", "status": "active"}"#).unwrap();

        let err = model.parse().unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidField {
                field: "subscription_plan_id",
                reason: "cannot parse integer from empty string".to_string(),
            }
        );
    }

    #[test]
    fn update_names_the_offending_field() {
        let model = UpdateSubscriptionModel {
            subscription_id: "42".to_string(),
            subscription_plan_id: "7".to_string(),
            next_bill_date: "2024-02-30".to_string(),
            status: "active".to_string(),
        };

        let err = model.parse().unwrap_err();
        assert!(err.to_string().starts_with("invalid next_bill_date"));
    }

    #[test]
    fn cancel_requires_a_status() {
        let model = CancelSubscriptionModel {
            subscription_id: "42".to_string(),
            status: "  ".to_string(),
        };

        assert!(matches!(
            model.parse(),
            Err(InputError::InvalidField { field: "status", .. })
        ));
    }

    #[test]
    fn alert_dispatches_on_alert_name() {
        let alert: SubscriptionAlert = decode_payload(
            br#"{"alert_name": "subscription_payment_failed", "subscription_id": "42"}"#,
        )
        .unwrap();

        assert_eq!(alert.operation(), SubscriptionOperation::PaymentFailed);
        assert_eq!(
            alert,
            SubscriptionAlert::PaymentFailed(PaymentFailedModel {
                subscription_id: "42".to_string()
            })
        );
    }

    #[test]
    fn unknown_alert_is_a_decode_error() {
        let result = decode_payload::<SubscriptionAlert>(
            br#"{"alert_name": "subscription_payment_refunded", "subscription_id": "42"}"#,
        );
        assert!(matches!(result, Err(InputError::Decode(_))));
    }
}
