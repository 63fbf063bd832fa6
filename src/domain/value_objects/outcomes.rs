use std::fmt::Display;

/// Canonical result categories; the transport decides how to signal each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    BadInput,
    Conflict,
    NotFound,
    InternalFailure,
}

impl Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            OutcomeKind::Success => "success",
            OutcomeKind::BadInput => "bad_input",
            OutcomeKind::Conflict => "conflict",
            OutcomeKind::NotFound => "not_found",
            OutcomeKind::InternalFailure => "internal_failure",
        };
        write!(f, "{}", kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionOperation {
    Create,
    Update,
    Cancel,
    PaymentSucceeded,
    PaymentFailed,
}

impl SubscriptionOperation {
    pub fn success_message(&self) -> &'static str {
        match self {
            SubscriptionOperation::Create => "Subscription created successfully.",
            SubscriptionOperation::Update => "Subscription updated successfully.",
            SubscriptionOperation::Cancel => "Subscription cancelled.",
            SubscriptionOperation::PaymentSucceeded => "Subscription payment succeeded.",
            SubscriptionOperation::PaymentFailed => "Subscription payment failed.",
        }
    }
}

impl Display for SubscriptionOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operation = match self {
            SubscriptionOperation::Create => "create",
            SubscriptionOperation::Update => "update",
            SubscriptionOperation::Cancel => "cancel",
            SubscriptionOperation::PaymentSucceeded => "payment_succeeded",
            SubscriptionOperation::PaymentFailed => "payment_failed",
        };
        write!(f, "{}", operation)
    }
}

/// What a lifecycle operation reports back: a classification and display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionOutcome {
    pub kind: OutcomeKind,
    pub message: String,
}

impl SubscriptionOutcome {
    pub fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(operation: SubscriptionOperation) -> Self {
        Self::new(OutcomeKind::Success, operation.success_message())
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}
