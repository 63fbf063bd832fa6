use std::fmt::Display;

/// Status tokens written by the service itself. Stored statuses stay free-form.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    #[default]
    Active,
    PastDue,
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
        };
        write!(f, "{}", status)
    }
}
