use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::subscription;

/// A subscription as returned by the API.
/// Corresponds to an active row of the `subscriptions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl From<subscription::Model> for Subscription {
    fn from(model: subscription::Model) -> Self {
        Subscription {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
            service_name: model.service_name,
            price: model.price,
            user_id: model.user_id,
            start_date: model.start_date,
            end_date: model.end_date,
        }
    }
}

/// The client-controlled fields of a subscription, used for both create and whole-record update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInput {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Conditions applied to list and aggregate queries. Every field is optional and the
/// present ones are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    /// Inclusive lower bound on `start_date`.
    pub start_from: Option<NaiveDate>,
    /// Inclusive upper bound on `start_date`.
    pub start_to: Option<NaiveDate>,
}

impl SubscriptionFilter {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.service_name.is_none()
            && self.start_from.is_none()
            && self.start_to.is_none()
    }

    /// Evaluates the filter against a row. Status is not checked here.
    pub fn matches(&self, model: &subscription::Model) -> bool {
        self.user_id.as_deref().is_none_or(|u| model.user_id == u)
            && self
                .service_name
                .as_deref()
                .is_none_or(|s| model.service_name == s)
            && self.start_from.is_none_or(|from| model.start_date >= from)
            && self.start_to.is_none_or(|to| model.start_date <= to)
    }
}
