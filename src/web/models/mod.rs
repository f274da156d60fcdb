use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::db::models::SubscriptionInput;
use crate::services::subscription_service::SubscriptionParams;
use crate::web::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// The caller behind a verified bearer token, attached as a request extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
}

/// Body of create and update requests. Server-assigned fields sent by the client are ignored.
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "flexible_date::deserialize_option")]
    pub end_date: Option<NaiveDate>,
}

impl SubscriptionRequest {
    pub fn into_input(self) -> Result<SubscriptionInput, AppError> {
        if self.service_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "service_name must not be empty".to_string(),
            ));
        }
        Ok(SubscriptionInput {
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// `?user_id=&service_name=&from=YYYY-MM-DD&to=YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl SubscriptionQuery {
    /// Dates that do not parse are dropped instead of failing the request.
    pub fn params(&self) -> SubscriptionParams<'_> {
        SubscriptionParams {
            user_id: self.user_id.as_deref(),
            service_name: self.service_name.as_deref(),
            from: parse_query_date(self.from.as_deref()),
            to: parse_query_date(self.to.as_deref()),
        }
    }
}

fn parse_query_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalPriceResponse {
    pub total_price: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, keeping only the calendar date.
mod flexible_date {
    use super::*;

    fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            de::Error::custom(format!("invalid date `{raw}`, expected YYYY-MM-DD"))
        })
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => parse(&raw).map(Some).ok_or_else(|| {
                de::Error::custom(format!("invalid date `{raw}`, expected YYYY-MM-DD"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_plain_and_rfc3339_dates() {
        let req: SubscriptionRequest = serde_json::from_value(serde_json::json!({
            "id": 42,
            "service_name": "Netflix",
            "price": 10000,
            "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba",
            "start_date": "2026-01-01",
            "end_date": "2026-06-28T15:04:05Z"
        }))
        .unwrap();

        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(req.end_date, NaiveDate::from_ymd_opt(2026, 6, 28));
    }

    #[test]
    fn test_request_end_date_is_optional() {
        let req: SubscriptionRequest = serde_json::from_value(serde_json::json!({
            "service_name": "Netflix",
            "price": 10000,
            "user_id": "u1",
            "start_date": "2026-01-01",
            "end_date": null
        }))
        .unwrap();
        assert!(req.end_date.is_none());
    }

    #[test]
    fn test_request_rejects_bad_date() {
        let result: Result<SubscriptionRequest, _> = serde_json::from_value(serde_json::json!({
            "service_name": "Netflix",
            "price": 10000,
            "user_id": "u1",
            "start_date": "01/01/2026"
        }));
        assert!(result.unwrap_err().to_string().contains("expected YYYY-MM-DD"));
    }

    #[test]
    fn test_blank_service_name_is_invalid() {
        let req = SubscriptionRequest {
            service_name: "  ".to_string(),
            price: 1,
            user_id: "u1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: None,
        };
        assert!(matches!(req.into_input(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_query_ignores_unparsable_dates() {
        let query = SubscriptionQuery {
            user_id: Some("u1".to_string()),
            service_name: None,
            from: Some("2026-13-45".to_string()),
            to: Some("2026-03-01".to_string()),
        };
        let params = query.params();
        assert_eq!(params.user_id, Some("u1"));
        assert_eq!(params.from, None);
        assert_eq!(params.to, NaiveDate::from_ymd_opt(2026, 3, 1));
    }
}
