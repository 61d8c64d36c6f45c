use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::status::{BookingStatus, PaymentStatus, UnknownStatus};

/// Which side of a booking a party is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Customer,
    Provider,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyRole::Customer => "customer",
            PartyRole::Provider => "provider",
        }
    }
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartyRole {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(PartyRole::Customer),
            "provider" => Ok(PartyRole::Provider),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A customer's reservation of a provider service.
///
/// `provider_id` references the provider profile, while `provider_user_id` is the
/// provider's party identity resolved by the store. Authorization always compares
/// party identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub provider_user_id: Uuid,
    pub provider_service_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub total_price: BigDecimal,
    pub travel_fee: BigDecimal,
    pub status: BookingStatus,
    pub payment_intent_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_party(&self, party_id: Uuid) -> bool {
        self.role_of(party_id).is_some()
    }

    pub fn role_of(&self, party_id: Uuid) -> Option<PartyRole> {
        if party_id == self.customer_id {
            Some(PartyRole::Customer)
        } else if party_id == self.provider_user_id {
            Some(PartyRole::Provider)
        } else {
            None
        }
    }

    pub fn party(&self, role: PartyRole) -> Uuid {
        match role {
            PartyRole::Customer => self.customer_id,
            PartyRole::Provider => self.provider_user_id,
        }
    }

    /// The party that did not act, or `None` if `party_id` is not on the booking.
    pub fn counter_party(&self, party_id: Uuid) -> Option<Uuid> {
        self.role_of(party_id).map(|role| match role {
            PartyRole::Customer => self.provider_user_id,
            PartyRole::Provider => self.customer_id,
        })
    }

    pub fn amounts_valid(&self) -> bool {
        let zero = BigDecimal::zero();
        self.total_price >= zero && self.travel_fee >= zero
    }
}

/// A booking joined with the display fields clients render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub service_name: String,
    pub service_duration_minutes: i32,
    pub customer_name: Option<String>,
    pub provider_business_name: String,
}

impl BookingDetails {
    pub fn id(&self) -> Uuid {
        self.booking.id
    }

    pub fn status(&self) -> BookingStatus {
        self.booking.status
    }
}
