use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commerce_core::{CustomerId, DomainError, DomainResult, Entity};

/// Entity: Customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CustomerRecord")]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CustomerRecord {
    id: CustomerId,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRecord> for Customer {
    type Error = DomainError;

    fn try_from(record: CustomerRecord) -> DomainResult<Self> {
        Customer::new(record.id, record.name, record.email, record.created_at)
    }
}

impl Customer {
    /// Build a customer record, validating name and email.
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !is_plausible_email(&email) {
            return Err(DomainError::validation(format!("invalid email: {email}")));
        }

        Ok(Self {
            id,
            name,
            email,
            created_at,
        })
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// Shape check only: one '@' with something on both sides and a dot in the domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
