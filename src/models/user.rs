use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::common::UserId;

/// Account role chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Citizen,
    Police,
    Hospital,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Citizen, Role::Police, Role::Hospital];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Citizen => "citizen",
            Role::Police => "police",
            Role::Hospital => "hospital",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Body of `POST /auth/create_users/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub phone_number: u64,
    pub address: String,
    pub password: String,
}

/// User record returned by registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub phone_number: u64,
    pub address: String,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("police".parse::<Role>().unwrap(), Role::Police);
        assert_eq!(" Hospital ".parse::<Role>().unwrap(), Role::Hospital);
        assert!("firefighter".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_registration_request_wire_shape() {
        let request = RegistrationRequest {
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: "ada@example.com".to_string(),
            role: Role::Citizen,
            phone_number: 8012345678,
            address: "Main Street".to_string(),
            password: "Abcd123!".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["role"], "citizen");
        assert_eq!(json["phone_number"], 8012345678u64);
    }

    #[test]
    fn test_profile_record_parses_backend_payload() {
        let record: ProfileRecord = serde_json::from_str(
            r#"{"id": 12, "first_name": "Ada", "last_name": "Obi", "email": "ada@example.com",
                "role": "citizen", "phone_number": 8012345678, "address": "Main Street",
                "longitude": 3.38, "latitude": 6.52, "is_verified": false,
                "created_at": "2025-01-02T10:00:00Z", "updated_at": "2025-01-02T10:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(record.id, 12);
        assert_eq!(record.latitude, Some(6.52));
        assert!(!record.is_verified);
    }
}
