//! Profile DTOs

use serde::{Deserialize, Serialize};

/// Request to create a new profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    pub company_name: String,
    pub password: String,
    pub address: String,
}

impl CreateProfile {
    /// Names of the fields that are blank, in declaration order
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("company_name", &self.company_name),
            ("password", &self.password),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Partial update of an existing profile
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none() && self.address.is_none() && self.password.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields() {
        let req = CreateProfile {
            company_name: "Planet Express".to_string(),
            password: "  ".to_string(),
            address: String::new(),
        };
        assert_eq!(req.blank_fields(), vec!["password", "address"]);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateProfile::default().is_empty());

        let update = UpdateProfile {
            address: Some("1 Robot Way".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
