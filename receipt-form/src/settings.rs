//! Portable business settings file (`business_settings.json`).

use serde::{Deserialize, Serialize};

use crate::models::BusinessProfile;

pub const SETTINGS_FILENAME: &str = "business_settings.json";

/// Flat on-disk shape of a [`BusinessProfile`]. Missing fields load as empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BusinessSettings {
    pub business_name: String,
    pub business_address: String,
    pub business_email: String,
    pub business_phone: String,
    pub logo_filename: String,
}

impl BusinessSettings {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(raw: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(raw)
    }
}

impl From<&BusinessProfile> for BusinessSettings {
    fn from(profile: &BusinessProfile) -> Self {
        Self {
            business_name: profile.name.clone(),
            business_address: profile.address.clone(),
            business_email: profile.email.clone(),
            business_phone: profile.phone.clone(),
            logo_filename: profile.logo_filename.clone().unwrap_or_default(),
        }
    }
}

impl From<BusinessSettings> for BusinessProfile {
    fn from(settings: BusinessSettings) -> Self {
        Self {
            name: settings.business_name,
            address: settings.business_address,
            email: settings.business_email,
            phone: settings.business_phone,
            logo_filename: Some(settings.logo_filename).filter(|name| !name.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            name: "Acme Ltd".to_string(),
            address: "1 Main St\nSpringfield".to_string(),
            email: "billing@acme.test".to_string(),
            phone: "+1 555 0100".to_string(),
            logo_filename: Some("acme_1700000000_ab12cd34.png".to_string()),
        }
    }

    #[test]
    fn export_then_import_reproduces_profile() {
        let original = profile();
        let json = BusinessSettings::from(&original).to_json_pretty().unwrap();
        let restored: BusinessProfile = BusinessSettings::from_json(json.as_bytes())
            .unwrap()
            .into();
        assert_eq!(restored, original);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let settings = BusinessSettings::from_json(br#"{"business_name": "Solo"}"#).unwrap();
        assert_eq!(settings.business_name, "Solo");
        assert_eq!(settings.business_email, "");

        let profile: BusinessProfile = settings.into();
        assert_eq!(profile.logo_filename, None);
    }

    #[test]
    fn empty_logo_name_round_trips_as_normalized_profile() {
        let original = BusinessProfile {
            logo_filename: Some(String::new()),
            ..profile()
        };
        let json = BusinessSettings::from(&original).to_json_pretty().unwrap();
        let restored: BusinessProfile = BusinessSettings::from_json(json.as_bytes())
            .unwrap()
            .into();
        assert_eq!(restored, original.clone().normalized());
        assert_eq!(restored.logo_filename, None);
    }

    #[test]
    fn export_uses_flat_field_names() {
        let value = serde_json::to_value(BusinessSettings::from(&profile())).unwrap();
        assert_eq!(value["business_phone"], "+1 555 0100");
        assert_eq!(value["logo_filename"], "acme_1700000000_ab12cd34.png");
    }
}
