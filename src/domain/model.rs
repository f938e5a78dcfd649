use serde::{Deserialize, Serialize};

/// A tenant-scoped customer account. Fields the API omits fall back to
/// empty values rather than failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "isActive", default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Only the count of addresses matters to the reports, so the record is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub serde_json::Value);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "companyName", default)]
    pub company_name: String,
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Remaining API fields, written back out untouched in the property export.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPage {
    #[serde(default)]
    pub items: Vec<Customer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyPage {
    #[serde(default)]
    pub items: Vec<Property>,
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
}
