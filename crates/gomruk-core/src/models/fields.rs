//! Structured field record extracted from a document.

use serde::{Deserialize, Serialize};

/// Fields the parser knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    CompanyName,
    CompanyAddress,
    /// Tax identification number (VÖEN / US Tax ID).
    Voen,
    /// Vehicle identification number.
    Vin,
    /// Personal identification (FIN) code.
    IdNumber,
    Passport,
    Phone,
    Email,
    Surname,
    Name,
    FatherName,
    PersonalAddress,
}

impl FieldKind {
    /// Every field, in record order.
    pub const ALL: [FieldKind; 12] = [
        FieldKind::CompanyName,
        FieldKind::CompanyAddress,
        FieldKind::Voen,
        FieldKind::Vin,
        FieldKind::IdNumber,
        FieldKind::Passport,
        FieldKind::Phone,
        FieldKind::Email,
        FieldKind::Surname,
        FieldKind::Name,
        FieldKind::FatherName,
        FieldKind::PersonalAddress,
    ];

    /// Field name as used in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::CompanyName => "companyName",
            FieldKind::CompanyAddress => "companyAddress",
            FieldKind::Voen => "voen",
            FieldKind::Vin => "vin",
            FieldKind::IdNumber => "idNumber",
            FieldKind::Passport => "passport",
            FieldKind::Phone => "phone",
            FieldKind::Email => "email",
            FieldKind::Surname => "surname",
            FieldKind::Name => "name",
            FieldKind::FatherName => "fatherName",
            FieldKind::PersonalAddress => "personalAddress",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Company and identity attributes found in a document.
///
/// A field is `Some` only when an extraction rule matched it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub voen: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_address: Option<String>,
}

impl FieldRecord {
    /// Get a field value.
    pub fn get(&self, kind: FieldKind) -> Option<&str> {
        self.slot(kind).as_deref()
    }

    /// Set a field value.
    pub fn set(&mut self, kind: FieldKind, value: impl Into<String>) {
        *self.slot_mut(kind) = Some(value.into());
    }

    /// Check whether a field is present.
    pub fn has(&self, kind: FieldKind) -> bool {
        self.get(kind).is_some()
    }

    /// Check whether no field is present.
    pub fn is_empty(&self) -> bool {
        FieldKind::ALL.iter().all(|k| !self.has(*k))
    }

    /// Iterate over present fields in record order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKind, &str)> {
        FieldKind::ALL
            .into_iter()
            .filter_map(move |k| self.get(k).map(|v| (k, v)))
    }

    /// Fields without a value.
    pub fn missing(&self) -> Vec<FieldKind> {
        FieldKind::ALL.into_iter().filter(|k| !self.has(*k)).collect()
    }

    fn slot(&self, kind: FieldKind) -> &Option<String> {
        match kind {
            FieldKind::CompanyName => &self.company_name,
            FieldKind::CompanyAddress => &self.company_address,
            FieldKind::Voen => &self.voen,
            FieldKind::Vin => &self.vin,
            FieldKind::IdNumber => &self.id_number,
            FieldKind::Passport => &self.passport,
            FieldKind::Phone => &self.phone,
            FieldKind::Email => &self.email,
            FieldKind::Surname => &self.surname,
            FieldKind::Name => &self.name,
            FieldKind::FatherName => &self.father_name,
            FieldKind::PersonalAddress => &self.personal_address,
        }
    }

    fn slot_mut(&mut self, kind: FieldKind) -> &mut Option<String> {
        match kind {
            FieldKind::CompanyName => &mut self.company_name,
            FieldKind::CompanyAddress => &mut self.company_address,
            FieldKind::Voen => &mut self.voen,
            FieldKind::Vin => &mut self.vin,
            FieldKind::IdNumber => &mut self.id_number,
            FieldKind::Passport => &mut self.passport,
            FieldKind::Phone => &mut self.phone,
            FieldKind::Email => &mut self.email,
            FieldKind::Surname => &mut self.surname,
            FieldKind::Name => &mut self.name,
            FieldKind::FatherName => &mut self.father_name,
            FieldKind::PersonalAddress => &mut self.personal_address,
        }
    }
}
