//! Site profiles: per-target strategies for locating and filling fields.

use serde::Serialize;
use tracing::{debug, info};

use super::locate::fill_by_labels;
use super::markup::{Highlight, MarkupTree, NodeId};
use super::writer::ValueWriter;
use super::{FieldState, FillDetail, FillOutcome, TargetState};
use crate::models::fields::{FieldKind, FieldRecord};

/// Whether a located control may be written when it already holds a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OverwritePolicy {
    Always,
    RequireEmpty,
}

/// Value written into a fill target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetValue {
    /// A record field, verbatim.
    Field(FieldKind),
    /// `"<companyName> - <companyAddress>"`, or the company name alone.
    Notes,
}

impl TargetValue {
    /// Name reported in fill outcomes.
    pub fn name(&self) -> &'static str {
        match self {
            TargetValue::Field(kind) => kind.as_str(),
            TargetValue::Notes => "notes",
        }
    }

    /// Value for this target, `None` when the record lacks it.
    pub fn resolve(&self, record: &FieldRecord) -> Option<String> {
        match self {
            TargetValue::Field(kind) => record.get(*kind).map(str::to_string),
            TargetValue::Notes => {
                let name = record.company_name.as_deref()?;
                Some(match record.company_address.as_deref() {
                    Some(address) => format!("{name} - {address}"),
                    None => name.to_string(),
                })
            }
        }
    }
}

/// A form field a profile fills, and the labels that identify it.
#[derive(Debug, Clone, Copy)]
pub struct FieldTarget {
    pub value: TargetValue,
    pub labels: &'static [&'static str],
}

impl FieldTarget {
    const fn field(kind: FieldKind, labels: &'static [&'static str]) -> Self {
        Self {
            value: TargetValue::Field(kind),
            labels,
        }
    }
}

/// Strategy for one family of target sites.
///
/// Profiles are stateless and shared process-wide.
pub trait SiteProfile: Send + Sync {
    /// Stable identifier.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Whether this profile handles the target descriptor (origin or URL).
    fn matches(&self, target: &str) -> bool;

    /// Fields this profile fills, in fill order.
    fn targets(&self) -> &[FieldTarget];

    /// Overwrite policy for located controls.
    fn overwrite(&self) -> OverwritePolicy {
        OverwritePolicy::RequireEmpty
    }

    /// Title of the section searched before the whole document.
    fn sender_section(&self) -> Option<&str> {
        None
    }

    /// The control must never be filled.
    fn is_excluded(&self, _tree: &dyn MarkupTree, _node: NodeId) -> bool {
        false
    }

    /// `false` only for the null profile.
    fn is_supported(&self) -> bool {
        true
    }

    /// Locate target controls and write the record's values into them.
    fn locate_and_fill(
        &self,
        record: &FieldRecord,
        tree: &mut dyn MarkupTree,
        writer: &dyn ValueWriter,
        highlight: &Highlight,
    ) -> FillOutcome {
        fill_by_labels(self, record, tree, writer, highlight)
    }
}

/// Turanbank mobile banking test form.
///
/// The company name is written into the single password-style input,
/// which the form uses as a free-text carrier.
#[derive(Debug, Clone, Copy, Default)]
pub struct TuranbankProfile;

impl TuranbankProfile {
    pub const ID: &'static str = "turanbank";

    const ORIGINS: &'static [&'static str] = &["mobile2.turanbank.az"];

    // Located by the selector cascade in `find_target`, never by label
    const TARGETS: &'static [FieldTarget] = &[FieldTarget::field(FieldKind::CompanyName, &[])];

    /// First input matched by the selector cascade.
    pub fn find_target(tree: &dyn MarkupTree) -> Option<NodeId> {
        let root = tree.root();
        let inputs: Vec<NodeId> = tree
            .descendants(root)
            .into_iter()
            .filter(|&n| tree.tag_name(n) == "input")
            .collect();

        let attr_contains = |node: NodeId, name: &str, needle: &str| {
            tree.attribute(node, name)
                .is_some_and(|v| v.to_lowercase().contains(needle))
        };

        let cascade: [&dyn Fn(NodeId) -> bool; 5] = [
            &|n: NodeId| {
                tree.attribute(n, "type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("password"))
            },
            &|n: NodeId| attr_contains(n, "name", "password"),
            &|n: NodeId| attr_contains(n, "name", "sifre"),
            &|n: NodeId| attr_contains(n, "placeholder", "ifr"),
            &|n: NodeId| attr_contains(n, "id", "password"),
        ];

        cascade
            .iter()
            .find_map(|selector| inputs.iter().copied().find(|&n| selector(n)))
    }
}

impl SiteProfile for TuranbankProfile {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Turanbank"
    }

    fn matches(&self, target: &str) -> bool {
        Self::ORIGINS.iter().any(|origin| target.contains(origin))
    }

    fn targets(&self) -> &[FieldTarget] {
        Self::TARGETS
    }

    fn overwrite(&self) -> OverwritePolicy {
        OverwritePolicy::Always
    }

    fn locate_and_fill(
        &self,
        record: &FieldRecord,
        tree: &mut dyn MarkupTree,
        writer: &dyn ValueWriter,
        highlight: &Highlight,
    ) -> FillOutcome {
        let target = Self::TARGETS[0];
        let mut outcome = FillOutcome::default();

        let Some(value) = target.value.resolve(record) else {
            outcome.states.push(TargetState {
                target: target.value.name(),
                state: FieldState::NotAttempted,
            });
            return outcome;
        };

        let state = match Self::find_target(&*tree) {
            None => FieldState::NotFound,
            Some(node) => match tree.element_kind(node) {
                Some(kind) if !tree.is_disabled(node) && !tree.is_readonly(node) => {
                    writer.write(tree, node, kind, &value);
                    tree.highlight(node, highlight);
                    outcome.details.push(FillDetail {
                        field: target.value.name(),
                        label: tree.attribute(node, "name").unwrap_or_default(),
                        value,
                        element: node,
                    });
                    FieldState::Filled
                }
                _ => FieldState::Located,
            },
        };

        info!("Turanbank target: {:?}", state);
        outcome.states.push(TargetState {
            target: target.value.name(),
            state,
        });
        outcome.filled_count = outcome.details.len();
        outcome
    }
}

/// Customs declaration forms on the e-gov and customs portals.
#[derive(Debug, Clone, Copy, Default)]
pub struct EGovCustomsProfile;

impl EGovCustomsProfile {
    pub const ID: &'static str = "egov-customs";

    const ORIGINS: &'static [&'static str] =
        &["e-gov.az", "gbportal.customs.gov.az", "custom.gov.az"];

    const SENDER_SECTION: &'static str = "2.Göndərən/İxracatçı";

    const TARGETS: &'static [FieldTarget] = &[
        FieldTarget::field(
            FieldKind::CompanyName,
            &[
                "Adı",
                "Göndərənin adı",
                "Göndərən",
                "İxracatçı",
                "Şirkətin adı",
                "Təşkilatın adı",
                "Company name",
            ],
        ),
        FieldTarget::field(
            FieldKind::CompanyAddress,
            &["Ünvan", "Unvan", "Göndərənin ünvanı", "Address"],
        ),
        FieldTarget::field(FieldKind::Voen, &["VÖEN", "VOEN"]),
        FieldTarget::field(
            FieldKind::Vin,
            &["VIN", "VIN kod", "Ban nömrəsi", "Şassi nömrəsi"],
        ),
        FieldTarget {
            value: TargetValue::Notes,
            labels: &["Qeyd", "Qeydlər", "Notes"],
        },
        FieldTarget::field(FieldKind::Surname, &["Soyadı", "Soyad"]),
        FieldTarget::field(FieldKind::Name, &["Ad", "Name"]),
        FieldTarget::field(FieldKind::FatherName, &["Ata adı", "Atasının adı"]),
        FieldTarget::field(FieldKind::IdNumber, &["FİN", "FIN", "FİN kod"]),
        FieldTarget::field(FieldKind::Phone, &["Telefon", "Tel", "Mobil nömrə"]),
        FieldTarget::field(FieldKind::Email, &["E-poçt", "Email"]),
        FieldTarget::field(FieldKind::Passport, &["Pasport", "Passport"]),
        FieldTarget::field(
            FieldKind::PersonalAddress,
            &["Yaşayış ünvanı", "Qeydiyyat ünvanı"],
        ),
    ];

    /// Site contact form inputs.
    const CONTACT_INPUTS: &'static [&'static str] = &["Name", "txtMail", "txtPhone"];

    const CONTACT_TEXTAREAS: &'static [&'static str] = &["Message", "txtMessage"];

    const CONTACT_MARKERS: &'static [&'static str] = &["Ad, Soyad", "E-mail"];
}

impl SiteProfile for EGovCustomsProfile {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "e-gov customs"
    }

    fn matches(&self, target: &str) -> bool {
        Self::ORIGINS.iter().any(|origin| target.contains(origin))
    }

    fn targets(&self) -> &[FieldTarget] {
        Self::TARGETS
    }

    fn sender_section(&self) -> Option<&str> {
        Some(Self::SENDER_SECTION)
    }

    fn is_excluded(&self, tree: &dyn MarkupTree, node: NodeId) -> bool {
        let name = tree.attribute(node, "name").unwrap_or_default();
        let excluded = match tree.tag_name(node).as_str() {
            "input" => Self::CONTACT_INPUTS.contains(&name.as_str()),
            "textarea" => {
                let id = tree.attribute(node, "id").unwrap_or_default();
                Self::CONTACT_TEXTAREAS.contains(&name.as_str())
                    || Self::CONTACT_TEXTAREAS.contains(&id.as_str())
            }
            _ => false,
        };
        if excluded {
            debug!("Skipping contact form control {:?} ({})", node, name);
            return true;
        }

        let mut ancestor = tree.parent(node);
        while let Some(n) = ancestor {
            if tree.tag_name(n) == "div" {
                let text = tree.text_content(n);
                return Self::CONTACT_MARKERS.iter().any(|m| text.contains(m));
            }
            ancestor = tree.parent(n);
        }
        false
    }
}

/// Profile for targets no other profile matches. Never fills anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProfile;

impl SiteProfile for NullProfile {
    fn id(&self) -> &'static str {
        "unsupported"
    }

    fn name(&self) -> &'static str {
        "Unsupported target"
    }

    fn matches(&self, _target: &str) -> bool {
        false
    }

    fn targets(&self) -> &[FieldTarget] {
        &[]
    }

    fn is_supported(&self) -> bool {
        false
    }

    fn locate_and_fill(
        &self,
        _record: &FieldRecord,
        _tree: &mut dyn MarkupTree,
        _writer: &dyn ValueWriter,
        _highlight: &Highlight,
    ) -> FillOutcome {
        FillOutcome::default()
    }
}

static PROFILES: &[&dyn SiteProfile] = &[&TuranbankProfile, &EGovCustomsProfile];

/// Select the profile for a target descriptor. First match wins.
pub fn resolve(target: &str) -> &'static dyn SiteProfile {
    match PROFILES.iter().find(|p| p.matches(target)) {
        Some(profile) => {
            debug!("Resolved {} to profile {}", target, profile.id());
            *profile
        }
        None => {
            debug!("No profile for {}", target);
            &NullProfile
        }
    }
}
