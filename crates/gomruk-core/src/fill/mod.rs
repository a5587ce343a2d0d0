//! Form population.
//!
//! A [`SiteProfile`] chosen by [`resolve`] locates the target controls in a
//! [`MarkupTree`] and writes field values through a [`ValueWriter`].
//! Filling never fails: zero filled fields is a reported outcome.

mod dom;
mod locate;
mod markup;
mod profile;
mod writer;

pub use dom::Dom;
pub use locate::{candidates, fill_by_labels, find_label_nodes, find_section, normalize_label};
pub use markup::{ElementKind, Highlight, InteractionEvent, MarkupTree, NodeId};
pub use profile::{
    EGovCustomsProfile, FieldTarget, NullProfile, OverwritePolicy, SiteProfile, TargetValue,
    TuranbankProfile, resolve,
};
pub use writer::{FrameworkValueWriter, ValueWriter};

use serde::Serialize;
use tracing::{info, warn};

use crate::models::config::FillConfig;
use crate::models::fields::FieldRecord;

/// Where a fill target ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldState {
    /// The record has no value for this target.
    NotAttempted,
    /// No label or candidate control was found.
    NotFound,
    /// A control was found but was disabled, read-only or already filled.
    Located,
    /// The value was written.
    Filled,
}

/// Final state of one profile target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetState {
    pub target: &'static str,
    pub state: FieldState,
}

/// One written value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillDetail {
    pub field: &'static str,
    /// Label text the control was found by.
    pub label: String,
    pub value: String,
    pub element: NodeId,
}

/// Result of one fill pass over one markup tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillOutcome {
    /// Number of targets that reached [`FieldState::Filled`].
    pub filled_count: usize,
    /// Written values in fill order.
    pub details: Vec<FillDetail>,
    /// Final state of every profile target.
    pub states: Vec<TargetState>,
}

impl FillOutcome {
    /// State of a target by its reported name.
    pub fn state_of(&self, target: &str) -> Option<FieldState> {
        self.states
            .iter()
            .find(|s| s.target == target)
            .map(|s| s.state)
    }
}

/// Caller-visible status of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FillStatus {
    /// No profile handles the target.
    UnsupportedTarget,
    /// A profile ran but wrote nothing.
    NothingFilled,
    /// At least one field was written.
    Filled,
}

/// Fill result for one frame of a target page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub profile: &'static str,
    pub status: FillStatus,
    pub outcome: FillOutcome,
}

impl FillReport {
    pub fn success(&self) -> bool {
        self.status == FillStatus::Filled
    }
}

/// Per-frame reports folded into one result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSummary {
    /// Any frame filled at least one field.
    pub success: bool,
    pub status: FillStatus,
    pub filled_count: usize,
    pub frames: Vec<FillReport>,
}

impl FrameSummary {
    /// Fold per-frame reports with "any frame succeeded" semantics.
    pub fn aggregate(frames: Vec<FillReport>) -> Self {
        let status = frames
            .iter()
            .map(|f| f.status)
            .max()
            .unwrap_or(FillStatus::UnsupportedTarget);
        let filled_count = frames.iter().map(|f| f.outcome.filled_count).sum();

        Self {
            success: status == FillStatus::Filled,
            status,
            filled_count,
            frames,
        }
    }
}

/// Fill a markup tree with `profile`.
pub fn fill(
    record: &FieldRecord,
    profile: &dyn SiteProfile,
    tree: &mut dyn MarkupTree,
    config: &FillConfig,
) -> FillOutcome {
    let highlight = Highlight::from(config);
    let outcome = profile.locate_and_fill(record, tree, &FrameworkValueWriter, &highlight);
    info!(
        "{}: filled {} of {} targets",
        profile.name(),
        outcome.filled_count,
        profile.targets().len()
    );
    outcome
}

/// Resolve the profile for `target` and fill one frame with it.
pub fn fill_target(
    record: &FieldRecord,
    target: &str,
    tree: &mut dyn MarkupTree,
    config: &FillConfig,
) -> FillReport {
    let profile = resolve(target);
    if !profile.is_supported() {
        warn!("Unsupported target: {}", target);
        return FillReport {
            profile: profile.id(),
            status: FillStatus::UnsupportedTarget,
            outcome: FillOutcome::default(),
        };
    }

    let outcome = fill(record, profile, tree, config);
    let status = if outcome.filled_count > 0 {
        FillStatus::Filled
    } else {
        FillStatus::NothingFilled
    };

    FillReport {
        profile: profile.id(),
        status,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldParser, RuleBasedFieldParser};
    use crate::models::fields::FieldKind;
    use pretty_assertions::assert_eq;

    const CUSTOMS: &str = "https://gbportal.customs.gov.az/declaration/new";
    const TURANBANK: &str = "https://mobile2.turanbank.az/login";

    fn record(fields: &[(FieldKind, &str)]) -> FieldRecord {
        let mut record = FieldRecord::default();
        for (kind, value) in fields {
            record.set(*kind, *value);
        }
        record
    }

    fn value_of(dom: &Dom, id: &str) -> String {
        dom.value(dom.find_by_id(id).unwrap())
    }

    const DECLARATION: &str = r#"<html><body>
        <div class="section" id="buyer">
            <h3>1.Alıcı</h3>
            <div class="form-group"><label>Adı</label><input id="buyer-name" type="text"></div>
        </div>
        <div class="section" id="sender">
            <h3>2.Göndərən/İxracatçı</h3>
            <div class="form-group"><label>Adı:</label><input id="sender-name" type="text"></div>
            <span>Ünvan</span><div><small>tam ünvan</small><textarea id="sender-address"></textarea></div>
            <table><tr><td>VÖEN</td><td><input id="voen" value="1700767721"></td></tr></table>
        </div>
        <div class="form-group"><label for="vin">VIN</label></div>
        <input id="vin" disabled>
        <div class="form-group"><label>Qeyd</label><textarea id="notes"></textarea></div>
    </body></html>"#;

    #[test]
    fn test_sender_section_is_searched_first() {
        let mut dom = Dom::parse(DECLARATION);
        let record = record(&[
            (FieldKind::CompanyName, "GLB LOGISTICS CORPORATION"),
            (FieldKind::CompanyAddress, "30 N GOULD ST STE R. SHERIDAN WY 82801"),
        ]);

        let report = fill_target(&record, CUSTOMS, &mut dom, &FillConfig::default());

        assert_eq!(report.profile, "egov-customs");
        assert_eq!(report.status, FillStatus::Filled);
        assert_eq!(value_of(&dom, "sender-name"), "GLB LOGISTICS CORPORATION");
        assert_eq!(value_of(&dom, "buyer-name"), "");
        assert_eq!(
            value_of(&dom, "sender-address"),
            "30 N GOULD ST STE R. SHERIDAN WY 82801"
        );
        assert_eq!(
            value_of(&dom, "notes"),
            "GLB LOGISTICS CORPORATION - 30 N GOULD ST STE R. SHERIDAN WY 82801"
        );
        assert_eq!(report.outcome.filled_count, 3);
        assert_eq!(report.outcome.details[0].label, "Adı");
    }

    #[test]
    fn test_customs_profile_never_overwrites() {
        let mut dom = Dom::parse(DECLARATION);
        let record = record(&[
            (FieldKind::Voen, "99-0667903"),
            (FieldKind::Vin, "1HGCM82633A004352"),
        ]);

        let report = fill_target(&record, CUSTOMS, &mut dom, &FillConfig::default());

        assert_eq!(value_of(&dom, "voen"), "1700767721");
        assert_eq!(value_of(&dom, "vin"), "");
        assert_eq!(report.status, FillStatus::NothingFilled);
        assert_eq!(report.outcome.filled_count, 0);
        assert_eq!(report.outcome.state_of("voen"), Some(FieldState::Located));
        assert_eq!(report.outcome.state_of("vin"), Some(FieldState::Located));
        assert_eq!(report.outcome.state_of("email"), Some(FieldState::NotAttempted));
    }

    #[test]
    fn test_missing_label_is_not_found() {
        let mut dom = Dom::parse(DECLARATION);
        let record = record(&[(FieldKind::Passport, "AA1234567")]);

        let report = fill_target(&record, CUSTOMS, &mut dom, &FillConfig::default());

        assert_eq!(report.outcome.state_of("passport"), Some(FieldState::NotFound));
        assert!(!report.success());
    }

    #[test]
    fn test_contact_form_is_skipped() {
        let mut dom = Dom::parse(
            r#"<html><body>
            <div class="form-group"><label>Name</label><input id="contact" name="Name"></div>
            </body></html>"#,
        );
        let record = record(&[(FieldKind::Name, "ELVİN")]);

        let report = fill_target(&record, CUSTOMS, &mut dom, &FillConfig::default());

        assert_eq!(value_of(&dom, "contact"), "");
        assert_eq!(report.outcome.state_of("name"), Some(FieldState::NotFound));
    }

    #[test]
    fn test_turanbank_overwrites_password_field() {
        let mut dom = Dom::parse(
            r#"<html><body><form>
            <input id="login" name="login" type="text">
            <input id="secret" class="form-control" type="password" value="old">
            </form></body></html>"#,
        );
        let text = "Invoice No 17\nName: GLB LOGISTICS CORPORATION SWIFT CODE CHASUS33";
        let record = RuleBasedFieldParser::new().parse(text);

        let config = FillConfig::default();
        let report = fill_target(&record, TURANBANK, &mut dom, &config);
        let secret = dom.find_by_id("secret").unwrap();

        assert_eq!(report.status, FillStatus::Filled);
        assert_eq!(dom.value(secret), "GLB LOGISTICS CORPORATION");
        assert_eq!(value_of(&dom, "login"), "");
        assert_eq!(dom.events_for(secret), InteractionEvent::SEQUENCE.to_vec());
        assert_eq!(dom.highlights(), &[(secret, Highlight::from(&config))]);
    }

    #[test]
    fn test_unsupported_target() {
        let mut dom = Dom::parse(DECLARATION);
        let record = record(&[(FieldKind::CompanyName, "ACME LTD")]);

        let report = fill_target(&record, "https://example.com", &mut dom, &FillConfig::default());

        assert_eq!(report.status, FillStatus::UnsupportedTarget);
        assert_eq!(report.outcome.filled_count, 0);
        assert!(dom.events().is_empty());
    }

    #[test]
    fn test_empty_record_fills_nothing() {
        let mut dom = Dom::parse(DECLARATION);
        let record = RuleBasedFieldParser::new().parse("lorem ipsum dolor sit amet");

        let report = fill_target(&record, CUSTOMS, &mut dom, &FillConfig::default());

        assert_eq!(report.status, FillStatus::NothingFilled);
        assert_eq!(report.outcome.filled_count, 0);
        assert!(
            report
                .outcome
                .states
                .iter()
                .all(|s| s.state == FieldState::NotAttempted)
        );
    }

    #[test]
    fn test_frame_aggregation() {
        let record = record(&[(FieldKind::CompanyName, "ACME LTD")]);
        let mut empty_frame = Dom::parse("<html><body><p>banner</p></body></html>");
        let mut form_frame = Dom::parse(DECLARATION);
        let config = FillConfig::default();

        let summary = FrameSummary::aggregate(vec![
            fill_target(&record, CUSTOMS, &mut empty_frame, &config),
            fill_target(&record, CUSTOMS, &mut form_frame, &config),
        ]);

        assert!(summary.success);
        assert_eq!(summary.status, FillStatus::Filled);
        assert_eq!(summary.filled_count, 2);
        assert_eq!(summary.frames[0].status, FillStatus::NothingFilled);

        let none = FrameSummary::aggregate(Vec::new());
        assert!(!none.success);
        assert_eq!(none.status, FillStatus::UnsupportedTarget);
    }
}
