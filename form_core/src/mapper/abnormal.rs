//! Abnormal-flagged group mapper.
//!
//! Same member rules as the plain mapper, then the group's `abnormal`
//! indicator is recomputed over every non-voided member. Which member counts
//! as abnormal is decided by an [`AbnormalPolicy`]; [`RangeAbnormalPolicy`]
//! is the default.

use std::sync::Arc;

use tracing::trace;

use super::{apply_member_edit, ChildEdit, MapperKind, ObsMapper};
use crate::errors::ValidationError;
use crate::obs::Obs;
use crate::validation;

/// Concept class of the explicit "abnormal" toggle inside a group.
pub const ABNORMAL_CONCEPT_CLASS: &str = "Abnormal";

/// Decides whether a single member makes its group abnormal.
pub trait AbnormalPolicy: std::fmt::Debug + Send + Sync {
    fn is_abnormal(&self, member: &Obs) -> bool;
}

/// Default policy: a member is abnormal when
/// - it is a nested group already flagged abnormal,
/// - it is an `Abnormal`-class toggle set to `true`, or
/// - its numeric value lies outside the concept's normal range.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeAbnormalPolicy;

impl AbnormalPolicy for RangeAbnormalPolicy {
    fn is_abnormal(&self, member: &Obs) -> bool {
        if member.is_group() {
            return member.abnormal.unwrap_or(false);
        }
        if member.concept.concept_class.as_deref() == Some(ABNORMAL_CONCEPT_CLASS) {
            return member.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false);
        }
        member
            .numeric_value()
            .is_some_and(|n| validation::is_outside_normal(&member.concept, n))
    }
}

#[derive(Debug, Clone)]
pub struct AbnormalObsGroupMapper {
    policy: Arc<dyn AbnormalPolicy>,
}

impl AbnormalObsGroupMapper {
    pub fn new() -> Self {
        AbnormalObsGroupMapper {
            policy: Arc::new(RangeAbnormalPolicy),
        }
    }

    pub fn with_policy(policy: Arc<dyn AbnormalPolicy>) -> Self {
        AbnormalObsGroupMapper { policy }
    }
}

impl Default for AbnormalObsGroupMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ObsMapper for AbnormalObsGroupMapper {
    fn kind(&self) -> MapperKind {
        MapperKind::AbnormalObsGroup
    }

    fn set_value(&self, group: &Obs, edit: &ChildEdit, errors: &[ValidationError]) -> Obs {
        let updated = apply_member_edit(group, edit);

        // an abnormal-range warning raised by the edited child counts too
        let flagged_by_child = errors
            .iter()
            .any(|e| !e.is_blocking() && e.message == validation::ABNORMAL);
        let abnormal = flagged_by_child
            || updated
                .members()
                .iter()
                .filter(|m| !m.voided)
                .any(|m| self.policy.is_abnormal(m));

        trace!(concept = %updated.concept.name, abnormal, "recomputed abnormal indicator");
        Obs {
            abnormal: Some(abnormal),
            ..updated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Concept;
    use serde_json::json;

    fn group() -> Obs {
        Obs::group(Concept::new("bp", "Blood Pressure", "N/A"), vec![])
    }

    fn systolic() -> Obs {
        let mut concept = Concept::new("sys", "Systolic", "Numeric");
        concept.low_normal = Some(90.0);
        concept.hi_normal = Some(140.0);
        Obs::new(concept).with_namespace("f/2")
    }

    #[test]
    fn test_out_of_range_member_flags_group() {
        let mapper = AbnormalObsGroupMapper::new();
        let updated = mapper.set_value(&group(), &systolic().set_value(json!(180)).into(), &[]);
        assert_eq!(updated.abnormal, Some(true));

        let normal = mapper.set_value(&updated, &systolic().set_value(json!(120)).into(), &[]);
        assert_eq!(normal.abnormal, Some(false));
        assert_eq!(normal.members().len(), 1);
    }

    #[test]
    fn test_voided_members_are_ignored() {
        let mapper = AbnormalObsGroupMapper::new();
        let flagged = mapper.set_value(&group(), &systolic().set_value(json!(180)).into(), &[]);
        let cleared = mapper.set_value(&flagged, &systolic().set_value(json!("")).into(), &[]);

        assert!(cleared.members()[0].voided);
        assert_eq!(cleared.abnormal, Some(false));
    }

    #[test]
    fn test_explicit_abnormal_toggle() {
        let mut concept = Concept::new("abn", "Abnormal", "Boolean");
        concept.concept_class = Some(ABNORMAL_CONCEPT_CLASS.to_string());
        let toggle = Obs::new(concept).with_namespace("f/3").set_value(json!(true));

        let updated = AbnormalObsGroupMapper::new().set_value(&group(), &toggle.into(), &[]);
        assert_eq!(updated.abnormal, Some(true));
    }

    #[test]
    fn test_child_warning_flags_group() {
        let plain = Obs::new(Concept::new("x", "X", "Numeric")).set_value(json!(1));
        let updated = AbnormalObsGroupMapper::new().set_value(
            &group(),
            &plain.into(),
            &[ValidationError::warning(validation::ABNORMAL)],
        );
        assert_eq!(updated.abnormal, Some(true));
    }

    #[derive(Debug)]
    struct AlwaysAbnormal;

    impl AbnormalPolicy for AlwaysAbnormal {
        fn is_abnormal(&self, _member: &Obs) -> bool {
            true
        }
    }

    #[test]
    fn test_custom_policy() {
        let mapper = AbnormalObsGroupMapper::with_policy(Arc::new(AlwaysAbnormal));
        let updated = mapper.set_value(&group(), &systolic().set_value(json!(100)).into(), &[]);
        assert_eq!(updated.abnormal, Some(true));
    }
}
