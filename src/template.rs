//! Posture templates and per-frame classification.
//!
//! A template lists target angles for a few joints and one tolerance shared
//! by all of them. A frame matches when every listed joint is defined,
//! confident enough, and strictly inside `target ± tolerance`. Anything else,
//! including an occluded limb, is a non-match.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::joints::{Joint, JointAngleSample};

/// Per-frame outcome, keyed by posture name in template order.
pub type MatchResults = IndexMap<String, bool>;

/// Template as written in configuration, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    pub name: String,
    pub tolerance: f32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub min_confidence: f32,
    pub joint_targets: IndexMap<String, f32>,
}

fn is_zero(value: &f32) -> bool {
    *value == 0.0
}

impl TemplateConfig {
    pub fn new<'a, I>(name: &str, tolerance: f32, targets: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        Self {
            name: name.to_string(),
            tolerance,
            min_confidence: 0.0,
            joint_targets: targets
                .into_iter()
                .map(|(joint, degrees)| (joint.to_string(), degrees))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostureTemplate {
    name: String,
    tolerance: f32,
    min_confidence: f32,
    targets: Vec<(Joint, f32)>,
}

/// How one joint of a frame compares to a template target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointFeedback {
    pub joint: Joint,
    pub target: f32,
    /// Measured angle; `None` if undefined or below the confidence floor.
    pub angle: Option<f32>,
    /// `angle - target`
    pub deviation: Option<f32>,
    pub within: bool,
}

impl PostureTemplate {
    pub fn from_config(config: &TemplateConfig) -> Result<Self, TemplateError> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyName);
        }
        let template = name.to_string();

        if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
            return Err(TemplateError::Tolerance {
                template,
                tolerance: config.tolerance,
            });
        }

        if !(0.0..=1.0).contains(&config.min_confidence) {
            return Err(TemplateError::MinConfidence {
                template,
                value: config.min_confidence,
            });
        }

        if config.joint_targets.is_empty() {
            return Err(TemplateError::NoTargets { template });
        }

        let mut targets = Vec::with_capacity(config.joint_targets.len());
        for (joint_name, &degrees) in &config.joint_targets {
            let joint = joint_name
                .parse::<Joint>()
                .map_err(|_| TemplateError::UnknownJoint {
                    template: template.clone(),
                    joint: joint_name.clone(),
                })?;

            if !(0.0..=180.0).contains(&degrees) {
                return Err(TemplateError::Target {
                    template,
                    joint: joint_name.clone(),
                    degrees,
                });
            }

            targets.push((joint, degrees));
        }

        Ok(Self {
            name: template,
            tolerance: config.tolerance,
            min_confidence: config.min_confidence,
            targets,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    pub fn targets(&self) -> &[(Joint, f32)] {
        &self.targets
    }

    pub fn to_config(&self) -> TemplateConfig {
        TemplateConfig {
            name: self.name.clone(),
            tolerance: self.tolerance,
            min_confidence: self.min_confidence,
            joint_targets: self
                .targets
                .iter()
                .map(|(joint, degrees)| (joint.as_str().to_string(), *degrees))
                .collect(),
        }
    }

    /// Usable angle for `joint`, honouring the confidence floor.
    fn angle(&self, sample: &JointAngleSample, joint: Joint) -> Option<f32> {
        sample
            .get(joint)
            .filter(|angle| angle.confidence >= self.min_confidence)
            .map(|angle| angle.degrees)
    }

    fn within(&self, angle: f32, target: f32) -> bool {
        (angle - target).abs() < self.tolerance
    }

    pub fn matches(&self, sample: &JointAngleSample) -> bool {
        self.targets.iter().all(|&(joint, target)| {
            self.angle(sample, joint)
                .is_some_and(|angle| self.within(angle, target))
        })
    }

    /// Per-joint comparison, in template order, for colouring a skeleton.
    pub fn feedback(&self, sample: &JointAngleSample) -> Vec<JointFeedback> {
        self.targets
            .iter()
            .map(|&(joint, target)| {
                let angle = self.angle(sample, joint);
                JointFeedback {
                    joint,
                    target,
                    angle,
                    deviation: angle.map(|a| a - target),
                    within: angle.is_some_and(|a| self.within(a, target)),
                }
            })
            .collect()
    }
}

/// Validated templates with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSet {
    templates: Vec<PostureTemplate>,
}

impl TemplateSet {
    pub fn new(templates: Vec<PostureTemplate>) -> Result<Self, TemplateError> {
        for (i, template) in templates.iter().enumerate() {
            if templates[..i].iter().any(|t| t.name == template.name) {
                return Err(TemplateError::Duplicate(template.name.clone()));
            }
        }

        Ok(Self { templates })
    }

    pub fn from_configs(configs: &[TemplateConfig]) -> Result<Self, TemplateError> {
        let templates = configs
            .iter()
            .map(PostureTemplate::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(templates)
    }

    pub fn get(&self, name: &str) -> Option<&PostureTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PostureTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn classify(&self, sample: &JointAngleSample) -> MatchResults {
        classify(sample, &self.templates)
    }
}

impl<'a> IntoIterator for &'a TemplateSet {
    type Item = &'a PostureTemplate;
    type IntoIter = std::slice::Iter<'a, PostureTemplate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Match every template against one frame's angles.
pub fn classify(sample: &JointAngleSample, templates: &[PostureTemplate]) -> MatchResults {
    templates
        .iter()
        .map(|t| (t.name.clone(), t.matches(sample)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joints::{JointAngle, Side};

    fn wallsquat() -> PostureTemplate {
        let config = TemplateConfig::new(
            "Wallsquat",
            15.0,
            [("knee", 90.0), ("hip", 90.0), ("shoulder", 90.0)],
        );
        PostureTemplate::from_config(&config).unwrap()
    }

    fn sample(knee: f32, hip: f32, shoulder: f32) -> JointAngleSample {
        JointAngleSample::from_degrees(
            Side::Left,
            [(Joint::Knee, knee), (Joint::Hip, hip), (Joint::Shoulder, shoulder)],
        )
    }

    #[test]
    fn test_wallsquat_within_band() {
        assert!(wallsquat().matches(&sample(95.0, 88.0, 100.0)));
    }

    #[test]
    fn test_wallsquat_shoulder_outside_band() {
        assert!(!wallsquat().matches(&sample(95.0, 88.0, 110.0)));
    }

    #[test]
    fn test_band_edge_is_exclusive() {
        assert!(!wallsquat().matches(&sample(105.0, 90.0, 90.0)));
        assert!(wallsquat().matches(&sample(104.9, 90.0, 90.0)));
    }

    #[test]
    fn test_undefined_joint_never_matches() {
        let config = TemplateConfig::new("Wide", 1000.0, [("knee", 90.0), ("elbow", 90.0)]);
        let template = PostureTemplate::from_config(&config).unwrap();
        let knee_only = JointAngleSample::from_degrees(Side::Left, [(Joint::Knee, 90.0)]);

        assert!(!template.matches(&knee_only));
        assert!(!template.matches(&JointAngleSample::empty(Side::Left)));
    }

    #[test]
    fn test_low_confidence_joint_fails_closed() {
        let mut config = TemplateConfig::new("Knee", 15.0, [("knee", 90.0)]);
        config.min_confidence = 0.5;
        let template = PostureTemplate::from_config(&config).unwrap();

        let weak = JointAngleSample::empty(Side::Left).with(
            Joint::Knee,
            JointAngle { degrees: 90.0, confidence: 0.4 },
        );
        let strong = JointAngleSample::empty(Side::Left).with(
            Joint::Knee,
            JointAngle { degrees: 90.0, confidence: 0.6 },
        );

        assert!(!template.matches(&weak));
        assert!(template.matches(&strong));
    }

    #[test]
    fn test_classify_reports_every_template_in_order() {
        let plank = TemplateConfig::new("Plank", 15.0, [("hip", 180.0), ("knee", 180.0)]);
        let templates = vec![wallsquat(), PostureTemplate::from_config(&plank).unwrap()];

        let results = classify(&sample(90.0, 90.0, 90.0), &templates);

        assert_eq!(results.len(), 2);
        assert_eq!(results.get_index(0), Some((&"Wallsquat".to_string(), &true)));
        assert_eq!(results.get("Plank"), Some(&false));
    }

    #[test]
    fn test_feedback_reports_deviation() {
        let partial = JointAngleSample::from_degrees(
            Side::Left,
            [(Joint::Knee, 95.0), (Joint::Shoulder, 110.0)],
        );

        let feedback = wallsquat().feedback(&partial);

        assert_eq!(feedback.len(), 3);
        assert_eq!(feedback[0].joint, Joint::Knee);
        assert_eq!(feedback[0].deviation, Some(5.0));
        assert!(feedback[0].within);
        assert_eq!(feedback[1].angle, None);
        assert!(!feedback[1].within);
        assert_eq!(feedback[2].deviation, Some(20.0));
        assert!(!feedback[2].within);
    }

    #[test]
    fn test_unknown_joint_is_rejected() {
        let config = TemplateConfig::new("Lunge", 15.0, [("knee", 90.0), ("ankle", 80.0)]);

        assert_eq!(
            PostureTemplate::from_config(&config),
            Err(TemplateError::UnknownJoint {
                template: "Lunge".into(),
                joint: "ankle".into(),
            })
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let no_targets = TemplateConfig::new("Empty", 15.0, []);
        assert!(matches!(
            PostureTemplate::from_config(&no_targets),
            Err(TemplateError::NoTargets { .. })
        ));

        let zero_tol = TemplateConfig::new("Zero", 0.0, [("knee", 90.0)]);
        assert!(matches!(
            PostureTemplate::from_config(&zero_tol),
            Err(TemplateError::Tolerance { .. })
        ));

        let nan_tol = TemplateConfig::new("Nan", f32::NAN, [("knee", 90.0)]);
        assert!(matches!(
            PostureTemplate::from_config(&nan_tol),
            Err(TemplateError::Tolerance { .. })
        ));

        let negative_tol = TemplateConfig::new("Negative", -5.0, [("knee", 90.0)]);
        assert!(matches!(
            PostureTemplate::from_config(&negative_tol),
            Err(TemplateError::Tolerance { .. })
        ));

        let infinite_tol = TemplateConfig::new("Infinite", f32::INFINITY, [("knee", 90.0)]);
        assert!(matches!(
            PostureTemplate::from_config(&infinite_tol),
            Err(TemplateError::Tolerance { .. })
        ));

        for value in [-0.1, 1.5, f32::NAN] {
            let mut gated = TemplateConfig::new("Gated", 15.0, [("knee", 90.0)]);
            gated.min_confidence = value;
            assert!(matches!(
                PostureTemplate::from_config(&gated),
                Err(TemplateError::MinConfidence { .. })
            ));
        }

        let wide = TemplateConfig::new("Wide", 15.0, [("knee", 200.0)]);
        assert!(matches!(
            PostureTemplate::from_config(&wide),
            Err(TemplateError::Target { .. })
        ));

        let unnamed = TemplateConfig::new("  ", 15.0, [("knee", 90.0)]);
        assert_eq!(PostureTemplate::from_config(&unnamed), Err(TemplateError::EmptyName));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let configs = vec![
            TemplateConfig::new("Plank", 15.0, [("hip", 180.0)]),
            TemplateConfig::new("Plank", 10.0, [("knee", 180.0)]),
        ];

        assert_eq!(
            TemplateSet::from_configs(&configs),
            Err(TemplateError::Duplicate("Plank".into()))
        );
    }

    #[test]
    fn test_to_config_round_trip() {
        let template = wallsquat();
        assert_eq!(PostureTemplate::from_config(&template.to_config()).unwrap(), template);
    }
}
