//! Joint angle extraction for one side of the body.
//!
//! Every joint is defined by a landmark triple ordered (proximal, vertex,
//! distal), all taken from the same side:
//!
//! | joint    | triple                  |
//! |----------|-------------------------|
//! | elbow    | shoulder – elbow – wrist |
//! | knee     | hip – knee – ankle       |
//! | hip      | shoulder – hip – knee    |
//! | shoulder | hip – shoulder – elbow   |
//!
//! Extraction is total: a joint whose landmarks are missing (or collapse onto
//! each other) is left undefined and the rest of the sample is still filled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::angles::angle_at;
use crate::keypoints::{KeypointSet, LandmarkName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Elbow,
    Knee,
    Hip,
    Shoulder,
}

impl Joint {
    pub const ALL: [Joint; 4] = [Joint::Elbow, Joint::Knee, Joint::Hip, Joint::Shoulder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Joint::Elbow => "elbow",
            Joint::Knee => "knee",
            Joint::Hip => "hip",
            Joint::Shoulder => "shoulder",
        }
    }

    fn index(self) -> usize {
        match self {
            Joint::Elbow => 0,
            Joint::Knee => 1,
            Joint::Hip => 2,
            Joint::Shoulder => 3,
        }
    }

    /// Landmark triple `(proximal, vertex, distal)` on the given side.
    pub fn landmarks(&self, side: Side) -> [LandmarkName; 3] {
        use LandmarkName::*;

        match (self, side) {
            (Joint::Elbow, Side::Left) => [LeftShoulder, LeftElbow, LeftWrist],
            (Joint::Elbow, Side::Right) => [RightShoulder, RightElbow, RightWrist],
            (Joint::Knee, Side::Left) => [LeftHip, LeftKnee, LeftAnkle],
            (Joint::Knee, Side::Right) => [RightHip, RightKnee, RightAnkle],
            (Joint::Hip, Side::Left) => [LeftShoulder, LeftHip, LeftKnee],
            (Joint::Hip, Side::Right) => [RightShoulder, RightHip, RightKnee],
            (Joint::Shoulder, Side::Left) => [LeftHip, LeftShoulder, LeftElbow],
            (Joint::Shoulder, Side::Right) => [RightHip, RightShoulder, RightElbow],
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Joint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Joint::ALL
            .iter()
            .copied()
            .find(|joint| joint.as_str() == s)
            .ok_or_else(|| format!("unknown joint '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    fn limb_landmarks(self) -> [LandmarkName; 6] {
        use LandmarkName::*;

        match self {
            Side::Left => [LeftShoulder, LeftElbow, LeftWrist, LeftHip, LeftKnee, LeftAnkle],
            Side::Right => [RightShoulder, RightElbow, RightWrist, RightHip, RightKnee, RightAnkle],
        }
    }
}

/// Which side of the body the extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideSelection {
    #[default]
    Left,
    Right,
    /// Per frame, the side whose limb landmarks carry more total confidence.
    Auto,
}

impl SideSelection {
    pub fn resolve(&self, keypoints: &KeypointSet) -> Side {
        match self {
            SideSelection::Left => Side::Left,
            SideSelection::Right => Side::Right,
            SideSelection::Auto => {
                let score = |side: Side| -> f32 {
                    side.limb_landmarks()
                        .iter()
                        .filter_map(|name| keypoints.get(*name))
                        .map(|lm| lm.confidence)
                        .sum()
                };

                if score(Side::Right) > score(Side::Left) {
                    Side::Right
                } else {
                    Side::Left
                }
            }
        }
    }
}

/// A defined joint angle and the weakest confidence among its landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointAngle {
    pub degrees: f32,
    pub confidence: f32,
}

/// Joint angles derived from one frame; `None` entries are undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngleSample {
    side: Side,
    angles: [Option<JointAngle>; 4],
}

impl JointAngleSample {
    /// A sample with every joint undefined.
    pub fn empty(side: Side) -> Self {
        Self {
            side,
            angles: [None; 4],
        }
    }

    /// Build a sample directly from degrees, with full confidence.
    pub fn from_degrees<I>(side: Side, angles: I) -> Self
    where
        I: IntoIterator<Item = (Joint, f32)>,
    {
        angles
            .into_iter()
            .fold(Self::empty(side), |sample, (joint, degrees)| {
                sample.with(joint, JointAngle { degrees, confidence: 1.0 })
            })
    }

    pub fn with(mut self, joint: Joint, angle: JointAngle) -> Self {
        self.angles[joint.index()] = Some(angle);
        self
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn get(&self, joint: Joint) -> Option<JointAngle> {
        self.angles[joint.index()]
    }

    pub fn degrees(&self, joint: Joint) -> Option<f32> {
        self.get(joint).map(|angle| angle.degrees)
    }

    /// Defined joints in [`Joint::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, JointAngle)> + '_ {
        Joint::ALL
            .iter()
            .filter_map(|joint| self.get(*joint).map(|angle| (*joint, angle)))
    }

    pub fn defined_count(&self) -> usize {
        self.angles.iter().filter(|angle| angle.is_some()).count()
    }
}

/// Compute every joint angle available on `side`.
pub fn extract_angles(keypoints: &KeypointSet, side: Side) -> JointAngleSample {
    Joint::ALL.iter().fold(JointAngleSample::empty(side), |sample, joint| {
        match joint_angle(keypoints, *joint, side) {
            Some(angle) => sample.with(*joint, angle),
            None => sample,
        }
    })
}

fn joint_angle(keypoints: &KeypointSet, joint: Joint, side: Side) -> Option<JointAngle> {
    let [a, b, c] = joint.landmarks(side);
    let (a, b, c) = (keypoints.get(a)?, keypoints.get(b)?, keypoints.get(c)?);

    let degrees = angle_at(a.position(), b.position(), c.position())?;
    let confidence = a.confidence.min(b.confidence).min(c.confidence);

    Some(JointAngle { degrees, confidence })
}
