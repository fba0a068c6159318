//! Per-frame keypoint input.
//!
//! A detector hands over one [`KeypointSet`] per frame for a single subject.
//! Landmarks are looked up by name; a landmark that was not detected is simply
//! absent from the set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed landmark vocabulary (17-point COCO / MoveNet layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

/// Row order of the detector output decoded by [`KeypointSet::from_rows`].
pub const MOVENET_ORDER: [LandmarkName; 17] = [
    LandmarkName::Nose,
    LandmarkName::LeftEye,
    LandmarkName::RightEye,
    LandmarkName::LeftEar,
    LandmarkName::RightEar,
    LandmarkName::LeftShoulder,
    LandmarkName::RightShoulder,
    LandmarkName::LeftElbow,
    LandmarkName::RightElbow,
    LandmarkName::LeftWrist,
    LandmarkName::RightWrist,
    LandmarkName::LeftHip,
    LandmarkName::RightHip,
    LandmarkName::LeftKnee,
    LandmarkName::RightKnee,
    LandmarkName::LeftAnkle,
    LandmarkName::RightAnkle,
];

impl LandmarkName {
    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkName::Nose => "nose",
            LandmarkName::LeftEye => "left_eye",
            LandmarkName::RightEye => "right_eye",
            LandmarkName::LeftEar => "left_ear",
            LandmarkName::RightEar => "right_ear",
            LandmarkName::LeftShoulder => "left_shoulder",
            LandmarkName::RightShoulder => "right_shoulder",
            LandmarkName::LeftElbow => "left_elbow",
            LandmarkName::RightElbow => "right_elbow",
            LandmarkName::LeftWrist => "left_wrist",
            LandmarkName::RightWrist => "right_wrist",
            LandmarkName::LeftHip => "left_hip",
            LandmarkName::RightHip => "right_hip",
            LandmarkName::LeftKnee => "left_knee",
            LandmarkName::RightKnee => "right_knee",
            LandmarkName::LeftAnkle => "left_ankle",
            LandmarkName::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MOVENET_ORDER
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown landmark '{s}'"))
    }
}

/// A single detected point in frame-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: LandmarkName,
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Landmark {
    pub fn new(name: LandmarkName, x: f32, y: f32, confidence: f32) -> Self {
        Self { name, x, y, confidence }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// All landmarks detected for one subject in one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeypointSet {
    landmarks: Vec<Landmark>,
}

impl KeypointSet {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Decode detector rows of `[x, y, score]` laid out in [`MOVENET_ORDER`].
    ///
    /// Rows past the 17th are ignored; a short output yields a partial set.
    pub fn from_rows(rows: &[[f32; 3]]) -> Self {
        let landmarks = rows
            .iter()
            .zip(MOVENET_ORDER)
            .map(|(row, name)| Landmark::new(name, row[0], row[1], row[2]))
            .collect();

        Self { landmarks }
    }

    /// First landmark with the given name, if detected.
    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.landmarks.iter().find(|lm| lm.name == name)
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

impl FromIterator<Landmark> for KeypointSet {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
