//! Persisted entities.
//!
//! Relationships are stored arena style: a parent owns its children by value
//! and every child carries the id of its parent. There are no live
//! back-pointers, so the Drawing/History graphs stay plain trees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored engineering drawing together with everything it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    /// Assigned upstream by the extraction pipeline.
    pub drawing_id: i64,
    pub original_drawing: Vec<u8>,
    /// Cascade + orphan removal: saving a drawing replaces this set.
    pub runtimes: Vec<Runtime>,
    /// Cascade + orphan removal: `None` deletes a previously stored entry.
    pub search_data: Option<SearchData>,
    /// Cascade without orphan removal: listed feedbacks are written,
    /// unlisted ones are left alone.
    pub feedbacks: Vec<Feedback>,
}

impl Drawing {
    pub fn new(drawing_id: i64, original_drawing: Vec<u8>) -> Self {
        Self {
            drawing_id,
            original_drawing,
            runtimes: Vec::new(),
            search_data: None,
            feedbacks: Vec::new(),
        }
    }

    /// Points every child at this drawing.
    pub fn link_children(&mut self) {
        let id = self.drawing_id;
        for runtime in &mut self.runtimes {
            runtime.drawing_id = id;
        }
        if let Some(search_data) = self.search_data.as_mut() {
            search_data.drawing_id = id;
        }
        for feedback in &mut self.feedbacks {
            feedback.drawing_id = id;
        }
    }
}

/// Features extracted from a drawing and used for search.
///
/// Every field is optional; the extraction pipeline fills what it finds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFeatures {
    /// Numerical vector describing the shapes.
    #[serde(default)]
    pub shape: Option<Vec<f32>>,
    #[serde(default)]
    pub material: Option<Vec<String>>,
    /// General tolerance standards / tolerance classes.
    #[serde(default)]
    pub general_tolerances: Option<Vec<String>>,
    /// Surface roughness required on finished surfaces.
    #[serde(default)]
    pub surfaces: Option<Vec<String>>,
    /// Geometric dimensioning and tolerancing annotations.
    #[serde(default)]
    pub gdts: Option<Vec<String>>,
    #[serde(default)]
    pub threads: Option<Vec<String>>,
    /// Maximal measure per spatial dimension.
    #[serde(default)]
    pub outer_dimensions: Option<Vec<f32>>,
    /// Combined OCR text and shape vector.
    #[serde(default)]
    pub search_vector: Option<Vec<f32>>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub ocr_text: Option<Vec<String>>,
    /// Free text on machines and runtimes.
    #[serde(default)]
    pub runtime_text: Option<String>,
    #[serde(default)]
    pub llm_text: Option<String>,
    #[serde(default)]
    pub llm_vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchData {
    pub search_data_id: i64,
    pub drawing_id: i64,
    pub features: SearchFeatures,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Runtime {
    pub runtime_id: i64,
    pub drawing_id: i64,
    pub machine: String,
    pub machine_runtime: f64,
}

/// A past search query.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    /// `None` until the store assigns one.
    pub history_id: Option<i64>,
    pub query_drawing: Vec<u8>,
    pub query_path: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Cascade + orphan removal.
    pub feedbacks: Vec<Feedback>,
}

impl History {
    /// A new, unsaved query record stamped with the current time.
    pub fn new(query_drawing: Vec<u8>, query_path: Option<String>) -> Self {
        Self {
            history_id: None,
            query_drawing,
            query_path,
            timestamp: Utc::now(),
            feedbacks: Vec::new(),
        }
    }

    /// Attaches a feedback to this history entry, keeping both sides in sync.
    pub fn add_feedback(&mut self, mut feedback: Feedback) {
        if let Some(id) = self.history_id {
            feedback.history_id = id;
        }
        self.feedbacks.push(feedback);
    }

    /// Points every feedback at this history entry once it has an id.
    pub fn link_children(&mut self) {
        if let Some(id) = self.history_id {
            for feedback in &mut self.feedbacks {
                feedback.history_id = id;
            }
        }
    }
}

/// A user's judgment of how well a drawing matched a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    /// `None` until the store assigns one.
    pub feedback_id: Option<i64>,
    pub history_id: i64,
    pub drawing_id: i64,
    pub feedback_desc: Option<String>,
    pub feedback_value: FeedbackValue,
}

/// Allowed feedback values; the integer form is what goes over the wire
/// and into the `feedback_value` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackValue {
    /// No match.
    Negative = 0,
    /// Uncertain.
    Neutral = 1,
    /// Match.
    Positive = 2,
}

impl FeedbackValue {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for FeedbackValue {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Negative),
            1 => Ok(Self::Neutral),
            2 => Ok(Self::Positive),
            other => Err(other),
        }
    }
}
