use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire types of the inference API, as seen from the UI.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    /// Chart order.
    pub const ALL: [Label; 2] = [Label::Positive, Label::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "POSITIVE",
            Label::Negative => "NEGATIVE",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
pub struct PredictionRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub label: Label,
    pub score: f32,
}

/// Body posted by the HTML form.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub text: String,
}
