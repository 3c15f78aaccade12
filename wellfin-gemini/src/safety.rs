use serde::{Deserialize, Serialize};

/// Setting for safety
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// The category of content to filter
    pub category: HarmCategory,
    /// The threshold for filtering
    pub threshold: HarmBlockThreshold,
}

impl SafetySetting {
    pub fn new(category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        Self { category, threshold }
    }
}

wire_enum! {
    /// Category of harmful content
    pub enum HarmCategory {
        Unspecified      => "HARM_CATEGORY_UNSPECIFIED",
        Harassment       => "HARM_CATEGORY_HARASSMENT",
        HateSpeech       => "HARM_CATEGORY_HATE_SPEECH",
        SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        CivicIntegrity   => "HARM_CATEGORY_CIVIC_INTEGRITY",
    }
    fallback: Unspecified
}

/// Threshold for blocking harmful content
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    HarmBlockThresholdUnspecified,
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
    Off,
}

wire_enum! {
    /// Probability that content is harmful
    pub enum HarmProbability {
        Unspecified => "HARM_PROBABILITY_UNSPECIFIED",
        Negligible  => "NEGLIGIBLE",
        Low         => "LOW",
        Medium      => "MEDIUM",
        High        => "HIGH",
    }
    fallback: Unspecified
}

/// Safety rating for content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyRating {
    pub category: HarmCategory,
    pub probability: HarmProbability,
    #[serde(default)]
    pub blocked: bool,
}
