use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Writing tone for a host reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Neutral,
    Formal,
    Casual,
}

impl Tone {
    /// Style rule passed to the model.
    pub fn guide(&self) -> &'static str {
        match self {
            Tone::Formal => {
                "Polite and businesslike. Avoid ambiguity and use honorifics and courteous forms where the language has them. No emoji, no slang."
            }
            Tone::Casual => {
                "Short and friendly. Light conversational phrasing is fine; avoid long sentences. Keep emoji and slang to a minimum."
            }
            Tone::Neutral => {
                "A standard, courteous register that is neither stiff nor overly familiar."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Formal => "formal",
            Tone::Casual => "casual",
        }
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "neutral" => Ok(Tone::Neutral),
            "formal" => Ok(Tone::Formal),
            "casual" => Ok(Tone::Casual),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
