//! Static FOMC speaker roster.
//!
//! Maps speaker surnames to their institutional weight, voting status, and
//! known policy lean. The Fed analyzer uses the weight to rank which
//! communications matter for the newsletter and the lean as prior context.
//! Rosters change with governor terms and the regional voting rotation;
//! update here when they do.

use serde::{Deserialize, Serialize};

/// How much a speaker's communication moves the policy outlook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerWeight {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// A speaker's historical policy lean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerBias {
    Hawkish,
    Dovish,
    Centrist,
    Unknown,
}

/// One FOMC participant.
#[derive(Debug, Clone, Copy)]
pub struct FedSpeaker {
    /// Uppercase surname used for matching against feed text.
    pub surname: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub weight: SpeakerWeight,
    pub voting: bool,
    pub bias: SpeakerBias,
}

/// Current FOMC membership: Board of Governors plus the New York Fed
/// president (permanent voter) and the regional presidents.
pub const FOMC_ROSTER: &[FedSpeaker] = &[
    FedSpeaker {
        surname: "POWELL",
        name: "Jerome Powell",
        role: "Chair",
        weight: SpeakerWeight::VeryHigh,
        voting: true,
        bias: SpeakerBias::Centrist,
    },
    FedSpeaker {
        surname: "JEFFERSON",
        name: "Philip Jefferson",
        role: "Vice Chair",
        weight: SpeakerWeight::High,
        voting: true,
        bias: SpeakerBias::Dovish,
    },
    FedSpeaker {
        surname: "BARR",
        name: "Michael Barr",
        role: "Vice Chair for Supervision",
        weight: SpeakerWeight::High,
        voting: true,
        bias: SpeakerBias::Centrist,
    },
    FedSpeaker {
        surname: "COOK",
        name: "Lisa Cook",
        role: "Governor",
        weight: SpeakerWeight::High,
        voting: true,
        bias: SpeakerBias::Dovish,
    },
    FedSpeaker {
        surname: "WALLER",
        name: "Christopher Waller",
        role: "Governor",
        weight: SpeakerWeight::High,
        voting: true,
        bias: SpeakerBias::Hawkish,
    },
    FedSpeaker {
        surname: "KUGLER",
        name: "Adriana Kugler",
        role: "Governor",
        weight: SpeakerWeight::High,
        voting: true,
        bias: SpeakerBias::Dovish,
    },
    FedSpeaker {
        surname: "BOWMAN",
        name: "Michelle Bowman",
        role: "Governor",
        weight: SpeakerWeight::High,
        voting: true,
        bias: SpeakerBias::Hawkish,
    },
    FedSpeaker {
        surname: "WILLIAMS",
        name: "John Williams",
        role: "President, New York Fed",
        weight: SpeakerWeight::High,
        voting: true,
        bias: SpeakerBias::Centrist,
    },
    FedSpeaker {
        surname: "GOOLSBEE",
        name: "Austan Goolsbee",
        role: "President, Chicago Fed",
        weight: SpeakerWeight::Medium,
        voting: true,
        bias: SpeakerBias::Dovish,
    },
    FedSpeaker {
        surname: "LOGAN",
        name: "Lorie Logan",
        role: "President, Dallas Fed",
        weight: SpeakerWeight::Medium,
        voting: false,
        bias: SpeakerBias::Hawkish,
    },
    FedSpeaker {
        surname: "KASHKARI",
        name: "Neel Kashkari",
        role: "President, Minneapolis Fed",
        weight: SpeakerWeight::Medium,
        voting: false,
        bias: SpeakerBias::Hawkish,
    },
    FedSpeaker {
        surname: "BOSTIC",
        name: "Raphael Bostic",
        role: "President, Atlanta Fed",
        weight: SpeakerWeight::Medium,
        voting: false,
        bias: SpeakerBias::Centrist,
    },
    FedSpeaker {
        surname: "DALY",
        name: "Mary Daly",
        role: "President, San Francisco Fed",
        weight: SpeakerWeight::Medium,
        voting: false,
        bias: SpeakerBias::Dovish,
    },
];

/// Look up a roster entry by scanning `speaker_text` for a known surname
/// (case-insensitive). Returns `None` for unlisted or institutional speakers.
pub fn find_speaker(speaker_text: &str) -> Option<&'static FedSpeaker> {
    let upper = speaker_text.to_ascii_uppercase();
    FOMC_ROSTER
        .iter()
        .find(|speaker| upper.contains(speaker.surname))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chair_outranks_regional_presidents() {
        let powell = find_speaker("Chair Jerome Powell").unwrap();
        let bostic = find_speaker("Raphael Bostic").unwrap();
        assert!(powell.weight > bostic.weight);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(find_speaker("governor waller").is_some());
    }

    #[test]
    fn unknown_speaker_is_none() {
        assert!(find_speaker("Janet Yellen").is_none());
    }
}
