//! Service regions and endpoint templates
//!
//! Every speech endpoint is region-scoped: the region label is the leading
//! host component of the token, TTS and STT hosts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Azure regions that host the speech services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    AustraliaEast,
    BrazilSouth,
    CanadaCentral,
    CentralUS,
    EastAsia,
    EastUS,
    EastUS2,
    FranceCentral,
    IndiaCentral,
    JapanEast,
    JapanWest,
    KoreaCentral,
    NorthCentralUS,
    NorthEurope,
    SouthCentralUS,
    SoutheastAsia,
    UKSouth,
    WestEurope,
    WestUS,
    /// Free-tier keys are issued here
    #[default]
    WestUS2,
}

impl Region {
    /// All supported regions
    pub const ALL: [Self; 20] = [
        Self::AustraliaEast,
        Self::BrazilSouth,
        Self::CanadaCentral,
        Self::CentralUS,
        Self::EastAsia,
        Self::EastUS,
        Self::EastUS2,
        Self::FranceCentral,
        Self::IndiaCentral,
        Self::JapanEast,
        Self::JapanWest,
        Self::KoreaCentral,
        Self::NorthCentralUS,
        Self::NorthEurope,
        Self::SouthCentralUS,
        Self::SoutheastAsia,
        Self::UKSouth,
        Self::WestEurope,
        Self::WestUS,
        Self::WestUS2,
    ];

    /// Host label used in endpoint URLs, e.g. `westus2`
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AustraliaEast => "australiaeast",
            Self::BrazilSouth => "brazilsouth",
            Self::CanadaCentral => "canadacentral",
            Self::CentralUS => "centralus",
            Self::EastAsia => "eastasia",
            Self::EastUS => "eastus",
            Self::EastUS2 => "eastus2",
            Self::FranceCentral => "francecentral",
            Self::IndiaCentral => "centralindia",
            Self::JapanEast => "japaneast",
            Self::JapanWest => "japanwest",
            Self::KoreaCentral => "koreacentral",
            Self::NorthCentralUS => "northcentralus",
            Self::NorthEurope => "northeurope",
            Self::SouthCentralUS => "southcentralus",
            Self::SoutheastAsia => "southeastasia",
            Self::UKSouth => "uksouth",
            Self::WestEurope => "westeurope",
            Self::WestUS => "westus",
            Self::WestUS2 => "westus2",
        }
    }

    /// Token issuance endpoint
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "https://{}.api.cognitive.microsoft.com/sts/v1.0/issueToken",
            self.as_str()
        )
    }

    /// Base of the TTS endpoints; synthesis is `{base}/v1`, the catalog `{base}/voices/list`
    #[must_use]
    pub fn tts_base_url(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices",
            self.as_str()
        )
    }

    /// Short-form recognition endpoint
    #[must_use]
    pub fn stt_url(&self) -> String {
        format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
            self.as_str()
        )
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    /// Accepts the host label (`westus2`) or the enum name (`WestUS2`), any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|region| {
                region.as_str() == wanted || format!("{region:?}").to_ascii_lowercase() == wanted
            })
            .ok_or_else(|| format!("Invalid region: {s}"))
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
