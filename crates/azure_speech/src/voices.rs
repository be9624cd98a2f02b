//! Voice directory
//!
//! The catalog is fetched once when the TTS client is created and indexed by
//! short name. It is never refreshed: voices published later stay invisible
//! until a new TTS client is built.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SpeechError;
use crate::types::{Gender, VoiceType};

/// One voice from the service catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceEntry {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "ShortName")]
    pub short_name: String,
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
    #[serde(rename = "LocalName", default)]
    pub local_name: String,
    #[serde(rename = "Locale")]
    pub locale: String,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "SampleRateHertz", deserialize_with = "decimal")]
    pub sample_rate_hertz: u32,
    #[serde(rename = "VoiceType")]
    pub voice_type: VoiceType,
    #[serde(rename = "SecondaryLocaleList", default)]
    pub secondary_locales: BTreeSet<String>,
    #[serde(rename = "RolePlayList", default)]
    pub role_play_list: BTreeSet<String>,
    #[serde(
        rename = "WordsPerMinute",
        default,
        deserialize_with = "optional_decimal"
    )]
    pub words_per_minute: Option<u32>,
}

/// The catalog sends counts as strings ("16000"); accept either form
#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Text(String),
    Number(u32),
}

impl Decimal {
    fn parse<E: serde::de::Error>(self) -> Result<u32, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected a decimal number, got {s:?}"))),
        }
    }
}

fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Decimal::deserialize(deserializer)?.parse()
}

fn optional_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Option::<Decimal>::deserialize(deserializer)?
        .map(Decimal::parse)
        .transpose()
}

/// Voices indexed by short name, e.g. `en-US-JennyNeural`
#[derive(Debug, Clone, Default)]
pub struct VoiceDirectory {
    voices: HashMap<String, VoiceEntry>,
}

impl VoiceDirectory {
    /// Index catalog entries; a repeated short name replaces the earlier entry
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = VoiceEntry>) -> Self {
        let voices = entries
            .into_iter()
            .map(|entry| (entry.short_name.clone(), entry))
            .collect();
        Self { voices }
    }

    /// Decode the catalog's JSON array
    pub fn from_json(body: &[u8]) -> Result<Self, SpeechError> {
        let entries: Vec<VoiceEntry> = serde_json::from_slice(body).map_err(|e| {
            SpeechError::InvalidResponse(format!("Failed to decode voice list: {e}"))
        })?;
        Ok(Self::from_entries(entries))
    }

    /// Exact, case-sensitive lookup by short name
    pub fn lookup(&self, short_name: &str) -> Result<&VoiceEntry, SpeechError> {
        self.voices
            .get(short_name)
            .ok_or_else(|| SpeechError::VoiceNotFound(short_name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, short_name: &str) -> bool {
        self.voices.contains_key(short_name)
    }

    /// Voices whose primary locale matches, sorted by short name
    #[must_use]
    pub fn by_locale(&self, locale: &str) -> Vec<&VoiceEntry> {
        let mut matches: Vec<_> = self
            .voices
            .values()
            .filter(|v| v.locale.eq_ignore_ascii_case(locale))
            .collect();
        matches.sort_by(|a, b| a.short_name.cmp(&b.short_name));
        matches
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoiceEntry> {
        self.voices.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {
            "Name": "Microsoft Server Speech Text to Speech Voice (it-IT, ElsaNeural)",
            "DisplayName": "Elsa",
            "LocalName": "Elsa",
            "ShortName": "it-IT-ElsaNeural",
            "Gender": "Female",
            "Locale": "it-IT",
            "LocaleName": "Italian (Italy)",
            "SampleRateHertz": "48000",
            "VoiceType": "Neural",
            "Status": "GA",
            "WordsPerMinute": "148"
        },
        {
            "Name": "Microsoft Server Speech Text to Speech Voice (zh-CN, XiaomoNeural)",
            "ShortName": "zh-CN-XiaomoNeural",
            "Gender": "Female",
            "Locale": "zh-CN",
            "SampleRateHertz": "24000",
            "VoiceType": "Neural",
            "SecondaryLocaleList": ["en-US"],
            "RolePlayList": ["YoungAdultFemale", "OlderAdultMale", "Boy"]
        },
        {
            "ShortName": "ar-SA-Naayf",
            "Gender": "Male",
            "Locale": "ar-SA",
            "SampleRateHertz": "16000",
            "VoiceType": "Standard"
        }
    ]"#;

    fn entry(short_name: &str, locale: &str) -> VoiceEntry {
        VoiceEntry {
            name: String::new(),
            short_name: short_name.to_string(),
            display_name: String::new(),
            local_name: String::new(),
            locale: locale.to_string(),
            gender: Gender::Neutral,
            sample_rate_hertz: 24_000,
            voice_type: VoiceType::Neural,
            secondary_locales: BTreeSet::new(),
            role_play_list: BTreeSet::new(),
            words_per_minute: None,
        }
    }

    #[test]
    fn decodes_catalog_and_indexes_by_short_name() {
        let directory = VoiceDirectory::from_json(CATALOG.as_bytes()).unwrap();
        assert_eq!(directory.len(), 3);

        let elsa = directory.lookup("it-IT-ElsaNeural").unwrap();
        assert_eq!(elsa.display_name, "Elsa");
        assert_eq!(elsa.gender, Gender::Female);
        assert_eq!(elsa.sample_rate_hertz, 48_000);
        assert_eq!(elsa.words_per_minute, Some(148));

        let xiaomo = directory.lookup("zh-CN-XiaomoNeural").unwrap();
        assert!(xiaomo.role_play_list.contains("OlderAdultMale"));
        assert!(xiaomo.secondary_locales.contains("en-US"));
        assert_eq!(xiaomo.words_per_minute, None);
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let directory = VoiceDirectory::from_json(CATALOG.as_bytes()).unwrap();
        assert!(directory.contains("ar-SA-Naayf"));
        assert!(matches!(
            directory.lookup("ar-sa-naayf"),
            Err(SpeechError::VoiceNotFound(name)) if name == "ar-sa-naayf"
        ));
    }

    #[test]
    fn duplicate_short_name_last_write_wins() {
        let mut second = entry("en-US-JennyNeural", "en-US");
        second.display_name = "Jenny v2".to_string();
        let directory =
            VoiceDirectory::from_entries([entry("en-US-JennyNeural", "en-US"), second]);
        assert_eq!(directory.len(), 1);
        assert_eq!(
            directory.lookup("en-US-JennyNeural").unwrap().display_name,
            "Jenny v2"
        );
    }

    #[test]
    fn by_locale_filters_and_sorts() {
        let directory = VoiceDirectory::from_entries([
            entry("en-US-JennyNeural", "en-US"),
            entry("de-DE-KatjaNeural", "de-DE"),
            entry("en-US-AriaNeural", "en-US"),
        ]);
        let names: Vec<_> = directory
            .by_locale("en-us")
            .into_iter()
            .map(|v| v.short_name.as_str())
            .collect();
        assert_eq!(names, vec!["en-US-AriaNeural", "en-US-JennyNeural"]);
    }

    #[test]
    fn numeric_sample_rate_is_accepted() {
        let json = r#"[{"ShortName":"x","Gender":"Male","Locale":"en-US","SampleRateHertz":16000,"VoiceType":"Standard"}]"#;
        let directory = VoiceDirectory::from_json(json.as_bytes()).unwrap();
        assert_eq!(directory.lookup("x").unwrap().sample_rate_hertz, 16_000);
    }

    #[test]
    fn malformed_catalog_is_invalid_response() {
        let result = VoiceDirectory::from_json(b"{\"not\":\"an array\"}");
        assert!(matches!(result, Err(SpeechError::InvalidResponse(_))));

        let bad_rate = r#"[{"ShortName":"x","Gender":"Male","Locale":"en-US","SampleRateHertz":"fast","VoiceType":"Standard"}]"#;
        assert!(VoiceDirectory::from_json(bad_rate.as_bytes()).is_err());
    }

    #[test]
    fn empty_directory() {
        let directory = VoiceDirectory::default();
        assert!(directory.is_empty());
        assert_eq!(directory.iter().count(), 0);
    }
}
