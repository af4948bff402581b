//! On-disk YAML shape of the configuration file.
//!
//! These types mirror the file 1:1 and stay lenient about legacy spellings;
//! [`super::AppConfig`] is the validated form the rest of the crate uses.

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

use crate::reconcile::AirDateOffset;

#[derive(Debug, Deserialize)]
pub(crate) struct FileConfig {
    pub sonarrytdl: Option<DaemonSection>,
    pub sonarr: Option<SonarrSection>,
    pub ytdl: Option<YtdlSection>,
    #[serde(default)]
    pub series: Option<Vec<SeriesSection>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DaemonSection {
    pub scan_interval: u64,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SonarrSection {
    pub host: String,
    pub port: u16,
    #[serde(deserialize_with = "string_or_number")]
    pub apikey: String,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub basedir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct YtdlSection {
    pub default_format: String,
    pub merge_output_format: String,
    #[serde(default)]
    pub output_root: Option<String>,
    #[serde(default)]
    pub binary: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeriesSection {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub cookies_file: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "optional_flag")]
    pub playlistreverse: Option<bool>,
    #[serde(default, alias = "preprend_with_title", deserialize_with = "optional_flag")]
    pub prepend_with_title: Option<bool>,
    #[serde(default)]
    pub regex: Option<RegexSection>,
    #[serde(default)]
    pub offset: Option<AirDateOffset>,
    #[serde(default, deserialize_with = "present_section")]
    pub subtitles: Option<SubtitleSection>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegexSection {
    #[serde(default)]
    pub sonarr: Option<RewriteSection>,
    #[serde(default)]
    pub site: Option<RewriteSection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RewriteSection {
    #[serde(rename = "match")]
    pub pattern: String,
    pub replace: String,
}

/// `subtitles:` may be an empty mapping (or `~`) meaning "enabled with defaults".
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SubtitleSection {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub autogenerated: Option<bool>,
}

/// A key that is present, even with an empty value, yields `Some`.
fn present_section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Accepts `apikey: abc123` as well as an all-digit key YAML parses as a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct KeyVisitor;

    impl Visitor<'_> for KeyVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(KeyVisitor)
}

/// Accepts a YAML bool or the strings `"true"` / `"false"` in any case.
fn optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = Option<bool>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or \"true\"/\"false\"")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Ok(Some(true)),
                "false" | "no" => Ok(Some(false)),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, deserializer: D2) -> Result<Self::Value, D2::Error> {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
