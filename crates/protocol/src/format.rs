use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use telemetry_core::Channel;
use thiserror::Error;

/// Layout of one telemetry line: fields joined by `delimiter`, each field
/// `label<separator>value<unit>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFormat {
    /// Separates fields, e.g. `","`.
    pub delimiter: String,
    /// Separates a field's label from its value, e.g. `":"`.
    pub separator: String,
    /// Expected fields, in wire order.
    pub fields: Vec<FieldSpec>,
}

/// One expected field of a [`LineFormat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Label before the separator.  Empty = bare value with no label.
    #[serde(default)]
    pub label: String,
    /// Unit suffix stripped from the value, e.g. `"C"`.  Empty = none.
    #[serde(default)]
    pub unit: String,
    /// Channel the value is stored under.
    pub channel: Channel,
}

/// Built-in formats matching known firmware revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// `Temp:23.5C,Hum:40.2%,Rail V:5.01V,Light:512`
    #[default]
    Labeled,
    /// `23.5,40.2,5.01` — temperature, humidity, power with no labels.
    Legacy,
    /// Field list supplied by the config file.
    Custom,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("field delimiter must not be empty")]
    EmptyDelimiter,

    #[error("label separator must not be empty")]
    EmptySeparator,

    #[error("label separator {0:?} is the same as the field delimiter")]
    SeparatorIsDelimiter(String),

    #[error("line format declares no fields")]
    NoFields,

    #[error("channel '{0}' is mapped by more than one field")]
    DuplicateChannel(Channel),
}

impl FieldSpec {
    pub fn new(label: impl Into<String>, unit: impl Into<String>, channel: Channel) -> Self {
        Self {
            label: label.into(),
            unit: unit.into(),
            channel,
        }
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::labeled()
    }
}

impl LineFormat {
    /// Four labeled fields with unit suffixes.
    pub fn labeled() -> Self {
        Self {
            delimiter: ",".to_string(),
            separator: ":".to_string(),
            fields: vec![
                FieldSpec::new("Temp", "C", Channel::Temperature),
                FieldSpec::new("Hum", "%", Channel::Humidity),
                FieldSpec::new("Rail V", "V", Channel::Power),
                FieldSpec::new("Light", "", Channel::Light),
            ],
        }
    }

    /// Three bare comma-separated values.
    pub fn legacy() -> Self {
        Self {
            delimiter: ",".to_string(),
            separator: ":".to_string(),
            fields: vec![
                FieldSpec::new("", "", Channel::Temperature),
                FieldSpec::new("", "", Channel::Humidity),
                FieldSpec::new("", "", Channel::Power),
            ],
        }
    }

    /// Built-in format for `preset`; `None` for [`Preset::Custom`].
    pub fn from_preset(preset: Preset) -> Option<Self> {
        match preset {
            Preset::Labeled => Some(Self::labeled()),
            Preset::Legacy  => Some(Self::legacy()),
            Preset::Custom  => None,
        }
    }

    /// Reject formats that no line could ever satisfy unambiguously.
    ///
    /// The separator only matters when some field carries a label.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.delimiter.is_empty() {
            return Err(FormatError::EmptyDelimiter);
        }
        if self.fields.iter().any(|f| !f.label.is_empty()) {
            if self.separator.is_empty() {
                return Err(FormatError::EmptySeparator);
            }
            if self.separator == self.delimiter {
                return Err(FormatError::SeparatorIsDelimiter(self.separator.clone()));
            }
        }
        if self.fields.is_empty() {
            return Err(FormatError::NoFields);
        }

        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.channel) {
                return Err(FormatError::DuplicateChannel(field.channel));
            }
        }
        Ok(())
    }

    /// Example layout for log messages, e.g. `Temp:<n>C,Hum:<n>%`.
    pub fn template(&self) -> String {
        self.fields
            .iter()
            .map(|f| {
                if f.label.is_empty() {
                    format!("<n>{}", f.unit)
                } else {
                    format!("{}{}<n>{}", f.label, self.separator, f.unit)
                }
            })
            .collect::<Vec<_>>()
            .join(&self.delimiter)
    }
}
