use serde::{Deserialize, Serialize};
use std::fmt;

/// A sensor channel reported by the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Temperature,
    Humidity,
    Power,
    Light,
}

impl Channel {
    /// Every channel, in display order.
    pub const ALL: [Channel; 4] = [
        Channel::Temperature,
        Channel::Humidity,
        Channel::Power,
        Channel::Light,
    ];

    /// Human-readable label shown in front of the value.
    pub fn title(self) -> &'static str {
        match self {
            Channel::Temperature => "Temperature",
            Channel::Humidity    => "Humidity",
            Channel::Power       => "Power",
            Channel::Light       => "Light",
        }
    }

    /// Display unit appended after the value (empty for unitless channels).
    pub fn display_unit(self) -> &'static str {
        match self {
            Channel::Temperature => "°C",
            Channel::Humidity    => "%",
            Channel::Power       => "W",
            Channel::Light       => "",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Channel::Temperature => 0,
            Channel::Humidity    => 1,
            Channel::Power       => 2,
            Channel::Light       => 3,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One decoded set of sensor readings for a single tick.
///
/// Built once per successfully decoded line and never mutated afterwards.
/// Channels the active line format does not carry are simply absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    values: [Option<f64>; 4],
}

impl Sample {
    /// Build a sample from `(channel, value)` pairs.  A channel listed twice
    /// keeps its last value.
    pub fn from_readings(readings: impl IntoIterator<Item = (Channel, f64)>) -> Self {
        let mut values = [None; 4];
        for (channel, value) in readings {
            values[channel.index()] = Some(value);
        }
        Self { values }
    }

    #[must_use]
    pub fn get(&self, channel: Channel) -> Option<f64> {
        self.values[channel.index()]
    }

    pub fn temperature(&self) -> Option<f64> {
        self.get(Channel::Temperature)
    }

    pub fn humidity(&self) -> Option<f64> {
        self.get(Channel::Humidity)
    }

    pub fn power(&self) -> Option<f64> {
        self.get(Channel::Power)
    }

    pub fn light(&self) -> Option<f64> {
        self.get(Channel::Light)
    }

    /// Present readings in display order.
    pub fn readings(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        Channel::ALL
            .into_iter()
            .filter_map(|c| self.get(c).map(|v| (c, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_channels_read_as_none() {
        let sample = Sample::from_readings([(Channel::Temperature, 21.0)]);
        assert_eq!(sample.temperature(), Some(21.0));
        assert_eq!(sample.light(), None);
        assert!(!sample.is_empty());
    }

    #[test]
    fn readings_follow_display_order() {
        let sample = Sample::from_readings([(Channel::Light, 512.0), (Channel::Humidity, 40.0)]);
        let channels: Vec<_> = sample.readings().map(|(c, _)| c).collect();
        assert_eq!(channels, vec![Channel::Humidity, Channel::Light]);
    }

    #[test]
    fn repeated_channel_keeps_last_value() {
        let sample = Sample::from_readings([(Channel::Power, 1.0), (Channel::Power, 5.0)]);
        assert_eq!(sample.power(), Some(5.0));
    }
}
