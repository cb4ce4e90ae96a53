//! Sample and channel types shared by every detector

use serde::{Deserialize, Serialize};

/// A raw ADC reading. Arrival order is the only timestamp.
pub type Sample = u16;

/// Largest value the 10-bit front end can report
pub const ADC_MAX: Sample = 1023;

/// Analog input channels wired to the acquisition board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// Electroencephalography
    Eeg,
    /// Electromyography
    Emg,
    /// Electrocardiography
    Ecg,
    /// Electrooculography
    Eog,
}

impl Channel {
    /// All channels in board order
    pub const ALL: [Channel; 4] = [Channel::Eeg, Channel::Emg, Channel::Ecg, Channel::Eog];

    /// Short label used for telemetry
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Eeg => "EEG",
            Channel::Emg => "EMG",
            Channel::Ecg => "ECG",
            Channel::Eog => "EOG",
        }
    }

    /// Position of this channel in [`Channel::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Channel::Eeg => 0,
            Channel::Emg => 1,
            Channel::Ecg => 2,
            Channel::Eog => 3,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Cue shown before a reaction trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Icon on the display
    Visual,
    /// Tone on the buzzer
    Audio,
}

/// Vertical electrooculography classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalGaze {
    #[default]
    None,
    Up,
    Down,
    Blink,
}

/// Horizontal electrooculography classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalGaze {
    #[default]
    None,
    Left,
    Right,
}

impl std::fmt::Display for VerticalGaze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerticalGaze::None => write!(f, "none"),
            VerticalGaze::Up => write!(f, "up"),
            VerticalGaze::Down => write!(f, "down"),
            VerticalGaze::Blink => write!(f, "blink"),
        }
    }
}

impl std::fmt::Display for HorizontalGaze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HorizontalGaze::None => write!(f, "none"),
            HorizontalGaze::Left => write!(f, "left"),
            HorizontalGaze::Right => write!(f, "right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_labels() {
        let labels: Vec<String> = Channel::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels, vec!["EEG", "EMG", "ECG", "EOG"]);
    }

    #[test]
    fn test_channel_index_matches_order() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }

    #[test]
    fn test_gaze_defaults() {
        assert_eq!(VerticalGaze::default(), VerticalGaze::None);
        assert_eq!(HorizontalGaze::default(), HorizontalGaze::None);
        assert_eq!(VerticalGaze::Blink.to_string(), "blink");
    }
}
