//! Scripted stimulus for the simulated board
//!
//! Each phase of a session re-programs the board so the detector under
//! test sees the kind of activity it is looking for. Times are relative to
//! the start of the phase.

use bsp_core::Channel;
use bsp_simulation::{Segment, SignalPattern, SimulatedBoard};

const EOG_CENTER: f32 = 450.0;
const EMG_REST: f32 = 20.0;

/// Resting ECG and periodic EMG clenches, active for the whole session
pub fn baseline(board: &mut SimulatedBoard) {
    board.set_pattern(Channel::Ecg, SignalPattern::heartbeat(72.0));
    board.set_pattern(Channel::Emg, SignalPattern::clench_bursts(600.0, 150.0));
    board.set_pattern(Channel::Eog, SignalPattern::Constant { level: EOG_CENTER });
}

/// Hold an upward look for a second, then swing back through center
pub fn gaze(board: &mut SimulatedBoard, start_ms: f64) {
    board.set_pattern(Channel::Eog, SignalPattern::Script {
        baseline: EOG_CENTER,
        segments: vec![
            Segment::new(start_ms + 1000.0, start_ms + 2000.0, 700.0),
            Segment::new(start_ms + 2000.0, start_ms + 2600.0, 200.0),
        ],
    });
}

/// One sharp rise and drop half a second into the phase
pub fn blink(board: &mut SimulatedBoard, start_ms: f64) {
    board.set_pattern(Channel::Eog, SignalPattern::Script {
        baseline: EOG_CENTER,
        segments: vec![
            Segment::new(start_ms + 500.0, start_ms + 600.0, 560.0),
            Segment::new(start_ms + 600.0, start_ms + 700.0, 380.0),
        ],
    });
}

/// EMG burst `delay_ms` after `start_ms`
pub fn respond_after(board: &mut SimulatedBoard, start_ms: f64, delay_ms: f64) {
    board.set_pattern(Channel::Emg, SignalPattern::Script {
        baseline: EMG_REST,
        segments: vec![Segment::new(start_ms + delay_ms, start_ms + delay_ms + 200.0, 600.0)],
    });
}
