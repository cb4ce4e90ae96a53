//! Cue-to-response reaction timing

use crate::config::ReactionConfig;
use bsp_core::{BspResult, Cue, CuePresenter, MonotonicClock, SampleSource};
use tracing::{debug, info};

/// Presents a cue, then times the first EMG crossing of a fixed threshold
#[derive(Debug, Clone, Default)]
pub struct ReactionTimer {
    config: ReactionConfig,
}

impl ReactionTimer {
    pub fn new(config: ReactionConfig) -> BspResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReactionConfig {
        &self.config
    }

    /// Run one trial.
    ///
    /// The cue (if any) is presented first and timing starts once the
    /// presenter returns. The loop always runs the whole response window;
    /// only the first sample strictly above the threshold is timed.
    pub fn reaction_time<S, C, P>(
        &self,
        source: &mut S,
        clock: &C,
        presenter: &mut P,
        cue: Option<Cue>,
    ) -> Option<u64>
    where
        S: SampleSource,
        C: MonotonicClock,
        P: CuePresenter,
    {
        match cue {
            Some(Cue::Visual) => presenter.show_icon(self.config.cue_ms),
            Some(Cue::Audio) => presenter.play_tone(self.config.cue_ms),
            None => {}
        }

        let start = clock.now_millis();
        let mut reaction = None;

        loop {
            let elapsed = clock.now_millis().saturating_sub(start);
            if elapsed >= self.config.window_ms {
                break;
            }
            let value = source.read(self.config.channel);
            if reaction.is_none() && value > self.config.threshold {
                debug!(value, elapsed, "response onset");
                reaction = Some(elapsed);
            }
        }

        match reaction {
            Some(ms) => info!(cue = ?cue, reaction_ms = ms, "reaction recorded"),
            None => info!(cue = ?cue, window_ms = self.config.window_ms, "no response"),
        }
        reaction
    }
}
