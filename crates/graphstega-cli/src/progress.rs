//! Terminal progress rendering.
//!
//! Adapts the engine's advisory ticks to an `indicatif` bar. Ticks arrive
//! through a shared reference, so the bar state sits behind a mutex; a new
//! phase (or a new pass of the same phase) swaps in a fresh bar.

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;

use graphstega_core::{Phase, Reporter};

struct State {
    phase: Option<Phase>,
    bar: Option<ProgressBar>,
}

pub struct TerminalReporter {
    state: Mutex<State>,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                phase: None,
                bar: None,
            }),
        }
    }

    /// Finish any live bar (call once the engine returns).
    pub fn finish(&self) {
        let mut state = self.state.lock();
        if let Some(bar) = state.bar.take() {
            bar.finish_and_clear();
        }
        state.phase = None;
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn label(phase: Phase) -> &'static str {
    match phase {
        Phase::EdgeSearch => "finding edges",
        Phase::ReserveSearch => "reserve matching",
        Phase::Adjust => "adjusting",
    }
}

impl Reporter for TerminalReporter {
    fn tick(&self, phase: Phase, completed: usize, total: usize) {
        let mut state = self.state.lock();
        let fresh_pass = state.phase != Some(phase) || completed == 0;
        if fresh_pass {
            if let Some(old) = state.bar.take() {
                old.finish_and_clear();
            }
            let bar = ProgressBar::new(total as u64).with_message(label(phase));
            bar.set_style(
                ProgressStyle::with_template("{msg:>18} [{bar:30}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            state.phase = Some(phase);
            state.bar = Some(bar);
        }
        if let Some(bar) = &state.bar {
            bar.set_position(completed as u64);
        }
    }
}
