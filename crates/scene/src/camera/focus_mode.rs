use foundation::bounds::Margins;
use foundation::math::Projection;
use runtime::DebounceTimer;
use serde::{Deserialize, Serialize};

use crate::focus::{Focus, FocusFitCalculator, FocusRangeTarget};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusModeConfig {
    pub debounce_ms: f64,
    /// Extra pixels kept between the focus and the dead zone on each side.
    pub margin_px: f64,
    /// Range index used when the focus collapses to a single point.
    pub default_range_index: usize,
}

impl Default for FocusModeConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500.0,
            margin_px: 20.0,
            default_range_index: 17,
        }
    }
}

/// Flight-plan focus state owned by a camera controller.
///
/// `active` is the effective state. It follows the upstream `focused` flag
/// except while the pointer has taken the camera over.
#[derive(Debug, Clone)]
pub(crate) struct FocusMode {
    pub(crate) config: FocusModeConfig,
    pub(crate) focus: Option<Focus>,
    pub(crate) focused: bool,
    pub(crate) follow_focused: bool,
    pub(crate) active: bool,
    pub(crate) solution: FocusRangeTarget,
    timer: DebounceTimer,
    calculator: FocusFitCalculator,
}

impl FocusMode {
    pub(crate) fn new(config: FocusModeConfig) -> Self {
        Self {
            config,
            focus: None,
            focused: false,
            follow_focused: true,
            active: false,
            solution: FocusRangeTarget::none(),
            timer: DebounceTimer::new(),
            calculator: FocusFitCalculator::new(),
        }
    }

    /// Returns whether the effective state changed.
    pub(crate) fn set_active(&mut self, active: bool) -> bool {
        if self.active == active {
            return false;
        }
        self.active = active;
        if active {
            self.timer.schedule(0.0);
        } else {
            self.timer.cancel();
        }
        true
    }

    pub(crate) fn set_focus(&mut self, focus: Option<Focus>) {
        self.focus = focus;
        self.solution = FocusRangeTarget::none();
        if self.active {
            self.timer.schedule(self.config.debounce_ms);
        }
    }

    pub(crate) fn on_plan_calculated(&mut self) {
        if self.active && self.focus.is_some() && !self.solution.is_solved() {
            self.timer.schedule(0.0);
        }
    }

    pub(crate) fn is_solve_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub(crate) fn solve_due(&self, elapsed_ms: f64) -> bool {
        self.timer.fires_within(elapsed_ms)
    }

    /// Ticks the debounce; solves when it fires.
    pub(crate) fn tick<P: Projection + ?Sized>(
        &mut self,
        elapsed_ms: f64,
        dead_zone: Margins,
        projection: &P,
    ) -> Option<FocusRangeTarget> {
        if !self.timer.tick(elapsed_ms) {
            return None;
        }
        let margins = dead_zone.grown_by(self.config.margin_px);
        self.solution = self
            .calculator
            .calculate(self.focus.as_ref(), margins, projection);
        Some(self.solution)
    }
}
