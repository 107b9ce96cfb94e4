//! Show/hide transitions.
//!
//! A tweener animates a panel view between hidden and shown. The runtime
//! calls [`PanelTweener::show`] and [`PanelTweener::hide`] and relies on the
//! `on_finish` callback to learn when a transition completed; it must run at
//! most once. Tweeners that animate over time receive
//! [`PanelTweener::advance`] every frame from
//! [`PanelRuntime::update`](crate::PanelRuntime::update).

use std::cell::RefCell;

use strata_core::alloc::HashMap;

use crate::id::PanelId;
use crate::view::PanelView;

/// Completion callback handed to a tweener.
pub type TweenFinish = Box<dyn FnOnce()>;

pub trait PanelTweener {
    /// Called once right after the panel is initialized.
    fn init(&self, _panel: PanelId, _view: &mut dyn PanelView) {}

    fn show(&self, panel: PanelId, view: &mut dyn PanelView, on_finish: Option<TweenFinish>);

    fn hide(&self, panel: PanelId, view: &mut dyn PanelView, on_finish: Option<TweenFinish>);

    /// Advances in-flight transitions of `panel` by `dt` seconds.
    fn advance(&self, _panel: PanelId, _view: &mut dyn PanelView, _dt: f32) {}

    /// Drops any state kept for `panel`; called when it is destroyed.
    fn forget(&self, _panel: PanelId) {}
}

/// Applies visibility immediately and finishes synchronously.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneTweener;

impl PanelTweener for NoneTweener {
    fn show(&self, _panel: PanelId, view: &mut dyn PanelView, on_finish: Option<TweenFinish>) {
        view.set_visible(true);
        view.set_opacity(1.0);
        if let Some(finish) = on_finish {
            finish();
        }
    }

    fn hide(&self, _panel: PanelId, view: &mut dyn PanelView, on_finish: Option<TweenFinish>) {
        view.set_visible(false);
        if let Some(finish) = on_finish {
            finish();
        }
    }
}

/// Easing curve applied to normalized transition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation
    #[default]
    Linear,
    /// Ease in (slow start)
    EaseIn,
    /// Ease out (slow end)
    EaseOut,
    /// Ease in and out (slow start and end)
    EaseInOut,
    /// Cubic ease in
    CubicIn,
    /// Cubic ease out
    CubicOut,
}

impl Easing {
    /// Apply the easing function to a normalized time value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
        }
    }
}

struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    hide_on_finish: bool,
    on_finish: Option<TweenFinish>,
}

/// Fades opacity in and out over `fade_time` seconds.
///
/// Starting a new fade on a panel interrupts the running one; the callback of
/// the interrupted fade is dropped without running.
pub struct FadeTweener {
    fade_time: f32,
    easing: Easing,
    active: RefCell<HashMap<PanelId, Fade>>,
}

impl Default for FadeTweener {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FADE_TIME)
    }
}

impl FadeTweener {
    pub const DEFAULT_FADE_TIME: f32 = 0.1;

    pub fn new(fade_time: f32) -> Self {
        Self {
            fade_time: fade_time.max(0.0),
            easing: Easing::Linear,
            active: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn fade_time(&self) -> f32 {
        self.fade_time
    }

    pub fn is_animating(&self, panel: PanelId) -> bool {
        self.active.borrow().contains_key(&panel)
    }

    fn start(
        &self,
        panel: PanelId,
        view: &mut dyn PanelView,
        to: f32,
        on_finish: Option<TweenFinish>,
    ) {
        let hide_on_finish = to <= 0.0;
        if !hide_on_finish {
            view.set_visible(true);
        }
        let fade = Fade {
            from: view.opacity(),
            to,
            elapsed: 0.0,
            hide_on_finish,
            on_finish,
        };
        if self.active.borrow_mut().insert(panel, fade).is_some() {
            tracing::trace!(%panel, "interrupted running fade");
        }
        if self.fade_time <= 0.0 {
            self.advance(panel, view, 0.0);
        }
    }
}

impl PanelTweener for FadeTweener {
    fn init(&self, _panel: PanelId, view: &mut dyn PanelView) {
        view.set_opacity(0.0);
    }

    fn show(&self, panel: PanelId, view: &mut dyn PanelView, on_finish: Option<TweenFinish>) {
        self.start(panel, view, 1.0, on_finish);
    }

    fn hide(&self, panel: PanelId, view: &mut dyn PanelView, on_finish: Option<TweenFinish>) {
        self.start(panel, view, 0.0, on_finish);
    }

    fn advance(&self, panel: PanelId, view: &mut dyn PanelView, dt: f32) {
        let finished = {
            let mut active = self.active.borrow_mut();
            let Some(fade) = active.get_mut(&panel) else {
                return;
            };
            fade.elapsed += dt;
            let t = if self.fade_time <= 0.0 {
                1.0
            } else {
                (fade.elapsed / self.fade_time).min(1.0)
            };
            let eased = self.easing.apply(t);
            view.set_opacity(fade.from + (fade.to - fade.from) * eased);
            if t < 1.0 {
                return;
            }
            active.remove(&panel)
        };
        if let Some(fade) = finished {
            if fade.hide_on_finish {
                view.set_visible(false);
            }
            if let Some(finish) = fade.on_finish {
                finish();
            }
        }
    }

    fn forget(&self, panel: PanelId) {
        self.active.borrow_mut().remove(&panel);
    }
}
