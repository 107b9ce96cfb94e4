//! Scripted walk through a main menu, a settings screen and a confirmation
//! dialog, driven by keyboard events.
//!
//! This example shows how to:
//! - Build panels from templates
//! - Open a child panel from an input callback
//! - React to a dialog result
//! - Use an axis gesture and the cancel action
//!
//! Run with: RUST_LOG=debug cargo run -p strata --example menu_flow

use std::cell::Cell;
use std::rc::Rc;

use strata::logging;
use strata::prelude::*;

struct MainMenu {
    settings: PanelTemplate,
}

impl Panel for MainMenu {
    type OpenArg = ();
    type CloseArg = ();

    fn on_initialize(&mut self, cx: &mut PanelCx<'_, Self>) -> HookResult {
        let settings = self.settings.clone();
        cx.register_input(actions::UI_ACCEPT, InputPhase::Pressed, move |commands, _| {
            let settings = settings.clone();
            commands.defer(move |runtime| {
                let panel =
                    runtime.create_panel::<Settings>(&settings, CreatePolicy::TryReuse, |_| {})?;
                runtime.open_panel_with(
                    panel,
                    0.5,
                    OpenOptions::new().hide_previous(),
                    |_, volume| tracing::info!(volume, "settings closed"),
                )
            });
        });
        Ok(())
    }

    fn on_open(&mut self, _cx: &mut PanelCx<'_, Self>, _: &()) -> HookResult {
        tracing::info!("main menu opened");
        Ok(())
    }
}

struct Settings {
    volume: Rc<Cell<f32>>,
    confirm: PanelTemplate,
}

impl Panel for Settings {
    type OpenArg = f32;
    type CloseArg = f32;

    fn on_initialize(&mut self, cx: &mut PanelCx<'_, Self>) -> HookResult {
        let volume = Rc::clone(&self.volume);
        cx.register_axis(
            actions::UI_LEFT,
            actions::UI_RIGHT,
            CompositeState::Update,
            move |_, step| {
                volume.set((volume.get() + step * 0.1).clamp(0.0, 1.0));
                tracing::info!(volume = volume.get(), "volume changed");
            },
        );

        // Leaving asks for confirmation first.
        let handle = cx.handle();
        let volume = Rc::clone(&self.volume);
        let confirm = self.confirm.clone();
        cx.register_cancel(InputPhase::Pressed, move |commands| {
            let volume = Rc::clone(&volume);
            let confirm = confirm.clone();
            commands.defer(move |runtime| {
                let dialog =
                    runtime.create_panel::<Confirm>(&confirm, CreatePolicy::TryReuse, |_| {})?;
                runtime.open_panel_with(
                    dialog,
                    "Keep changes?".to_owned(),
                    OpenOptions::new(),
                    move |runtime, keep| {
                        let result = if keep {
                            runtime.close_panel(handle, volume.get())
                        } else {
                            Ok(false)
                        };
                        if let Err(err) = result {
                            tracing::error!(%err, "failed to leave settings");
                        }
                    },
                )
            });
        });
        Ok(())
    }

    fn on_open(&mut self, _cx: &mut PanelCx<'_, Self>, volume: &f32) -> HookResult {
        self.volume.set(*volume);
        tracing::info!(volume, "settings opened");
        Ok(())
    }
}

struct Confirm;

impl Panel for Confirm {
    type OpenArg = String;
    type CloseArg = bool;

    fn on_initialize(&mut self, cx: &mut PanelCx<'_, Self>) -> HookResult {
        cx.register_input(actions::UI_ACCEPT, InputPhase::Pressed, |commands, _| {
            commands.close(true);
        });
        cx.register_cancel(InputPhase::Pressed, |commands| commands.close(false));
        Ok(())
    }

    fn on_open(&mut self, _cx: &mut PanelCx<'_, Self>, question: &String) -> HookResult {
        tracing::info!(%question, "confirm opened");
        Ok(())
    }
}

fn main() -> PanelResult<()> {
    logging::init();

    let confirm = PanelTemplate::from_fn("confirm", || {
        (
            Confirm,
            HeadlessView::new()
                .with_child("yes", FocusPolicy::Focusable)
                .with_child("no", FocusPolicy::Focusable),
        )
    });
    let settings = PanelTemplate::from_fn("settings", move || {
        (
            Settings {
                volume: Rc::new(Cell::new(0.0)),
                confirm: confirm.clone(),
            },
            HeadlessView::new().with_child("volume", FocusPolicy::Focusable),
        )
    });
    let main_menu = PanelTemplate::from_fn("main_menu", move || {
        (
            MainMenu {
                settings: settings.clone(),
            },
            HeadlessView::new()
                .with_child("play", FocusPolicy::Focusable)
                .with_child("settings", FocusPolicy::Focusable),
        )
    });

    let mut runtime = PanelRuntime::new();
    runtime.set_default_tweener(Some(Rc::new(FadeTweener::new(0.2))));
    runtime.set_exception_handler(|failure| tracing::warn!(%failure, "hook failed"));

    let menu = runtime.create_panel::<MainMenu>(&main_menu, CreatePolicy::TryReuse, |_| {})?;
    runtime.open_panel(menu, (), OpenOptions::new())?;
    if let Some(view) = runtime.view_as_mut::<HeadlessView>(menu) {
        view.focus("settings");
    }

    let script = [
        InputEvent::key_pressed("Enter"),
        InputEvent::key_released("Enter"),
        InputEvent::key_pressed("ArrowRight"),
        InputEvent::key_released("ArrowRight"),
        InputEvent::key_pressed("ArrowRight"),
        InputEvent::key_released("ArrowRight"),
        InputEvent::key_pressed("Escape"),
        InputEvent::key_released("Escape"),
        InputEvent::key_pressed("Enter"),
        InputEvent::key_released("Enter"),
    ];

    for (frame, event) in script.into_iter().enumerate() {
        let mut batch = InputBatch::new();
        batch.push(event);
        runtime.handle_events(&mut batch)?;
        runtime.update(1.0 / 60.0);
        tracing::debug!(frame, depth = runtime.stack().len(), unhandled = batch.len(), "frame");
    }

    // Let the last fade finish.
    for _ in 0..30 {
        runtime.update(1.0 / 60.0);
    }

    let focused = runtime.view(menu).and_then(|view| view.focused_child());
    tracing::info!(depth = runtime.stack().len(), ?focused, "script finished");

    runtime.shutdown();
    Ok(())
}
