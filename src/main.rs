//! Main module for the Cube Timer application using Yew.
//! Wires UI components, state hooks, and side-effect logic.

use cube_timer::{
    format_time, generate_scramble, inspection_label, session_stats, Penalty, Puzzle, Settings,
    Solve, StoredData, TimerMachine, TimerPhase,
};
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

mod components;
mod config;
mod hooks;
mod storage;
mod utils;

use components::{render_times_list, SettingsModal, StatsPanel, TimeAction};
use config::TICK_MS;
use hooks::{use_document_keyboard, use_tick};
use utils::{iso_now, now_ms};

fn phase_class(phase: TimerPhase) -> &'static str {
    match phase {
        TimerPhase::Idle => "idle",
        TimerPhase::Holding => "holding",
        TimerPhase::Ready => "ready",
        TimerPhase::Inspection => "inspection",
        TimerPhase::Running => "running",
    }
}

fn phase_hint(phase: TimerPhase) -> &'static str {
    match phase {
        TimerPhase::Idle => "Hold space to start",
        TimerPhase::Holding => "Keep holding...",
        TimerPhase::Ready => "Release to start",
        TimerPhase::Inspection => "Inspecting",
        TimerPhase::Running => "",
    }
}

/// Primary application component wiring state, effects, and UI elements.
#[function_component(App)]
fn app() -> Html {
    let initial = use_mut_ref(storage::load_or_default);

    let solves = use_state(|| initial.borrow().times.clone());
    let settings = use_state(|| initial.borrow().settings.clone());
    let puzzle = use_state(|| initial.borrow().current_puzzle);
    let scramble = use_state(|| generate_scramble(initial.borrow().current_puzzle));

    let machine = use_mut_ref(TimerMachine::new);
    let phase = use_state(|| TimerPhase::Idle);
    let display_ms = use_state(|| 0.0_f64);
    let inspection = use_state(String::new);
    let settings_open = use_state(|| false);

    // Apply the theme to the document root whenever it changes.
    {
        let theme = settings.theme;
        use_effect_with(theme, move |theme| {
            if let Some(root) = gloo_utils::document().document_element() {
                if root.set_attribute("data-theme", theme.as_str()).is_err() {
                    log::warn!("failed to apply theme attribute");
                }
            }
            || ()
        });
    }

    // Persist the session on every change to times, settings or puzzle.
    use_effect_with(
        ((*solves).clone(), (*settings).clone(), *puzzle),
        move |(times, settings, puzzle)| {
            let data = StoredData {
                times: times.clone(),
                settings: settings.clone(),
                current_puzzle: *puzzle,
            };
            if let Err(err) = storage::save(&data) {
                log::warn!("failed to save session: {err}");
            }
            || ()
        },
    );

    // Shared press logic for spacebar and touch: starts holding, or
    // stops a running timer and records the solve.
    let press = {
        let machine = machine.clone();
        let settings = settings.clone();
        let phase = phase.clone();
        let display_ms = display_ms.clone();
        let solves = solves.clone();
        let scramble = scramble.clone();
        let puzzle = puzzle.clone();
        Callback::from(move |_: ()| {
            let now = now_ms();
            let finished = machine.borrow_mut().press(
                now,
                settings.hold_time as f64,
                settings.inspection_enabled,
            );
            if let Some(done) = finished {
                let solve = Solve {
                    id: now as u64,
                    time: done.time,
                    penalty: done.penalty,
                    scramble: (*scramble).clone(),
                    puzzle: *puzzle,
                    date: iso_now(),
                };
                let mut next = (*solves).clone();
                next.insert(0, solve);
                solves.set(next);
                display_ms.set(done.time);
                scramble.set(generate_scramble(*puzzle));
            } else {
                display_ms.set(0.0);
            }
            phase.set(machine.borrow().phase());
        })
    };

    let release = {
        let machine = machine.clone();
        let phase = phase.clone();
        Callback::from(move |_: ()| {
            machine.borrow_mut().release(now_ms());
            phase.set(machine.borrow().phase());
        })
    };

    let cancel = {
        let machine = machine.clone();
        let phase = phase.clone();
        let display_ms = display_ms.clone();
        Callback::from(move |_: ()| {
            machine.borrow_mut().cancel();
            phase.set(TimerPhase::Idle);
            display_ms.set(0.0);
        })
    };

    // Timer tick: promotes the hold, drives the running display and the
    // inspection countdown. Only active outside Idle.
    {
        let machine = machine.clone();
        let phase_mirror = phase.clone();
        let display_ms = display_ms.clone();
        let inspection = inspection.clone();
        let on_tick = Callback::from(move |_: ()| {
            let now = now_ms();
            let (current, elapsed, inspecting) = {
                let mut m = machine.borrow_mut();
                m.tick(now);
                (m.phase(), m.elapsed_ms(now), m.inspection_elapsed_secs(now))
            };
            match current {
                TimerPhase::Running => display_ms.set(elapsed),
                TimerPhase::Inspection => {
                    if let Some(secs) = inspecting {
                        inspection.set(inspection_label(secs));
                    }
                }
                _ => {}
            }
            phase_mirror.set(current);
        });
        use_tick(*phase != TimerPhase::Idle, TICK_MS, on_tick);
    }

    // Document-level keyboard wiring. Ignored while the settings modal
    // is open or an input/select has focus.
    let on_key_down = {
        let press = press.clone();
        let cancel = cancel.clone();
        let phase = phase.clone();
        let settings_open = settings_open.clone();
        Callback::from(move |e: KeyboardEvent| {
            if *settings_open {
                return;
            }
            if let Some(target) = e.target() {
                if target.dyn_ref::<HtmlInputElement>().is_some()
                    || target.dyn_ref::<HtmlSelectElement>().is_some()
                {
                    return;
                }
            }
            match e.code().as_str() {
                "Space" => {
                    e.prevent_default();
                    if !e.repeat() {
                        press.emit(());
                    }
                }
                "Escape" => {
                    if matches!(*phase, TimerPhase::Running | TimerPhase::Inspection) {
                        cancel.emit(());
                    }
                }
                _ => {}
            }
        })
    };
    let on_key_up = {
        let release = release.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.code() == "Space" {
                e.prevent_default();
                release.emit(());
            }
        })
    };
    use_document_keyboard(on_key_down, on_key_up);

    // Touch wiring, scoped to the timer surface.
    let on_touch_start = {
        let press = press.clone();
        Callback::from(move |e: TouchEvent| {
            e.prevent_default();
            press.emit(());
        })
    };
    let on_touch_end = {
        let press = press.clone();
        let release = release.clone();
        let phase = phase.clone();
        Callback::from(move |e: TouchEvent| {
            e.prevent_default();
            match *phase {
                TimerPhase::Holding | TimerPhase::Ready => release.emit(()),
                TimerPhase::Running => press.emit(()),
                _ => {}
            }
        })
    };

    let on_new_scramble = {
        let scramble = scramble.clone();
        let puzzle = puzzle.clone();
        Callback::from(move |_: MouseEvent| {
            scramble.set(generate_scramble(*puzzle));
        })
    };

    let on_puzzle_change = {
        let puzzle = puzzle.clone();
        let scramble = scramble.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let chosen = Puzzle::from_code(&select.value());
            puzzle.set(chosen);
            scramble.set(generate_scramble(chosen));
        })
    };

    let on_clear_session = {
        let solves = solves.clone();
        Callback::from(move |_: MouseEvent| {
            let confirmed = gloo_utils::window()
                .confirm_with_message("Clear the session? All times will be deleted.")
                .unwrap_or(false);
            if confirmed {
                solves.set(Vec::new());
            }
        })
    };

    let on_time_action = {
        let solves = solves.clone();
        Callback::from(move |(id, action): (u64, TimeAction)| {
            let mut next = (*solves).clone();
            match action {
                TimeAction::Delete => next.retain(|s| s.id != id),
                TimeAction::TogglePlus2 => {
                    if let Some(solve) = next.iter_mut().find(|s| s.id == id) {
                        solve.penalty = if solve.penalty == Some(Penalty::Plus2) {
                            None
                        } else {
                            Some(Penalty::Plus2)
                        };
                    }
                }
                TimeAction::ToggleDnf => {
                    if let Some(solve) = next.iter_mut().find(|s| s.id == id) {
                        solve.penalty = if solve.penalty == Some(Penalty::Dnf) {
                            None
                        } else {
                            Some(Penalty::Dnf)
                        };
                    }
                }
            }
            solves.set(next);
        })
    };

    let open_settings = {
        let settings_open = settings_open.clone();
        Callback::from(move |_: MouseEvent| settings_open.set(true))
    };
    let close_settings = {
        let settings_open = settings_open.clone();
        Callback::from(move |_: ()| settings_open.set(false))
    };
    let on_settings_change = {
        let settings = settings.clone();
        Callback::from(move |next: Settings| settings.set(next))
    };

    let stats = session_stats(&solves);
    let timing = *phase == TimerPhase::Running;
    let app_class = classes!(
        "container",
        (timing && settings.hide_ui_when_timing).then_some("timing-mode")
    );
    let timer_class = classes!("timer-display", phase_class(*phase));

    html! {
        <div class={app_class}>
            <header class="header">
                <h1>{ "Cube Timer" }</h1>
                <div class="header-controls">
                    <select class="puzzle-select" onchange={on_puzzle_change}>
                        { Puzzle::ALL.iter().map(|p| html! {
                            <option value={p.code()} selected={*puzzle == *p}>{ p.label() }</option>
                        }).collect::<Html>() }
                    </select>
                    <button class="btn-secondary" onclick={open_settings}>{ "Settings" }</button>
                </div>
            </header>

            <section class="scramble-section">
                <span class="scramble">{ (*scramble).clone() }</span>
                <button class="btn-secondary" onclick={on_new_scramble}>{ "New scramble" }</button>
            </section>

            <section class="timer-section"
                ontouchstart={on_touch_start}
                ontouchend={on_touch_end}
            >
                <div class={timer_class}>
                    <div class="timer-time">{ format_time(*display_ms) }</div>
                    <div class="timer-hint">{ phase_hint(*phase) }</div>
                    if *phase == TimerPhase::Inspection {
                        <div class="inspection-indicator active">{ (*inspection).clone() }</div>
                    }
                </div>
            </section>

            <section class="stats-section">
                <StatsPanel stats={stats} />
            </section>

            <section class="times-section">
                <div class="times-header">
                    <h2>{ "Times" }</h2>
                    <button class="btn-secondary small" onclick={on_clear_session}>
                        { "Clear session" }
                    </button>
                </div>
                { render_times_list(&solves, &on_time_action) }
            </section>

            <SettingsModal
                open={*settings_open}
                settings={(*settings).clone()}
                on_change={on_settings_change}
                on_close={close_settings}
            />
        </div>
    }
}

/// Entry point: installs the panic hook and mounts the Yew renderer.
fn main() {
    console_error_panic_hook::set_once();
    log::info!("cube timer starting");
    yew::Renderer::<App>::new().render();
}
