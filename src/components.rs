//! Pure Yew view components for the Cube Timer UI.
//!
//! This module contains stateless components that render based on props,
//! making them easy to test and reuse.

use crate::config::{MAX_HOLD_TIME_MS, MIN_HOLD_TIME_MS};
use crate::utils::validate_hold_time;
use cube_timer::{format_time, EffectiveTime, Penalty, SessionStats, Settings, Solve, Theme};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// Row action on a recorded solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAction {
    TogglePlus2,
    ToggleDnf,
    Delete,
}

fn stat_text(value: &Option<EffectiveTime>) -> String {
    match value {
        Some(t) => t.to_string(),
        None => "-".to_string(),
    }
}

fn stat_cell(label: &str, value: String) -> Html {
    html! {
        <div class="stat">
            <span class="stat-label">{ label }</span>
            <span class="stat-value">{ value }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatsPanelProps {
    pub stats: SessionStats,
}

/// The best / ao5 / ao12 / mean / count strip above the times list.
#[function_component(StatsPanel)]
pub fn stats_panel(props: &StatsPanelProps) -> Html {
    let stats = &props.stats;
    html! {
        <div class="stats-grid">
            { stat_cell("Best", stat_text(&stats.best)) }
            { stat_cell("ao5", stat_text(&stats.ao5)) }
            { stat_cell("ao12", stat_text(&stats.ao12)) }
            { stat_cell("Mean", stat_text(&stats.mean)) }
            { stat_cell("Solves", stats.count.to_string()) }
        </div>
    }
}

/// Renders the newest-first list of recorded solves with their penalty
/// toggles and delete buttons.
pub fn render_times_list(solves: &[Solve], on_action: &Callback<(u64, TimeAction)>) -> Html {
    if solves.is_empty() {
        return html! { <p class="no-times">{ "No times yet" }</p> };
    }

    html! {
        <div class="times-list">
            { solves.iter().enumerate().map(|(index, solve)| {
                render_time_item(solve, solves.len() - index, on_action)
            }).collect::<Html>() }
        </div>
    }
}

fn render_time_item(solve: &Solve, number: usize, on_action: &Callback<(u64, TimeAction)>) -> Html {
    // The list shows the raw time; a +2 shows up as a marker, a DNF
    // replaces the time entirely.
    let value = match solve.penalty {
        Some(Penalty::Dnf) => "DNF".to_string(),
        _ => format_time(solve.time),
    };
    let value_class = classes!(
        "time-value",
        match solve.penalty {
            Some(Penalty::Dnf) => Some("dnf"),
            Some(Penalty::Plus2) => Some("plus2"),
            None => None,
        }
    );

    let action = |kind: TimeAction| {
        let on_action = on_action.clone();
        let id = solve.id;
        Callback::from(move |_: MouseEvent| on_action.emit((id, kind)))
    };

    html! {
        <div class="time-item" key={solve.id.to_string()}>
            <span class="time-index">{ format!("{number}.") }</span>
            <span class={value_class}>
                { value }
                if solve.penalty == Some(Penalty::Plus2) {
                    <span class="time-penalty">{ "+2" }</span>
                }
            </span>
            <div class="time-actions">
                <button
                    class={classes!("time-action-btn",
                        (solve.penalty == Some(Penalty::Plus2)).then_some("active"))}
                    onclick={action(TimeAction::TogglePlus2)}
                    title="+2 penalty"
                >{ "+2" }</button>
                <button
                    class={classes!("time-action-btn",
                        (solve.penalty == Some(Penalty::Dnf)).then_some("active"))}
                    onclick={action(TimeAction::ToggleDnf)}
                    title="DNF"
                >{ "DNF" }</button>
                <button
                    class="time-action-btn delete"
                    onclick={action(TimeAction::Delete)}
                    title="Delete"
                >{ "✕" }</button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SettingsModalProps {
    pub open: bool,
    pub settings: Settings,
    pub on_change: Callback<Settings>,
    pub on_close: Callback<()>,
}

/// Settings dialog. Checkboxes and the theme select apply immediately;
/// the hold-time input is validated on commit and shows its error
/// inline.
#[function_component(SettingsModal)]
pub fn settings_modal(props: &SettingsModalProps) -> Html {
    let hold_text = use_state(|| props.settings.hold_time.to_string());
    let hold_error = use_state(|| None::<String>);

    // Sync hold_time -> text when the numeric value changes elsewhere.
    {
        let hold_text = hold_text.clone();
        let hold_error = hold_error.clone();
        use_effect_with(props.settings.hold_time, move |&ms| {
            let as_string = ms.to_string();
            if *hold_text != as_string {
                hold_text.set(as_string);
                hold_error.set(None);
            }
            || ()
        });
    }

    if !props.open {
        return html! {};
    }

    let settings = props.settings.clone();

    let on_inspection_change = {
        let on_change = props.on_change.clone();
        let settings = settings.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_change.emit(Settings { inspection_enabled: input.checked(), ..settings.clone() });
        })
    };

    let on_hide_ui_change = {
        let on_change = props.on_change.clone();
        let settings = settings.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_change.emit(Settings { hide_ui_when_timing: input.checked(), ..settings.clone() });
        })
    };

    let on_hold_text_input = {
        let hold_text = hold_text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            hold_text.set(input.value());
        })
    };

    let on_hold_commit = {
        let hold_text = hold_text.clone();
        let hold_error = hold_error.clone();
        let on_change = props.on_change.clone();
        let settings = settings.clone();
        Callback::from(move |_: Event| {
            match validate_hold_time(&hold_text) {
                Ok(ms) => {
                    hold_error.set(None);
                    hold_text.set(ms.to_string());
                    on_change.emit(Settings { hold_time: ms, ..settings.clone() });
                }
                Err(err) => {
                    hold_error.set(Some(err));
                }
            }
        })
    };

    let on_theme_change = {
        let on_change = props.on_change.clone();
        let settings = settings.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_change.emit(Settings { theme: Theme::from_code(&select.value()), ..settings.clone() });
        })
    };

    let close = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    html! {
        <div class="settings-modal active">
            <div class="modal-backdrop" onclick={close.clone()}></div>
            <div class="modal-panel">
                <div class="modal-header">
                    <h2>{ "Settings" }</h2>
                    <button class="modal-close" onclick={close}>{ "✕" }</button>
                </div>

                <div class="form-group checkbox-group">
                    <label>
                        <input type="checkbox"
                            checked={settings.inspection_enabled}
                            onchange={on_inspection_change}
                        />
                        { "Enable inspection (15s)" }
                    </label>
                </div>

                <div class="form-group checkbox-group">
                    <label>
                        <input type="checkbox"
                            checked={settings.hide_ui_when_timing}
                            onchange={on_hide_ui_change}
                        />
                        { "Hide interface while timing" }
                    </label>
                </div>

                <div class="form-group">
                    <label for="hold_time_input">{ "Hold time (ms):" }</label>
                    <input
                        type="number"
                        id="hold_time_input"
                        min={MIN_HOLD_TIME_MS.to_string()}
                        max={MAX_HOLD_TIME_MS.to_string()}
                        step="50"
                        value={(*hold_text).clone()}
                        class={if (*hold_error).is_some() { "invalid" } else { "" }}
                        oninput={on_hold_text_input}
                        onchange={on_hold_commit}
                    />
                    if let Some(ref err) = *hold_error {
                        <div class="input-error">{ err }</div>
                    }
                </div>

                <div class="form-group">
                    <label for="theme_select">{ "Theme:" }</label>
                    <select id="theme_select" onchange={on_theme_change}>
                        <option value="dark" selected={settings.theme == Theme::Dark}>{ "Dark" }</option>
                        <option value="light" selected={settings.theme == Theme::Light}>{ "Light" }</option>
                    </select>
                </div>
            </div>
        </div>
    }
}
