//! Custom hooks for document-level input and the timer tick loop.

use gloo_timers::callback::Interval;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

/// Attach `keydown`/`keyup` listeners to the document for the lifetime
/// of the calling component.
///
/// The listeners themselves are attached once; the callback slots are
/// refreshed on every render so the handlers always see current state.
#[hook]
pub fn use_document_keyboard(
    on_key_down: Callback<KeyboardEvent>,
    on_key_up: Callback<KeyboardEvent>,
) {
    let down_slot = use_mut_ref(Callback::noop);
    let up_slot = use_mut_ref(Callback::noop);
    *down_slot.borrow_mut() = on_key_down;
    *up_slot.borrow_mut() = on_key_up;

    use_effect_with((), move |_| {
        let document = gloo_utils::document();
        let down = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
            down_slot.borrow().emit(e);
        });
        let up = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
            up_slot.borrow().emit(e);
        });

        document
            .add_event_listener_with_callback("keydown", down.as_ref().unchecked_ref())
            .expect("document accepts keydown listener");
        document
            .add_event_listener_with_callback("keyup", up.as_ref().unchecked_ref())
            .expect("document accepts keyup listener");

        move || {
            let _ = document
                .remove_event_listener_with_callback("keydown", down.as_ref().unchecked_ref());
            let _ = document
                .remove_event_listener_with_callback("keyup", up.as_ref().unchecked_ref());
        }
    });
}

/// Run `on_tick` every `period_ms` while `active` is true. The interval
/// is torn down as soon as `active` flips off.
#[hook]
pub fn use_tick(active: bool, period_ms: u32, on_tick: Callback<()>) {
    let slot = use_mut_ref(Callback::noop);
    *slot.borrow_mut() = on_tick;

    use_effect_with(active, move |&active| {
        let interval = active.then(|| Interval::new(period_ms, move || slot.borrow().emit(())));
        move || drop(interval)
    });
}
