//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::state::AppState;

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::FocusNext => {
            if state.buttons == 0 {
                return DispatchResult::unchanged();
            }
            state.focused = (state.focused + 1) % state.buttons;
            DispatchResult::changed()
        }

        Action::FocusPrev => {
            if state.buttons == 0 {
                return DispatchResult::unchanged();
            }
            state.focused = (state.focused + state.buttons - 1) % state.buttons;
            DispatchResult::changed()
        }

        Action::Activate => {
            if state.focused < state.buttons {
                DispatchResult::changed_with(Effect::Click {
                    index: state.focused,
                })
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}
