use crate::runtime::effect::Effect;
use crate::runtime::event::FilterEvent;
use crate::runtime::intent::Intent;
use crate::runtime::scheduler::{SchedulerCommand, TimerKey};
use crate::state::navigation::Direction;
use crate::state::session::FilterSession;
use std::time::Duration;

/// Delay before a blur hides the popup, long enough for a pointer click on
/// an item to land first.
pub const BLUR_HIDE_DELAY: Duration = Duration::from_millis(150);

pub struct Reducer;

impl Reducer {
    pub fn reduce(session: &mut FilterSession, intent: Intent) -> Vec<Effect> {
        if session.is_inert() {
            return Vec::new();
        }

        match intent {
            Intent::Input(value) => {
                session.set_input(value.clone());
                vec![
                    Effect::Emit(FilterEvent::InputChanged { value }),
                    schedule_filter(session),
                ]
            }
            Intent::RunFilter => session.run_filter(),
            Intent::Navigate(direction) => navigate(session, direction),
            Intent::Confirm => session.confirm(),
            Intent::Cancel => session.hide_popup(),
            Intent::Click(offset) => session.click(offset),
            Intent::Blur => vec![Effect::Schedule(SchedulerCommand::EmitAfter {
                key: TimerKey::BlurHide,
                delay: BLUR_HIDE_DELAY,
                intent: Intent::BlurElapsed,
            })],
            Intent::BlurElapsed => {
                if session.is_shown() {
                    session.hide_popup()
                } else {
                    Vec::new()
                }
            }
            Intent::Layout(layout) => session.set_layout(layout),
            Intent::Resize(viewport) => session.set_viewport(viewport),
        }
    }
}

fn navigate(session: &mut FilterSession, direction: Direction) -> Vec<Effect> {
    if session.is_shown() {
        return session.navigate(direction);
    }

    if session.options().show_all && session.input_is_blank() {
        let mut effects = session.show_all();
        effects.extend(session.navigate(direction));
        return effects;
    }

    vec![schedule_filter(session)]
}

fn schedule_filter(session: &FilterSession) -> Effect {
    Effect::Schedule(SchedulerCommand::Coalesce {
        key: TimerKey::Filter,
        delay: session.options().wait_time,
        intent: Intent::RunFilter,
    })
}
