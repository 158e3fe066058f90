//! Window handler trait.
//!
//! Handlers are stored behind generational `HandlerId`s in the `Ui`'s
//! arena, so a window can outlive its handler (dispatch through a freed
//! handler is a silent no-op) and handlers can be chained: `set_handler`
//! returns the previous id and the new handler forwards to it explicitly.
//!
//! A handler receives `&mut Ui` and may re-enter it freely; per-handler
//! state lives in whatever the closure captures (typically an
//! `Rc<RefCell<...>>`).

use crate::message::MessageData;
use crate::Ui;
use core_terminal::Surface;

pub trait Handler<S: Surface> {
    fn handle(&self, ui: &mut Ui<S>, id: u32, data: &mut MessageData) -> u64;
}

impl<S, F> Handler<S> for F
where
    S: Surface,
    F: Fn(&mut Ui<S>, u32, &mut MessageData) -> u64,
{
    fn handle(&self, ui: &mut Ui<S>, id: u32, data: &mut MessageData) -> u64 {
        self(ui, id, data)
    }
}
