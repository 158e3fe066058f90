//! Shared application state reachable from pane handlers.

use crate::config::Config;
use core_layout::Laymgr;
use core_terminal::TermSurface;
use std::cell::Cell;

pub struct App {
    pub lm: Laymgr<TermSurface>,
    pub config: Config,
    counter: Cell<usize>,
}

impl App {
    pub fn new(lm: Laymgr<TermSurface>, config: Config) -> Self {
        Self {
            lm,
            config,
            counter: Cell::new(0),
        }
    }

    pub fn next_pane_number(&self) -> usize {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        n
    }
}
