//! Box-drawing characters used by splitter windows.

pub const VLINE: char = '│';
pub const HLINE: char = '─';
