//! Column positions of the two spreadsheet exports.

pub const UNIT: usize = 0;
pub const ORGANIZATION: usize = 1;
pub const POSITION: usize = 2;

/// Rows before the header row: a title line and a blank line.
pub const PREAMBLE_ROWS: usize = 2;

/// Callings in progress: who is being released and who is being called.
pub mod open {
    pub const CURRENTLY_CALLED: usize = 3;
    pub const RELEASED_BY: usize = 4;
    pub const DATE_CALLED: usize = 5;
    pub const NAME: usize = 6;
    pub const HOME_UNIT: usize = 7;
    pub const PRESIDENCY_APPROVED: usize = 8;
    pub const BISHOP_CONSULTED_BY: usize = 9;
    pub const HC_APPROVED: usize = 10;
    pub const CALLED_BY: usize = 11;
    pub const SUSTAINED: usize = 13;
    pub const SET_APART: usize = 14;
    pub const LCR_UPDATED: usize = 15;
}

/// Finished callings, one holder per row.
pub mod completed {
    pub const HOLDER: usize = 3;
    pub const RELEASED_BY: usize = 4;
    pub const DATE_RELEASED: usize = 5;
    pub const PROPOSED_REPLACEMENT: usize = 6;
    pub const HOME_UNIT: usize = 7;
    pub const PRESIDENCY_APPROVED: usize = 8;
    pub const BISHOP_CONSULTED_BY: usize = 9;
    pub const HC_APPROVED: usize = 11;
    pub const CALLED_BY: usize = 12;
    pub const DATE_CALLED: usize = 13;
    pub const SUSTAINED: usize = 14;
    pub const SET_APART: usize = 15;
    pub const LCR_UPDATED: usize = 16;
}
