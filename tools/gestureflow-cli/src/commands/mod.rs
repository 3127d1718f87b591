pub mod bridge;
pub mod check;
pub mod classify;
pub mod track;
