//! Small line-producing widgets shared by the console pages.

pub mod header;
pub mod status;
