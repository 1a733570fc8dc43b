//! Module providing the growth model of yeast central carbon metabolism.

pub mod metabolite;
pub mod model;
pub mod parameters;
pub mod reaction;
pub mod report;
