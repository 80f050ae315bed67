pub mod cards;
pub mod review;
