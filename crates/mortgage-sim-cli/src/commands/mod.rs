pub mod budget;
pub mod simulate;
