pub mod conditions;
pub mod data;
pub mod sensors;
