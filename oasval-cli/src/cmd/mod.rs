pub mod detect;
pub mod schemas;
pub mod validate;
