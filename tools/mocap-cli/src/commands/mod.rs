pub mod detect;
pub mod info;
