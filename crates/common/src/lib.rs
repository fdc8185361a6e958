pub mod constants;
pub mod env;
pub mod errors;
pub mod networks;
pub mod protocol;
