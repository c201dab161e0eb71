pub mod composer;
pub mod dict;
pub mod learning;
pub mod settings;
pub mod suggest;
pub mod unicode;
