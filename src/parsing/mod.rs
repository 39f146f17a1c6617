pub mod dom;
pub mod selector;
