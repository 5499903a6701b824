mod chat;
mod request;

pub use chat::*;
pub use request::*;
