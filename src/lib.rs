pub mod events;
pub mod game;

pub use crate::events::{Command, CommandBus, CommandHandler, LoggingListener, Reply};
pub use crate::game::Game;
