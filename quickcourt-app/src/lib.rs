pub mod command;
pub mod navigator;
pub mod state;
pub mod wizard;

pub use command::{Command, CommandError};
pub use navigator::ChannelNavigator;
pub use state::AppState;
pub use wizard::Exit;
