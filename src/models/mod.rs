pub mod user;
pub mod event;
pub mod location;
pub mod learn_event;

pub use user::User;
pub use event::Event;
pub use location::Location;
pub use learn_event::LearnEvent;
