// Messaging - Commands into the event loop, beat changes out of it

pub mod beat_events;
pub mod channels;
pub mod command;
