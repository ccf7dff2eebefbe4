//! Gym member handlers.

mod commands;
mod queries;

pub use commands::{
    AddPersonCommand, AddPersonHandler, DeletePersonHandler, UpdatePersonCommand,
    UpdatePersonHandler,
};
pub use queries::{PeopleQueries, NAME_SEARCH_LIMIT};
