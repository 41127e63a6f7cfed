//! Request and response bodies

pub mod quotes;
pub mod claims;

use serde::{Deserialize, Serialize};

use core_kernel::Notice;

/// Entity returned by a command, with the message to show the user
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub data: T,
    pub notice: Notice,
}

impl<T> CommandResponse<T> {
    pub fn new(data: T, notice: Notice) -> Self {
        Self { data, notice }
    }
}
