//! Container source port
//!
//! A source lists containers from the runtime by one particular route
//! (control socket, CLI, ...). The status service walks sources in order.

use crate::domain::result::Result;
use crate::domain::{ContainerRecord, ContainerStrategy};

pub trait ContainerSource: Send + Sync {
    /// Which strategy this source implements (reported in debug metadata)
    fn strategy(&self) -> ContainerStrategy;

    /// List containers; any failure lets the caller move on to the next source
    fn list_containers(&self) -> Result<Vec<ContainerRecord>>;
}
