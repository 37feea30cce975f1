use crate::{configuration::Configuration, service::ServiceSet};

/// What a command needs: resolved settings and the wired services.
pub struct Context {
    pub config: Configuration,
    pub services: ServiceSet,
}

impl Context {
    pub fn new(config: Configuration, services: ServiceSet) -> Self {
        Self { config, services }
    }
}
