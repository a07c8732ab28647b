pub mod core {
    pub mod category;
    pub mod config;
    pub mod engine;
    pub mod environment;
    pub mod error;
    pub mod hardware;
    pub mod listing;
    pub mod progress;
    pub mod registry;
    pub mod results;
    pub mod selector;
    pub mod severity;
    pub mod test;
}


pub mod tests {
    pub mod cpu;
    pub mod hostinfo;
    pub mod memory;
    pub mod network;
    pub mod storage;
    pub mod thermal;

    use crate::core::error::Result;
    use crate::core::registry::TestRegistry;

    /// Register every built-in test module.
    pub fn register_all(registry: &mut TestRegistry) -> Result<()> {
        registry.register(cpu::module())?;
        registry.register(memory::module())?;
        registry.register(storage::module())?;
        registry.register(thermal::module())?;
        registry.register(network::module())?;
        registry.register(hostinfo::module())?;
        Ok(())
    }
}


pub mod reporters;
