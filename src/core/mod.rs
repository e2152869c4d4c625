// src/core/mod.rs

pub mod batch_executor;
pub mod binder;
pub mod config_cache;
pub mod credentials;
pub mod directive_parser;
pub mod failure_sink;
pub mod id_allocator;
pub mod option_defaults;
pub mod option_resolver;
pub mod paths;

#[cfg(test)]
pub(crate) mod test_support;
