/// TOML configuration loading and validation.
pub mod toml_config;
