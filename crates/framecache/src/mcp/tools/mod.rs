//! MCP tool implementations.

pub mod clear_design_cache;
pub mod get_design_data;

#[cfg(test)]
pub mod test_support;
