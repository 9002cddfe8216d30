//! Register component definitions

pub mod gb_addr_config_reg;
pub mod num_pipes_e;
pub mod pipe_interleave_size_e;
