//! Surface layout and address computation for gfx10-class GPUs.
//!
//! An [`AddrLib`] is created once from the chip identity and the raw
//! `GB_ADDR_CONFIG` value. It then answers pure queries:
//!
//! * [`AddrLib::compute_surface_info`]: pitch, sizes, alignment and mips.
//! * [`AddrLib::compute_surface_addr_from_coord`]: byte address of a texel.
//! * [`AddrLib::compute_htile_info`], [`AddrLib::compute_cmask_info`],
//!   [`AddrLib::compute_dcc_info`] and their `_addr_from_coord` forms.
//! * [`AddrLib::get_preferred_surface_setting`]: swizzle mode selection.
//! * [`AddrLib::compute_pipe_bank_xor`]: per-surface channel spreading.
//!
//! The swizzle pattern tables are generated at build time.

mod bits;

/// Library instance and construction.
pub mod addr_lib;

/// Coordinate to address translation.
pub mod address;

/// Micro and meta block sizing.
pub mod block;

/// Chip capability settings and register decode.
pub mod config;

/// Pattern to equation conversion.
pub mod equation;

pub mod error;

/// Pixel formats and element expansion.
pub mod format;

/// Surface layout computation.
pub mod layout;

/// HTile, CMask and DCC surfaces.
pub mod meta;

/// Swizzle pattern tables and evaluation.
pub mod pattern;

/// Preferred swizzle mode selection.
pub mod selector;

pub mod swizzle_mode;

pub mod types;

/// Pipe/bank XOR values.
pub mod xor;

pub use addr_lib::{AddrLib, LibCreateInput};
pub use config::{ChipFamily, ChipSettings, GlobalAddressingParams, revision};
pub use equation::{EquationError, SwizzleEquation};
pub use error::AddrError;
pub use format::SurfaceFormat;
pub use meta::{MetaCoord, MetaDataKind, MetaMipInfo, MetaSurfaceDescriptor, MetaSurfaceLayout};
pub use selector::{
    BlockSet, BlockType, PreferredSetting, PreferredSettingInput, SwizzleType, SwizzleTypeSet,
};
pub use swizzle_mode::{SwModeSet, SwizzleMode};
pub use types::{
    Dim2d, Dim3d, MipInfo, ResourceType, StereoInfo, SurfaceAddress, SurfaceCoord,
    SurfaceDescriptor, SurfaceFlags, SurfaceLayout,
};
