use addrlib::{
    AddrLib, BlockSet, BlockType, ChipFamily, LibCreateInput, MetaCoord, MetaSurfaceDescriptor,
    MetaSurfaceLayout, PreferredSettingInput, ResourceType, SurfaceCoord, SurfaceDescriptor,
    SurfaceFlags, SurfaceFormat, SwizzleMode, SwizzleType, SwizzleTypeSet,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::process;

#[derive(Parser)]
#[command(name = "addrlib")]
#[command(about = "Surface layout and address queries for gfx10 GPUs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Chip family
    #[arg(long, value_enum, default_value_t = Family::Navi, global = true)]
    family: Family,

    /// External chip revision id
    #[arg(long, default_value = "0x01", value_parser = parse_u32, global = true)]
    revision: u32,

    /// Raw GB_ADDR_CONFIG value
    #[arg(long, default_value = "0x2", value_parser = parse_u32, global = true)]
    gb_addr_config: u32,

    /// Log library decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the layout of a surface
    Surface(SurfaceArgs),
    /// Translate a coordinate to a byte address
    Addr {
        #[command(flatten)]
        surface: SurfaceArgs,
        #[command(flatten)]
        coord: CoordArgs,
    },
    /// HTile layout of a depth surface, and optionally one entry's address
    Htile(MetaArgs),
    /// CMask layout of a surface, and optionally one entry's address
    Cmask(MetaArgs),
    /// DCC layout of a color surface, and optionally one key's address
    Dcc(MetaArgs),
    /// Choose a swizzle mode for a surface
    Prefer(PreferArgs),
    /// Pipe/bank XOR for a surface index, or for one slice
    Xor {
        #[arg(long, value_parser = parse_mode, default_value = "64KB_S_X")]
        mode: SwizzleMode,
        #[arg(long, default_value_t = 0)]
        surf_index: u32,
        /// Fold this slice into the surface's XOR
        #[arg(long)]
        slice: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    Navi,
    Unknown,
}

#[derive(Clone, Copy, ValueEnum)]
enum Rsrc {
    #[value(name = "1d")]
    Tex1d,
    #[value(name = "2d")]
    Tex2d,
    #[value(name = "3d")]
    Tex3d,
}

#[derive(Clone, Copy, ValueEnum)]
enum Block {
    Linear,
    Micro,
    Thin4kb,
    Thick4kb,
    Thin64kb,
    Thick64kb,
}

#[derive(Clone, Copy, ValueEnum)]
enum SwType {
    Z,
    S,
    D,
    R,
}

#[derive(Args)]
struct DimsArgs {
    #[arg(long, value_enum, default_value_t = Rsrc::Tex2d)]
    rsrc: Rsrc,
    /// Bits per element
    #[arg(long, default_value_t = 32)]
    bpp: u32,
    #[arg(long)]
    width: u32,
    #[arg(long, default_value_t = 1)]
    height: u32,
    #[arg(long, default_value_t = 1)]
    slices: u32,
    #[arg(long, default_value_t = 1)]
    mips: u32,
    #[arg(long, default_value_t = 1)]
    samples: u32,
    /// Fragments; 0 means one per sample
    #[arg(long, default_value_t = 0)]
    frags: u32,
    #[arg(long)]
    color: bool,
    #[arg(long)]
    depth: bool,
    #[arg(long)]
    stencil: bool,
    #[arg(long)]
    display: bool,
    #[arg(long)]
    prt: bool,
    #[arg(long)]
    stereo: bool,
}

impl DimsArgs {
    fn descriptor(&self, swizzle_mode: SwizzleMode) -> SurfaceDescriptor {
        SurfaceDescriptor {
            flags: self.flags(),
            resource_type: self.resource_type(),
            swizzle_mode,
            format: SurfaceFormat::Invalid,
            bpp: self.bpp,
            width: self.width,
            height: self.height,
            num_slices: self.slices,
            num_mip_levels: self.mips,
            num_samples: self.samples,
            num_frags: self.frags,
            pitch_in_element: 0,
            slice_align: 0,
        }
    }

    fn flags(&self) -> SurfaceFlags {
        SurfaceFlags {
            color: self.color,
            depth: self.depth,
            stencil: self.stencil,
            display: self.display,
            prt: self.prt,
            qb_stereo: self.stereo,
            ..SurfaceFlags::default()
        }
    }

    fn resource_type(&self) -> ResourceType {
        match self.rsrc {
            Rsrc::Tex1d => ResourceType::Tex1d,
            Rsrc::Tex2d => ResourceType::Tex2d,
            Rsrc::Tex3d => ResourceType::Tex3d,
        }
    }
}

#[derive(Args)]
struct SurfaceArgs {
    #[arg(long, value_parser = parse_mode, default_value = "64KB_S_X")]
    mode: SwizzleMode,
    #[command(flatten)]
    dims: DimsArgs,
}

impl SurfaceArgs {
    fn descriptor(&self) -> SurfaceDescriptor {
        self.dims.descriptor(self.mode)
    }
}

#[derive(Args)]
struct CoordArgs {
    #[arg(long, default_value_t = 0)]
    x: u32,
    #[arg(long, default_value_t = 0)]
    y: u32,
    #[arg(long, default_value_t = 0)]
    slice: u32,
    #[arg(long, default_value_t = 0)]
    sample: u32,
    #[arg(long, default_value_t = 0)]
    mip: u32,
    #[arg(long, default_value = "0", value_parser = parse_u32)]
    pipe_bank_xor: u32,
}

#[derive(Args)]
struct MetaArgs {
    #[command(flatten)]
    surface: SurfaceArgs,
    /// Metadata not aligned to pipes (DCC only)
    #[arg(long)]
    unaligned: bool,
    /// Pixel to locate; requires --y
    #[arg(long, requires = "y")]
    x: Option<u32>,
    #[arg(long, requires = "x")]
    y: Option<u32>,
    #[arg(long, default_value_t = 0)]
    slice: u32,
    #[arg(long, default_value = "0", value_parser = parse_u32)]
    pipe_xor: u32,
}

#[derive(Args)]
struct PreferArgs {
    #[command(flatten)]
    dims: DimsArgs,
    /// Block classes the surface must not use
    #[arg(long, value_enum, value_delimiter = ',')]
    forbid: Vec<Block>,
    /// Allowed swizzle types (default: all)
    #[arg(long = "type", value_enum, value_delimiter = ',')]
    types: Vec<SwType>,
    #[arg(long)]
    no_xor: bool,
    /// Largest acceptable base alignment
    #[arg(long, default_value_t = 0)]
    max_align: u32,
    #[arg(long, default_value_t = 0)]
    min_size_align: u32,
    /// Acceptable size ratio of a bigger block over the smallest
    #[arg(long, default_value_t = 0.0)]
    budget: f32,
    #[arg(long)]
    minimize_align: bool,
    #[arg(long)]
    opt4space: bool,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}': {e}"))
}

fn parse_mode(s: &str) -> Result<SwizzleMode, String> {
    let name = s.trim_start_matches("SW_").trim_start_matches("sw_");
    SwizzleMode::ALL
        .into_iter()
        .find(|mode| mode.to_string().eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("unknown swizzle mode '{s}'"))
}

fn print_meta(name: &str, layout: &MetaSurfaceLayout) {
    let blk = &layout.meta_block;
    println!(
        "{name}: meta block {}x{}x{} ({} bytes), pitch {}, height {}, depth {}",
        blk.w,
        blk.h,
        blk.d,
        blk.size(),
        layout.pitch,
        layout.height,
        layout.depth
    );
    println!(
        "  base align {}, slice {} bytes, total {} bytes, {} blocks/slice",
        layout.base_align, layout.slice_size, layout.total_size, layout.blocks_per_slice
    );
    for (level, mip) in layout.mip_info.iter().enumerate() {
        let tail = if mip.in_mip_tail { " (tail)" } else { "" };
        println!("  mip {level}: offset {}, size {}{tail}", mip.offset, mip.slice_size);
    }
}

fn run_meta(lib: &AddrLib, kind: &str, args: &MetaArgs) -> Result<()> {
    let desc = args.surface.descriptor();
    let layout = lib
        .compute_surface_info(&desc)
        .context("computing data surface layout")?;
    let mut meta = MetaSurfaceDescriptor::for_surface(&desc, &layout);
    meta.pipe_aligned = !args.unaligned;

    let info = match kind {
        "htile" => lib.compute_htile_info(&meta),
        "cmask" => lib.compute_cmask_info(&meta),
        _ => lib.compute_dcc_info(&meta),
    }
    .with_context(|| format!("computing {kind} layout"))?;
    print_meta(kind, &info);

    if let (Some(x), Some(y)) = (args.x, args.y) {
        let coord = MetaCoord {
            x,
            y,
            slice: args.slice,
            pipe_xor: args.pipe_xor,
        };
        let addr = match kind {
            "htile" => lib.compute_htile_addr_from_coord(&meta, &coord),
            "cmask" => lib.compute_cmask_addr_from_coord(&meta, &coord),
            _ => lib.compute_dcc_addr_from_coord(&meta, &coord),
        }
        .with_context(|| format!("addressing {kind} at ({x}, {y})"))?;
        println!("({x}, {y}, {}): {:#x} bit {}", args.slice, addr.addr, addr.bit_position);
    }
    Ok(())
}

fn run_prefer(lib: &AddrLib, args: &PreferArgs) -> Result<()> {
    let forbidden_blocks = BlockSet::of(
        &args
            .forbid
            .iter()
            .map(|b| match b {
                Block::Linear => BlockType::Linear,
                Block::Micro => BlockType::Micro,
                Block::Thin4kb => BlockType::Thin4kb,
                Block::Thick4kb => BlockType::Thick4kb,
                Block::Thin64kb => BlockType::Thin64kb,
                Block::Thick64kb => BlockType::Thick64kb,
            })
            .collect::<Vec<_>>(),
    );
    let preferred_types = SwizzleTypeSet::of(
        &args
            .types
            .iter()
            .map(|t| match t {
                SwType::Z => SwizzleType::Z,
                SwType::S => SwizzleType::S,
                SwType::D => SwizzleType::D,
                SwType::R => SwizzleType::R,
            })
            .collect::<Vec<_>>(),
    );
    let dims = &args.dims;
    let input = PreferredSettingInput {
        flags: SurfaceFlags {
            minimize_align: args.minimize_align,
            opt4space: args.opt4space,
            ..dims.flags()
        },
        resource_type: dims.resource_type(),
        bpp: dims.bpp,
        width: dims.width,
        height: dims.height,
        num_slices: dims.slices,
        num_mip_levels: dims.mips,
        num_samples: dims.samples,
        num_frags: dims.frags,
        forbidden_blocks,
        preferred_types,
        no_xor: args.no_xor,
        max_align: args.max_align,
        min_size_align: args.min_size_align,
        memory_budget: args.budget,
        ..PreferredSettingInput::default()
    };

    let setting = lib
        .get_preferred_surface_setting(&input)
        .context("selecting a swizzle mode")?;
    println!("preferred: {}", setting.swizzle_mode);
    let valid: Vec<String> = setting.valid_modes.iter().map(|m| m.to_string()).collect();
    println!("valid modes: {}", valid.join(" "));
    println!(
        "valid blocks: {:?}",
        setting.valid_blocks.iter().collect::<Vec<_>>()
    );
    println!("can xor: {}", setting.can_xor);
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let lib = AddrLib::new(&LibCreateInput {
        chip_family: match cli.family {
            Family::Navi => ChipFamily::Navi,
            Family::Unknown => ChipFamily::Unknown,
        },
        chip_revision: cli.revision,
        gb_addr_config: cli.gb_addr_config,
    })
    .with_context(|| format!("creating library for GB_ADDR_CONFIG {:#x}", cli.gb_addr_config))?;

    match &cli.command {
        Commands::Surface(args) => {
            let layout = lib
                .compute_surface_info(&args.descriptor())
                .context("computing surface layout")?;
            println!(
                "{}: pitch {}, height {}, slices {}, block {}x{}x{}",
                args.mode,
                layout.pitch,
                layout.height,
                layout.num_slices,
                layout.block_width,
                layout.block_height,
                layout.block_slices
            );
            println!(
                "  base align {}, slice {} bytes, total {} bytes",
                layout.base_align, layout.slice_size, layout.surf_size
            );
            if layout.mip_info.len() > 1 {
                println!(
                    "  first mip in tail {}, chain in tail {}",
                    layout.first_mip_id_in_tail, layout.mip_chain_in_tail
                );
            }
            for (level, mip) in layout.mip_info.iter().enumerate() {
                let tail = if mip.in_mip_tail {
                    format!(
                        " tail +{} at ({}, {}, {})",
                        mip.mip_tail_offset,
                        mip.mip_tail_coord_x,
                        mip.mip_tail_coord_y,
                        mip.mip_tail_coord_z
                    )
                } else {
                    String::new()
                };
                println!(
                    "  mip {level}: {}x{}x{}, offset {}, macro offset {}{tail}",
                    mip.pitch, mip.height, mip.depth, mip.offset, mip.macro_block_offset
                );
            }
            if let Some(stereo) = layout.stereo {
                println!(
                    "  stereo: eye height {}, right eye at {}, right xor {:#x}",
                    stereo.eye_height, stereo.right_offset, stereo.right_swizzle
                );
            }
            if let Some(index) = layout.equation_index {
                println!("  equation {index}");
            }
        }
        Commands::Addr { surface, coord } => {
            let c = SurfaceCoord {
                x: coord.x,
                y: coord.y,
                slice: coord.slice,
                sample: coord.sample,
                mip_id: coord.mip,
                pipe_bank_xor: coord.pipe_bank_xor,
            };
            let addr = lib
                .compute_surface_addr_from_coord(&surface.descriptor(), &c)
                .context("translating coordinate")?;
            println!("{:#x}", addr.addr);
        }
        Commands::Htile(args) => run_meta(&lib, "htile", args)?,
        Commands::Cmask(args) => run_meta(&lib, "cmask", args)?,
        Commands::Dcc(args) => run_meta(&lib, "dcc", args)?,
        Commands::Prefer(args) => run_prefer(&lib, args)?,
        Commands::Xor {
            mode,
            surf_index,
            slice,
        } => {
            let base = lib.compute_pipe_bank_xor(*surf_index, *mode)?;
            let value = match slice {
                Some(slice) => lib.compute_slice_pipe_bank_xor(*mode, base, *slice)?,
                None => base,
            };
            println!("{value:#x}");
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
