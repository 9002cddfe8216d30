//! Element library: bits per element and pixel expansion for the surface
//! formats the layout paths care about.

/// How pixels map onto addressable elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemMode {
    Uncompressed,
    /// One element per `expand_x` x `expand_y` pixel block.
    BlockCompressed,
    /// One element per horizontal pixel pair (4:2:2 packed).
    MacroPixelPacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementInfo {
    pub bpp: u32,
    pub expand_x: u32,
    pub expand_y: u32,
    pub mode: ElemMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceFormat {
    /// No format; the caller supplies `bpp` directly.
    #[default]
    Invalid,
    R8,
    R16,
    R8G8,
    R32,
    R16G16,
    R8G8B8A8,
    R10G10B10A2,
    R32G32,
    R16G16B16A16,
    R32G32B32,
    R32G32B32A32,
    D16,
    D32,
    X8D24,
    D32S8,
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Bc6,
    Bc7,
    /// 4:2:2 packed, green first.
    GbGr,
    /// 4:2:2 packed, blue first.
    BgRg,
}

impl SurfaceFormat {
    pub fn element_info(self) -> ElementInfo {
        use SurfaceFormat::*;

        let plain = |bpp| ElementInfo {
            bpp,
            expand_x: 1,
            expand_y: 1,
            mode: ElemMode::Uncompressed,
        };
        let bc = |bpp| ElementInfo {
            bpp,
            expand_x: 4,
            expand_y: 4,
            mode: ElemMode::BlockCompressed,
        };
        match self {
            Invalid => plain(0),
            R8 => plain(8),
            R16 | R8G8 | D16 => plain(16),
            R32 | R16G16 | R8G8B8A8 | R10G10B10A2 | D32 | X8D24 => plain(32),
            R32G32 | R16G16B16A16 | D32S8 => plain(64),
            R32G32B32 => plain(96),
            R32G32B32A32 => plain(128),
            Bc1 | Bc4 => bc(64),
            Bc2 | Bc3 | Bc5 | Bc6 | Bc7 => bc(128),
            GbGr | BgRg => ElementInfo {
                bpp: 32,
                expand_x: 2,
                expand_y: 1,
                mode: ElemMode::MacroPixelPacked,
            },
        }
    }

    pub fn bits_per_pixel(self) -> u32 {
        self.element_info().bpp
    }

    pub fn is_block_compressed(self) -> bool {
        self.element_info().mode == ElemMode::BlockCompressed
    }

    pub fn is_macro_pixel_packed(self) -> bool {
        self.element_info().mode == ElemMode::MacroPixelPacked
    }

    /// Depth/stencil formats route to Z-order modes in the selector.
    pub fn is_depth(self) -> bool {
        matches!(self, Self::D16 | Self::D32 | Self::X8D24 | Self::D32S8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_compressed_expansion() {
        let info = SurfaceFormat::Bc1.element_info();
        assert_eq!((info.bpp, info.expand_x, info.expand_y), (64, 4, 4));
        assert!(SurfaceFormat::Bc7.is_block_compressed());
        assert!(!SurfaceFormat::R32G32B32.is_block_compressed());
    }

    #[test]
    fn test_packed_and_plain() {
        assert!(SurfaceFormat::GbGr.is_macro_pixel_packed());
        assert_eq!(SurfaceFormat::GbGr.element_info().expand_x, 2);
        assert_eq!(SurfaceFormat::R32G32B32.bits_per_pixel(), 96);
        assert_eq!(SurfaceFormat::Invalid.bits_per_pixel(), 0);
    }
}
