use crate::config::{ChipFamily, ChipSettings, GlobalAddressingParams};
use crate::equation::{EquationTable, SwizzleEquation};
use crate::error::AddrError;
use crate::pattern::pattern_config_index;
use crate::swizzle_mode::SwizzleMode;
use crate::types::ResourceType;
use gfx_registers::GbAddrConfigReg;

/// Everything needed to create a library instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibCreateInput {
    pub chip_family: ChipFamily,
    /// External revision id.
    pub chip_revision: u32,
    /// Raw `GB_ADDR_CONFIG` value.
    pub gb_addr_config: u32,
}

/// A configured addressing engine.
///
/// Construction decodes the hardware configuration and builds the equation
/// table; afterwards every query is a pure function of `&self`.
#[derive(Debug, Clone)]
pub struct AddrLib {
    pub(crate) settings: ChipSettings,
    pub(crate) params: GlobalAddressingParams,
    /// Row group of this pipe configuration in the hashed pattern tables.
    pub(crate) config_index: usize,
    pub(crate) equations: EquationTable,
}

impl AddrLib {
    pub fn new(input: &LibCreateInput) -> Result<Self, AddrError> {
        let settings = ChipSettings::for_chip(input.chip_family, input.chip_revision)?;
        let reg = GbAddrConfigReg::from_bits(input.gb_addr_config);
        let params = GlobalAddressingParams::decode(reg, &settings)?;
        let config_index = pattern_config_index(&settings, &params)?;

        let mut lib = Self {
            settings,
            params,
            config_index,
            equations: EquationTable::default(),
        };
        let equations = EquationTable::build(|rsrc, mode, elem_log2| {
            lib.swizzle_pattern_info(rsrc, mode, elem_log2, 1)
        });
        lib.equations = equations;

        log::debug!(
            "addrlib: {reg:?}, rb_plus={}, config row {}, {} equations",
            settings.support_rb_plus,
            config_index,
            lib.equations.len()
        );
        Ok(lib)
    }

    pub fn settings(&self) -> &ChipSettings {
        &self.settings
    }

    pub fn params(&self) -> &GlobalAddressingParams {
        &self.params
    }

    pub fn equation_count(&self) -> usize {
        self.equations.len()
    }

    pub fn equation(&self, index: usize) -> Option<&SwizzleEquation> {
        self.equations.get(index)
    }

    /// Equation of a single-fragment surface, if the mode has one.
    pub fn equation_index(&self, rsrc: ResourceType, mode: SwizzleMode, elem_log2: u32) -> Option<usize> {
        self.equations.index(rsrc, mode, elem_log2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::revision;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_lib_is_send_sync() {
        assert_send_sync::<AddrLib>();
    }

    #[test]
    fn test_new_builds_equations() {
        let lib = AddrLib::new(&LibCreateInput {
            chip_family: ChipFamily::Navi,
            chip_revision: revision::NAVI10,
            gb_addr_config: 0x1,
        })
        .unwrap();
        assert_eq!(lib.params().num_pipes(), 2);
        assert!(lib.equation_count() > 0);
        let idx = lib
            .equation_index(ResourceType::Tex2d, SwizzleMode::Sw64kbSX, 2)
            .unwrap();
        assert_eq!(lib.equation(idx).unwrap().num_bits, 16);
        assert!(lib.equation_index(ResourceType::Tex2d, SwizzleMode::Linear, 2).is_none());
    }

    #[test]
    fn test_rb_plus_rejects_too_many_pipes() {
        let err = AddrLib::new(&LibCreateInput {
            chip_family: ChipFamily::Navi,
            chip_revision: revision::NAVI14,
            gb_addr_config: 0x5,
        })
        .unwrap_err();
        assert!(matches!(err, AddrError::NotSupported(_)));
    }
}
