use gfx_registers::GbAddrConfigReg;
use gfx_registers::components::gb_addr_config_reg::{num_pipes, pipe_interleave_size};
use gfx_registers::reg::Register;

/// Field placement checked against a known-good readback value.
#[test]
fn test_decode_readback() {
    // 16 pipes, 256B interleave, 8 compressed frags, 4 packers, 4 SEs, 4 RB/SE.
    let reg = GbAddrConfigReg::from_bits(0x0810_02C4);
    assert_eq!(reg.num_pipes(), Ok(num_pipes::NumPipesE::Pipes16));
    assert_eq!(
        reg.pipe_interleave_size(),
        Ok(pipe_interleave_size::PipeInterleaveSizeE::Bytes256)
    );
    assert_eq!(reg.max_compressed_frags(), 3);
    assert_eq!(reg.num_pkrs(), 2);
    assert_eq!(reg.num_shader_engines(), 2);
    assert_eq!(reg.num_rb_per_se(), 2);
}

#[test]
fn test_setters_compose() {
    let mut reg = GbAddrConfigReg::default();
    reg.set_num_pipes(num_pipes::NumPipesE::Pipes4);
    reg.set_pipe_interleave_size(pipe_interleave_size::PipeInterleaveSizeE::Bytes512);
    reg.set_num_pkrs(1);
    assert_eq!(reg.to_raw(), 0x2 | (0x1 << 3) | (0x1 << 8));
    assert_eq!(GbAddrConfigReg::from_raw(reg.to_raw()), reg);
}

#[test]
fn test_unknown_pipe_encoding() {
    let reg = GbAddrConfigReg::from_bits(0x7);
    let err = reg.num_pipes().unwrap_err();
    assert_eq!(err.bits(), 7);
}
