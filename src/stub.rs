use crate::error::{DetourError, DetourErrorKind};

pub const REL32_STUB_SIZE: usize = 5;
pub const ABS64_STUB_SIZE: usize = 12;

/// Length of the stub `apply` writes on this host.
#[cfg(target_pointer_width = "64")]
pub const STUB_SIZE: usize = ABS64_STUB_SIZE;
#[cfg(target_pointer_width = "32")]
pub const STUB_SIZE: usize = REL32_STUB_SIZE;

/// `mov rax, imm64` followed by `jmp rax`, with `destination` embedded as a
/// little-endian 64-bit literal at offset 2. Clobbers `rax`.
pub fn jmp_abs64(destination: u64) -> [u8; ABS64_STUB_SIZE] {
    let mut stub = [0u8; ABS64_STUB_SIZE];
    stub[0] = 0x48;
    stub[1] = 0xb8;
    stub[2..10].copy_from_slice(&destination.to_le_bytes());
    stub[10] = 0xff;
    stub[11] = 0xe0;
    stub
}

/// `jmp rel32`. The displacement accounts for the 5-byte instruction length
/// so execution lands exactly at `destination`; pairs whose displacement
/// does not fit a signed 32-bit offset are rejected.
pub fn jmp_rel32(source: u64, destination: u64) -> Result<[u8; REL32_STUB_SIZE], DetourError> {
    let displacement = destination
        .wrapping_sub(source)
        .wrapping_sub(REL32_STUB_SIZE as u64) as i64;
    let Ok(displacement) = i32::try_from(displacement) else {
        return Err(DetourError::new(DetourErrorKind::DisplacementOutOfRange(
            displacement,
        )));
    };

    let mut stub = [0u8; REL32_STUB_SIZE];
    stub[0] = 0xe9;
    stub[1..].copy_from_slice(&displacement.to_le_bytes());
    Ok(stub)
}

#[cfg(target_pointer_width = "64")]
pub(crate) fn host_stub(
    _source: crate::mem::NativeAddress,
    destination: crate::mem::NativeAddress,
) -> Result<[u8; STUB_SIZE], DetourError> {
    Ok(jmp_abs64(destination as u64))
}

#[cfg(target_pointer_width = "32")]
pub(crate) fn host_stub(
    source: crate::mem::NativeAddress,
    destination: crate::mem::NativeAddress,
) -> Result<[u8; STUB_SIZE], DetourError> {
    jmp_rel32(source as u64, destination as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs64_layout() {
        let stub = jmp_abs64(0x2000);
        assert_eq!(stub.len(), 12);
        assert_eq!(stub[0], 0x48);
        assert_eq!(stub[1], 0xb8);
        assert_eq!(&stub[2..10], &0x2000u64.to_le_bytes());
        assert_eq!(stub[10], 0xff);
        assert_eq!(stub[11], 0xe0);
    }

    #[test]
    fn abs64_embeds_full_width_addresses() {
        let destination = 0x7fff_e5a1_02b4_c3d8u64;
        let stub = jmp_abs64(destination);
        assert_eq!(&stub[2..10], &destination.to_le_bytes());
    }

    #[test]
    fn rel32_layout() {
        let stub = jmp_rel32(0x1000, 0x2000).unwrap();
        assert_eq!(stub.len(), 5);
        assert_eq!(stub[0], 0xe9);
        assert_eq!(&stub[1..], &(0x2000i32 - 0x1000 - 5).to_le_bytes());
    }

    #[test]
    fn rel32_backward_jump() {
        let stub = jmp_rel32(0x2000, 0x1000).unwrap();
        assert_eq!(&stub[1..], &(-0x1005i32).to_le_bytes());
    }

    #[test]
    fn rel32_round_trip() {
        // Simulated execution: the next instruction pointer plus the encoded
        // displacement must land exactly on the destination.
        let pairs = [
            (0x1000u64, 0x2000u64),
            (0x2000, 0x1000),
            (0x0040_0000, 0x7fff_0000),
            (0x7fff_0000, 0x0040_0000),
            (0x1000, 0x1005),
            (0x1000, 0x1001),
        ];
        for (source, destination) in pairs {
            let stub = jmp_rel32(source, destination).unwrap();
            let displacement = i32::from_le_bytes(stub[1..].try_into().unwrap());
            let landed = (source as i64 + 5 + displacement as i64) as u64;
            assert_eq!(landed, destination, "{source:#x} -> {destination:#x}");
        }
    }

    #[test]
    fn rel32_rejects_out_of_range_displacement() {
        let err = jmp_rel32(0x1000, 0x1_0000_2000).unwrap_err();
        assert!(matches!(
            err.kind(),
            DetourErrorKind::DisplacementOutOfRange(_)
        ));

        // Exactly one byte past the positive range.
        let source = 0x1000u64;
        let destination = source + 5 + i32::MAX as u64 + 1;
        assert!(jmp_rel32(source, destination).is_err());
        assert!(jmp_rel32(source, destination - 1).is_ok());
    }
}
