//! Minimal OSC 1.0 message encoder for float arguments.
//!
//! Layout: address string, type tag string (`,` followed by one `f` per
//! argument), then the arguments as big-endian IEEE 754 floats. Strings are
//! NUL terminated and padded with NULs to a multiple of four bytes.

use heapless::Vec;

pub mod address {
    /// Rotation as a quaternion, four floats `[i, j, k, real]`.
    pub const ROTATION: &str = "/rot";
    pub const ACCEL: &str = "/accel";
    pub const GYRO: &str = "/gyro";
    pub const MAG: &str = "/mag";
    pub const INVALID: &str = "/invalid";
}

pub const MAX_MESSAGE_LEN: usize = 256;
pub const MAX_ARGS: usize = 8;

pub type OscBuffer = Vec<u8, MAX_MESSAGE_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OscError {
    /// Addresses start with `/` and contain no NUL.
    InvalidAddress,
    TooManyArguments,
    BufferFull,
}

impl core::fmt::Display for OscError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OscError::InvalidAddress => write!(f, "Invalid OSC address"),
            OscError::TooManyArguments => {
                write!(f, "More than {} OSC arguments", MAX_ARGS)
            }
            OscError::BufferFull => write!(f, "OSC message buffer full"),
        }
    }
}

pub fn encode(address: &str, args: &[f32]) -> Result<OscBuffer, OscError> {
    if !address.starts_with('/') || address.contains('\0') {
        return Err(OscError::InvalidAddress);
    }
    if args.len() > MAX_ARGS {
        return Err(OscError::TooManyArguments);
    }

    let mut buf = OscBuffer::new();
    push_padded(&mut buf, address.as_bytes())?;

    let mut tags: Vec<u8, { MAX_ARGS + 1 }> = Vec::new();
    tags.push(b',').map_err(|_| OscError::TooManyArguments)?;
    for _ in args {
        tags.push(b'f').map_err(|_| OscError::TooManyArguments)?;
    }
    push_padded(&mut buf, &tags)?;

    for value in args {
        buf.extend_from_slice(&value.to_be_bytes())
            .map_err(|_| OscError::BufferFull)?;
    }

    Ok(buf)
}

fn push_padded(buf: &mut OscBuffer, bytes: &[u8]) -> Result<(), OscError> {
    buf.extend_from_slice(bytes).map_err(|_| OscError::BufferFull)?;
    // At least one terminating NUL.
    let padding = 4 - bytes.len() % 4;
    for _ in 0..padding {
        buf.push(0).map_err(|_| OscError::BufferFull)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_message_layout() {
        let buf = encode(address::ROTATION, &[0.0, 0.0, 0.0, 1.0]).unwrap();

        assert_eq!(&buf[0..8], b"/rot\0\0\0\0");
        assert_eq!(&buf[8..16], b",ffff\0\0\0");
        assert_eq!(&buf[16..28], &[0u8; 12]);
        assert_eq!(&buf[28..32], &1.0f32.to_be_bytes());
        assert_eq!(buf.len(), 32);
    }

    #[test]
    fn padding_always_terminates() {
        let buf = encode("/abc", &[]).unwrap();
        assert_eq!(&buf[..], b"/abc\0\0\0\0,\0\0\0");

        let buf = encode("/ab", &[]).unwrap();
        assert_eq!(&buf[0..4], b"/ab\0");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(encode("rot", &[]), Err(OscError::InvalidAddress));
        assert_eq!(encode("/r", &[0.0; 9]), Err(OscError::TooManyArguments));

        let mut long = heapless::String::<300>::new();
        long.push('/').unwrap();
        for _ in 0..260 {
            long.push('a').unwrap();
        }
        assert_eq!(encode(&long, &[]), Err(OscError::BufferFull));
    }
}
