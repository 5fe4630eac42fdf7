//! Hadoop `WritableUtils` variable-length integers.
//!
//! Values in `[-112, 127]` take one byte. Larger magnitudes are written as a
//! marker byte (sign and length) followed by 1-8 big-endian bytes; negative
//! values are stored one's-complemented.

use std::io::{self, Read, Write};

fn decode_size(first: i8) -> usize {
    if first >= -112 {
        1
    } else if first < -120 {
        (-119 - i32::from(first)) as usize
    } else {
        (-111 - i32::from(first)) as usize
    }
}

fn is_negative(first: i8) -> bool {
    first < -120 || (-112..0).contains(&first)
}

pub fn read_vlong<R: Read + ?Sized>(r: &mut R) -> io::Result<i64> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    let first = b[0] as i8;
    let len = decode_size(first);
    if len == 1 {
        return Ok(i64::from(first));
    }
    let mut value: i64 = 0;
    for _ in 0..len - 1 {
        r.read_exact(&mut b)?;
        value = (value << 8) | i64::from(b[0]);
    }
    Ok(if is_negative(first) { !value } else { value })
}

pub fn read_vint<R: Read + ?Sized>(r: &mut R) -> io::Result<i32> {
    let v = read_vlong(r)?;
    i32::try_from(v).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidData, format!("vint {v} overflows i32"))
    })
}

pub fn write_vlong<W: Write + ?Sized>(w: &mut W, value: i64) -> io::Result<()> {
    if (-112..=127).contains(&value) {
        return w.write_all(&[value as u8]);
    }
    let (mut marker, magnitude) = if value < 0 { (-120i32, !value) } else { (-112i32, value) };
    let mut tmp = magnitude;
    while tmp != 0 {
        tmp >>= 8;
        marker -= 1;
    }
    w.write_all(&[marker as i8 as u8])?;
    let len = if marker < -120 { -(marker + 120) } else { -(marker + 112) };
    for idx in (0..len).rev() {
        let shift = idx * 8;
        w.write_all(&[((magnitude >> shift) & 0xff) as u8])?;
    }
    Ok(())
}

pub fn write_vint<W: Write + ?Sized>(w: &mut W, value: i32) -> io::Result<()> {
    write_vlong(w, i64::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(v: i64) -> Vec<u8> {
        let mut out = Vec::new();
        write_vlong(&mut out, v).unwrap();
        out
    }

    #[test]
    fn small_values_take_one_byte() {
        assert_eq!(encoded(0), vec![0]);
        assert_eq!(encoded(127), vec![127]);
        assert_eq!(encoded(-112), vec![0x90]);
    }

    #[test]
    fn matches_hadoop_encoding() {
        // WritableUtils.writeVLong(out, 128) == [0x8f, 0x80]
        assert_eq!(encoded(128), vec![0x8f, 0x80]);
        assert_eq!(encoded(300), vec![0x8e, 0x01, 0x2c]);
        // -113 is stored as ~(-113) = 112 with a negative one-byte marker
        assert_eq!(encoded(-113), vec![0x87, 0x70]);
    }

    #[test]
    fn reads_back_boundaries() {
        for v in [
            -113,
            128,
            255,
            256,
            65_536,
            i64::from(i32::MAX),
            i64::from(i32::MIN),
            i64::MAX,
            i64::MIN,
        ] {
            let bytes = encoded(v);
            assert_eq!(read_vlong(&mut bytes.as_slice()).unwrap(), v, "value {v}");
        }
    }

    #[test]
    fn vint_rejects_overflow() {
        let bytes = encoded(i64::from(i32::MAX) + 1);
        let err = read_vint(&mut bytes.as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_input_is_eof() {
        let err = read_vlong(&mut [0x8e, 0x01].as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
