use std::io::Cursor;

use pretty_assertions::assert_eq;
use smfio::serialization::BinaryReader;

const BE_PATTERN: [u8; 8] = [0x80, 0x00, 0x80, 0x00, 0x80, 0x00, 0x80, 0x00];
const LE_PATTERN: [u8; 8] = [0x00, 0x80, 0x00, 0x80, 0x00, 0x80, 0x00, 0x80];

#[test]
fn read_int_be() {
    let mut source = Cursor::new(BE_PATTERN.to_vec());

    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_i16_be().unwrap(), 0x8000u16 as i16);
    assert_eq!(reader.position().unwrap(), 2);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_u16_be().unwrap(), 0x8000);
    assert_eq!(reader.position().unwrap(), 2);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_i32_be().unwrap(), 0x8000_8000u32 as i32);
    assert_eq!(reader.position().unwrap(), 4);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_u32_be().unwrap(), 0x8000_8000);
    assert_eq!(reader.position().unwrap(), 4);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_i64_be().unwrap(), 0x8000_8000_8000_8000u64 as i64);
    assert_eq!(reader.position().unwrap(), 8);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_u64_be().unwrap(), 0x8000_8000_8000_8000);
    assert_eq!(reader.position().unwrap(), 8);
}

#[test]
fn read_int_le() {
    let mut source = Cursor::new(LE_PATTERN.to_vec());

    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_i16_le().unwrap(), 0x8000u16 as i16);
    assert_eq!(reader.position().unwrap(), 2);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_u16_le().unwrap(), 0x8000);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_i32_le().unwrap(), 0x8000_8000u32 as i32);
    assert_eq!(reader.position().unwrap(), 4);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_u32_le().unwrap(), 0x8000_8000);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_i64_le().unwrap(), 0x8000_8000_8000_8000u64 as i64);
    assert_eq!(reader.position().unwrap(), 8);

    source.set_position(0);
    let mut reader = BinaryReader::new(&mut source);
    assert_eq!(reader.read_u64_le().unwrap(), 0x8000_8000_8000_8000);
}

#[test]
fn read_byte() {
    let mut source = Cursor::new(vec![0x80]);
    let mut reader = BinaryReader::new(&mut source);

    assert_eq!(reader.read_byte().unwrap(), 0x80);
    assert_eq!(reader.position().unwrap(), 1);
}

#[test]
fn read_n_bytes() {
    let mut source = Cursor::new(vec![1, 2, 3, 4, 5]);
    let mut reader = BinaryReader::new(&mut source);

    assert_eq!(reader.read_array::<3>().unwrap(), [1, 2, 3]);
    assert_eq!(reader.read_n_bytes(2).unwrap(), vec![4, 5]);
    assert_eq!(reader.position().unwrap(), 5);
}

/// Every exact-length read must fail with EndOfFile and leave the source
/// position where it was before the attempt.
#[test]
fn short_reads_restore_position() {
    let data = vec![0xAB]; // one byte available

    type Attempt = fn(&mut BinaryReader<'_, Cursor<Vec<u8>>>) -> bool;
    let attempts: &[Attempt] = &[
        |r| r.read_i16_be().is_err(),
        |r| r.read_u16_be().is_err(),
        |r| r.read_i32_be().is_err(),
        |r| r.read_u32_be().is_err(),
        |r| r.read_i64_be().is_err(),
        |r| r.read_u64_be().is_err(),
        |r| r.read_i16_le().is_err(),
        |r| r.read_u16_le().is_err(),
        |r| r.read_i32_le().is_err(),
        |r| r.read_u32_le().is_err(),
        |r| r.read_i64_le().is_err(),
        |r| r.read_u64_le().is_err(),
        |r| r.read_array::<2>().is_err(),
        |r| r.read_n_bytes(2).is_err(),
    ];

    for attempt in attempts {
        let mut source = Cursor::new(data.clone());
        let mut reader = BinaryReader::new(&mut source);

        assert!(attempt(&mut reader));
        assert_eq!(reader.position().unwrap(), 0);
    }
}

#[test]
fn short_read_reports_end_of_file_at_start() {
    let mut source = Cursor::new(vec![1, 2, 3]);
    let mut reader = BinaryReader::new(&mut source);

    reader.read_byte().unwrap();

    let err = reader.read_u32_be().unwrap_err();
    assert!(err.is_end_of_file());
    assert_eq!(err.position(), 1);
    assert_eq!(reader.position().unwrap(), 1);
}

#[test]
fn best_effort_read_returns_actual_count() {
    let mut source = Cursor::new(vec![1, 2, 3]);
    let mut reader = BinaryReader::new(&mut source);

    let mut buf = [0u8; 8];
    assert_eq!(reader.read_bytes(&mut buf).unwrap(), 3);
    assert_eq!(&buf[..3], &[1, 2, 3]);
}

#[test]
fn skip_returns_actual_count() {
    let mut source = Cursor::new(vec![1, 2, 3, 4]);
    let mut reader = BinaryReader::new(&mut source);

    assert_eq!(reader.skip(3).unwrap(), 3);
    assert_eq!(reader.position().unwrap(), 3);
    assert_eq!(reader.skip(5).unwrap(), 1);
}
