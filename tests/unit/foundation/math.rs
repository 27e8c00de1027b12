use super::*;

#[test]
fn fnv_hash_depends_on_every_byte() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"sticker");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b's');
    b.write_bytes(b"ticker");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_bytes(b"stickes");
    assert_ne!(a.finish(), c.finish());
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn scale_u8_clamps_coverage() {
    assert_eq!(scale_u8(200, 0.5), 100);
    assert_eq!(scale_u8(200, 2.0), 200);
    assert_eq!(scale_u8(200, -1.0), 0);
}
