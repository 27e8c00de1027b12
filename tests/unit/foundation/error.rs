use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EditorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(EditorError::rejected("x").to_string().contains("rejected:"));
    assert!(EditorError::decode("x").to_string().contains("decode error:"));
    assert!(EditorError::encode("x").to_string().contains("encode error:"));
    assert!(
        EditorError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("disk gone");
    let err = EditorError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("disk gone"));
}
