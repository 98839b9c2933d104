//! TypeScript Generation Tests
//!
//! Validates that the public result types can be exported to TypeScript
//! when the tauri feature is enabled.

#[cfg(feature = "tauri")]
#[test]
fn test_core_types_implement_specta_type() {
    use specta::Type;

    // If this compiles, all types are properly configured for TypeScript export.
    fn assert_type<T: Type>() {}

    assert_type::<huskylens::ResultSet>();
    assert_type::<huskylens::Summary>();
    assert_type::<huskylens::ResultRecord>();
    assert_type::<huskylens::Block>();
    assert_type::<huskylens::Arrow>();
    assert_type::<huskylens::Field>();
    assert_type::<huskylens::Command>();
    assert_type::<huskylens::Algorithm>();
    assert_type::<huskylens::Request>();
    assert_type::<huskylens::PollRate>();
}

#[cfg(not(feature = "tauri"))]
#[test]
fn test_tauri_feature_disabled() {
    // Types still compile without specta::Type
    let _ = huskylens::PollRate::Continuous;
}
