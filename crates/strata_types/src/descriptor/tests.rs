use super::*;

#[test]
fn test_display() {
    assert_eq!(Descriptor::of(ClassId::FLOAT64).to_string(), "float64");
    assert_eq!(Descriptor::bytes(5).to_string(), "S5");
    assert_eq!(Descriptor::unicode(3).to_string(), "U3");
    assert_eq!(Descriptor::datetime(TimeUnit::Day).to_string(), "datetime64[D]");
    assert_eq!(Descriptor::datetime(TimeUnit::Generic).to_string(), "datetime64");
    assert_eq!(
        Descriptor::of(ClassId::INT32).swapped().to_string(),
        "int32 (byte-swapped)"
    );
    assert_eq!(
        Descriptor::with_param(ClassId::from_raw(70), Param::Custom(16)).to_string(),
        "class#70[0x10]"
    );
}

#[test]
fn test_byte_order_round_trip() {
    let native = Descriptor::of(ClassId::INT16);
    let swapped = native.swapped();
    assert!(native.is_native());
    assert!(!swapped.is_native());
    assert!(!swapped.is_canonical());
    assert_ne!(native, swapped);
    assert_eq!(swapped.native(), native);
}

#[test]
fn test_parameter_accessors() {
    assert_eq!(Descriptor::unicode(7).len(), Some(7));
    assert_eq!(Descriptor::unicode(7).unit(), None);
    assert_eq!(Descriptor::datetime(TimeUnit::Second).unit(), Some(TimeUnit::Second));
    assert_eq!(Descriptor::of(ClassId::BOOL).len(), None);
}
