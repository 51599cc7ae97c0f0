use common::position_type::{PositionType, SpeedUnit, UnknownPositionType};
use std::collections::HashSet;

#[test]
fn resolve_every_canonical_name() {
    let expected = [
        ("WGS84", PositionType::Wgs84),
        ("DMS.km/h", PositionType::DmsKmh),
        ("DMS.mph", PositionType::DmsMph),
        ("DMS.kn", PositionType::DmsKnots),
    ];
    for (name, position_type) in expected {
        assert_eq!(PositionType::resolve(Some(name)), Ok(position_type));
        assert_eq!(position_type.name(), name);
    }
}

#[test]
fn resolve_absent_name_to_default() {
    assert_eq!(PositionType::resolve(None), Ok(PositionType::Wgs84));
    assert_eq!(PositionType::DEFAULT, PositionType::Wgs84);
}

#[test]
fn reject_unknown_names_without_folding_or_prefix_matching() {
    for name in ["", "wgs84", "WGS", "WGS84 ", "DMS", "DMS.KN", "DMS.km", "dms.mph"] {
        assert_eq!(
            PositionType::resolve(Some(name)),
            Err(UnknownPositionType(name.to_string())),
            "name {name:?} must not resolve"
        );
    }
}

#[test]
fn table_is_bounded_and_names_are_unique() {
    let names: HashSet<&str> = PositionType::all().map(PositionType::name).collect();
    assert_eq!(PositionType::COUNT, 4);
    assert_eq!(names.len(), PositionType::COUNT);
    assert_eq!(PositionType::all().next(), Some(PositionType::Wgs84));
}

#[test]
fn speed_units_follow_the_type() {
    assert_eq!(PositionType::Wgs84.speed_unit(), SpeedUnit::MetersPerSecond);
    assert_eq!(PositionType::DmsKmh.speed_unit(), SpeedUnit::KilometersPerHour);
    assert_eq!(PositionType::DmsMph.speed_unit(), SpeedUnit::MilesPerHour);
    assert_eq!(PositionType::DmsKnots.speed_unit(), SpeedUnit::Knots);

    assert!((SpeedUnit::KilometersPerHour.from_mps(10.0) - 36.0).abs() < 1e-9);
    assert!((SpeedUnit::MilesPerHour.from_mps(10.0) - 22.369362920544).abs() < 1e-9);
    assert!((SpeedUnit::Knots.from_mps(10.0) - 19.438444924406).abs() < 1e-9);
}
