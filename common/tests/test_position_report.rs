use common::position_type::PositionType;
use common::report::{Coordinate, PositionReport, to_dms};
use common::test_helper::positions::munich_position;

#[test]
fn format_degrees_minutes_seconds() {
    assert_eq!(to_dms(52.025833, 'N', 'S'), "52°1'33.00\"N");
    assert_eq!(to_dms(-0.5, 'E', 'W'), "0°30'0.00\"W");
    assert_eq!(to_dms(0.0, 'N', 'S'), "0°0'0.00\"N");
}

#[test]
fn carry_seconds_that_round_to_a_full_minute() {
    // 10°59'59.999" rounds to 11°0'0.00"
    let value = 10.0 + 59.0 / 60.0 + 59.999 / 3600.0;
    assert_eq!(to_dms(value, 'N', 'S'), "11°0'0.00\"N");
}

#[test]
fn render_wgs84_in_degrees_and_meters_per_second() {
    let position = munich_position();
    let report = PositionReport::render(&position, PositionType::Wgs84);
    assert_eq!(report.latitude, Coordinate::Degrees(position.latitude()));
    assert_eq!(report.longitude, Coordinate::Degrees(position.longitude()));
    assert_eq!(report.speed, position.speed());
    assert_eq!(report.altitude, Some(545.4));
    assert_eq!(report.track, Some(84.4));
}

#[test]
fn render_dms_knots() {
    let report = PositionReport::render(&munich_position(), PositionType::DmsKnots);
    assert_eq!(report.latitude, Coordinate::Dms("48°7'2.28\"N".to_string()));
    assert_eq!(report.longitude, Coordinate::Dms("11°31'0.00\"E".to_string()));
    assert!((report.speed - 22.4).abs() < 1e-9);
}

#[test]
fn serialize_report_with_type_name() {
    let report = PositionReport::render(&munich_position(), PositionType::DmsKmh);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["type"], "DMS.km/h");
    assert_eq!(json["latitude"], "48°7'2.28\"N");
    assert_eq!(json["altitude"], 545.4);
    assert_eq!(json["time"], "12:35:19");
    assert_eq!(json["date"], "1994-03-23");
}
