use crate::config::*;
use std::collections::HashMap;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_without_overrides() {
    let config = StreamConfig::from_lookup(lookup(&[]));
    assert_eq!(config.host, DEFAULT_HOST);
    assert_eq!(config.service, DEFAULT_SERVICE);
    assert!(config.gpsd_handshake);
    assert_eq!(config, StreamConfig::default());
}

#[test]
fn environment_overrides_target() {
    let config = StreamConfig::from_lookup(lookup(&[
        (HOST_KEY, "localhost"),
        (SERVICE_KEY, "gpsd"),
    ]));
    assert_eq!(config.host, "localhost");
    assert_eq!(config.service, "gpsd");
    assert_eq!(config.target(), "localhost:gpsd");
}

#[test]
fn presence_of_raw_nmea_key_disables_handshake() {
    for value in ["1", "0", ""] {
        let config = StreamConfig::from_lookup(lookup(&[(RAW_NMEA_KEY, value)]));
        assert!(!config.gpsd_handshake, "value {value:?} must disable the handshake");
    }
}
