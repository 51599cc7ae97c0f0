use crate::error::ConnectError;
use tracing::debug;

const SERVICES_DB: &str = "/etc/services";

/// Ports of the services commonly used for position streams, consulted when
/// the services database doesn't know the name.
const WELL_KNOWN_SERVICES: [(&str, u16); 2] = [("gpsd", 2947), ("nmea-0183", 10110)];

/// Resolves a service given as port number or service name to a TCP port.
pub async fn resolve_port(service: &str) -> Result<u16, ConnectError> {
    if let Ok(port) = service.parse::<u16>() {
        return Ok(port);
    }
    match tokio::fs::read_to_string(SERVICES_DB).await {
        Ok(db) => {
            if let Some(port) = lookup_service(&db, service) {
                return Ok(port);
            }
        }
        Err(e) => debug!("Can't read {SERVICES_DB}: {e}"),
    }
    WELL_KNOWN_SERVICES
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, port)| *port)
        .ok_or_else(|| ConnectError::UnknownService(service.to_string()))
}

/// Looks up the TCP port of `service` in the contents of a services database.
///
/// Every line has the form `name port/protocol [aliases...] [# comment]`.
/// Both the name and the aliases are matched.
pub fn lookup_service(db: &str, service: &str) -> Option<u16> {
    db.lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .find_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let (port, protocol) = fields.next()?.split_once('/')?;
            let mut aliases = fields;
            if protocol != "tcp" || (name != service && !aliases.any(|alias| alias == service)) {
                return None;
            }
            port.parse().ok()
        })
}
