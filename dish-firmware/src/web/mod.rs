// Web-Modul für die HTTP-API
// Organisiert alle Web-bezogenen Komponenten

pub mod protocol;

/// Antwort auf `/` - Dashboard und Setup-Seite gehören nicht zur Firmware
pub const INDEX_TEXT: &str = "DISH DASH - JSON-API unter /api/\n";
