// RequestSource-Implementierung: API-Anfragen aus den HTTP-Tasks

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use dish_core::api::{ApiRequest, ApiResponse, Ticket};
use dish_core::traits::RequestSource;

use crate::bridge::{ApiReply, deliver_reply, next_request};
use crate::config::RESPONSE_BUFFER_SIZE;

const ENCODE_FAILED: &str = r#"{"ok":false,"error":"encode"}"#;

/// Serialisiert Antworten im Scheduler-Thread, solange die Daten noch
/// geliehen sind, und reicht nur den fertigen JSON-Text weiter
pub struct ApiBridge {
    buf: Vec<u8>,
    /// Nummer der zuletzt abgeholten Anfrage
    ticket: Ticket,
}

impl ApiBridge {
    pub fn new() -> Self {
        Self {
            buf: vec![0; RESPONSE_BUFFER_SIZE],
            ticket: Ticket::default(),
        }
    }
}

impl Default for ApiBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSource for ApiBridge {
    fn poll(&mut self) -> Option<ApiRequest> {
        let (ticket, request) = next_request()?;
        self.ticket = ticket;
        Some(request)
    }

    fn reply(&mut self, response: ApiResponse<'_>) {
        let body = match response.write_json(&mut self.buf) {
            Ok(n) => core::str::from_utf8(&self.buf[..n])
                .map(String::from)
                .unwrap_or_else(|_| String::from(ENCODE_FAILED)),
            Err(e) => {
                defmt::warn!("HTTP: Antwort nicht serialisierbar: {:?}", e);
                String::from(ENCODE_FAILED)
            }
        };
        deliver_reply(
            self.ticket,
            ApiReply {
                rejected: response.is_rejected(),
                body,
            },
        );
    }
}
