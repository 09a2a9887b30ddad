// HTTP Server Task - JSON-API des Geräts
use alloc::string::String;

use defmt::info;
use embassy_net::Stack;
use embassy_time::Duration;
use picoserve::extract::Json;
use picoserve::io::embedded_io_async;
use picoserve::response::{IntoResponse, Response, StatusCode};
use picoserve::routing::{get, post, put};

use dish_core::api::{ApiRequest, DisplayUpdate, SoundUpdate, TextsUpdate};
use dish_core::buttons::ButtonAction;
use dish_core::state::GameState;
use dish_core::types::{NetworkConfig, WifiCredentials};

use crate::bridge::{self, ApiReply};
use crate::config::*;
use crate::web::INDEX_TEXT;
use crate::web::protocol::{
    ButtonBody, FingerprintFlagBody, NamesBody, PlayerBody, RewardsBody, SlotBody,
};

/// JSON-Extraktor mit Puffer für Escape-Sequenzen (Umlaute, Emoji)
type Body<T> = Json<T, JSON_UNESCAPE_BUFFER_SIZE>;

/// Fertige Scheduler-Antwort als HTTP-Response
struct JsonReply(ApiReply);

impl JsonReply {
    fn rejected() -> Self {
        JsonReply(ApiReply {
            rejected: true,
            body: String::from(r#"{"ok":false}"#),
        })
    }
}

impl IntoResponse for JsonReply {
    async fn write_to<
        R: embedded_io_async::Read,
        W: picoserve::response::ResponseWriter<Error = R::Error>,
    >(
        self,
        connection: picoserve::response::Connection<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        let status = if self.0.rejected {
            StatusCode::new(400)
        } else {
            StatusCode::OK
        };
        Response::new(status, self.0.body)
            .with_header("Content-Type", "application/json")
            .with_header("Access-Control-Allow-Origin", "*")
            .write_to(connection, response_writer)
            .await
    }
}

/// Reicht die Anfrage an den Scheduler und wartet auf die Antwort
async fn dispatch(request: ApiRequest) -> JsonReply {
    JsonReply(bridge::call(request).await)
}

async fn press_button(Json(body): Body<ButtonBody>) -> JsonReply {
    match ButtonAction::try_from(body.action.as_str()) {
        Ok(action) => dispatch(ApiRequest::Button(action)).await,
        Err(_) => {
            info!("HTTP: Unknown button action: {}", body.action.as_str());
            JsonReply::rejected()
        }
    }
}

/// HTTP Server Task - läuft parallel zu anderen Tasks
///
/// Dieser Task stellt die JSON-API bereit:
/// - GET  /api/state, /api/ip, /api/scan, /api/fp/count
/// - POST /api/score, /api/start, /api/skip, /api/reset, /api/button,
///   /api/fp/enroll, /api/fp/delete, /api/sound/test, /api/setup,
///   /api/restore, /api/factory-reset, /api/reboot
/// - PUT  /api/names, /api/texts, /api/display, /api/sound, /api/rewards,
///   /api/fp, /api/wifi, /api/network
///
/// Jede Anfrage wird über die Bridge im nächsten Scheduler-Durchlauf
/// ausgeführt.
///
/// **Task Pool:** 2 Instanzen pro Stack (Station und Access Point).
///
/// # Parameter
/// - `task_id`: Eindeutige ID für diese Server-Instanz
/// - `stack`: embassy-net Stack, auf dem Port 80 gebunden wird
#[embassy_executor::task(pool_size = 4)]
pub async fn http_server_task(task_id: usize, stack: Stack<'static>) {
    info!("HTTP: Server task {} starting on port {}...", task_id, HTTP_PORT);

    let app = picoserve::Router::new()
        .route("/", get(|| async { INDEX_TEXT }))
        // Status
        .route("/api/state", get(|| dispatch(ApiRequest::Snapshot)))
        .route("/api/ip", get(|| dispatch(ApiRequest::CurrentIp)))
        .route("/api/scan", get(|| dispatch(ApiRequest::ScanResults)))
        // Spiel
        .route(
            "/api/score",
            post(|Json(body): Body<PlayerBody>| {
                dispatch(ApiRequest::Score {
                    player: body.player,
                })
            }),
        )
        .route("/api/start", post(|| dispatch(ApiRequest::Start)))
        .route("/api/skip", post(|| dispatch(ApiRequest::Skip)))
        .route("/api/reset", post(|| dispatch(ApiRequest::Reset)))
        .route("/api/button", post(press_button))
        // Einstellungen
        .route(
            "/api/names",
            put(|Json(body): Body<NamesBody>| dispatch(body.into())),
        )
        .route(
            "/api/texts",
            put(|Json(texts): Body<TextsUpdate>| dispatch(ApiRequest::SetTexts(texts))),
        )
        .route(
            "/api/display",
            put(|Json(update): Body<DisplayUpdate>| dispatch(ApiRequest::SetDisplay(update))),
        )
        .route(
            "/api/sound",
            put(|Json(sound): Body<SoundUpdate>| dispatch(ApiRequest::SetSound(sound))),
        )
        .route("/api/sound/test", post(|| dispatch(ApiRequest::SoundTest)))
        .route(
            "/api/rewards",
            put(|Json(body): Body<RewardsBody>| dispatch(body.into())),
        )
        .route(
            "/api/restore",
            post(|Json(state): Body<GameState>| dispatch(ApiRequest::Restore(state))),
        )
        // Fingerabdruck
        .route(
            "/api/fp/enroll",
            post(|Json(body): Body<SlotBody>| {
                dispatch(ApiRequest::EnrollFingerprint { slot: body.slot })
            }),
        )
        .route(
            "/api/fp/delete",
            post(|Json(body): Body<SlotBody>| {
                dispatch(ApiRequest::DeleteFingerprint { slot: body.slot })
            }),
        )
        .route(
            "/api/fp",
            put(|Json(body): Body<FingerprintFlagBody>| dispatch(body.into())),
        )
        .route("/api/fp/count", get(|| dispatch(ApiRequest::FingerprintCount)))
        // Netzwerk & System
        .route(
            "/api/setup",
            post(|Json(credentials): Body<WifiCredentials>| {
                dispatch(ApiRequest::SetupWifi(credentials))
            }),
        )
        .route(
            "/api/wifi",
            put(|Json(credentials): Body<WifiCredentials>| {
                dispatch(ApiRequest::SetWifi(credentials))
            }),
        )
        .route(
            "/api/network",
            put(|Json(network): Body<NetworkConfig>| dispatch(ApiRequest::SetNetwork(network))),
        )
        .route("/api/factory-reset", post(|| dispatch(ApiRequest::FactoryReset)))
        .route("/api/reboot", post(|| dispatch(ApiRequest::Reboot)));

    // Server-Konfiguration
    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(2)),
        write: Some(Duration::from_secs(2)),
        persistent_start_read_request: Some(Duration::from_secs(1)),
    });

    // HTTP-Buffer für Requests/Responses
    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];

    // TCP-Buffers für Socket
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    // Server erstellen
    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    // Server starten (lauscht auf Port 80)
    let _ = server
        .listen_and_serve(task_id, stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}
