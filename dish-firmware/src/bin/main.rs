// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]

// Heap Allocator (WiFi und API-Bridge benötigen dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use embassy_executor::Spawner;
use esp_rtos::embassy::InterruptExecutor;

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::interrupt::Priority;
use esp_hal::interrupt::software::SoftwareInterruptControl;
use esp_hal::ledc::{LSGlobalClkSource, Ledc};
use esp_hal::rng::Rng;
use esp_hal::spi::Mode as SpiMode;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, Uart};
use esp_storage::FlashStorage;
use static_cell::StaticCell;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Projekt-Module und Konfiguration
use dish_core::Parts;
use dish_core::config::{FIRMWARE_VERSION, FP_BAUDRATE};
use dish_dash::EspScheduler;
use dish_dash::config::*;
use dish_dash::hal::{
    ApiBridge, EspSystem, EspTimebase, FlashFileSystem, GpioInputs, NameBridge, PwmSpeaker,
    RadioBridge, SpiDisplayBus, UartSensor,
};
use dish_dash::tasks::network_task;

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware und WiFi, startet die Netzwerk-Tasks im
/// Interrupt-Executor und betreibt danach den Scheduler blockierend im
/// Thread-Modus. Der Scheduler kehrt nie zurück.
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    defmt::info!("DISH DASH v{} startet", FIRMWARE_VERSION);

    // Heap Allocator initialisieren
    // Zwei Bereiche: reclaimed RAM (64 KB) + extra (64 KB)
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    // WiFi Hardware initialisieren
    static RADIO_INIT: StaticCell<esp_radio::Controller> = StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interfaces) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Netzwerk-Tasks auf eigenem Interrupt-Executor
    // (laufen weiter, während der Scheduler blockierend wartet)
    static NET_EXECUTOR: StaticCell<InterruptExecutor<1>> = StaticCell::new();
    let net_executor = NET_EXECUTOR.init(InterruptExecutor::new(sw_interrupt.software_interrupt1));
    let net_spawner = net_executor.start(Priority::Priority1);
    net_spawner
        .spawn(network_task(wifi_controller, wifi_interfaces, seed))
        .expect("Failed to spawn network task");

    // MAX7219-Kette an SPI2
    let spi = Spi::new(
        peripherals.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(DISPLAY_SPI_MHZ))
            .with_mode(SpiMode::_0),
    )
    .expect("Failed to initialize SPI")
    .with_sck(peripherals.GPIO6)
    .with_mosi(peripherals.GPIO7);
    let cs = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());

    // R503 an UART1
    let uart = Uart::new(
        peripherals.UART1,
        UartConfig::default().with_baudrate(FP_BAUDRATE),
    )
    .expect("Failed to initialize UART")
    .with_rx(peripherals.GPIO4)
    .with_tx(peripherals.GPIO5);

    let pull_up = InputConfig::default().with_pull(Pull::Up);
    let inputs = GpioInputs {
        front: Input::new(peripherals.GPIO2, pull_up),
        side: Input::new(peripherals.GPIO11, pull_up),
        motion: Input::new(peripherals.GPIO1, InputConfig::default()),
        finger_touch: Input::new(peripherals.GPIO3, pull_up),
    };

    // Lautsprecher an LEDC, Verstärker per GPIO
    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let amp = Output::new(peripherals.GPIO19, Level::Low, OutputConfig::default());

    let timg1 = TimerGroup::new(peripherals.TIMG1);

    defmt::info!(
        "Pins: Display SCK {} MOSI {} CS {} | Sensor RX {} TX {} Touch {}",
        DISPLAY_SCK_GPIO,
        DISPLAY_MOSI_GPIO,
        DISPLAY_CS_GPIO,
        SENSOR_RX_GPIO,
        SENSOR_TX_GPIO,
        SENSOR_WAKE_GPIO
    );
    defmt::info!(
        "Pins: Front {} Seite {} PIR {} | Lautsprecher {} Verstärker {}",
        FRONT_BUTTON_GPIO,
        SIDE_BUTTON_GPIO,
        MOTION_GPIO,
        SPEAKER_GPIO,
        AMP_ENABLE_GPIO
    );

    let parts = Parts {
        timebase: EspTimebase::new(timg1.wdt),
        display: SpiDisplayBus::new(spi, cs),
        sensor: UartSensor::new(uart),
        inputs,
        audio: PwmSpeaker::new(ledc, peripherals.GPIO18.into(), amp),
        radio: RadioBridge::new(),
        names: NameBridge,
        fs: FlashFileSystem::new(FlashStorage::new(peripherals.FLASH)),
        system: EspSystem,
        requests: ApiBridge::new(),
    };

    // Scheduler statisch ablegen (Spielstand + JSON-Puffer sind groß)
    static SCHEDULER: StaticCell<EspScheduler> = StaticCell::new();
    let scheduler = SCHEDULER.init(EspScheduler::new(parts));

    scheduler.boot();

    // Main-Loop: ein Scheduler-Durchlauf, dann kurze Pause
    let delay = Delay::new();
    loop {
        scheduler.run_once();
        delay.delay_millis(SCHEDULER_TICK_MS);
    }
}
