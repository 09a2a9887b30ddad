// Library-Root: Plattform-Implementierungen und Netzwerk-Tasks
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Heap für API-Anfragen, JSON-Antworten und WiFi
extern crate alloc;

// Module
pub mod bridge;
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

// Re-exports von dish-core
pub use dish_core::{ApiRequest, ApiResponse, Scheduler};

/// Scheduler mit ESP32-C6 Hardware
pub type EspScheduler = Scheduler<hal::EspPlatform>;
