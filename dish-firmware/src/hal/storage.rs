// Flache Dateiablage auf dem internen Flash
//
// Jede Datei ist ein Satz Einträge in einer sequential-storage Map:
// ein Längen-Eintrag plus Stücke zu je STORAGE_CHUNK_SIZE Bytes.
// Schlüssel = Dateiname (mit Nullen aufgefüllt) + Stück-Index.

use alloc::vec;

use dish_core::error::PersistenceError;
use dish_core::traits::FileSystem;
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_futures::block_on;
use esp_storage::FlashStorage;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

use crate::config::{STORAGE_CHUNK_SIZE, STORAGE_FLASH_RANGE, STORAGE_NAME_LEN};

type Key = [u8; STORAGE_NAME_LEN + 1];

/// Stück-Index des Längen-Eintrags
const LENGTH_ENTRY: u8 = 0xFF;

/// Platz für Eintrags-Header und Schlüssel zusätzlich zu den Nutzdaten
const ENTRY_OVERHEAD: usize = 64;

fn key(name: &str, index: u8) -> Result<Key, PersistenceError> {
    let bytes = name.as_bytes();
    if bytes.len() > STORAGE_NAME_LEN {
        return Err(PersistenceError::Io);
    }
    let mut key = [0u8; STORAGE_NAME_LEN + 1];
    key[..bytes.len()].copy_from_slice(bytes);
    key[STORAGE_NAME_LEN] = index;
    Ok(key)
}

pub struct FlashFileSystem {
    flash: BlockingAsync<FlashStorage<'static>>,
    cache: NoCache,
    buf: [u8; STORAGE_CHUNK_SIZE + ENTRY_OVERHEAD],
}

impl FlashFileSystem {
    pub fn new(flash: FlashStorage<'static>) -> Self {
        Self {
            flash: BlockingAsync::new(flash),
            cache: NoCache::new(),
            buf: [0; STORAGE_CHUNK_SIZE + ENTRY_OVERHEAD],
        }
    }

    /// Dateilänge; 0 steht für gelöscht
    fn length(&mut self, name: &str) -> Result<usize, PersistenceError> {
        let key = key(name, LENGTH_ENTRY)?;
        let len: Option<u32> = block_on(fetch_item(
            &mut self.flash,
            STORAGE_FLASH_RANGE,
            &mut self.cache,
            &mut self.buf,
            &key,
        ))
        .map_err(|_| PersistenceError::Io)?;
        match len {
            None | Some(0) => Err(PersistenceError::NotFound),
            Some(len) => Ok(len as usize),
        }
    }

    fn store_length(&mut self, name: &str, len: u32) -> Result<(), PersistenceError> {
        let key = key(name, LENGTH_ENTRY)?;
        block_on(store_item(
            &mut self.flash,
            STORAGE_FLASH_RANGE,
            &mut self.cache,
            &mut self.buf,
            &key,
            &len,
        ))
        .map_err(|_| PersistenceError::Io)
    }
}

impl FileSystem for FlashFileSystem {
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, PersistenceError> {
        let len = self.length(name)?;
        if len > buf.len() {
            return Err(PersistenceError::Io);
        }

        for (index, target) in buf[..len].chunks_mut(STORAGE_CHUNK_SIZE).enumerate() {
            let key = key(name, index as u8)?;
            let chunk: Option<&[u8]> = block_on(fetch_item(
                &mut self.flash,
                STORAGE_FLASH_RANGE,
                &mut self.cache,
                &mut self.buf,
                &key,
            ))
            .map_err(|_| PersistenceError::Io)?;
            match chunk {
                Some(chunk) if chunk.len() == target.len() => target.copy_from_slice(chunk),
                _ => return Err(PersistenceError::Corrupt),
            }
        }
        Ok(len)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> Result<(), PersistenceError> {
        if data.len().div_ceil(STORAGE_CHUNK_SIZE) >= usize::from(LENGTH_ENTRY) {
            return Err(PersistenceError::Encode);
        }

        for (index, chunk) in data.chunks(STORAGE_CHUNK_SIZE).enumerate() {
            let key = key(name, index as u8)?;
            block_on(store_item(
                &mut self.flash,
                STORAGE_FLASH_RANGE,
                &mut self.cache,
                &mut self.buf,
                &key,
                &chunk,
            ))
            .map_err(|_| PersistenceError::Io)?;
        }
        // Länge zuletzt: erst danach gilt die Datei als geschrieben
        self.store_length(name, data.len() as u32)
    }

    fn remove(&mut self, name: &str) -> Result<(), PersistenceError> {
        self.length(name)?;
        self.store_length(name, 0)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), PersistenceError> {
        let len = self.length(from)?;
        let mut data = vec![0u8; len];
        self.read(from, &mut data)?;
        self.write(to, &data)?;
        self.store_length(from, 0)
    }
}
