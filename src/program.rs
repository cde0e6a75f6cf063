//! Program images and their content digests.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::emulator::memory::MAX_PROGRAM_SIZE;
use crate::error::CoreError;

/// A SHA-256 digest of a program's bytes. Snapshots carry the digest of the
/// program that produced them and are only accepted by a run of the same program.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn of(bytes: &[u8]) -> ContentDigest {
        let hash = Sha256::digest(bytes);
        let mut digest = [0; 32];
        digest.copy_from_slice(&hash);
        ContentDigest(digest)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self)
    }
}

/// An immutable program image, as loaded from a ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    name: String,
    rom: Arc<[u8]>,
    digest: ContentDigest,
}

impl Program {
    /// Validate `rom` and wrap it as a program.
    ///
    /// Fails if the image is empty or does not fit between the program
    /// start address and the end of memory.
    pub fn load(name: impl Into<String>, rom: &[u8]) -> Result<Program, CoreError> {
        let name = name.into();
        if rom.is_empty() {
            return Err(CoreError::EmptyProgram { name });
        }
        if rom.len() > MAX_PROGRAM_SIZE {
            return Err(CoreError::ProgramTooLarge {
                name,
                len: rom.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let digest = ContentDigest::of(rom);
        log::info!("Loaded program {:?} ({} bytes, digest {})", name, rom.len(), digest);
        Ok(Program {
            name,
            rom: rom.into(),
            digest,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    pub fn digest(&self) -> ContentDigest {
        self.digest
    }
}
