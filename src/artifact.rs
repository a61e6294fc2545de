//! Generated walkthrough programs.
//!
//! A generated program is a copy of the `walkbook` executable with the
//! compiled runbook appended:
//!
//! ```text
//! [ executable ][ JSON payload ][ payload length: u64 LE ][ MAGIC ]
//! ```
//!
//! On start-up `walkbook` looks for the trailer at the end of its own
//! executable and, when present, runs the embedded walkthrough.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::runbook::Runbook;

/// Marks the end of an embedded payload.
pub const MAGIC: &[u8; 8] = b"WLKBOOK\x01";

/// Payload layout version.
pub const PAYLOAD_FORMAT: u32 = 1;

/// Length field plus magic.
const TRAILER_LEN: usize = 16;

/// Identity used when no output name is available.
pub const DEFAULT_IDENTITY: &str = "walkthrough";

/// What gets embedded into a generated program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Layout version
    pub format: u32,
    /// Program identity, namespaces the persistent state
    pub identity: String,
    /// Version of the generator that built the program
    pub generator: String,
    pub runbook: Runbook,
}

impl Payload {
    pub fn new(identity: impl Into<String>, runbook: Runbook) -> Self {
        Self {
            format: PAYLOAD_FORMAT,
            identity: identity.into(),
            generator: crate::VERSION.to_string(),
            runbook,
        }
    }
}

/// Identity of a program written to `output`: its file stem.
pub fn identity_for(output: &Path) -> String {
    output
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_IDENTITY.to_string())
}

/// Byte range of the payload in `bytes`, if a trailer is present.
fn locate(bytes: &[u8]) -> Option<Range<usize>> {
    if bytes.len() < TRAILER_LEN || !bytes.ends_with(MAGIC) {
        return None;
    }
    let len_start = bytes.len() - TRAILER_LEN;
    let len = u64::from_le_bytes(bytes[len_start..len_start + 8].try_into().ok()?);
    let start = len_start.checked_sub(usize::try_from(len).ok()?)?;
    Some(start..len_start)
}

/// The executable without any embedded payload.
pub fn strip_payload(bytes: &[u8]) -> &[u8] {
    match locate(bytes) {
        Some(range) => &bytes[..range.start],
        None => bytes,
    }
}

/// Append `payload` to `program`, replacing a payload already there.
pub fn embed(program: &[u8], payload: &Payload) -> anyhow::Result<Vec<u8>> {
    let base = strip_payload(program);
    let json = serde_json::to_vec(payload)?;

    let mut bytes = Vec::with_capacity(base.len() + json.len() + TRAILER_LEN);
    bytes.extend_from_slice(base);
    bytes.extend_from_slice(&json);
    bytes.extend_from_slice(&u64::try_from(json.len())?.to_le_bytes());
    bytes.extend_from_slice(MAGIC);
    Ok(bytes)
}

/// Read the payload embedded in `bytes`.
pub fn extract(bytes: &[u8]) -> anyhow::Result<Option<Payload>> {
    let Some(range) = locate(bytes) else {
        return Ok(None);
    };
    decode(&bytes[range]).map(Some)
}

fn decode(json: &[u8]) -> anyhow::Result<Payload> {
    let payload: Payload = serde_json::from_slice(json).context("Embedded walkthrough is corrupt")?;
    if payload.format != PAYLOAD_FORMAT {
        bail!(
            "Embedded walkthrough uses format {} but this program reads format {PAYLOAD_FORMAT}",
            payload.format
        );
    }
    Ok(payload)
}

/// Write a program running `payload` to `output`, built from the current
/// executable.
pub fn write_program(payload: &Payload, output: &Path) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("Failed to locate the walkbook executable")?;
    let program = fs::read(&exe).with_context(|| format!("Failed to read {}", exe.display()))?;
    write_program_from(&program, payload, output)
}

/// Write `program` with `payload` embedded to `output`.
///
/// The file is written next to `output` and renamed into place, so an
/// existing program is never left half-written.
pub fn write_program_from(program: &[u8], payload: &Payload, output: &Path) -> anyhow::Result<()> {
    let bytes = embed(program, payload)?;

    let parent = output.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;

    let mut file = tempfile::Builder::new()
        .prefix(".walkbook-")
        .tempfile_in(parent)
        .with_context(|| format!("Failed to create a temporary file in {}", parent.display()))?;
    file.write_all(&bytes)?;
    file.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o755))?;
    }

    file.persist(output).with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        output = ?output,
        identity = payload.identity,
        steps = payload.runbook.step_count(),
        bytes = bytes.len(),
        "Wrote walkthrough program"
    );
    Ok(())
}

/// Payload embedded in the running executable, if any.
pub fn load_embedded() -> anyhow::Result<Option<Payload>> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let mut file = File::open(&exe).with_context(|| format!("Failed to open {}", exe.display()))?;

    let size = file.metadata()?.len();
    let trailer_len = TRAILER_LEN as u64;
    if size < trailer_len {
        return Ok(None);
    }

    let mut trailer = [0u8; TRAILER_LEN];
    file.seek(SeekFrom::Start(size - trailer_len))?;
    file.read_exact(&mut trailer)?;
    if &trailer[8..] != MAGIC {
        return Ok(None);
    }

    let len = u64::from_le_bytes(trailer[..8].try_into()?);
    if len > size - trailer_len {
        bail!("Embedded walkthrough is truncated");
    }

    let mut json = vec![0u8; usize::try_from(len)?];
    file.seek(SeekFrom::Start(size - trailer_len - len))?;
    file.read_exact(&mut json)?;

    decode(&json).map(Some)
}
