//! Multi-packet response reassembly (§4.3).
//!
//! Grounded primarily in `other_examples`' `rumblefrog-a2s-rs` client, which
//! is the one reference in the pack that actually reassembles and
//! decompresses split A2S responses (the teacher crate only parses
//! already-whole payloads). Header layout selection itself is delegated to
//! [`crate::codec::packet`].
//!
//! Per §4.3, the header parsers already hand back "everything after the
//! header fields" as the fragment's stored bytes — including, on fragment 0,
//! the inner four-byte simple-framing prefix of the assembled payload. That
//! prefix is not stripped here; it is re-read by the dispatcher once
//! reassembly completes, exactly as specified.

use bzip2::read::BzDecoder;
use std::io::Read;

use crate::codec::packet::{
    read_goldsource_fragment_header, read_source_fragment_header, source_includes_size_field,
};
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionMeta {
    pub uncompressed_size: i32,
    pub crc32: i32,
}

/// Per-endpoint reassembly state, alive only while a multi-packet response
/// is in flight.
#[derive(Debug, Default)]
pub struct ReassemblyContext {
    packet_total: Option<u8>,
    fragments: Vec<Option<Vec<u8>>>,
    compression: Option<CompressionMeta>,
}

impl ReassemblyContext {
    fn ensure_sized(&mut self, total: u8) {
        if self.packet_total.is_none() {
            self.packet_total = Some(total);
            self.fragments = vec![None; total as usize];
        }
    }

    fn store(&mut self, packet_id: u8, payload: Vec<u8>) {
        if let Some(slot) = self.fragments.get_mut(packet_id as usize) {
            *slot = Some(payload);
        }
    }

    fn is_complete(&self) -> bool {
        !self.fragments.is_empty() && self.fragments.iter().all(Option::is_some)
    }

    fn assemble(&self) -> Vec<u8> {
        self.fragments
            .iter()
            .flat_map(|f| f.as_ref().expect("is_complete checked").iter().copied())
            .collect()
    }
}

/// Ingest one GoldSource-path fragment. Returns the combined, decompression-
/// verified payload once every fragment index has arrived, `None` otherwise.
pub fn ingest_goldsource_fragment(
    slot: &mut Option<ReassemblyContext>,
    input: &[u8],
) -> Result<Option<Vec<u8>>> {
    let (header, rest) = read_goldsource_fragment_header(input)?;
    let ctx = slot.get_or_insert_with(ReassemblyContext::default);
    ctx.ensure_sized(header.packet_total);
    ctx.store(header.packet_id, rest.to_vec());

    finish_if_complete(slot)
}

/// Ingest one Source-path fragment.
pub fn ingest_source_fragment(
    slot: &mut Option<ReassemblyContext>,
    input: &[u8],
    protocol: u8,
    app_id: i16,
) -> Result<Option<Vec<u8>>> {
    let size_included = source_includes_size_field(protocol, app_id);
    let (header, rest) = read_source_fragment_header(input, size_included)?;
    let ctx = slot.get_or_insert_with(ReassemblyContext::default);
    ctx.ensure_sized(header.packet_total);
    ctx.store(header.packet_id, rest.to_vec());

    if header.packet_id == 0 {
        if let (Some(uncompressed_size), Some(crc32)) = (header.uncompressed_size, header.crc32) {
            ctx.compression = Some(CompressionMeta {
                uncompressed_size,
                crc32,
            });
        }
    }

    finish_if_complete(slot)
}

fn finish_if_complete(slot: &mut Option<ReassemblyContext>) -> Result<Option<Vec<u8>>> {
    let complete = matches!(slot, Some(ctx) if ctx.is_complete());
    if !complete {
        return Ok(None);
    }

    let ctx = slot.take().expect("checked complete above");
    let assembled = ctx.assemble();

    match ctx.compression {
        Some(meta) => Ok(Some(decompress_and_verify(&assembled, meta)?)),
        None => Ok(Some(assembled)),
    }
}

fn decompress_and_verify(compressed: &[u8], meta: CompressionMeta) -> Result<Vec<u8>> {
    let mut decoder = BzDecoder::new(compressed);
    let mut out = Vec::with_capacity(meta.uncompressed_size.max(0) as usize);
    decoder.read_to_end(&mut out).map_err(|_| Error::Checksum)?;

    if out.len() as i64 != meta.uncompressed_size as i64 {
        return Err(Error::Checksum);
    }

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&out);
    if hasher.finalize() as i32 != meta.crc32 {
        return Err(Error::Checksum);
    }

    Ok(out)
}
