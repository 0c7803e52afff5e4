//! Binary scene codec (v6 container)
//!
//! # Wire format
//!
//! ```text
//! [43-byte ASCII header "reMarkable .lines file, version=6" + padding]
//! repeated blocks:
//!   [payload_len: u32 LE][unknown: u8][min_version: u8]
//!   [current_version: u8][block_type: u8][payload: payload_len bytes]
//! ```
//!
//! Line-item payload (block type 0x05):
//!
//! ```text
//! [node_id: u32][item_index: u32][has_line: u8]
//! if has_line: [tool: u32][color: u32][point_count: u32]
//!              point_count * ([x: f64][y: f64][speed: i32]
//!                             [direction: i32][width: i32][pressure: i32])
//! ```
//!
//! All integers little-endian. Unknown block types round-trip byte-for-byte.

use crate::error::Error;
use crate::stroke::{Point, Stroke};

use super::{Block, LineItemBlock, RawBlock, LINE_ITEM_BLOCK_TYPE};

/// File extension for scene files
pub const SCENE_EXTENSION: &str = ".rm";

/// v6 header, padded to 43 bytes
const HEADER: &[u8; 43] = b"reMarkable .lines file, version=6          ";

/// Versions stamped on line-item blocks we write
const LINE_ITEM_VERSIONS: (u8, u8) = (1, 2);

/// Bytes per serialized point
const POINT_SIZE: usize = 8 + 8 + 4 + 4 + 4 + 4;

/// Decode a scene byte stream into blocks
pub fn read_blocks(data: &[u8]) -> Result<Vec<Block>, Error> {
    let mut reader = Reader::new(data);

    let header = reader.take(HEADER.len())?;
    if header != HEADER {
        return Err(Error::CodecRead("bad file header".into()));
    }

    let mut blocks = Vec::new();
    while !reader.is_empty() {
        let payload_len = reader.read_u32()? as usize;
        let _unknown = reader.read_u8()?;
        let min_version = reader.read_u8()?;
        let current_version = reader.read_u8()?;
        let block_type = reader.read_u8()?;
        let payload = reader.take(payload_len)?;

        if block_type == LINE_ITEM_BLOCK_TYPE {
            blocks.push(Block::LineItem(decode_line_item(payload)?));
        } else {
            blocks.push(Block::Raw(RawBlock {
                block_type,
                min_version,
                current_version,
                payload: payload.to_vec(),
            }));
        }
    }

    Ok(blocks)
}

/// Encode blocks back into a scene byte stream
pub fn write_blocks(blocks: &[Block]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(HEADER.len() + blocks.len() * 64);
    out.extend_from_slice(HEADER);

    for block in blocks {
        match block {
            Block::LineItem(item) => {
                let payload = encode_line_item(item);
                write_block_header(
                    &mut out,
                    payload.len(),
                    LINE_ITEM_VERSIONS.0,
                    LINE_ITEM_VERSIONS.1,
                    LINE_ITEM_BLOCK_TYPE,
                )?;
                out.extend_from_slice(&payload);
            }
            Block::Raw(raw) => {
                write_block_header(
                    &mut out,
                    raw.payload.len(),
                    raw.min_version,
                    raw.current_version,
                    raw.block_type,
                )?;
                out.extend_from_slice(&raw.payload);
            }
        }
    }

    Ok(out)
}

fn write_block_header(
    out: &mut Vec<u8>,
    payload_len: usize,
    min_version: u8,
    current_version: u8,
    block_type: u8,
) -> Result<(), Error> {
    let len = u32::try_from(payload_len)
        .map_err(|_| Error::CodecWrite(format!("block payload too large: {} bytes", payload_len)))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.push(0);
    out.push(min_version);
    out.push(current_version);
    out.push(block_type);
    Ok(())
}

fn decode_line_item(payload: &[u8]) -> Result<LineItemBlock, Error> {
    let mut reader = Reader::new(payload);

    let node_id = reader.read_u32()?;
    let item_index = reader.read_u32()?;
    let has_line = reader.read_u8()?;

    let line = match has_line {
        0 => None,
        1 => {
            let tool = reader.read_u32()?;
            let color = reader.read_u32()?;
            let point_count = reader.read_u32()? as usize;

            // Guard against bogus counts before allocating
            if point_count * POINT_SIZE != reader.remaining() {
                return Err(Error::CodecRead(format!(
                    "line item declares {} points but carries {} bytes",
                    point_count,
                    reader.remaining()
                )));
            }

            let mut points = Vec::with_capacity(point_count);
            for _ in 0..point_count {
                points.push(Point {
                    x: reader.read_f64()?,
                    y: reader.read_f64()?,
                    speed: reader.read_i32()?,
                    direction: reader.read_i32()?,
                    width: reader.read_i32()?,
                    pressure: reader.read_i32()?,
                });
            }
            Some(Stroke { tool, color, points })
        }
        other => {
            return Err(Error::CodecRead(format!(
                "invalid line presence flag: {}",
                other
            )))
        }
    };

    if !reader.is_empty() {
        return Err(Error::CodecRead(format!(
            "{} trailing bytes after line item",
            reader.remaining()
        )));
    }

    Ok(LineItemBlock {
        node_id,
        item_index,
        line,
    })
}

fn encode_line_item(item: &LineItemBlock) -> Vec<u8> {
    let point_bytes = item.line.as_ref().map_or(0, |l| l.points.len() * POINT_SIZE);
    let mut out = Vec::with_capacity(4 + 4 + 1 + 12 + point_bytes);

    out.extend_from_slice(&item.node_id.to_le_bytes());
    out.extend_from_slice(&item.item_index.to_le_bytes());

    match &item.line {
        None => out.push(0),
        Some(stroke) => {
            out.push(1);
            out.extend_from_slice(&stroke.tool.to_le_bytes());
            out.extend_from_slice(&stroke.color.to_le_bytes());
            out.extend_from_slice(&(stroke.points.len() as u32).to_le_bytes());
            for p in &stroke.points {
                out.extend_from_slice(&p.x.to_le_bytes());
                out.extend_from_slice(&p.y.to_le_bytes());
                out.extend_from_slice(&p.speed.to_le_bytes());
                out.extend_from_slice(&p.direction.to_le_bytes());
                out.extend_from_slice(&p.width.to_le_bytes());
                out.extend_from_slice(&p.pressure.to_le_bytes());
            }
        }
    }

    out
}

/// Cursor over a byte slice with bounds-checked little-endian reads
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(Error::CodecRead(format!(
                "unexpected end of stream: wanted {} bytes, {} left",
                len,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, Error> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f64(&mut self) -> Result<f64, Error> {
        let b = self.take(8)?;
        Ok(f64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}
