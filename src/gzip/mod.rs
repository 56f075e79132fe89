//! gzip container handling.
//!
//! - [`codec`]: streaming compress/decompress over `Read`/`Write`, carrying
//!   the original file name and modification time in the member header
//! - [`header`]: RFC 1952 header and trailer structures
//! - [`parser`]: reads header and trailer from a file for listing, without
//!   inflating the body
//!
//! The deflate bitstream itself comes from `flate2`; every file produced
//! here is readable by stock `gzip -d`.

mod codec;
mod header;
mod parser;

pub use codec::{CodecError, DecodeOutcome, EntryMetadata, compress, decompress};
pub use header::*;
pub use parser::{ContainerInfo, ContainerParser, inspect};
