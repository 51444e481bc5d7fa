//! **htscram** reads and writes the CRAM 3.x container format.
//!
//! CRAM is a reference-compressed, block-oriented alignment format: records
//! are batched into slices and containers, each logical data series is
//! routed through a configurable entropy/transform codec, and aligned bases
//! are stored as an edit script against the reference sequence.
//!
//! This crate is the container codec core. Text formats, BAM/BGZF I/O, and
//! reference FASTA access live upstream; the codec consumes them through
//! [`alignment::Record`], [`SamHeader`], and the
//! [`reference::ReferenceSource`] trait.
//!
//! # Examples
//!
//! ## Write and read a record
//!
//! ```
//! use htscram::{self as cram, alignment, SamHeader};
//!
//! # fn main() -> cram::Result<()> {
//! let header = SamHeader::new("@HD\tVN:1.6\n", 0);
//!
//! let mut buf = Vec::new();
//!
//! {
//!     let mut writer = cram::io::Writer::new(&mut buf);
//!     writer.write_file_definition()?;
//!     writer.write_file_header(&header)?;
//!
//!     let record = alignment::Record {
//!         name: Some("r0".into()),
//!         flags: cram::record::Flags::UNMAPPED,
//!         sequence: b"ACGT".to_vec(),
//!         quality_scores: vec![30; 4],
//!         ..Default::default()
//!     };
//!
//!     writer.write_alignment_record(&record)?;
//!     writer.try_finish()?;
//! }
//!
//! let mut reader = cram::io::Reader::new(&buf[..]);
//! reader.read_file_definition()?;
//! reader.read_file_header()?;
//!
//! let records: Vec<_> = reader.records().collect::<cram::Result<_>>()?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].sequence, b"ACGT");
//! # Ok(())
//! # }
//! ```

pub mod alignment;
pub mod bai;
pub mod codecs;
pub mod container;
pub mod crai;
mod error;
pub mod file_definition;
mod header;
pub(crate) mod huffman;
pub mod io;
pub mod record;
pub mod reference;
pub mod strategy;

pub use self::{
    container::Container,
    error::{Error, Result, ValidationStringency},
    file_definition::FileDefinition,
    header::SamHeader,
    record::Record,
    strategy::CramEncodingStrategy,
};
