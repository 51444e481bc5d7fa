use htscram::{
    self as cram, SamHeader, ValidationStringency,
    alignment::{
        Record,
        cigar::{Kind, Op},
    },
    record::Flags,
    reference::InMemoryReferenceSource,
};
use noodles_core::Position;

/// Builds an in-memory reference with two synthetic sequences:
/// CHROMOSOME_0 and CHROMOSOME_1, both 64 bp of repeating ACGT.
pub fn make_reference_source() -> InMemoryReferenceSource {
    fn repeating_acgt(len: usize) -> Vec<u8> {
        b"ACGT".iter().copied().cycle().take(len).collect()
    }

    InMemoryReferenceSource::new([repeating_acgt(64), repeating_acgt(64)])
}

pub fn sam_header() -> SamHeader {
    SamHeader::new(
        "@HD\tVN:1.6\tSO:coordinate\n\
         @SQ\tSN:CHROMOSOME_0\tLN:64\n\
         @SQ\tSN:CHROMOSOME_1\tLN:64\n",
        2,
    )
}

pub fn position(n: usize) -> Option<Position> {
    Position::new(n)
}

pub fn mapped_record(name: &str, reference_sequence_id: usize, start: usize, sequence: &[u8]) -> Record {
    Record {
        name: Some(name.into()),
        flags: Flags::default(),
        reference_sequence_id: Some(reference_sequence_id),
        alignment_start: position(start),
        mapping_quality: Some(30),
        cigar: vec![Op::new(Kind::Match, sequence.len())].into(),
        sequence: sequence.to_vec(),
        ..Default::default()
    }
}

pub fn unmapped_record(name: &str, sequence: &[u8], quality_scores: &[u8]) -> Record {
    Record {
        name: Some(name.into()),
        flags: Flags::UNMAPPED,
        sequence: sequence.to_vec(),
        quality_scores: quality_scores.iter().map(|b| b - b'!').collect(),
        ..Default::default()
    }
}

/// Writes records to an in-memory CRAM stream.
pub fn write_cram(
    records: &[Record],
    reference_source: InMemoryReferenceSource,
    strategy: cram::CramEncodingStrategy,
) -> Vec<u8> {
    let mut buf = Vec::new();

    {
        let mut writer = cram::io::writer::Builder::default()
            .set_reference_source(reference_source)
            .set_encoding_strategy(strategy)
            .build_from_writer(&mut buf);

        writer.write_file_definition().unwrap();
        writer.write_file_header(&sam_header()).unwrap();

        for record in records {
            writer.write_alignment_record(record).unwrap();
        }

        writer.try_finish().unwrap();
    }

    buf
}

/// Reads all records from an in-memory CRAM stream.
pub fn read_cram(
    src: &[u8],
    reference_source: Option<InMemoryReferenceSource>,
    validation_stringency: ValidationStringency,
) -> Vec<Record> {
    let mut builder =
        cram::io::reader::Builder::default().set_validation_stringency(validation_stringency);

    if let Some(reference_source) = reference_source {
        builder = builder.set_reference_source(reference_source);
    }

    let mut reader = builder.build_from_reader(src);

    reader.read_file_definition().unwrap();

    let header_text = reader.read_file_header().unwrap();
    assert_eq!(header_text, sam_header().text().as_slice());

    reader.records().collect::<cram::Result<_>>().unwrap()
}
