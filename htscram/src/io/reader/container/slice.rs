mod header;
pub(crate) mod records;

use self::header::read_header;
use super::block::read_block;
use crate::{
    container::{Slice, block::ContentType},
    error::{Error, Result},
    file_definition::Version,
};

pub(crate) fn read_slice(src: &mut &[u8], version: Version) -> Result<Slice> {
    let header = read_header(src, version)?;

    let mut core_data_block = None;
    let mut external_blocks = Vec::new();

    for _ in 0..header.block_count() {
        let block = read_block(src, version)?;

        match block.content_type() {
            ContentType::CoreData => {
                if core_data_block.replace(block).is_some() {
                    return Err(Error::Malformed("duplicate core data block".into()));
                }
            }
            ContentType::ExternalData => external_blocks.push(block),
            other => {
                return Err(Error::Malformed(format!(
                    "invalid block content type in slice: {other:?}"
                )));
            }
        }
    }

    let core_data_block =
        core_data_block.ok_or_else(|| Error::Malformed("missing core data block".into()))?;

    Ok(Slice::new(header, core_data_block, external_blocks))
}
